//! Reorder Algorithm
//!
//! Index math translating add-above-selected and drag/drop gestures into a
//! single display position. The position feeds both the local splice (via
//! `store::move_by_id` / `store::insert_at`) and the one reorder request sent
//! to the backend. Pointer handling itself lives in `leptos-listdnd`; by the
//! time these functions run, the gesture has been reduced to a target row and
//! a before/after side.

use leptos_listdnd::{DropPosition, DropTarget};

use crate::models::Item;

/// Display position for a newly added item: immediately before the selected
/// row (taking over its position), or appended when nothing is selected.
pub fn insertion_index(items: &[Item], selected: Option<i64>) -> usize {
    selected
        .and_then(|id| items.iter().position(|it| it.id == id))
        .unwrap_or(items.len())
}

/// Display position for a dropped row, counted before the dragged item is
/// removed: the target's index for `Before`, one past it for `After`.
/// None when the target no longer exists or is the dragged row itself.
pub fn drop_index(items: &[Item], dragged_id: i64, target: DropTarget) -> Option<usize> {
    if target.item_id == dragged_id {
        return None;
    }
    let target_index = items.iter().position(|it| it.id == target.item_id)?;
    items.iter().position(|it| it.id == dragged_id)?;
    Some(match target.position {
        DropPosition::Before => target_index,
        DropPosition::After => target_index + 1,
    })
}

/// 1-based order index sent to the backend for a drop at `index`
pub fn order_index_for(index: usize) -> i64 {
    (index + 1) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{insert_at, move_by_id, renumber};

    fn item(id: i64, name: &str) -> Item {
        Item {
            id,
            name: name.to_string(),
            quantity: 1,
            completed: false,
            order_index: 0,
        }
    }

    fn numbered(mut items: Vec<Item>) -> Vec<Item> {
        renumber(&mut items);
        items
    }

    #[test]
    fn add_to_empty_list_appends_at_one() {
        let mut items = Vec::new();
        let index = insertion_index(&items, None);
        assert_eq!(index, 0);
        insert_at(&mut items, item(1, "Milk"), index);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].order_index, 1);
        assert!(!items[0].completed);
    }

    #[test]
    fn add_above_selected_takes_its_slot() {
        let mut items = numbered(vec![item(1, "A")]);
        let index = insertion_index(&items, Some(1));
        assert_eq!(index, 0);
        insert_at(&mut items, item(2, "B"), index);
        let names: Vec<_> = items.iter().map(|it| it.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
        assert_eq!(items[0].order_index, 1);
        assert_eq!(items[1].order_index, 2);
    }

    #[test]
    fn add_with_stale_selection_appends() {
        let items = numbered(vec![item(1, "A"), item(2, "B")]);
        assert_eq!(insertion_index(&items, Some(99)), 2);
    }

    #[test]
    fn drop_before_first_moves_to_front() {
        let mut items = numbered(vec![item(1, "one"), item(2, "two"), item(3, "three")]);
        let index = drop_index(
            &items,
            3,
            DropTarget { item_id: 1, position: DropPosition::Before },
        )
        .expect("valid drop");
        assert_eq!(index, 0);
        assert!(move_by_id(&mut items, 3, index));
        let ids: Vec<_> = items.iter().map(|it| it.id).collect();
        assert_eq!(ids, [3, 1, 2]);
        let indices: Vec<_> = items.iter().map(|it| it.order_index).collect();
        assert_eq!(indices, [1, 2, 3]);
    }

    #[test]
    fn drop_after_target_lands_below_it() {
        let mut items = numbered(vec![item(1, "one"), item(2, "two"), item(3, "three")]);
        let index = drop_index(
            &items,
            1,
            DropTarget { item_id: 2, position: DropPosition::After },
        )
        .expect("valid drop");
        assert_eq!(index, 2);
        assert!(move_by_id(&mut items, 1, index));
        let ids: Vec<_> = items.iter().map(|it| it.id).collect();
        assert_eq!(ids, [2, 1, 3]);
    }

    #[test]
    fn drop_on_self_is_rejected() {
        let items = numbered(vec![item(1, "one"), item(2, "two")]);
        assert_eq!(
            drop_index(&items, 1, DropTarget { item_id: 1, position: DropPosition::Before }),
            None
        );
    }

    #[test]
    fn drop_on_vanished_target_is_rejected() {
        let items = numbered(vec![item(1, "one")]);
        assert_eq!(
            drop_index(&items, 1, DropTarget { item_id: 7, position: DropPosition::After }),
            None
        );
    }
}
