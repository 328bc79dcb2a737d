//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The list
//! operations themselves are plain functions over `Vec<Item>` so the ordering
//! rules can be exercised without a reactive runtime; the `store_*` helpers
//! wrap them for the reactive store.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::models::Item;

pub const DEFAULT_LIST_NAME: &str = "Shopping List";

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Store)]
pub struct AppState {
    /// Items in display order; `order_index` is kept contiguous 1..N after
    /// every local structural change
    pub items: Vec<Item>,
    /// Shared list title
    pub list_name: String,
    /// Server-assigned list id (0 until the first fetch)
    pub list_id: i64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            list_name: DEFAULT_LIST_NAME.to_string(),
            list_id: 0,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Pure List Operations
// ========================

/// Reassign `order_index` = 1..N in current sequence order
pub fn renumber(items: &mut [Item]) {
    for (i, item) in items.iter_mut().enumerate() {
        item.order_index = (i + 1) as i64;
    }
}

/// Replace the whole sequence (full resync). The server's indices are not
/// necessarily contiguous, so sort by them and renumber.
pub fn replace_all(items: &mut Vec<Item>, mut next: Vec<Item>) {
    next.sort_by_key(|it| (it.order_index, it.id));
    renumber(&mut next);
    *items = next;
}

/// Insert at a display position (clamped to the sequence) and renumber
pub fn insert_at(items: &mut Vec<Item>, item: Item, index: usize) {
    let index = index.min(items.len());
    items.insert(index, item);
    renumber(items);
}

/// Remove by id, returning the removed item and its former position
pub fn remove_by_id(items: &mut Vec<Item>, id: i64) -> Option<(usize, Item)> {
    let index = items.iter().position(|it| it.id == id)?;
    let item = items.remove(index);
    renumber(items);
    Some((index, item))
}

/// Patch an item in place. Returns false if the id is unknown.
pub fn update_by_id(items: &mut [Item], id: i64, patch: impl FnOnce(&mut Item)) -> bool {
    match items.iter_mut().find(|it| it.id == id) {
        Some(item) => {
            patch(item);
            true
        }
        None => false,
    }
}

/// Move an item to a new display position (index counted before removal)
pub fn move_by_id(items: &mut Vec<Item>, id: i64, new_index: usize) -> bool {
    let Some(old_index) = items.iter().position(|it| it.id == id) else {
        return false;
    };
    let item = items.remove(old_index);
    // Removal shifts everything after the old slot up by one
    let dest = if new_index > old_index { new_index - 1 } else { new_index };
    let dest = dest.min(items.len());
    items.insert(dest, item);
    renumber(items);
    true
}

/// Display position at which an item with the given `order_index` belongs,
/// used when reinserting a peer-moved item among existing indices
pub fn position_for_order_index(items: &[Item], order_index: i64) -> usize {
    items
        .iter()
        .position(|it| it.order_index >= order_index)
        .unwrap_or(items.len())
}

// ========================
// Store Helper Functions
// ========================

/// Replace all items in the store (full resync path)
pub fn store_replace_all(store: &AppStore, next: Vec<Item>) {
    let field = store.items();
    let mut items = field.write();
    replace_all(&mut items, next);
}

/// Insert an item at a display position
pub fn store_insert_at(store: &AppStore, item: Item, index: usize) {
    let field = store.items();
    let mut items = field.write();
    insert_at(&mut items, item, index);
}

/// Remove an item from the store by ID
pub fn store_remove_item(store: &AppStore, item_id: i64) -> Option<(usize, Item)> {
    let field = store.items();
    let mut items = field.write();
    remove_by_id(&mut items, item_id)
}

/// Patch an item in the store by ID
pub fn store_update_item(store: &AppStore, item_id: i64, patch: impl FnOnce(&mut Item)) -> bool {
    let field = store.items();
    let mut items = field.write();
    update_by_id(&mut items, item_id, patch)
}

/// Move an item in the store to a new display position
pub fn store_move_item(store: &AppStore, item_id: i64, new_index: usize) -> bool {
    let field = store.items();
    let mut items = field.write();
    move_by_id(&mut items, item_id, new_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, order_index: i64) -> Item {
        Item {
            id,
            name: name.to_string(),
            quantity: 1,
            completed: false,
            order_index,
        }
    }

    fn assert_contiguous(items: &[Item]) {
        for (i, it) in items.iter().enumerate() {
            assert_eq!(it.order_index, (i + 1) as i64, "gap at position {i}");
        }
    }

    #[test]
    fn replace_all_sorts_by_server_index_and_renumbers() {
        let mut items = vec![item(9, "stale", 1)];
        replace_all(
            &mut items,
            vec![item(2, "Bread", 40), item(1, "Milk", 10), item(3, "Eggs", 25)],
        );
        let names: Vec<_> = items.iter().map(|it| it.name.as_str()).collect();
        assert_eq!(names, ["Milk", "Eggs", "Bread"]);
        assert_contiguous(&items);
    }

    #[test]
    fn sequences_of_structural_ops_stay_contiguous() {
        let mut items = Vec::new();
        insert_at(&mut items, item(1, "A", 0), 0);
        insert_at(&mut items, item(2, "B", 0), 0);
        insert_at(&mut items, item(3, "C", 0), 1);
        assert_contiguous(&items);

        remove_by_id(&mut items, 3).expect("present");
        assert_contiguous(&items);

        insert_at(&mut items, item(4, "D", 0), 99);
        assert_contiguous(&items);

        assert!(move_by_id(&mut items, 4, 0));
        assert_contiguous(&items);
        assert!(move_by_id(&mut items, 2, 2));
        assert_contiguous(&items);
    }

    #[test]
    fn remove_reports_former_position() {
        let mut items = vec![item(1, "A", 1), item(2, "B", 2), item(3, "C", 3)];
        let (index, removed) = remove_by_id(&mut items, 2).expect("present");
        assert_eq!(index, 1);
        assert_eq!(removed.name, "B");
        assert_eq!(items.len(), 2);
        assert_contiguous(&items);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut items = vec![item(1, "A", 1)];
        assert!(remove_by_id(&mut items, 42).is_none());
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn move_accounts_for_removal_shift() {
        let mut items = vec![item(1, "A", 1), item(2, "B", 2), item(3, "C", 3)];
        // "move A after C" arrives as pre-removal index 3
        assert!(move_by_id(&mut items, 1, 3));
        let ids: Vec<_> = items.iter().map(|it| it.id).collect();
        assert_eq!(ids, [2, 3, 1]);
        assert_contiguous(&items);
    }

    #[test]
    fn position_for_order_index_finds_slot() {
        let items = vec![item(1, "A", 1), item(2, "B", 2), item(3, "C", 3)];
        assert_eq!(position_for_order_index(&items, 1), 0);
        assert_eq!(position_for_order_index(&items, 3), 2);
        assert_eq!(position_for_order_index(&items, 99), 3);
    }
}
