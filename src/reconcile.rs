//! Reconciliation Engine
//!
//! Applies peer-originated push events to the local list. Events arrive
//! unordered and at-most-once, so each one is treated as a proposed delta:
//! its declared pre-state is checked against local state before anything is
//! touched, and any mismatch abandons the event in favor of a full resync.
//! An event is never half-applied.

use crate::models::{Item, Notice, NoticeKind, SyncEvent};
use crate::store;

/// Result of offering one event to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Event applied cleanly; optional toast describing the peer change
    Applied(Option<Notice>),
    /// Drift detected; the caller must refetch list and items wholesale
    Resync(&'static str),
    /// Echo of this tab's own action, dropped
    SelfEcho,
    /// Nothing to do (ping)
    Ignored,
}

fn peer_notice(text: String) -> Option<Notice> {
    Some(Notice { id: 0, kind: NoticeKind::Info, text })
}

fn item_label(item: &Item) -> String {
    if item.is_spacer() {
        "a spacer".to_string()
    } else {
        format!("\"{}\"", item.name)
    }
}

/// Offer one event to the engine, mutating `items`/`list_name` only when
/// every validation passes.
pub fn apply(
    items: &mut Vec<Item>,
    list_name: &mut String,
    local_id: &str,
    event: SyncEvent,
) -> Outcome {
    if event.origin() == Some(local_id) {
        return Outcome::SelfEcho;
    }

    match event {
        SyncEvent::Ping => Outcome::Ignored,

        SyncEvent::ItemCreated { item, old_count, new_count, .. } => {
            if let Some(expected) = old_count {
                if expected != items.len() {
                    return Outcome::Resync("create pre-count mismatch");
                }
            }
            if items.iter().any(|it| it.id == item.id) {
                return Outcome::Resync("created item already present");
            }
            let label = item_label(&item);
            let position = store::position_for_order_index(items, item.order_index);
            store::insert_at(items, item, position);
            if let Some(expected) = new_count {
                if expected != items.len() {
                    return Outcome::Resync("create post-count mismatch");
                }
            }
            Outcome::Applied(peer_notice(format!("Someone added {label}")))
        }

        SyncEvent::ItemUpdated { item, .. } => {
            let label = item_label(&item);
            let found = store::update_by_id(items, item.id, |local| {
                local.name = item.name.clone();
                local.quantity = item.quantity;
                local.completed = item.completed;
            });
            if !found {
                return Outcome::Resync("updated item not found");
            }
            Outcome::Applied(peer_notice(format!("Someone renamed an item to {label}")))
        }

        SyncEvent::ItemDeleted { item_id, old_count, new_count, .. } => {
            if let Some(expected) = old_count {
                if expected != items.len() {
                    return Outcome::Resync("delete pre-count mismatch");
                }
            }
            let Some((_, removed)) = store::remove_by_id(items, item_id) else {
                // Already gone locally: the declared pre-state cannot hold
                return Outcome::Resync("deleted item not found");
            };
            if let Some(expected) = new_count {
                if expected != items.len() {
                    return Outcome::Resync("delete post-count mismatch");
                }
            }
            Outcome::Applied(peer_notice(format!("Someone removed {}", item_label(&removed))))
        }

        SyncEvent::ItemToggled { item_id, old_state, new_state, .. } => {
            let Some(current) = items.iter().find(|it| it.id == item_id).map(|it| it.completed)
            else {
                return Outcome::Resync("toggled item not found");
            };
            if let Some(expected) = old_state {
                if expected != current {
                    return Outcome::Resync("toggle pre-state mismatch");
                }
            }
            let mut label = String::new();
            store::update_by_id(items, item_id, |local| {
                local.completed = new_state;
                label = item_label(local);
            });
            let verb = if new_state { "checked off" } else { "unchecked" };
            Outcome::Applied(peer_notice(format!("Someone {verb} {label}")))
        }

        SyncEvent::ItemReordered { item_id, new_index, .. } => {
            let Some(old_position) = items.iter().position(|it| it.id == item_id) else {
                return Outcome::Resync("reordered item not found");
            };
            let moved = items.remove(old_position);
            let label = item_label(&moved);
            // Slot among the surviving order_index values, then renumber
            let position = store::position_for_order_index(items, new_index);
            store::insert_at(items, moved, position);
            Outcome::Applied(peer_notice(format!("Someone moved {label}")))
        }

        SyncEvent::Clear { old_count, .. } => {
            if let Some(expected) = old_count {
                if expected != items.len() {
                    return Outcome::Resync("clear pre-count mismatch");
                }
            }
            items.clear();
            Outcome::Applied(peer_notice("Someone cleared the list".to_string()))
        }

        SyncEvent::ListUpdate { name, .. } => {
            *list_name = name.clone();
            Outcome::Applied(peer_notice(format!("List renamed to \"{name}\"")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCAL: &str = "tab-local";
    const PEER: &str = "tab-peer";

    fn item(id: i64, name: &str, order_index: i64) -> Item {
        Item {
            id,
            name: name.to_string(),
            quantity: 1,
            completed: false,
            order_index,
        }
    }

    fn three_items() -> Vec<Item> {
        vec![item(1, "Milk", 1), item(2, "Bread", 2), item(3, "Eggs", 3)]
    }

    fn assert_contiguous(items: &[Item]) {
        for (i, it) in items.iter().enumerate() {
            assert_eq!(it.order_index, (i + 1) as i64);
        }
    }

    #[test]
    fn self_echo_is_never_applied() {
        let mut items = three_items();
        let before = items.clone();
        let outcome = apply(
            &mut items,
            &mut String::new(),
            LOCAL,
            SyncEvent::ItemDeleted {
                client_id: LOCAL.to_string(),
                item_id: 1,
                old_count: Some(3),
                new_count: Some(2),
            },
        );
        assert_eq!(outcome, Outcome::SelfEcho);
        assert_eq!(items, before);
    }

    #[test]
    fn peer_create_inserts_by_order_index() {
        let mut items = three_items();
        let outcome = apply(
            &mut items,
            &mut String::new(),
            LOCAL,
            SyncEvent::ItemCreated {
                client_id: PEER.to_string(),
                item: item(4, "Butter", 2),
                old_count: Some(3),
                new_count: Some(4),
            },
        );
        assert!(matches!(outcome, Outcome::Applied(Some(_))));
        let names: Vec<_> = items.iter().map(|it| it.name.as_str()).collect();
        assert_eq!(names, ["Milk", "Butter", "Bread", "Eggs"]);
        assert_contiguous(&items);
    }

    #[test]
    fn pre_count_mismatch_leaves_state_untouched() {
        let mut items = three_items();
        let before = items.clone();
        let outcome = apply(
            &mut items,
            &mut String::new(),
            LOCAL,
            SyncEvent::ItemCreated {
                client_id: PEER.to_string(),
                item: item(4, "Butter", 2),
                old_count: Some(7),
                new_count: Some(8),
            },
        );
        assert_eq!(outcome, Outcome::Resync("create pre-count mismatch"));
        assert_eq!(items, before);
    }

    #[test]
    fn delete_of_already_removed_item_forces_resync() {
        let mut items = three_items();
        let before = items.clone();
        let outcome = apply(
            &mut items,
            &mut String::new(),
            LOCAL,
            SyncEvent::ItemDeleted {
                client_id: PEER.to_string(),
                item_id: 42,
                old_count: Some(3),
                new_count: Some(2),
            },
        );
        assert_eq!(outcome, Outcome::Resync("deleted item not found"));
        assert_eq!(items, before);
    }

    #[test]
    fn peer_delete_removes_and_renumbers() {
        let mut items = three_items();
        let outcome = apply(
            &mut items,
            &mut String::new(),
            LOCAL,
            SyncEvent::ItemDeleted {
                client_id: PEER.to_string(),
                item_id: 2,
                old_count: Some(3),
                new_count: Some(2),
            },
        );
        assert!(matches!(outcome, Outcome::Applied(Some(_))));
        let ids: Vec<_> = items.iter().map(|it| it.id).collect();
        assert_eq!(ids, [1, 3]);
        assert_contiguous(&items);
    }

    #[test]
    fn toggle_pre_state_mismatch_forces_resync() {
        let mut items = three_items();
        items[0].completed = true;
        let before = items.clone();
        let outcome = apply(
            &mut items,
            &mut String::new(),
            LOCAL,
            SyncEvent::ItemToggled {
                client_id: PEER.to_string(),
                item_id: 1,
                old_state: Some(false),
                new_state: true,
            },
        );
        assert_eq!(outcome, Outcome::Resync("toggle pre-state mismatch"));
        assert_eq!(items, before);
    }

    #[test]
    fn peer_toggle_flips_completed() {
        let mut items = three_items();
        let outcome = apply(
            &mut items,
            &mut String::new(),
            LOCAL,
            SyncEvent::ItemToggled {
                client_id: PEER.to_string(),
                item_id: 3,
                old_state: Some(false),
                new_state: true,
            },
        );
        assert!(matches!(outcome, Outcome::Applied(Some(_))));
        assert!(items[2].completed);
    }

    #[test]
    fn peer_reorder_moves_item_into_slot() {
        let mut items = three_items();
        let outcome = apply(
            &mut items,
            &mut String::new(),
            LOCAL,
            SyncEvent::ItemReordered {
                client_id: PEER.to_string(),
                item_id: 3,
                new_index: 1,
            },
        );
        assert!(matches!(outcome, Outcome::Applied(Some(_))));
        let ids: Vec<_> = items.iter().map(|it| it.id).collect();
        assert_eq!(ids, [3, 1, 2]);
        assert_contiguous(&items);
    }

    #[test]
    fn clear_with_matching_count_empties_list() {
        let mut items = three_items();
        let outcome = apply(
            &mut items,
            &mut String::new(),
            LOCAL,
            SyncEvent::Clear { client_id: PEER.to_string(), old_count: Some(3) },
        );
        assert!(matches!(outcome, Outcome::Applied(Some(_))));
        assert!(items.is_empty());
    }

    #[test]
    fn clear_count_mismatch_keeps_items() {
        let mut items = three_items();
        let before = items.clone();
        let outcome = apply(
            &mut items,
            &mut String::new(),
            LOCAL,
            SyncEvent::Clear { client_id: PEER.to_string(), old_count: Some(1) },
        );
        assert_eq!(outcome, Outcome::Resync("clear pre-count mismatch"));
        assert_eq!(items, before);
    }

    #[test]
    fn list_update_renames_title() {
        let mut items = Vec::new();
        let mut name = "Shopping List".to_string();
        let outcome = apply(
            &mut items,
            &mut name,
            LOCAL,
            SyncEvent::ListUpdate { client_id: PEER.to_string(), name: "Groceries".to_string() },
        );
        assert!(matches!(outcome, Outcome::Applied(Some(_))));
        assert_eq!(name, "Groceries");
    }

    #[test]
    fn ping_is_ignored() {
        let mut items = three_items();
        let before = items.clone();
        assert_eq!(apply(&mut items, &mut String::new(), LOCAL, SyncEvent::Ping), Outcome::Ignored);
        assert_eq!(items, before);
    }

    #[test]
    fn update_for_unknown_item_forces_resync() {
        let mut items = three_items();
        let outcome = apply(
            &mut items,
            &mut String::new(),
            LOCAL,
            SyncEvent::ItemUpdated { client_id: PEER.to_string(), item: item(99, "Ghost", 1) },
        );
        assert_eq!(outcome, Outcome::Resync("updated item not found"));
    }
}
