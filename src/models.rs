//! Frontend Models
//!
//! Data structures matching backend entities, plus the push-channel event
//! payloads.

use serde::{Deserialize, Serialize};

/// Shopping item (matches backend). `order_index` is 1-based display order;
/// the server does not guarantee contiguity, the client renumbers locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    /// Empty name is a valid spacer row, not an error
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub order_index: i64,
}

fn default_quantity() -> u32 {
    1
}

impl Item {
    pub fn is_spacer(&self) -> bool {
        self.name.is_empty()
    }
}

/// List metadata (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: i64,
    pub name: String,
}

/// Events received on the push channel. Tagged by the `type` field so an
/// unknown discriminator fails to decode instead of falling through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    ItemCreated {
        client_id: String,
        item: Item,
        old_count: Option<usize>,
        new_count: Option<usize>,
    },
    ItemUpdated {
        client_id: String,
        item: Item,
    },
    ItemDeleted {
        client_id: String,
        item_id: i64,
        old_count: Option<usize>,
        new_count: Option<usize>,
    },
    ItemToggled {
        client_id: String,
        item_id: i64,
        old_state: Option<bool>,
        new_state: bool,
    },
    ItemReordered {
        client_id: String,
        item_id: i64,
        new_index: i64,
    },
    Clear {
        client_id: String,
        old_count: Option<usize>,
    },
    ListUpdate {
        client_id: String,
        name: String,
    },
    /// Liveness beacon, no payload semantics
    Ping,
}

impl SyncEvent {
    /// Originating client id, if the event has one (`ping` does not)
    pub fn origin(&self) -> Option<&str> {
        match self {
            SyncEvent::ItemCreated { client_id, .. }
            | SyncEvent::ItemUpdated { client_id, .. }
            | SyncEvent::ItemDeleted { client_id, .. }
            | SyncEvent::ItemToggled { client_id, .. }
            | SyncEvent::ItemReordered { client_id, .. }
            | SyncEvent::Clear { client_id, .. }
            | SyncEvent::ListUpdate { client_id, .. } => Some(client_id),
            SyncEvent::Ping => None,
        }
    }
}

/// Transient user-facing message kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Transient user-facing message shown in the toast area
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_item_created() {
        let json = r#"{"type":"item_created","client_id":"abc","item":{"id":7,"name":"Milk","quantity":1,"completed":false,"order_index":3},"old_count":2,"new_count":3}"#;
        let event: SyncEvent = serde_json::from_str(json).expect("decode");
        match event {
            SyncEvent::ItemCreated { client_id, item, old_count, new_count } => {
                assert_eq!(client_id, "abc");
                assert_eq!(item.name, "Milk");
                assert_eq!(old_count, Some(2));
                assert_eq!(new_count, Some(3));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn decodes_ping_without_payload() {
        let event: SyncEvent = serde_json::from_str(r#"{"type":"ping"}"#).expect("decode");
        assert_eq!(event, SyncEvent::Ping);
        assert_eq!(event.origin(), None);
    }

    #[test]
    fn decodes_toggle_with_state_fields() {
        let json = r#"{"type":"item_toggled","client_id":"t1","item_id":4,"old_state":false,"new_state":true}"#;
        let event: SyncEvent = serde_json::from_str(json).expect("decode");
        assert_eq!(event.origin(), Some("t1"));
        match event {
            SyncEvent::ItemToggled { old_state, new_state, .. } => {
                assert_eq!(old_state, Some(false));
                assert!(new_state);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_fails_to_decode() {
        let result = serde_json::from_str::<SyncEvent>(r#"{"type":"item_exploded","client_id":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_item_fields_take_defaults() {
        let item: Item = serde_json::from_str(r#"{"id":1,"name":""}"#).expect("decode");
        assert_eq!(item.quantity, 1);
        assert!(!item.completed);
        assert!(item.is_spacer());
    }
}
