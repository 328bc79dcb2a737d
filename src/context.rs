//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::models::{Notice, NoticeKind};

/// How long a toast stays on screen
const NOTICE_TTL_MS: u32 = 4_000;

/// App-wide signals provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Transient user-facing notices - read
    pub notices: ReadSignal<Vec<Notice>>,
    set_notices: WriteSignal<Vec<Notice>>,
    /// Monotonic id source for notices
    next_notice_id: RwSignal<u64>,
    /// Push connection health - read
    pub connected: ReadSignal<bool>,
    set_connected: WriteSignal<bool>,
    /// Currently selected item (target for insert-above) - read
    pub selected_item: ReadSignal<Option<i64>>,
    set_selected_item: WriteSignal<Option<i64>>,
}

impl AppContext {
    pub fn new(
        notices: (ReadSignal<Vec<Notice>>, WriteSignal<Vec<Notice>>),
        connected: (ReadSignal<bool>, WriteSignal<bool>),
        selected_item: (ReadSignal<Option<i64>>, WriteSignal<Option<i64>>),
    ) -> Self {
        Self {
            notices: notices.0,
            set_notices: notices.1,
            next_notice_id: RwSignal::new(0),
            connected: connected.0,
            set_connected: connected.1,
            selected_item: selected_item.0,
            set_selected_item: selected_item.1,
        }
    }

    /// Show an informational toast
    pub fn notify(&self, text: impl Into<String>) {
        self.push_notice(NoticeKind::Info, text.into());
    }

    /// Show a failure toast
    pub fn notify_error(&self, text: impl Into<String>) {
        self.push_notice(NoticeKind::Error, text.into());
    }

    fn push_notice(&self, kind: NoticeKind, text: String) {
        let id = self.next_notice_id.get_untracked();
        self.next_notice_id.set(id + 1);
        self.set_notices.update(|list| list.push(Notice { id, kind, text }));

        let set_notices = self.set_notices;
        spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(NOTICE_TTL_MS).await;
            set_notices.update(|list| list.retain(|n| n.id != id));
        });
    }

    /// Record push connection health
    pub fn set_connected(&self, up: bool) {
        self.set_connected.set(up);
    }

    /// Select an item as the insert-above target (None clears)
    pub fn select(&self, item_id: Option<i64>) {
        self.set_selected_item.set(item_id);
    }
}
