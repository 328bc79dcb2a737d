//! Status Bar Component
//!
//! Connection health, item count, clear-all, and the toast area.

use leptos::prelude::*;

use crate::context::AppContext;
use crate::models::NoticeKind;
use crate::pipeline;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn StatusBar() -> impl IntoView {
    let store = use_app_store();
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let clear = move |_| pipeline::clear_all(store, ctx);

    view! {
        <footer class="status-bar">
            <span class=move || if ctx.connected.get() { "conn-dot live" } else { "conn-dot" }>
                {move || if ctx.connected.get() { "● live" } else { "○ offline" }}
            </span>
            <span class="item-count">
                {move || format!("{} items", store.items().read().len())}
            </span>
            <button class="clear-btn" on:click=clear>"Clear all"</button>
            <div class="toasts">
                <For
                    each=move || ctx.notices.get()
                    key=|notice| notice.id
                    children=move |notice| {
                        let class = match notice.kind {
                            NoticeKind::Info => "toast info",
                            NoticeKind::Error => "toast error",
                        };
                        view! { <div class=class>{notice.text.clone()}</div> }
                    }
                />
            </div>
        </footer>
    }
}
