//! Listling Frontend App
//!
//! Root component: owns the store and context, loads the initial state,
//! starts the sync engine, and wires drag/drop drops into the pipeline.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_listdnd::{bind_global_mouseup, create_dnd_signals, make_on_touchend};
use reactive_stores::Store;

use crate::components::{ItemRow, ListTitle, NewItemForm, StatusBar};
use crate::context::AppContext;
use crate::models::Notice;
use crate::pipeline;
use crate::store::{AppState, AppStateStoreFields, AppStore};
use crate::sync;

#[component]
pub fn App() -> impl IntoView {
    let store: AppStore = Store::new(AppState::new());

    let notices = signal(Vec::<Notice>::new());
    let connected = signal(false);
    let selected_item = signal(None::<i64>);
    let ctx = AppContext::new(notices, connected, selected_item);

    provide_context(store);
    provide_context(ctx);

    // Initial load, then the deferred push subscription
    Effect::new(move |_| {
        spawn_local(async move {
            pipeline::resync(store, ctx).await;
        });
        sync::start(store, ctx);
    });

    // Drag/drop: mouse drops arrive via the global mouseup, touch drops via
    // each row's touchend; both funnel into the same pipeline call
    let dnd = create_dnd_signals();
    bind_global_mouseup(dnd, move |dragged_id, target| {
        pipeline::move_item(store, ctx, dragged_id, target);
    });
    let on_touchend = make_on_touchend(dnd, move |dragged_id, target| {
        pipeline::move_item(store, ctx, dragged_id, target);
    });

    view! {
        <div class="app-layout">
            <ListTitle />
            <NewItemForm />
            <ul class="item-list" on:touchend=on_touchend>
                <For
                    each=move || store.items().get()
                    key=|item| (item.id, item.order_index, item.completed, item.name.clone())
                    children=move |item| view! { <ItemRow item=item dnd=dnd /> }
                />
            </ul>
            <StatusBar />
        </div>
    }
}
