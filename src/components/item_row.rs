//! Item Row Component

use leptos::prelude::*;
use leptos_listdnd::{
    make_on_mousedown, make_on_mouseleave, make_on_row_mousemove, make_on_touchmove,
    make_on_touchstart, DndSignals, DropPosition,
};
use wasm_bindgen::JsCast;

use crate::context::AppContext;
use crate::models::Item;
use crate::pipeline;
use crate::store::use_app_store;

/// One list row: toggle, name (click selects, double-click renames), delete,
/// and the drag handlers for reordering
#[component]
pub fn ItemRow(item: Item, dnd: DndSignals) -> impl IntoView {
    let store = use_app_store();
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let item_id = item.id;
    let is_spacer = item.is_spacer();
    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(item.name.clone());

    let row_class = move || {
        let mut class = String::from("item-row");
        if ctx.selected_item.get() == Some(item_id) {
            class.push_str(" selected");
        }
        if dnd.dragging_id_read.get() == Some(item_id) {
            class.push_str(" dragging");
        }
        match dnd.drop_target_read.get() {
            Some(t) if t.item_id == item_id && t.position == DropPosition::Before => {
                class.push_str(" drop-before");
            }
            Some(t) if t.item_id == item_id && t.position == DropPosition::After => {
                class.push_str(" drop-after");
            }
            _ => {}
        }
        class
    };

    let toggle = move |_| pipeline::toggle_item(store, ctx, item_id);
    let delete = move |_| pipeline::delete_item(store, ctx, item_id);
    let select = move |_| {
        // Swallow the click that fires right after a drop
        if dnd.drag_just_ended_read.get_untracked() {
            return;
        }
        let next = if ctx.selected_item.get_untracked() == Some(item_id) {
            None
        } else {
            Some(item_id)
        };
        ctx.select(next);
    };
    let commit_rename = move || {
        set_editing.set(false);
        pipeline::rename_item(store, ctx, item_id, draft.get_untracked());
    };

    let completed = item.completed;
    let name = item.name.clone();

    view! {
        <li
            class=row_class
            data-item-id=item_id.to_string()
            on:mousedown=make_on_mousedown(dnd, item_id)
            on:mousemove=make_on_row_mousemove(dnd, item_id)
            on:mouseleave=make_on_mouseleave(dnd)
            on:touchstart=make_on_touchstart(dnd, item_id)
            on:touchmove=make_on_touchmove(dnd)
        >
            <span class="drag-handle">"⠿"</span>
            {if is_spacer {
                view! { <span class="spacer-rule" on:click=select></span> }.into_any()
            } else {
                view! {
                    <input
                        type="checkbox"
                        prop:checked=completed
                        on:change=toggle
                    />
                    {move || if editing.get() {
                        view! {
                            <input
                                type="text"
                                class="rename-input"
                                prop:value=move || draft.get()
                                on:input=move |ev| {
                                    if let Some(input) = ev.target()
                                        .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                                    {
                                        set_draft.set(input.value());
                                    }
                                }
                                on:blur=move |_| commit_rename()
                                on:keydown=move |ev| {
                                    if ev.key() == "Enter" {
                                        commit_rename();
                                    }
                                }
                            />
                        }.into_any()
                    } else {
                        let label = name.clone();
                        let draft_seed = name.clone();
                        view! {
                            <span
                                class=move || if completed { "item-name done" } else { "item-name" }
                                on:click=select
                                on:dblclick=move |_| {
                                    set_draft.set(draft_seed.clone());
                                    set_editing.set(true);
                                }
                            >
                                {label}
                            </span>
                        }.into_any()
                    }}
                }.into_any()
            }}
            <button class="delete-btn" on:click=delete>"×"</button>
        </li>
    }
}
