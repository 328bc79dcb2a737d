//! New Item Form Component
//!
//! Adds an item at the end, or directly above the selected row. The spacer
//! button adds an empty-named row used as a visual separator.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::context::AppContext;
use crate::pipeline;
use crate::store::use_app_store;

#[component]
pub fn NewItemForm() -> impl IntoView {
    let store = use_app_store();
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let (new_name, set_new_name) = signal(String::new());

    let add = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get();
        if name.is_empty() {
            return;
        }
        pipeline::add_item(store, ctx, name);
        set_new_name.set(String::new());
    };

    let add_spacer = move |_| {
        pipeline::add_item(store, ctx, String::new());
    };

    view! {
        <form class="new-item-form" on:submit=add>
            <input
                type="text"
                placeholder=move || {
                    if ctx.selected_item.get().is_some() {
                        "Add above selected item...".to_string()
                    } else {
                        "Add new item...".to_string()
                    }
                }
                prop:value=move || new_name.get()
                on:input=move |ev| {
                    if let Some(input) = ev.target()
                        .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                    {
                        set_new_name.set(input.value());
                    }
                }
            />
            <button type="submit">"Add"</button>
            <button type="button" class="spacer-btn" on:click=add_spacer>"Spacer"</button>
            {move || ctx.selected_item.get().map(|_| view! {
                <button type="button" class="cancel-btn" on:click=move |_| ctx.select(None)>
                    "Clear selection"
                </button>
            })}
        </form>
    }
}
