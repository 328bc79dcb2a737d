//! List Title Component
//!
//! Shared list name, editable in place.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::context::AppContext;
use crate::pipeline;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn ListTitle() -> impl IntoView {
    let store = use_app_store();
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(String::new());

    let commit = move || {
        set_editing.set(false);
        pipeline::rename_list(store, ctx, draft.get_untracked());
    };

    view! {
        <header class="list-title">
            {move || if editing.get() {
                view! {
                    <input
                        type="text"
                        prop:value=move || draft.get()
                        on:input=move |ev| {
                            if let Some(input) = ev.target()
                                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                            {
                                set_draft.set(input.value());
                            }
                        }
                        on:blur=move |_| commit()
                        on:keydown=move |ev| {
                            if ev.key() == "Enter" {
                                commit();
                            }
                        }
                    />
                }.into_any()
            } else {
                view! {
                    <h1 on:dblclick=move |_| {
                        set_draft.set(store.list_name().get_untracked());
                        set_editing.set(true);
                    }>
                        {move || store.list_name().get()}
                    </h1>
                }.into_any()
            }}
        </header>
    }
}
