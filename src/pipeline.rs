//! Optimistic Mutation Pipeline
//!
//! Every local edit mutates the store first, then sends the request. On
//! failure the exact inverse is applied (or, for reorders, a full resync is
//! forced, since renumbering has no simple inverse) and a failure toast is
//! shown. Offline attempts are rejected before any mutation happens, never
//! queued.
//!
//! A second mutation can race ahead of a slow-confirming first one; the
//! rollback here plus the reconcile layer's validate-or-resync rule absorb
//! that.

use std::cell::Cell;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_listdnd::DropTarget;

use crate::api;
use crate::context::AppContext;
use crate::models::Item;
use crate::reorder;
use crate::store::{self, AppStateStoreFields, AppStore};

thread_local! {
    /// Placeholder ids for optimistic inserts, always negative so they can
    /// never collide with server-assigned ids
    static NEXT_TEMP_ID: Cell<i64> = const { Cell::new(-1) };
}

fn next_temp_id() -> i64 {
    NEXT_TEMP_ID.with(|cell| {
        let id = cell.get();
        cell.set(id - 1);
        id
    })
}

fn offline_guard(ctx: &AppContext) -> bool {
    if api::is_online() {
        return false;
    }
    ctx.notify_error("You're offline — change not saved");
    true
}

// ========================
// Optimistic Apply / Inverse Pairs
// ========================
//
// Kept separate from the request plumbing so each rollback is the exact
// inverse of its optimistic mutation, over plain item vectors.

/// Flip an item's completed flag, returning the pre-toggle value for rollback
fn toggle_apply(items: &mut [Item], item_id: i64) -> Option<bool> {
    let item = items.iter_mut().find(|it| it.id == item_id)?;
    let was_completed = item.completed;
    item.completed = !was_completed;
    Some(was_completed)
}

/// Inverse of `toggle_apply`
fn toggle_revert(items: &mut [Item], item_id: i64, was_completed: bool) {
    store::update_by_id(items, item_id, |it| it.completed = was_completed);
}

/// Inverse of a delete: the removed item goes back to its prior position
fn delete_revert(items: &mut Vec<Item>, index: usize, removed: Item) {
    store::insert_at(items, removed, index);
}

/// Inverse of a clear: restore the pre-clear snapshot as it was
fn clear_revert(items: &mut Vec<Item>, snapshot: Vec<Item>) {
    *items = snapshot;
}

/// Inverse of a rename
fn rename_revert(items: &mut [Item], item_id: i64, old_name: String) {
    store::update_by_id(items, item_id, |it| it.name = old_name);
}

/// Inverse of an optimistic create: drop the placeholder row
fn create_revert(items: &mut Vec<Item>, temp_id: i64) {
    store::remove_by_id(items, temp_id);
}

/// Add an item, before the selected row if there is one, else at the end.
/// An empty name is a deliberate spacer row.
pub fn add_item(store: AppStore, ctx: AppContext, name: String) {
    if offline_guard(&ctx) {
        return;
    }

    let items = store.items().read_untracked();
    let index = reorder::insertion_index(&items, ctx.selected_item.get_untracked());
    let at_end = index == items.len();
    drop(items);

    let temp_id = next_temp_id();
    let optimistic = Item {
        id: temp_id,
        name: name.clone(),
        quantity: 1,
        completed: false,
        order_index: 0,
    };
    store::store_insert_at(&store, optimistic, index);
    ctx.select(None);

    let target = if at_end { None } else { Some(reorder::order_index_for(index)) };
    spawn_local(async move {
        match api::create_item(&name, target).await {
            Ok(created) => {
                // Adopt the server identity, keep the locally renumbered slot
                store::store_update_item(&store, temp_id, |it| {
                    it.id = created.id;
                    it.name = created.name;
                    it.quantity = created.quantity;
                    it.completed = created.completed;
                });
            }
            Err(err) => {
                let field = store.items();
                let mut items = field.write();
                create_revert(&mut items, temp_id);
                drop(items);
                web_sys::console::warn_1(&format!("[PIPELINE] create failed: {err}").into());
                ctx.notify_error("Couldn't add item");
            }
        }
    });
}

/// Flip an item's completed flag
pub fn toggle_item(store: AppStore, ctx: AppContext, item_id: i64) {
    if offline_guard(&ctx) {
        return;
    }

    let applied = {
        let field = store.items();
        let mut items = field.write();
        toggle_apply(&mut items, item_id)
    };
    let Some(was_completed) = applied else {
        return;
    };

    spawn_local(async move {
        match api::toggle_item(item_id).await {
            Ok(confirmed) => {
                // Last write wins: trust the server's resulting state
                store::store_update_item(&store, item_id, |it| it.completed = confirmed.completed);
            }
            Err(err) => {
                let field = store.items();
                let mut items = field.write();
                toggle_revert(&mut items, item_id, was_completed);
                drop(items);
                web_sys::console::warn_1(&format!("[PIPELINE] toggle failed: {err}").into());
                ctx.notify_error("Couldn't update item");
            }
        }
    });
}

/// Delete an item
pub fn delete_item(store: AppStore, ctx: AppContext, item_id: i64) {
    if offline_guard(&ctx) {
        return;
    }

    let Some((index, removed)) = store::store_remove_item(&store, item_id) else {
        return;
    };
    if ctx.selected_item.get_untracked() == Some(item_id) {
        ctx.select(None);
    }

    spawn_local(async move {
        if let Err(err) = api::delete_item(item_id).await {
            let field = store.items();
            let mut items = field.write();
            delete_revert(&mut items, index, removed);
            drop(items);
            web_sys::console::warn_1(&format!("[PIPELINE] delete failed: {err}").into());
            ctx.notify_error("Couldn't delete item");
        }
    });
}

/// Rename an item
pub fn rename_item(store: AppStore, ctx: AppContext, item_id: i64, name: String) {
    if offline_guard(&ctx) {
        return;
    }

    let Some(old_name) = store
        .items()
        .read_untracked()
        .iter()
        .find(|it| it.id == item_id)
        .map(|it| it.name.clone())
    else {
        return;
    };
    if old_name == name {
        return;
    }
    store::store_update_item(&store, item_id, |it| it.name = name.clone());

    spawn_local(async move {
        if let Err(err) = api::update_item(item_id, Some(&name), None).await {
            let field = store.items();
            let mut items = field.write();
            rename_revert(&mut items, item_id, old_name);
            drop(items);
            web_sys::console::warn_1(&format!("[PIPELINE] rename failed: {err}").into());
            ctx.notify_error("Couldn't rename item");
        }
    });
}

/// Rename the shared list title
pub fn rename_list(store: AppStore, ctx: AppContext, name: String) {
    if offline_guard(&ctx) {
        return;
    }

    let old_name = store.list_name().get_untracked();
    if old_name == name {
        return;
    }
    store.list_name().set(name.clone());

    spawn_local(async move {
        if let Err(err) = api::rename_list(&name).await {
            store.list_name().set(old_name);
            web_sys::console::warn_1(&format!("[PIPELINE] list rename failed: {err}").into());
            ctx.notify_error("Couldn't rename list");
        }
    });
}

/// Clear every item
pub fn clear_all(store: AppStore, ctx: AppContext) {
    if offline_guard(&ctx) {
        return;
    }

    let snapshot = store.items().get_untracked();
    if snapshot.is_empty() {
        return;
    }
    store.items().write().clear();
    ctx.select(None);

    spawn_local(async move {
        if let Err(err) = api::clear_items().await {
            let field = store.items();
            let mut items = field.write();
            clear_revert(&mut items, snapshot);
            drop(items);
            web_sys::console::warn_1(&format!("[PIPELINE] clear failed: {err}").into());
            ctx.notify_error("Couldn't clear list");
        }
    });
}

/// Complete a drag/drop gesture: splice locally, renumber, send exactly one
/// reorder request. A failed request forces a full resync instead of a
/// partial rollback.
pub fn move_item(store: AppStore, ctx: AppContext, dragged_id: i64, target: DropTarget) {
    if offline_guard(&ctx) {
        return;
    }

    let index = {
        let items = store.items().read_untracked();
        match reorder::drop_index(&items, dragged_id, target) {
            Some(index) => index,
            None => return,
        }
    };
    if !store::store_move_item(&store, dragged_id, index) {
        return;
    }

    spawn_local(async move {
        if let Err(err) = api::reorder_item(dragged_id, reorder::order_index_for(index)).await {
            web_sys::console::warn_1(&format!("[PIPELINE] reorder failed: {err}").into());
            ctx.notify_error("Couldn't move item — reloading");
            resync(store, ctx).await;
        }
    });
}

/// Refetch list metadata and the item collection wholesale, replacing local
/// state. The universal conflict resolver: drift, failed reorders, and the
/// periodic safety net all funnel through here.
pub async fn resync(store: AppStore, ctx: AppContext) {
    if !api::is_online() {
        ctx.notify_error("You're offline — can't refresh");
        return;
    }

    match api::fetch_list().await {
        Ok(list) => {
            store.list_id().set(list.id);
            store.list_name().set(list.name);
        }
        Err(err) => {
            web_sys::console::warn_1(&format!("[PIPELINE] list fetch failed: {err}").into());
            ctx.notify_error("Couldn't refresh list");
            return;
        }
    }

    match api::fetch_items().await {
        Ok(items) => store::store_replace_all(&store, items),
        Err(err) => {
            web_sys::console::warn_1(&format!("[PIPELINE] items fetch failed: {err}").into());
            ctx.notify_error("Couldn't refresh items");
        }
    }
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

    fn three_items() -> Vec<Item> {
        vec![item(1, "Milk", 1), item(2, "Bread", 2), item(3, "Eggs", 3)]
    }

    fn assert_contiguous(items: &[Item]) {
        for (i, it) in items.iter().enumerate() {
            assert_eq!(it.order_index, (i + 1) as i64);
        }
    }

    #[test]
    fn failed_toggle_reverts_completed_flag() {
        let mut items = three_items();
        let before = items.clone();

        let was_completed = toggle_apply(&mut items, 2).expect("item present");
        assert!(!was_completed);
        assert!(items[1].completed);

        toggle_revert(&mut items, 2, was_completed);
        assert_eq!(items, before);
    }

    #[test]
    fn toggle_of_unknown_item_applies_nothing() {
        let mut items = three_items();
        let before = items.clone();
        assert_eq!(toggle_apply(&mut items, 42), None);
        assert_eq!(items, before);
    }

    #[test]
    fn failed_delete_reinserts_at_prior_index() {
        let mut items = three_items();
        let before = items.clone();

        let (index, removed) = store::remove_by_id(&mut items, 2).expect("item present");
        assert_eq!(index, 1);
        assert_contiguous(&items);

        delete_revert(&mut items, index, removed);
        assert_eq!(items, before);
    }

    #[test]
    fn failed_clear_restores_snapshot() {
        let mut items = three_items();
        items[0].completed = true;
        let snapshot = items.clone();

        items.clear();
        clear_revert(&mut items, snapshot.clone());
        assert_eq!(items, snapshot);
        assert_contiguous(&items);
    }

    #[test]
    fn failed_rename_restores_old_name() {
        let mut items = three_items();
        let before = items.clone();

        store::update_by_id(&mut items, 3, |it| it.name = "Oat milk".to_string());
        rename_revert(&mut items, 3, "Eggs".to_string());
        assert_eq!(items, before);
    }

    #[test]
    fn failed_create_drops_placeholder_row() {
        let mut items = three_items();
        let before = items.clone();

        store::insert_at(&mut items, item(-1, "Butter", 0), 1);
        assert_eq!(items.len(), 4);

        create_revert(&mut items, -1);
        assert_eq!(items, before);
        assert_contiguous(&items);
    }
}
