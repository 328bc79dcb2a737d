//! Leptos List DnD Utilities
//!
//! Drag-and-drop reordering for flat lists, using mouse or touch events.
//! Uses movement threshold to distinguish click from drag, and a midpoint
//! test on the hovered row to decide before/after placement.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Where the dragged row lands relative to the hovered row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
}

/// Computed drop target: the hovered row and which side of it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropTarget {
    pub item_id: i64,
    pub position: DropPosition,
}

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    pub dragging_id_read: ReadSignal<Option<i64>>,
    pub dragging_id_write: WriteSignal<Option<i64>>,
    pub drop_target_read: ReadSignal<Option<DropTarget>>,
    pub drop_target_write: WriteSignal<Option<DropTarget>>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Pending item id (pointer down but not yet dragging)
    pub pending_id_read: ReadSignal<Option<i64>>,
    pub pending_id_write: WriteSignal<Option<i64>>,
    /// Start position for movement detection
    pub start_x_read: ReadSignal<i32>,
    pub start_x_write: WriteSignal<i32>,
    pub start_y_read: ReadSignal<i32>,
    pub start_y_write: WriteSignal<i32>,
}

/// Movement threshold in pixels to start dragging
const DRAG_THRESHOLD_PX: i32 = 5;

/// Midpoint rule shared by the mouse and touch paths: pointer in the upper
/// half of the row means the dragged item is inserted before it, lower half
/// means after.
pub fn drop_position(pointer_y: f64, row_top: f64, row_height: f64) -> DropPosition {
    if pointer_y < row_top + row_height / 2.0 {
        DropPosition::Before
    } else {
        DropPosition::After
    }
}

pub fn create_dnd_signals() -> DndSignals {
    let (dragging_id_read, dragging_id_write) = signal(None::<i64>);
    let (drop_target_read, drop_target_write) = signal(None::<DropTarget>);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    let (pending_id_read, pending_id_write) = signal(None::<i64>);
    let (start_x_read, start_x_write) = signal(0i32);
    let (start_y_read, start_y_write) = signal(0i32);
    DndSignals {
        dragging_id_read,
        dragging_id_write,
        drop_target_read,
        drop_target_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_id_read,
        pending_id_write,
        start_x_read,
        start_x_write,
        start_y_read,
        start_y_write,
    }
}

/// End drag operation
pub fn end_drag(dnd: &DndSignals) {
    dnd.dragging_id_write.set(None);
    dnd.drop_target_write.set(None);
    dnd.pending_id_write.set(None);
    dnd.drag_just_ended_write.set(true);

    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
        cb.forget();
    }
}

fn begin_pending(dnd: &DndSignals, item_id: i64, x: i32, y: i32) {
    dnd.pending_id_write.set(Some(item_id));
    dnd.start_x_write.set(x);
    dnd.start_y_write.set(y);
}

fn maybe_start_drag(dnd: &DndSignals, x: i32, y: i32) {
    let pending = dnd.pending_id_read.get_untracked();
    if pending.is_some() && dnd.dragging_id_read.get_untracked().is_none() {
        let dx = (x - dnd.start_x_read.get_untracked()).abs();
        let dy = (y - dnd.start_y_read.get_untracked()).abs();
        if dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX {
            dnd.dragging_id_write.set(pending);
        }
    }
}

/// Update the drop target from the pointer position over a row element.
/// Both input modalities funnel through here so they decide identically.
fn hover_row(dnd: &DndSignals, item_id: i64, pointer_y: f64, row: &web_sys::Element) {
    let Some(dragged) = dnd.dragging_id_read.get_untracked() else { return };
    if dragged == item_id {
        dnd.drop_target_write.set(None);
        return;
    }
    let rect = row.get_bounding_client_rect();
    let position = drop_position(pointer_y, rect.top(), rect.height());
    dnd.drop_target_write.set(Some(DropTarget { item_id, position }));
}

/// Create mousedown handler for draggable rows
pub fn make_on_mousedown(dnd: DndSignals, item_id: i64) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() == 0 {
            // Ignore if target is input or button
            if let Some(target) = ev.target() {
                if target.dyn_ref::<web_sys::HtmlInputElement>().is_some() { return; }
                if target.dyn_ref::<web_sys::HtmlButtonElement>().is_some() { return; }
            }
            begin_pending(&dnd, item_id, ev.client_x(), ev.client_y());
        }
    }
}

/// Create touchstart handler for draggable rows
pub fn make_on_touchstart(dnd: DndSignals, item_id: i64) -> impl Fn(web_sys::TouchEvent) + Copy + 'static {
    move |ev: web_sys::TouchEvent| {
        if let Some(touch) = ev.touches().item(0) {
            begin_pending(&dnd, item_id, touch.client_x(), touch.client_y());
        }
    }
}

/// Create mousemove handler for rows - tracks the drop target while dragging
pub fn make_on_row_mousemove(dnd: DndSignals, item_id: i64) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |ev: web_sys::MouseEvent| {
        if let Some(row) = ev
            .current_target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        {
            hover_row(&dnd, item_id, f64::from(ev.client_y()), &row);
        }
    }
}

/// Create touchmove handler for rows. Touch events keep firing on the row
/// where the touch started, so the hovered row is resolved from the touch
/// coordinates instead of the event target.
pub fn make_on_touchmove(dnd: DndSignals) -> impl Fn(web_sys::TouchEvent) + Copy + 'static {
    move |ev: web_sys::TouchEvent| {
        let Some(touch) = ev.touches().item(0) else { return };
        maybe_start_drag(&dnd, touch.client_x(), touch.client_y());
        if dnd.dragging_id_read.get_untracked().is_none() {
            return;
        }
        ev.prevent_default();
        let Some(doc) = web_sys::window().and_then(|w| w.document()) else { return };
        let Some(el) = doc.element_from_point(touch.client_x() as f32, touch.client_y() as f32) else { return };
        let Some(row) = el.closest("[data-item-id]").ok().flatten() else { return };
        let Some(id) = row.get_attribute("data-item-id").and_then(|v| v.parse::<i64>().ok()) else { return };
        hover_row(&dnd, id, f64::from(touch.client_y()), &row);
    }
}

/// Create touchend handler - fires the drop callback if a drag was active
pub fn make_on_touchend<F>(dnd: DndSignals, on_drop: F) -> impl Fn(web_sys::TouchEvent) + Clone + 'static
where
    F: Fn(i64, DropTarget) + Clone + 'static,
{
    move |_ev: web_sys::TouchEvent| {
        finish_drag(&dnd, &on_drop);
    }
}

/// Create mouseleave handler
pub fn make_on_mouseleave(dnd: DndSignals) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging_id_read.get_untracked().is_some() {
            dnd.drop_target_write.set(None);
        }
    }
}

fn finish_drag<F>(dnd: &DndSignals, on_drop: &F)
where
    F: Fn(i64, DropTarget) + Clone + 'static,
{
    let dragging_id = dnd.dragging_id_read.get_untracked();
    let drop_target = dnd.drop_target_read.get_untracked();

    dnd.pending_id_write.set(None);

    // Only a real drag with a resolved target fires the callback; a plain
    // click falls through so the row's click handler runs naturally.
    if let (Some(dragged), Some(target)) = (dragging_id, drop_target) {
        end_drag(dnd);
        on_drop(dragged, target);
    } else {
        end_drag(dnd);
    }
}

/// Bind global mousemove handler - starts drag once past the threshold
pub fn bind_global_mousemove(dnd: DndSignals) {
    use wasm_bindgen::closure::Closure;

    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        maybe_start_drag(&dnd, ev.client_x(), ev.client_y());
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
        }
    }
    on_mousemove.forget();
}

/// Bind global mouseup handler for drop detection
pub fn bind_global_mouseup<F>(dnd: DndSignals, on_drop: F)
where
    F: Fn(i64, DropTarget) + Clone + 'static,
{
    use wasm_bindgen::closure::Closure;

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        finish_drag(&dnd, &on_drop);
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
        }
    }
    on_mouseup.forget();

    // Also bind global mousemove
    bind_global_mousemove(dnd);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_in_upper_half_drops_before() {
        assert_eq!(drop_position(104.0, 100.0, 20.0), DropPosition::Before);
    }

    #[test]
    fn pointer_in_lower_half_drops_after() {
        assert_eq!(drop_position(116.0, 100.0, 20.0), DropPosition::After);
    }

    #[test]
    fn exact_midpoint_drops_after() {
        assert_eq!(drop_position(110.0, 100.0, 20.0), DropPosition::After);
    }
}
