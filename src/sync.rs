//! Event Stream Client + Connection Health Controller
//!
//! Owns the server-push subscription: opens the EventSource (deferred so it
//! never blocks first paint), parses and filters incoming events, hands peer
//! events to the reconcile engine, and keeps the connection healthy with
//! exponential-backoff reconnects, a staleness watchdog, and an hourly full
//! resync as a drift safety net.
//!
//! Timer plumbing: every delayed action runs in a `spawn_local` loop guarded
//! by a generation counter. Bumping the counter cancels whatever is pending,
//! which is how offline transitions kill a scheduled reconnect and how page
//! teardown stops all background work at once.

use std::cell::{Cell, RefCell};

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{EventSource, MessageEvent};

use crate::api;
use crate::context::AppContext;
use crate::models::SyncEvent;
use crate::pipeline;
use crate::reconcile::{self, Outcome};
use crate::session;
use crate::store::{AppStateStoreFields, AppStore};

const EVENTS_URL: &str = "/events";

/// Delay after mount before the subscription is opened
const STARTUP_DELAY_MS: u32 = 1_500;
const BACKOFF_BASE_MS: u64 = 1_000;
const BACKOFF_MAX_MS: u64 = 60_000;
const HEALTH_CHECK_INTERVAL_MS: u32 = 30_000;
/// No event (including pings) for this long means the transport died silently
const STALE_AFTER_MS: f64 = 60_000.0;
const FULL_REFRESH_INTERVAL_MS: u32 = 3_600_000;
/// Visibility/focus/pageshow/online can all fire together on wake
const WAKE_DEBOUNCE_MS: u32 = 1_000;

/// Reconnect delay for the n-th consecutive failure: 1s doubling to a 60s cap
pub fn backoff_delay_ms(attempt: u32) -> u64 {
    BACKOFF_BASE_MS
        .saturating_mul(2_u64.saturating_pow(attempt))
        .min(BACKOFF_MAX_MS)
}

/// Staleness predicate for the health watchdog
pub fn is_stale(last_event_ms: f64, now_ms: f64) -> bool {
    now_ms - last_event_ms > STALE_AFTER_MS
}

struct StreamHandle {
    source: EventSource,
    _on_open: Closure<dyn FnMut()>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut()>,
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.source.set_onopen(None);
        self.source.set_onmessage(None);
        self.source.set_onerror(None);
        self.source.close();
    }
}

thread_local! {
    static STREAM: RefCell<Option<StreamHandle>> = const { RefCell::new(None) };
    /// Consecutive failed connection attempts since the last successful open
    static ATTEMPT: Cell<u32> = const { Cell::new(0) };
    /// Timestamp of the last received event, pings included
    static LAST_EVENT_MS: Cell<f64> = const { Cell::new(0.0) };
    /// Bumped on shutdown; kills the long-lived health and refresh loops
    static TASK_GENERATION: Cell<u64> = const { Cell::new(0) };
    /// Bumped whenever a scheduled backoff reconnect is superseded
    static RECONNECT_GENERATION: Cell<u64> = const { Cell::new(0) };
    /// Bumped whenever a debounced wake-refresh is superseded
    static WAKE_GENERATION: Cell<u64> = const { Cell::new(0) };
    static STARTED: Cell<bool> = const { Cell::new(false) };
}

/// What the debounced wake path has to do once the burst of browser signals
/// settles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WakePlan {
    /// The periodic loops died with a shutdown and need respawning
    restart_loops: bool,
    /// The stream is closed and needs a fresh connection
    reconnect: bool,
}

/// A tab restored from the back/forward cache comes back with `shutdown`
/// already run: loops dead, stream closed. A live tab waking up only needs a
/// reconnect when its stream actually dropped.
fn wake_plan(started: bool, stream_closed: bool) -> WakePlan {
    WakePlan {
        restart_loops: !started,
        reconnect: stream_closed || !started,
    }
}

fn log(msg: &str) {
    web_sys::console::log_1(&format!("[SYNC] {msg}").into());
}

fn cancel_reconnect() {
    RECONNECT_GENERATION.with(|g| g.set(g.get() + 1));
}

fn cancel_wake() {
    WAKE_GENERATION.with(|g| g.set(g.get() + 1));
}

fn close_stream() {
    STREAM.with(|slot| slot.borrow_mut().take());
}

/// Begin syncing. Deferred: the subscription and the periodic loops only
/// start once the initial render has had a moment to settle.
pub fn start(store: AppStore, ctx: AppContext) {
    let already = STARTED.with(|s| s.replace(true));
    if already {
        return;
    }

    bind_window_listeners(store, ctx);

    spawn_local(async move {
        TimeoutFuture::new(STARTUP_DELAY_MS).await;
        connect(store, ctx);
        spawn_health_loop(store, ctx);
        spawn_refresh_loop(store, ctx);
    });
}

/// Close the stream and cancel every outstanding timer. Wired to pagehide so
/// a closing tab leaves no background work behind.
pub fn shutdown(ctx: AppContext) {
    cancel_reconnect();
    cancel_wake();
    TASK_GENERATION.with(|g| g.set(g.get() + 1));
    close_stream();
    STARTED.with(|s| s.set(false));
    ctx.set_connected(false);
}

fn connect(store: AppStore, ctx: AppContext) {
    // A backoff reconnect scheduled earlier must not fire later and tear
    // down the connection made here
    cancel_reconnect();
    close_stream();

    let source = match EventSource::new(EVENTS_URL) {
        Ok(source) => source,
        Err(err) => {
            web_sys::console::warn_1(&format!("[SYNC] subscribe failed: {err:?}").into());
            schedule_reconnect(store, ctx);
            return;
        }
    };

    let on_open = Closure::<dyn FnMut()>::new(move || {
        log("connected");
        ATTEMPT.with(|a| a.set(0));
        LAST_EVENT_MS.with(|t| t.set(js_sys::Date::now()));
        ctx.set_connected(true);
    });
    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
        LAST_EVENT_MS.with(|t| t.set(js_sys::Date::now()));
        if let Some(text) = ev.data().as_string() {
            handle_payload(store, ctx, &text);
        }
    });
    let on_error = Closure::<dyn FnMut()>::new(move || {
        log("stream error");
        ctx.set_connected(false);
        // Close the transport but keep the handle alive: dropping it here
        // would free this very closure mid-call. The next connect replaces it.
        STREAM.with(|slot| {
            if let Some(handle) = slot.borrow().as_ref() {
                handle.source.close();
            }
        });
        schedule_reconnect(store, ctx);
    });

    source.set_onopen(Some(on_open.as_ref().unchecked_ref()));
    source.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    source.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    STREAM.with(|slot| {
        *slot.borrow_mut() = Some(StreamHandle {
            source,
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
        });
    });
}

fn handle_payload(store: AppStore, ctx: AppContext, text: &str) {
    let event: SyncEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(err) => {
            web_sys::console::warn_1(&format!("[SYNC] bad event payload: {err}").into());
            return;
        }
    };

    if event == SyncEvent::Ping {
        return;
    }

    let local_id = session::client_id();
    if event.origin() == Some(local_id.as_str()) {
        return;
    }

    let mut items = store.items().get_untracked();
    let mut list_name = store.list_name().get_untracked();
    let outcome = reconcile::apply(&mut items, &mut list_name, &local_id, event);
    match outcome {
        Outcome::Applied(notice) => {
            store.items().set(items);
            store.list_name().set(list_name);
            if let Some(notice) = notice {
                ctx.notify(notice.text);
            }
        }
        Outcome::Resync(reason) => {
            log(&format!("drift detected ({reason}), resyncing"));
            spawn_local(async move {
                pipeline::resync(store, ctx).await;
            });
        }
        Outcome::SelfEcho | Outcome::Ignored => {}
    }
}

fn schedule_reconnect(store: AppStore, ctx: AppContext) {
    if !api::is_online() {
        // The online handler reconnects immediately with a fresh counter
        ATTEMPT.with(|a| a.set(0));
        return;
    }

    let attempt = ATTEMPT.with(|a| {
        let n = a.get();
        a.set(n + 1);
        n
    });
    let delay = backoff_delay_ms(attempt);
    log(&format!("reconnecting in {delay}ms (attempt {})", attempt + 1));

    let generation = RECONNECT_GENERATION.with(Cell::get);
    spawn_local(async move {
        TimeoutFuture::new(delay as u32).await;
        if RECONNECT_GENERATION.with(Cell::get) != generation {
            return;
        }
        connect(store, ctx);
    });
}

fn spawn_health_loop(store: AppStore, ctx: AppContext) {
    let generation = TASK_GENERATION.with(Cell::get);
    spawn_local(async move {
        loop {
            TimeoutFuture::new(HEALTH_CHECK_INTERVAL_MS).await;
            if TASK_GENERATION.with(Cell::get) != generation {
                break;
            }
            if !api::is_online() {
                continue;
            }
            let has_stream = STREAM.with(|slot| slot.borrow().is_some());
            let last = LAST_EVENT_MS.with(Cell::get);
            if has_stream && is_stale(last, js_sys::Date::now()) {
                // Some transports die without firing onerror
                log("stream stale, forcing reconnect");
                ctx.set_connected(false);
                connect(store, ctx);
            }
        }
    });
}

fn spawn_refresh_loop(store: AppStore, ctx: AppContext) {
    let generation = TASK_GENERATION.with(Cell::get);
    spawn_local(async move {
        loop {
            TimeoutFuture::new(FULL_REFRESH_INTERVAL_MS).await;
            if TASK_GENERATION.with(Cell::get) != generation {
                break;
            }
            log("hourly refresh");
            pipeline::resync(store, ctx).await;
        }
    });
}

/// One debounced funnel for every "the tab may have been asleep" signal:
/// make sure the stream is open, then refetch. Coalesces the burst of
/// visibility/focus/pageshow/online events browsers fire together.
fn ensure_fresh(store: AppStore, ctx: AppContext) {
    cancel_wake();
    let generation = WAKE_GENERATION.with(Cell::get);
    spawn_local(async move {
        TimeoutFuture::new(WAKE_DEBOUNCE_MS).await;
        if WAKE_GENERATION.with(Cell::get) != generation {
            return;
        }
        let closed = STREAM.with(|slot| {
            slot.borrow()
                .as_ref()
                .map_or(true, |h| h.source.ready_state() == EventSource::CLOSED)
        });
        let plan = wake_plan(STARTED.with(Cell::get), closed);
        if plan.restart_loops {
            // Restored from the back/forward cache after shutdown; the
            // listeners are still bound, only the loops need reviving
            STARTED.with(|s| s.set(true));
            spawn_health_loop(store, ctx);
            spawn_refresh_loop(store, ctx);
        }
        if plan.reconnect {
            ATTEMPT.with(|a| a.set(0));
            connect(store, ctx);
        }
        pipeline::resync(store, ctx).await;
    });
}

fn bind_window_listeners(store: AppStore, ctx: AppContext) {
    let Some(window) = web_sys::window() else { return };

    let on_online = Closure::<dyn FnMut()>::new(move || {
        log("back online");
        ATTEMPT.with(|a| a.set(0));
        ensure_fresh(store, ctx);
    });
    let on_offline = Closure::<dyn FnMut()>::new(move || {
        log("offline");
        cancel_reconnect();
        cancel_wake();
        ATTEMPT.with(|a| a.set(0));
        close_stream();
        ctx.set_connected(false);
    });
    let on_wake = Closure::<dyn FnMut()>::new(move || {
        let visible = web_sys::window()
            .and_then(|w| w.document())
            .map(|d| d.visibility_state() == web_sys::VisibilityState::Visible)
            .unwrap_or(true);
        if visible && api::is_online() {
            ensure_fresh(store, ctx);
        }
    });
    let on_pagehide = Closure::<dyn FnMut()>::new(move || {
        shutdown(ctx);
    });

    let _ = window.add_event_listener_with_callback("online", on_online.as_ref().unchecked_ref());
    let _ = window.add_event_listener_with_callback("offline", on_offline.as_ref().unchecked_ref());
    let _ = window.add_event_listener_with_callback("focus", on_wake.as_ref().unchecked_ref());
    let _ = window.add_event_listener_with_callback("pageshow", on_wake.as_ref().unchecked_ref());
    if let Some(document) = window.document() {
        let _ = document
            .add_event_listener_with_callback("visibilitychange", on_wake.as_ref().unchecked_ref());
    }
    let _ = window.add_event_listener_with_callback("pagehide", on_pagehide.as_ref().unchecked_ref());

    on_online.forget();
    on_offline.forget();
    on_wake.forget();
    on_pagehide.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_from_one_second_to_sixty_cap() {
        let delays: Vec<u64> = (0..8).map(backoff_delay_ms).collect();
        assert_eq!(delays, [1_000, 2_000, 4_000, 8_000, 16_000, 32_000, 60_000, 60_000]);
    }

    #[test]
    fn backoff_restarts_at_one_second_after_reset() {
        // A successful open or an offline->online transition resets the
        // attempt counter to zero
        assert_eq!(backoff_delay_ms(0), 1_000);
    }

    #[test]
    fn staleness_threshold_is_sixty_seconds() {
        assert!(!is_stale(0.0, 60_000.0));
        assert!(is_stale(0.0, 60_001.0));
        assert!(!is_stale(100_000.0, 130_000.0));
    }

    #[test]
    fn wake_after_teardown_revives_loops_and_stream() {
        // Tab restored from the back/forward cache: pagehide tore everything
        // down, so the watchdog and hourly refresh must come back too
        let plan = wake_plan(false, true);
        assert!(plan.restart_loops);
        assert!(plan.reconnect);
    }

    #[test]
    fn wake_with_live_stream_only_refreshes() {
        let plan = wake_plan(true, false);
        assert!(!plan.restart_loops);
        assert!(!plan.reconnect);
    }

    #[test]
    fn wake_with_dead_stream_reconnects_without_touching_loops() {
        let plan = wake_plan(true, true);
        assert!(!plan.restart_loops);
        assert!(plan.reconnect);
    }
}
