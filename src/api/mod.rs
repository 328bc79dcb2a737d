//! CRUD API Bindings
//!
//! Frontend bindings to the backend HTTP API, organized by domain. Every
//! mutating request carries this tab's client id so the server can tag the
//! broadcast it emits, letting the sync layer drop our own echoes.

mod items;
mod list;

use gloo_net::http::Response;

// Re-export all public items
pub use items::*;
pub use list::*;

/// Map a non-2xx response to a `Result<_, String>` error
pub(crate) fn check_status(resp: &Response) -> Result<(), String> {
    if resp.ok() {
        Ok(())
    } else {
        Err(format!("HTTP {} {}", resp.status(), resp.status_text()))
    }
}

/// Whether the browser currently reports a network connection
pub fn is_online() -> bool {
    web_sys::window().map_or(true, |w| w.navigator().on_line())
}
