//! Client Session Identity
//!
//! One identifier per tab, generated on first use and never persisted.
//! Outgoing mutations carry it so the server can tag its broadcasts, and the
//! sync layer uses it to drop echoes of this tab's own actions. A collision
//! between two tabs is astronomically unlikely and degrades to one dropped
//! peer event, so no stronger uniqueness is needed.

use std::cell::RefCell;

thread_local! {
    static CLIENT_ID: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// This tab's client id, generating it on first call
pub fn client_id() -> String {
    CLIENT_ID.with(|cell| {
        cell.borrow_mut()
            .get_or_insert_with(generate_id)
            .clone()
    })
}

fn generate_id() -> String {
    let millis = js_sys::Date::now() as u64;
    let noise = (js_sys::Math::random() * f64::from(u32::MAX)) as u32;
    format!("tab-{millis:x}-{noise:08x}")
}
