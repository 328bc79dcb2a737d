//! List Endpoints
//!
//! Metadata for the shared list itself (currently just the title).

use gloo_net::http::Request;
use serde::Serialize;

use super::check_status;
use crate::models::ShoppingList;
use crate::session;

#[derive(Serialize)]
struct RenameListBody<'a> {
    client_id: String,
    name: &'a str,
}

/// Fetch list metadata (resync read)
pub async fn fetch_list() -> Result<ShoppingList, String> {
    let resp = Request::get("/list").send().await.map_err(|e| e.to_string())?;
    check_status(&resp)?;
    resp.json::<ShoppingList>().await.map_err(|e| e.to_string())
}

/// Rename the shared list
pub async fn rename_list(name: &str) -> Result<(), String> {
    let body = RenameListBody { client_id: session::client_id(), name };
    let resp = Request::put("/list")
        .json(&body)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    check_status(&resp)
}
