//! Item Endpoints
//!
//! Request/response plumbing for the item collection.

use gloo_net::http::Request;
use serde::{Deserialize, Serialize};

use super::check_status;
use crate::models::Item;
use crate::session;

// ========================
// Request Bodies
// ========================

#[derive(Serialize)]
struct CreateItemBody<'a> {
    client_id: String,
    name: &'a str,
    quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_index: Option<i64>,
}

#[derive(Serialize)]
struct UpdateItemBody<'a> {
    client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

#[derive(Serialize)]
struct ClientIdBody {
    client_id: String,
}

#[derive(Serialize)]
struct ReorderBody {
    client_id: String,
    order_index: i64,
}

#[derive(Debug, Deserialize)]
pub struct ToggleResponse {
    pub id: i64,
    pub completed: bool,
}

// ========================
// Requests
// ========================

/// Fetch the full item collection (resync read)
pub async fn fetch_items() -> Result<Vec<Item>, String> {
    let resp = Request::get("/items").send().await.map_err(|e| e.to_string())?;
    check_status(&resp)?;
    resp.json::<Vec<Item>>().await.map_err(|e| e.to_string())
}

/// Create an item, optionally at an explicit 1-based order index
pub async fn create_item(name: &str, order_index: Option<i64>) -> Result<Item, String> {
    let body = CreateItemBody {
        client_id: session::client_id(),
        name,
        quantity: 1,
        order_index,
    };
    let resp = Request::post("/items")
        .json(&body)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    check_status(&resp)?;
    resp.json::<Item>().await.map_err(|e| e.to_string())
}

/// Rename an item (and/or force its completed flag)
pub async fn update_item(id: i64, name: Option<&str>, completed: Option<bool>) -> Result<Item, String> {
    let body = UpdateItemBody { client_id: session::client_id(), name, completed };
    let resp = Request::put(&format!("/items/{id}"))
        .json(&body)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    check_status(&resp)?;
    resp.json::<Item>().await.map_err(|e| e.to_string())
}

/// Flip an item's completed flag on the server
pub async fn toggle_item(id: i64) -> Result<ToggleResponse, String> {
    let body = ClientIdBody { client_id: session::client_id() };
    let resp = Request::patch(&format!("/items/{id}/toggle"))
        .json(&body)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    check_status(&resp)?;
    resp.json::<ToggleResponse>().await.map_err(|e| e.to_string())
}

/// Delete one item
pub async fn delete_item(id: i64) -> Result<(), String> {
    let url = format!("/items/{id}?client_id={}", session::client_id());
    let resp = Request::delete(&url).send().await.map_err(|e| e.to_string())?;
    check_status(&resp)
}

/// Move an item to an explicit 1-based order index
pub async fn reorder_item(id: i64, order_index: i64) -> Result<(), String> {
    let body = ReorderBody { client_id: session::client_id(), order_index };
    let resp = Request::put(&format!("/items/{id}/reorder"))
        .json(&body)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    check_status(&resp)
}

/// Clear the whole list
pub async fn clear_items() -> Result<(), String> {
    let url = format!("/items?client_id={}", session::client_id());
    let resp = Request::delete(&url).send().await.map_err(|e| e.to_string())?;
    check_status(&resp)
}
