//! View Components
//!
//! Pure projections of the store; all state lives in `store`/`context` and
//! every mutation goes through the pipeline.

mod item_row;
mod list_title;
mod new_item_form;
mod status_bar;

pub use item_row::ItemRow;
pub use list_title::ListTitle;
pub use new_item_form::NewItemForm;
pub use status_bar::StatusBar;
