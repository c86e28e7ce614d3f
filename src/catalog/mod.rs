//! Catalog store and the actor that serializes access to it.

mod service;
mod store;

pub use service::CatalogService;
pub use store::{CatalogStore, DEFAULT_LOW_STOCK_THRESHOLD};
