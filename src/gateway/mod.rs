//! Persistence gateway: load/save of flat-record snapshots.
//!
//! Loads never fail. A missing or unreadable source is an empty result and a
//! malformed record is skipped with a warning. Saves overwrite the whole
//! snapshot and report I/O failures; callers treat them as best effort.

mod csv;
mod memory;

use std::collections::HashMap;

pub use self::csv::CsvGateway;
pub use self::memory::InMemoryGateway;

use crate::domain::{Order, OrderId, Product, User};
use crate::error::GatewayError;

pub trait PersistenceGateway: Send + Sync {
    fn load_products(&self) -> Vec<Product>;
    fn save_products(&self, products: &[Product]) -> Result<(), GatewayError>;

    fn load_orders(&self) -> HashMap<OrderId, Order>;
    fn save_orders(&self, orders: &[Order]) -> Result<(), GatewayError>;

    fn load_user(&self) -> Option<User>;
    fn save_user(&self, user: &User) -> Result<(), GatewayError>;
}
