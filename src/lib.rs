//! # Storefront
//!
//! Inventory and order core of a small mobile storefront: an in-memory
//! product catalog with a single in-progress order whose reservations are
//! taken out of stock as they are made, a coordinator that keeps sorted and
//! projected views fresh for the UI, and flat-file persistence behind a
//! gateway trait.
//!
//! ## Layout
//!
//! - [`domain`] - products, orders, user profile and their ids
//! - [`catalog`] - the catalog store and the actor that serializes access to it
//! - [`messages`] / [`clients`] - typed requests and the client handle that sends them
//! - [`projection`] - order lines, totals and price formatting
//! - [`coordinator`] - the facade the UI layer talks to
//! - [`gateway`] - persistence: CSV files or in-memory
//! - [`app_system`] - startup, shutdown and tracing setup
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let config = StorefrontConfig::from_env()?;
//! let gateway = Arc::new(CsvGateway::new(config.data_dir.clone()));
//! let mut system = StorefrontSystem::start(&config, gateway).await?;
//!
//! let products = system.coordinator.sort_products_by_price_asc().await?.to_vec();
//! system.coordinator.add_to_order(&products[0]).await?;
//! let order = system.coordinator.confirm_checkout().await?;
//!
//! system.shutdown().await?;
//! ```

pub mod app_system;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod messages;
pub mod projection;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod mock_framework;

pub use app_system::{setup_tracing, StorefrontSystem};
pub use config::StorefrontConfig;
pub use coordinator::InventoryCoordinator;
pub use error::{CatalogError, ConfigError, GatewayError, StorefrontError};
