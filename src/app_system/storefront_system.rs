use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::catalog::CatalogService;
use crate::clients::CatalogClient;
use crate::config::StorefrontConfig;
use crate::coordinator::InventoryCoordinator;
use crate::error::StorefrontError;
use crate::gateway::PersistenceGateway;

/// The running storefront: the catalog actor plus the coordinator in front
/// of it.
///
/// Responsible for starting the actor, wiring the coordinator to the
/// gateway, and handling shutdown.
pub struct StorefrontSystem {
    pub coordinator: InventoryCoordinator,
    pub catalog_client: CatalogClient,
    handles: Vec<JoinHandle<()>>,
}

impl StorefrontSystem {
    /// Spawns the catalog actor with an empty catalog.
    pub fn new(config: &StorefrontConfig, gateway: Arc<dyn PersistenceGateway>) -> Self {
        let (catalog_service, catalog_client) = CatalogService::new(config.channel_capacity);
        let catalog_handle = tokio::spawn(catalog_service.run());

        let coordinator = InventoryCoordinator::new(catalog_client.clone(), gateway, config.low_stock_threshold);

        Self {
            coordinator,
            catalog_client,
            handles: vec![catalog_handle],
        }
    }

    /// Spawns the system and loads the catalog, order history and user
    /// profile from the gateway.
    pub async fn start(config: &StorefrontConfig, gateway: Arc<dyn PersistenceGateway>) -> Result<Self, StorefrontError> {
        let mut system = Self::new(config, gateway);

        let products = system.coordinator.fetch_products().await?;
        let orders = system.coordinator.load_orders().await;
        let has_user = system.coordinator.load_user().await.is_some();
        info!(products, orders, has_user, "Storefront started");

        Ok(system)
    }

    pub async fn shutdown(self) -> Result<(), StorefrontError> {
        info!("Shutting down system...");
        self.catalog_client.shutdown().await?;
        drop(self.coordinator);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Actor task failed");
                return Err(StorefrontError::Shutdown(e.to_string()));
            }
        }

        info!("System shutdown complete");
        Ok(())
    }
}
