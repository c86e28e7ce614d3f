use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn, Instrument};

use storefront::gateway::CsvGateway;
use storefront::projection::format_price;
use storefront::{setup_tracing, StorefrontConfig, StorefrontError, StorefrontSystem};

#[tokio::main]
async fn main() -> Result<(), StorefrontError> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = StorefrontConfig::from_env()?;
    info!(data_dir = %config.data_dir.display(), "Starting storefront");

    let gateway = Arc::new(CsvGateway::new(config.data_dir.clone()));
    let mut system = StorefrontSystem::start(&config, gateway).await?;

    if system.catalog_client.get_all_products().await?.is_empty() {
        info!("Empty catalog, adding a demo product");
        system
            .coordinator
            .add_new_product("Demo Mug", "Ceramic, 350 ml", Decimal::new(1299, 2), 10)
            .await?;
    }

    let span = tracing::info_span!("browse");
    let cheapest = async {
        let products = system.coordinator.sort_products_by_price_asc().await?;
        for product in products {
            info!(name = %product.name, price = %format_price(product.price), stock = product.stock_level, "Product");
        }
        Ok::<_, StorefrontError>(products.first().cloned())
    }
    .instrument(span)
    .await?;

    for product in system.coordinator.low_stock_products().await? {
        warn!(name = %product.name, stock = product.stock_level, "Low stock");
    }

    let span = tracing::info_span!("checkout");
    async {
        let Some(product) = cheapest.as_ref() else {
            info!("Nothing to buy");
            return Ok::<_, StorefrontError>(());
        };
        if !system.coordinator.add_to_order(product).await? {
            warn!(name = %product.name, "Out of stock");
            return Ok(());
        }
        info!(total = %format_price(system.coordinator.get_current_order_total()), "Cart ready");

        if let Some(order) = system.coordinator.confirm_checkout().await? {
            info!(order_id = %order.id, total = %format_price(order.total_price), "Order placed");
        }
        Ok(())
    }
    .instrument(span)
    .await?;

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
