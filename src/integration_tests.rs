#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use crate::app_system::StorefrontSystem;
    use crate::config::StorefrontConfig;
    use crate::coordinator::InventoryCoordinator;
    use crate::domain::{Product, ProductId};
    use crate::gateway::{CsvGateway, InMemoryGateway, PersistenceGateway};
    use crate::mock_framework::{create_mock_catalog, expect_add_to_order, expect_get_current_order};
    use crate::projection::{format_price, OrderLine};

    fn product(name: &str, price: Decimal, stock: u32) -> Product {
        Product::new(ProductId::new(), name, "", price, stock)
    }

    async fn start_with(products: Vec<Product>) -> StorefrontSystem {
        let gateway = Arc::new(InMemoryGateway::with_products(products));
        StorefrontSystem::start(&StorefrontConfig::default(), gateway).await.unwrap()
    }

    async fn stock_of(system: &StorefrontSystem, id: ProductId) -> u32 {
        system.catalog_client.get_product(id).await.unwrap().unwrap().stock_level
    }

    #[tokio::test]
    async fn reserve_override_and_release_flow() {
        let p = product("P", Decimal::new(5000, 2), 10);
        let mut system = start_with(vec![p.clone()]).await;

        assert!(system.coordinator.add_to_order(&p).await.unwrap());
        assert!(system.coordinator.add_to_order(&p).await.unwrap());
        let order = system.coordinator.current_order();
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].quantity, 2);
        assert_eq!(stock_of(&system, p.id).await, 8);

        // Stock-blind override: stock is untouched.
        assert!(system.coordinator.override_order_quantity(p.id, 1).await.unwrap());
        assert_eq!(system.coordinator.current_order()[0].quantity, 1);
        assert_eq!(stock_of(&system, p.id).await, 8);

        // Removal returns whatever is currently held, which is 1 unit.
        assert_eq!(system.coordinator.remove_product_from_order(p.id).await.unwrap(), 1);
        assert!(system.coordinator.current_order().is_empty());
        assert_eq!(stock_of(&system, p.id).await, 9);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn bulk_reservation_beyond_stock_is_rejected() {
        let q = product("Q", Decimal::new(10000, 2), 1);
        let mut system = start_with(vec![q.clone()]).await;

        assert!(!system.coordinator.add_quantity_to_current_order(q.id, 2).await.unwrap());

        assert!(system.coordinator.current_order().is_empty());
        assert_eq!(stock_of(&system, q.id).await, 1);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn single_unit_add_noops_when_exhausted() {
        let q = product("Q", Decimal::new(10000, 2), 1);
        let mut system = start_with(vec![q.clone()]).await;

        assert!(system.coordinator.add_to_order(&q).await.unwrap());
        assert!(!system.coordinator.add_to_order(&q).await.unwrap());

        assert_eq!(system.coordinator.current_order()[0].quantity, 1);
        assert_eq!(stock_of(&system, q.id).await, 0);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn catalog_keeps_serving_after_overflowing_reservation() {
        let p = product("P", Decimal::ONE, 5);
        let mut system = start_with(vec![p.clone()]).await;

        assert!(system.coordinator.override_order_quantity(p.id, u32::MAX).await.unwrap());
        assert!(!system.coordinator.add_to_order(&p).await.unwrap());
        assert!(!system.coordinator.add_quantity_to_current_order(p.id, 2).await.unwrap());

        assert_eq!(stock_of(&system, p.id).await, 5);
        assert_eq!(system.coordinator.current_order()[0].quantity, u32::MAX);
        assert_eq!(
            system.coordinator.get_current_order_total(),
            Decimal::from(u32::MAX)
        );

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn order_total_sums_lines() {
        let p = product("P", Decimal::new(50, 0), 5);
        let q = product("Q", Decimal::new(100, 0), 5);
        let mut system = start_with(vec![p.clone(), q.clone()]).await;

        system.coordinator.add_to_order(&p).await.unwrap();
        system.coordinator.add_to_order(&q).await.unwrap();

        let total = system.coordinator.get_current_order_total();
        assert_eq!(total, Decimal::new(150, 0));
        assert_eq!(format_price(total), "150.00");

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn alphabetical_sort_ignores_case() {
        let mut system = start_with(vec![
            product("Banana", Decimal::ONE, 1),
            product("apple", Decimal::ONE, 1),
            product("Cherry", Decimal::ONE, 1),
        ])
        .await;

        let names: Vec<String> = system
            .coordinator
            .sort_products_alphabetically_asc()
            .await
            .unwrap()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, ["apple", "Banana", "Cherry"]);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn order_never_lists_removed_products() {
        let p = product("P", Decimal::new(5, 0), 5);
        let q = product("Q", Decimal::new(7, 0), 5);
        let mut system = start_with(vec![p.clone(), q.clone()]).await;
        system.coordinator.add_to_order(&p).await.unwrap();
        system.coordinator.add_to_order(&q).await.unwrap();

        system.coordinator.remove_product_by_id(p.id).await.unwrap();

        let ids: Vec<ProductId> = system.coordinator.current_order().iter().map(|l| l.product.id).collect();
        assert_eq!(ids, [q.id]);
        assert_eq!(system.coordinator.get_current_order_total(), Decimal::new(7, 0));

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn checkout_survives_restart_on_flat_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig {
            data_dir: dir.path().to_path_buf(),
            ..StorefrontConfig::default()
        };
        let seed = product("Mug, \"large\"", Decimal::new(1250, 2), 6);
        CsvGateway::new(dir.path()).save_products(&[seed.clone()]).unwrap();

        let mut system = StorefrontSystem::start(&config, Arc::new(CsvGateway::new(dir.path()))).await.unwrap();
        system.coordinator.update_order_quantity(seed.id, 4).await.unwrap();
        let order = system.coordinator.confirm_checkout().await.unwrap().unwrap();
        system.shutdown().await.unwrap();

        let mut system = StorefrontSystem::start(&config, Arc::new(CsvGateway::new(dir.path()))).await.unwrap();
        let reloaded = system.catalog_client.get_product(seed.id).await.unwrap().unwrap();
        assert_eq!(reloaded.name, seed.name);
        assert_eq!(reloaded.stock_level, 2);

        let history = system.coordinator.orders();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, order.id);
        assert_eq!(history[0].product_quantity(&seed.id), 4);
        assert_eq!(history[0].total_price, Decimal::new(5000, 2));
        assert!(history[0].is_fulfilled());

        // Stock for a checked-out order was taken at checkout, also across restarts.
        assert!(!system.coordinator.finalize_order(&history[0]).await.unwrap());
        assert_eq!(stock_of(&system, seed.id).await, 2);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn add_to_order_republishes_catalog_projection() {
        let (client, mut receiver) = create_mock_catalog(4);
        let mut coordinator = InventoryCoordinator::new(client, Arc::new(InMemoryGateway::new()), 3);
        let p = product("P", Decimal::new(3, 0), 2);
        let line = OrderLine { product: p.clone(), quantity: 1 };
        let expected = vec![line.clone()];

        let task = tokio::spawn(async move {
            let reserved = coordinator.add_to_order(&p).await;
            (reserved, coordinator.current_order())
        });

        let (_, responder) = expect_add_to_order(&mut receiver).await.expect("Expected AddToOrder request");
        responder.send(true).unwrap();
        let responder = expect_get_current_order(&mut receiver).await.expect("Expected GetCurrentOrder request");
        responder.send(vec![line]).unwrap();

        let (reserved, order) = task.await.unwrap();
        assert_eq!(reserved, Ok(true));
        assert_eq!(order, expected);
    }
}
