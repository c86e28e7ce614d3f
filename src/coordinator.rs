//! Inventory coordinator: the facade consumed by the UI layer.
//!
//! Holds the session's derived state (sorted catalog view, current order
//! snapshot, loading flag, order history, user profile) and keeps it fresh
//! after every mutating call. Catalog state itself lives in the catalog actor.

use std::collections::HashMap;
use std::sync::Arc;

use icu_collator::{Collator, CollatorOptions, Strength};
use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::clients::CatalogClient;
use crate::domain::{Order, OrderId, OrderStatus, Product, ProductCreate, ProductId, ProductPatch, User, UserPatch};
use crate::error::{CatalogError, GatewayError};
use crate::gateway::PersistenceGateway;
use crate::projection::{self, OrderLine};

pub struct InventoryCoordinator {
    catalog: CatalogClient,
    gateway: Arc<dyn PersistenceGateway>,
    low_stock_threshold: i64,
    sorted_products: Vec<Product>,
    current_order: watch::Sender<Vec<OrderLine>>,
    loading: watch::Sender<bool>,
    orders: HashMap<OrderId, Order>,
    user: Option<User>,
}

impl InventoryCoordinator {
    pub fn new(catalog: CatalogClient, gateway: Arc<dyn PersistenceGateway>, low_stock_threshold: i64) -> Self {
        let (current_order, _) = watch::channel(Vec::new());
        let (loading, _) = watch::channel(false);
        Self {
            catalog,
            gateway,
            low_stock_threshold,
            sorted_products: Vec::new(),
            current_order,
            loading,
            orders: HashMap::new(),
            user: None,
        }
    }

    // -------------------------------------------------------------------------
    // Observation
    // -------------------------------------------------------------------------

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// `true` while a catalog load is in flight.
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Receives the current order projection after every change.
    pub fn subscribe_order(&self) -> watch::Receiver<Vec<OrderLine>> {
        self.current_order.subscribe()
    }

    pub fn current_order(&self) -> Vec<OrderLine> {
        self.current_order.borrow().clone()
    }

    /// The view computed by the last `sort_products_*` call.
    pub fn sorted_products(&self) -> &[Product] {
        &self.sorted_products
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    // -------------------------------------------------------------------------
    // Catalog management
    // -------------------------------------------------------------------------

    /// Loads the catalog through the gateway and inserts every product.
    ///
    /// Only valid before an order exists: while reservations are held the
    /// load is refused and `Ok(0)` is returned.
    #[instrument(skip(self))]
    pub async fn fetch_products(&mut self) -> Result<usize, CatalogError> {
        self.loading.send_replace(true);
        let result = self.load_catalog().await;
        self.loading.send_replace(false);

        let loaded = result?;
        self.refresh_current_order().await?;
        Ok(loaded)
    }

    async fn load_catalog(&self) -> Result<usize, CatalogError> {
        if self.catalog.has_active_order().await? {
            warn!("Catalog reload skipped: an order is in progress");
            return Ok(0);
        }

        let products = match blocking(&self.gateway, |gateway| Ok(gateway.load_products())).await {
            Ok(products) => products,
            Err(e) => {
                error!(error = %e, "Catalog load failed");
                Vec::new()
            }
        };

        match self.catalog.load_catalog(products).await? {
            Some(count) => {
                info!(count, "Products fetched");
                Ok(count)
            }
            None => Ok(0),
        }
    }

    #[instrument(skip(self, description))]
    pub async fn add_new_product(
        &mut self,
        name: &str,
        description: &str,
        price: Decimal,
        stock_level: u32,
    ) -> Result<ProductId, CatalogError> {
        let id = ProductId::new();
        let product = Product::from_create(
            id,
            ProductCreate {
                name: name.to_string(),
                description: description.to_string(),
                price,
                stock_level,
            },
        );
        self.catalog.add_product(product).await?;
        info!(product_id = %id, "New product added");

        self.persist_products().await?;
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn remove_product_by_id(&mut self, id: ProductId) -> Result<bool, CatalogError> {
        if self.catalog.remove_product(id).await?.is_none() {
            debug!("Product not found");
            return Ok(false);
        }

        self.persist_products().await?;
        self.refresh_current_order().await?;
        Ok(true)
    }

    /// Changes only the fields present in `patch`. Unknown ids are a no-op.
    #[instrument(skip(self))]
    pub async fn update_product_information(
        &mut self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, CatalogError> {
        let Some(updated) = self.catalog.update_product(id, patch).await? else {
            debug!("Product not found");
            return Ok(None);
        };

        self.persist_products().await?;
        self.refresh_current_order().await?;
        Ok(Some(updated))
    }

    pub async fn low_stock_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.catalog.low_stock_products(self.low_stock_threshold).await
    }

    // -------------------------------------------------------------------------
    // Current order
    // -------------------------------------------------------------------------

    /// Reserves one unit of `product`. Returns `false` when it is out of
    /// stock or no longer in the catalog.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_to_order(&mut self, product: &Product) -> Result<bool, CatalogError> {
        let reserved = self.catalog.add_to_order(product.id).await?;
        self.refresh_current_order().await?;
        Ok(reserved)
    }

    /// Reserves `quantity` units only if all of them are in stock.
    #[instrument(skip(self))]
    pub async fn add_quantity_to_current_order(
        &mut self,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, CatalogError> {
        let reserved = self.catalog.add_quantity_to_order(id, quantity).await?;
        self.refresh_current_order().await?;
        Ok(reserved)
    }

    /// Stock-aware quantity change. Returns the reservation actually held,
    /// which is lower than requested when stock runs out.
    #[instrument(skip(self))]
    pub async fn update_order_quantity(
        &mut self,
        id: ProductId,
        new_quantity: u32,
    ) -> Result<Option<u32>, CatalogError> {
        let held = self.catalog.update_order(id, new_quantity).await?;
        self.refresh_current_order().await?;
        Ok(held)
    }

    /// Stock-blind quantity change, for when stock was already adjusted
    /// elsewhere.
    #[instrument(skip(self))]
    pub async fn override_order_quantity(&mut self, id: ProductId, quantity: u32) -> Result<bool, CatalogError> {
        let updated = self.catalog.update_order_quantity(id, quantity).await?;
        self.refresh_current_order().await?;
        Ok(updated)
    }

    /// Drops the line and returns its reserved units to stock.
    #[instrument(skip(self))]
    pub async fn remove_product_from_order(&mut self, id: ProductId) -> Result<u32, CatalogError> {
        let released = self.catalog.remove_from_order(id).await?;
        self.refresh_current_order().await?;
        Ok(released)
    }

    /// Full-precision total of the cached order projection.
    pub fn get_current_order_total(&self) -> Decimal {
        projection::order_total(&self.current_order.borrow())
    }

    /// Forgets the cart. Reserved stock is NOT returned: it is considered
    /// consumed by the confirmed order.
    #[instrument(skip(self))]
    pub async fn clear_current_order(&mut self) -> Result<(), CatalogError> {
        self.catalog.clear_reservations().await?;
        self.current_order.send_replace(Vec::new());
        Ok(())
    }

    async fn refresh_current_order(&mut self) -> Result<(), CatalogError> {
        let lines = self.catalog.get_current_order().await?;
        debug!(lines = lines.len(), "Current order refreshed");
        self.current_order.send_replace(lines);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Sorted views
    // -------------------------------------------------------------------------

    pub async fn sort_products_alphabetically_asc(&mut self) -> Result<&[Product], CatalogError> {
        self.sort_products(SortOrder::NameAsc).await
    }

    pub async fn sort_products_alphabetically_desc(&mut self) -> Result<&[Product], CatalogError> {
        self.sort_products(SortOrder::NameDesc).await
    }

    pub async fn sort_products_by_price_asc(&mut self) -> Result<&[Product], CatalogError> {
        self.sort_products(SortOrder::PriceAsc).await
    }

    pub async fn sort_products_by_price_desc(&mut self) -> Result<&[Product], CatalogError> {
        self.sort_products(SortOrder::PriceDesc).await
    }

    /// Stable sort: ties keep catalog iteration order.
    async fn sort_products(&mut self, order: SortOrder) -> Result<&[Product], CatalogError> {
        let mut products = self.catalog.get_all_products().await?;
        match order {
            SortOrder::NameAsc => sort_by_name(&mut products, false),
            SortOrder::NameDesc => sort_by_name(&mut products, true),
            SortOrder::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        }
        self.sorted_products = products;
        Ok(&self.sorted_products)
    }

    // -------------------------------------------------------------------------
    // Order history
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn load_orders(&mut self) -> usize {
        self.orders = match blocking(&self.gateway, |gateway| Ok(gateway.load_orders())).await {
            Ok(orders) => orders,
            Err(e) => {
                error!(error = %e, "Order history load failed");
                HashMap::new()
            }
        };
        self.orders.len()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders.values().cloned().collect()
    }

    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    /// Records a historical order from a unit list. Ids missing from the
    /// catalog are dropped; the total uses current prices.
    #[instrument(skip(self, product_ids), fields(units = product_ids.len()))]
    pub async fn create_order(&mut self, product_ids: &[ProductId]) -> Result<OrderId, CatalogError> {
        let mut order = Order::new(OrderId::new());
        for id in product_ids {
            if let Some(product) = self.catalog.get_product(*id).await? {
                order.add_product(&product, 1);
            }
        }

        let id = order.id;
        info!(order_id = %id, total = %order.total_price, "Order created");
        self.orders.insert(id, order);
        self.persist_orders().await;
        Ok(id)
    }

    /// Adds `quantity` units to `order` if the catalog currently has that
    /// much stock. Stock is not consumed until the order is finalized.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn add_product_to_order(
        &self,
        order: &mut Order,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, CatalogError> {
        let Some(product) = self.catalog.get_product(id).await? else {
            debug!("Product not found");
            return Ok(false);
        };
        if product.stock_level < quantity {
            warn!(requested = quantity, available = product.stock_level, "Insufficient stock");
            return Ok(false);
        }

        if !order.add_product(&product, quantity) {
            warn!(requested = quantity, "Order line would overflow");
            return Ok(false);
        }
        Ok(true)
    }

    /// Takes a pending order's units out of stock, drops it from the history
    /// and persists both snapshots.
    ///
    /// Returns `false` without touching stock for orders that are already
    /// fulfilled, such as those recorded by [`confirm_checkout`](Self::confirm_checkout).
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn finalize_order(&mut self, order: &Order) -> Result<bool, CatalogError> {
        let recorded_fulfilled = self.orders.get(&order.id).is_some_and(Order::is_fulfilled);
        if order.is_fulfilled() || recorded_fulfilled {
            warn!("Order stock already consumed");
            return Ok(false);
        }

        for (id, units) in &order.items {
            if self.catalog.consume_stock(*id, *units).await?.is_none() {
                debug!(product_id = %id, "Product no longer in catalog");
            }
        }
        self.orders.remove(&order.id);
        info!("Order finalized");

        self.persist_products().await?;
        self.persist_orders().await;
        self.refresh_current_order().await?;
        Ok(true)
    }

    /// Confirms checkout: records the current cart as a fulfilled historical
    /// order and clears it. The reserved stock stays consumed.
    #[instrument(skip(self))]
    pub async fn confirm_checkout(&mut self) -> Result<Option<Order>, CatalogError> {
        self.refresh_current_order().await?;
        let lines = self.current_order();
        if lines.is_empty() {
            debug!("Nothing to check out");
            return Ok(None);
        }

        let mut order = Order::new(OrderId::new());
        for line in &lines {
            order.add_product(&line.product, line.quantity);
        }
        order.status = OrderStatus::Fulfilled;
        info!(order_id = %order.id, total = %projection::format_price(order.total_price), "Checkout confirmed");

        self.orders.insert(order.id, order.clone());
        self.clear_current_order().await?;
        self.persist_orders().await;
        self.persist_products().await?;
        Ok(Some(order))
    }

    // -------------------------------------------------------------------------
    // User profile
    // -------------------------------------------------------------------------

    pub async fn load_user(&mut self) -> Option<&User> {
        self.user = match blocking(&self.gateway, |gateway| Ok(gateway.load_user())).await {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, "User load failed");
                None
            }
        };
        self.user.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Edits and persists the profile. Returns `false` when no profile exists.
    #[instrument(skip(self, patch))]
    pub async fn update_user(&mut self, patch: UserPatch) -> bool {
        let Some(user) = self.user.as_mut() else {
            debug!("No user profile loaded");
            return false;
        };
        user.apply(patch);

        let snapshot = user.clone();
        if let Err(e) = blocking(&self.gateway, move |gateway| gateway.save_user(&snapshot)).await {
            warn!(error = %e, "Failed to persist user profile");
        }
        true
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Writes the full catalog snapshot. Gateway failures are logged only.
    async fn persist_products(&self) -> Result<(), CatalogError> {
        let products = self.catalog.get_all_products().await?;
        if let Err(e) = blocking(&self.gateway, move |gateway| gateway.save_products(&products)).await {
            warn!(error = %e, "Failed to persist products");
        }
        Ok(())
    }

    async fn persist_orders(&self) {
        let orders = self.orders();
        if let Err(e) = blocking(&self.gateway, move |gateway| gateway.save_orders(&orders)).await {
            warn!(error = %e, "Failed to persist orders");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SortOrder {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
}

/// Orders names with the root collation at secondary strength: case is
/// ignored, accents are not. Descending flips the comparison, so equal names
/// keep catalog order either way.
fn sort_by_name(products: &mut [Product], descending: bool) {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Secondary);
    let collator = match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(e) => {
            warn!(error = ?e, "Name collator unavailable, comparing lowercased names");
            None
        }
    };

    products.sort_by(|a, b| {
        let ordering = match &collator {
            Some(collator) => collator.compare(&a.name, &b.name),
            None => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        };
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

/// Runs blocking gateway I/O off the async workers.
async fn blocking<T, F>(gateway: &Arc<dyn PersistenceGateway>, task: F) -> Result<T, GatewayError>
where
    T: Send + 'static,
    F: FnOnce(&dyn PersistenceGateway) -> Result<T, GatewayError> + Send + 'static,
{
    let gateway = Arc::clone(gateway);
    tokio::task::spawn_blocking(move || task(gateway.as_ref()))
        .await
        .map_err(|e| GatewayError::TaskFailed(e.to_string()))?
}
