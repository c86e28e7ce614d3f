use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::CatalogStore;
use crate::clients::CatalogClient;
use crate::domain::{Product, ProductId, ProductPatch};
use crate::messages::{CatalogRequest, ServiceResponse};

/// Actor that owns the [`CatalogStore`].
///
/// Every request, reads included, is handled to completion before the next
/// one is taken off the queue, so each operation is atomic and readers never
/// see a partial update.
pub struct CatalogService {
    receiver: mpsc::Receiver<CatalogRequest>,
    store: CatalogStore,
}

impl CatalogService {
    pub fn new(buffer_size: usize) -> (Self, CatalogClient) {
        Self::with_store(buffer_size, CatalogStore::new())
    }

    pub fn with_store(buffer_size: usize, store: CatalogStore) -> (Self, CatalogClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self { receiver, store };
        let client = CatalogClient::new(sender);
        (service, client)
    }

    #[instrument(name = "catalog_service", skip(self))]
    pub async fn run(mut self) {
        info!("CatalogService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CatalogRequest::AddProduct { product, respond_to } => {
                    self.handle_add_product(product, respond_to);
                }
                CatalogRequest::LoadCatalog { products, respond_to } => {
                    self.handle_load_catalog(products, respond_to);
                }
                CatalogRequest::RemoveProduct { id, respond_to } => {
                    self.handle_remove_product(id, respond_to);
                }
                CatalogRequest::UpdateProduct { id, patch, respond_to } => {
                    self.handle_update_product(id, patch, respond_to);
                }
                CatalogRequest::GetProduct { id, respond_to } => {
                    let _ = respond_to.send(self.store.get_product(&id));
                }
                CatalogRequest::GetAllProducts { respond_to } => {
                    let _ = respond_to.send(self.store.get_all_products());
                }
                CatalogRequest::LowStockProducts { threshold, respond_to } => {
                    let products = self.store.low_stock_products(threshold);
                    debug!(threshold, count = products.len(), "Low stock products listed");
                    let _ = respond_to.send(products);
                }
                CatalogRequest::AddToOrder { id, respond_to } => {
                    self.handle_add_to_order(id, respond_to);
                }
                CatalogRequest::AddQuantityToOrder { id, quantity, respond_to } => {
                    self.handle_add_quantity_to_order(id, quantity, respond_to);
                }
                CatalogRequest::UpdateOrder { id, quantity, respond_to } => {
                    self.handle_update_order(id, quantity, respond_to);
                }
                CatalogRequest::RemoveFromOrder { id, respond_to } => {
                    self.handle_remove_from_order(id, respond_to);
                }
                CatalogRequest::UpdateOrderQuantity { id, quantity, respond_to } => {
                    self.handle_update_order_quantity(id, quantity, respond_to);
                }
                CatalogRequest::ClearReservations { respond_to } => {
                    let dropped = self.store.clear_reservations();
                    info!(dropped, "Reservations cleared");
                    let _ = respond_to.send(dropped);
                }
                CatalogRequest::ConsumeStock { id, units, respond_to } => {
                    self.handle_consume_stock(id, units, respond_to);
                }
                CatalogRequest::GetReservations { respond_to } => {
                    let _ = respond_to.send(self.store.reservations());
                }
                CatalogRequest::GetCurrentOrder { respond_to } => {
                    let _ = respond_to.send(self.store.get_current_order());
                }
                CatalogRequest::Shutdown => {
                    info!("CatalogService shutting down");
                    break;
                }
            }
        }

        info!("CatalogService stopped");
    }

    #[instrument(fields(product_id = %product.id, product_name = %product.name), skip(self, product, respond_to))]
    fn handle_add_product(&mut self, product: Product, respond_to: ServiceResponse<Option<Product>>) {
        let previous = self.store.add_product(product);
        match &previous {
            Some(_) => info!("Product replaced"),
            None => info!("Product added"),
        }
        let _ = respond_to.send(previous);
    }

    #[instrument(fields(count = products.len()), skip(self, products, respond_to))]
    fn handle_load_catalog(&mut self, products: Vec<Product>, respond_to: ServiceResponse<Option<usize>>) {
        if self.store.has_active_order() {
            warn!("Catalog load refused: an order is in progress");
            let _ = respond_to.send(None);
            return;
        }

        let count = products.len();
        for product in products {
            self.store.add_product(product);
        }
        info!(catalog_size = self.store.len(), "Catalog loaded");
        let _ = respond_to.send(Some(count));
    }

    #[instrument(fields(product_id = %id), skip(self, respond_to))]
    fn handle_remove_product(&mut self, id: ProductId, respond_to: ServiceResponse<Option<Product>>) {
        let removed = self.store.remove_product(&id);
        match &removed {
            Some(product) => info!(product_name = %product.name, "Product removed"),
            None => debug!("Product not found"),
        }
        let _ = respond_to.send(removed);
    }

    #[instrument(fields(product_id = %id), skip(self, patch, respond_to))]
    fn handle_update_product(
        &mut self,
        id: ProductId,
        patch: ProductPatch,
        respond_to: ServiceResponse<Option<Product>>,
    ) {
        let updated = self.store.update_product(&id, patch);
        match &updated {
            Some(product) => info!(product_name = %product.name, price = %product.price, stock_level = product.stock_level, "Product updated"),
            None => debug!("Product not found"),
        }
        let _ = respond_to.send(updated);
    }

    #[instrument(fields(product_id = %id), skip(self, respond_to))]
    fn handle_add_to_order(&mut self, id: ProductId, respond_to: ServiceResponse<bool>) {
        let reserved = self.store.add_to_order(&id);
        if reserved {
            info!(reserved = self.store.reserved_quantity(&id), "Unit reserved");
        } else {
            debug!("Product unknown or out of stock");
        }
        let _ = respond_to.send(reserved);
    }

    #[instrument(fields(product_id = %id), skip(self, respond_to))]
    fn handle_add_quantity_to_order(&mut self, id: ProductId, quantity: u32, respond_to: ServiceResponse<bool>) {
        let reserved = self.store.add_quantity_to_order(&id, quantity);
        if reserved {
            info!(reserved = self.store.reserved_quantity(&id), "Stock reserved successfully");
        } else {
            let available = self.store.get_product(&id).map(|p| p.stock_level);
            warn!(requested = quantity, ?available, "Insufficient stock");
        }
        let _ = respond_to.send(reserved);
    }

    #[instrument(fields(product_id = %id), skip(self, respond_to))]
    fn handle_update_order(&mut self, id: ProductId, quantity: u32, respond_to: ServiceResponse<Option<u32>>) {
        let held = self.store.update_order(&id, quantity);
        match held {
            Some(held) if held < quantity => {
                warn!(held, "Reservation clamped to available stock")
            }
            Some(held) => info!(held, "Reservation updated"),
            None => debug!("Product not found"),
        }
        let _ = respond_to.send(held);
    }

    #[instrument(fields(product_id = %id), skip(self, respond_to))]
    fn handle_remove_from_order(&mut self, id: ProductId, respond_to: ServiceResponse<u32>) {
        let released = self.store.remove_from_order(&id);
        info!(released, "Reservation released");
        let _ = respond_to.send(released);
    }

    #[instrument(fields(product_id = %id), skip(self, respond_to))]
    fn handle_update_order_quantity(&mut self, id: ProductId, quantity: u32, respond_to: ServiceResponse<bool>) {
        let updated = self.store.update_order_quantity(&id, quantity);
        if updated {
            info!("Reservation overridden without stock change");
        } else {
            debug!("Product not found");
        }
        let _ = respond_to.send(updated);
    }

    #[instrument(fields(product_id = %id), skip(self, respond_to))]
    fn handle_consume_stock(&mut self, id: ProductId, units: u32, respond_to: ServiceResponse<Option<u32>>) {
        let remaining = self.store.consume_stock(&id, units);
        match remaining {
            Some(remaining) => info!(remaining, "Stock consumed"),
            None => debug!("Product not found"),
        }
        let _ = respond_to.send(remaining);
    }
}
