use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::domain::{Product, ProductId, ProductPatch};
use crate::error::CatalogError;
use crate::messages::CatalogRequest;
use crate::projection::OrderLine;

/// Generate client methods with oneshot channel boilerplate and automatic tracing.
/// A closed or dropped actor surfaces as [`CatalogError::ActorCommunicationError`].
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident) => {
        impl $client {
            #[instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, CatalogError> {
                debug!("Sending request");
                let (respond_to, response) = oneshot::channel();
                self.sender
                    .send($request::$variant {
                        $($param,)*
                        respond_to,
                    })
                    .await
                    .map_err(|_| CatalogError::ActorCommunicationError("Actor closed".to_string()))?;

                response
                    .await
                    .map_err(|_| CatalogError::ActorCommunicationError("Actor dropped".to_string()))
            }
        }
    };
}

/// Cloneable handle to the catalog actor.
#[derive(Clone)]
pub struct CatalogClient {
    sender: mpsc::Sender<CatalogRequest>,
}

impl CatalogClient {
    pub fn new(sender: mpsc::Sender<CatalogRequest>) -> Self {
        Self { sender }
    }

    /// Stops the actor once queued requests ahead of it are handled.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), CatalogError> {
        debug!("Sending shutdown request");
        self.sender
            .send(CatalogRequest::Shutdown)
            .await
            .map_err(|e| CatalogError::ActorCommunicationError(e.to_string()))
    }

    pub async fn has_active_order(&self) -> Result<bool, CatalogError> {
        Ok(!self.reservations().await?.is_empty())
    }
}

client_method!(CatalogClient => fn add_product(product: Product) -> Option<Product> as CatalogRequest::AddProduct);
client_method!(CatalogClient => fn load_catalog(products: Vec<Product>) -> Option<usize> as CatalogRequest::LoadCatalog);
client_method!(CatalogClient => fn remove_product(id: ProductId) -> Option<Product> as CatalogRequest::RemoveProduct);
client_method!(CatalogClient => fn update_product(id: ProductId, patch: ProductPatch) -> Option<Product> as CatalogRequest::UpdateProduct);
client_method!(CatalogClient => fn get_product(id: ProductId) -> Option<Product> as CatalogRequest::GetProduct);
client_method!(CatalogClient => fn get_all_products() -> Vec<Product> as CatalogRequest::GetAllProducts);
client_method!(CatalogClient => fn low_stock_products(threshold: i64) -> Vec<Product> as CatalogRequest::LowStockProducts);
client_method!(CatalogClient => fn add_to_order(id: ProductId) -> bool as CatalogRequest::AddToOrder);
client_method!(CatalogClient => fn add_quantity_to_order(id: ProductId, quantity: u32) -> bool as CatalogRequest::AddQuantityToOrder);
client_method!(CatalogClient => fn update_order(id: ProductId, quantity: u32) -> Option<u32> as CatalogRequest::UpdateOrder);
client_method!(CatalogClient => fn remove_from_order(id: ProductId) -> u32 as CatalogRequest::RemoveFromOrder);
client_method!(CatalogClient => fn update_order_quantity(id: ProductId, quantity: u32) -> bool as CatalogRequest::UpdateOrderQuantity);
client_method!(CatalogClient => fn clear_reservations() -> usize as CatalogRequest::ClearReservations);
client_method!(CatalogClient => fn consume_stock(id: ProductId, units: u32) -> Option<u32> as CatalogRequest::ConsumeStock);
client_method!(CatalogClient => fn reservations() -> HashMap<ProductId, u32> as CatalogRequest::GetReservations);
client_method!(CatalogClient => fn get_current_order() -> Vec<OrderLine> as CatalogRequest::GetCurrentOrder);
