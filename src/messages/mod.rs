use std::collections::HashMap;

use tokio::sync::oneshot;

use crate::domain::{Product, ProductId, ProductPatch};
use crate::projection::OrderLine;

/// Reply channel for a catalog request.
pub type ServiceResponse<T> = oneshot::Sender<T>;

/// Typed messages for the catalog actor. Each variant carries its parameters
/// and a oneshot channel for the reply.
#[derive(Debug)]
pub enum CatalogRequest {
    AddProduct {
        product: Product,
        respond_to: ServiceResponse<Option<Product>>,
    },
    /// Bulk insert of a loaded catalog. Refused (`None`) while an order is
    /// in progress.
    LoadCatalog {
        products: Vec<Product>,
        respond_to: ServiceResponse<Option<usize>>,
    },
    RemoveProduct {
        id: ProductId,
        respond_to: ServiceResponse<Option<Product>>,
    },
    UpdateProduct {
        id: ProductId,
        patch: ProductPatch,
        respond_to: ServiceResponse<Option<Product>>,
    },
    GetProduct {
        id: ProductId,
        respond_to: ServiceResponse<Option<Product>>,
    },
    GetAllProducts {
        respond_to: ServiceResponse<Vec<Product>>,
    },
    LowStockProducts {
        threshold: i64,
        respond_to: ServiceResponse<Vec<Product>>,
    },
    AddToOrder {
        id: ProductId,
        respond_to: ServiceResponse<bool>,
    },
    AddQuantityToOrder {
        id: ProductId,
        quantity: u32,
        respond_to: ServiceResponse<bool>,
    },
    UpdateOrder {
        id: ProductId,
        quantity: u32,
        respond_to: ServiceResponse<Option<u32>>,
    },
    RemoveFromOrder {
        id: ProductId,
        respond_to: ServiceResponse<u32>,
    },
    UpdateOrderQuantity {
        id: ProductId,
        quantity: u32,
        respond_to: ServiceResponse<bool>,
    },
    ClearReservations {
        respond_to: ServiceResponse<usize>,
    },
    ConsumeStock {
        id: ProductId,
        units: u32,
        respond_to: ServiceResponse<Option<u32>>,
    },
    GetReservations {
        respond_to: ServiceResponse<HashMap<ProductId, u32>>,
    },
    GetCurrentOrder {
        respond_to: ServiceResponse<Vec<OrderLine>>,
    },
    Shutdown,
}
