//! # Mock Framework
//!
//! Utilities for testing catalog consumers in isolation.
//!
//! Use [`create_mock_catalog`] to get a client and the receiver behind it,
//! then the `expect_*` helpers to assert on what arrives and answer it.

use tokio::sync::mpsc;

use crate::clients::CatalogClient;
use crate::domain::{Product, ProductId};
use crate::messages::{CatalogRequest, ServiceResponse};
use crate::projection::OrderLine;

/// Creates a client whose requests land on a channel the test controls
/// instead of a running [`CatalogService`](crate::catalog::CatalogService).
pub fn create_mock_catalog(buffer_size: usize) -> (CatalogClient, mpsc::Receiver<CatalogRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (CatalogClient::new(sender), receiver)
}

/// Next request of any kind, `None` once every client is gone.
pub async fn expect_request(receiver: &mut mpsc::Receiver<CatalogRequest>) -> Option<CatalogRequest> {
    receiver.recv().await
}

/// Helper to verify that the next message is a GetProduct request
pub async fn expect_get_product(
    receiver: &mut mpsc::Receiver<CatalogRequest>,
) -> Option<(ProductId, ServiceResponse<Option<Product>>)> {
    match receiver.recv().await {
        Some(CatalogRequest::GetProduct { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an AddToOrder request
pub async fn expect_add_to_order(
    receiver: &mut mpsc::Receiver<CatalogRequest>,
) -> Option<(ProductId, ServiceResponse<bool>)> {
    match receiver.recv().await {
        Some(CatalogRequest::AddToOrder { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a GetCurrentOrder request
pub async fn expect_get_current_order(
    receiver: &mut mpsc::Receiver<CatalogRequest>,
) -> Option<ServiceResponse<Vec<OrderLine>>> {
    match receiver.recv().await {
        Some(CatalogRequest::GetCurrentOrder { respond_to }) => Some(respond_to),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_catalog(10);
        let id = ProductId::new();

        let get_task = tokio::spawn(async move { client.get_product(id).await });

        let (requested, responder) = expect_get_product(&mut receiver).await.expect("Expected GetProduct request");
        assert_eq!(requested, id);
        let product = Product::new(id, "Test", "", Decimal::ONE, 1);
        responder.send(Some(product.clone())).unwrap();

        let result = get_task.await.unwrap();
        assert_eq!(result, Ok(Some(product)));
    }

    #[tokio::test]
    async fn dropped_responder_is_reported() {
        let (client, mut receiver) = create_mock_catalog(10);

        let task = tokio::spawn(async move { client.add_to_order(ProductId::new()).await });

        let (_, responder) = expect_add_to_order(&mut receiver).await.expect("Expected AddToOrder request");
        drop(responder);

        let result = task.await.unwrap();
        assert_eq!(
            result,
            Err(CatalogError::ActorCommunicationError("Actor dropped".to_string()))
        );
    }
}
