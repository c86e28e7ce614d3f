use std::collections::HashMap;
use std::sync::Mutex;

use super::PersistenceGateway;
use crate::domain::{Order, OrderId, Product, User};
use crate::error::GatewayError;

#[derive(Debug, Default)]
struct Snapshot {
    products: Vec<Product>,
    orders: Vec<Order>,
    user: Option<User>,
    saves: usize,
}

/// Gateway that keeps the last saved snapshot in memory.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    inner: Mutex<Snapshot>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let gateway = Self::new();
        gateway.lock().products = products;
        gateway
    }

    pub fn with_user(self, user: User) -> Self {
        self.lock().user = Some(user);
        self
    }

    /// Number of successful saves of any kind.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Snapshot> {
        // A poisoned snapshot is still a valid snapshot.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PersistenceGateway for InMemoryGateway {
    fn load_products(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    fn save_products(&self, products: &[Product]) -> Result<(), GatewayError> {
        let mut snapshot = self.lock();
        snapshot.products = products.to_vec();
        snapshot.saves += 1;
        Ok(())
    }

    fn load_orders(&self) -> HashMap<OrderId, Order> {
        self.lock()
            .orders
            .iter()
            .map(|order| (order.id, order.clone()))
            .collect()
    }

    fn save_orders(&self, orders: &[Order]) -> Result<(), GatewayError> {
        let mut snapshot = self.lock();
        snapshot.orders = orders.to_vec();
        snapshot.saves += 1;
        Ok(())
    }

    fn load_user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    fn save_user(&self, user: &User) -> Result<(), GatewayError> {
        let mut snapshot = self.lock();
        snapshot.user = Some(user.clone());
        snapshot.saves += 1;
        Ok(())
    }
}
