use std::collections::HashMap;

use crate::domain::{Product, ProductId, ProductPatch};
use crate::projection::{self, OrderLine};

/// Threshold used by low-stock views unless configured otherwise.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 3;

/// Product records plus the reservation map of the current order.
///
/// This is the only place stock levels change. For every product,
/// `stock_level + reserved` is preserved by the stock-aware reservation
/// operations (`add_to_order`, `add_quantity_to_order`, `update_order`,
/// `remove_from_order`). Reservations of zero are never stored.
#[derive(Debug, Default, Clone)]
pub struct CatalogStore {
    products: HashMap<ProductId, Product>,
    current_order: HashMap<ProductId, u32>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or fully replaces the product with the same id. An existing
    /// reservation for that id is kept as is.
    pub fn add_product(&mut self, product: Product) -> Option<Product> {
        self.products.insert(product.id, product)
    }

    /// Deletes the product and silently drops its reservation. Reserved units
    /// are not credited anywhere.
    pub fn remove_product(&mut self, id: &ProductId) -> Option<Product> {
        self.current_order.remove(id);
        self.products.remove(id)
    }

    pub fn update_product(&mut self, id: &ProductId, patch: ProductPatch) -> Option<Product> {
        let product = self.products.get_mut(id)?;
        product.apply(patch);
        Some(product.clone())
    }

    pub fn get_product(&self, id: &ProductId) -> Option<Product> {
        self.products.get(id).cloned()
    }

    pub fn get_all_products(&self) -> Vec<Product> {
        self.products.values().cloned().collect()
    }

    /// Products whose stock level is at or below `threshold`.
    pub fn low_stock_products(&self, threshold: i64) -> Vec<Product> {
        self.products
            .values()
            .filter(|p| i64::from(p.stock_level) <= threshold)
            .cloned()
            .collect()
    }

    /// Reserves one unit. Returns `false` (and changes nothing) when the
    /// product is unknown or out of stock.
    pub fn add_to_order(&mut self, id: &ProductId) -> bool {
        self.add_quantity_to_order(id, 1)
    }

    /// Reserves `quantity` units only if all of them are in stock and the
    /// resulting reservation still fits in a `u32`.
    pub fn add_quantity_to_order(&mut self, id: &ProductId, quantity: u32) -> bool {
        let current = self.reserved_quantity(id);
        let Some(product) = self.products.get_mut(id) else {
            return false;
        };
        if quantity == 0 || product.stock_level < quantity {
            return false;
        }
        let Some(reserved) = current.checked_add(quantity) else {
            return false;
        };
        product.stock_level -= quantity;
        self.current_order.insert(*id, reserved);
        true
    }

    /// Sets the reservation for `id` to `new_quantity`, moving the difference
    /// between stock and reservation.
    ///
    /// Increases are clamped to the available stock, so stock never goes
    /// below zero. Returns the reservation actually held, or `None` if the
    /// product is unknown.
    pub fn update_order(&mut self, id: &ProductId, new_quantity: u32) -> Option<u32> {
        let product = self.products.get_mut(id)?;
        let current = self.current_order.get(id).copied().unwrap_or(0);

        let held = if new_quantity > current {
            let granted = (new_quantity - current).min(product.stock_level);
            product.stock_level -= granted;
            current.saturating_add(granted)
        } else {
            product.stock_level = product.stock_level.saturating_add(current - new_quantity);
            new_quantity
        };

        if held == 0 {
            self.current_order.remove(id);
        } else {
            self.current_order.insert(*id, held);
        }
        Some(held)
    }

    /// Releases the whole reservation for `id` back to stock and drops the
    /// entry. Returns the number of units released.
    pub fn remove_from_order(&mut self, id: &ProductId) -> u32 {
        let released = self.reserved_quantity(id);
        if self.update_order(id, 0).is_none() {
            self.current_order.remove(id);
            return 0;
        }
        released
    }

    /// Sets or removes the reservation for `id` without touching stock.
    /// Returns `false` if the product is unknown.
    pub fn update_order_quantity(&mut self, id: &ProductId, quantity: u32) -> bool {
        if !self.products.contains_key(id) {
            return false;
        }
        if quantity == 0 {
            self.current_order.remove(id);
        } else {
            self.current_order.insert(*id, quantity);
        }
        true
    }

    /// Drops every reservation without crediting stock.
    pub fn clear_reservations(&mut self) -> usize {
        let dropped = self.current_order.len();
        self.current_order.clear();
        dropped
    }

    /// Permanently removes `units` from stock, saturating at zero. Returns
    /// the new stock level, or `None` if the product is unknown.
    pub fn consume_stock(&mut self, id: &ProductId, units: u32) -> Option<u32> {
        let product = self.products.get_mut(id)?;
        product.stock_level = product.stock_level.saturating_sub(units);
        Some(product.stock_level)
    }

    pub fn reserved_quantity(&self, id: &ProductId) -> u32 {
        self.current_order.get(id).copied().unwrap_or(0)
    }

    pub fn reservations(&self) -> HashMap<ProductId, u32> {
        self.current_order.clone()
    }

    pub fn has_active_order(&self) -> bool {
        !self.current_order.is_empty()
    }

    pub fn get_current_order(&self) -> Vec<OrderLine> {
        projection::project(&self.products, &self.current_order)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
