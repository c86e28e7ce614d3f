use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::{OrderId, Product, ProductId};

/// Whether an order's units have already been taken out of stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderStatus {
    /// Recorded but stock untouched; finalizing consumes it.
    #[default]
    Pending,
    /// Stock already consumed, either at checkout or by finalizing.
    Fulfilled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Fulfilled => "fulfilled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(OrderStatus::Pending),
            "fulfilled" => Ok(OrderStatus::Fulfilled),
            other => Err(format!("unknown order status {:?}", other)),
        }
    }
}

/// A historical order.
///
/// Items are kept as a quantity map. Use [`Order::expand_units`] when a
/// one-entry-per-unit view is needed (e.g. for the flat-file format).
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub items: BTreeMap<ProductId, u32>,
    /// Sum of unit prices at the time each unit was included.
    pub total_price: Decimal,
    pub status: OrderStatus,
}

impl Order {
    pub fn new(id: OrderId) -> Self {
        Self {
            id,
            items: BTreeMap::new(),
            total_price: Decimal::ZERO,
            status: OrderStatus::Pending,
        }
    }

    /// Folds a unit multiset (one id per unit) into a pending order.
    pub fn from_units(
        id: OrderId,
        units: impl IntoIterator<Item = ProductId>,
        total_price: Decimal,
    ) -> Self {
        let mut items = BTreeMap::new();
        for product_id in units {
            let quantity: &mut u32 = items.entry(product_id).or_insert(0);
            *quantity = quantity.saturating_add(1);
        }
        Self {
            id,
            items,
            total_price,
            status: OrderStatus::Pending,
        }
    }

    /// One entry per unit, grouped by product id.
    pub fn expand_units(&self) -> Vec<ProductId> {
        self.items
            .iter()
            .flat_map(|(id, quantity)| std::iter::repeat(*id).take(*quantity as usize))
            .collect()
    }

    /// Adds `quantity` units of `product`. Returns `false`, leaving the order
    /// unchanged, when the line would exceed `u32::MAX` units.
    pub fn add_product(&mut self, product: &Product, quantity: u32) -> bool {
        if quantity == 0 {
            return true;
        }
        let Some(updated) = self.product_quantity(&product.id).checked_add(quantity) else {
            return false;
        };
        self.items.insert(product.id, updated);
        self.total_price = self
            .total_price
            .saturating_add(product.price.saturating_mul(Decimal::from(quantity)));
        true
    }

    /// Drops every unit of `product` and takes their value off the total.
    pub fn remove_product(&mut self, product: &Product) {
        if let Some(quantity) = self.items.remove(&product.id) {
            let removed = product.price.saturating_mul(Decimal::from(quantity));
            self.total_price = (self.total_price - removed).max(Decimal::ZERO);
        }
    }

    pub fn product_quantity(&self, id: &ProductId) -> u32 {
        self.items.get(id).copied().unwrap_or(0)
    }

    pub fn unit_count(&self) -> u64 {
        self.items.values().map(|quantity| u64::from(*quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_fulfilled(&self) -> bool {
        self.status == OrderStatus::Fulfilled
    }
}
