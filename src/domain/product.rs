use rust_decimal::Decimal;

use super::ProductId;

/// A product in the catalog.
///
/// `stock_level` counts the units that are NOT reserved by the current order.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_level: u32,
}

/// Payload for creating a new product. The id is assigned by the coordinator.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_level: u32,
}

/// Partial update for an existing product. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock_level: Option<u32>,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        stock_level: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            price,
            stock_level,
        }
    }

    pub fn from_create(id: ProductId, params: ProductCreate) -> Self {
        Self::new(id, params.name, params.description, params.price, params.stock_level)
    }

    /// Applies the provided fields of `patch`.
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock_level) = patch.stock_level {
            self.stock_level = stock_level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_only_touches_provided_fields() {
        let mut product = Product::new(ProductId::new(), "Lamp", "Desk lamp", Decimal::new(2999, 2), 4);
        product.apply(ProductPatch {
            price: Some(Decimal::new(2499, 2)),
            ..Default::default()
        });

        assert_eq!(product.name, "Lamp");
        assert_eq!(product.description, "Desk lamp");
        assert_eq!(product.price, Decimal::new(2499, 2));
        assert_eq!(product.stock_level, 4);
    }
}
