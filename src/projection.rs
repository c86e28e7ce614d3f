//! Order projection: the current order as a view over the reservation map.
//!
//! Nothing here mutates catalog state. Totals are kept at full decimal
//! precision; rounding to cents happens only in [`format_price`].

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::{Product, ProductId};

/// One row of the current order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product: Product,
    pub quantity: u32,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.product.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Joins the reservation map against the catalog. Reservations whose product
/// is no longer in the catalog are dropped.
pub fn project(
    products: &HashMap<ProductId, Product>,
    reservations: &HashMap<ProductId, u32>,
) -> Vec<OrderLine> {
    reservations
        .iter()
        .filter_map(|(id, quantity)| {
            products.get(id).map(|product| OrderLine {
                product: product.clone(),
                quantity: *quantity,
            })
        })
        .collect()
}

/// Σ(unit price × quantity) over all lines.
pub fn order_total(lines: &[OrderLine]) -> Decimal {
    lines
        .iter()
        .map(OrderLine::line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Two-decimal display form of a price or total.
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: Decimal) -> Product {
        Product::new(ProductId::new(), "Widget", "", price, 5)
    }

    #[test]
    fn drops_reservations_without_product() {
        let p = product(Decimal::new(50, 0));
        let products = HashMap::from([(p.id, p.clone())]);
        let reservations = HashMap::from([(p.id, 2), (ProductId::new(), 7)]);

        let lines = project(&products, &reservations);

        assert_eq!(lines, vec![OrderLine { product: p, quantity: 2 }]);
    }

    #[test]
    fn total_keeps_full_precision() {
        let a = product(Decimal::new(3333, 3)); // 3.333
        let lines = vec![OrderLine { product: a, quantity: 3 }];

        assert_eq!(order_total(&lines), Decimal::new(9999, 3));
        assert_eq!(format_price(order_total(&lines)), "10.00");
    }

    #[test]
    fn format_rounds_half_away_from_zero() {
        assert_eq!(format_price(Decimal::new(1005, 3)), "1.01");
        assert_eq!(format_price(Decimal::new(150, 0)), "150.00");
    }

    #[test]
    fn empty_order_totals_zero() {
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }
}
