//! Price arithmetic for carts. All amounts are whole Vietnamese đồng.

use serde::Deserialize;
use utoipa::ToSchema;

/// How a requested quantity is applied to an existing cart line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuantityMode {
    /// Add the requested quantity to whatever is already in the cart.
    #[default]
    Increment,
    /// Replace the stored quantity.
    Set,
}

/// The sale price when it is a positive amount below the list price, else the list price.
pub fn effective_price(price: i64, sale_price: Option<i64>) -> i64 {
    match sale_price {
        Some(sale) if sale > 0 && sale < price => sale,
        _ => price,
    }
}

pub fn line_total(unit_price: i64, quantity: i32) -> i64 {
    unit_price.saturating_mul(i64::from(quantity))
}

/// Sum of `unit price × quantity` over `(unit_price, quantity)` pairs.
pub fn cart_total<I>(lines: I) -> i64
where
    I: IntoIterator<Item = (i64, i32)>,
{
    lines
        .into_iter()
        .fold(0_i64, |acc, (price, qty)| acc.saturating_add(line_total(price, qty)))
}

/// Quantity stored on a line after applying `requested` in `mode`.
pub fn merge_quantity(existing: i32, requested: i32, mode: QuantityMode) -> i32 {
    match mode {
        QuantityMode::Increment => existing.saturating_add(requested),
        QuantityMode::Set => requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_price_below_list_price_wins() {
        assert_eq!(effective_price(100_000, Some(85_000)), 85_000);
    }

    #[test]
    fn sale_price_is_ignored_when_missing_zero_or_not_lower() {
        assert_eq!(effective_price(100_000, None), 100_000);
        assert_eq!(effective_price(100_000, Some(0)), 100_000);
        assert_eq!(effective_price(100_000, Some(100_000)), 100_000);
        assert_eq!(effective_price(100_000, Some(120_000)), 100_000);
    }

    #[test]
    fn total_sums_price_times_quantity() {
        assert_eq!(cart_total(Vec::new()), 0);
        assert_eq!(cart_total([(100_000, 2)]), 200_000);
        assert_eq!(cart_total([(100_000, 3), (45_000, 2)]), 390_000);
    }

    #[test]
    fn total_is_idempotent() {
        let lines = vec![(250_000, 1), (15_000, 4)];
        assert_eq!(cart_total(lines.clone()), cart_total(lines));
    }

    #[test]
    fn increment_adds_and_set_overwrites() {
        assert_eq!(merge_quantity(2, 1, QuantityMode::Increment), 3);
        assert_eq!(merge_quantity(2, 5, QuantityMode::Set), 5);
        assert_eq!(merge_quantity(i32::MAX, 1, QuantityMode::Increment), i32::MAX);
    }

    #[test]
    fn worked_example_reaches_three_hundred_thousand() {
        let unit = effective_price(100_000, None);
        let qty = merge_quantity(2, 1, QuantityMode::Increment);
        assert_eq!(cart_total([(unit, 2)]), 200_000);
        assert_eq!(cart_total([(unit, qty)]), 300_000);
    }
}
