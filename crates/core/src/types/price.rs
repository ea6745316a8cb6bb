//! Price arithmetic and display formatting.

use rust_decimal::Decimal;

/// Format a price for display (e.g., `$179.90`).
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

/// Price of `amount` units at `unit_price`.
#[must_use]
pub fn line_subtotal(unit_price: Decimal, amount: u32) -> Decimal {
    unit_price * Decimal::from(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_pads_cents() {
        assert_eq!(format_price(Decimal::new(1799, 1)), "$179.90");
        assert_eq!(format_price(Decimal::from(100)), "$100.00");
        assert_eq!(format_price(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_line_subtotal() {
        assert_eq!(line_subtotal(Decimal::new(1399, 1), 3), Decimal::new(4197, 1));
        assert_eq!(line_subtotal(Decimal::new(1399, 1), 0), Decimal::ZERO);
    }
}
