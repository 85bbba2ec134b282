//! Money and percentage formatting.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency assumed when a period has no records to take one from.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Round to `dp` places, half away from zero, always showing `dp` digits.
fn fixed(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// Format an amount with two decimal places (e.g. `$1.23`, `4.50 EUR`).
#[must_use]
pub fn format_amount(value: Decimal, currency: &str) -> String {
    let magnitude = fixed(value.abs(), 2);
    let sign = if value.is_sign_negative() && !magnitude.is_zero() {
        "-"
    } else {
        ""
    };

    if currency.eq_ignore_ascii_case(DEFAULT_CURRENCY) {
        format!("{sign}${magnitude}")
    } else {
        format!("{sign}{magnitude} {currency}")
    }
}

/// Format a percentage with one decimal place (e.g. `54.5%`).
#[must_use]
pub fn format_percentage(value: Decimal) -> String {
    format!("{}%", fixed(value, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_amount(dec!(110), "USD"), "$110.00");
        assert_eq!(format_amount(dec!(0), "USD"), "$0.00");
        assert_eq!(format_amount(dec!(12.345), "usd"), "$12.35");
        assert_eq!(format_amount(dec!(0.004), "USD"), "$0.00");
    }

    #[test]
    fn test_format_other_currency() {
        assert_eq!(format_amount(dec!(4.5), "EUR"), "4.50 EUR");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_amount(dec!(-5), "USD"), "-$5.00");
        assert_eq!(format_amount(dec!(-0.001), "USD"), "$0.00");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(dec!(54.5454)), "54.5%");
        assert_eq!(format_percentage(dec!(36.3636)), "36.4%");
        assert_eq!(format_percentage(dec!(9.0909)), "9.1%");
        assert_eq!(format_percentage(dec!(100)), "100.0%");
        assert_eq!(format_percentage(dec!(0.05)), "0.1%");
    }
}
