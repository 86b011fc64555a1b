//! Currency helpers.
//!
//! Amounts are plain `f64` dollars. Lump-sum pricing means one entered value
//! fills `unit_cost`, `total_cost` and `total_price` alike.

/// Round an amount to cents.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Normalize a generated price: non-finite or negative values become zero,
/// everything else is rounded to cents.
pub fn clamp_price(value: f64) -> f64 {
    if !value.is_finite() || value < 0.0 {
        return 0.0;
    }
    round_cents(value)
}

/// Normalize a directly entered value. Non-finite input counts as zero.
pub fn entered_value(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Sum a set of prices, treating missing values as zero.
pub fn sum_prices<I>(prices: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    prices.into_iter().map(|p| p.unwrap_or(0.0)).sum()
}

/// Format an amount as dollars with thousands separators (e.g. `$12,500.00`).
pub fn format_usd(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        cents % 100
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_price_negative() {
        assert_eq!(clamp_price(-5.0), 0.0);
    }

    #[test]
    fn test_clamp_price_rounds() {
        assert_eq!(clamp_price(1234.567), 1234.57);
        assert_eq!(clamp_price(f64::NAN), 0.0);
        assert_eq!(clamp_price(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_sum_prices_treats_none_as_zero() {
        let total = sum_prices(vec![Some(10.0), None, Some(2.5)]);
        assert_eq!(total, 12.5);
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(12500.0), "$12,500.00");
        assert_eq!(format_usd(1234567.891), "$1,234,567.89");
        assert_eq!(format_usd(-42.5), "-$42.50");
    }
}
