//! Money helpers.
//!
//! Prices are held in the smallest currency unit (e.g. cents) as `u64`.
//! Decimal values only exist at the boundary (DTOs, report rows).

/// Upper bound on a product price: 1,000,000.00 in minor units.
pub const PRICE_MAX_MINOR: u64 = 100_000_000;

/// Convert a boundary decimal amount into minor units, rounding to 2 decimals.
///
/// Callers must bounds-check the input first; this assumes `0 <= value` and a
/// finite `value` small enough to fit.
pub fn minor_from_major(value: f64) -> u64 {
    (value * 100.0).round() as u64
}

/// Convert minor units back into a boundary decimal amount.
pub fn major_from_minor(minor: u64) -> f64 {
    minor as f64 / 100.0
}

/// Render minor units as a 2-decimal string, e.g. `2997` -> `"29.97"`.
pub fn format_major(minor: u64) -> String {
    format!("{}.{:02}", minor / 100, minor % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_from_major_rounds_to_two_decimals() {
        assert_eq!(minor_from_major(9.99), 999);
        assert_eq!(minor_from_major(9.999), 1000);
        assert_eq!(minor_from_major(9.994), 999);
        assert_eq!(minor_from_major(0.0), 0);
        assert_eq!(minor_from_major(1_000_000.0), PRICE_MAX_MINOR);
    }

    #[test]
    fn major_round_trips() {
        assert_eq!(major_from_minor(999), 9.99);
        assert_eq!(minor_from_major(major_from_minor(2997)), 2997);
    }

    #[test]
    fn format_major_pads_cents() {
        assert_eq!(format_major(2997), "29.97");
        assert_eq!(format_major(1500), "15.00");
        assert_eq!(format_major(5), "0.05");
        assert_eq!(format_major(0), "0.00");
    }
}
