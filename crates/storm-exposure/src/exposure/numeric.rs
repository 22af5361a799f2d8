//! Lenient numeric coercion for spreadsheet exports.

/// Parses a trimmed cell as `f64`. Blank or non-numeric cells become `NaN`.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Like [`coerce_number`] after stripping `,` thousands separators.
pub fn coerce_grouped(raw: &str) -> f64 {
    if raw.contains(',') {
        coerce_number(&raw.replace(',', ""))
    } else {
        coerce_number(raw)
    }
}

/// Whole-number cells only; `2005.0` is accepted, `2005.5` is not.
pub fn coerce_integer(raw: &str) -> Option<i32> {
    let value = coerce_number(raw);
    if value.is_finite()
        && value.fract() == 0.0
        && value >= f64::from(i32::MIN)
        && value <= f64::from(i32::MAX)
    {
        Some(value as i32)
    } else {
        None
    }
}

pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_garbage_cells_are_nan() {
        assert!(coerce_number("").is_nan());
        assert!(coerce_number("   ").is_nan());
        assert!(coerce_number("n/a").is_nan());
        assert_eq!(coerce_number(" 42.5 "), 42.5);
    }

    #[test]
    fn grouped_cells_drop_separators() {
        assert_eq!(coerce_grouped("12,345"), 12_345.0);
        assert_eq!(coerce_grouped("1,250,000.50"), 1_250_000.5);
        assert!(coerce_grouped("1,2x").is_nan());
    }

    #[test]
    fn integers_reject_fractions() {
        assert_eq!(coerce_integer("2005"), Some(2005));
        assert_eq!(coerce_integer("2005.0"), Some(2005));
        assert_eq!(coerce_integer("2005.5"), None);
        assert_eq!(coerce_integer("unknown"), None);
    }
}
