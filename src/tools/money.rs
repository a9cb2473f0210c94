//! Currency conversion between caller-facing major units and the minor units
//! (cents) the Graph API uses for budgets and bids.

use serde::Deserialize;
use serde_json::Value;

/// Largest minor-unit value an `f64` represents exactly (2^53).
pub const MAX_MINOR_UNITS: f64 = 9_007_199_254_740_992.0;

/// A monetary amount in major currency units, as supplied by the caller.
///
/// Accepts either a JSON number (`10.5`) or a numeric string (`"10.50"`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "AmountRepr")]
pub struct Amount(f64);

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<AmountRepr> for Amount {
    type Error = String;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        match repr {
            AmountRepr::Number(n) => Ok(Self(n)),
            AmountRepr::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Self)
                .map_err(|_| format!("'{s}' is not a valid amount")),
        }
    }
}

impl Amount {
    /// Wraps a major-unit value.
    #[must_use]
    pub const fn new(major: f64) -> Self {
        Self(major)
    }

    /// The value in major units.
    #[must_use]
    pub const fn major(self) -> f64 {
        self.0
    }

    /// The value in minor units, rounded to the nearest cent.
    #[must_use]
    pub fn minor(self) -> i64 {
        to_minor_units(self.0)
    }

    /// Whether the amount is finite and strictly positive.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }

    /// Whether the amount converts to minor units without loss.
    #[must_use]
    pub fn is_representable(self) -> bool {
        self.0.is_finite() && (self.0 * 100.0).abs() <= MAX_MINOR_UNITS
    }
}

/// Converts major units to integer minor units: `round(major × 100)`.
#[must_use]
///
/// Callers check [`Amount::is_representable`] first, which keeps the result
/// within `±2^53`.
#[allow(clippy::cast_possible_truncation)] // bounded by MAX_MINOR_UNITS
pub fn to_minor_units(major: f64) -> i64 {
    (major * 100.0).round() as i64
}

/// Converts a Graph minor-unit value back to major units.
///
/// The Graph API returns budgets as numeric strings (`"1050"`), occasionally
/// as numbers. Anything else yields `None`.
#[must_use]
#[allow(clippy::cast_precision_loss)] // cents fit comfortably in f64's mantissa
pub fn from_minor_units(value: &Value) -> Option<f64> {
    let minor = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Some(minor / 100.0)
}

/// Rounds to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amount_from_number_and_string() {
        let a: Amount = serde_json::from_value(json!(10.5)).unwrap();
        let b: Amount = serde_json::from_value(json!("1000.50")).unwrap();
        assert_eq!(a.minor(), 1050);
        assert_eq!(b.minor(), 100_050);
    }

    #[test]
    fn amount_rejects_garbage() {
        let result: Result<Amount, _> = serde_json::from_value(json!("ten"));
        assert!(result.is_err());
        let result: Result<Amount, _> = serde_json::from_value(json!(true));
        assert!(result.is_err());
    }

    #[test]
    fn validity() {
        assert!(Amount::new(0.01).is_positive());
        assert!(!Amount::new(0.0).is_positive());
        assert!(!Amount::new(-5.0).is_positive());
        assert!(!Amount::new(f64::NAN).is_positive());
    }

    #[test]
    fn huge_amounts_are_not_representable() {
        assert!(Amount::new(1e20).is_positive());
        assert!(!Amount::new(1e20).is_representable());
        assert!(!Amount::new(MAX_MINOR_UNITS / 50.0).is_representable());
        assert!(Amount::new(1e13).is_representable());
        assert_eq!(Amount::new(1e13).minor(), 1_000_000_000_000_000);
    }

    #[test]
    fn minor_units_round_not_truncate() {
        // 19.99 * 100 = 1998.9999999999998 in binary floating point
        assert_eq!(to_minor_units(19.99), 1999);
        assert_eq!(to_minor_units(0.29), 29);
    }

    #[test]
    fn round_trip_within_a_cent() {
        let mut cents = 1_i64;
        while cents < 10_000_000 {
            #[allow(clippy::cast_precision_loss)]
            let major = cents as f64 / 100.0;
            let back = from_minor_units(&json!(to_minor_units(major))).unwrap();
            assert!((back - major).abs() < 0.01, "{major} -> {back}");
            cents = cents * 7 + 3;
        }
    }

    #[test]
    fn from_minor_accepts_strings() {
        assert_eq!(from_minor_units(&json!("2500")), Some(25.0));
        assert_eq!(from_minor_units(&json!(2500)), Some(25.0));
        assert_eq!(from_minor_units(&json!(null)), None);
        assert_eq!(from_minor_units(&json!("n/a")), None);
    }

    #[test]
    fn round2_behaviour() {
        assert!((round2(0.505_000_1) - 0.51).abs() < f64::EPSILON);
        assert!((round2(25.0) - 25.0).abs() < f64::EPSILON);
    }
}
