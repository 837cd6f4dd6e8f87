use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days from 0001-01-01 (common era day 1) to the spreadsheet epoch, 1899-12-30
const SERIAL_EPOCH_FROM_CE: i32 = 693_594;

/// A value as entered by a user: a literal or a formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExtendedValue {
    #[serde(rename = "numberValue")]
    Number(f64),
    #[serde(rename = "stringValue")]
    Text(String),
    #[serde(rename = "boolValue")]
    Boolean(bool),
    #[serde(rename = "formulaValue")]
    Formula(String),
}

impl ExtendedValue {
    /// Dates are stored as serial day numbers counted from 1899-12-30
    pub fn date(date: NaiveDate) -> Self {
        ExtendedValue::Number(serial_date(date))
    }

    pub fn formula(formula: impl Into<String>) -> Self {
        ExtendedValue::Formula(formula.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        ExtendedValue::Text(text.into())
    }
}

impl From<f64> for ExtendedValue {
    fn from(n: f64) -> Self {
        ExtendedValue::Number(n)
    }
}

impl From<bool> for ExtendedValue {
    fn from(b: bool) -> Self {
        ExtendedValue::Boolean(b)
    }
}

/// Convert a calendar date to its spreadsheet serial number
pub fn serial_date(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - SERIAL_EPOCH_FROM_CE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_date() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(serial_date(date(1899, 12, 30)), 0.0);
        assert_eq!(serial_date(date(1970, 1, 1)), 25_569.0);
        assert_eq!(serial_date(date(2025, 1, 1)), 45_658.0);
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(ExtendedValue::formula("=SUM(A1:A3)")).unwrap();
        assert_eq!(json, serde_json::json!({"formulaValue": "=SUM(A1:A3)"}));

        let json = serde_json::to_value(ExtendedValue::from(true)).unwrap();
        assert_eq!(json, serde_json::json!({"boolValue": true}));
    }
}
