//! Sales order line and typed cell values

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel that replaces missing categorical values
pub const UNKNOWN: &str = "Unknown";

/// One sales-order line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub order_number: u64,
    pub order_line: Option<u32>,
    pub quantity: u32,
    pub unit_price: f64,
    /// `SALES` when present, otherwise `quantity * unit_price`
    pub sales: f64,
    pub order_date: NaiveDate,
    pub status: String,
    pub product_line: String,
    pub product_code: String,
    pub customer: String,
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub territory: String,
    pub deal_size: String,
    /// Columns outside the fixed schema that survived cleaning
    pub extras: BTreeMap<String, String>,
}

impl Record {
    pub fn year(&self) -> i32 {
        self.order_date.year()
    }

    pub fn quarter(&self) -> u32 {
        (self.order_date.month() - 1) / 3 + 1
    }

    pub fn contact_name(&self) -> String {
        match (
            self.contact_first_name.as_str(),
            self.contact_last_name.as_str(),
        ) {
            (UNKNOWN, UNKNOWN) => UNKNOWN.to_string(),
            (first, UNKNOWN) => first.to_string(),
            (UNKNOWN, last) => last.to_string(),
            (first, last) => format!("{first} {last}"),
        }
    }
}

/// A typed cell returned by [`Store::column`](crate::Store::column)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record {
            order_number: 10107,
            order_line: Some(2),
            quantity: 30,
            unit_price: 95.7,
            sales: 2871.0,
            order_date: NaiveDate::from_ymd_opt(2003, 8, 25).unwrap(),
            status: "Shipped".to_string(),
            product_line: "Motorcycles".to_string(),
            product_code: "S10_1678".to_string(),
            customer: "Land of Toys Inc.".to_string(),
            contact_first_name: "Kwai".to_string(),
            contact_last_name: UNKNOWN.to_string(),
            city: "NYC".to_string(),
            state: "NY".to_string(),
            country: "USA".to_string(),
            territory: UNKNOWN.to_string(),
            deal_size: "Small".to_string(),
            extras: BTreeMap::new(),
        }
    }

    #[test]
    fn test_calendar_helpers() {
        let r = record();
        assert_eq!(r.year(), 2003);
        assert_eq!(r.quarter(), 3);
    }

    #[test]
    fn test_contact_name_skips_unknown_parts() {
        let mut r = record();
        assert_eq!(r.contact_name(), "Kwai");
        r.contact_last_name = "Yu".to_string();
        assert_eq!(r.contact_name(), "Kwai Yu");
        r.contact_first_name = UNKNOWN.to_string();
        r.contact_last_name = UNKNOWN.to_string();
        assert_eq!(r.contact_name(), UNKNOWN);
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Text("EMEA".into()).as_str(), Some("EMEA"));
        assert_eq!(Value::Text("EMEA".into()).as_f64(), None);
        let d = Value::Date(NaiveDate::from_ymd_opt(2004, 1, 2).unwrap());
        assert_eq!(d.to_string(), "2004-01-02");
    }
}
