//! Dataset loading, cleaning and typed column access

use crate::aggregate::{AggOp, Aggregation, Dimension, Metric};
use crate::encoding::decode;
use crate::error::DataFormatError;
use crate::record::{Record, Value, UNKNOWN};
use chrono::{NaiveDate, NaiveDateTime};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const REQUIRED_COLUMNS: &[&str] = &[
    "ORDERNUMBER",
    "QUANTITYORDERED",
    "PRICEEACH",
    "ORDERDATE",
    "STATUS",
    "PRODUCTLINE",
    "CUSTOMERNAME",
    "COUNTRY",
    "TERRITORY",
    "DEALSIZE",
];

/// Schema columns that may be absent from an export
const OPTIONAL_COLUMNS: &[&str] = &[
    "ORDERLINENUMBER",
    "SALES",
    "PRODUCTCODE",
    "CONTACTFIRSTNAME",
    "CONTACTLASTNAME",
    "CITY",
    "STATE",
];

const MISSING_MARKERS: &[&str] = &["na", "n/a", "nan", "null", "none"];

const DATE_FORMATS: &[&str] = &["%m/%d/%Y %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DAY_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// Cleaning knobs
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Non-schema columns missing in more than this fraction of rows are dropped
    pub drop_threshold: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            drop_threshold: 0.8,
        }
    }
}

/// What cleaning did to the raw file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub encoding: String,
    pub rows: usize,
    /// Column -> number of cells replaced by the sentinel
    pub imputed: BTreeMap<String, usize>,
    /// Columns removed as structurally unusable
    pub dropped_columns: Vec<String>,
}

/// Immutable, cleaned dataset
#[derive(Debug, Clone)]
pub struct Store {
    records: Vec<Record>,
    columns: Vec<String>,
    report: LoadReport,
    fingerprint: String,
}

impl Store {
    /// Load a CSV export from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataFormatError> {
        Self::load_with(path, &LoadOptions::default())
    }

    pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self, DataFormatError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| DataFormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_bytes(&bytes, options)?;
        tracing::info!(
            path = %path.display(),
            rows = store.len(),
            encoding = %store.report.encoding,
            dropped = ?store.report.dropped_columns,
            "loaded dataset"
        );
        Ok(store)
    }

    /// Load from raw bytes in any supported encoding
    pub fn from_bytes(bytes: &[u8], options: &LoadOptions) -> Result<Self, DataFormatError> {
        let (text, encoding) = decode(bytes)?;
        let fingerprint = hex::encode(Sha256::digest(text.as_bytes()));

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_ascii_uppercase())
            .collect();
        let position: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !position.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataFormatError::MissingColumns(missing));
        }

        let raw_rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;

        // Decide which non-schema columns survive before typing any row
        let extra_columns: Vec<&str> = headers
            .iter()
            .map(String::as_str)
            .filter(|h| !h.is_empty() && !is_schema_column(h))
            .collect();
        let mut dropped_columns = Vec::new();
        let mut kept_extras = Vec::new();
        for column in extra_columns {
            let idx = position[column];
            let missing_cells = raw_rows
                .iter()
                .filter(|row| is_missing(row.get(idx)))
                .count();
            let ratio = if raw_rows.is_empty() {
                0.0
            } else {
                missing_cells as f64 / raw_rows.len() as f64
            };
            if ratio > options.drop_threshold {
                dropped_columns.push(column.to_string());
            } else {
                kept_extras.push(column);
            }
        }

        let mut imputed: BTreeMap<String, usize> = BTreeMap::new();
        let mut records = Vec::with_capacity(raw_rows.len());
        for (i, row) in raw_rows.iter().enumerate() {
            // Header is line 1
            let row_no = i + 2;
            let cells = RowCells {
                row,
                row_no,
                position: &position,
            };
            records.push(cells.to_record(&kept_extras, &mut imputed)?);
        }

        let columns = headers
            .iter()
            .filter(|h| !h.is_empty() && !dropped_columns.contains(h))
            .cloned()
            .collect();

        for (column, count) in &imputed {
            tracing::debug!(column = %column, count, "imputed missing values with sentinel");
        }

        Ok(Self {
            report: LoadReport {
                encoding: encoding.name().to_string(),
                rows: records.len(),
                imputed,
                dropped_columns,
            },
            records,
            columns,
            fingerprint,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Surviving column names, in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// SHA-256 of the decoded dataset text
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Typed values of one column, one per record
    pub fn column(&self, name: &str) -> Result<Vec<Value>, DataFormatError> {
        let name = name.trim().to_ascii_uppercase();
        if !self.columns.contains(&name) {
            return Err(DataFormatError::UnknownColumn(name));
        }

        let text = |f: fn(&Record) -> &String| -> Vec<Value> {
            self.records.iter().map(|r| Value::Text(f(r).clone())).collect()
        };

        let values = match name.as_str() {
            "ORDERNUMBER" => self
                .records
                .iter()
                .map(|r| Value::Int(r.order_number as i64))
                .collect(),
            "ORDERLINENUMBER" => self
                .records
                .iter()
                .map(|r| match r.order_line {
                    Some(n) => Value::Int(n as i64),
                    None => Value::Text(UNKNOWN.to_string()),
                })
                .collect(),
            "QUANTITYORDERED" => self
                .records
                .iter()
                .map(|r| Value::Int(r.quantity as i64))
                .collect(),
            "PRICEEACH" => self.records.iter().map(|r| Value::Float(r.unit_price)).collect(),
            "SALES" => self.records.iter().map(|r| Value::Float(r.sales)).collect(),
            "ORDERDATE" => self.records.iter().map(|r| Value::Date(r.order_date)).collect(),
            "STATUS" => text(|r| &r.status),
            "PRODUCTLINE" => text(|r| &r.product_line),
            "PRODUCTCODE" => text(|r| &r.product_code),
            "CUSTOMERNAME" => text(|r| &r.customer),
            "CONTACTFIRSTNAME" => text(|r| &r.contact_first_name),
            "CONTACTLASTNAME" => text(|r| &r.contact_last_name),
            "CITY" => text(|r| &r.city),
            "STATE" => text(|r| &r.state),
            "COUNTRY" => text(|r| &r.country),
            "TERRITORY" => text(|r| &r.territory),
            "DEALSIZE" => text(|r| &r.deal_size),
            other => self
                .records
                .iter()
                .map(|r| {
                    Value::Text(
                        r.extras
                            .get(other)
                            .cloned()
                            .unwrap_or_else(|| UNKNOWN.to_string()),
                    )
                })
                .collect(),
        };
        Ok(values)
    }

    /// Group records and reduce `metric` with `op`
    pub fn aggregate(&self, group_by: &[Dimension], metric: Metric, op: AggOp) -> Aggregation {
        Aggregation::compute(&self.records, group_by, metric, op)
    }

    /// Number of distinct `of` values within each group
    pub fn distinct_count(&self, group_by: &[Dimension], of: Dimension) -> Aggregation {
        Aggregation::distinct(&self.records, group_by, of)
    }
}

fn is_schema_column(name: &str) -> bool {
    REQUIRED_COLUMNS.contains(&name) || OPTIONAL_COLUMNS.contains(&name)
}

fn is_missing(cell: Option<&str>) -> bool {
    match cell.map(str::trim) {
        None | Some("") => true,
        Some(v) => MISSING_MARKERS.contains(&v.to_ascii_lowercase().as_str()),
    }
}

struct RowCells<'a> {
    row: &'a csv::StringRecord,
    row_no: usize,
    position: &'a HashMap<&'a str, usize>,
}

impl RowCells<'_> {
    fn raw(&self, column: &str) -> Option<&str> {
        let idx = *self.position.get(column)?;
        let cell = self.row.get(idx);
        if is_missing(cell) {
            None
        } else {
            cell.map(str::trim)
        }
    }

    fn invalid(&self, column: &str, value: Option<&str>) -> DataFormatError {
        DataFormatError::InvalidValue {
            row: self.row_no,
            column: column.to_string(),
            value: value.unwrap_or("").to_string(),
        }
    }

    fn number(&self, column: &str) -> Result<f64, DataFormatError> {
        let raw = self.raw(column);
        raw.and_then(|v| v.replace(',', "").parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(column, raw))
    }

    fn whole(&self, column: &str) -> Result<u64, DataFormatError> {
        let value = self.number(column)?;
        // 2^64 and above would saturate in the cast
        if value < 0.0 || value.fract() != 0.0 || value >= u64::MAX as f64 {
            return Err(self.invalid(column, self.raw(column)));
        }
        Ok(value as u64)
    }

    fn whole_u32(&self, column: &str) -> Result<u32, DataFormatError> {
        let value = self.whole(column)?;
        u32::try_from(value).map_err(|_| self.invalid(column, self.raw(column)))
    }

    fn date(&self, column: &str) -> Result<NaiveDate, DataFormatError> {
        let raw = self.raw(column);
        raw.and_then(parse_date).ok_or_else(|| self.invalid(column, raw))
    }

    fn category(&self, column: &str, imputed: &mut BTreeMap<String, usize>) -> String {
        match self.raw(column) {
            Some(v) => v.to_string(),
            None => {
                // Absent optional columns are not imputation
                if self.position.contains_key(column) {
                    *imputed.entry(column.to_string()).or_insert(0) += 1;
                }
                UNKNOWN.to_string()
            }
        }
    }

    fn to_record(
        &self,
        extras: &[&str],
        imputed: &mut BTreeMap<String, usize>,
    ) -> Result<Record, DataFormatError> {
        let quantity = self.whole_u32("QUANTITYORDERED")?;
        let unit_price = self.number("PRICEEACH")?;
        let sales = match self.raw("SALES") {
            Some(_) => self.number("SALES")?,
            None => quantity as f64 * unit_price,
        };
        let order_line = match self.raw("ORDERLINENUMBER") {
            Some(_) => Some(self.whole_u32("ORDERLINENUMBER")?),
            None => None,
        };

        let mut extra_values = BTreeMap::new();
        for column in extras {
            extra_values.insert(column.to_string(), self.category(column, imputed));
        }

        Ok(Record {
            order_number: self.whole("ORDERNUMBER")?,
            order_line,
            quantity,
            unit_price,
            sales,
            order_date: self.date("ORDERDATE")?,
            status: self.category("STATUS", imputed),
            product_line: self.category("PRODUCTLINE", imputed),
            product_code: self.category("PRODUCTCODE", imputed),
            customer: self.category("CUSTOMERNAME", imputed),
            contact_first_name: self.category("CONTACTFIRSTNAME", imputed),
            contact_last_name: self.category("CONTACTLASTNAME", imputed),
            city: self.category("CITY", imputed),
            state: self.category("STATE", imputed),
            country: self.category("COUNTRY", imputed),
            territory: self.category("TERRITORY", imputed),
            deal_size: self.category("DEALSIZE", imputed),
            extras: extra_values,
        })
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DAY_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}
