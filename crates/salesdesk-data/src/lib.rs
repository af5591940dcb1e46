//! Typed, cleaned in-memory store for the sales order dataset

mod aggregate;
mod encoding;
mod error;
mod record;
mod store;

pub use aggregate::{AggOp, Aggregation, Dimension, GroupKey, Metric};
pub use encoding::decode;
pub use error::DataFormatError;
pub use record::{Record, Value, UNKNOWN};
pub use store::{LoadOptions, LoadReport, Store};
