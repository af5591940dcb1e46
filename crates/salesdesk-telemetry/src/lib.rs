//! Query log, export formats and on-disk locations for salesdesk state

mod io;
mod log;
mod paths;
mod types;

pub use io::{append_jsonl, atomic_write, read_jsonl};
pub use log::{ExportError, ExportFormat, QueryLog};
pub use paths::Paths;
pub use types::{QueryLogEntry, StrategyTag};
