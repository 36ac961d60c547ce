//! ResultLog - append-only per-respondent result logs
//!
//! Every respondent owns one CSV file. Rows are only ever appended; nothing in
//! this crate rewrites, reorders or deletes a row once it is on disk.
//!
//! # Layout
//!
//! ```text
//! results_eval/
//! ├── eval_yamada.csv
//! ├── eval_suzuki.csv
//! └── ...
//! ```
//!
//! Each file starts with a header row naming the fields
//! `timestamp,user,image_file,region,prompt_type,authenticity,fidelity,naturalness,harmony`.
//!
//! # Example
//!
//! ```ignore
//! use resultlog::{LogStore, RespondentId};
//!
//! let store = LogStore::open("results_eval")?;
//! let id = RespondentId::new("yamada")?;
//! let done = store.load_done_set(&id);
//! ```

mod error;
mod metric;
mod record;
mod respondent;
mod store;

pub use error::{InvalidScore, LogError, LogReadError};
pub use metric::{LIKERT_LABELS, Metric, Score, Scores};
pub use record::{RECORD_FIELDS, ResponseRecord};
pub use respondent::RespondentId;
pub use store::{DoneSet, LogEntry, LogStore};

/// File name prefix for result logs
pub const LOG_PREFIX: &str = "eval_";

/// File extension for result logs
pub const LOG_EXTENSION: &str = "csv";

/// Timestamp format written into the `timestamp` column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
