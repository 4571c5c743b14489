//! CSV run log for subprompt.
//!
//! Every generation run is appended as one row. Runs don't all carry the
//! same parameters, so the header is the union of every column seen so far:
//! a record with a new column extends the header and pads older rows with
//! empty cells.
//!
//! ```text
//! run_id,timestamp,prompt,subprompts,weights,seed
//! 4f0c…,2026-10-19T09:12:03Z,a cat:0.5 a dog,a cat | a dog,0.5;1,42
//! ```

mod csv;
mod log;
mod record;

pub use log::{RUN_ID_COLUMN, RunLog, TIMESTAMP_COLUMN};
pub use record::{RunRecord, SUBPROMPT_SEPARATOR, WEIGHT_SEPARATOR};

/// Errors from the run log.
#[derive(Debug, thiserror::Error)]
pub enum RunLogError {
    #[error("run log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed run log at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("run record has no columns")]
    EmptyRecord,
}

impl From<RunLogError> for subprompt_core::Error {
    fn from(e: RunLogError) -> Self {
        subprompt_core::Error::RunLog(Box::new(e))
    }
}
