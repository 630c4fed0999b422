//! Crate-wide error type. Every variant carries a short tag identifying the
//! originating section so a diagnostic can be traced back without a
//! backtrace (§7: "location tag and the underlying cause").

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("{tag}: io error reading/writing {path}: {source}")]
    Io {
        tag: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tag}: malformed line {line} in {path}: {reason}")]
    Parse {
        tag: &'static str,
        path: String,
        line: usize,
        reason: String,
    },

    #[error("obstacle::load: coordinate ({x}, {y}) out of range for grid")]
    InvalidObstacle { x: i64, y: i64 },

    #[error("params::validate: field `{field}` has invalid value {value}")]
    InvalidParam { field: &'static str, value: String },

    #[error("decomposition::plan: {reason}")]
    Decomposition { reason: String },

    #[error("exchange::{tag}: rendezvous channel failed: {reason}")]
    Exchange { tag: &'static str, reason: String },
}

impl SolverError {
    pub fn io(tag: &'static str, path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            tag,
            path: path.into(),
            source,
        }
    }
}

pub type SolverResult<T> = Result<T, SolverError>;
