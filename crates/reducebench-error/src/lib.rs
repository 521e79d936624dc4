//! Unified error types for reducebench.
//!
//! Every layer owns one enum here so that the batch loop can turn any
//! aggregation failure into a single status cell via `Display`.
//! Display strings therefore carry the underlying cause inline.

use std::path::PathBuf;

/// Errors from the I/O-free summary logic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("metrics table has no rows")]
    NoRows,

    #[error("baseline final size is 0 bytes; ratio is undefined")]
    ZeroBaselineBytes,
}

/// Errors raised while reading one workfolder.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: metrics table has no rows", path.display())]
    EmptyMetrics { path: PathBuf },

    #[error("invalid capture pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("walk {pattern}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::GlobError,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Errors from the process and filesystem adapters.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("command argv must not be empty")]
    EmptyArgv,

    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AdapterError {
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AdapterError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Errors from loading and merging configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown decompiler: {0} (expected cfr|fernflower|procyon)")]
    UnknownDecompiler(String),

    #[error("invalid case {0:?} (expected NAME:DECOMPILER)")]
    InvalidCase(String),
}
