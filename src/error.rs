//! Error types for markover operations.

use thiserror::Error;

use crate::text::FragmentKey;

/// Boxed error returned by a caller-supplied transform.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while rewriting an HTML fragment.
#[derive(Error, Debug)]
pub enum Error {
    #[error("[markover/{entry}] this entry point is designed for {expected} environments only; {hint}")]
    EnvironmentMismatch {
        entry: &'static str,
        expected: &'static str,
        hint: &'static str,
    },

    #[error("invalid runtime {0:?}: expected one of \"browser\", \"node\"")]
    InvalidRuntime(String),

    #[error("transform failed for fragment {key}: {source}")]
    Transform {
        key: FragmentKey,
        #[source]
        source: BoxError,
    },

    #[error("tree engine error: {0}")]
    Engine(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
