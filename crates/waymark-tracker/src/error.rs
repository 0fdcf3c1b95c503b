use thiserror::Error;
use waymark_core::PoolError;
use waymark_paths::{ConfigError, SearchError};

/// Everything a registry query can report to its error callback.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("no graph registered at index {0}")]
    TreeNotFound(usize),

    #[error("graph {index} does not search over {expected}")]
    TreeTypeMismatch { index: usize, expected: &'static str },

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("invalid graph configuration: {0}")]
    Config(#[from] ConfigError),
}
