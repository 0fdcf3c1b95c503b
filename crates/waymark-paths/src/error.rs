//! Error types for graphs and searches.

use thiserror::Error;

/// Why a search produced no path.
///
/// Every variant except [`Cancelled`](SearchError::Cancelled) is reported to
/// the caller's error callback. A failed search never mutates the graph.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error("starting point is not part of the graph, or is not a walkable node")]
    InvalidStart,

    #[error("desired destination is not part of the graph, or is not a walkable node")]
    InvalidDestination,

    #[error("obstacle interrupted search")]
    ObstacleInterrupted,

    #[error("cannot find a path: path is broken by exit filter")]
    ExitFilterBroken,

    #[error("no path found within {0} iterations")]
    IterationCapExceeded(usize),

    #[error("no path exists between start and destination")]
    Unreachable,

    /// The search observed its cancellation flag. Never delivered to callbacks.
    #[error("search cancelled")]
    Cancelled,
}

/// Rejected grid configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("node size must be positive and finite, got {0}")]
    NodeSize(f32),

    #[error("grid extents must be non-negative and finite, got {0}")]
    Extents(String),

    #[error("grid center must be finite, got {0}")]
    Center(String),

    #[error("max slope must be finite, got {0}")]
    MaxSlope(f32),

    #[error("obstacle padding must be non-negative and finite, got {0}")]
    ObstaclePadding(f32),

    #[error("grid of {columns} x {rows} cells exceeds the limit of {limit} cells")]
    TooManyCells { columns: f64, rows: f64, limit: usize },
}
