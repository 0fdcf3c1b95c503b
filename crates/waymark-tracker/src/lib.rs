//! Registry of navigation graphs with asynchronous, tick-delivered queries.
//!
//! A [`Tracker`] owns a worker pool and a dispatcher. Graphs are registered
//! under a name and addressed by index; path and direction queries run on
//! the pool, pass through any [`PathModifier`]s, and reach their callbacks
//! only when the owner calls [`Tracker::tick`].
//!
//! ```
//! use std::sync::Arc;
//! use waymark_core::Vec2;
//! use waymark_paths::{GridConfig, GridGraph, ObstacleField, SearchOptions};
//! use waymark_tracker::{Tracker, TrackerConfig};
//!
//! let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
//! let grid = GridGraph::new(GridConfig::unit(8, 8), Arc::new(ObstacleField::default())).unwrap();
//! let ground = tracker.register("ground", Arc::new(grid));
//! tracker.start();
//!
//! let handle = tracker.search_path(
//!     ground,
//!     Vec2::new(0.5, 0.5),
//!     Vec2::new(7.5, 7.5),
//!     |path| println!("{} points", path.len()),
//!     |err| eprintln!("{err}"),
//!     &[],
//!     SearchOptions::default(),
//! );
//! assert!(handle.is_some());
//! ```

mod config;
mod error;
mod modifier;
mod registry;
mod tree;

pub use config::TrackerConfig;
pub use error::TrackerError;
pub use modifier::{CollinearSimplifier, PathModifier};
pub use registry::{PointCallback, Tracker};
pub use tree::NavigationTree;
