//! Spatial graphs and path searches for terrain navigation.
//!
//! - **Grid graph** over sampled terrain, with walkability, clearance and
//!   connected regions ([`GridGraph`])
//! - **A\*-style path search** from goal to start, with a cheap
//!   reachability probe ([`SearchEngine::find_path`],
//!   [`SearchEngine::find_path_to`])
//! - **Direction search** that walks along a heading for a distance
//!   ([`SearchEngine::farthest_in_direction`])
//! - **Asynchronous searches** on a [`WorkerPool`](waymark_core::WorkerPool),
//!   observed and cancelled through a [`SearchHandle`]
//!
//! Searches only see a graph through [`SpatialGraph`], so any graph type,
//! including a trait object, can be searched.
//!
//! # Traits
//!
//! | Trait | Role |
//! |---|---|
//! | [`SpatialGraph`] | node topology, costs and validity a search reads |
//! | [`Environment`] | terrain and obstacle queries a grid samples |

mod distance;
pub mod environment;
mod error;
pub mod grid;
mod handle;
mod index_set;
mod neighbors;
mod node;
mod search;
mod traits;

pub use distance::{euclidean, manhattan};
pub use environment::{Environment, Obstacle, ObstacleField, TerrainPatch, TerrainSample};
pub use error::{ConfigError, SearchError};
pub use grid::{Cell, GridConfig, GridGraph, GridLayout};
pub use handle::{SearchHandle, SearchState};
pub use index_set::SwapRemoveIndexSet;
pub use neighbors::{Neighbors, OFFSETS};
pub use search::{Callbacks, MAX_ITERATIONS, SearchEngine, SearchOptions};
pub use traits::{RegionId, SpatialGraph};
