//! **waymark-core**: foundational types for the waymark pathfinding engine.
//!
//! This crate provides geometry primitives shared by graphs and searches, a
//! cooperative [`CancelToken`], the [`Dispatcher`] that carries completions
//! from worker threads back to the owning thread, and the bounded
//! [`WorkerPool`] searches run on.

pub mod cancel;
pub mod dispatcher;
pub mod geom;
pub mod pool;

pub use cancel::CancelToken;
pub use dispatcher::{Callback, Dispatcher};
pub use geom::{Area, Planar, Point, Range, Vec2, Vec3};
pub use pool::{PoolError, WorkerPool};
