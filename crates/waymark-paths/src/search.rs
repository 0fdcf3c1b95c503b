//! Best-first searches over any [`SpatialGraph`].

use std::sync::Arc;

use waymark_core::{CancelToken, Planar, WorkerPool};

use crate::handle::SearchHandle;
use crate::node::{Frontier, Priority};
use crate::{RegionId, SearchError, SpatialGraph};

/// Expansion budget of a single search.
pub const MAX_ITERATIONS: usize = 1000;

/// Optional per-search constraints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Snap the endpoints into this region when one of its cells is nearby.
    pub region: Option<RegionId>,
    /// Node the caller already stands on. Used as the start as-is when
    /// valid, skipping endpoint resolution.
    pub known_start: Option<usize>,
}

impl SearchOptions {
    pub fn in_region(region: RegionId) -> Self {
        Self {
            region: Some(region),
            known_start: None,
        }
    }

    pub fn known_start(mut self, index: usize) -> Self {
        self.known_start = Some(index);
        self
    }
}

type PathFn<P> = Box<dyn FnOnce(Vec<P>) + Send>;
type PointFn<P> = Box<dyn FnOnce(P) + Send>;
type ErrorFn = Box<dyn FnOnce(SearchError) + Send>;

/// Completion callbacks of an asynchronous search. They run on the worker
/// thread, and at most one of them runs.
pub struct Callbacks<P> {
    on_path: PathFn<P>,
    on_error: ErrorFn,
    on_point: Option<PointFn<P>>,
}

impl<P: Planar> Callbacks<P> {
    pub fn new(
        on_path: impl FnOnce(Vec<P>) + Send + 'static,
        on_error: impl FnOnce(SearchError) + Send + 'static,
    ) -> Self {
        Self {
            on_path: Box::new(on_path),
            on_error: Box::new(on_error),
            on_point: None,
        }
    }

    /// Direction searches only: receive the farthest point instead of a
    /// path to it.
    pub fn on_point(mut self, f: impl FnOnce(P) + Send + 'static) -> Self {
        self.on_point = Some(Box::new(f));
        self
    }
}

impl<P> std::fmt::Debug for Callbacks<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_point", &self.on_point.is_some())
            .finish_non_exhaustive()
    }
}

/// Path queries against one graph.
///
/// Searches run from the goal towards the start, so following parent links
/// from the start yields the path already in start-to-goal order. Every
/// search started from an engine shares its [`CancelToken`].
pub struct SearchEngine<G: SpatialGraph + ?Sized> {
    graph: Arc<G>,
    cancel: CancelToken,
}

impl<G: SpatialGraph + ?Sized> Clone for SearchEngine<G> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
            cancel: self.cancel.clone(),
        }
    }
}

impl<G: SpatialGraph + ?Sized + 'static> SearchEngine<G> {
    pub fn new(graph: Arc<G>) -> Self {
        Self {
            graph,
            cancel: CancelToken::new(),
        }
    }

    pub fn graph(&self) -> &Arc<G> {
        &self.graph
    }

    /// Stop every search running on this engine, present and future.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The token shared by this engine's searches and their handles.
    pub fn token(&self) -> &CancelToken {
        &self.cancel
    }

    #[inline]
    fn check_cancel(&self) -> Result<(), SearchError> {
        if self.cancel.is_cancelled() {
            Err(SearchError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Shortest path between the nodes nearest to `from` and `to`, both
    /// ends included.
    pub fn find_path(
        &self,
        from: G::Point,
        to: G::Point,
        options: SearchOptions,
    ) -> Result<Vec<G::Point>, SearchError> {
        self.path(from, to, options, None)
    }

    /// Like [`find_path`](Self::find_path), but gives up with
    /// [`SearchError::ExitFilterBroken`] as soon as any candidate lies
    /// farther from the start than the goal did. A cheap reachability probe:
    /// it can reject targets that need a detour.
    pub fn find_path_to(
        &self,
        from: G::Point,
        to: G::Point,
        options: SearchOptions,
    ) -> Result<Vec<G::Point>, SearchError> {
        let g = &*self.graph;
        let limit = g.heuristic(g.node_index(from), g.node_index(to));
        self.path(from, to, options, Some(limit))
    }

    fn resolve_start(&self, from: G::Point, reference: G::Point, options: SearchOptions) -> usize {
        let g = &*self.graph;
        match options.known_start {
            Some(known) if g.is_valid(known, None) => known,
            _ => g.nearest_available(g.node_index(from), reference, options.region),
        }
    }

    fn path(
        &self,
        from: G::Point,
        to: G::Point,
        options: SearchOptions,
        exit_limit: Option<f32>,
    ) -> Result<Vec<G::Point>, SearchError> {
        self.check_cancel()?;
        let g = &*self.graph;
        let start = self.resolve_start(from, to, options);
        if !g.is_valid(start, None) {
            return Err(SearchError::InvalidStart);
        }
        let goal = g.nearest_available(g.node_index(to), from, options.region);
        if !g.is_valid(goal, None) {
            return Err(SearchError::InvalidDestination);
        }
        if start == goal {
            return Ok(vec![g.point_at(start)]);
        }

        let mut frontier = Frontier::new(Priority::Total);
        frontier.seed(goal, 0.0, g.heuristic(start, goal));
        let mut nbuf = vec![None; g.neighbor_count()];
        let mut ticks = 0;

        while let Some(current) = frontier.pop() {
            self.check_cancel()?;
            if current == start {
                return Ok(frontier.trace(start).into_iter().map(|i| g.point_at(i)).collect());
            }
            ticks += 1;
            if ticks > MAX_ITERATIONS {
                return Err(SearchError::IterationCapExceeded(MAX_ITERATIONS));
            }
            // The graph may have changed under us since this node was opened.
            if !g.is_valid(current, None) {
                return Err(SearchError::ObstacleInterrupted);
            }

            let cost = frontier.get(current).map_or(0.0, |n| n.cost);
            g.neighbors(current, false, &mut nbuf);
            for &n in nbuf.iter().flatten() {
                let h = g.heuristic(start, n);
                if exit_limit.is_some_and(|limit| h > limit) {
                    return Err(SearchError::ExitFilterBroken);
                }
                frontier.relax(n, cost + g.edge_cost(current, n), h, current);
            }
        }

        self.check_cancel()?;
        Err(SearchError::Unreachable)
    }

    /// Walk from `from` roughly along `direction` until `distance` is
    /// covered, and return the farthest point reached.
    ///
    /// Candidates are ranked by how well their step matches `direction`
    /// (L1 of the difference), not by distance to any goal. Running out of
    /// iterations just ends the walk.
    pub fn farthest_in_direction(
        &self,
        from: G::Point,
        direction: G::Point,
        distance: f32,
        options: SearchOptions,
    ) -> Result<G::Point, SearchError> {
        self.check_cancel()?;
        let g = &*self.graph;
        let raw = g.node_index(from);
        let start = match options.known_start {
            Some(known) if g.is_valid(known, None) => known,
            _ => g.nearest_available(raw, g.point_at(raw), options.region),
        };
        if !g.is_valid(start, None) {
            return Err(SearchError::InvalidStart);
        }

        let mut frontier = Frontier::new(Priority::Heuristic);
        frontier.seed(start, 0.0, 0.0);
        let mut nbuf = vec![None; g.neighbor_count()];
        let (mut best, mut best_cost) = (start, 0.0);
        let mut ticks = 0;

        while let Some(current) = frontier.pop() {
            self.check_cancel()?;
            if !g.is_valid(current, None) {
                return Err(SearchError::ObstacleInterrupted);
            }
            if frontier.get(current).is_some_and(|n| n.cost >= distance) {
                break;
            }
            ticks += 1;
            if ticks > MAX_ITERATIONS {
                break;
            }

            let here = g.point_at(current);
            g.neighbors(current, false, &mut nbuf);
            for &n in nbuf.iter().flatten() {
                let cost = g.edge_cost(start, n);
                if cost > best_cost {
                    best = n;
                    best_cost = cost;
                }
                let alignment = (g.point_at(n) - here - direction).l1();
                frontier.relax(n, cost, alignment, current);
            }
        }

        self.check_cancel()?;
        Ok(g.point_at(best))
    }

    /// Path from `from` to [`farthest_in_direction`](Self::farthest_in_direction).
    pub fn find_direction_path(
        &self,
        from: G::Point,
        direction: G::Point,
        distance: f32,
        options: SearchOptions,
    ) -> Result<Vec<G::Point>, SearchError> {
        let target = self.farthest_in_direction(from, direction, distance, options)?;
        self.find_path(from, target, options)
    }

    // -----------------------------------------------------------------------
    // Asynchronous variants
    // -----------------------------------------------------------------------

    fn submit<T, W, D>(&self, pool: &WorkerPool, work: W, deliver: D, on_error: ErrorFn) -> SearchHandle
    where
        T: Send + 'static,
        W: FnOnce(&Self) -> Result<T, SearchError> + Send + 'static,
        D: FnOnce(T) + Send + 'static,
    {
        let handle = SearchHandle::new(self.cancel.clone());
        let job = handle.clone();
        let engine = self.clone();
        pool.spawn(move || {
            if !job.begin() {
                return;
            }
            let result = work(&engine);
            job.settle(result, deliver, on_error);
        });
        handle
    }

    /// [`find_path`](Self::find_path) on `pool`.
    pub fn find_path_async(
        &self,
        pool: &WorkerPool,
        from: G::Point,
        to: G::Point,
        options: SearchOptions,
        callbacks: Callbacks<G::Point>,
    ) -> SearchHandle {
        let Callbacks {
            on_path, on_error, ..
        } = callbacks;
        self.submit(pool, move |e| e.find_path(from, to, options), on_path, on_error)
    }

    /// [`find_path_to`](Self::find_path_to) on `pool`.
    pub fn find_path_to_async(
        &self,
        pool: &WorkerPool,
        from: G::Point,
        to: G::Point,
        options: SearchOptions,
        callbacks: Callbacks<G::Point>,
    ) -> SearchHandle {
        let Callbacks {
            on_path, on_error, ..
        } = callbacks;
        self.submit(pool, move |e| e.find_path_to(from, to, options), on_path, on_error)
    }

    /// Direction search on `pool`. Delivers the farthest point to the point
    /// callback when one is set, the full path otherwise.
    pub fn find_direction_path_async(
        &self,
        pool: &WorkerPool,
        from: G::Point,
        direction: G::Point,
        distance: f32,
        options: SearchOptions,
        callbacks: Callbacks<G::Point>,
    ) -> SearchHandle {
        let Callbacks {
            on_path,
            on_error,
            on_point,
        } = callbacks;
        match on_point {
            Some(on_point) => self.submit(
                pool,
                move |e| e.farthest_in_direction(from, direction, distance, options),
                on_point,
                on_error,
            ),
            None => self.submit(
                pool,
                move |e| e.find_direction_path(from, direction, distance, options),
                on_path,
                on_error,
            ),
        }
    }
}
