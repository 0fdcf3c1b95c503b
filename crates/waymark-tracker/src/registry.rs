use std::any::{Any, type_name};
use std::sync::Arc;

use waymark_core::{Area, CancelToken, Dispatcher, Planar, WorkerPool};
use waymark_paths::{Callbacks, SearchEngine, SearchHandle, SearchOptions, SpatialGraph};

use crate::{NavigationTree, PathModifier, TrackerConfig, TrackerError};

/// Receives the farthest point of a direction search.
pub type PointCallback<P> = Box<dyn FnOnce(P) + Send>;

struct Entry {
    name: String,
    tree: Arc<dyn NavigationTree>,
    /// The graph as registered, an `Arc<G>`.
    concrete: Arc<dyn Any + Send + Sync>,
    /// `Arc<dyn SpatialGraph<Point = P>>` boxed as `Any`.
    searchable: Box<dyn Any + Send + Sync>,
}

/// Registry of navigation graphs.
///
/// Queries are routed by graph index, run on the registry's worker pool and
/// answered through its [`Dispatcher`]: no callback runs before the owner
/// calls [`tick`](Tracker::tick), and every callback runs on the thread that
/// does.
pub struct Tracker {
    config: TrackerConfig,
    entries: Vec<Entry>,
    pool: WorkerPool,
    dispatcher: Arc<Dispatcher>,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("config", &self.config)
            .field("graphs", &self.entries.iter().map(|e| &e.name).collect::<Vec<_>>())
            .field("pending", &self.dispatcher.len())
            .finish()
    }
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        Self::with_dispatcher(config, Arc::new(Dispatcher::new()))
    }

    /// A registry delivering through an existing dispatcher.
    pub fn with_dispatcher(config: TrackerConfig, dispatcher: Arc<Dispatcher>) -> Result<Self, TrackerError> {
        let pool = WorkerPool::new(config.max_threads)?;
        Ok(Self {
            config,
            entries: Vec::new(),
            pool,
            dispatcher,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Register `graph` under `name` and return its index.
    pub fn register<G>(&mut self, name: impl Into<String>, graph: Arc<G>) -> usize
    where
        G: SpatialGraph + NavigationTree + 'static,
    {
        let name = name.into();
        let searchable: Arc<dyn SpatialGraph<Point = G::Point>> = graph.clone();
        let tree: Arc<dyn NavigationTree> = graph.clone();
        self.entries.push(Entry {
            name,
            tree,
            concrete: graph,
            searchable: Box::new(searchable),
        });
        self.entries.len() - 1
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn graph_count(&self) -> usize {
        self.entries.len()
    }

    pub fn has_graph(&self, index: usize) -> bool {
        index < self.entries.len()
    }

    /// The graph at `index`, if it is a `G`.
    pub fn graph_as<G: Any + Send + Sync>(&self, index: usize) -> Option<Arc<G>> {
        let entry = self.entries.get(index)?;
        Arc::clone(&entry.concrete).downcast::<G>().ok()
    }

    pub fn tree(&self, index: usize) -> Option<&Arc<dyn NavigationTree>> {
        self.entries.get(index).map(|e| &e.tree)
    }

    pub fn initialize_all(&self) {
        for entry in &self.entries {
            entry.tree.initialize();
            log::info!(
                "graph '{}' initialized: {} regions",
                entry.name,
                entry.tree.region_count()
            );
        }
    }

    /// Refresh one graph after a world change. Returns `false` for an
    /// unknown index.
    pub fn update_graph(&self, index: usize, area: Option<Area>) -> bool {
        match self.entries.get(index) {
            Some(entry) => {
                entry.tree.update_area(area);
                true
            }
            None => {
                log::warn!("update requested for unknown graph {index}");
                false
            }
        }
    }

    /// Application start: initialize every graph when configured to.
    pub fn start(&self) {
        if self.config.initialize_on_start {
            self.initialize_all();
        }
    }

    /// Deliver completed queries. Returns the number of callbacks run.
    pub fn tick(&self) -> usize {
        self.dispatcher.drain()
    }

    fn searchable<P: Planar>(&self, index: usize) -> Result<Arc<dyn SpatialGraph<Point = P>>, TrackerError> {
        let entry = self
            .entries
            .get(index)
            .ok_or(TrackerError::TreeNotFound(index))?;
        entry
            .searchable
            .downcast_ref::<Arc<dyn SpatialGraph<Point = P>>>()
            .cloned()
            .ok_or(TrackerError::TreeTypeMismatch {
                index,
                expected: type_name::<P>(),
            })
    }

    fn report(&self, err: TrackerError, on_error: impl FnOnce(TrackerError) + Send + 'static) {
        log::warn!("query rejected: {err}");
        self.dispatcher.enqueue(move || on_error(err));
    }

    fn engine<P: Planar>(
        &self,
        tree_index: usize,
        on_error: impl FnOnce(TrackerError) + Send + 'static,
    ) -> Option<(SearchEngine<dyn SpatialGraph<Point = P>>, ErrorSink)> {
        match self.searchable::<P>(tree_index) {
            Ok(graph) => {
                let engine = SearchEngine::new(graph);
                let sink = ErrorSink {
                    dispatcher: Arc::clone(&self.dispatcher),
                    token: engine.token().clone(),
                    on_error: Box::new(on_error),
                };
                Some((engine, sink))
            }
            Err(err) => {
                self.report(err, on_error);
                None
            }
        }
    }

    /// Find a path on graph `tree_index`. The path passes through
    /// `modifiers` in order and reaches `on_done` on the next tick after
    /// the search completes.
    ///
    /// Returns `None` if the query could not be routed; the reason is
    /// delivered to `on_error` like any other failure.
    #[allow(clippy::too_many_arguments)]
    pub fn search_path<P: Planar>(
        &self,
        tree_index: usize,
        from: P,
        to: P,
        on_done: impl FnOnce(Vec<P>) + Send + 'static,
        on_error: impl FnOnce(TrackerError) + Send + 'static,
        modifiers: &[Arc<dyn PathModifier<P>>],
        options: SearchOptions,
    ) -> Option<SearchHandle> {
        let (engine, sink) = self.engine::<P>(tree_index, on_error)?;
        let on_path = path_delivery(&self.dispatcher, engine.token(), modifiers, on_done);
        let callbacks = Callbacks::new(on_path, move |err| sink.send(err));
        Some(engine.find_path_async(&self.pool, from, to, options, callbacks))
    }

    /// Walk `distance` along `direction` on graph `tree_index`.
    ///
    /// With `on_point` set only the farthest point is delivered there;
    /// otherwise the path to it goes through `modifiers` to `on_done`.
    #[allow(clippy::too_many_arguments)]
    pub fn search_by_direction<P: Planar>(
        &self,
        tree_index: usize,
        from: P,
        direction: P,
        distance: f32,
        on_done: impl FnOnce(Vec<P>) + Send + 'static,
        on_error: impl FnOnce(TrackerError) + Send + 'static,
        modifiers: &[Arc<dyn PathModifier<P>>],
        on_point: Option<PointCallback<P>>,
        options: SearchOptions,
    ) -> Option<SearchHandle> {
        let (engine, sink) = self.engine::<P>(tree_index, on_error)?;
        let on_path = path_delivery(&self.dispatcher, engine.token(), modifiers, on_done);
        let mut callbacks = Callbacks::new(on_path, move |err| sink.send(err));
        if let Some(on_point) = on_point {
            let dispatcher = Arc::clone(&self.dispatcher);
            let token = engine.token().clone();
            callbacks = callbacks.on_point(move |point| {
                dispatcher.enqueue(move || {
                    if !token.is_cancelled() {
                        on_point(point);
                    }
                });
            });
        }
        Some(engine.find_direction_path_async(&self.pool, from, direction, distance, options, callbacks))
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.dispatcher.clear();
    }
}

/// Worker-side path callback: run the modifiers, then queue `on_done`.
fn path_delivery<P: Planar>(
    dispatcher: &Arc<Dispatcher>,
    token: &CancelToken,
    modifiers: &[Arc<dyn PathModifier<P>>],
    on_done: impl FnOnce(Vec<P>) + Send + 'static,
) -> impl FnOnce(Vec<P>) + Send + 'static {
    let dispatcher = Arc::clone(dispatcher);
    let token = token.clone();
    let modifiers = modifiers.to_vec();
    move |path: Vec<P>| {
        let path = modifiers.iter().fold(path, |p, m| m.modify(p));
        dispatcher.enqueue(move || {
            if !token.is_cancelled() {
                on_done(path);
            }
        });
    }
}

/// Worker-side error callback.
struct ErrorSink {
    dispatcher: Arc<Dispatcher>,
    token: CancelToken,
    on_error: Box<dyn FnOnce(TrackerError) + Send>,
}

impl ErrorSink {
    fn send(self, err: waymark_paths::SearchError) {
        let Self {
            dispatcher,
            token,
            on_error,
        } = self;
        dispatcher.enqueue(move || {
            if !token.is_cancelled() {
                on_error(err.into());
            }
        });
    }
}
