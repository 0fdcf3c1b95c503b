//! Uniform 8-connected grid over a rectangle of terrain.

mod cell;
mod config;
mod layout;
mod nearest;
mod region;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use waymark_core::{Area, Point, Range, Vec2, WorkerPool};

pub use cell::Cell;
pub use config::{GridConfig, MAX_CELLS};
pub use layout::GridLayout;
pub use nearest::{NEAREST_MAX_TICKS, NEAREST_MAX_WALKABLE};

use crate::distance::{euclidean, manhattan};
use crate::environment::Environment;
use crate::{ConfigError, RegionId, SpatialGraph};

struct GridState {
    config: GridConfig,
    layout: GridLayout,
    cells: Vec<Cell>,
    regions: RegionId,
}

impl GridState {
    fn build(config: GridConfig) -> Self {
        let layout = GridLayout::new(&config);
        let cells = (0..layout.len()).map(|i| Cell::new(layout.position(i))).collect();
        Self {
            config,
            layout,
            cells,
            regions: 0,
        }
    }

    fn cells_in(&self, area: Option<Area>, wide: bool) -> Range {
        match area {
            Some(area) => self.layout.cells_in(area, wide),
            None => self.layout.range(),
        }
    }
}

/// Clears the region-pass flag when dropped.
struct RegionPass<'a>(&'a AtomicBool);

impl<'a> RegionPass<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RegionPass<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A walkability grid backed by an [`Environment`].
///
/// All state sits behind one reader-writer lock: queries and searches read,
/// walkability and region passes write. A region pass already in flight
/// makes further region requests no-ops.
///
/// ```
/// use std::sync::Arc;
/// use waymark_core::Vec2;
/// use waymark_paths::{GridConfig, GridGraph, ObstacleField, SpatialGraph};
///
/// let grid = GridGraph::new(GridConfig::unit(4, 4), Arc::new(ObstacleField::default())).unwrap();
/// grid.initialize();
/// assert_eq!(grid.node_count(), 16);
/// assert_eq!(grid.region_count(), 1);
/// assert_eq!(grid.closest_node(Vec2::new(3.9, 0.1)), 3);
/// ```
pub struct GridGraph {
    environment: Arc<dyn Environment>,
    state: RwLock<GridState>,
    region_pass: AtomicBool,
}

impl std::fmt::Debug for GridGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("GridGraph")
            .field("columns", &state.layout.columns())
            .field("rows", &state.layout.rows())
            .field("regions", &state.regions)
            .finish_non_exhaustive()
    }
}

impl GridGraph {
    /// A grid laid out per `config`. Every cell starts unwalkable; call
    /// [`initialize`](Self::initialize) to sample the environment.
    pub fn new(config: GridConfig, environment: Arc<dyn Environment>) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = GridState::build(config);
        log::debug!(
            "grid laid out: {} columns x {} rows",
            state.layout.columns(),
            state.layout.rows()
        );
        Ok(Self {
            environment,
            state: RwLock::new(state),
            region_pass: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> GridConfig {
        self.state.read().config
    }

    pub fn layout(&self) -> GridLayout {
        self.state.read().layout
    }

    /// Rebuild the cell array from the current configuration. All cells
    /// come back unsampled and unlabelled.
    pub fn regenerate(&self) {
        let mut state = self.state.write();
        *state = GridState::build(state.config);
        log::debug!(
            "grid regenerated: {} columns x {} rows",
            state.layout.columns(),
            state.layout.rows()
        );
    }

    /// Replace the configuration and regenerate.
    pub fn reconfigure(&self, config: GridConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.state.write().config = config;
        self.regenerate();
        Ok(())
    }

    /// Regenerate, sample every cell, then label regions.
    pub fn initialize(&self) {
        self.regenerate();
        self.update();
        self.update_regions();
    }

    /// Resample every cell. Returns how many cells changed walkability.
    pub fn update(&self) -> usize {
        self.sample_cells(None, false)
    }

    /// Resample the cells in `area` (see [`GridLayout::cells_in`] for
    /// `wide`). Returns how many cells changed walkability.
    ///
    /// Region ids are left alone apart from cells that stopped being
    /// walkable; follow up with [`update_regions`](Self::update_regions).
    pub fn update_area(&self, area: Area, wide: bool) -> usize {
        self.sample_cells(Some(area), wide)
    }

    /// Refresh height and slope of every cell without touching walkability.
    pub fn update_terrain(&self) {
        self.sample_terrain(None);
    }

    pub fn update_terrain_area(&self, area: Area) {
        self.sample_terrain(Some(area));
    }

    fn sample_cells(&self, area: Option<Area>, wide: bool) -> usize {
        let env = &*self.environment;
        let mut state = self.state.write();
        let range = state.cells_in(area, wide);
        let GridState {
            config,
            layout,
            cells,
            ..
        } = &mut *state;
        let mut changed = 0;
        for p in range {
            if let Some(i) = layout.index(p) {
                changed += usize::from(cells[i].sample(env, config));
            }
        }
        log::debug!(
            "walkability pass over {} cells: {} changed, {} walkable",
            range.len(),
            changed,
            cells.iter().filter(|c| c.walkable).count()
        );
        changed
    }

    fn sample_terrain(&self, area: Option<Area>) {
        let env = &*self.environment;
        let mut state = self.state.write();
        let range = state.cells_in(area, false);
        let GridState { layout, cells, .. } = &mut *state;
        for p in range {
            if let Some(i) = layout.index(p) {
                cells[i].sample_terrain(env);
            }
        }
    }

    /// Label connected walkable cells. Returns `false` without doing
    /// anything if a region pass is already running.
    pub fn update_regions(&self) -> bool {
        let Some(_pass) = RegionPass::acquire(&self.region_pass) else {
            log::debug!("region pass already running, request dropped");
            return false;
        };
        self.label_regions();
        true
    }

    /// Run the region pass on `pool`. Returns `false` if one is already
    /// running, in which case nothing is queued.
    pub fn update_regions_async(self: &Arc<Self>, pool: &WorkerPool) -> bool {
        let Some(pass) = RegionPass::acquire(&self.region_pass) else {
            log::debug!("region pass already running, request dropped");
            return false;
        };
        // Ownership of the flag moves to the job, which releases it.
        std::mem::forget(pass);
        let grid = Arc::clone(self);
        pool.spawn(move || {
            let _pass = RegionPass(&grid.region_pass);
            grid.label_regions();
        });
        true
    }

    fn label_regions(&self) {
        let mut state = self.state.write();
        let columns = state.layout.columns();
        state.regions = region::label_regions(&mut state.cells, columns);
        log::debug!("region pass found {} regions", state.regions);
    }

    /// Whether a region pass is in flight.
    pub fn regions_locked(&self) -> bool {
        self.region_pass.load(Ordering::Acquire)
    }

    pub fn region_count(&self) -> usize {
        self.state.read().regions as usize
    }

    pub fn columns(&self) -> usize {
        self.state.read().layout.columns()
    }

    pub fn rows(&self) -> usize {
        self.state.read().layout.rows()
    }

    /// Copy of the cell at `index`.
    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.state.read().cells.get(index).copied()
    }

    pub fn cell_index(&self, p: Point) -> Option<usize> {
        self.state.read().layout.index(p)
    }

    pub fn coords(&self, index: usize) -> Point {
        self.state.read().layout.coords(index)
    }

    /// Index of the cell containing `point`, clamped onto the grid.
    pub fn closest_node(&self, point: Vec2) -> usize {
        self.state.read().layout.node_index(point)
    }

    pub fn walkable_count(&self) -> usize {
        self.state.read().cells.iter().filter(|c| c.walkable).count()
    }

    /// Region of whatever stands at `point`. On a cell without a region
    /// this falls back to `last_region`, so an agent briefly crossing a
    /// disabled cell keeps its region.
    pub fn region_at(&self, point: Vec2, last_region: Option<RegionId>) -> Option<RegionId> {
        let state = self.state.read();
        let index = state.layout.node_index(point);
        state
            .cells
            .get(index)
            .and_then(|c| c.region)
            .or(last_region)
    }

    /// Whether `to` is walkable and in the same region as `from`.
    pub fn is_reachable(&self, from: Vec2, to: Vec2) -> bool {
        let state = self.state.read();
        let a = state.cells.get(state.layout.node_index(from));
        let b = state.cells.get(state.layout.node_index(to));
        match (a, b) {
            (Some(a), Some(b)) => b.walkable && a.region.is_some() && a.region == b.region,
            _ => false,
        }
    }

    /// Visit every cell in index order.
    pub fn for_each(&self, mut f: impl FnMut(usize, &Cell)) {
        let state = self.state.read();
        for (i, cell) in state.cells.iter().enumerate() {
            f(i, cell);
        }
    }

    /// Visit the cells in `area`, row by row.
    pub fn for_each_in(&self, area: Area, wide: bool, mut f: impl FnMut(usize, &Cell)) {
        let state = self.state.read();
        for p in state.layout.cells_in(area, wide) {
            if let Some(i) = state.layout.index(p) {
                f(i, &state.cells[i]);
            }
        }
    }
}

impl SpatialGraph for GridGraph {
    type Point = Vec2;

    fn heuristic(&self, a: usize, b: usize) -> f32 {
        let state = self.state.read();
        manhattan(state.layout.position(a), state.layout.position(b))
    }

    fn edge_cost(&self, a: usize, b: usize) -> f32 {
        let state = self.state.read();
        euclidean(state.layout.position(a), state.layout.position(b))
    }

    fn neighbors(&self, index: usize, always_return: bool, buf: &mut [Option<usize>]) {
        let state = self.state.read();
        let cells = &state.cells;
        state
            .layout
            .topology()
            .fill(index, buf, |n| always_return || cells[n].walkable);
    }

    fn is_valid(&self, index: usize, region: Option<RegionId>) -> bool {
        nearest::is_valid(&self.state.read().cells, index, region)
    }

    fn node_index(&self, point: Vec2) -> usize {
        self.state.read().layout.node_index(point)
    }

    fn point_at(&self, index: usize) -> Vec2 {
        self.state.read().layout.position(index)
    }

    fn node_count(&self) -> usize {
        self.state.read().cells.len()
    }

    fn neighbor_count(&self) -> usize {
        8
    }

    fn nearest_available(&self, index: usize, reference: Vec2, region: Option<RegionId>) -> usize {
        let state = self.state.read();
        nearest::nearest_available(&state.cells, &state.layout, index, reference, region)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::environment::{Obstacle, ObstacleField, TerrainPatch};
    use std::sync::mpsc;
    use std::time::Duration;
    use waymark_core::Vec3;

    /// A `columns` × `rows` unit grid, sampled and labelled, plus the field
    /// behind it. `#` marks blocked cells.
    pub(crate) fn grid_from(rows: &[&str]) -> (Arc<ObstacleField>, Arc<GridGraph>) {
        let field = Arc::new(ObstacleField::default());
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                if ch == '#' {
                    block(&field, c, r);
                }
            }
        }
        let grid = GridGraph::new(GridConfig::unit(rows[0].len(), rows.len()), field.clone())
            .expect("valid config");
        grid.initialize();
        (field, Arc::new(grid))
    }

    pub(crate) fn open_grid(columns: usize, rows: usize) -> (Arc<ObstacleField>, Arc<GridGraph>) {
        let line = ".".repeat(columns);
        let lines = vec![line.as_str(); rows];
        grid_from(&lines)
    }

    /// Drop a small box on the centre of cell `(c, r)`.
    pub(crate) fn block(field: &ObstacleField, c: usize, r: usize) {
        let (x, z) = (c as f32 + 0.5, r as f32 + 0.5);
        field.add_obstacle(Obstacle::new(
            Vec3::new(x - 0.25, -1.0, z - 0.25),
            Vec3::new(x + 0.25, 2.0, z + 0.25),
        ));
    }

    fn at(grid: &GridGraph, c: i32, r: i32) -> usize {
        grid.cell_index(Point::new(c, r)).expect("on grid")
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = GridConfig {
            node_size: -1.0,
            ..GridConfig::default()
        };
        let err = GridGraph::new(cfg, Arc::new(ObstacleField::default())).unwrap_err();
        assert_eq!(err, ConfigError::NodeSize(-1.0));
    }

    #[test]
    fn fresh_grid_is_unsampled() {
        let grid = GridGraph::new(GridConfig::unit(3, 2), Arc::new(ObstacleField::default())).unwrap();
        assert_eq!(grid.node_count(), 6);
        assert_eq!(grid.walkable_count(), 0);
        assert!(!grid.is_valid(0, None));
    }

    #[test]
    fn validity_covers_both_ends_and_rejects_past_the_end() {
        let (_, grid) = open_grid(4, 4);
        assert!(grid.is_valid(0, None));
        assert!(grid.is_valid(15, None));
        assert!(!grid.is_valid(16, None));
        assert!(grid.is_valid(0, Some(0)));
        assert!(!grid.is_valid(0, Some(1)));
    }

    #[test]
    fn blocked_column_splits_regions() {
        let (_, grid) = grid_from(&["..#.", "..#.", "..#.", "..#."]);
        assert_eq!(grid.region_count(), 2);
        assert_eq!(grid.walkable_count(), 12);
        let left = grid.cell(at(&grid, 0, 0)).unwrap().region;
        let right = grid.cell(at(&grid, 3, 3)).unwrap().region;
        assert!(left.is_some() && right.is_some());
        assert_ne!(left, right);
        assert!(grid.cell(at(&grid, 2, 1)).unwrap().region.is_none());
        assert!(!grid.is_reachable(Vec2::new(0.5, 0.5), Vec2::new(3.5, 3.5)));
        assert!(grid.is_reachable(Vec2::new(0.5, 0.5), Vec2::new(1.5, 3.5)));
    }

    #[test]
    fn neighbours_respect_walkability_unless_asked() {
        let (_, grid) = grid_from(&["...", ".#.", "..."]);
        let mut buf = [None; 8];
        grid.neighbors(0, false, &mut buf);
        // E, W, S, N, NE, NW, SE, SW
        assert_eq!(buf, [Some(1), None, Some(3), None, None, None, None, None]);
        grid.neighbors(0, true, &mut buf);
        assert_eq!(buf, [Some(1), None, Some(3), None, None, None, Some(4), None]);
    }

    #[test]
    fn costs_are_world_distances() {
        let (_, grid) = open_grid(4, 4);
        assert_eq!(grid.heuristic(0, 15), 6.0);
        assert!((grid.edge_cost(0, 5) - 2f32.sqrt()).abs() < 1e-6);
        assert_eq!(grid.point_at(5), Vec2::new(1.5, 1.5));
        assert_eq!(grid.node_index(Vec2::new(1.9, 1.1)), 5);
    }

    #[test]
    fn obstacle_update_in_area_drops_region_immediately() {
        let (field, grid) = open_grid(5, 5);
        let target = at(&grid, 2, 2);
        assert_eq!(grid.cell(target).unwrap().region, Some(0));

        block(&field, 2, 2);
        let changed = grid.update_area(Area::new(Vec2::new(2.5, 2.5), Vec2::new(0.5, 0.5)), false);
        assert_eq!(changed, 1);
        let cell = grid.cell(target).unwrap();
        assert!(!cell.walkable);
        assert_eq!(cell.region, None);
        assert_eq!(cell.clearance, Some(0.0));

        field.clear_obstacles();
        grid.update();
        assert_eq!(grid.cell(target).unwrap().region, None);
        assert!(grid.update_regions());
        assert_eq!(grid.cell(target).unwrap().region, Some(0));
    }

    #[test]
    fn terrain_update_keeps_walkability() {
        let (field, grid) = open_grid(3, 3);
        field.add_patch(TerrainPatch {
            area: Area::new(Vec2::new(1.5, 1.5), Vec2::new(0.5, 0.5)),
            height: 2.0,
            slope: 80.0,
        });
        grid.update_terrain();
        let cell = grid.cell(4).unwrap();
        assert_eq!((cell.height, cell.slope), (2.0, 80.0));
        assert!(cell.walkable);
        grid.update();
        assert!(!grid.cell(4).unwrap().walkable);
    }

    #[test]
    fn region_at_falls_back_to_last_region() {
        let (_, grid) = grid_from(&["..#"]);
        assert_eq!(grid.region_at(Vec2::new(0.5, 0.5), None), Some(0));
        assert_eq!(grid.region_at(Vec2::new(2.5, 0.5), Some(0)), Some(0));
        assert_eq!(grid.region_at(Vec2::new(2.5, 0.5), None), None);
    }

    #[test]
    fn enumerates_cells_in_area() {
        let (_, grid) = open_grid(6, 6);
        let mut seen = Vec::new();
        grid.for_each_in(Area::from_corners(Vec2::new(1.0, 1.0), Vec2::new(3.0, 2.0)), false, |i, _| {
            seen.push(i)
        });
        assert_eq!(seen, vec![7, 8]);
        let mut count = 0;
        grid.for_each(|_, c| count += usize::from(c.walkable));
        assert_eq!(count, 36);
    }

    #[test]
    fn reconfigure_regenerates() {
        let (_, grid) = open_grid(4, 4);
        grid.reconfigure(GridConfig::unit(2, 3)).unwrap();
        assert_eq!((grid.columns(), grid.rows()), (2, 3));
        assert_eq!(grid.walkable_count(), 0);
        assert_eq!(grid.region_count(), 0);
        assert!(grid.reconfigure(GridConfig { node_size: 0.0, ..GridConfig::unit(1, 1) }).is_err());
        assert_eq!(grid.columns(), 2);
    }

    #[test]
    fn region_requests_while_locked_are_dropped() {
        let (_, grid) = open_grid(3, 3);
        let pool = WorkerPool::new(1).unwrap();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let (started_tx, started_rx) = mpsc::channel();
        // Occupy the only worker so the async pass stays queued.
        pool.spawn(move || {
            started_tx.send(()).unwrap();
            let _ = gate_rx.recv_timeout(Duration::from_secs(5));
        });
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert!(grid.update_regions_async(&pool));
        assert!(grid.regions_locked());
        assert!(!grid.update_regions());
        assert!(!grid.update_regions_async(&pool));

        gate_tx.send(()).unwrap();
        let (done_tx, done_rx) = mpsc::channel();
        pool.spawn(move || done_tx.send(()).unwrap());
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(!grid.regions_locked());
        assert_eq!(grid.region_count(), 1);
        assert!(grid.update_regions());
    }
}
