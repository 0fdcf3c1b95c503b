//! Shared scene used by the terminal demos.
//!
//! Demonstrates: obstacle scattering, grid sampling and region labelling,
//! asynchronous path and direction queries through a [`Tracker`], and
//! plain-text rendering of the result.

use std::fmt::Write as _;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use waymark_core::{Area, Planar, Vec2};
use waymark_paths::{GridConfig, GridGraph, Obstacle, ObstacleField, TerrainPatch};
use waymark_tracker::{Tracker, TrackerConfig, TrackerError};

pub const WIDTH: usize = 48;
pub const HEIGHT: usize = 20;

/// Pillars scattered over a fresh scene.
const PILLARS: usize = 140;
/// Slope of the steep patch; above the default walkable limit.
const CLIFF_SLOPE: f32 = 60.0;

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// A unit grid over an obstacle field, registered with a tracker.
pub struct Scene {
    pub field: Arc<ObstacleField>,
    pub grid: Arc<GridGraph>,
    pub tracker: Tracker,
    pub ground: usize,
    rng: StdRng,
}

impl Scene {
    /// Build a `WIDTH` x `HEIGHT` scene. The same seed always gives the same
    /// layout.
    pub fn new(seed: u64) -> Result<Self, TrackerError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let field = Arc::new(ObstacleField::default());
        scatter_pillars(&field, &mut rng, PILLARS);
        field.add_patch(TerrainPatch {
            area: Area::from_corners(Vec2::new(30.0, 2.0), Vec2::new(34.0, 6.0)),
            height: 1.0,
            slope: CLIFF_SLOPE,
        });

        let grid = Arc::new(GridGraph::new(GridConfig::unit(WIDTH, HEIGHT), field.clone())?);
        let mut tracker = Tracker::new(TrackerConfig::default())?;
        let ground = tracker.register("ground", grid.clone());
        tracker.start();
        log::info!(
            "scene ready: {} walkable cells in {} regions",
            grid.walkable_count(),
            grid.region_count()
        );
        Ok(Self {
            field,
            grid,
            tracker,
            ground,
            rng,
        })
    }

    /// A random walkable cell centre.
    pub fn random_walkable(&mut self) -> Option<Vec2> {
        for _ in 0..WIDTH * HEIGHT {
            let c = self.rng.random_range(0..WIDTH);
            let r = self.rng.random_range(0..HEIGHT);
            let index = r * WIDTH + c;
            if let Some(cell) = self.grid.cell(index).filter(|cell| cell.walkable) {
                return Some(cell.position);
            }
        }
        None
    }

    /// Drop a wall across column `column`, leaving a door at row `door` if
    /// given, and refresh the affected cells.
    pub fn raise_wall(&self, column: usize, door: Option<usize>) {
        for r in (0..HEIGHT).filter(|&r| Some(r) != door) {
            self.field.add_obstacle(pillar(column, r));
        }
        let area = Area::from_corners(
            Vec2::new(column as f32, 0.0),
            Vec2::new(column as f32 + 1.0, HEIGHT as f32),
        );
        self.tracker.update_graph(self.ground, Some(area));
    }
}

/// A thin obstacle that blocks exactly cell (`c`, `r`).
pub fn pillar(c: usize, r: usize) -> Obstacle {
    let centre = Vec2::new(c as f32 + 0.5, r as f32 + 0.5);
    Obstacle::column(Area::new(centre, Vec2::new(0.25, 0.25)), -1.0, 2.0)
}

/// Scatter `count` single-cell pillars, with a small chance of a short
/// horizontal run instead.
pub fn scatter_pillars(field: &ObstacleField, rng: &mut StdRng, count: usize) {
    for _ in 0..count {
        let c = rng.random_range(0..WIDTH);
        let r = rng.random_range(0..HEIGHT);
        let run = if rng.random_bool(0.15) { 4 } else { 1 };
        for dc in 0..run {
            if c + dc < WIDTH {
                field.add_obstacle(pillar(c + dc, r));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Region glyphs; regions past the end wrap around.
const REGION_GLYPHS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Render the grid as text, one line per row, top row first.
///
/// Blocked cells are `#`, walkable cells show their region letter, and
/// cells on `path` are `*` with the endpoints marked `S` and `G`.
pub fn render(grid: &GridGraph, path: &[Vec2]) -> String {
    let (columns, rows) = (grid.columns(), grid.rows());
    let mut glyphs = vec![b' '; columns * rows];
    grid.for_each(|index, cell| {
        glyphs[index] = match (cell.walkable, cell.region) {
            (false, _) => b'#',
            (true, Some(region)) => REGION_GLYPHS[region as usize % REGION_GLYPHS.len()],
            (true, None) => b'.',
        };
    });
    for (i, p) in path.iter().enumerate() {
        let index = grid.closest_node(*p);
        glyphs[index] = if i == 0 {
            b'S'
        } else if i + 1 == path.len() {
            b'G'
        } else {
            b'*'
        };
    }

    let mut out = String::with_capacity((columns + 1) * rows);
    for r in (0..rows).rev() {
        for &g in &glyphs[r * columns..(r + 1) * columns] {
            out.push(g as char);
        }
        out.push('\n');
    }
    out
}

/// One-line summary of a path.
pub fn describe(path: &[Vec2]) -> String {
    let length = path
        .windows(2)
        .fold(0.0_f32, |acc, w| acc + (w[1] - w[0]).length());
    let mut s = String::new();
    let _ = write!(s, "{} points, length {length:.1}", path.len());
    if let (Some(a), Some(b)) = (path.first(), path.last()) {
        let _ = write!(s, " from ({:.1}, {:.1}) to ({:.1}, {:.1})", a.x, a.y, b.x, b.y);
    }
    s
}
