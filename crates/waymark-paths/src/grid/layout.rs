use waymark_core::{Area, Point, Range, Vec2};

use super::GridConfig;
use super::config::MAX_CELLS;
use crate::neighbors::Neighbors;

/// Affine mapping between cell coordinates, dense indices and world space.
///
/// Cells are stored row-major; column `c` of row `r` has index
/// `r * columns + c` and is centred at `base + (c + 0.5, r + 0.5) * scale`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridLayout {
    columns: usize,
    rows: usize,
    base: Vec2,
    scale: Vec2,
}

impl GridLayout {
    pub fn new(config: &GridConfig) -> Self {
        let size = Vec2::new(config.extents.x * 2.0, config.extents.z * 2.0);
        let count = |len: f32| {
            let n = (len / config.node_size).floor();
            if n.is_finite() && n > 0.0 { (n as usize).min(MAX_CELLS) } else { 0 }
        };
        let (columns, rows) = (count(size.x), count(size.y));
        let scale = Vec2::new(
            if columns > 0 { size.x / columns as f32 } else { config.node_size },
            if rows > 0 { size.y / rows as f32 } else { config.node_size },
        );
        Self {
            columns,
            rows,
            base: config.center.ground() - Vec2::new(config.extents.x, config.extents.z),
            scale,
        }
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.columns.saturating_mul(self.rows)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// World size of one cell.
    #[inline]
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// All cell coordinates.
    #[inline]
    pub fn range(&self) -> Range {
        Range::new(0, 0, self.columns as i32, self.rows as i32)
    }

    /// World rectangle the grid covers.
    pub fn bounds(&self) -> Area {
        let size = Vec2::new(
            self.scale.x * self.columns as f32,
            self.scale.y * self.rows as f32,
        );
        Area::from_corners(self.base, self.base + size)
    }

    /// Cell coordinates of `index`. Not bounds checked.
    #[inline]
    pub fn coords(&self, index: usize) -> Point {
        if self.columns == 0 {
            return Point::ZERO;
        }
        Point::new((index % self.columns) as i32, (index / self.columns) as i32)
    }

    /// Index of the cell at `p`, if it lies on the grid.
    #[inline]
    pub fn index(&self, p: Point) -> Option<usize> {
        if !self.range().contains(p) {
            return None;
        }
        Some(p.y as usize * self.columns + p.x as usize)
    }

    /// World centre of the cell at `index`. Not bounds checked.
    #[inline]
    pub fn position(&self, index: usize) -> Vec2 {
        let p = self.coords(index);
        self.base
            + Vec2::new(
                (p.x as f32 + 0.5) * self.scale.x,
                (p.y as f32 + 0.5) * self.scale.y,
            )
    }

    /// Cell containing `world`, clamped onto the grid.
    pub fn locate(&self, world: Vec2) -> Point {
        let rel = world - self.base;
        let clamp = |v: f32, scale: f32, count: usize| {
            let max = count.saturating_sub(1) as f32;
            (v / scale).floor().clamp(0.0, max) as i32
        };
        Point::new(
            clamp(rel.x, self.scale.x, self.columns),
            clamp(rel.y, self.scale.y, self.rows),
        )
    }

    /// Index of the cell containing `world`, clamped onto the grid. Zero for
    /// an empty grid.
    pub fn node_index(&self, world: Vec2) -> usize {
        self.index(self.locate(world)).unwrap_or(0)
    }

    /// Cells touched by `area`.
    ///
    /// By default a cell counts when its centre lies inside the area; `wide`
    /// rounds the area outward so every cell it overlaps counts.
    pub fn cells_in(&self, area: Area, wide: bool) -> Range {
        let Some(area) = area.intersect(self.bounds()) else {
            return Range::default();
        };
        let to_cells = |v: Vec2| {
            let rel = v - self.base;
            Vec2::new(rel.x / self.scale.x, rel.y / self.scale.y)
        };
        let (lo, hi) = (to_cells(area.min()), to_cells(area.max()));
        let (x0, y0, x1, y1) = if wide {
            (lo.x.floor(), lo.y.floor(), hi.x.floor() + 1.0, hi.y.floor() + 1.0)
        } else {
            (
                (lo.x - 0.5).ceil(),
                (lo.y - 0.5).ceil(),
                (hi.x - 0.5).floor() + 1.0,
                (hi.y - 0.5).floor() + 1.0,
            )
        };
        if x1 <= x0 || y1 <= y0 {
            return Range::default();
        }
        Range {
            min: Point::new(x0 as i32, y0 as i32),
            max: Point::new(x1 as i32, y1 as i32),
        }
        .intersect(self.range())
    }

    #[inline]
    pub fn topology(&self) -> Neighbors {
        Neighbors::new(self.columns, self.rows)
    }
}
