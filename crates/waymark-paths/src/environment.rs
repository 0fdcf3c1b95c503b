//! The world a grid samples its walkability from.

use parking_lot::RwLock;
use waymark_core::{Area, Vec2, Vec3};

/// Ground height and steepness under one point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TerrainSample {
    pub height: f32,
    /// Degrees from horizontal.
    pub slope: f32,
}

/// Terrain and obstacle queries a grid needs to decide walkability.
///
/// Implementations decide which obstacles count; a door that is currently
/// open may simply not be reported.
pub trait Environment: Send + Sync {
    /// Terrain under `point`, or `None` outside the terrain.
    fn sample(&self, point: Vec2) -> Option<TerrainSample>;

    /// Whether a sphere of `radius` at `center` touches any obstacle.
    fn overlaps_obstacle(&self, center: Vec3, radius: f32) -> bool;

    /// Distance from `origin` up to the first obstacle a sphere of `radius`
    /// would hit, if any lies within `max_distance`.
    fn cast_for_ceiling(&self, origin: Vec3, radius: f32, max_distance: f32) -> Option<f32>;
}

// ---------------------------------------------------------------------------
// ObstacleField
// ---------------------------------------------------------------------------

/// An axis-aligned box obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub min: Vec3,
    pub max: Vec3,
}

impl Obstacle {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// A box over `footprint` spanning heights `bottom..top`.
    pub fn column(footprint: Area, bottom: f32, top: f32) -> Self {
        let (lo, hi) = (footprint.min(), footprint.max());
        Self::new(Vec3::new(lo.x, bottom, lo.y), Vec3::new(hi.x, top, hi.y))
    }

    fn sphere_overlaps(&self, center: Vec3, radius: f32) -> bool {
        let dx = center.x - center.x.clamp(self.min.x, self.max.x);
        let dy = center.y - center.y.clamp(self.min.y, self.max.y);
        let dz = center.z - center.z.clamp(self.min.z, self.max.z);
        dx * dx + dy * dy + dz * dz <= radius * radius
    }

    fn ceiling_above(&self, origin: Vec3, radius: f32) -> Option<f32> {
        let over = origin.x >= self.min.x - radius
            && origin.x <= self.max.x + radius
            && origin.z >= self.min.z - radius
            && origin.z <= self.max.z + radius;
        if over && self.min.y >= origin.y {
            Some(self.min.y - origin.y)
        } else {
            None
        }
    }
}

/// A patch of terrain with its own height and slope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainPatch {
    pub area: Area,
    pub height: f32,
    pub slope: f32,
}

/// In-memory [`Environment`]: flat ground, optional sloped patches and box
/// obstacles. Patches and obstacles may be changed while grids hold the
/// field; grids pick the change up on their next walkability pass.
#[derive(Debug)]
pub struct ObstacleField {
    bounds: Option<Area>,
    ground: f32,
    patches: RwLock<Vec<TerrainPatch>>,
    obstacles: RwLock<Vec<Obstacle>>,
}

impl Default for ObstacleField {
    fn default() -> Self {
        Self::flat(0.0)
    }
}

impl ObstacleField {
    /// Unbounded flat ground at `height`.
    pub fn flat(height: f32) -> Self {
        Self {
            bounds: None,
            ground: height,
            patches: RwLock::new(Vec::new()),
            obstacles: RwLock::new(Vec::new()),
        }
    }

    /// Restrict the terrain to `bounds`; points outside sample as `None`.
    pub fn with_bounds(mut self, bounds: Area) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn add_obstacle(&self, obstacle: Obstacle) {
        self.obstacles.write().push(obstacle);
    }

    /// Remove every obstacle whose footprint intersects `area`. Returns the
    /// number removed.
    pub fn remove_obstacles_in(&self, area: Area) -> usize {
        let mut obstacles = self.obstacles.write();
        let before = obstacles.len();
        obstacles.retain(|o| {
            let footprint = Area::from_corners(o.min.ground(), o.max.ground());
            footprint.intersect(area).is_none()
        });
        before - obstacles.len()
    }

    pub fn clear_obstacles(&self) {
        self.obstacles.write().clear();
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.read().len()
    }

    /// Later patches win where patches overlap.
    pub fn add_patch(&self, patch: TerrainPatch) {
        self.patches.write().push(patch);
    }
}

impl Environment for ObstacleField {
    fn sample(&self, point: Vec2) -> Option<TerrainSample> {
        if self.bounds.is_some_and(|b| !b.contains(point)) {
            return None;
        }
        let patches = self.patches.read();
        let sample = patches
            .iter()
            .rev()
            .find(|p| p.area.contains(point))
            .map(|p| TerrainSample {
                height: p.height,
                slope: p.slope,
            })
            .unwrap_or(TerrainSample {
                height: self.ground,
                slope: 0.0,
            });
        Some(sample)
    }

    fn overlaps_obstacle(&self, center: Vec3, radius: f32) -> bool {
        self.obstacles
            .read()
            .iter()
            .any(|o| o.sphere_overlaps(center, radius))
    }

    fn cast_for_ceiling(&self, origin: Vec3, radius: f32, max_distance: f32) -> Option<f32> {
        self.obstacles
            .read()
            .iter()
            .filter_map(|o| o.ceiling_above(origin, radius))
            .filter(|&d| d <= max_distance)
            .min_by(f32::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(x: f32, z: f32) -> Obstacle {
        Obstacle::new(Vec3::new(x - 0.25, -1.0, z - 0.25), Vec3::new(x + 0.25, 2.0, z + 0.25))
    }

    #[test]
    fn bounds_limit_sampling() {
        let field = ObstacleField::flat(3.0).with_bounds(Area::new(Vec2::ZERO, Vec2::new(1.0, 1.0)));
        assert_eq!(
            field.sample(Vec2::new(0.5, -0.5)),
            Some(TerrainSample {
                height: 3.0,
                slope: 0.0
            })
        );
        assert_eq!(field.sample(Vec2::new(1.5, 0.0)), None);
    }

    #[test]
    fn later_patch_wins() {
        let field = ObstacleField::default();
        let area = Area::new(Vec2::ZERO, Vec2::new(2.0, 2.0));
        field.add_patch(TerrainPatch {
            area,
            height: 1.0,
            slope: 10.0,
        });
        field.add_patch(TerrainPatch {
            area: Area::new(Vec2::ZERO, Vec2::new(0.5, 0.5)),
            height: 2.0,
            slope: 60.0,
        });
        assert_eq!(field.sample(Vec2::ZERO).map(|s| s.slope), Some(60.0));
        assert_eq!(field.sample(Vec2::new(1.5, 0.0)).map(|s| s.slope), Some(10.0));
        assert_eq!(field.sample(Vec2::new(5.0, 0.0)).map(|s| s.height), Some(0.0));
    }

    #[test]
    fn sphere_overlap_uses_closest_point() {
        let field = ObstacleField::default();
        field.add_obstacle(unit_box(0.0, 0.0));
        assert!(field.overlaps_obstacle(Vec3::new(0.0, 0.0, 0.0), 0.1));
        assert!(field.overlaps_obstacle(Vec3::new(0.7, 0.0, 0.0), 0.5));
        assert!(!field.overlaps_obstacle(Vec3::new(0.8, 0.0, 0.0), 0.5));
        assert!(!field.overlaps_obstacle(Vec3::new(0.7, 0.0, 0.7), 0.5));
    }

    #[test]
    fn ceiling_reports_nearest_overhead_obstacle() {
        let field = ObstacleField::default();
        field.add_obstacle(Obstacle::new(Vec3::new(-1.0, 4.0, -1.0), Vec3::new(1.0, 5.0, 1.0)));
        field.add_obstacle(Obstacle::new(Vec3::new(-1.0, 2.5, -1.0), Vec3::new(1.0, 3.0, 1.0)));
        let origin = Vec3::new(0.0, 0.5, 0.0);
        assert_eq!(field.cast_for_ceiling(origin, 0.5, 10.0), Some(2.0));
        assert_eq!(field.cast_for_ceiling(origin, 0.5, 1.0), None);
        assert_eq!(field.cast_for_ceiling(Vec3::new(5.0, 0.5, 0.0), 0.5, 10.0), None);
    }

    #[test]
    fn removing_obstacles_by_area() {
        let field = ObstacleField::default();
        field.add_obstacle(unit_box(0.0, 0.0));
        field.add_obstacle(unit_box(5.0, 5.0));
        assert_eq!(field.remove_obstacles_in(Area::new(Vec2::ZERO, Vec2::new(1.0, 1.0))), 1);
        assert_eq!(field.obstacle_count(), 1);
        field.clear_obstacles();
        assert_eq!(field.obstacle_count(), 0);
    }
}
