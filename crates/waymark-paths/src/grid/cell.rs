use waymark_core::{Vec2, Vec3};

use super::GridConfig;
use crate::RegionId;
use crate::environment::{Environment, TerrainSample};

/// One grid cell.
///
/// A cell with a region is always walkable. Freshly walkable cells carry no
/// region until the next region pass.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Centre of the cell on the ground plane.
    pub position: Vec2,
    pub walkable: bool,
    pub region: Option<RegionId>,
    pub height: f32,
    /// Degrees from horizontal.
    pub slope: f32,
    /// Distance up to the nearest overhead obstacle; `None` is open sky.
    pub clearance: Option<f32>,
}

impl Cell {
    /// An unsampled cell: not walkable until a walkability pass says so.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            walkable: false,
            region: None,
            height: 0.0,
            slope: 0.0,
            clearance: None,
        }
    }

    /// Centre of the cell at ground height.
    #[inline]
    pub fn world_position(&self) -> Vec3 {
        self.position.with_height(self.height)
    }

    /// Clearance as a fraction of `reach`: 1.0 for open sky, 0.0 for a
    /// ceiling at ground level.
    pub fn ceiling_percentage(&self, reach: f32) -> f32 {
        match self.clearance {
            None => 1.0,
            Some(_) if reach <= 0.0 => 0.0,
            Some(d) => (d / reach).clamp(0.0, 1.0),
        }
    }

    pub(crate) fn set_walkable(&mut self, walkable: bool) {
        self.walkable = walkable;
        if !walkable {
            self.region = None;
        }
    }

    /// Height and slope only.
    pub(crate) fn sample_terrain(&mut self, env: &dyn Environment) {
        let TerrainSample { height, slope } = env.sample(self.position).unwrap_or_default();
        self.height = height;
        self.slope = slope;
    }

    /// Full walkability pass for this cell. Returns whether walkability
    /// changed.
    pub(crate) fn sample(&mut self, env: &dyn Environment, config: &GridConfig) -> bool {
        let was = self.walkable;
        self.sample_terrain(env);
        let origin = self.world_position();

        let walkable = if self.slope >= config.max_slope {
            self.clearance = None;
            false
        } else if env.overlaps_obstacle(origin, config.overlap_radius()) {
            self.clearance = Some(0.0);
            false
        } else {
            self.clearance =
                env.cast_for_ceiling(origin, config.ceiling_radius(), config.ceiling_reach());
            true
        };
        self.set_walkable(walkable);
        was != walkable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Obstacle, ObstacleField, TerrainPatch};
    use waymark_core::Area;

    #[test]
    fn unwalkable_cells_drop_their_region() {
        let mut cell = Cell::new(Vec2::ZERO);
        cell.set_walkable(true);
        cell.region = Some(3);
        cell.set_walkable(true);
        assert_eq!(cell.region, Some(3));
        cell.set_walkable(false);
        assert_eq!(cell.region, None);
    }

    #[test]
    fn slope_and_obstacles_decide_walkability() {
        let cfg = GridConfig::unit(4, 4);
        let field = ObstacleField::default();
        field.add_patch(TerrainPatch {
            area: Area::new(Vec2::new(0.5, 0.5), Vec2::new(0.5, 0.5)),
            height: 1.0,
            slope: 45.0,
        });
        field.add_obstacle(Obstacle::new(Vec3::new(1.25, -1.0, 0.25), Vec3::new(1.75, 2.0, 0.75)));

        let mut steep = Cell::new(Vec2::new(0.5, 0.5));
        assert!(!steep.sample(&field, &cfg));
        assert!(!steep.walkable);
        assert_eq!(steep.height, 1.0);

        let mut blocked = Cell::new(Vec2::new(1.5, 0.5));
        blocked.sample(&field, &cfg);
        assert!(!blocked.walkable);
        assert_eq!(blocked.ceiling_percentage(cfg.ceiling_reach()), 0.0);

        let mut open = Cell::new(Vec2::new(2.5, 0.5));
        assert!(open.sample(&field, &cfg), "unsampled cells start unwalkable");
        assert!(open.walkable);
        assert_eq!(open.clearance, None);
        assert_eq!(open.ceiling_percentage(cfg.ceiling_reach()), 1.0);
    }

    #[test]
    fn clearance_under_a_roof() {
        let cfg = GridConfig::unit(2, 2);
        let field = ObstacleField::default();
        field.add_obstacle(Obstacle::new(Vec3::new(0.0, 2.5, 0.0), Vec3::new(2.0, 3.0, 2.0)));
        let mut cell = Cell::new(Vec2::new(0.5, 0.5));
        cell.sample(&field, &cfg);
        assert!(cell.walkable);
        assert_eq!(cell.clearance, Some(2.5));
        assert_eq!(cell.ceiling_percentage(cfg.ceiling_reach()), 0.25);
    }
}
