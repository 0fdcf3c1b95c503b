use waymark_core::Vec3;

use crate::ConfigError;

/// Largest number of cells a grid may hold.
pub const MAX_CELLS: usize = 1 << 24;

/// Grid shape and walkability thresholds.
///
/// The grid covers the ground-plane rectangle `center ± extents` (world `x`
/// and `z`); `extents.y` is the vertical half-height, which also bounds the
/// ceiling probe.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    pub center: Vec3,
    pub extents: Vec3,
    /// Target edge length of one cell, in world units.
    pub node_size: f32,
    /// Cells at or above this slope (degrees) are not walkable.
    pub max_slope: f32,
    /// Minimum obstacle clearance around a cell centre.
    pub obstacle_padding: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            extents: Vec3::new(50.0, 10.0, 50.0),
            node_size: 5.0,
            max_slope: 45.0,
            obstacle_padding: 1.0,
        }
    }
}

impl GridConfig {
    /// A grid of `columns` × `rows` unit cells whose corner sits at the world
    /// origin, so cell `(c, r)` is centred on `(c + 0.5, r + 0.5)`.
    pub fn unit(columns: usize, rows: usize) -> Self {
        let half = Vec3::new(columns as f32 * 0.5, 5.0, rows as f32 * 0.5);
        Self {
            center: Vec3::new(half.x, 0.0, half.z),
            extents: half,
            node_size: 1.0,
            obstacle_padding: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.node_size.is_finite() && self.node_size > 0.0) {
            return Err(ConfigError::NodeSize(self.node_size));
        }
        let e = self.extents;
        if !e.is_finite() || e.x < 0.0 || e.y < 0.0 || e.z < 0.0 {
            return Err(ConfigError::Extents(e.to_string()));
        }
        if !self.center.is_finite() {
            return Err(ConfigError::Center(self.center.to_string()));
        }
        if !self.max_slope.is_finite() {
            return Err(ConfigError::MaxSlope(self.max_slope));
        }
        if !(self.obstacle_padding.is_finite() && self.obstacle_padding >= 0.0) {
            return Err(ConfigError::ObstaclePadding(self.obstacle_padding));
        }
        let (columns, rows) = self.cell_counts();
        if columns * rows > MAX_CELLS as f64 {
            return Err(ConfigError::TooManyCells {
                columns,
                rows,
                limit: MAX_CELLS,
            });
        }
        Ok(())
    }

    /// Column and row counts before any conversion to integers.
    fn cell_counts(&self) -> (f64, f64) {
        let node = f64::from(self.node_size);
        let count = |extent: f32| (f64::from(extent) * 2.0 / node).floor();
        (count(self.extents.x), count(self.extents.z))
    }

    /// Radius of the sphere probed for obstacles at each cell.
    #[inline]
    pub fn overlap_radius(&self) -> f32 {
        (self.node_size * 0.5).max(self.obstacle_padding)
    }

    /// Radius of the upward ceiling probe.
    #[inline]
    pub fn ceiling_radius(&self) -> f32 {
        self.node_size * 0.5
    }

    /// How far the ceiling probe reaches.
    #[inline]
    pub fn ceiling_reach(&self) -> f32 {
        self.extents.y * 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(GridConfig::default().validate(), Ok(()));
        assert_eq!(GridConfig::unit(4, 4).validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_values() {
        let bad = GridConfig {
            node_size: 0.0,
            ..GridConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::NodeSize(0.0)));

        let bad = GridConfig {
            extents: Vec3::new(-1.0, 1.0, 1.0),
            ..GridConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::Extents(_))));

        let bad = GridConfig {
            center: Vec3::new(f32::NAN, 0.0, 0.0),
            ..GridConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::Center(_))));

        let bad = GridConfig {
            obstacle_padding: -0.5,
            ..GridConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::ObstaclePadding(-0.5)));
    }

    #[test]
    fn rejects_oversized_grids() {
        let huge = GridConfig {
            extents: Vec3::new(1e6, 10.0, 1e6),
            node_size: 1e-3,
            ..GridConfig::default()
        };
        assert!(matches!(
            huge.validate(),
            Err(ConfigError::TooManyCells { limit: MAX_CELLS, .. })
        ));

        // A strip is judged by its total cell count, not its length.
        let strip = GridConfig::unit(MAX_CELLS, 1);
        assert_eq!(strip.validate(), Ok(()));
        let strip = GridConfig::unit(MAX_CELLS, 2);
        assert!(strip.validate().is_err());
    }

    #[test]
    fn probe_radii() {
        let cfg = GridConfig::default();
        assert_eq!(cfg.overlap_radius(), 2.5);
        assert_eq!(cfg.ceiling_radius(), 2.5);
        assert_eq!(cfg.ceiling_reach(), 20.0);
        let padded = GridConfig {
            obstacle_padding: 4.0,
            ..cfg
        };
        assert_eq!(padded.overlap_radius(), 4.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_partial_config() {
        let cfg: GridConfig = serde_json::from_str(r#"{ "node_size": 2.0 }"#).unwrap();
        assert_eq!(cfg.node_size, 2.0);
        assert_eq!(cfg.max_slope, 45.0);
        assert_eq!(cfg.extents, GridConfig::default().extents);
    }
}
