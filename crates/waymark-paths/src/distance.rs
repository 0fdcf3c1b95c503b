use waymark_core::{Planar, Vec2};

/// Manhattan (L1) distance between two world positions.
#[inline]
pub fn manhattan(a: Vec2, b: Vec2) -> f32 {
    (a - b).l1()
}

/// Straight-line distance between two world positions.
#[inline]
pub fn euclidean(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}
