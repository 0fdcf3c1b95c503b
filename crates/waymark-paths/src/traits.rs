use waymark_core::Planar;

/// Region identifier. Cells without a region (unwalkable, or walkable but not
/// yet labelled) carry `None`.
pub type RegionId = u32;

/// Capability set every searchable graph provides.
///
/// Nodes are addressed by dense indices `0..node_count()`. Implementations
/// must be shareable across worker threads; a search only ever reads through
/// this interface and may interleave with writers, which is why it re-checks
/// [`is_valid`](Self::is_valid) while expanding.
pub trait SpatialGraph: Send + Sync {
    /// World position type nodes map to.
    type Point: Planar;

    /// Estimated cost between two nodes. Need not be admissible.
    fn heuristic(&self, a: usize, b: usize) -> f32;

    /// Cost of moving between two nodes.
    fn edge_cost(&self, a: usize, b: usize) -> f32;

    /// Fill `buf` (exactly [`neighbor_count`](Self::neighbor_count) slots)
    /// with the neighbours of `index`. Absent or disabled neighbours are
    /// `None`; with `always_return`, disabled in-graph neighbours are
    /// reported too.
    fn neighbors(&self, index: usize, always_return: bool, buf: &mut [Option<usize>]);

    /// Whether `index` is an existing, enabled node, optionally also inside
    /// `region`.
    fn is_valid(&self, index: usize, region: Option<RegionId>) -> bool;

    /// Node containing `point`.
    fn node_index(&self, point: Self::Point) -> usize;

    /// World position of the node at `index`.
    fn point_at(&self, index: usize) -> Self::Point;

    /// Total number of nodes.
    fn node_count(&self) -> usize;

    /// Fixed number of neighbour slots per node.
    fn neighbor_count(&self) -> usize;

    /// Snap `index` onto a nearby valid node, biased towards `reference`.
    ///
    /// Returns `index` unchanged when it is already valid, or when nothing
    /// valid was found within the search budget; callers must re-check.
    fn nearest_available(
        &self,
        index: usize,
        reference: Self::Point,
        region: Option<RegionId>,
    ) -> usize;
}
