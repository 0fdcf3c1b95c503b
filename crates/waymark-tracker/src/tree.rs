use waymark_core::Area;
use waymark_paths::GridGraph;

/// Maintenance surface of a registered graph.
pub trait NavigationTree: Send + Sync {
    /// Build the graph from scratch.
    fn initialize(&self);

    /// Refresh the graph after the world changed in `area`, or everywhere.
    fn update_area(&self, area: Option<Area>);

    fn region_count(&self) -> usize;
}

impl NavigationTree for GridGraph {
    fn initialize(&self) {
        GridGraph::initialize(self);
    }

    /// Resamples the cells, then relabels regions if any cell changed
    /// walkability. Areas are widened to whole cells.
    fn update_area(&self, area: Option<Area>) {
        let changed = match area {
            Some(area) => GridGraph::update_area(self, area, true),
            None => self.update(),
        };
        if changed > 0 {
            self.update_regions();
        }
    }

    fn region_count(&self) -> usize {
        GridGraph::region_count(self)
    }
}
