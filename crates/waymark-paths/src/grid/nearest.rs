use std::collections::HashSet;

use waymark_core::Vec2;

use super::{Cell, GridLayout};
use crate::RegionId;
use crate::distance::{euclidean, manhattan};
use crate::node::{Frontier, Priority};

/// Expansion budget of the nearest-available search.
pub const NEAREST_MAX_TICKS: usize = 100;
/// The expansion stops early once this many walkable cells were reached.
pub const NEAREST_MAX_WALKABLE: usize = 50;

/// Weight of travelled distance against closeness to the reference. Above
/// `sqrt(2)`, a cell one step farther out never beats a nearer one.
const STEP_WEIGHT: f32 = 2.0;

#[inline]
pub(crate) fn is_valid(cells: &[Cell], index: usize, region: Option<RegionId>) -> bool {
    cells
        .get(index)
        .is_some_and(|c| c.walkable && region.is_none_or(|r| c.region == Some(r)))
}

/// Snap `index` onto a walkable cell close to it, biased towards `reference`.
///
/// Expands outward by accumulated distance, through disabled cells too, for
/// at most [`NEAREST_MAX_TICKS`] steps. If `region` was among the regions
/// met on the way, only cells of that region qualify; otherwise any walkable
/// cell does. The qualifying cell with the lowest weighted distance plus
/// heuristic wins, so the reference only decides between equally near
/// cells. When nothing qualifies `index` comes back unchanged.
pub(crate) fn nearest_available(
    cells: &[Cell],
    layout: &GridLayout,
    index: usize,
    reference: Vec2,
    region: Option<RegionId>,
) -> usize {
    if index >= cells.len() || is_valid(cells, index, region) {
        return index;
    }
    let topology = layout.topology();
    let mut frontier = Frontier::new(Priority::Cost);
    let mut regions = HashSet::new();
    let mut buf = [None; 8];
    let (mut walkables, mut ticks) = (0, 0);

    frontier.seed(index, 0.0, 0.0);
    let mut current = frontier.pop();
    while let Some(at) = current {
        if walkables >= NEAREST_MAX_WALKABLE || ticks >= NEAREST_MAX_TICKS {
            break;
        }
        let here = cells[at].position;
        let cost = frontier.get(at).map_or(0.0, |n| n.cost);
        topology.fill(at, &mut buf, |_| true);
        for &n in buf.iter().flatten() {
            let there = cells[n].position;
            let step = STEP_WEIGHT * euclidean(here, there);
            frontier.relax(n, cost + step, manhattan(there, reference), at);
        }

        current = frontier.pop();
        if let Some(next) = current {
            let cell = &cells[next];
            if cell.walkable {
                regions.extend(cell.region);
                walkables += 1;
            }
        }
        ticks += 1;
    }

    let wanted = region.filter(|r| regions.contains(r));
    frontier
        .closed()
        .filter(|&(i, _)| is_valid(cells, i, wanted))
        .min_by(|a, b| a.1.total().total_cmp(&b.1.total()).then(a.0.cmp(&b.0)))
        .map_or(index, |(i, _)| i)
}
