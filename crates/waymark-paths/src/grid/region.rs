//! Connected-component labelling of walkable cells.

use super::Cell;
use crate::RegionId;
use crate::index_set::SwapRemoveIndexSet;

#[inline]
fn is_open(cells: &[Cell], index: usize) -> bool {
    let cell = &cells[index];
    cell.walkable && cell.region.is_none()
}

/// Relabel every walkable cell of a `columns`-wide row-major grid with the id
/// of its 8-connected component. Returns the number of regions.
///
/// Scanline fill over columns: each seed walks up to the top of its vertical
/// run, labels the run downward, then pushes one seed per open run found in
/// the two neighbouring columns, one row past either end of the run.
pub(crate) fn label_regions(cells: &mut [Cell], columns: usize) -> RegionId {
    for cell in cells.iter_mut() {
        cell.region = None;
    }
    if columns == 0 || cells.is_empty() {
        return 0;
    }
    let rows = cells.len() / columns;
    let mut remaining = SwapRemoveIndexSet::full(cells.len());
    let mut stack = Vec::new();
    let mut region: RegionId = 0;

    loop {
        while let Some(id) = remaining.peek() {
            if is_open(cells, id) {
                break;
            }
            remaining.pop();
        }
        let Some(seed) = remaining.pop() else {
            break;
        };
        stack.push(seed);

        while let Some(seed) = stack.pop() {
            if !is_open(cells, seed) {
                continue;
            }
            let col = seed % columns;
            let mut top = seed / columns;
            while top > 0 && is_open(cells, (top - 1) * columns + col) {
                top -= 1;
            }

            let mut bottom = top;
            loop {
                let i = bottom * columns + col;
                cells[i].region = Some(region);
                remaining.remove_by_id(i);
                if bottom + 1 >= rows || !is_open(cells, i + columns) {
                    break;
                }
                bottom += 1;
            }

            let first = top.saturating_sub(1);
            let last = (bottom + 1).min(rows - 1);
            let sides = [col.checked_sub(1), Some(col + 1).filter(|&c| c < columns)];
            for side in sides.into_iter().flatten() {
                let mut in_span = false;
                for row in first..=last {
                    let i = row * columns + side;
                    if is_open(cells, i) {
                        if !in_span {
                            stack.push(i);
                            in_span = true;
                        }
                    } else {
                        in_span = false;
                    }
                }
            }
        }
        region += 1;
    }
    region
}
