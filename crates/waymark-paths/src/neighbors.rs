/// Slot offsets as `(columns, rows)`: E, W, S, N, NE, NW, SE, SW.
pub const OFFSETS: [(isize, isize); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, -1),
    (-1, -1),
    (1, 1),
    (-1, 1),
];

/// 8-connected neighbour arithmetic over a row-major index space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    columns: usize,
    len: usize,
}

impl Neighbors {
    /// Topology of a `columns` × `rows` grid.
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            len: columns * rows,
        }
    }

    /// Index of the neighbour of `index` in slot `slot`, or `None` when it
    /// falls off the grid.
    ///
    /// A candidate is accepted only if its row is the row expected from the
    /// offset, which rejects wraparound across row boundaries.
    #[inline]
    pub fn at(&self, index: usize, slot: usize) -> Option<usize> {
        if self.columns == 0 || index >= self.len {
            return None;
        }
        let (dx, dy) = OFFSETS[slot];
        let columns = self.columns as isize;
        let row = (index / self.columns) as isize;
        let candidate = index as isize + dy * columns + dx;
        if candidate < 0 || candidate >= self.len as isize {
            return None;
        }
        if candidate / columns != row + dy {
            return None;
        }
        Some(candidate as usize)
    }

    /// Fill `buf` with the neighbours of `index`, keeping only those for which
    /// `keep` returns `true`. Slots beyond the eight offsets are cleared.
    pub fn fill(&self, index: usize, buf: &mut [Option<usize>], keep: impl Fn(usize) -> bool) {
        for (slot, out) in buf.iter_mut().enumerate() {
            *out = if slot < OFFSETS.len() {
                self.at(index, slot).filter(|&n| keep(n))
            } else {
                None
            };
        }
    }
}
