//! Expanding-square spiral over a 2D cell grid.
//!
//! The miner walks its working area one cell per tick, starting at the
//! center and spiraling outward ring by ring. Cells are abstract (u, v)
//! grid offsets from the center; the caller decides what one cell spans in
//! world units (a single block, or a whole chunk in chunk mode).
//!
//! Ring `k` holds the cells at Chebyshev distance `k` from the center.
//! Enumeration within a ring starts at the (-k, -k) corner and walks the
//! four edges clockwise. The cell count within `n` rings is `(2n + 1)^2`;
//! callers assert against [`cells_within`] rather than re-deriving it.

/// Chebyshev ring a cell belongs to.
pub fn ring_of(cell: (i32, i32)) -> i32 {
    cell.0.abs().max(cell.1.abs())
}

/// Number of cells in rings `0..=rings`, for non-negative `rings`.
pub fn cells_within(rings: i32) -> i64 {
    let side = 2 * rings as i64 + 1;
    side * side
}

/// First cell of the walk: the center.
pub fn first_cell() -> (i32, i32) {
    (0, 0)
}

/// Successor of `cell` in spiral order. Stays within the current ring
/// until it is exhausted, then jumps to the start corner of the next one.
pub fn next_cell(cell: (i32, i32)) -> (i32, i32) {
    let (u, v) = cell;
    let k = ring_of(cell);
    if k == 0 {
        return (-1, -1);
    }
    if v == -k && u < k {
        (u + 1, v)
    } else if u == k && v < k {
        (u, v + 1)
    } else if v == k && u > -k {
        (u - 1, v)
    } else if u == -k && v > -k + 1 {
        (u, v - 1)
    } else {
        // (-k, -k + 1) is the last cell of ring k.
        (-(k + 1), -(k + 1))
    }
}

/// All cells within `rings`, in walk order.
pub fn spiral(rings: i32) -> impl Iterator<Item = (i32, i32)> {
    let mut cell = (rings >= 0).then_some(first_cell());
    std::iter::from_fn(move || {
        let current = cell?;
        let candidate = next_cell(current);
        cell = (ring_of(candidate) <= rings).then_some(candidate);
        Some(current)
    })
}
