//! Grid position tables of the folded sheet formats
//!
//! Entry `k` of a table gives the row (or column) of the `k`-th page of a
//! signature. The destination face is derived from `k` alone, so a table
//! covers exactly one sheet: `cols * rows * 2` pages.

use crate::types::Format;

const IN4H_ROWS: [usize; 8] = [0, 0, 1, 1, 1, 1, 0, 0];
const IN4H_COLS: [usize; 8] = [1, 0, 0, 1, 0, 1, 1, 0];

const IN4V_ROWS: [usize; 8] = [0, 0, 0, 0, 1, 1, 1, 1];
const IN4V_COLS: [usize; 8] = [1, 0, 1, 0, 0, 1, 0, 1];

const IN8H_ROWS: [usize; 16] = [0, 0, 1, 1, 1, 1, 0, 0, 0, 0, 1, 1, 1, 1, 0, 0];
const IN8H_COLS: [usize; 16] = [3, 0, 0, 3, 0, 3, 3, 0, 1, 2, 2, 1, 2, 1, 1, 2];

const IN8V_ROWS: [usize; 16] = [0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0];
const IN8V_COLS: [usize; 16] = [3, 0, 3, 0, 0, 3, 0, 3, 2, 1, 2, 1, 1, 2, 1, 2];

const IN16H_ROWS: [usize; 32] = [
    0, 0, 3, 3, 3, 3, 0, 0, 1, 1, 2, 2, 2, 2, 1, 1, 1, 1, 2, 2, 2, 2, 1, 1, 0, 0, 3, 3, 3, 3, 0,
    0,
];
const IN16H_COLS: [usize; 32] = [
    3, 0, 0, 3, 0, 3, 3, 0, 0, 3, 3, 0, 3, 0, 0, 3, 2, 1, 1, 2, 1, 2, 2, 1, 1, 2, 2, 1, 2, 1, 1,
    2,
];

const IN16V_ROWS: [usize; 32] = [
    0, 0, 0, 0, 3, 3, 3, 3, 3, 3, 3, 3, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1,
    1,
];
const IN16V_COLS: [usize; 32] = [
    3, 0, 3, 0, 0, 3, 0, 3, 2, 1, 2, 1, 1, 2, 1, 2, 2, 1, 2, 1, 1, 2, 1, 2, 3, 0, 3, 0, 0, 3, 0,
    3,
];

/// Booklet pages always sit on row 0; the column is computed from the shift.
const BOOKLET_ROWS: [usize; 4] = [0, 0, 0, 0];
const BOOKLET_COLS: [usize; 4] = [1, 0, 0, 1];

const SINGLE: [usize; 2] = [0, 0];

/// Row table of a format
pub fn rows(format: Format) -> &'static [usize] {
    match format {
        Format::In4h => &IN4H_ROWS,
        Format::In4v => &IN4V_ROWS,
        Format::In8h => &IN8H_ROWS,
        Format::In8v => &IN8V_ROWS,
        Format::In16h => &IN16H_ROWS,
        Format::In16v => &IN16V_ROWS,
        Format::Booklet => &BOOKLET_ROWS,
        Format::None => &SINGLE,
    }
}

/// Column table of a format
pub fn cols(format: Format) -> &'static [usize] {
    match format {
        Format::In4h => &IN4H_COLS,
        Format::In4v => &IN4V_COLS,
        Format::In8h => &IN8H_COLS,
        Format::In8v => &IN8V_COLS,
        Format::In16h => &IN16H_COLS,
        Format::In16v => &IN16V_COLS,
        Format::Booklet => &BOOKLET_COLS,
        Format::None => &SINGLE,
    }
}

/// Grid position `(row, col)` of the `k`-th page of a one-sheet signature
pub fn position(format: Format, k: usize) -> Option<(usize, usize)> {
    Some((*rows(format).get(k)?, *cols(format).get(k)?))
}
