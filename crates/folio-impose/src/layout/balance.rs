//! Splitting a run of sheets into evenly sized signatures

use std::collections::BTreeSet;

/// Number of sheets needed to hold `pages` source pages
pub fn sheets_needed(pages: usize, pages_per_sheet: usize) -> usize {
    pages.div_ceil(pages_per_sheet.max(1))
}

/// Distribute `total_sheets` over as few signatures as `max_per_signature`
/// allows, keeping their sizes within one sheet of each other.
///
/// Larger signatures come first.
pub fn balance_sheets(total_sheets: usize, max_per_signature: usize) -> Vec<usize> {
    if total_sheets == 0 {
        return Vec::new();
    }
    let max = max_per_signature.max(1);
    let count = total_sheets.div_ceil(max);
    let base = total_sheets / count;
    let larger = total_sheets - base * count;

    (0..count)
        .map(|index| if index < larger { base + 1 } else { base })
        .collect()
}

/// Pages of `[from, to)` that need room on the sheets.
///
/// A fold-out leaf is spliced next to its base leaf, so it frees two page
/// slots (only one when it is the last page of the range).
pub fn page_demand(from: usize, to: usize, fold_outs: &BTreeSet<usize>) -> usize {
    let released: usize = fold_outs
        .range(from..to)
        .map(|&page| if page + 1 < to { 2 } else { 1 })
        .sum();
    (to - from).saturating_sub(released)
}
