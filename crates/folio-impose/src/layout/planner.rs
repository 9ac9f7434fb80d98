//! Signature planning
//!
//! The planner walks the physical pages of a stream, splits them into
//! signatures at the requested breaks, balances the sheet count of the
//! signatures inside each range, and assigns every page a [`Placement`].
//!
//! ## Booklet ordering
//!
//! With `N = 4 * sheets` page slots and shift `s`, slot `k` lands on
//! destination page `max(0, min(k + s, N - 1 - k - s))`, column
//! `1 - ((k + s) & 1)`. Slots `k` and `N - 1 - k` share a destination page.
//!
//! ## Fold-outs
//!
//! A fold-out is an oversized leaf glued to the leaf before it (the base
//! leaf). The pair is spliced into the booklet as one slot: the base leaf
//! front moves to the other column and is shifted by
//! [`FOLD_OUT_OFFSET_MM`], the fold-out front takes the vacated column, and
//! the two backs go on the adjacent destination page. Leaves whose slot got
//! taken this way are emitted out of sequence.

use std::collections::BTreeSet;

use crate::constants::{FOLD_OUT_OFFSET_MM, mm_to_pt};
use crate::types::Format;

use super::balance::{balance_sheets, page_demand, sheets_needed};
use super::tables;
use super::{ImpositionPlan, PagePlacement, Placement, SignaturePlan};

// =============================================================================
// Planner
// =============================================================================

/// Computes the placement of every page of a stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPlanner {
    format: Format,
    shift: isize,
    max_sheets_per_signature: usize,
}

impl LayoutPlanner {
    /// Create a planner.
    ///
    /// `booklet_shift` is clamped to `-1..=0`; `-1` makes the first page an
    /// even (left-hand) page. Formats other than booklet always use one sheet
    /// per signature.
    pub fn new(format: Format, booklet_shift: i32, max_sheets_per_signature: usize) -> Self {
        let clamped = booklet_shift.clamp(-1, 0);
        if clamped != booklet_shift {
            log::warn!("Booklet shift {} outside -1..=0, using {}", booklet_shift, clamped);
        }
        let shift = clamped as isize;
        let max_sheets_per_signature = if format.is_booklet() {
            if max_sheets_per_signature < 1 {
                log::warn!("Max sheets per signature must be at least 1, using 1");
            }
            max_sheets_per_signature.max(1)
        } else {
            1
        };
        Self {
            format,
            shift,
            max_sheets_per_signature,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn max_sheets_per_signature(&self) -> usize {
        self.max_sheets_per_signature
    }

    /// Plan the layout of `page_count` pages.
    ///
    /// `signature_breaks` are physical page indices where a new signature
    /// must start; an implicit break sits at `page_count`. `fold_outs` are
    /// physical page indices of fold-out leaves (booklet only).
    pub fn plan(
        &self,
        page_count: usize,
        signature_breaks: &BTreeSet<usize>,
        fold_outs: &BTreeSet<usize>,
    ) -> ImpositionPlan {
        let mut breaks = BTreeSet::new();
        for &page in signature_breaks {
            if page == 0 || page > page_count {
                log::warn!(
                    "Signature break at page {} outside 1..={}, ignored",
                    page,
                    page_count
                );
            } else {
                breaks.insert(page);
            }
        }
        breaks.insert(page_count);

        let no_fold_outs = BTreeSet::new();
        let fold_outs = if self.format.is_booklet() {
            fold_outs
        } else {
            if !fold_outs.is_empty() {
                log::warn!("Fold-outs are only supported for booklets, ignored");
            }
            &no_fold_outs
        };

        let mut signatures = Vec::new();
        let mut from = 0;
        for to in breaks {
            if to > from {
                self.plan_range(from, to, fold_outs, &mut signatures);
                from = to;
            }
        }

        log::debug!(
            "Planned {} pages as {} signature(s) of {}",
            page_count,
            signatures.len(),
            self.format
        );

        ImpositionPlan {
            format: self.format,
            signatures,
        }
    }

    /// Sheet counts of the signatures covering `[from, to)`
    pub fn range_sheet_counts(
        &self,
        from: usize,
        to: usize,
        fold_outs: &BTreeSet<usize>,
    ) -> Vec<usize> {
        let demand = page_demand(from, to, fold_outs);
        let sheets = sheets_needed(demand, self.format.pages_per_sheet());
        balance_sheets(sheets, self.max_sheets_per_signature)
    }

    fn plan_range(
        &self,
        from: usize,
        to: usize,
        fold_outs: &BTreeSet<usize>,
        signatures: &mut Vec<SignaturePlan>,
    ) {
        let counts = self.range_sheet_counts(from, to, fold_outs);
        let mut page = from;
        let mut index = 0;

        while page < to {
            let sheets = match counts.get(index) {
                Some(&sheets) => sheets,
                None => {
                    log::warn!("Pages {}..{} overflow the balanced signatures", page, to);
                    1
                }
            };
            let mut builder = SignatureBuilder::new(self.format, self.shift, page, sheets);
            page = builder.fill(to, fold_outs);
            let signature = builder.finish();
            log::debug!(
                "Signature at page {}: {} pages on {} sheet(s)",
                signature.first_page,
                signature.page_count(),
                signature.sheets
            );
            signatures.push(signature);
            index += 1;
        }
    }
}

// =============================================================================
// Signature Builder
// =============================================================================

/// Working buffer of one signature.
///
/// Fold-out splicing rewrites placements that were already assigned, so the
/// placements stay mutable here until [`SignatureBuilder::finish`] freezes
/// them into a [`SignaturePlan`].
#[derive(Debug)]
pub struct SignatureBuilder {
    format: Format,
    shift: isize,
    first_page: usize,
    slots: usize,
    placements: Vec<Placement>,
}

impl SignatureBuilder {
    pub fn new(format: Format, shift: isize, first_page: usize, sheets: usize) -> Self {
        Self {
            format,
            shift,
            first_page,
            slots: sheets.max(1) * format.pages_per_sheet(),
            placements: Vec::new(),
        }
    }

    /// Assign placements to pages starting at the signature's first page,
    /// until the slots are used up or `end` is reached.
    ///
    /// Returns the physical index of the first page left over.
    pub fn fill(&mut self, end: usize, fold_outs: &BTreeSet<usize>) -> usize {
        let mut page = self.first_page + self.placements.len();
        let mut slot = 0;

        while page < end && slot < self.slots {
            if self.format.is_booklet() && fold_outs.contains(&page) {
                if self.placements.is_empty() {
                    log::warn!(
                        "Fold-out at page {} starts a signature, placed as an ordinary page",
                        page
                    );
                } else {
                    page = self.splice_fold_out(page, end);
                    slot += 1;
                    continue;
                }
            }
            self.place(slot);
            page += 1;
            slot += 1;
        }
        page
    }

    /// Freeze the buffer into a plan.
    ///
    /// The sheet count follows the highest destination page in use.
    pub fn finish(self) -> SignaturePlan {
        let max_dest = self.max_dest_page().unwrap_or(0);
        SignaturePlan {
            first_page: self.first_page,
            sheets: (max_dest + 2) / 2,
            placements: self.placements,
        }
    }

    fn max_dest_page(&self) -> Option<usize> {
        self.placements.iter().filter_map(Placement::dest_page).max()
    }

    fn page_at(&self, index: usize) -> usize {
        self.first_page + index
    }

    /// Index of the in-grid placement occupying `(dest_page, col)`
    fn occupant(&self, dest_page: usize, col: usize, skip: Option<usize>) -> Option<usize> {
        self.placements
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != skip)
            .find(|(_, placement)| {
                placement
                    .as_sheet()
                    .is_some_and(|placed| placed.dest_page == dest_page && placed.col == col)
            })
            .map(|(index, _)| index)
    }

    fn place(&mut self, slot: usize) {
        let placement = if self.format.is_booklet() {
            let n = self.slots as isize;
            let k = slot as isize + self.shift;
            let dest_page = k.min(n - 1 - k).max(0) as usize;
            let col = 1 - (k & 1) as usize;
            PagePlacement::new(dest_page, 0, col, false)
        } else {
            let (row, col) = tables::position(self.format, slot).unwrap_or_default();
            PagePlacement::new(((slot + 1) / 2) & 1, row, col, row & 1 == 1)
        };

        if self.format.is_booklet() {
            if let Some(index) = self.occupant(placement.dest_page, placement.col, None) {
                let glue_to = (placement.dest_page & 1 == 1).then(|| self.page_at(index));
                log::debug!(
                    "Page {} lost its slot on destination page {}, out of sequence",
                    self.page_at(self.placements.len()),
                    placement.dest_page
                );
                self.placements.push(Placement::OutOfSequence { glue_to });
                return;
            }
        }
        self.placements.push(Placement::Sheet(placement));
    }

    /// Splice the fold-out at `page` next to the leaf before it.
    ///
    /// Consumes up to four pages (fold-out front, fold-out back, base leaf
    /// back) and returns the next unplaced page.
    fn splice_fold_out(&mut self, page: usize, end: usize) -> usize {
        let offset = mm_to_pt(FOLD_OUT_OFFSET_MM);
        let base_index = self.placements.len() - 1;
        let base_page = self.page_at(base_index);

        let (mut base, front, single_opposite) = match &self.placements[base_index] {
            Placement::OutOfSequence { glue_to } => {
                // back-to-back fold-outs: the base leaf opens a new destination page
                let dest_page = self.max_dest_page().unwrap_or(0) + 1;
                let mut base = PagePlacement::new(dest_page, 0, 0, false);
                base.glue_to = *glue_to;
                let front = PagePlacement::new(dest_page, 0, 1, false);
                (base, front, false)
            }
            Placement::Sheet(placed) => {
                let front =
                    PagePlacement::new(placed.dest_page, placed.row, placed.col, placed.rotated);
                let mut base = placed.clone();
                base.col = 1 - placed.col;
                (base, front, true)
            }
        };
        base.x_offset = offset;
        self.placements[base_index] = Placement::Sheet(base.clone());

        let forward = base.dest_page & 1 == 0;
        if !forward && single_opposite {
            // the conjugate leaf is already placed on the way in
            if let Some(index) = self.occupant(base.dest_page, base.col, Some(base_index)) {
                self.placements[index] = Placement::OutOfSequence {
                    glue_to: Some(base_page),
                };
            }
            if let Some(index) = base
                .dest_page
                .checked_sub(1)
                .and_then(|dest_page| self.occupant(dest_page, 1 - base.col, Some(base_index)))
            {
                self.placements[index] = Placement::OutOfSequence { glue_to: None };
            }
        }

        log::debug!(
            "Fold-out at page {} spliced onto destination page {} next to page {}",
            page,
            front.dest_page,
            base_page
        );

        let back_dest = if forward {
            base.dest_page + 1
        } else {
            base.dest_page - 1
        };

        self.placements.push(Placement::Sheet(front.clone()));
        let mut next = page + 1;

        if next < end {
            let mut fold_out_back = base.clone();
            fold_out_back.dest_page = back_dest;
            fold_out_back.x_offset = -front.x_offset;
            fold_out_back.glue_to = None;
            self.placements.push(Placement::Sheet(fold_out_back));
            next += 1;
        }
        if next < end {
            let mut base_back = front;
            base_back.dest_page = back_dest;
            base_back.x_offset = -base.x_offset;
            self.placements.push(Placement::Sheet(base_back));
            next += 1;
        }
        next
    }
}
