//! Layout data types for imposition
//!
//! These types are the output of the planner: where every source page of a
//! signature lands, and how many sheets the signature ends up using.

use crate::types::Format;

/// Which physical side of the printed sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetSide {
    /// Front of the sheet (even destination pages)
    Front,
    /// Back of the sheet (odd destination pages)
    Back,
}

impl SheetSide {
    pub fn of_dest_page(dest_page: usize) -> Self {
        if dest_page & 1 == 0 {
            SheetSide::Front
        } else {
            SheetSide::Back
        }
    }
}

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from two corners in any order
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::new(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs())
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// Position of a source page on one face of a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlacement {
    /// Destination page within the signature (one face of a sheet)
    pub dest_page: usize,
    /// Grid row (row 0 is the bottom row)
    pub row: usize,
    /// Grid column (column 0 is the leftmost column)
    pub col: usize,
    /// Whether the page is turned by 180°
    pub rotated: bool,
    /// Extra horizontal shift in points (fold-out splicing only)
    pub x_offset: f32,
    /// Extra vertical shift in points
    pub y_offset: f32,
    /// Physical page index a glue label on this page should reference
    pub glue_to: Option<usize>,
}

impl PagePlacement {
    pub fn new(dest_page: usize, row: usize, col: usize, rotated: bool) -> Self {
        Self {
            dest_page,
            row,
            col,
            rotated,
            x_offset: 0.0,
            y_offset: 0.0,
            glue_to: None,
        }
    }

    pub fn rotation(&self) -> u16 {
        if self.rotated { 180 } else { 0 }
    }

    pub fn sheet_side(&self) -> SheetSide {
        SheetSide::of_dest_page(self.dest_page)
    }

    /// Horizontal origin of the cell this page is drawn into.
    ///
    /// A rotated page is drawn around its top-right corner, so the origin
    /// moves one cell to the right.
    pub fn origin_x(&self, cell_width: f32) -> f32 {
        let rotation_shift = if self.rotated { cell_width } else { 0.0 };
        cell_width * self.col as f32 + rotation_shift + self.x_offset
    }

    /// Vertical origin of the cell this page is drawn into
    pub fn origin_y(&self, cell_height: f32) -> f32 {
        let rotation_shift = if self.rotated { cell_height } else { 0.0 };
        cell_height * self.row as f32 + rotation_shift + self.y_offset
    }
}

/// Where one source page of a signature goes
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// Laid out on the sheet grid
    Sheet(PagePlacement),
    /// Emitted as a standalone page after all signatures
    OutOfSequence { glue_to: Option<usize> },
}

impl Placement {
    pub fn as_sheet(&self) -> Option<&PagePlacement> {
        match self {
            Placement::Sheet(placement) => Some(placement),
            Placement::OutOfSequence { .. } => None,
        }
    }

    pub fn dest_page(&self) -> Option<usize> {
        self.as_sheet().map(|placement| placement.dest_page)
    }

    pub fn glue_to(&self) -> Option<usize> {
        match self {
            Placement::Sheet(placement) => placement.glue_to,
            Placement::OutOfSequence { glue_to } => *glue_to,
        }
    }

    pub fn is_out_of_sequence(&self) -> bool {
        matches!(self, Placement::OutOfSequence { .. })
    }
}

/// One signature of the plan: a contiguous run of source pages
#[derive(Debug, Clone, PartialEq)]
pub struct SignaturePlan {
    /// Physical index of the first source page
    pub first_page: usize,
    /// Number of sheets actually used
    pub sheets: usize,
    /// One placement per source page, in page order
    pub placements: Vec<Placement>,
}

impl SignaturePlan {
    /// Number of source pages in this signature
    pub fn page_count(&self) -> usize {
        self.placements.len()
    }

    /// Number of destination pages (sheet faces)
    pub fn dest_pages(&self) -> usize {
        self.sheets * 2
    }

    /// Placement of the `k`-th page of the signature
    pub fn placement(&self, k: usize) -> Option<&Placement> {
        self.placements.get(k)
    }

    /// Physical page index one past the last page of this signature
    pub fn end_page(&self) -> usize {
        self.first_page + self.placements.len()
    }

    pub fn out_of_sequence_count(&self) -> usize {
        self.placements
            .iter()
            .filter(|placement| placement.is_out_of_sequence())
            .count()
    }
}

/// The complete layout of a page stream
#[derive(Debug, Clone, PartialEq)]
pub struct ImpositionPlan {
    pub format: Format,
    pub signatures: Vec<SignaturePlan>,
}

impl ImpositionPlan {
    pub fn total_sheets(&self) -> usize {
        self.signatures.iter().map(|signature| signature.sheets).sum()
    }

    pub fn total_pages(&self) -> usize {
        self.signatures.iter().map(SignaturePlan::page_count).sum()
    }

    pub fn out_of_sequence_count(&self) -> usize {
        self.signatures
            .iter()
            .map(SignaturePlan::out_of_sequence_count)
            .sum()
    }

    /// Signature and in-signature index of a physical page
    pub fn locate(&self, page: usize) -> Option<(usize, usize)> {
        self.signatures
            .iter()
            .enumerate()
            .find(|(_, signature)| page >= signature.first_page && page < signature.end_page())
            .map(|(index, signature)| (index, page - signature.first_page))
    }
}
