//! Shared constants for PDF imposition
//!
//! This module centralizes magic numbers and constants used throughout
//! the imposition process.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

// =============================================================================
// Signatures
// =============================================================================

/// Default upper bound of sheets nested into one booklet signature
pub const DEFAULT_MAX_SHEETS_PER_SIGNATURE: usize = 5;

/// Horizontal shift of a base leaf that carries a fold-out (millimeters)
pub const FOLD_OUT_OFFSET_MM: f32 = 7.0;

/// Highest PDF version written to the destination document
pub const MAX_OUTPUT_VERSION: &str = "1.7";

// =============================================================================
// Resource Names
// =============================================================================

/// Prefix of resource names minted by the merger
pub const UNIQUE_NAME_PREFIX: &str = "Imp";

/// Resource class that is unioned instead of renamed
pub const PROC_SET: &[u8] = b"ProcSet";

// =============================================================================
// Glue Labels
// =============================================================================

/// Resource name of the label font on each destination page
pub const LABEL_FONT_NAME: &[u8] = b"FoldMark";

/// Standard Type1 font used for labels
pub const LABEL_BASE_FONT: &[u8] = b"Courier";

/// Label font size (points)
pub const LABEL_FONT_SIZE: f32 = 6.0;

/// Distance of the label from the left edge when the glue page is odd (points)
pub const LABEL_ODD_EDGE_DISTANCE: f32 = 12.0;

/// Distance of the label from the right edge when the glue page is even (points)
pub const LABEL_EVEN_EDGE_DISTANCE: f32 = 6.0;
