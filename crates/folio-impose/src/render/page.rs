//! Content operators and page dictionaries of imposed output pages

use lopdf::{Dictionary, Object, ObjectId};

use crate::constants::{
    LABEL_BASE_FONT, LABEL_EVEN_EDGE_DISTANCE, LABEL_FONT_SIZE, LABEL_ODD_EDGE_DISTANCE,
};
use crate::layout::{PagePlacement, Rect};

// =============================================================================
// Transformations
// =============================================================================

/// Matrix drawing a source page into its cell.
///
/// The page is centered in the cell, turned by 180° when the placement asks
/// for it, and moved by the fine offset of the sheet side. The source box
/// origin is not included; see [`origin_shift`].
pub fn placement_matrix(
    placement: &PagePlacement,
    cell: (f32, f32),
    source_box: &Rect,
    side_offset: (f32, f32),
) -> [f32; 6] {
    let (cell_width, cell_height) = cell;
    let center_x = (cell_width - source_box.width) / 2.0;
    let center_y = (cell_height - source_box.height) / 2.0;

    if placement.rotated {
        [
            -1.0,
            0.0,
            0.0,
            -1.0,
            placement.origin_x(cell_width) - center_x + side_offset.0,
            placement.origin_y(cell_height) - center_y + side_offset.1,
        ]
    } else {
        [
            1.0,
            0.0,
            0.0,
            1.0,
            placement.origin_x(cell_width) + center_x + side_offset.0,
            placement.origin_y(cell_height) + center_y + side_offset.1,
        ]
    }
}

/// `cm` operator for a matrix
pub fn concat_matrix(matrix: &[f32; 6]) -> String {
    let [a, b, c, d, e, f] = matrix.map(operand);
    format!("{} {} {} {} {} {} cm\n", a, b, c, d, e, f)
}

/// Translation moving the source box origin to (0, 0), if it is not there
pub fn origin_shift(source_box: &Rect) -> Option<String> {
    if source_box.x == 0.0 && source_box.y == 0.0 {
        None
    } else {
        Some(concat_matrix(&[
            1.0,
            0.0,
            0.0,
            1.0,
            -source_box.x,
            -source_box.y,
        ]))
    }
}

/// Content stream operand; `-0` is written as `0`
fn operand(value: f32) -> f32 {
    if value == 0.0 { 0.0 } else { value }
}

// =============================================================================
// Glue Labels
// =============================================================================

/// Operators printing a glue label on a page of `width` × `height` points.
///
/// The label is written bottom-to-top, vertically centered, near the left
/// edge when the page it refers to is odd and near the right edge otherwise.
pub fn glue_label(
    font_name: &[u8],
    glue_page: usize,
    printed: i64,
    width: f32,
    height: f32,
) -> String {
    let x = if glue_page & 1 == 1 {
        LABEL_ODD_EDGE_DISTANCE
    } else {
        width - LABEL_EVEN_EDGE_DISTANCE
    };
    let y = height / 2.0;
    format!(
        "BT /{} {} Tf 0 1 -1 0 {} {} Tm (p. {}) Tj ET\n",
        String::from_utf8_lossy(font_name),
        LABEL_FONT_SIZE,
        x,
        y,
        printed
    )
}

/// Font dictionary of the label font
pub fn label_font_dictionary() -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(LABEL_BASE_FONT.to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ])
}

// =============================================================================
// Page Dictionaries
// =============================================================================

/// `[x0 y0 x1 y1]` array of a rectangle
pub fn rect_array(rect: &Rect) -> Object {
    Object::Array(vec![
        Object::Real(rect.x),
        Object::Real(rect.y),
        Object::Real(rect.right()),
        Object::Real(rect.top()),
    ])
}

/// Page dictionary with a single content stream
pub fn page_dictionary(
    parent: ObjectId,
    media_box: &Rect,
    contents: ObjectId,
    resources: Dictionary,
) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(parent)),
        ("MediaBox", rect_array(media_box)),
        ("Contents", Object::Reference(contents)),
        ("Resources", Object::Dictionary(resources)),
    ])
}
