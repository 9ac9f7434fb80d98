//! Reading source pages
//!
//! Page attributes may be inherited from the page tree, and any of them may
//! be stored as indirect objects; the helpers here resolve both.

use crate::constants::{DEFAULT_PAGE_HEIGHT_PT, DEFAULT_PAGE_WIDTH_PT};
use crate::layout::Rect;
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Guards against cycles in malformed page trees
const MAX_TREE_DEPTH: usize = 64;

// =============================================================================
// Attributes
// =============================================================================

/// Follow a reference to the object it points to
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        _ => Ok(obj),
    }
}

/// Look up a page attribute, walking up the page tree when the page does not
/// carry it itself
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return resolve(doc, value).ok();
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// The page's media box, normalized; US Letter when missing
pub fn page_media_box(doc: &Document, page_id: ObjectId) -> Rect {
    page_box(doc, page_id, b"MediaBox").unwrap_or_else(|| {
        log::debug!("Page {:?} has no usable MediaBox, assuming US Letter", page_id);
        Rect::new(0.0, 0.0, DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT)
    })
}

/// A page box attribute (`MediaBox`, `CropBox`, ...), normalized
pub fn page_box(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Rect> {
    let values = inherited_attribute(doc, page_id, key)?.as_array().ok()?;
    let numbers: Vec<f32> = values
        .iter()
        .filter_map(|value| resolve(doc, value).ok().and_then(extract_number))
        .collect();
    match numbers.as_slice() {
        [x0, y0, x1, y1] => Some(Rect::from_corners(*x0, *y0, *x1, *y1)),
        _ => None,
    }
}

/// The page's resource dictionary, if any
pub fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    inherited_attribute(doc, page_id, b"Resources")?.as_dict().ok()
}

/// Extract numeric value from a PDF object
pub fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Get the decoded content stream data of a page.
pub fn get_page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => resolve(doc, c)?,
        Err(_) => return Ok(Vec::new()), // No content = blank page
    };

    match contents {
        Object::Stream(stream) => Ok(stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone())),
        Object::Array(arr) => get_concatenated_content_streams(doc, arr),
        _ => Ok(Vec::new()),
    }
}

/// Concatenate multiple content streams
fn get_concatenated_content_streams(doc: &Document, refs: &[Object]) -> Result<Vec<u8>> {
    let mut result = Vec::new();

    for obj in refs {
        if let Ok(stream) = resolve(doc, obj)?.as_stream() {
            let content = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            result.extend_from_slice(&content);
            result.push(b'\n');
        }
    }

    Ok(result)
}
