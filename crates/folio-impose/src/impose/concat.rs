//! Verbatim page copies, outlines and page labels

use lopdf::{Dictionary, Object, ObjectId, StringFormat};

use crate::options::Bookmark;
use crate::render::{get_page_content, inherited_attribute, page_box, page_media_box, rect_array};
use crate::sequence::{PageSequencer, SequencedPage};
use crate::types::Result;

use super::output::OutputDocument;

/// Copy every remaining page of the current stream, starting with `first`
/// when given. Returns the number of pages copied.
pub(crate) fn concatenate(
    sequencer: &mut PageSequencer,
    output: &mut OutputDocument,
    first: Option<SequencedPage>,
) -> Result<usize> {
    let mut copied = 0;
    let mut current = match first {
        Some(page) => Some(page),
        None => sequencer.next()?,
    };
    while let Some(page) = current {
        copy_page(output, &page)?;
        copied += 1;
        current = sequencer.next()?;
    }
    log::debug!("Copied {} page(s) verbatim", copied);
    Ok(copied)
}

fn copy_page(output: &mut OutputDocument, page: &SequencedPage) -> Result<()> {
    let media_box = page_media_box(&page.document, page.page_id);
    let content = get_page_content(&page.document, page.page_id)?;
    let resources = output.copy_resources(page)?;
    let page_id = output.create_page(&media_box, content, resources);

    let crop_box = page_box(&page.document, page.page_id, b"CropBox");
    let rotate = inherited_attribute(&page.document, page.page_id, b"Rotate")
        .and_then(|rotate| rotate.as_i64().ok());
    if crop_box.is_some() || rotate.is_some() {
        let dict = output.document_mut().get_dictionary_mut(page_id)?;
        if let Some(crop_box) = crop_box {
            dict.set("CropBox", rect_array(&crop_box));
        }
        if let Some(rotate) = rotate {
            dict.set("Rotate", Object::Integer(rotate));
        }
    }

    output.push_page(page_id);
    Ok(())
}

// =============================================================================
// Outline
// =============================================================================

/// Build an outline over the `count` output pages starting at
/// `first_index`. Bookmarks point at pages relative to `first_index`.
pub(crate) fn build_outline(
    output: &mut OutputDocument,
    bookmarks: &[Bookmark],
    first_index: usize,
    count: usize,
) -> Option<ObjectId> {
    let targets: Vec<(&Bookmark, ObjectId)> = bookmarks
        .iter()
        .filter_map(|bookmark| {
            let target = (bookmark.page < count)
                .then(|| output.page_refs().get(first_index + bookmark.page))
                .flatten();
            if target.is_none() {
                log::warn!(
                    "Bookmark \"{}\" points past the last page ({}), ignored",
                    bookmark.title,
                    bookmark.page
                );
            }
            target.map(|id| (bookmark, *id))
        })
        .collect();
    if targets.is_empty() {
        return None;
    }

    let doc = output.document_mut();
    let outlines_id = doc.new_object_id();
    let item_ids: Vec<ObjectId> = targets.iter().map(|_| doc.new_object_id()).collect();

    for (i, (bookmark, page_id)) in targets.iter().enumerate() {
        let mut item = Dictionary::from_iter(vec![
            ("Title", outline_title(&bookmark.title)),
            ("Parent", Object::Reference(outlines_id)),
            (
                "Dest",
                Object::Array(vec![
                    Object::Reference(*page_id),
                    Object::Name(b"Fit".to_vec()),
                ]),
            ),
        ]);
        if i > 0 {
            item.set("Prev", Object::Reference(item_ids[i - 1]));
        }
        if let Some(next) = item_ids.get(i + 1) {
            item.set("Next", Object::Reference(*next));
        }
        doc.objects.insert(item_ids[i], Object::Dictionary(item));
    }

    let outlines = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Outlines".to_vec())),
        ("First", Object::Reference(item_ids[0])),
        ("Last", Object::Reference(item_ids[item_ids.len() - 1])),
        ("Count", Object::Integer(item_ids.len() as i64)),
    ]);
    doc.objects.insert(outlines_id, Object::Dictionary(outlines));
    Some(outlines_id)
}

/// Text string of an outline title: literal when ASCII, UTF-16BE otherwise
fn outline_title(title: &str) -> Object {
    if title.is_ascii() {
        return Object::string_literal(title);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in title.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

// =============================================================================
// Page Labels
// =============================================================================

/// Page label tree for a stream whose first page has `offset`.
///
/// A positive offset leaves the first `offset` pages unnumbered; a negative
/// one starts decimal numbering at `1 - offset`.
pub(crate) fn page_labels(offset: i32) -> Option<Dictionary> {
    if offset == 0 {
        return None;
    }
    let mut nums = Vec::new();
    if offset > 0 {
        nums.push(Object::Integer(0));
        nums.push(Object::Dictionary(Dictionary::new()));
    }
    let start = if offset < 0 { 1 - offset } else { 1 };
    nums.push(Object::Integer(offset.max(0) as i64));
    nums.push(Object::Dictionary(Dictionary::from_iter(vec![
        ("S", Object::Name(b"D".to_vec())),
        ("St", Object::Integer(start as i64)),
    ])));
    Some(Dictionary::from_iter(vec![("Nums", Object::Array(nums))]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_labels_without_offset() {
        assert!(page_labels(0).is_none());
    }

    #[test]
    fn test_front_matter_labels() {
        let labels = page_labels(3).unwrap();
        let nums = labels.get(b"Nums").unwrap().as_array().unwrap();
        assert_eq!(nums.len(), 4);
        assert_eq!(nums[0].as_i64().unwrap(), 0);
        assert_eq!(nums[2].as_i64().unwrap(), 3);
        let style = nums[3].as_dict().unwrap();
        assert_eq!(style.get(b"St").unwrap().as_i64().unwrap(), 1);
    }

    #[test]
    fn test_negative_offset_labels() {
        let labels = page_labels(-4).unwrap();
        let nums = labels.get(b"Nums").unwrap().as_array().unwrap();
        assert_eq!(nums.len(), 2);
        assert_eq!(nums[0].as_i64().unwrap(), 0);
        let style = nums[1].as_dict().unwrap();
        assert_eq!(style.get(b"St").unwrap().as_i64().unwrap(), 5);
    }

    #[test]
    fn test_outline_title_encoding() {
        match outline_title("Intro") {
            Object::String(bytes, StringFormat::Literal) => assert_eq!(bytes, b"Intro"),
            other => panic!("unexpected title {:?}", other),
        }
        match outline_title("Été") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
                assert_eq!(bytes.len(), 2 + 3 * 2);
            }
            other => panic!("unexpected title {:?}", other),
        }
    }

    #[test]
    fn test_outline_links_items() {
        let mut output = OutputDocument::new("1.5");
        for _ in 0..3 {
            output.add_page(
                &crate::layout::Rect::new(0.0, 0.0, 10.0, 10.0),
                Vec::new(),
                Dictionary::new(),
            );
        }
        let bookmarks = vec![
            Bookmark::new(0, "One"),
            Bookmark::new(2, "Three"),
            Bookmark::new(7, "Missing"),
        ];
        let outlines_id = build_outline(&mut output, &bookmarks, 0, 3).unwrap();
        let page_three = output.page_refs()[2];

        let doc = output.finish(Dictionary::new());
        let outlines = doc.get_dictionary(outlines_id).unwrap();
        assert_eq!(outlines.get(b"Count").unwrap().as_i64().unwrap(), 2);

        let last = outlines.get(b"Last").unwrap().as_reference().unwrap();
        let last = doc.get_dictionary(last).unwrap();
        assert!(last.get(b"Next").is_err());
        assert!(last.get(b"Prev").is_ok());
        let dest = last.get(b"Dest").unwrap().as_array().unwrap();
        assert_eq!(dest[0].as_reference().unwrap(), page_three);
    }
}
