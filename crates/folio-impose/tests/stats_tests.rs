use folio_impose::sequence::{PageSequencer, RetentionPolicy, SourceRange};
use folio_impose::*;
use lopdf::{Dictionary, Document, Object, Stream};

fn create_test_document(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

fn sequencer(primary: &[usize], append: &[usize]) -> PageSequencer {
    let ranges = |counts: &[usize]| {
        counts
            .iter()
            .map(|&n| SourceRange::new(create_test_document(n)))
            .collect::<Vec<_>>()
    };
    PageSequencer::open(ranges(primary), ranges(append), RetentionPolicy::KeepOpen).unwrap()
}

#[test]
fn test_stats_booklet_balanced_signatures() {
    let options = ImpositionOptions::default();
    let stats = calculate_statistics(&sequencer(&[44], &[]), &options).unwrap();

    assert_eq!(stats.source_pages, 44);
    assert_eq!(stats.signatures, 3);
    assert_eq!(stats.sheets_per_signature, vec![4, 4, 3]);
    assert_eq!(stats.output_sheets, 11);
    assert_eq!(stats.output_pages, 22);
    assert_eq!(stats.out_of_sequence_pages, 0);
}

#[test]
fn test_stats_booklet_single_sheet_signatures() {
    let options = ImpositionOptions {
        max_sheets_per_signature: 1,
        ..ImpositionOptions::default()
    };
    let stats = calculate_statistics(&sequencer(&[10], &[]), &options).unwrap();

    assert_eq!(stats.signatures, 3);
    assert_eq!(stats.sheets_per_signature, vec![1, 1, 1]);
    assert_eq!(stats.output_pages, 6);
}

#[test]
fn test_stats_grid_format() {
    let options = ImpositionOptions {
        format: Format::In8h,
        ..ImpositionOptions::default()
    };
    let stats = calculate_statistics(&sequencer(&[20], &[]), &options).unwrap();

    // 16 pages per sheet, one sheet per signature
    assert_eq!(stats.signatures, 2);
    assert_eq!(stats.sheets_per_signature, vec![1, 1]);
    assert_eq!(stats.output_pages, 4);
}

#[test]
fn test_stats_concatenation_with_append() {
    let options = ImpositionOptions {
        format: Format::None,
        ..ImpositionOptions::default()
    };
    let stats = calculate_statistics(&sequencer(&[3, 4], &[2]), &options).unwrap();

    assert_eq!(stats.source_pages, 7);
    assert_eq!(stats.appended_pages, 2);
    assert_eq!(stats.signatures, 0);
    assert_eq!(stats.output_pages, 9);
}

#[test]
fn test_stats_append_after_booklet() {
    let options = ImpositionOptions::default();
    let stats = calculate_statistics(&sequencer(&[8], &[3]), &options).unwrap();

    assert_eq!(stats.output_sheets, 2);
    assert_eq!(stats.output_pages, 4 + 3);
}
