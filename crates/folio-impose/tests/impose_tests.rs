use lopdf::{Dictionary, Document, Object, Stream};
use folio_impose::sequence::{PageSequencer, RetentionPolicy, SourceRange};
use folio_impose::*;
use std::path::Path;

fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    // Create pages array
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
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    // Create pages dict
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

/// Every page draws text with its own font, always named /F1
fn create_test_pdf_with_fonts(num_pages: usize) -> Document {
    let mut doc = create_test_pdf(num_pages);
    let page_ids: Vec<_> = doc.get_pages().into_values().collect();
    for (i, page_id) in page_ids.into_iter().enumerate() {
        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));
        let content = format!("BT /F1 12 Tf 72 72 Td (Page {}) Tj ET", i + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let fonts = Dictionary::from_iter(vec![("F1", Object::Reference(font_id))]);
        let resources = Dictionary::from_iter(vec![("Font", Object::Dictionary(fonts))]);
        let page = doc.get_dictionary_mut(page_id).unwrap();
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Reference(content_id));
    }
    doc
}

fn write_pdf(doc: &mut Document, path: &Path) {
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    std::fs::write(path, writer).unwrap();
}

fn media_box_size(doc: &Document, page_id: lopdf::ObjectId) -> (f32, f32) {
    let page = doc.get_dictionary(page_id).unwrap();
    let values = page.get(b"MediaBox").unwrap().as_array().unwrap();
    let numbers: Vec<f32> = values.iter().map(|v| v.as_float().unwrap()).collect();
    (numbers[2] - numbers[0], numbers[3] - numbers[1])
}

#[tokio::test]
async fn test_load_pdf() {
    use tempfile::NamedTempFile;

    let mut doc = create_test_pdf(5);
    let temp = NamedTempFile::new().unwrap();
    write_pdf(&mut doc, temp.path());

    let loaded = load_pdf(temp.path()).await.unwrap();
    assert_eq!(loaded.get_pages().len(), 5);
}

#[tokio::test]
async fn test_save_pdf() {
    use tempfile::NamedTempFile;

    let doc = create_test_pdf(2);
    let temp = NamedTempFile::new().unwrap();

    save_pdf(doc, temp.path()).await.unwrap();

    let loaded = Document::load(temp.path()).unwrap();
    assert_eq!(loaded.get_pages().len(), 2);
}

#[tokio::test]
async fn test_impose_validation_fails() {
    let options = ImpositionOptions::default(); // No input files

    match impose(&options).await {
        Err(ImposeError::Config(_)) => {}
        other => panic!("Expected Config error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_impose_empty_document() {
    let options = ImpositionOptions::default();

    match impose_documents(&[create_test_pdf(0)], &options).await {
        Err(ImposeError::PageRange { available: 0, .. }) => {}
        other => panic!("Expected PageRange error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_impose_missing_file() {
    let mut options = ImpositionOptions::default();
    options.inputs.push(InputSpec::new("/nonexistent/input.pdf"));

    assert!(impose(&options).await.is_err());
}

#[tokio::test]
async fn test_impose_booklet_basic() {
    let options = ImpositionOptions::default();
    let result = impose_documents(&[create_test_pdf(8)], &options)
        .await
        .unwrap();

    // 8 pages on 2 booklet sheets, printed on both sides
    let pages = result.get_pages();
    assert_eq!(pages.len(), 4);
    for page_id in pages.values() {
        assert_eq!(media_box_size(&result, *page_id), (1224.0, 792.0));
    }
}

#[tokio::test]
async fn test_impose_in4h() {
    let options = ImpositionOptions {
        format: Format::In4h,
        ..ImpositionOptions::default()
    };
    let result = impose_documents(&[create_test_pdf(8)], &options)
        .await
        .unwrap();

    let pages = result.get_pages();
    assert_eq!(pages.len(), 2);
    for page_id in pages.values() {
        assert_eq!(media_box_size(&result, *page_id), (1224.0, 1584.0));
        let content = result.get_page_content(*page_id).unwrap();
        let text = String::from_utf8_lossy(&content);
        assert_eq!(text.matches(" cm\n").count(), 4);
        assert_eq!(text.matches("-1 0 0 -1 ").count(), 2);
    }
}

#[tokio::test]
async fn test_impose_page_size_override() {
    let options = ImpositionOptions {
        page_width_mm: Some(100.0),
        page_height_mm: Some(200.0),
        ..ImpositionOptions::default()
    };
    let result = impose_documents(&[create_test_pdf(4)], &options)
        .await
        .unwrap();

    let pages = result.get_pages();
    let (width, height) = media_box_size(&result, *pages.values().next().unwrap());
    assert!((width - 2.0 * 100.0 * 72.0 / 25.4).abs() < 0.1);
    assert!((height - 200.0 * 72.0 / 25.4).abs() < 0.1);
}

#[tokio::test]
async fn test_clashing_resources_are_renamed() {
    let options = ImpositionOptions::default();
    let result = impose_documents(&[create_test_pdf_with_fonts(4)], &options)
        .await
        .unwrap();

    let pages = result.get_pages();
    assert_eq!(pages.len(), 2);
    for page_id in pages.values() {
        let page = result.get_dictionary(*page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert_eq!(fonts.len(), 2);
        assert!(fonts.get(b"F1").is_ok());

        let content = result.get_page_content(*page_id).unwrap();
        let text = String::from_utf8_lossy(&content);
        let renamed = fonts
            .iter()
            .map(|(name, _)| String::from_utf8_lossy(name).into_owned())
            .find(|name| name != "F1")
            .unwrap();
        assert!(text.contains(&format!("/{} 12 Tf", renamed)));
        assert!(text.contains("/F1 12 Tf"));
    }
}

#[tokio::test]
async fn test_impose_sequence_with_append() {
    let primary = vec![SourceRange::new(create_test_pdf(8))];
    let append = vec![SourceRange::new(create_test_pdf(3))];
    let mut sequencer = PageSequencer::open(primary, append, RetentionPolicy::KeepOpen).unwrap();

    let options = ImpositionOptions::default();
    let stats = calculate_statistics(&sequencer, &options).unwrap();
    let result = impose_sequence(&mut sequencer, &options).unwrap();

    let pages = result.get_pages();
    assert_eq!(pages.len(), 4 + 3);
    assert_eq!(stats.output_pages, pages.len());

    // appended pages keep their own size
    let last = *pages.values().last().unwrap();
    assert_eq!(media_box_size(&result, last), (612.0, 792.0));
}

#[tokio::test]
async fn test_impose_from_files_with_append() {
    use tempfile::TempDir;

    let dir = TempDir::new().unwrap();
    let body = dir.path().join("body.pdf");
    let cover = dir.path().join("cover.pdf");
    write_pdf(&mut create_test_pdf(6), &body);
    write_pdf(&mut create_test_pdf(2), &cover);

    let mut options = ImpositionOptions::default();
    options.inputs.push(InputSpec::new(&body));
    options.append.push(AppendSpec::new(&cover));
    options.retention = RetentionPolicy::OpenOnDemand;

    let result = impose(&options).await.unwrap();
    assert_eq!(result.get_pages().len(), 4 + 2);

    let output = dir.path().join("out.pdf");
    save_pdf(result, &output).await.unwrap();
    assert_eq!(load_pdf(&output).await.unwrap().get_pages().len(), 6);
}

#[tokio::test]
async fn test_concatenate_with_bookmarks_and_labels() {
    use tempfile::TempDir;

    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.pdf");
    let second = dir.path().join("second.pdf");
    write_pdf(&mut create_test_pdf(2), &first);
    write_pdf(&mut create_test_pdf(3), &second);

    let mut options = ImpositionOptions {
        format: Format::None,
        bookmarks: vec![Bookmark::new(0, "Front matter"), Bookmark::new(2, "Chapter 1")],
        ..ImpositionOptions::default()
    };
    options.inputs.push(InputSpec {
        page_number_offset: Some(2),
        ..InputSpec::new(&first)
    });
    options.inputs.push(InputSpec::new(&second));

    let result = impose(&options).await.unwrap();
    let pages = result.get_pages();
    assert_eq!(pages.len(), 5);
    for page_id in pages.values() {
        assert_eq!(media_box_size(&result, *page_id), (612.0, 792.0));
    }

    let catalog = result.catalog().unwrap();
    let outlines = catalog.get(b"Outlines").unwrap().as_reference().unwrap();
    let outlines = result.get_dictionary(outlines).unwrap();
    assert_eq!(outlines.get(b"Count").unwrap().as_i64().unwrap(), 2);

    let labels = catalog.get(b"PageLabels").unwrap().as_dict().unwrap();
    let nums = labels.get(b"Nums").unwrap().as_array().unwrap();
    assert_eq!(nums[2].as_i64().unwrap(), 2);
}

#[tokio::test]
async fn test_concatenate_without_bookmarks_has_no_outline() {
    let options = ImpositionOptions {
        format: Format::None,
        ..ImpositionOptions::default()
    };
    let result = impose_documents(&[create_test_pdf(2), create_test_pdf(2)], &options)
        .await
        .unwrap();

    assert_eq!(result.get_pages().len(), 4);
    let catalog = result.catalog().unwrap();
    assert!(catalog.get(b"Outlines").is_err());
    assert!(catalog.get(b"PageLabels").is_err());
}

#[tokio::test]
async fn test_fold_out_output_matches_statistics() {
    let options = ImpositionOptions {
        fold_outs: vec![5],
        ..ImpositionOptions::default()
    };

    let primary = vec![SourceRange::new(create_test_pdf(14))];
    let sequencer = PageSequencer::open(primary.clone(), vec![], RetentionPolicy::KeepOpen).unwrap();
    let stats = calculate_statistics(&sequencer, &options).unwrap();

    let mut sequencer = PageSequencer::open(primary, vec![], RetentionPolicy::KeepOpen).unwrap();
    let result = impose_sequence(&mut sequencer, &options).unwrap();
    assert_eq!(result.get_pages().len(), stats.output_pages);
    assert_eq!(stats.output_pages, stats.output_sheets * 2 + stats.out_of_sequence_pages);
}

#[tokio::test]
async fn test_signature_breaks_between_inputs() {
    let options = ImpositionOptions::default();
    let primary = vec![
        SourceRange::new(create_test_pdf(4)),
        SourceRange::new(create_test_pdf(4)),
    ];
    let sequencer = PageSequencer::open(primary, vec![], RetentionPolicy::KeepOpen).unwrap();

    let mut with_break = options.clone();
    with_break.signature_breaks = vec![4];
    let plan = plan_imposition(&sequencer, &with_break);
    assert_eq!(plan.signatures.len(), 2);
    assert_eq!(plan.signatures[1].first_page, 4);

    let plan = plan_imposition(&sequencer, &options);
    assert_eq!(plan.signatures.len(), 1);
}
