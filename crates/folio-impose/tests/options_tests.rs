use folio_impose::*;
use folio_impose::layout::SheetSide;
use std::path::PathBuf;

#[test]
fn test_validation_no_input_files() {
    let options = ImpositionOptions::default();
    match options.validate() {
        Err(ImposeError::Config(msg)) => {
            assert!(msg.contains("No input files"));
        }
        _ => panic!("Expected Config error"),
    }
    // the layout alone is fine
    assert!(options.validate_layout().is_ok());
}

#[test]
fn test_validation_page_size() {
    let mut options = ImpositionOptions::default();
    options.inputs.push(InputSpec::new("test.pdf"));
    assert!(options.validate().is_ok());

    options.page_width_mm = Some(0.0);
    assert!(options.validate().is_err());

    options.page_width_mm = Some(148.0);
    options.page_height_mm = Some(f32::NAN);
    assert!(options.validate().is_err());

    options.page_height_mm = None;
    options.back_offset_mm = PageOffset::new(f32::INFINITY, 0.0);
    assert!(options.validate().is_err());
}

#[test]
fn test_normalized() {
    let options = ImpositionOptions {
        format: Format::In16v,
        first_page_as_even: true,
        max_sheets_per_signature: 0,
        ..ImpositionOptions::default()
    };
    let normalized = options.normalized();
    assert_eq!(normalized.max_sheets_per_signature, 1);
    assert!(!normalized.first_page_as_even);
    assert_eq!(normalized.booklet_shift(), 0);

    let booklet = ImpositionOptions {
        first_page_as_even: true,
        ..ImpositionOptions::default()
    };
    assert_eq!(booklet.normalized().booklet_shift(), -1);
}

#[test]
fn test_fold_outs_rounded_to_odd() {
    let options = ImpositionOptions {
        fold_outs: vec![4, 7, 0, 3],
        ..ImpositionOptions::default()
    };
    let pages: Vec<usize> = options.fold_out_pages().into_iter().collect();
    assert_eq!(pages, vec![3, 7]);
}

#[test]
fn test_fold_outs_ignore_page_number_offset() {
    let mut options = ImpositionOptions {
        fold_outs: vec![5],
        signature_breaks: vec![8],
        ..ImpositionOptions::default()
    };
    options.inputs.push(InputSpec {
        page_number_offset: Some(2),
        ..InputSpec::new("a.pdf")
    });

    // physical indices pass through unchanged
    assert_eq!(options.fold_out_pages().into_iter().collect::<Vec<_>>(), vec![5]);
    let breaks: Vec<usize> = options.signature_break_pages(&[12]).into_iter().collect();
    assert_eq!(breaks, vec![8]);
}

#[test]
fn test_side_offsets_in_points() {
    let options = ImpositionOptions {
        front_offset_mm: PageOffset::new(25.4, 0.0),
        back_offset_mm: PageOffset::new(0.0, -25.4),
        ..ImpositionOptions::default()
    };
    let (x, y) = options.side_offset_pt(SheetSide::Front);
    assert!((x - 72.0).abs() < 0.01);
    assert_eq!(y, 0.0);
    let (x, y) = options.side_offset_pt(SheetSide::Back);
    assert_eq!(x, 0.0);
    assert!((y + 72.0).abs() < 0.01);

    assert_eq!(options.cell_size_pt(500.0, 700.0), (500.0, 700.0));
}

#[test]
fn test_source_ranges_inherit_offsets() {
    let mut options = ImpositionOptions::default();
    options.inputs.push(InputSpec {
        page_number_offset: Some(2),
        from_page: Some(1),
        to_page: Some(4),
        ..InputSpec::new("a.pdf")
    });
    options.inputs.push(InputSpec::new("b.pdf"));
    options.inputs.push(InputSpec {
        page_number_offset: Some(0),
        ..InputSpec::new("c.pdf")
    });
    options.append.push(AppendSpec {
        from_page: Some(2),
        ..AppendSpec::new("cover.pdf")
    });

    let (primary, append) = options.source_ranges();
    let offsets: Vec<i32> = primary.iter().map(|r| r.page_number_offset).collect();
    assert_eq!(offsets, vec![2, 2, 0]);

    // printed pages 1..=4 with offset 2 are physical pages 2..=5
    assert_eq!(primary[0].from_page, 2);
    assert_eq!(primary[0].to_page, Some(5));
    assert_eq!(primary[1].from_page, 0);
    assert_eq!(primary[1].to_page, None);

    assert_eq!(append.len(), 1);
    assert_eq!(append[0].from_page, 1);
}

#[test]
fn test_signature_break_pages() {
    let mut options = ImpositionOptions::default();
    options.signature_breaks = vec![3];
    options.inputs.push(InputSpec {
        signature_break: true,
        ..InputSpec::new(PathBuf::from("a.pdf"))
    });
    options.inputs.push(InputSpec::new(PathBuf::from("b.pdf")));

    let breaks: Vec<usize> = options
        .signature_break_pages(&[10, 6])
        .into_iter()
        .collect();
    assert_eq!(breaks, vec![3, 10]);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_options() {
    use tempfile::NamedTempFile;

    let mut options = ImpositionOptions::default();
    options.inputs.push(InputSpec {
        page_number_offset: Some(-2),
        signature_break: true,
        ..InputSpec::new("input.pdf")
    });
    options.append.push(AppendSpec::new("cover.pdf"));
    options.format = Format::In8v;
    options.max_sheets_per_signature = 3;
    options.fold_outs = vec![9];
    options.front_offset_mm = PageOffset::new(1.5, -0.5);
    options.bookmarks.push(Bookmark::new(0, "Start"));
    options.retention = sequence::RetentionPolicy::OpenOnDemand;

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    options.save(path).await.unwrap();
    let loaded = ImpositionOptions::load(path).await.unwrap();

    assert_eq!(loaded, options);
}

#[cfg(feature = "serde")]
#[test]
fn test_options_json_defaults_and_format_names() {
    let options: ImpositionOptions =
        serde_json::from_str(r#"{ "format": "IN16H", "inputs": [{ "path": "a.pdf" }] }"#).unwrap();
    assert_eq!(options.format, Format::In16h);
    assert_eq!(options.inputs[0].path, PathBuf::from("a.pdf"));
    assert_eq!(options.max_sheets_per_signature, 5);

    let unknown: ImpositionOptions = serde_json::from_str(r#"{ "format": "folio" }"#).unwrap();
    assert_eq!(unknown.format, Format::Booklet);

    let json = serde_json::to_string(&ImpositionOptions::default()).unwrap();
    assert!(json.contains(r#""format":"booklet""#));
    assert!(json.contains(r#""retention":"keep_open""#));
}
