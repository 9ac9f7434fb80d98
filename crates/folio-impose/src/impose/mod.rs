//! PDF imposition - arranging pages for bookbinding
//!
//! This module orchestrates the imposition process:
//! 1. Open the source ranges as one page stream
//! 2. Plan the signatures of the primary stream
//! 3. Place each page on its sheet, merging resources per sheet side
//! 4. Append the append stream verbatim

mod concat;
mod io;
mod output;
mod signature;

pub use io::{load_pdf, save_pdf};

use crate::layout::{ImpositionPlan, LayoutPlanner};
use crate::options::ImpositionOptions;
use crate::sequence::{PageSequencer, SourceRange};
use crate::types::*;
use concat::{build_outline, concatenate, page_labels};
use io::output_version;
use lopdf::{Dictionary, Document, Object};
use output::OutputDocument;
use signature::impose_signatures;

/// Main imposition function, reading the inputs named in `options`
pub async fn impose(options: &ImpositionOptions) -> Result<Document> {
    options.validate()?;
    let options = options.normalized();

    tokio::task::spawn_blocking(move || {
        let (primary, append) = options.source_ranges();
        let mut sequencer = PageSequencer::open(primary, append, options.retention)?;
        impose_sequence(&mut sequencer, &options)
    })
    .await?
}

/// Impose documents already in memory, each taken whole and in order.
///
/// The input and append lists of `options` are not consulted.
pub async fn impose_documents(
    documents: &[Document],
    options: &ImpositionOptions,
) -> Result<Document> {
    options.validate_layout()?;
    if documents.is_empty() {
        return Err(ImposeError::NoPages);
    }

    let primary: Vec<SourceRange> = documents.iter().cloned().map(SourceRange::new).collect();
    let options = options.normalized();

    tokio::task::spawn_blocking(move || {
        let mut sequencer = PageSequencer::open(primary, Vec::new(), options.retention)?;
        impose_sequence(&mut sequencer, &options)
    })
    .await?
}

/// Impose the pages of `sequencer` into a new document.
///
/// Consumes the primary stream, then the append stream if there is one.
pub fn impose_sequence(
    sequencer: &mut PageSequencer,
    options: &ImpositionOptions,
) -> Result<Document> {
    let options = options.normalized();
    let first = sequencer.next()?.ok_or(ImposeError::NoPages)?;
    let mut output = OutputDocument::new(&output_version(&first.document.version));
    let mut catalog = Dictionary::new();

    if options.format == Format::None {
        let copied = concatenate(sequencer, &mut output, Some(first))?;
        if !options.bookmarks.is_empty() {
            if let Some(outlines) = build_outline(&mut output, &options.bookmarks, 0, copied) {
                catalog.set("Outlines", Object::Reference(outlines));
                catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));
            }
            if let Some(labels) = page_labels(sequencer.page_number_offset(0)) {
                catalog.set("PageLabels", Object::Dictionary(labels));
            }
        }
    } else {
        let plan = plan_imposition(sequencer, &options);
        log::info!(
            "Imposing {} page(s) as {}: {} signature(s), {} sheet(s)",
            sequencer.total_pages(),
            plan.format,
            plan.signatures.len(),
            plan.total_sheets()
        );
        impose_signatures(sequencer, &mut output, &plan, first, &options)?;
    }

    if sequencer.has_append() {
        sequencer.start_append()?;
        let appended = concatenate(sequencer, &mut output, None)?;
        log::debug!("Appended {} page(s)", appended);
    }

    log::info!(
        "Imposition produced {} output page(s) from {} source page(s)",
        output.page_count(),
        sequencer.total_pages() + sequencer.appended_pages()
    );
    Ok(output.finish(catalog))
}

/// Plan the signatures of the primary stream of `sequencer`
pub fn plan_imposition(sequencer: &PageSequencer, options: &ImpositionOptions) -> ImpositionPlan {
    let planner = LayoutPlanner::new(
        options.format,
        options.booklet_shift(),
        options.max_sheets_per_signature,
    );
    let breaks = options.signature_break_pages(&sequencer.range_page_counts());
    planner.plan(sequencer.total_pages(), &breaks, &options.fold_out_pages())
}
