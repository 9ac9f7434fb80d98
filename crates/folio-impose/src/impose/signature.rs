//! Laying out signatures on sheets
//!
//! Pages are pulled from the sequencer one at a time, in the order the plan
//! lists them. Every page placed on a sheet has its resources merged into
//! the namespace of its destination page, and its content rewritten with the
//! resulting renames. Out-of-sequence pages become standalone pages,
//! emitted after the last signature.

use lopdf::ObjectId;
use lopdf::content::Content;

use crate::constants::LABEL_FONT_NAME;
use crate::layout::{ImpositionPlan, PagePlacement, Placement, Rect, SignaturePlan};
use crate::merge::{RenameList, ResourceMerger};
use crate::options::ImpositionOptions;
use crate::render::{
    concat_matrix, get_page_content, glue_label, origin_shift, page_media_box, placement_matrix,
};
use crate::sequence::{PageSequencer, SequencedPage};
use crate::types::*;

use super::output::OutputDocument;

/// Impose every signature of `plan`, starting with the already fetched
/// `first` page
pub(crate) fn impose_signatures(
    sequencer: &mut PageSequencer,
    output: &mut OutputDocument,
    plan: &ImpositionPlan,
    first: SequencedPage,
    options: &ImpositionOptions,
) -> Result<()> {
    let mut imposer = SignatureImposer {
        sequencer,
        output,
        options,
        format: plan.format,
        merger: ResourceMerger::new(0),
        standalone: Vec::new(),
        current: Some(first),
    };

    for (index, signature) in plan.signatures.iter().enumerate() {
        if imposer.current.is_none() {
            log::warn!(
                "Source pages ran out before signature {} of {}",
                index + 1,
                plan.signatures.len()
            );
            break;
        }
        imposer.impose_signature(signature)?;
    }

    let standalone = std::mem::take(&mut imposer.standalone);
    if !standalone.is_empty() {
        log::debug!("Adding {} out-of-sequence page(s)", standalone.len());
    }
    for page_id in standalone {
        imposer.output.push_page(page_id);
    }

    if imposer.current.is_some() {
        log::warn!("Source pages left over after the last signature");
    }
    Ok(())
}

struct SignatureImposer<'a> {
    sequencer: &'a mut PageSequencer,
    output: &'a mut OutputDocument,
    options: &'a ImpositionOptions,
    format: Format,
    merger: ResourceMerger,
    standalone: Vec<ObjectId>,
    current: Option<SequencedPage>,
}

impl SignatureImposer<'_> {
    fn impose_signature(&mut self, signature: &SignaturePlan) -> Result<()> {
        let dest_pages = signature.dest_pages();
        self.merger.resize(dest_pages);

        // the first page of the signature sizes the cells
        let Some(first) = self.current.as_ref() else {
            return Ok(());
        };
        let first_box = page_media_box(&first.document, first.page_id);
        let cell = self.options.cell_size_pt(first_box.width, first_box.height);
        let (cols, rows) = self.format.grid_dimensions();
        let sheet_box = Rect::new(0.0, 0.0, cell.0 * cols as f32, cell.1 * rows as f32);

        log::debug!(
            "Signature at page {}: {} sheet(s) of {} x {} pt",
            signature.first_page,
            signature.sheets,
            sheet_box.width,
            sheet_box.height
        );

        let mut contents: Vec<Vec<u8>> = vec![Vec::new(); dest_pages];
        for placement in &signature.placements {
            let Some(page) = self.current.take() else {
                break;
            };
            match placement {
                Placement::OutOfSequence { glue_to } => {
                    let page_id = self.standalone_page(&page, *glue_to)?;
                    self.standalone.push(page_id);
                }
                Placement::Sheet(placed) => {
                    let ops = self.sheet_content(&page, placed, cell)?;
                    let content =
                        contents
                            .get_mut(placed.dest_page)
                            .ok_or(ImposeError::DestinationPage {
                                index: placed.dest_page,
                                count: dest_pages,
                            })?;
                    content.extend(ops);
                }
            }
            self.current = self.sequencer.next()?;
        }

        for (dest_page, content) in contents.into_iter().enumerate() {
            let resources = self
                .merger
                .take_resources(dest_page)
                .unwrap_or_default()
                .to_dictionary();
            self.output.add_page(&sheet_box, content, resources);
        }
        Ok(())
    }

    /// Content of one page drawn into its cell
    fn sheet_content(
        &mut self,
        page: &SequencedPage,
        placed: &PagePlacement,
        cell: (f32, f32),
    ) -> Result<Vec<u8>> {
        let source_box = page_media_box(&page.document, page.page_id);
        let side_offset = self.options.side_offset_pt(placed.sheet_side());
        let matrix = placement_matrix(placed, cell, &source_box, side_offset);

        let mut ops = String::from("q\n");
        ops.push_str(&concat_matrix(&matrix));

        if let Some(glue_page) = placed.glue_to {
            let label = self.output.label_namespace();
            let renames = self.merger.merge(placed.dest_page, &label)?;
            let font = renames
                .get(b"Font", LABEL_FONT_NAME)
                .unwrap_or(LABEL_FONT_NAME);
            ops.push_str(&glue_label(
                font,
                glue_page,
                self.sequencer.printed_page_number(glue_page),
                source_box.width,
                source_box.height,
            ));
        }
        if let Some(shift) = origin_shift(&source_box) {
            ops.push_str(&shift);
        }

        let namespace = self.output.copy_namespace(page)?;
        let renames = self.merger.merge(placed.dest_page, &namespace)?;
        if !renames.is_empty() {
            log::debug!(
                "Page {} of document {} needs {} rename(s)",
                page.doc_page,
                page.doc_key,
                renames.len()
            );
        }

        let mut bytes = ops.into_bytes();
        bytes.extend(renamed_content(page, &renames)?);
        bytes.extend_from_slice(b"\nQ\n");
        Ok(bytes)
    }

    /// A page that lost its place on the sheets, copied at its own size
    fn standalone_page(
        &mut self,
        page: &SequencedPage,
        glue_to: Option<usize>,
    ) -> Result<ObjectId> {
        let source_box = page_media_box(&page.document, page.page_id);
        let mut merger = ResourceMerger::new(1);

        let namespace = self.output.copy_namespace(page)?;
        let renames = merger.merge(0, &namespace)?;

        let mut ops = Vec::new();
        if let Some(glue_page) = glue_to {
            let label = self.output.label_namespace();
            let label_renames = merger.merge(0, &label)?;
            let font = label_renames
                .get(b"Font", LABEL_FONT_NAME)
                .unwrap_or(LABEL_FONT_NAME);
            ops.extend_from_slice(b"q\n");
            if source_box.x != 0.0 || source_box.y != 0.0 {
                let shift = [1.0, 0.0, 0.0, 1.0, source_box.x, source_box.y];
                ops.extend(concat_matrix(&shift).into_bytes());
            }
            ops.extend(
                glue_label(
                    font,
                    glue_page,
                    self.sequencer.printed_page_number(glue_page),
                    source_box.width,
                    source_box.height,
                )
                .into_bytes(),
            );
            ops.extend_from_slice(b"Q\n");
        }
        ops.extend(renamed_content(page, &renames)?);

        log::debug!(
            "Page {} of document {} emitted out of sequence",
            page.doc_page,
            page.doc_key
        );

        let resources = merger.take_resources(0).unwrap_or_default().to_dictionary();
        Ok(self.output.create_page(&source_box, ops, resources))
    }
}

/// Page content with resource names rewritten
fn renamed_content(page: &SequencedPage, renames: &RenameList) -> Result<Vec<u8>> {
    let raw = get_page_content(&page.document, page.page_id)?;
    if renames.is_empty() {
        return Ok(raw);
    }
    let mut content = Content::decode(&raw)?;
    renames.apply(&mut content);
    Ok(content.encode()?)
}
