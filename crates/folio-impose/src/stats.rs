use crate::impose::plan_imposition;
use crate::options::ImpositionOptions;
use crate::sequence::PageSequencer;
use crate::types::*;

/// Calculate statistics for the imposition without producing it
pub fn calculate_statistics(
    sequencer: &PageSequencer,
    options: &ImpositionOptions,
) -> Result<ImpositionStatistics> {
    let source_pages = sequencer.total_pages();
    if source_pages == 0 {
        return Err(ImposeError::NoPages);
    }
    let appended_pages = sequencer.appended_pages();
    let options = options.normalized();

    if options.format == Format::None {
        return Ok(ImpositionStatistics {
            source_pages,
            signatures: 0,
            sheets_per_signature: Vec::new(),
            output_sheets: 0,
            out_of_sequence_pages: 0,
            appended_pages,
            output_pages: source_pages + appended_pages,
        });
    }

    let plan = plan_imposition(sequencer, &options);
    let sheets_per_signature: Vec<usize> = plan.signatures.iter().map(|sig| sig.sheets).collect();
    let output_sheets = plan.total_sheets();
    let out_of_sequence_pages = plan.out_of_sequence_count();

    // Front and back of each sheet, plus everything outside the grid
    let output_pages = output_sheets * 2 + out_of_sequence_pages + appended_pages;

    Ok(ImpositionStatistics {
        source_pages,
        signatures: plan.signatures.len(),
        sheets_per_signature,
        output_sheets,
        out_of_sequence_pages,
        appended_pages,
        output_pages,
    })
}
