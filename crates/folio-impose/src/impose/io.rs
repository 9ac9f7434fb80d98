//! Document I/O operations for imposition

use crate::constants::MAX_OUTPUT_VERSION;
use crate::types::*;
use lopdf::Document;
use std::path::Path;

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    Ok(doc)
}

/// Save the imposed document
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || {
        doc.compress();
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, ImposeError>(writer)
    })
    .await??;
    tokio::fs::write(&path, bytes).await?;
    log::info!("Saved {}", path.display());
    Ok(())
}

/// PDF version of the output for a source of version `source`
pub(crate) fn output_version(source: &str) -> String {
    let newer = match (source.parse::<f32>(), MAX_OUTPUT_VERSION.parse::<f32>()) {
        (Ok(version), Ok(max)) => version > max,
        _ => true,
    };
    if newer {
        log::warn!(
            "Source PDF version {} not supported for output, writing {}",
            source,
            MAX_OUTPUT_VERSION
        );
        MAX_OUTPUT_VERSION.to_string()
    } else {
        source.to_string()
    }
}
