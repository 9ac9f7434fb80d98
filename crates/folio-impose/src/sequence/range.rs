//! Source documents and page ranges

use std::path::PathBuf;
use std::sync::Arc;

use lopdf::Document;

/// A document pages are taken from
#[derive(Debug, Clone)]
pub enum SourceDocument {
    /// Loaded from disk when first needed
    Path(PathBuf),
    /// Already in memory
    Memory(Arc<Document>),
}

impl SourceDocument {
    pub fn memory(document: Document) -> Self {
        SourceDocument::Memory(Arc::new(document))
    }

    /// Human-readable name for messages
    pub fn label(&self) -> String {
        match self {
            SourceDocument::Path(path) => path.display().to_string(),
            SourceDocument::Memory(_) => "<memory>".to_string(),
        }
    }

    /// Whether both refer to the same document
    pub fn same_as(&self, other: &SourceDocument) -> bool {
        match (self, other) {
            (SourceDocument::Path(a), SourceDocument::Path(b)) => a == b,
            (SourceDocument::Memory(a), SourceDocument::Memory(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<PathBuf> for SourceDocument {
    fn from(path: PathBuf) -> Self {
        SourceDocument::Path(path)
    }
}

impl From<Document> for SourceDocument {
    fn from(document: Document) -> Self {
        SourceDocument::memory(document)
    }
}

/// What to keep loaded while traversing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RetentionPolicy {
    /// Load every document once and keep it until the sequencer is dropped
    #[default]
    KeepOpen,
    /// Load a document when its range is entered, release it when left
    OpenOnDemand,
}

/// A run of pages of one document
#[derive(Debug, Clone)]
pub struct SourceRange {
    pub document: SourceDocument,
    /// First page, 0-based in the document's own page order
    pub from_page: usize,
    /// Last page (inclusive); `None` runs to the end of the document
    pub to_page: Option<usize>,
    /// Difference between physical and printed page numbers
    pub page_number_offset: i32,
}

impl SourceRange {
    /// The whole document
    pub fn new(document: impl Into<SourceDocument>) -> Self {
        Self {
            document: document.into(),
            from_page: 0,
            to_page: None,
            page_number_offset: 0,
        }
    }

    pub fn with_pages(mut self, from_page: usize, to_page: Option<usize>) -> Self {
        self.from_page = from_page;
        self.to_page = to_page;
        self
    }

    pub fn with_page_number_offset(mut self, offset: i32) -> Self {
        self.page_number_offset = offset;
        self
    }

    /// Select pages by printed number (1-based), shifted by the range's
    /// page number offset.
    pub fn with_printed_pages(mut self, from: Option<u32>, to: Option<u32>) -> Self {
        let offset = self.page_number_offset as i64;
        let physical = |printed: u32| (printed as i64 + offset - 1).max(0) as usize;
        self.from_page = from.map_or(0, physical);
        self.to_page = to.map(physical);
        self
    }
}
