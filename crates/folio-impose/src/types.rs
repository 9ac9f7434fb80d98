use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImposeError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages to impose")]
    NoPages,
    #[error("Page range {from}..={to} cannot be resolved in {document} ({available} pages)")]
    PageRange {
        document: String,
        from: usize,
        to: usize,
        available: usize,
    },
    #[error("Cannot start append: already appending or no documents to append")]
    AppendUnavailable,
    #[error("Destination page {index} out of range (signature has {count} destination pages)")]
    DestinationPage { index: usize, count: usize },
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ImposeError>;

/// Imposition layout family
///
/// The `In*` variants fold a single sheet into 8, 16 or 32 pages; the suffix
/// tells whether the first fold is horizontal or vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// In-quarto, first fold horizontal (2 × 2 grid)
    In4h,
    /// In-quarto, first fold vertical (2 × 2 grid)
    In4v,
    /// In-octavo, first fold horizontal (4 × 2 grid)
    In8h,
    /// In-octavo, first fold vertical (4 × 2 grid)
    In8v,
    /// In-sextodecimo, first fold horizontal (4 × 4 grid)
    In16h,
    /// In-sextodecimo, first fold vertical (4 × 4 grid)
    In16v,
    /// Several 2-up sheets nested into each other
    #[default]
    Booklet,
    /// No imposition: pages are concatenated verbatim
    None,
}

impl Format {
    pub const ALL: [Format; 8] = [
        Format::In4h,
        Format::In4v,
        Format::In8h,
        Format::In8v,
        Format::In16h,
        Format::In16v,
        Format::Booklet,
        Format::None,
    ];

    /// Parse a format name, case-insensitively.
    ///
    /// Unknown names fall back to [`Format::Booklet`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "in4h" => Format::In4h,
            "in4v" => Format::In4v,
            "in8h" => Format::In8h,
            "in8v" => Format::In8v,
            "in16h" => Format::In16h,
            "in16v" => Format::In16v,
            "none" => Format::None,
            "booklet" => Format::Booklet,
            other => {
                log::warn!("Unknown format '{}', using booklet", other);
                Format::Booklet
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::In4h => "in4h",
            Format::In4v => "in4v",
            Format::In8h => "in8h",
            Format::In8v => "in8v",
            Format::In16h => "in16h",
            Format::In16v => "in16v",
            Format::Booklet => "booklet",
            Format::None => "none",
        }
    }

    /// Grid dimensions as (columns, rows) of final pages on one sheet face
    pub fn grid_dimensions(self) -> (usize, usize) {
        match self {
            Format::In4h | Format::In4v => (2, 2),
            Format::In8h | Format::In8v => (4, 2),
            Format::In16h | Format::In16v => (4, 4),
            Format::Booklet => (2, 1),
            Format::None => (1, 1),
        }
    }

    /// Source pages held by one sheet (both faces)
    pub fn pages_per_sheet(self) -> usize {
        let (cols, rows) = self.grid_dimensions();
        cols * rows * 2
    }

    pub fn is_booklet(self) -> bool {
        self == Format::Booklet
    }
}

impl FromStr for Format {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Format::from_name(s))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fine positional adjustment of every page on one sheet side
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageOffset {
    pub x_mm: f32,
    pub y_mm: f32,
}

impl PageOffset {
    pub fn new(x_mm: f32, y_mm: f32) -> Self {
        Self { x_mm, y_mm }
    }
}

/// Statistics about the imposition
#[derive(Debug, Clone, PartialEq)]
pub struct ImpositionStatistics {
    /// Total number of source pages in the primary stream
    pub source_pages: usize,
    /// Number of signatures
    pub signatures: usize,
    /// Sheets in each signature
    pub sheets_per_signature: Vec<usize>,
    /// Total number of output sheets
    pub output_sheets: usize,
    /// Pages emitted outside the sheet grid (opposite to fold-outs)
    pub out_of_sequence_pages: usize,
    /// Pages appended verbatim after the imposition
    pub appended_pages: usize,
    /// Output page count
    pub output_pages: usize,
}
