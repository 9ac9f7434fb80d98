use crate::constants::{DEFAULT_MAX_SHEETS_PER_SIGNATURE, mm_to_pt};
use crate::layout::SheetSide;
use crate::sequence::{RetentionPolicy, SourceRange};
use crate::types::*;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One document of the primary stream
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InputSpec {
    pub path: PathBuf,
    /// First printed page number to take (1-based)
    pub from_page: Option<u32>,
    /// Last printed page number to take (1-based, inclusive)
    pub to_page: Option<u32>,
    /// Physical minus printed page number; inherited from the previous input
    /// when absent
    pub page_number_offset: Option<i32>,
    /// Start a new signature after this document
    pub signature_break: bool,
}

impl InputSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// One document appended verbatim after the imposition
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AppendSpec {
    pub path: PathBuf,
    /// First page to take (1-based)
    pub from_page: Option<u32>,
    /// Last page to take (1-based, inclusive)
    pub to_page: Option<u32>,
}

impl AppendSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Outline entry for concatenated output
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bookmark {
    /// 0-based physical page index in the concatenated output, not a
    /// printed page number
    pub page: usize,
    pub title: String,
}

impl Bookmark {
    pub fn new(page: usize, title: impl Into<String>) -> Self {
        Self {
            page,
            title: title.into(),
        }
    }
}

/// Configuration options for PDF imposition
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImpositionOptions {
    // Input
    pub inputs: Vec<InputSpec>,
    pub append: Vec<AppendSpec>,

    // Layout
    pub format: Format,
    pub first_page_as_even: bool,
    pub max_sheets_per_signature: usize,

    /// Pages before which a new signature starts, as 0-based physical
    /// indices into the primary stream. Page number offsets do not apply.
    pub signature_breaks: Vec<usize>,
    /// Fold-out leaves, as 0-based physical indices into the primary stream
    /// (not printed page numbers); rounded down to an odd index.
    pub fold_outs: Vec<usize>,

    // Fine positioning
    pub front_offset_mm: PageOffset,
    pub back_offset_mm: PageOffset,
    pub page_width_mm: Option<f32>,
    pub page_height_mm: Option<f32>,

    /// Outline of concatenated output; each bookmark names a 0-based
    /// physical output page
    pub bookmarks: Vec<Bookmark>,

    pub retention: RetentionPolicy,
}

impl Default for ImpositionOptions {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            append: Vec::new(),
            format: Format::Booklet,
            first_page_as_even: false,
            max_sheets_per_signature: DEFAULT_MAX_SHEETS_PER_SIGNATURE,
            signature_breaks: Vec::new(),
            fold_outs: Vec::new(),
            front_offset_mm: PageOffset::default(),
            back_offset_mm: PageOffset::default(),
            page_width_mm: None,
            page_height_mm: None,
            bookmarks: Vec::new(),
            retention: RetentionPolicy::KeepOpen,
        }
    }
}

impl ImpositionOptions {
    /// Load options from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)?;
        Ok(options)
    }

    /// Save options to a JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(ImposeError::Config("No input files specified".to_string()));
        }
        self.validate_layout()
    }

    /// Validate everything except the input list
    pub fn validate_layout(&self) -> Result<()> {
        for (name, value) in [
            ("page width", self.page_width_mm),
            ("page height", self.page_height_mm),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ImposeError::Config(format!(
                        "The {} must be positive, got {}",
                        name, value
                    )));
                }
            }
        }

        let offsets = [self.front_offset_mm, self.back_offset_mm];
        if offsets
            .iter()
            .any(|offset| !offset.x_mm.is_finite() || !offset.y_mm.is_finite())
        {
            return Err(ImposeError::Config(
                "Sheet side offsets must be finite".to_string(),
            ));
        }

        Ok(())
    }

    /// Copy of the options with out-of-range values brought back into range
    pub fn normalized(&self) -> Self {
        let mut options = self.clone();
        if options.max_sheets_per_signature < 1 {
            log::warn!("Max sheets per signature must be at least 1, using 1");
            options.max_sheets_per_signature = 1;
        }
        if !options.format.is_booklet() && options.first_page_as_even {
            log::warn!("First page as even only applies to booklets, ignored");
            options.first_page_as_even = false;
        }
        options
    }

    /// Booklet shift of the planner
    pub fn booklet_shift(&self) -> i32 {
        if self.first_page_as_even { -1 } else { 0 }
    }

    /// Fold-out pages, each rounded down to an odd physical index
    pub fn fold_out_pages(&self) -> BTreeSet<usize> {
        let mut pages = BTreeSet::new();
        for &page in &self.fold_outs {
            let odd = if page & 1 == 1 { Some(page) } else { page.checked_sub(1) };
            match odd {
                Some(odd) => {
                    pages.insert(odd);
                }
                None => log::warn!("Fold-out at page {} has no base leaf, ignored", page),
            }
        }
        pages
    }

    /// Fine offset of one sheet side, in points
    pub fn side_offset_pt(&self, side: SheetSide) -> (f32, f32) {
        let offset = match side {
            SheetSide::Front => self.front_offset_mm,
            SheetSide::Back => self.back_offset_mm,
        };
        (mm_to_pt(offset.x_mm), mm_to_pt(offset.y_mm))
    }

    /// Destination cell size in points, from the configured page size or the
    /// given source page size
    pub fn cell_size_pt(&self, source_width: f32, source_height: f32) -> (f32, f32) {
        (
            self.page_width_mm.map_or(source_width, mm_to_pt),
            self.page_height_mm.map_or(source_height, mm_to_pt),
        )
    }

    /// Source ranges of the primary and append streams.
    ///
    /// An input without an explicit page number offset takes the offset of
    /// the input before it.
    pub fn source_ranges(&self) -> (Vec<SourceRange>, Vec<SourceRange>) {
        let mut offset = 0;
        let primary = self
            .inputs
            .iter()
            .map(|input| {
                offset = input.page_number_offset.unwrap_or(offset);
                SourceRange::new(input.path.clone())
                    .with_page_number_offset(offset)
                    .with_printed_pages(input.from_page, input.to_page)
            })
            .collect();

        let append = self
            .append
            .iter()
            .map(|input| {
                SourceRange::new(input.path.clone())
                    .with_printed_pages(input.from_page, input.to_page)
            })
            .collect();

        (primary, append)
    }

    /// All signature breaks, given the page counts of the primary ranges
    pub fn signature_break_pages(&self, range_page_counts: &[usize]) -> BTreeSet<usize> {
        let mut breaks: BTreeSet<usize> = self.signature_breaks.iter().copied().collect();
        let mut end = 0;
        for (input, count) in self.inputs.iter().zip(range_page_counts) {
            end += count;
            if input.signature_break {
                breaks.insert(end);
            }
        }
        breaks
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    impl Serialize for Format {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(self.name())
        }
    }

    impl<'de> Deserialize<'de> for Format {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            Ok(Format::from_name(&s))
        }
    }
}
