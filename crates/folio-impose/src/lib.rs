//! Signature imposition of PDF documents
//!
//! Pages from one or more source documents are arranged on larger sheets
//! (booklets, 4-up, 8-up and 16-up grids), optionally with fold-out leaves,
//! followed by an append stream copied verbatim.

pub mod constants;
pub mod impose;
pub mod layout;
pub mod merge;
mod options;
pub mod render;
pub mod sequence;
mod stats;
mod types;

pub use impose::{
    impose, impose_documents, impose_sequence, load_pdf, plan_imposition, save_pdf,
};
pub use options::*;
pub use stats::calculate_statistics;
pub use types::*;
