//! Multi-document page sequencing
//!
//! The orchestrator consumes pages one at a time from a [`PageSequencer`],
//! which walks a primary list of [`SourceRange`]s and, on request, an
//! independent append list.

mod range;
mod sequencer;

pub use range::*;
pub use sequencer::*;
