//! PDF rendering modules for imposition
//!
//! This module handles all PDF-specific operations:
//! - Reading page attributes and content from source documents
//! - Deep copying objects and resources into the output
//! - Generating transformation matrices, glue labels and page dictionaries

mod copy;
mod page;
mod source;

pub use copy::*;
pub use page::*;
pub use source::*;
