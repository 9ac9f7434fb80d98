//! Layout calculation modules for imposition
//!
//! This module decides where every source page goes:
//! - Grid position tables of the folded formats
//! - Balancing sheets over signatures
//! - Booklet ordering and fold-out splicing

mod balance;
mod planner;
pub mod tables;
mod types;

pub use balance::*;
pub use planner::*;
pub use types::*;
