//! Resource namespace merging
//!
//! Pages composited onto one destination page share a single `/Resources`
//! dictionary. The merger collects the resources of every page placed there
//! and resolves name clashes by renaming, handing back the renames each
//! page's content has to go through.

mod merger;
mod namespace;
mod rename;

pub use merger::*;
pub use namespace::*;
pub use rename::*;
