//! Input/output helpers.
//!
//! - raw series CSV read/write (`raw`)
//! - clean series and merged view exports (`export`)

pub mod export;
pub mod raw;

pub use export::*;
pub use raw::*;
