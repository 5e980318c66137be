//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the two series and their table/column names (`Series`)
//! - typed calendar months and the accepted window (`Month`, `MonthWindow`)
//! - raw, clean and merged observations (`RawObservation`, `CleanBatch`, `MergedRecord`)

pub mod types;

pub use types::*;
