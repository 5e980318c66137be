//! Remote data sources.

pub mod pxweb;

pub use pxweb::{FetchedSeries, PxClient, pxweb_to_api};
