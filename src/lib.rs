//! `wage-cpi` library crate.
//!
//! Icelandic wage index and CPI pipeline: fetch the two monthly series from
//! Statistics Iceland, clean them, load them into a relational store and
//! export the merged view.
//!
//! The binary (`wcpi`) is a thin wrapper around this library so that the
//! pipeline steps are testable without spawning processes.

pub mod app;
pub mod clean;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod merge;
pub mod quality;
pub mod report;
pub mod store;
