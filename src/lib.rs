//! Turns SQL notebooks (`.sqlnb`) into a single static HTML report. Scanning lives in
//! [sqlnb_parser], rendering in [sqlnb_render]; this crate adds configuration, file handling and
//! the command line.

/// The `report.yml` configuration file.
pub mod config;

/// Reading, rendering and writing a report.
pub mod pipeline;

pub use sqlnb_parser as parser;
pub use sqlnb_render as render;
