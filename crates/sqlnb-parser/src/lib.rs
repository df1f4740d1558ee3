//! Scanner for SQL notebook files (`.sqlnb`). A notebook is a loosely structured, YAML-like list of
//! records, each carrying a cell kind and a quoted, escape-encoded value. The scanner is tolerant:
//! records it cannot make sense of are dropped and reported, never raised.

/// Cell types produced by the scanner.
pub mod cell;

/// The record scanner itself.
pub mod scanner;

pub use cell::{Cell, CellKind};
pub use scanner::{extract, unescape, Extraction, SkipReason, SkippedBlock};
