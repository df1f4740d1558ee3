//! Rendering for SQL notebooks: a small markdown subset, SQL highlighting, and the HTML chrome that
//! ties the fragments together into one report.

/// Combines rendered cells with the report chrome.
pub mod document;

/// Highlighting for SQL cells.
pub mod highlight;

/// The markdown subset used in notebook narrative cells.
pub mod markdown;

mod error;

pub use document::{assemble, Assembler, DocumentSettings};
pub use error::RenderError;
pub use highlight::{highlight_sql, HighlightEngine, HighlightOptions, SqlDialect, SqlHighlighter};
pub use markdown::{render_markdown, MarkdownOptions, MarkdownRenderer, RuleMode};
