use serde::Serialize;

/// Tag value that marks a markdown record. Every other tag is a code record.
const MARKDOWN_TAG: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Markdown,
    /// SQL source. The dialect is always Oracle SQL.
    Code,
}

impl CellKind {
    pub fn from_tag(tag: &str) -> Self {
        if tag == MARKDOWN_TAG {
            CellKind::Markdown
        } else {
            CellKind::Code
        }
    }

    /// Language identifier used by the notebook editor for this kind of cell.
    pub fn language(&self) -> &'static str {
        match self {
            CellKind::Markdown => "markdown",
            CellKind::Code => "oracle-sql",
        }
    }
}

/// One unit of notebook content. The content has its escapes resolved and is trimmed; it cannot be
/// changed after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    kind: CellKind,
    content: String,
}

impl Cell {
    pub fn new(kind: CellKind, content: impl Into<String>) -> Self {
        Cell {
            kind,
            content: content.into(),
        }
    }

    pub fn markdown(content: impl Into<String>) -> Self {
        Self::new(CellKind::Markdown, content)
    }

    pub fn code(content: impl Into<String>) -> Self {
        Self::new(CellKind::Code, content)
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn language(&self) -> &'static str {
        self.kind.language()
    }
}
