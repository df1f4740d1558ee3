//! Grammar accepted by the scanner:
//!
//! ```text
//! notebook := preamble (MARKER block)*
//! MARKER   := "- kind:"
//! block    := ws* DIGITS ... "value:" ws* QUOTE payload QUOTE ...
//! ```
//!
//! Inside a payload a backslash escapes the next character. The payload ends at the first unescaped
//! quote (matching the opening one) that is followed by whitespace or the end of the block; if no
//! such quote exists, at the first unescaped matching quote anywhere. Payloads may span lines.

use serde::Serialize;
use thiserror::Error;

use crate::cell::{Cell, CellKind};

/// Separates records. Everything before the first marker is ignored.
pub const RECORD_MARKER: &str = "- kind:";

const VALUE_FIELD: &str = "value:";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    #[error("record has no cell kind")]
    MissingKind,
    #[error("record has no quoted value")]
    MissingValue,
}

/// A record that was dropped during extraction. `index` is the zero-based position of the record
/// among all records in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedBlock {
    pub index: usize,
    pub reason: SkipReason,
}

/// Result of scanning a notebook: the cells that could be read, in file order, and the records
/// that could not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    cells: Vec<Cell>,
    skipped: Vec<SkippedBlock>,
}

impl Extraction {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn skipped(&self) -> &[SkippedBlock] {
        &self.skipped
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    /// True when there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of records seen, whether or not they produced a cell.
    pub fn records(&self) -> usize {
        self.cells.len() + self.skipped.len()
    }
}

/// Splits raw notebook text into cells. Never fails: malformed records are recorded as skipped.
pub fn extract(raw: &str) -> Extraction {
    let mut extraction = Extraction::default();

    for (index, block) in raw.split(RECORD_MARKER).skip(1).enumerate() {
        match parse_block(block) {
            Ok(cell) => extraction.cells.push(cell),
            Err(reason) => {
                tracing::debug!(record = index, %reason, "skipping notebook record");
                extraction.skipped.push(SkippedBlock { index, reason });
            }
        }
    }

    tracing::info!(
        cells = extraction.cells.len(),
        skipped = extraction.skipped.len(),
        "notebook scanned"
    );
    extraction
}

/// Resolves the notebook's escape sequences: escaped CRLF and LF become a newline, and an escaped
/// double quote becomes a plain one.
pub fn unescape(payload: &str) -> String {
    payload
        .replace("\\r\\n", "\n")
        .replace("\\n", "\n")
        .replace("\\\"", "\"")
}

fn parse_block(block: &str) -> Result<Cell, SkipReason> {
    let tag = kind_tag(block).ok_or(SkipReason::MissingKind)?;
    let payload = value_payload(block).ok_or(SkipReason::MissingValue)?;
    Ok(Cell::new(CellKind::from_tag(tag), unescape(payload).trim()))
}

fn kind_tag(block: &str) -> Option<&str> {
    let rest = block.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

fn value_payload(block: &str) -> Option<&str> {
    let start = block.find(VALUE_FIELD)? + VALUE_FIELD.len();
    let rest = block[start..].trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &rest[quote.len_utf8()..];

    closing_quote(body, quote, true)
        .or_else(|| closing_quote(body, quote, false))
        .map(|end| &body[..end])
}

/// Byte offset of the first unescaped `quote` in `body`. When `bounded` is set the quote must also
/// be followed by whitespace or the end of input.
fn closing_quote(body: &str, quote: char, bounded: bool) -> Option<usize> {
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if !bounded || at_boundary {
                return Some(i);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../resources/test/sample.sqlnb");

    #[test]
    fn sample_notebook() {
        let extraction = extract(SAMPLE);

        let kinds: Vec<CellKind> = extraction.cells().iter().map(Cell::kind).collect();
        assert_eq!(
            kinds,
            vec![CellKind::Markdown, CellKind::Code, CellKind::Code]
        );
        assert_eq!(
            extraction.skipped(),
            &[SkippedBlock {
                index: 2,
                reason: SkipReason::MissingValue
            }]
        );
        assert_eq!(extraction.records(), 4);

        assert_eq!(
            extraction.cells()[0].content(),
            "# Data collection\n\nEvents recorded for the **SAIDI/SAIFI** indicators.\n\n---"
        );
        assert_eq!(
            extraction.cells()[1].content(),
            "SELECT COUNT(*) AS total\nFROM eventos\nWHERE anio = 2023 AND tipo = 'BRAE'"
        );
        assert!(extraction.cells()[2]
            .content()
            .ends_with("GROUP BY TO_CHAR(fecha, 'YYYY-MM')"));
    }

    #[test]
    fn preamble_is_ignored() {
        let raw = "title: \"not a cell\"\n- kind: 1\n  value: \"hello\"\n";
        let extraction = extract(raw);
        assert_eq!(extraction.cells(), &[Cell::markdown("hello")]);
    }

    #[test]
    fn missing_kind_is_skipped() {
        let raw = "- kind: x\n  value: \"a\"\n- kind: 2\n  value: \"b\"\n";
        let extraction = extract(raw);
        assert_eq!(extraction.cells(), &[Cell::code("b")]);
        assert_eq!(extraction.skipped()[0].reason, SkipReason::MissingKind);
    }

    #[test]
    fn missing_value_drops_one_cell() {
        let raw = "- kind: 1\n  value: \"a\"\n- kind: 1\n  other: 3\n- kind: 2\n  value: \"c\"\n";
        let extraction = extract(raw);
        assert_eq!(raw.matches(RECORD_MARKER).count() - 1, extraction.cells().len());
        assert_eq!(extraction.cells()[1], Cell::code("c"));
    }

    #[test]
    fn escaped_quote_does_not_end_payload() {
        let raw = r#"- kind: 1
  value: "say \"hi\" now"
"#;
        assert_eq!(extract(raw).cells()[0].content(), r#"say "hi" now"#);
    }

    #[test]
    fn literal_newlines_inside_payload() {
        let raw = "- kind: 2\n  value: \"SELECT *\n  FROM t\"\n  metadata: {}\n";
        assert_eq!(extract(raw).cells()[0].content(), "SELECT *\n  FROM t");
    }

    #[test]
    fn falls_back_to_first_matching_quote() {
        let raw = "- kind: 2\n  value: \"SELECT 1\"; trailing";
        assert_eq!(extract(raw).cells()[0].content(), "SELECT 1");
    }

    #[test]
    fn single_quoted_value() {
        let raw = "- kind: 2\n  value: 'SELECT \"x\" FROM t'\n";
        assert_eq!(extract(raw).cells()[0].content(), "SELECT \"x\" FROM t");
    }

    #[test]
    fn unterminated_value_is_skipped() {
        let raw = "- kind: 1\n  value: \"never closed\n";
        let extraction = extract(raw);
        assert!(extraction.is_empty());
        assert_eq!(extraction.skipped()[0].reason, SkipReason::MissingValue);
    }

    #[test]
    fn empty_input() {
        assert!(extract("").is_empty());
        assert!(extract("cells: []\n").is_empty());
        assert_eq!(extract("cells: []\n").records(), 0);
    }

    #[test]
    fn unescape_resolves_sequences() {
        assert_eq!(unescape(r#"a\r\nb\nc \"d\""#), "a\nb\nc \"d\"");
    }

    #[test]
    fn unescape_is_idempotent() {
        for input in [r"one\ntwo", r"x\\ny", r"\r\n\r\n", "already\nclean"] {
            let once = unescape(input);
            assert!(!once.contains("\\n"), "{once:?}");
            assert_eq!(unescape(&once), once);
        }
    }
}
