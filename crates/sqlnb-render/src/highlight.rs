use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;

use crate::error::RenderError;

lazy_static! {
    static ref ORACLE: SqlHighlighter =
        SqlHighlighter::new(&SqlDialect::oracle()).expect("invalid regex expression");
    static ref SYNTAX_SET: SyntaxSet = SyntaxSet::load_defaults_newlines();
    static ref THEME_SET: ThemeSet = ThemeSet::load_defaults();
}

const ORACLE_FUNCTIONS: [&str; 8] = [
    "TO_CHAR", "TO_DATE", "ROUND", "COUNT", "SUM", "AVG", "MAX", "MIN",
];

const ORACLE_KEYWORDS: [&str; 17] = [
    "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "IN", "AS", "JOIN", "LEFT", "RIGHT", "INNER",
    "OUTER", "ON", "LIKE", "IS", "NULL",
];

/// Token categories, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Function,
    Keyword,
    String,
    Number,
}

impl TokenKind {
    const ALL: [TokenKind; 4] = [
        TokenKind::Function,
        TokenKind::Keyword,
        TokenKind::String,
        TokenKind::Number,
    ];

    /// Name of the capture group in the tokenizer pattern, which doubles as the CSS class.
    pub fn css_class(&self) -> &'static str {
        match self {
            TokenKind::Function => "function",
            TokenKind::Keyword => "keyword",
            TokenKind::String => "string",
            TokenKind::Number => "number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub span: Range<usize>,
    pub text: &'a str,
}

/// Vocabulary recognized by the highlighter. Words are matched whole and case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlDialect {
    pub functions: Vec<String>,
    pub keywords: Vec<String>,
}

impl SqlDialect {
    pub fn oracle() -> Self {
        SqlDialect {
            functions: ORACLE_FUNCTIONS.iter().map(|s| s.to_string()).collect(),
            keywords: ORACLE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for SqlDialect {
    fn default() -> Self {
        Self::oracle()
    }
}

/// Single-pass SQL tokenizer. Every category lives in one alternation, so the regex engine's
/// leftmost-first semantics give non-overlapping tokens with the priority function > keyword >
/// string > number, and nothing that has been wrapped is ever scanned again.
#[derive(Debug, Clone)]
pub struct SqlHighlighter {
    pattern: Regex,
}

impl SqlHighlighter {
    pub fn new(dialect: &SqlDialect) -> Result<Self, regex::Error> {
        let mut alternatives = Vec::new();
        if let Some(words) = word_alternation(&dialect.functions) {
            alternatives.push(format!(r"(?i:\b(?P<function>{words})\b)"));
        }
        if let Some(words) = word_alternation(&dialect.keywords) {
            alternatives.push(format!(r"(?i:\b(?P<keyword>{words})\b)"));
        }
        alternatives.push(r"(?P<string>'[^']*')".to_string());
        alternatives.push(r"\b(?P<number>[0-9]+)\b".to_string());

        Ok(SqlHighlighter {
            pattern: Regex::new(&alternatives.join("|"))?,
        })
    }

    pub fn tokenize<'a>(&self, sql: &'a str) -> Vec<Token<'a>> {
        self.pattern
            .captures_iter(sql)
            .filter_map(|caps| {
                TokenKind::ALL.iter().find_map(|kind| {
                    caps.name(kind.css_class()).map(|m| Token {
                        kind: *kind,
                        span: m.range(),
                        text: m.as_str(),
                    })
                })
            })
            .collect()
    }

    /// Wraps every token in a `<span>` carrying its category as class. Everything is HTML-escaped.
    pub fn highlight(&self, sql: &str) -> String {
        let mut out = String::with_capacity(sql.len() * 2);
        let mut last = 0;

        for token in self.tokenize(sql) {
            out.push_str(&tera::escape_html(&sql[last..token.span.start]));
            out.push_str(&format!(
                "<span class=\"{}\">{}</span>",
                token.kind.css_class(),
                tera::escape_html(token.text)
            ));
            last = token.span.end;
        }
        out.push_str(&tera::escape_html(&sql[last..]));

        out
    }
}

fn word_alternation(words: &[String]) -> Option<String> {
    let mut words: Vec<&str> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }
    words.sort_by(|a, b| b.len().cmp(&a.len()));
    Some(
        words
            .into_iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|"),
    )
}

/// Highlights with the built-in Oracle SQL vocabulary.
pub fn highlight_sql(sql: &str) -> String {
    ORACLE.highlight(sql)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightEngine {
    /// The vocabulary-driven tokenizer above. Output is styled by the report stylesheet.
    #[default]
    Builtin,
    /// Syntect's bundled SQL grammar with inline styles from a syntect theme.
    Syntect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightOptions {
    pub engine: HighlightEngine,
    pub dialect: SqlDialect,
    /// Only used by the syntect engine.
    pub theme: String,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        HighlightOptions {
            engine: HighlightEngine::default(),
            dialect: SqlDialect::default(),
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// A highlighter ready to render code cells, built from [HighlightOptions].
#[derive(Debug, Clone)]
pub(crate) enum CodeHighlighter {
    Builtin(SqlHighlighter),
    Syntect { theme: String },
}

impl CodeHighlighter {
    pub(crate) fn from_options(options: &HighlightOptions) -> Result<Self, RenderError> {
        Ok(match options.engine {
            HighlightEngine::Builtin => {
                CodeHighlighter::Builtin(SqlHighlighter::new(&options.dialect)?)
            }
            HighlightEngine::Syntect => {
                if !THEME_SET.themes.contains_key(&options.theme) {
                    return Err(RenderError::UnknownTheme(options.theme.clone()));
                }
                CodeHighlighter::Syntect {
                    theme: options.theme.clone(),
                }
            }
        })
    }

    pub(crate) fn render(&self, sql: &str) -> Result<String, RenderError> {
        match self {
            CodeHighlighter::Builtin(highlighter) => Ok(highlighter.highlight(sql)),
            CodeHighlighter::Syntect { theme } => {
                let theme = THEME_SET
                    .themes
                    .get(theme)
                    .ok_or_else(|| RenderError::UnknownTheme(theme.clone()))?;
                let syntax = SYNTAX_SET
                    .find_syntax_by_extension("sql")
                    .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
                Ok(syntect::html::highlighted_html_for_string(
                    sql,
                    &SYNTAX_SET,
                    syntax,
                    theme,
                )?)
            }
        }
    }
}
