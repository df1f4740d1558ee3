use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use sqlnb_parser::{Cell, CellKind};

use crate::error::RenderError;
use crate::highlight::{CodeHighlighter, HighlightOptions};
use crate::markdown::{MarkdownOptions, MarkdownRenderer};

const REPORT_TEMPLATE_NAME: &str = "report.tera.html";
const REPORT_TEMPLATE: &str = include_str!("../resources/templates/report.tera.html");

/// Text of the report chrome. Everything here is escaped before it is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    pub title: String,
    pub lang: String,
    /// Label of the section heading placed before each query after the first.
    pub query_label: String,
    pub generated_label: String,
    /// Footer lines. The first one is set in bold.
    pub footer: Vec<String>,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        DocumentSettings {
            title: "SQL notebook".to_string(),
            lang: "en".to_string(),
            query_label: "Query".to_string(),
            generated_label: "Generated on".to_string(),
            footer: Vec::new(),
        }
    }
}

/// A cell scheduled for rendering. Query numbers are fixed here, before any fragment is rendered.
#[derive(Debug, Clone, PartialEq)]
enum Fragment<'a> {
    Markdown(&'a str),
    Query { number: usize, sql: &'a str },
}

fn plan(cells: &[Cell]) -> Vec<Fragment<'_>> {
    let mut queries = 0;
    cells
        .iter()
        .filter_map(|cell| match cell.kind() {
            CellKind::Markdown => Some(Fragment::Markdown(cell.content())),
            CellKind::Code => {
                let sql = cell.content().trim();
                if sql.is_empty() {
                    return None;
                }
                queries += 1;
                Some(Fragment::Query {
                    number: queries,
                    sql,
                })
            }
        })
        .collect()
}

/// Turns a sequence of cells into a complete HTML report.
pub struct Assembler {
    settings: DocumentSettings,
    markdown: MarkdownRenderer,
    highlighter: CodeHighlighter,
    tera: Tera,
}

impl Assembler {
    pub fn new(
        settings: DocumentSettings,
        markdown: MarkdownOptions,
        highlight: &HighlightOptions,
    ) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_template(REPORT_TEMPLATE_NAME, REPORT_TEMPLATE)?;

        Ok(Assembler {
            settings,
            markdown: MarkdownRenderer::new(markdown),
            highlighter: CodeHighlighter::from_options(highlight)?,
            tera,
        })
    }

    /// Renders every cell in order and wraps the result in the report chrome. Either the whole
    /// document is returned or an error; never a partial document.
    pub fn assemble(&self, cells: &[Cell], generated_at: &str) -> Result<String, RenderError> {
        let fragments = plan(cells);

        let body = fragments
            .par_iter()
            .map(|fragment| self.render_fragment(fragment))
            .collect::<Result<Vec<String>, RenderError>>()?
            .concat();

        tracing::debug!(
            cells = cells.len(),
            fragments = fragments.len(),
            "cells rendered"
        );

        let mut context = Context::new();
        context.insert("title", &self.settings.title);
        context.insert("lang", &self.settings.lang);
        context.insert("generated_label", &self.settings.generated_label);
        context.insert("footer", &self.settings.footer);
        context.insert("generated_at", generated_at);
        context.insert("body", &body);

        Ok(self.tera.render(REPORT_TEMPLATE_NAME, &context)?)
    }

    fn render_fragment(&self, fragment: &Fragment) -> Result<String, RenderError> {
        match fragment {
            Fragment::Markdown(src) => Ok(self.markdown.render(src)),
            Fragment::Query { number, sql } => {
                let mut out = String::new();
                if *number > 1 {
                    out.push_str(&format!(
                        "\n        <div class=\"section-title\">\n            \
                         <h3 style=\"margin: 0;\">📝 {} {}</h3>\n        </div>\n",
                        tera::escape_html(&self.settings.query_label),
                        number
                    ));
                }
                out.push_str(&format!(
                    "\n        <div class=\"sql-code\">{}</div>\n",
                    self.highlighter.render(sql)?
                ));
                Ok(out)
            }
        }
    }
}

/// Assembles a report with the default settings.
pub fn assemble(cells: &[Cell], generated_at: &str) -> Result<String, RenderError> {
    Assembler::new(
        DocumentSettings::default(),
        MarkdownOptions::default(),
        &HighlightOptions::default(),
    )?
    .assemble(cells, generated_at)
}
