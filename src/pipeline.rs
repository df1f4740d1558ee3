use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use console::style;
use serde::Serialize;
use tempfile::NamedTempFile;

use sqlnb_parser::{extract, CellKind, Extraction};
use sqlnb_render::Assembler;

use crate::config::ReportConfig;

pub fn print_err<T>(res: anyhow::Result<T>) -> Option<T> {
    match res {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            e.chain()
                .skip(1)
                .for_each(|cause| eprintln!(" {} {}", style("caused by:").bold(), cause));
            None
        }
    }
}

/// Summary of a report that was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub output: PathBuf,
    pub cells: usize,
    pub queries: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Written(BuildReport),
    /// The notebook held no readable cells. Nothing was written.
    NothingToRender { skipped: usize },
}

pub struct Pipeline {
    config: ReportConfig,
    assembler: Assembler,
}

impl Pipeline {
    pub fn new(config: ReportConfig) -> anyhow::Result<Self> {
        let assembler = Assembler::new(
            config.document.clone(),
            config.markdown.clone(),
            &config.highlight,
        )
        .context("Error preparing the report renderer")?;

        Ok(Pipeline { config, assembler })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn extract(&self) -> anyhow::Result<Extraction> {
        Ok(extract(&read_text(&self.config.input)?))
    }

    /// Builds the report stamped with the current date.
    pub fn build(&self) -> anyhow::Result<BuildOutcome> {
        let generated_at = now(&self.config.date_format)?;
        self.build_at(&generated_at)
    }

    pub fn build_at(&self, generated_at: &str) -> anyhow::Result<BuildOutcome> {
        let extraction = self.extract()?;
        if extraction.is_empty() {
            tracing::warn!(
                input = %self.config.input.display(),
                skipped = extraction.skipped().len(),
                "no cells to render"
            );
            return Ok(BuildOutcome::NothingToRender {
                skipped: extraction.skipped().len(),
            });
        }

        let html = self
            .assembler
            .assemble(extraction.cells(), generated_at)
            .with_context(|| format!("Error rendering {}", self.config.input.display()))?;
        write_text(&self.config.output, &html)?;

        let report = BuildReport {
            output: self.config.output.clone(),
            cells: extraction.cells().len(),
            queries: extraction
                .cells()
                .iter()
                .filter(|c| c.kind() == CellKind::Code && !c.content().trim().is_empty())
                .count(),
            skipped: extraction.skipped().len(),
        };
        tracing::info!(?report, "report written");
        Ok(BuildOutcome::Written(report))
    }
}

pub fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Error loading notebook at {}", path.display()))
}

/// Writes `content` to a temporary file next to `path` and moves it into place, so `path` holds
/// either its previous contents or the complete new ones.
pub fn write_text(path: &Path, content: &str) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).context("Could not create directory")?;

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Error creating temporary file in {}", dir.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Error writing report for {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("Error saving report to {}", path.display()))?;

    Ok(())
}

/// Current local time formatted with a `strftime` pattern.
pub fn now(format: &str) -> anyhow::Result<String> {
    let mut out = String::new();
    write!(out, "{}", chrono::Local::now().format(format))
        .map_err(|_| anyhow!("Invalid date format '{}'", format))?;
    Ok(out)
}
