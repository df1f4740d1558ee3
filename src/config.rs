use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use sqlnb_render::{DocumentSettings, HighlightOptions, MarkdownOptions};

/// File name looked up in the working directory when no configuration path is given.
pub const DEFAULT_CONFIG_FILE: &str = "report.yml";

/// Refers to a `report.yml` file that specifies where the notebook is read from, where the report
/// goes, and how it looks. Every field has a default, so an empty mapping is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// `strftime` pattern for the generation date in the footer.
    pub date_format: String,
    pub document: DocumentSettings,
    pub markdown: MarkdownOptions,
    pub highlight: HighlightOptions,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            input: PathBuf::from("Collection_Script.sqlnb"),
            output: PathBuf::from("Collection_Script.html"),
            date_format: "%d %B %Y".to_string(),
            document: DocumentSettings::default(),
            markdown: MarkdownOptions::default(),
            highlight: HighlightOptions::default(),
        }
    }
}

impl ReportConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let input = fs::read_to_string(path)
            .with_context(|| format!("Error reading configuration at {}", path.display()))?;
        serde_yaml::from_str(&input).context("Error loading report configuration:")
    }

    /// Loads `explicit` if given. Otherwise loads [DEFAULT_CONFIG_FILE] from `dir` when it exists,
    /// and falls back to the defaults when it does not.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = dir.join(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlnb_render::{HighlightEngine, RuleMode};

    #[test]
    fn partial_config() {
        let config: ReportConfig = serde_yaml::from_str(
            r#"
input: notebooks/events.sqlnb
document:
  title: Recopilación de Información
  lang: es
  query_label: Consulta
  footer:
    - Pontificia Universidad Javeriana
markdown:
  rules: anywhere
highlight:
  engine: syntect
"#,
        )
        .unwrap();

        assert_eq!(config.input, PathBuf::from("notebooks/events.sqlnb"));
        assert_eq!(config.output, PathBuf::from("Collection_Script.html"));
        assert_eq!(config.document.lang, "es");
        assert_eq!(config.document.generated_label, "Generated on");
        assert_eq!(config.markdown.rules, RuleMode::Anywhere);
        assert_eq!(config.highlight.engine, HighlightEngine::Syntect);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
        assert_eq!(config.highlight.dialect.keywords.len(), 17);
    }

    #[test]
    fn custom_dialect() {
        let config: ReportConfig = serde_yaml::from_str(
            r#"
highlight:
  dialect:
    functions: [NVL]
    keywords: [SELECT, FROM]
"#,
        )
        .unwrap();
        assert_eq!(config.highlight.dialect.functions, vec!["NVL".to_string()]);
    }

    #[test]
    fn discover_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.input, PathBuf::from("Collection_Script.sqlnb"));
    }

    #[test]
    fn discover_reads_file_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "output: out/report.html\n").unwrap();
        let config = ReportConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.output, PathBuf::from("out/report.html"));
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yml");
        let err = ReportConfig::discover(Some(&missing), dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("missing.yml"));
    }

    #[test]
    fn invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        fs::write(&path, "markdown:\n  rules: sometimes\n").unwrap();
        assert!(ReportConfig::load(&path).is_err());
    }
}
