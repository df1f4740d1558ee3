use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref HEADING_3: Regex = Regex::new(r"(?m)^### (.+)$").expect("invalid regex expression");
    static ref HEADING_2: Regex = Regex::new(r"(?m)^## (.+)$").expect("invalid regex expression");
    static ref HEADING_1: Regex = Regex::new(r"(?m)^# (.+)$").expect("invalid regex expression");
    static ref STRONG: Regex = Regex::new(r"\*\*(.+?)\*\*").expect("invalid regex expression");
    static ref RULE_LINE: Regex =
        Regex::new(r"(?m)^[ \t]*---[ \t]*$").expect("invalid regex expression");
}

/// Where `---` turns into a horizontal rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMode {
    /// Only on a line of its own.
    #[default]
    Anchored,
    /// Anywhere in the text, including inside prose.
    Anywhere,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    pub rules: RuleMode,
}

/// Renders the markdown subset found in notebook narrative cells: headings (levels 1 to 3), bold
/// spans, horizontal rules and paragraphs. Inline HTML passes through untouched.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: MarkdownOptions,
}

impl MarkdownRenderer {
    pub fn new(options: MarkdownOptions) -> Self {
        MarkdownRenderer { options }
    }

    /// Rules are applied in a fixed order (headings, bold, rules, paragraphs) so that markup
    /// produced by an earlier rule is never picked up as text by a later one.
    pub fn render(&self, content: &str) -> String {
        let text = content.replace("\r\n", "\n");

        let text = HEADING_3.replace_all(&text, "<h3>${1}</h3>");
        let text = HEADING_2.replace_all(&text, "<h2>${1}</h2>");
        let text = HEADING_1.replace_all(&text, "<h1>${1}</h1>");
        let text = STRONG.replace_all(&text, "<strong>${1}</strong>");
        let text = match self.options.rules {
            RuleMode::Anchored => RULE_LINE.replace_all(&text, "<hr>").into_owned(),
            RuleMode::Anywhere => text.replace("---", "<hr>"),
        };

        let body = text
            .split("\n\n")
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                if segment.starts_with('<') {
                    segment.to_string()
                } else {
                    format!("<p>{segment}</p>")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!("<div class=\"markdown-content\">\n{body}\n</div>\n")
    }
}

/// Renders with the default options.
pub fn render_markdown(content: &str) -> String {
    MarkdownRenderer::default().render(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inner(html: &str) -> &str {
        html.strip_prefix("<div class=\"markdown-content\">\n")
            .and_then(|s| s.strip_suffix("\n</div>\n"))
            .expect("missing markdown wrapper")
    }

    #[test]
    fn heading_levels() {
        assert_eq!(inner(&render_markdown("# Title")), "<h1>Title</h1>");
        assert_eq!(inner(&render_markdown("## Section")), "<h2>Section</h2>");
        assert_eq!(inner(&render_markdown("### Detail")), "<h3>Detail</h3>");
    }

    #[test]
    fn headings_match_per_line() {
        let html = render_markdown("# One\n## Two\nplain");
        assert_eq!(inner(&html), "<h1>One</h1>\n<h2>Two</h2>\nplain");
    }

    #[test]
    fn deeper_headings_are_left_alone() {
        assert_eq!(inner(&render_markdown("#### Four")), "<p>#### Four</p>");
        assert_eq!(inner(&render_markdown("#NoSpace")), "<p>#NoSpace</p>");
    }

    #[test]
    fn bold_is_not_wrapped_in_paragraph() {
        assert_eq!(
            inner(&render_markdown("**bold**")),
            "<strong>bold</strong>"
        );
    }

    #[test]
    fn adjacent_bold_spans_stay_separate() {
        assert_eq!(
            inner(&render_markdown("a **b** and **c**")),
            "<p>a <strong>b</strong> and <strong>c</strong></p>"
        );
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let html = render_markdown("first\nstill first\n\nsecond\n\n\n\nthird");
        assert_eq!(
            inner(&html),
            "<p>first\nstill first</p>\n<p>second</p>\n<p>third</p>"
        );
    }

    #[test]
    fn anchored_rule() {
        let html = render_markdown("above\n\n---\n\nbelow a---b");
        assert_eq!(inner(&html), "<p>above</p>\n<hr>\n<p>below a---b</p>");
    }

    #[test]
    fn rule_anywhere() {
        let renderer = MarkdownRenderer::new(MarkdownOptions {
            rules: RuleMode::Anywhere,
        });
        let html = renderer.render("a---b\n\n---");
        assert_eq!(inner(&html), "<p>a<hr>b</p>\n<hr>");
    }

    #[test]
    fn crlf_line_endings() {
        let html = render_markdown("# Title\r\n\r\ntext");
        assert_eq!(inner(&html), "<h1>Title</h1>\n<p>text</p>");
    }

    #[test]
    fn empty_cell() {
        assert_eq!(
            render_markdown("  "),
            "<div class=\"markdown-content\">\n\n</div>\n"
        );
    }
}
