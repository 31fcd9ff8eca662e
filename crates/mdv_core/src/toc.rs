//! Table of contents expansion for markdown documents.
//!
//! A line consisting solely of the `[TOC]` marker is replaced with a
//! generated contents list covering the whole document. The list is emitted
//! as a markdown bullet list of anchor links, so the main conversion pass
//! nests it and the anchors line up with the heading ids injected there.

use crate::render::slugify;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

/// Marker line expanded into the generated contents list.
pub const TOC_MARKER: &str = "[TOC]";

/// Configuration for table of contents generation.
#[derive(Debug, Clone)]
pub struct TocConfig {
    /// Bullet character for list items.
    pub bullet: String,
    /// Number of spaces per indent level.
    pub indent: usize,
    /// Maximum heading depth to include (`None` includes all).
    pub max_depth: Option<usize>,
    /// Minimum heading depth to include.
    pub min_depth: usize,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            bullet: String::from("*"),
            indent: 4,
            max_depth: None,
            min_depth: 0,
        }
    }
}

/// A parsed markdown heading.
#[derive(Debug, Clone)]
pub struct Heading {
    /// Heading depth (0-indexed: h1=0, h2=1, etc.)
    pub depth: usize,
    /// Heading text content.
    pub title: String,
}

impl FromStr for Heading {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_end();
        if trimmed.starts_with('#') {
            let mut depth = 0usize;
            let title = trimmed
                .chars()
                .skip_while(|c| {
                    if *c == '#' {
                        depth += 1;
                        true
                    } else {
                        false
                    }
                })
                .collect::<String>()
                .trim_start()
                .to_owned();
            Ok(Heading {
                depth: depth - 1,
                title,
            })
        } else {
            Err(())
        }
    }
}

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.*)\](.*)").unwrap());

impl Heading {
    /// Format the heading as a contents entry according to the given config,
    /// or `None` when its depth falls outside the configured range.
    pub fn format(&self, config: &TocConfig) -> Option<String> {
        if self.depth < config.min_depth
            || config.max_depth.is_some_and(|max| self.depth > max)
        {
            return None;
        }

        // A heading that is itself a link contributes only its link text.
        let title = match MARKDOWN_LINK.captures(&self.title) {
            Some(cap) => cap.get(1)?.as_str().to_owned(),
            None => self.title.clone(),
        };
        let title = strip_backticks(&title);

        let indent_before_bullet = " "
            .repeat(config.indent)
            .repeat(self.depth.saturating_sub(config.min_depth));
        let bullet = &config.bullet;
        let indent_after_bullet = " ".repeat(config.indent.saturating_sub(1));

        Some(format!(
            "{indent_before_bullet}{bullet}{indent_after_bullet}[{title}](#{})",
            slugify(&title)
        ))
    }
}

/// Indicates the type of code block fence.
enum CodeBlockStart {
    Backticks,
    Tildes,
}

/// Split `raw` into lines with an "inside a code fence" flag per line, so
/// neither headings nor markers inside fenced blocks are ever interpreted.
fn lines_with_fence_state(raw: &str) -> Vec<(&str, bool)> {
    let mut code_fence = None;
    raw.lines()
        .map(|line| match &code_fence {
            None => {
                if line.starts_with("```") {
                    code_fence.replace(CodeBlockStart::Backticks);
                    (line, true)
                } else if line.starts_with("~~~") {
                    code_fence.replace(CodeBlockStart::Tildes);
                    (line, true)
                } else {
                    (line, false)
                }
            }
            Some(code_block_start) => {
                match code_block_start {
                    CodeBlockStart::Backticks if line.starts_with("```") => {
                        code_fence.take();
                    }
                    CodeBlockStart::Tildes if line.starts_with("~~~") => {
                        code_fence.take();
                    }
                    _ => {}
                }
                (line, true)
            }
        })
        .collect()
}

fn collect_headings(raw: &str) -> Vec<Heading> {
    lines_with_fence_state(raw)
        .into_iter()
        .filter(|(_, fenced)| !fenced)
        .filter_map(|(line, _)| line.parse::<Heading>().ok())
        .collect()
}

/// Generate the contents list for `raw` as a markdown block wrapped in a
/// `toc` container, or `None` when no heading is in range.
fn generate_toc(raw: &str, config: &TocConfig) -> Option<String> {
    let entries: Vec<String> = collect_headings(raw)
        .iter()
        .filter_map(|heading| heading.format(config))
        .collect();
    if entries.is_empty() {
        return None;
    }
    Some(format!(
        "<div class=\"toc\">\n\n{}\n\n</div>",
        entries.join("\n")
    ))
}

/// Replace every standalone `[TOC]` marker line in `raw` with the generated
/// contents list. Markers inside fenced code blocks stay literal, and when
/// the document has no headings in range the marker line is dropped rather
/// than rendered verbatim.
pub fn expand_toc_markers(raw: &str, config: &TocConfig) -> String {
    let has_marker = lines_with_fence_state(raw)
        .into_iter()
        .any(|(line, fenced)| !fenced && line.trim() == TOC_MARKER);
    if !has_marker {
        return raw.to_owned();
    }

    let toc = generate_toc(raw, config);
    let mut out = Vec::new();
    for (line, fenced) in lines_with_fence_state(raw) {
        if !fenced && line.trim() == TOC_MARKER {
            if let Some(toc) = &toc {
                out.push(toc.as_str());
            }
        } else {
            out.push(line);
        }
    }
    let mut expanded = out.join("\n");
    if raw.ends_with('\n') {
        expanded.push('\n');
    }
    expanded
}

/// Strip backticks from text while preserving the inner content.
fn strip_backticks(input: &str) -> String {
    static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]*)`").unwrap());
    RE.replace_all(input, "$1").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_parsing() {
        let heading: Heading = "### run `import-blocks`".parse().unwrap();
        assert_eq!(heading.title, "run `import-blocks`");
        assert_eq!(heading.depth, 2);

        assert!("plain text".parse::<Heading>().is_err());
    }

    #[test]
    fn test_heading_format() {
        let heading: Heading = "## run `import-blocks`".parse().unwrap();
        let formatted = heading.format(&TocConfig::default()).unwrap();
        assert_eq!(formatted, "    *   [run import-blocks](#run-import-blocks)");
    }

    #[test]
    fn test_heading_format_depth_range() {
        let heading: Heading = "#### deep".parse().unwrap();
        let config = TocConfig {
            max_depth: Some(2),
            ..Default::default()
        };
        assert!(heading.format(&config).is_none());
    }

    #[test]
    fn test_strip_backticks() {
        assert_eq!(strip_backticks("hello `world`"), "hello world");
        assert_eq!(strip_backticks("no backticks"), "no backticks");
    }

    #[test]
    fn test_headings_inside_fences_are_skipped() {
        let raw = "# real\n```\n# not a heading\n```\n~~~\n# nor this\n~~~\n## also real\n";
        let headings = collect_headings(raw);
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].title, "real");
        assert_eq!(headings[1].title, "also real");
    }

    #[test]
    fn test_marker_expands_to_anchor_list() {
        let raw = "# One\n\n[TOC]\n\n## Two\n";
        let expanded = expand_toc_markers(raw, &TocConfig::default());
        assert!(!expanded.contains(TOC_MARKER));
        assert!(expanded.contains("<div class=\"toc\">"));
        assert!(expanded.contains("[One](#one)"));
        assert!(expanded.contains("    *   [Two](#two)"));
    }

    #[test]
    fn test_marker_inside_fence_stays_literal() {
        let raw = "# One\n\n```\n[TOC]\n```\n";
        let expanded = expand_toc_markers(raw, &TocConfig::default());
        assert_eq!(expanded, raw);
    }

    #[test]
    fn test_marker_without_headings_is_dropped() {
        let expanded = expand_toc_markers("[TOC]\n\nplain text\n", &TocConfig::default());
        assert!(!expanded.contains(TOC_MARKER));
        assert!(expanded.contains("plain text"));
    }

    #[test]
    fn test_no_marker_leaves_document_untouched() {
        let raw = "# One\n\nbody\n";
        assert_eq!(expand_toc_markers(raw, &TocConfig::default()), raw);
    }
}
