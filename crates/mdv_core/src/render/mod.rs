//! Markdown to HTML conversion and the content pipeline.
//!
//! Conversion itself is a pure function over the supplied text: generalized
//! block extensions (tables, footnotes), heading anchor IDs, `[TOC]` marker
//! expansion, soft line breaks rendered as hard breaks, and inline HTML
//! passthrough. Diagram substitution and document assembly live in
//! [`pipeline`].

pub mod pipeline;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use std::borrow::Cow;

/// Options for rendering markdown to HTML.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Enable tables.
    pub enable_tables: bool,
    /// Enable footnotes.
    pub enable_footnotes: bool,
    /// Enable strikethrough syntax (~~text~~).
    pub enable_strikethrough: bool,
    /// Enable task list items ([x] and [ ]).
    pub enable_tasklists: bool,
    /// Expand `[TOC]` markers into a generated contents list.
    pub enable_toc: bool,
    /// Render soft line breaks as hard breaks.
    pub newline_to_break: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            enable_tables: true,
            enable_footnotes: true,
            enable_strikethrough: true,
            enable_tasklists: true,
            enable_toc: true,
            newline_to_break: true,
        }
    }
}

impl RenderOptions {
    fn to_pulldown_options(&self) -> Options {
        let mut options = Options::empty();
        if self.enable_tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.enable_footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.enable_strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.enable_tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        options
    }
}

/// Converts heading text to a URL-safe slug following GitHub's convention:
/// lowercase, spaces to hyphens, strip punctuation, collapse hyphen runs.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else if c == ' ' || c == '-' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Convert markdown text to an HTML fragment.
///
/// Pure with respect to external side effects; the caller supplies the text.
/// Headings receive slugified `id` attributes so anchor links and a table of
/// contents work out of the box.
pub fn to_html(markdown: &str, options: &RenderOptions) -> String {
    let markdown: Cow<'_, str> = if options.enable_toc {
        Cow::Owned(crate::toc::expand_toc_markers(
            markdown,
            &crate::toc::TocConfig::default(),
        ))
    } else {
        Cow::Borrowed(markdown)
    };
    let parser = Parser::new_ext(&markdown, options.to_pulldown_options());
    let events: Vec<Event> = parser.collect();
    let mut processed = Vec::with_capacity(events.len());

    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading {
                level,
                id: _,
                classes,
                attrs,
            }) => {
                // Collect the heading text to derive a stable anchor id.
                let mut heading_text = String::new();
                for later in &events[i + 1..] {
                    match later {
                        Event::Text(text) | Event::Code(text) => heading_text.push_str(text),
                        Event::End(TagEnd::Heading(_)) => break,
                        _ => {}
                    }
                }
                let slug = slugify(&heading_text.replace('`', ""));
                processed.push(Event::Start(Tag::Heading {
                    level: *level,
                    id: Some(slug.into()),
                    classes: classes.clone(),
                    attrs: attrs.clone(),
                }));
            }
            Event::SoftBreak if options.newline_to_break => processed.push(Event::HardBreak),
            other => processed.push(other.clone()),
        }
    }

    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, processed.into_iter());
    html
}
