//! Embedded page templates for the preview surface.
//!
//! The document template supplies the layout rules and the deferred
//! client-side mermaid bootstrap; placeholders are replaced at assembly
//! time, never interpolated.

/// Fixed document template with placeholders for the body and the mermaid
/// client script location.
pub const PAGE_TEMPLATE: &str = include_str!("../assets/preview.html");

/// Surface shown while no document is loaded.
pub const WELCOME_PAGE: &str = include_str!("../assets/welcome.html");

const ERROR_TEMPLATE: &str = include_str!("../assets/error.html");

/// Remote mermaid client script used when no local copy is resolved.
pub const REMOTE_MERMAID_SCRIPT: &str =
    "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js";

/// Assemble the complete page around a rendered HTML body.
///
/// The script placeholder is replaced first so body content can never be
/// mistaken for a placeholder.
pub fn build_page(body: &str, mermaid_script_src: &str) -> String {
    PAGE_TEMPLATE
        .replace("__MERMAID_SRC__", mermaid_script_src)
        .replace("<!--__CONTENT__-->", body)
}

/// Build the error-display page for a failed render cycle.
pub fn error_page(description: &str) -> String {
    ERROR_TEMPLATE.replace("__ERROR_MESSAGE__", &escape_html(description))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_exist() {
        assert!(PAGE_TEMPLATE.contains("<!DOCTYPE html>"));
        assert!(WELCOME_PAGE.contains("<!DOCTYPE html>"));
        assert!(ERROR_TEMPLATE.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_build_page_replaces_placeholders() {
        let html = build_page("<p>hello</p>", REMOTE_MERMAID_SCRIPT);
        assert!(!html.contains("<!--__CONTENT__-->"));
        assert!(!html.contains("__MERMAID_SRC__"));
        assert!(html.contains("<p>hello</p>"));
        assert!(html.contains(REMOTE_MERMAID_SCRIPT));
    }

    #[test]
    fn test_page_carries_deferred_mermaid_bootstrap() {
        let html = build_page("", REMOTE_MERMAID_SCRIPT);
        assert!(html.contains("mermaid.run"));
        assert!(html.contains("language-mermaid"));
    }

    #[test]
    fn test_error_page_escapes_description() {
        let html = error_page("broken <tag> & more");
        assert!(html.contains("broken &lt;tag&gt; &amp; more"));
        assert!(!html.contains("<tag>"));
    }
}
