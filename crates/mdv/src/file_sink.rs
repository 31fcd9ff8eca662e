//! A display sink that materializes the preview surface as an HTML file.

use mdv_core::sink::{DisplaySink, LoadedCallback};
use mdv_core::viewport::ViewportOffset;
use std::path::{Path, PathBuf};

/// Writes each rendered surface to a fixed output path, injecting a `<base>`
/// element so relative references resolve against the document's directory
/// when the page is opened in a browser.
///
/// A file write is synchronous, so "content loaded" is reported as soon as
/// the write completes; scroll state is not meaningful for a file target and
/// restore scripts are only logged.
pub struct HtmlFileSink {
    out_path: PathBuf,
    content_loaded: bool,
    pending: Option<LoadedCallback>,
}

impl HtmlFileSink {
    pub fn new(out_path: PathBuf) -> Self {
        Self {
            out_path,
            content_loaded: false,
            pending: None,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }

    fn with_base_href(html: &str, base_dir: &Path) -> String {
        let base = format!("<head>\n<base href=\"file://{}/\">", base_dir.display());
        html.replacen("<head>", &base, 1)
    }
}

impl DisplaySink for HtmlFileSink {
    fn set_content(&mut self, html: &str, base_dir: &Path) {
        let page = Self::with_base_href(html, base_dir);
        match std::fs::write(&self.out_path, page) {
            Ok(()) => {
                self.content_loaded = true;
                if let Some(callback) = self.pending.take() {
                    callback(self);
                }
            }
            Err(err) => {
                tracing::error!(path = %self.out_path.display(), error = %err, "Failed to write preview page");
            }
        }
    }

    fn current_scroll_offset(&self) -> ViewportOffset {
        ViewportOffset::default()
    }

    fn on_content_loaded(&mut self, callback: LoadedCallback) {
        if self.content_loaded {
            callback(self);
        } else {
            self.pending = Some(callback);
        }
    }

    fn run_script(&mut self, code: &str) {
        tracing::debug!(code, "Ignoring script for file sink");
    }
}
