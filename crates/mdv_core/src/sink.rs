//! Display sink abstraction over the presentation surface.
//!
//! The session never talks to a concrete widget; it hands each assembled
//! page to a [`DisplaySink`] and queries it for scroll state. Replace-on-
//! render semantics are part of the contract: `set_content` swaps the whole
//! surface, it never patches.

use crate::viewport::ViewportOffset;
use std::path::Path;

/// One-shot callback fired when the sink reports the new content has loaded.
pub type LoadedCallback = Box<dyn FnOnce(&mut dyn DisplaySink) + Send>;

/// The external surface that renders assembled HTML and reports scroll and
/// loaded state.
pub trait DisplaySink: Send {
    /// Replace the entire displayed surface. Relative references in `html`
    /// resolve against `base_dir`.
    fn set_content(&mut self, html: &str, base_dir: &Path);

    /// Current scroll offset of the displayed surface.
    fn current_scroll_offset(&self) -> ViewportOffset;

    /// Register a one-shot callback for the next "content loaded" event.
    ///
    /// Registering a new callback discards any still-pending one, so a
    /// restore can never leak across documents. If the event never fires the
    /// callback is simply dropped with the sink.
    fn on_content_loaded(&mut self, callback: LoadedCallback);

    /// Run a script in the displayed surface. Used solely to reissue the
    /// scroll position.
    fn run_script(&mut self, code: &str);
}
