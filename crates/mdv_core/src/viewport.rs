//! Scroll position continuity across full-surface replacements.
//!
//! Every render replaces the whole displayed surface, which resets the
//! scroll position; the viewport manager captures the offset just before
//! handing over the new content and arms a one-shot restore bound to the
//! sink's loaded event.

use crate::render::pipeline::RenderedDocument;
use crate::sink::DisplaySink;
use serde::{Deserialize, Serialize};

/// A scroll offset captured from the display sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportOffset {
    pub x: f64,
    pub y: f64,
}

impl ViewportOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Script reissuing this offset in the displayed surface.
    pub fn restore_script(&self) -> String {
        format!("window.scrollTo({}, {});", self.x, self.y)
    }
}

/// Preserves the user's scroll position across a full-surface replacement.
#[derive(Debug, Default)]
pub struct ViewportStateManager;

impl ViewportStateManager {
    pub fn new() -> Self {
        Self
    }

    /// Capture the sink's current offset, replace the surface with the new
    /// document, and arm a one-shot restore for when the content loads.
    ///
    /// Restoration is best-effort: if the loaded event never fires, the
    /// pending closure is dropped with the sink and nothing leaks.
    pub fn around_render(&self, sink: &mut dyn DisplaySink, document: &RenderedDocument) {
        let offset = sink.current_scroll_offset();
        sink.set_content(&document.html, &document.base_dir);
        sink.on_content_loaded(Box::new(move |sink| {
            sink.run_script(&offset.restore_script());
        }));
    }
}
