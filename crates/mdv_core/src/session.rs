//! Session orchestration: document lifecycle, watcher ownership, and render
//! cycles around the display sink.

use crate::assets;
use crate::document::Document;
use crate::render::pipeline::{RenderPipeline, RenderedDocument};
use crate::sink::DisplaySink;
use crate::viewport::ViewportStateManager;
use crate::watcher::{FileWatcher, WatchEvent, WatcherConfig};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unsupported document type: {}", .0.display())]
    UnsupportedDocument(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Owns the current document, at most one active watcher, and the render
/// cycle around the display sink.
pub struct Session<S> {
    sink: S,
    pipeline: RenderPipeline,
    viewport: ViewportStateManager,
    watcher_config: WatcherConfig,
    document: Option<Document>,
    watcher: Option<FileWatcher>,
    changes: Option<UnboundedReceiver<WatchEvent>>,
}

impl<S: DisplaySink> Session<S> {
    pub fn new(sink: S, pipeline: RenderPipeline, watcher_config: WatcherConfig) -> Self {
        Self {
            sink,
            pipeline,
            viewport: ViewportStateManager::new(),
            watcher_config,
            document: None,
            watcher: None,
            changes: None,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn current_document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Show the welcome surface (no document loaded).
    pub fn show_welcome(&mut self) {
        self.sink.set_content(assets::WELCOME_PAGE, Path::new("."));
    }

    /// Load a document: stop any prior watcher, reset document state, run one
    /// full render, then start a fresh watcher for the new path.
    pub async fn load(&mut self, path: &Path) -> Result<(), SessionError> {
        // Validate before touching session state: a rejected path must leave
        // the current document and its watcher untouched.
        if !Document::is_markdown_path(path) {
            return Err(SessionError::UnsupportedDocument(path.to_path_buf()));
        }

        // The previous watcher must have fully stopped before the new one
        // starts; unload joins it.
        self.unload();

        self.document = Some(Document::new(path.to_path_buf()));
        self.render_current().await;

        let (events_tx, events_rx) = tokio::sync::mpsc::unbounded_channel();
        self.watcher = Some(FileWatcher::spawn(
            path,
            self.watcher_config.clone(),
            events_tx,
        )?);
        self.changes = Some(events_rx);
        tracing::info!(path = %path.display(), "Loaded document");
        Ok(())
    }

    /// Stop watching and drop the current document.
    pub fn unload(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }
        self.changes = None;
        self.document = None;
    }

    /// Wait for the next change signal.
    ///
    /// Resolves to `false` once the watcher has terminated (file vanished or
    /// session unloaded); no further signals will ever arrive after that.
    pub async fn next_change(&mut self) -> bool {
        match self.changes.as_mut() {
            Some(changes) => changes.recv().await.is_some(),
            None => false,
        }
    }

    /// Re-render the current document, re-reading its content from disk.
    pub async fn refresh(&mut self) {
        self.render_current().await;
    }

    async fn render_current(&mut self) {
        let Some(document) = self.document.clone() else {
            return;
        };

        // A failed read never leaves the sink half-updated; it renders a
        // replacement page describing the failure. The watcher keeps polling,
        // so recovery is automatic once the file is valid again.
        let rendered = match std::fs::read_to_string(&document.path) {
            Ok(raw) => self.pipeline.render(&raw, &document.base_dir).await,
            Err(err) => {
                tracing::error!(path = %document.path.display(), error = %err, "Failed to read document");
                RenderedDocument {
                    html: assets::error_page(&err.to_string()),
                    base_dir: document.base_dir.clone(),
                }
            }
        };

        self.viewport.around_render(&mut self.sink, &rendered);
    }
}

impl<S> Drop for Session<S> {
    fn drop(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }
    }
}
