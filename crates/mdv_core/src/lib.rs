//! Core library for live markdown preview.
//!
//! This crate provides the moving parts of a single-document live preview:
//! change detection, the content pipeline with external diagram rendering,
//! and scroll continuity across full-surface replacements.
//!
//! # Modules
//!
//! - [`watcher`] - Polling-based change detection for the previewed file
//! - [`diagram`] - External diagram rendering with graceful degradation
//! - [`render`] - Markdown conversion and the content pipeline
//! - [`toc`] - Table of contents expansion
//! - [`viewport`] - Scroll restoration across surface replacements
//! - [`session`] - Document lifecycle orchestration
//! - [`paths`] - Runtime path resolution for the renderer toolchain
//! - [`sink`] - Display sink abstraction
//! - [`assets`] - Embedded page templates

pub mod assets;
pub mod diagram;
pub mod document;
pub mod paths;
pub mod render;
pub mod session;
pub mod sink;
pub mod toc;
pub mod viewport;
pub mod watcher;

// Re-export commonly used types at crate root
pub use diagram::{DiagramConfig, DiagramRenderer, RenderOutcome};
pub use document::Document;
pub use paths::{DefaultPathResolver, PathResolver, RendererCommand, RuntimeMode};
pub use render::pipeline::{diagram_blocks, DiagramBlock, RenderPipeline, RenderedDocument};
pub use render::{to_html, RenderOptions};
pub use session::{Session, SessionError};
pub use sink::{DisplaySink, LoadedCallback};
pub use viewport::{ViewportOffset, ViewportStateManager};
pub use watcher::{FileWatcher, WatchEvent, WatcherConfig};
