//! The multi-stage content pipeline.
//!
//! Strictly ordered stages: extract fenced diagram blocks, substitute each
//! block's render outcome back in place, convert the result to HTML, and
//! wrap it in the fixed document template. Failures local to one diagram
//! block never abort the overall render.

use crate::assets;
use crate::diagram::{DiagramConfig, DiagramRenderer, RenderOutcome};
use crate::paths::PathResolver;
use crate::render::{to_html, RenderOptions};
use regex::Regex;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

static MERMAID_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```mermaid\n([\s\S]*?)```").unwrap());

/// One fenced diagram region extracted from the document, in document order.
/// Ephemeral; exists only during one pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Zero-based position among the document's diagram blocks.
    pub index: usize,
    /// The diagram source between the fences, verbatim.
    pub source: String,
}

/// The final assembled artifact handed to the display sink.
///
/// Immutable once constructed; one instance replaces the previous in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Complete HTML page.
    pub html: String,
    /// Directory against which relative references in the page resolve.
    pub base_dir: PathBuf,
}

/// Scan `raw` for fenced diagram blocks, in document order.
pub fn diagram_blocks(raw: &str) -> Vec<DiagramBlock> {
    extract_diagram_blocks(raw)
        .into_iter()
        .map(|(_, block)| block)
        .collect()
}

fn extract_diagram_blocks(raw: &str) -> Vec<(Range<usize>, DiagramBlock)> {
    MERMAID_BLOCK
        .captures_iter(raw)
        .enumerate()
        .map(|(index, caps)| {
            let whole = caps.get(0).expect("capture 0 always present");
            let source = caps.get(1).expect("block capture").as_str().to_owned();
            (whole.range(), DiagramBlock { index, source })
        })
        .collect()
}

fn outcome_markup(outcome: &RenderOutcome) -> String {
    match outcome {
        RenderOutcome::Embedded { image_base64 } => format!(
            r#"<div class="mermaid-diagram"><img src="data:image/png;base64,{image_base64}" alt="Mermaid diagram"/></div>"#
        ),
        RenderOutcome::ClientFallback { source } => {
            format!(r#"<div class="mermaid">{source}</div>"#)
        }
    }
}

/// Orchestrates diagram substitution, markdown conversion, and final
/// document assembly.
pub struct RenderPipeline {
    resolver: Arc<dyn PathResolver>,
    diagrams: DiagramRenderer,
    options: RenderOptions,
}

impl RenderPipeline {
    pub fn new(
        resolver: Arc<dyn PathResolver>,
        diagram_config: DiagramConfig,
        options: RenderOptions,
    ) -> Self {
        let diagrams = DiagramRenderer::new(Arc::clone(&resolver), diagram_config);
        Self {
            resolver,
            diagrams,
            options,
        }
    }

    /// Run the full pipeline over already-read document content.
    ///
    /// `base_dir` becomes the page's base resource location so relative
    /// references (images, links) resolve correctly.
    pub async fn render(&self, raw: &str, base_dir: &Path) -> RenderedDocument {
        let substituted = self.substitute_diagrams(raw).await;
        let body = to_html(&substituted, &self.options);
        let html = assets::build_page(&body, &self.mermaid_script_src());
        RenderedDocument {
            html,
            base_dir: base_dir.to_path_buf(),
        }
    }

    async fn substitute_diagrams(&self, raw: &str) -> String {
        let blocks = extract_diagram_blocks(raw);
        if blocks.is_empty() {
            return raw.to_owned();
        }

        let mut out = String::with_capacity(raw.len());
        let mut cursor = 0;
        for (span, block) in blocks {
            out.push_str(&raw[cursor..span.start]);
            let outcome = self.diagrams.render(&block.source).await;
            tracing::debug!(
                index = block.index,
                embedded = matches!(outcome, RenderOutcome::Embedded { .. }),
                "Substituted diagram block"
            );
            out.push_str(&outcome_markup(&outcome));
            cursor = span.end;
        }
        out.push_str(&raw[cursor..]);
        out
    }

    /// Prefer the locally resolved mermaid client script, else the remote
    /// location.
    fn mermaid_script_src(&self) -> String {
        match self.resolver.local_mermaid_script() {
            Some(path) => format!("file://{}", path.display()),
            None => assets::REMOTE_MERMAID_SCRIPT.to_owned(),
        }
    }
}
