//! External diagram rendering with graceful degradation.
//!
//! Each mermaid block is handed to mermaid-cli through a pair of scoped
//! temporary files. The invocation is bounded by a wall-clock timeout and a
//! constrained environment; any failure downgrades to a client-side fallback
//! marker so the document always renders.

use crate::paths::{PathResolver, RendererCommand};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

/// Search path handed to the renderer process so the invocation does not
/// depend on the caller's ambient environment.
const RENDERER_SEARCH_PATH: &str = "/usr/local/bin:/usr/bin:/bin:/usr/sbin:/sbin";

/// Configuration for the diagram renderer.
#[derive(Debug, Clone)]
pub struct DiagramConfig {
    /// Wall-clock bound on one renderer invocation.
    pub timeout: Duration,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

/// Outcome of rendering one diagram block.
///
/// Every block yields exactly one outcome; no block is silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// Server-side rendered PNG, base64-encoded for data-URI embedding.
    Embedded { image_base64: String },
    /// Source text handed back verbatim for deferred client-side rendering.
    ClientFallback { source: String },
}

#[derive(Debug, thiserror::Error)]
enum DiagramError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("renderer exited with {status}: {stderr}")]
    Failed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("renderer produced no output artifact")]
    MissingOutput,

    #[error("renderer timed out after {0:?}")]
    TimedOut(Duration),
}

/// Converts one diagram-source block into an embeddable image, falling back
/// to a client-side marker when the external renderer is unavailable.
pub struct DiagramRenderer {
    resolver: Arc<dyn PathResolver>,
    config: DiagramConfig,
}

impl DiagramRenderer {
    pub fn new(resolver: Arc<dyn PathResolver>, config: DiagramConfig) -> Self {
        Self { resolver, config }
    }

    /// Render one diagram source block.
    ///
    /// Never fails: a missing binary, nonzero exit, missing output, or
    /// timeout all degrade to [`RenderOutcome::ClientFallback`] carrying the
    /// source untouched. Diagram rendering is a best-effort enhancement.
    pub async fn render(&self, source: &str) -> RenderOutcome {
        let Some(command) = self.resolver.renderer_command() else {
            // Disabled by policy, not a failure.
            tracing::debug!("Server-side diagram rendering disabled, using client fallback");
            return RenderOutcome::ClientFallback {
                source: source.to_owned(),
            };
        };

        match self.invoke_renderer(&command, source).await {
            Ok(png) => RenderOutcome::Embedded {
                image_base64: base64::engine::general_purpose::STANDARD.encode(png),
            },
            Err(err) => {
                tracing::debug!(%err, "Diagram renderer failed, using client fallback");
                RenderOutcome::ClientFallback {
                    source: source.to_owned(),
                }
            }
        }
    }

    async fn invoke_renderer(
        &self,
        command: &RendererCommand,
        source: &str,
    ) -> Result<Vec<u8>, DiagramError> {
        // Both artifacts live in a directory scoped to this call; dropping
        // `workdir` removes them on every exit path, including timeout.
        let workdir = tempfile::Builder::new().prefix("mdv-diagram-").tempdir()?;
        let input_path = workdir.path().join("diagram.mmd");
        let output_path = workdir.path().join("diagram.png");
        tokio::fs::write(&input_path, source).await?;

        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args)
            .arg("-i")
            .arg(&input_path)
            .arg("-o")
            .arg(&output_path)
            .args(["-b", "white", "-t", "default"])
            .env("PATH", RENDERER_SEARCH_PATH)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timed-out process is abandoned, not waited for.
            .kill_on_drop(true);

        if let Some(config_file) = self.resolver.puppeteer_config() {
            cmd.arg("--puppeteerConfigFile").arg(config_file);
        }
        if let Some(module_path) = self.resolver.auxiliary_module_path() {
            cmd.env("NODE_PATH", module_path);
        }

        let output = tokio::time::timeout(self.config.timeout, cmd.output())
            .await
            .map_err(|_| DiagramError::TimedOut(self.config.timeout))??;

        if !output.status.success() {
            return Err(DiagramError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        tokio::fs::read(&output_path)
            .await
            .map_err(|_| DiagramError::MissingOutput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    /// Resolver returning a fixed command, or none at all.
    struct StaticResolver(Option<RendererCommand>);

    impl PathResolver for StaticResolver {
        fn renderer_command(&self) -> Option<RendererCommand> {
            self.0.clone()
        }
    }

    fn renderer_with(command: Option<RendererCommand>, timeout: Duration) -> DiagramRenderer {
        DiagramRenderer::new(
            Arc::new(StaticResolver(command)),
            DiagramConfig { timeout },
        )
    }

    fn leftover_temp_dirs() -> HashSet<PathBuf> {
        std::fs::read_dir(std::env::temp_dir())
            .unwrap()
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("mdv-diagram-"))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_policy_disabled_falls_back_immediately() {
        let renderer = renderer_with(None, Duration::from_secs(10));
        let outcome = renderer.render("graph TD;\nA-->B;\n").await;
        assert_eq!(
            outcome,
            RenderOutcome::ClientFallback {
                source: "graph TD;\nA-->B;\n".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_binary_falls_back_with_source_verbatim() {
        let renderer = renderer_with(
            Some(RendererCommand::new("/nonexistent/mmdc")),
            Duration::from_secs(10),
        );
        let source = "sequenceDiagram\n  Alice->>Bob: hello\n";
        let outcome = renderer.render(source).await;
        assert_eq!(
            outcome,
            RenderOutcome::ClientFallback {
                source: source.to_owned()
            }
        );
    }

    #[tokio::test]
    async fn test_nonzero_exit_falls_back() {
        let renderer = renderer_with(
            Some(RendererCommand::new("/bin/false")),
            Duration::from_secs(10),
        );
        let outcome = renderer.render("graph TD;").await;
        assert!(matches!(outcome, RenderOutcome::ClientFallback { .. }));
    }

    #[tokio::test]
    async fn test_zero_exit_without_output_artifact_falls_back() {
        let renderer = renderer_with(
            Some(RendererCommand::new("/bin/true")),
            Duration::from_secs(10),
        );
        let outcome = renderer.render("graph TD;").await;
        assert!(matches!(outcome, RenderOutcome::ClientFallback { .. }));
    }

    #[tokio::test]
    async fn test_successful_render_embeds_base64_artifact() {
        // Fake renderer: writes a PNG stand-in to the "-o" argument ($3).
        let command = RendererCommand::new("/bin/sh")
            .with_args(["-c".to_owned(), r#"printf PNG > "$3""#.to_owned()]);
        let renderer = renderer_with(Some(command), Duration::from_secs(10));

        let outcome = renderer.render("graph TD;").await;
        assert_eq!(
            outcome,
            RenderOutcome::Embedded {
                image_base64: "UE5H".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn test_timeout_falls_back_and_leaves_no_temp_files() {
        let before = leftover_temp_dirs();

        let command = RendererCommand::new("/bin/sh")
            .with_args(["-c".to_owned(), "sleep 30".to_owned()]);
        let renderer = renderer_with(Some(command), Duration::from_millis(100));

        let source = "graph TD;\nA-->B;";
        let outcome = renderer.render(source).await;
        assert_eq!(
            outcome,
            RenderOutcome::ClientFallback {
                source: source.to_owned()
            }
        );

        let after = leftover_temp_dirs();
        assert!(
            after.is_subset(&before),
            "timeout must not leave temp artifacts behind"
        );
    }

    #[test]
    fn test_outcome_serde_shape() {
        let embedded = RenderOutcome::Embedded {
            image_base64: "UE5H".to_owned(),
        };
        let json = serde_json::to_string(&embedded).unwrap();
        assert!(json.contains(r#""type":"embedded""#));

        let fallback = RenderOutcome::ClientFallback {
            source: "graph TD;".to_owned(),
        };
        let json = serde_json::to_string(&fallback).unwrap();
        assert!(json.contains(r#""type":"client_fallback""#));
        assert!(json.contains(r#""source":"graph TD;""#));
    }
}
