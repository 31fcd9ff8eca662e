//! Runtime path resolution for the external diagram renderer toolchain.
//!
//! A packaged build ships its own copy of mermaid-cli under the resource
//! directory and drives it through the system `node`, while a source run
//! expects `mmdc` on the caller's PATH. The rest of the crate only sees the
//! [`PathResolver`] trait, so that branching never leaks into the pipeline.

use std::path::PathBuf;

/// Invocation for the external diagram renderer, before per-call arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererCommand {
    /// Executable to run (`mmdc` or `node`).
    pub program: PathBuf,
    /// Leading arguments (the bundled cli.js in packaged mode).
    pub args: Vec<String>,
}

impl RendererCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args = args.into_iter().collect();
        self
    }
}

/// Resolves logical asset names to filesystem locations for the current
/// runtime mode.
pub trait PathResolver: Send + Sync {
    /// The renderer invocation, or `None` when server-side diagram rendering
    /// is disabled by policy. `None` is a deliberate switch, not a failure.
    fn renderer_command(&self) -> Option<RendererCommand>;

    /// Module search path handed to the renderer process as `NODE_PATH`.
    fn auxiliary_module_path(&self) -> Option<PathBuf> {
        None
    }

    /// Puppeteer configuration file passed through to mermaid-cli, if present.
    fn puppeteer_config(&self) -> Option<PathBuf> {
        None
    }

    /// Local copy of the mermaid client script for the deferred fallback
    /// rendering. When absent the page falls back to the remote location.
    fn local_mermaid_script(&self) -> Option<PathBuf> {
        None
    }
}

/// How the application is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    /// Running from a source checkout; tools come from the environment.
    Source,
    /// Running as a packaged bundle with its own resource directory.
    Packaged,
}

/// Default resolver covering both runtime modes.
pub struct DefaultPathResolver {
    mode: RuntimeMode,
    resource_dir: Option<PathBuf>,
    server_side_diagrams: bool,
}

impl DefaultPathResolver {
    /// Resolver for a source run: `mmdc` from the environment.
    pub fn source() -> Self {
        Self {
            mode: RuntimeMode::Source,
            resource_dir: None,
            server_side_diagrams: true,
        }
    }

    /// Resolver for a packaged run with the given resource directory.
    pub fn packaged(resource_dir: PathBuf) -> Self {
        Self {
            mode: RuntimeMode::Packaged,
            resource_dir: Some(resource_dir),
            server_side_diagrams: true,
        }
    }

    /// Disable server-side diagram rendering; every diagram block degrades to
    /// the client-side fallback without invoking any process.
    pub fn without_server_side_diagrams(mut self) -> Self {
        self.server_side_diagrams = false;
        self
    }

    fn existing(path: PathBuf) -> Option<PathBuf> {
        path.exists().then_some(path)
    }
}

impl PathResolver for DefaultPathResolver {
    fn renderer_command(&self) -> Option<RendererCommand> {
        if !self.server_side_diagrams {
            return None;
        }
        match self.mode {
            RuntimeMode::Source => {
                // Prefer a resolved absolute path; fall back to PATH lookup at
                // spawn time, which then fails over to the client fallback.
                let program = which::which("mmdc").unwrap_or_else(|_| PathBuf::from("mmdc"));
                Some(RendererCommand::new(program))
            }
            RuntimeMode::Packaged => {
                let resources = self.resource_dir.as_ref()?;
                let cli_script = resources
                    .join("node_modules")
                    .join("@mermaid-js")
                    .join("mermaid-cli")
                    .join("src")
                    .join("cli.js");
                let node = which::which("node").unwrap_or_else(|_| PathBuf::from("node"));
                Some(
                    RendererCommand::new(node)
                        .with_args([cli_script.to_string_lossy().into_owned()]),
                )
            }
        }
    }

    fn auxiliary_module_path(&self) -> Option<PathBuf> {
        match self.mode {
            RuntimeMode::Source => None,
            RuntimeMode::Packaged => self
                .resource_dir
                .as_ref()
                .map(|resources| resources.join("node_modules")),
        }
    }

    fn puppeteer_config(&self) -> Option<PathBuf> {
        let candidate = match self.mode {
            RuntimeMode::Source => std::env::current_dir().ok()?.join("puppeteer-config.json"),
            RuntimeMode::Packaged => self.resource_dir.as_ref()?.join("puppeteer-config.json"),
        };
        Self::existing(candidate)
    }

    fn local_mermaid_script(&self) -> Option<PathBuf> {
        match self.mode {
            RuntimeMode::Source => None,
            RuntimeMode::Packaged => self
                .resource_dir
                .as_ref()
                .and_then(|resources| Self::existing(resources.join("mermaid.min.js"))),
        }
    }
}
