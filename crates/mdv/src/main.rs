//! Thin CLI shell around the preview core.
//!
//! Renders a markdown file to an HTML page and keeps the page up to date
//! while the source changes on disk.
//!
//! # Usage
//!
//! ```bash
//! # Live preview, re-rendered on every change until the file disappears
//! mdv README.md --out preview.html
//!
//! # One-shot render
//! mdv README.md --once
//! ```

mod file_sink;

use clap::Parser;
use file_sink::HtmlFileSink;
use mdv_core::{DefaultPathResolver, DiagramConfig, RenderOptions, RenderPipeline, Session, WatcherConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(name = "mdv", version, disable_version_flag = true)]
struct Args {
    /// Markdown file to preview.
    file: PathBuf,

    /// Where to write the rendered HTML page.
    #[clap(long, default_value = "preview.html")]
    out: PathBuf,

    /// Render once and exit instead of watching for changes.
    #[clap(long)]
    once: bool,

    /// Polling interval for change detection, in milliseconds.
    #[clap(long, default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Skip the external diagram renderer and always use the client-side
    /// fallback.
    #[clap(long)]
    no_server_diagrams: bool,

    /// Bound on one external renderer invocation, in seconds.
    #[clap(long, default_value_t = 10)]
    diagram_timeout_secs: u64,

    /// Print version information.
    #[clap(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: (),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mdv=info".parse()?)
                .add_directive("mdv_core=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let resolver = if args.no_server_diagrams {
        DefaultPathResolver::source().without_server_side_diagrams()
    } else {
        DefaultPathResolver::source()
    };

    let pipeline = RenderPipeline::new(
        Arc::new(resolver),
        DiagramConfig {
            timeout: Duration::from_secs(args.diagram_timeout_secs),
        },
        RenderOptions::default(),
    );
    let watcher_config = WatcherConfig {
        poll_interval: Duration::from_millis(args.poll_interval_ms),
    };
    let sink = HtmlFileSink::new(args.out.clone());
    let mut session = Session::new(sink, pipeline, watcher_config);

    session.load(&args.file).await?;
    tracing::info!(
        file = %args.file.display(),
        out = %args.out.display(),
        "Preview ready"
    );

    if args.once {
        session.unload();
        return Ok(());
    }

    while session.next_change().await {
        tracing::info!(file = %args.file.display(), "File changed, re-rendering");
        session.refresh().await;
    }

    tracing::info!("Watched file disappeared, exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_flag_has_short_form() {
        for flag in ["-v", "--version"] {
            let err = Args::try_parse_from(["mdv", flag]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        }
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["mdv", "README.md"]).unwrap();
        assert_eq!(args.out, PathBuf::from("preview.html"));
        assert_eq!(args.poll_interval_ms, 1000);
        assert_eq!(args.diagram_timeout_secs, 10);
        assert!(!args.once);
        assert!(!args.no_server_diagrams);
    }
}
