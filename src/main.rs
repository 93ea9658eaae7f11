//! Command-line driver: detect the route literal at a cursor offset and
//! resolve it to its route-definition file, reporting the result as JSON.
//!
//! This is a one-shot tool meant for scripting and for debugging resolution
//! behavior on real project trees; editor integration lives elsewhere.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use next_route_nav::config::{self, ResolverConfig, Settings};
use next_route_nav::detector;
use next_route_nav::parser;
use next_route_nav::resolver::{self, ResolutionResult, RouteSegment};
use next_route_nav::vfs::OsFileSystem;

#[derive(Parser, Debug)]
#[command(
    name = "next-route-nav",
    version,
    about = "Resolve the $path route literal at a cursor offset to its routeType file"
)]
struct Cli {
    /// TypeScript/TSX source file containing the $path call
    file: PathBuf,

    /// Byte offset of the cursor inside FILE
    #[arg(short, long)]
    offset: usize,

    /// Project root; discovered by walking up from FILE when omitted
    #[arg(long, value_name = "DIR")]
    project_root: Option<PathBuf>,

    /// JSON file with appRootDir / definitionFileBaseName overrides
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// App directory relative to the project root (overrides settings)
    #[arg(long, value_name = "DIR")]
    app_dir: Option<String>,

    /// Base name of the route-definition file (overrides settings)
    #[arg(long, value_name = "NAME")]
    definition_base: Option<String>,
}

/// JSON report printed on a successful detection
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    route: String,
    span: Span,
    segments: Vec<RouteSegment>,
    direct: ResolutionResult,
    /// Populated only when the direct candidate does not exist and the
    /// grouping-aware search found a definition elsewhere
    grouped: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Span {
    start: usize,
    end: usize,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let tree = parser::parse_source_file(&cli.file, &source)?;

    let Some(literal) = detector::detect(&tree, &source, cli.offset) else {
        // No route literal at this offset; a normal outcome, not an error.
        println!("null");
        return Ok(());
    };

    let project_root = match cli.project_root {
        Some(root) => root,
        None => config::find_project_root(&cli.file).with_context(|| {
            format!(
                "no Next.js project root found above {}; pass --project-root",
                cli.file.display()
            )
        })?,
    };

    let mut settings = load_settings(cli.settings.as_deref())?;
    if cli.app_dir.is_some() {
        settings.app_root_dir = cli.app_dir;
    }
    if cli.definition_base.is_some() {
        settings.definition_file_base_name = cli.definition_base;
    }

    let fs_backend = OsFileSystem;
    let config = ResolverConfig::resolve(&project_root, &settings, &fs_backend);

    let direct = resolver::resolve_direct(&literal.text, &project_root, &config, &fs_backend)
        .context("route produced no candidate paths")?;
    let grouped = if direct.exists {
        None
    } else {
        resolver::resolve_with_groups(&literal.text, &project_root, &config, &fs_backend)
    };

    let report = Report {
        segments: resolver::route_segments(&literal.text),
        span: Span {
            start: literal.start,
            end: literal.end,
        },
        route: literal.text,
        direct,
        grouped,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_settings(path: Option<&std::path::Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid settings JSON in {}", path.display()))
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr; stdout carries only the JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
