//! Next.js project configuration utilities
//!
//! This module provides utilities for discovering Next.js projects and for
//! resolving the configuration the route resolver runs with.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::vfs::FileSystem;

/// Base name of the per-route definition file (`routeType.ts` / `routeType.tsx`)
pub const DEFAULT_DEFINITION_BASE: &str = "routeType";

/// App directories probed when no explicit override is given, in priority order
const APP_ROOT_CANDIDATES: &[&str] = &["src/app", "app"];

/// Fully resolved configuration for one resolution call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// App directory relative to the project root, e.g. `src/app`
    pub app_root_dir: String,
    /// Base name of the route-definition file, without extension
    pub definition_base: String,
}

/// Partial user-supplied overrides, merged over the defaults
///
/// Matches the JSON shape used by the editor-facing tooling:
/// `{ "appRootDir": "app", "definitionFileBaseName": "routeType" }`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub app_root_dir: Option<String>,
    pub definition_file_base_name: Option<String>,
}

impl ResolverConfig {
    /// Merge `settings` over the defaults for `project_root`
    ///
    /// The default app directory is the first of `src/app`, `app` that exists
    /// under the project root; when neither exists yet (a project mid-setup)
    /// `src/app` is assumed so callers still get a deterministic path.
    pub fn resolve(project_root: &Path, settings: &Settings, fs: &dyn FileSystem) -> Self {
        let app_root_dir = settings
            .app_root_dir
            .clone()
            .unwrap_or_else(|| default_app_root(project_root, fs).to_string());
        let definition_base = settings
            .definition_file_base_name
            .clone()
            .unwrap_or_else(|| DEFAULT_DEFINITION_BASE.to_string());

        Self {
            app_root_dir,
            definition_base,
        }
    }
}

fn default_app_root(project_root: &Path, fs: &dyn FileSystem) -> &'static str {
    for candidate in APP_ROOT_CANDIDATES {
        if fs.directory_exists(&project_root.join(candidate)) {
            return candidate;
        }
    }
    APP_ROOT_CANDIDATES[0]
}

/// Find the Next.js project root by walking up from a file path
///
/// Looks for Next.js-specific markers:
/// - package.json next to a next.config.js / next.config.mjs / next.config.ts
/// - package.json next to an src/app/ or app/ directory
///
/// Returns None if no project root is found.
pub fn find_project_root(file_path: &Path) -> Option<PathBuf> {
    let mut current = file_path;

    // If it's a file, start from its parent directory
    if current.is_file() {
        current = current.parent()?;
    }

    loop {
        let has_package_json = current.join("package.json").exists();
        let has_next_config = ["next.config.js", "next.config.mjs", "next.config.ts"]
            .iter()
            .any(|name| current.join(name).exists());
        let has_app_dir = APP_ROOT_CANDIDATES
            .iter()
            .any(|dir| current.join(dir).is_dir());

        if has_package_json && has_next_config {
            info!("Found Next.js project root at {:?} (package.json + next.config)", current);
            return Some(current.to_path_buf());
        }

        if has_package_json && has_app_dir {
            info!("Found Next.js project root at {:?} (package.json + app directory)", current);
            return Some(current.to_path_buf());
        }

        current = current.parent()?;
    }
}
