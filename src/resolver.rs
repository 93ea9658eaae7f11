//! Route-to-path resolution
//!
//! Maps a route string like `/users/[id]` onto the file that declares that
//! route's parameter schema (`routeType.ts` by default), located by the
//! Next.js app-router filesystem convention. Bracketed directory names are
//! used verbatim: `[id]` in the URL *is* the directory name on disk.
//!
//! Route groups (`(auth)`) complicate the mapping: they exist on disk but are
//! invisible in the URL, can appear at any depth, and can nest. Direct
//! resolution is tried first; the grouping-aware search is the fallback.
//!
//! Both entry points are total over well-formed input. A route with no
//! definition file is a normal outcome (the project may be mid-edit), never
//! an error.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::ResolverConfig;
use crate::vfs::FileSystem;

/// Candidate extensions for the definition file, in priority order
const DEFINITION_EXTENSIONS: &[&str] = &["ts", "tsx"];

/// URL-escaped underscore, used for private folders (`_internal`)
///
/// A literal leading underscore marks a folder private to the router, so it
/// can never appear in a URL segment; `%5F` is the convention for routes that
/// genuinely target such a folder. No other percent-decoding is performed.
const ESCAPED_UNDERSCORE: &str = "%5F";

/// Outcome of direct resolution
///
/// `file_path` is always populated, even when `exists` is false, so a caller
/// can still offer a "create this file" action at a deterministic path.
/// `exists` is a filesystem fact observed at resolution time, not cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub file_path: PathBuf,
    pub exists: bool,
}

/// One path component of a parsed route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSegment {
    pub text: String,
    pub kind: SegmentKind,
}

/// Lexical classification of a route segment
///
/// Informational only: path construction always uses the bracketed text
/// verbatim, since the directory name on disk is the bracketed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    Static,
    Dynamic,
    CatchAll,
    OptionalCatchAll,
}

impl SegmentKind {
    pub fn classify(segment: &str) -> SegmentKind {
        if segment.starts_with("[[...") && segment.ends_with("]]") {
            SegmentKind::OptionalCatchAll
        } else if segment.starts_with("[...") && segment.ends_with(']') {
            SegmentKind::CatchAll
        } else if segment.starts_with('[') && segment.ends_with(']') {
            SegmentKind::Dynamic
        } else {
            SegmentKind::Static
        }
    }
}

// ============================================================================
// Segment parsing
// ============================================================================

/// Split a route into its decoded segments
///
/// The leading `/` is stripped, empty components are discarded (so `/` yields
/// no segments and `/a//b` yields `a`, `b`), and `%5F` decodes to `_`.
pub fn parse_segments(route: &str) -> Vec<String> {
    route
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace(ESCAPED_UNDERSCORE, "_"))
        .collect()
}

/// Parse a route into classified segments
pub fn route_segments(route: &str) -> Vec<RouteSegment> {
    parse_segments(route)
        .into_iter()
        .map(|text| RouteSegment {
            kind: SegmentKind::classify(&text),
            text,
        })
        .collect()
}

// ============================================================================
// Contract A: direct resolution
// ============================================================================

/// Resolve a route assuming a segment-for-directory mapping
///
/// The candidate directory is `project_root / app_root_dir / segments…`; the
/// candidate files inside it are `{base}.ts` then `{base}.tsx`. The first
/// candidate that exists wins; when none exists the `.ts` candidate is
/// returned with `exists = false`. Candidate construction is deterministic
/// and independent of filesystem state.
pub fn resolve_direct(
    route: &str,
    project_root: &Path,
    config: &ResolverConfig,
    fs: &dyn FileSystem,
) -> Option<ResolutionResult> {
    let mut dir = project_root.join(&config.app_root_dir);
    for segment in parse_segments(route) {
        dir.push(segment);
    }

    let candidates: Vec<PathBuf> = DEFINITION_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", config.definition_base, ext)))
        .collect();

    for candidate in &candidates {
        if fs.file_exists(candidate) {
            debug!("route {:?} resolved directly to {:?}", route, candidate);
            return Some(ResolutionResult {
                file_path: candidate.clone(),
                exists: true,
            });
        }
    }

    candidates.into_iter().next().map(|file_path| {
        trace!("route {:?} has no direct definition at {:?}", route, file_path);
        ResolutionResult {
            file_path,
            exists: false,
        }
    })
}

// ============================================================================
// Contract B: grouping-aware resolution
// ============================================================================

/// Resolve a route searching through route-group directories
///
/// Fallback for when direct resolution finds nothing: group directories
/// (`(auth)`) participate in the file tree but contribute no URL segment, so
/// the definition file can sit below any combination of them. Depth-first,
/// first match wins.
pub fn resolve_with_groups(
    route: &str,
    project_root: &Path,
    config: &ResolverConfig,
    fs: &dyn FileSystem,
) -> Option<PathBuf> {
    let start = project_root.join(&config.app_root_dir);
    let segments = parse_segments(route);
    let found = search_with_groups(&start, &segments, config, fs);
    match &found {
        Some(path) => debug!("route {:?} resolved through groups to {:?}", route, path),
        None => trace!("route {:?} not found under {:?}", route, start),
    }
    found
}

/// Recursive descent over `(directory, remaining segments)`
///
/// Each step either consumes the head segment (literal child directory) or
/// descends into a group directory with the segment list unconsumed, so the
/// recursion is bounded by segment count plus group nesting depth.
fn search_with_groups(
    dir: &Path,
    segments: &[String],
    config: &ResolverConfig,
    fs: &dyn FileSystem,
) -> Option<PathBuf> {
    let Some((head, rest)) = segments.split_first() else {
        // All URL segments consumed: this directory either holds the
        // definition file or this branch is a dead end.
        for ext in DEFINITION_EXTENSIONS {
            let candidate = dir.join(format!("{}.{}", config.definition_base, ext));
            if fs.file_exists(&candidate) {
                return Some(candidate);
            }
        }
        return None;
    };

    let literal = dir.join(head);
    if fs.directory_exists(&literal) {
        if let Some(found) = search_with_groups(&literal, rest, config, fs) {
            return Some(found);
        }
    }

    // A failed listing (missing directory, permissions) degrades to "no
    // group directories here"; it must not abort the whole resolution.
    let entries = fs.list_subdirectories(dir).unwrap_or_else(|err| {
        trace!("treating unlistable directory as empty: {}", err);
        Vec::new()
    });

    for name in entries {
        if !is_group_directory(&name) {
            continue;
        }
        trace!("descending into group {:?} with {:?} unconsumed", name, segments);
        if let Some(found) = search_with_groups(&dir.join(&name), segments, config, fs) {
            return Some(found);
        }
    }

    None
}

/// Whether a directory name is a route group (`(auth)`)
///
/// A group name is fully wrapped in one pair of parentheses with non-empty
/// interior content.
fn is_group_directory(name: &str) -> bool {
    name.len() > 2 && name.starts_with('(') && name.ends_with(')')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{ListDirError, MemoryFileSystem};

    fn config() -> ResolverConfig {
        ResolverConfig {
            app_root_dir: "src/app".to_string(),
            definition_base: "routeType".to_string(),
        }
    }

    fn root() -> PathBuf {
        PathBuf::from("/project")
    }

    #[test]
    fn test_parse_segments_root_route_is_empty() {
        assert!(parse_segments("/").is_empty());
    }

    #[test]
    fn test_parse_segments_discards_empty_components() {
        assert_eq!(parse_segments("/a//b"), vec!["a", "b"]);
        assert_eq!(parse_segments("/a/b/"), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_segments_decodes_escaped_underscore() {
        assert_eq!(parse_segments("/%5Finternal"), vec!["_internal"]);
        assert_eq!(parse_segments("/%5F%5Fdbl"), vec!["__dbl"]);
        // Only %5F is decoded; other escapes pass through untouched
        assert_eq!(parse_segments("/a%20b"), vec!["a%20b"]);
    }

    #[test]
    fn test_segment_kind_classification() {
        assert_eq!(SegmentKind::classify("users"), SegmentKind::Static);
        assert_eq!(SegmentKind::classify("[id]"), SegmentKind::Dynamic);
        assert_eq!(SegmentKind::classify("[...slug]"), SegmentKind::CatchAll);
        assert_eq!(SegmentKind::classify("[[...slug]]"), SegmentKind::OptionalCatchAll);
    }

    #[test]
    fn test_group_directory_pattern() {
        assert!(is_group_directory("(auth)"));
        assert!(is_group_directory("(marketing-2024)"));
        assert!(!is_group_directory("auth"));
        assert!(!is_group_directory("()"));
        assert!(!is_group_directory("(auth"));
        assert!(!is_group_directory("[id]"));
    }

    #[test]
    fn test_direct_root_route_targets_app_root() {
        let fs = MemoryFileSystem::new();
        let result = resolve_direct("/", &root(), &config(), &fs).unwrap();
        assert_eq!(result.file_path, PathBuf::from("/project/src/app/routeType.ts"));
        assert!(!result.exists);
    }

    #[test]
    fn test_direct_hit_on_dynamic_route() {
        let mut fs = MemoryFileSystem::new();
        fs.add_file("/project/src/app/users/[id]/routeType.ts");

        let result = resolve_direct("/users/[id]", &root(), &config(), &fs).unwrap();
        assert_eq!(
            result.file_path,
            PathBuf::from("/project/src/app/users/[id]/routeType.ts")
        );
        assert!(result.exists);
    }

    #[test]
    fn test_direct_prefers_ts_over_tsx() {
        let mut fs = MemoryFileSystem::new();
        fs.add_file("/project/src/app/users/routeType.ts");
        fs.add_file("/project/src/app/users/routeType.tsx");

        let result = resolve_direct("/users", &root(), &config(), &fs).unwrap();
        assert!(result.file_path.ends_with("routeType.ts"));
        assert!(result.exists);
    }

    #[test]
    fn test_direct_falls_back_to_tsx() {
        let mut fs = MemoryFileSystem::new();
        fs.add_file("/project/src/app/users/routeType.tsx");

        let result = resolve_direct("/users", &root(), &config(), &fs).unwrap();
        assert!(result.file_path.ends_with("routeType.tsx"));
        assert!(result.exists);
    }

    #[test]
    fn test_direct_path_construction_ignores_filesystem_state() {
        let empty = MemoryFileSystem::new();
        let mut populated = MemoryFileSystem::new();
        populated.add_file("/project/src/app/users/routeType.ts");

        let missing = resolve_direct("/users", &root(), &config(), &empty).unwrap();
        let present = resolve_direct("/users", &root(), &config(), &populated).unwrap();
        assert_eq!(missing.file_path, present.file_path);
        assert!(!missing.exists);
        assert!(present.exists);
    }

    #[test]
    fn test_direct_resolves_private_folder_escape() {
        let mut fs = MemoryFileSystem::new();
        fs.add_file("/project/src/app/_internal/routeType.ts");

        let result = resolve_direct("/%5Finternal", &root(), &config(), &fs).unwrap();
        assert!(result.exists);
    }

    #[test]
    fn test_groups_finds_route_under_single_group() {
        let mut fs = MemoryFileSystem::new();
        fs.add_file("/project/src/app/(auth)/login/routeType.ts");

        let direct = resolve_direct("/login", &root(), &config(), &fs).unwrap();
        assert!(!direct.exists);

        let found = resolve_with_groups("/login", &root(), &config(), &fs).unwrap();
        assert_eq!(
            found,
            PathBuf::from("/project/src/app/(auth)/login/routeType.ts")
        );
    }

    #[test]
    fn test_groups_finds_route_under_nested_groups() {
        let mut fs = MemoryFileSystem::new();
        fs.add_file("/project/src/app/(a)/(b)/users/routeType.ts");

        let found = resolve_with_groups("/users", &root(), &config(), &fs).unwrap();
        assert_eq!(
            found,
            PathBuf::from("/project/src/app/(a)/(b)/users/routeType.ts")
        );
    }

    #[test]
    fn test_groups_interposed_mid_route() {
        let mut fs = MemoryFileSystem::new();
        fs.add_file("/project/src/app/docs/(versioned)/v2/routeType.ts");

        let found = resolve_with_groups("/docs/v2", &root(), &config(), &fs).unwrap();
        assert_eq!(
            found,
            PathBuf::from("/project/src/app/docs/(versioned)/v2/routeType.ts")
        );
    }

    #[test]
    fn test_groups_root_route_under_group() {
        let mut fs = MemoryFileSystem::new();
        fs.add_file("/project/src/app/(home)/routeType.ts");

        let found = resolve_with_groups("/", &root(), &config(), &fs).unwrap();
        assert_eq!(found, PathBuf::from("/project/src/app/(home)/routeType.ts"));
    }

    #[test]
    fn test_groups_prefer_literal_directory_over_group() {
        let mut fs = MemoryFileSystem::new();
        fs.add_file("/project/src/app/users/routeType.ts");
        fs.add_file("/project/src/app/(misc)/users/routeType.ts");

        let found = resolve_with_groups("/users", &root(), &config(), &fs).unwrap();
        assert_eq!(found, PathBuf::from("/project/src/app/users/routeType.ts"));
    }

    #[test]
    fn test_groups_backtrack_past_dead_end_literal() {
        // `settings` exists as a plain directory but holds no definition
        // file; the match is under a sibling group.
        let mut fs = MemoryFileSystem::new();
        fs.add_directory("/project/src/app/settings");
        fs.add_file("/project/src/app/(user)/settings/routeType.ts");

        let found = resolve_with_groups("/settings", &root(), &config(), &fs).unwrap();
        assert_eq!(
            found,
            PathBuf::from("/project/src/app/(user)/settings/routeType.ts")
        );
    }

    #[test]
    fn test_groups_returns_none_when_nothing_matches() {
        let mut fs = MemoryFileSystem::new();
        fs.add_directory("/project/src/app");

        assert_eq!(resolve_with_groups("/missing", &root(), &config(), &fs), None);
    }

    #[test]
    fn test_groups_prefers_ts_over_tsx() {
        let mut fs = MemoryFileSystem::new();
        fs.add_file("/project/src/app/(auth)/login/routeType.ts");
        fs.add_file("/project/src/app/(auth)/login/routeType.tsx");

        let found = resolve_with_groups("/login", &root(), &config(), &fs).unwrap();
        assert!(found.ends_with("routeType.ts"));
    }

    /// A filesystem whose directory listings always fail
    struct UnlistableFileSystem;

    impl FileSystem for UnlistableFileSystem {
        fn file_exists(&self, _path: &Path) -> bool {
            false
        }

        fn directory_exists(&self, _path: &Path) -> bool {
            false
        }

        fn list_subdirectories(&self, path: &Path) -> Result<Vec<String>, ListDirError> {
            Err(ListDirError {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        }
    }

    #[test]
    fn test_groups_treat_listing_failure_as_empty() {
        let fs = UnlistableFileSystem;
        assert_eq!(resolve_with_groups("/users", &root(), &config(), &fs), None);
    }
}
