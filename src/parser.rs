//! This module provides tree-sitter parsers for TypeScript and TSX files.
//!
//! Tree-sitter parsers convert source code into syntax trees that the
//! detector walks to find `$path({ route: "..." })` call sites.

use std::path::Path;

use tree_sitter::{Language, Parser, Tree};

/// Gets the tree-sitter language definition for TypeScript
pub fn language_typescript() -> Language {
    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
}

/// Gets the tree-sitter language definition for TSX
///
/// TSX is a separate grammar: `<Foo />` is JSX there but a type assertion in
/// plain TypeScript, so the two cannot share a parser.
pub fn language_tsx() -> Language {
    tree_sitter_typescript::LANGUAGE_TSX.into()
}

/// Creates a new tree-sitter parser configured for TypeScript
///
/// A Parser is stateful and not thread-safe, so create one per file
/// you're parsing.
pub fn create_typescript_parser() -> anyhow::Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&language_typescript())
        .map_err(|e| anyhow::anyhow!("Failed to set TypeScript language: {:?}", e))?;
    Ok(parser)
}

/// Creates a new tree-sitter parser configured for TSX
pub fn create_tsx_parser() -> anyhow::Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&language_tsx())
        .map_err(|e| anyhow::anyhow!("Failed to set TSX language: {:?}", e))?;
    Ok(parser)
}

/// Parse TypeScript source code into a syntax tree
pub fn parse_typescript(source: &str) -> anyhow::Result<Tree> {
    let mut parser = create_typescript_parser()?;
    parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse TypeScript source"))
}

/// Parse TSX source code into a syntax tree
pub fn parse_tsx(source: &str) -> anyhow::Result<Tree> {
    let mut parser = create_tsx_parser()?;
    parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse TSX source"))
}

/// Parse a source file with the grammar its extension calls for
///
/// `.tsx` files get the TSX grammar; everything else (`.ts`, `.mts`, `.cts`)
/// gets plain TypeScript.
pub fn parse_source_file(path: &Path, source: &str) -> anyhow::Result<Tree> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("tsx") => parse_tsx(source),
        _ => parse_typescript(source),
    }
}
