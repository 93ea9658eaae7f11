//! Route-usage detection at a cursor position
//!
//! Given a parsed syntax tree and a byte offset, this module decides whether
//! the offset sits inside the route literal of a `$path({ route: "/..." })`
//! call and, if so, extracts the literal text and its source span.
//!
//! Absence of a match is the common case (most cursor positions in a file are
//! not on a route literal), so every rejection path returns `None` and the
//! detector never errors.

use tree_sitter::{Node, Tree};

/// The callee name that marks a route-literal call site
///
/// Both `$path(...)` and `routes.$path(...)` (namespaced or aliased imports)
/// qualify.
const PATH_HELPER: &str = "$path";

/// The property name a route literal must be bound to
const ROUTE_PROPERTY: &str = "route";

/// A route literal found at the cursor position
///
/// `text` is the unquoted string value and always begins with `/`.
/// `start` and `end` are byte offsets into the source that include both quote
/// characters, so `&source[start..end]` reproduces the literal exactly as
/// written. Produced fresh per detection call, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLiteral {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// The node kinds the detector distinguishes
///
/// Everything else in the grammar is `Other`; the detector only ever needs
/// this closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeClass {
    StringLiteral,
    /// Content inside a string literal (fragment or escape sequence)
    StringContent,
    PropertyBinding,
    CallExpression,
    MemberAccess,
    Identifier,
    Other,
}

fn classify(node: &Node) -> NodeClass {
    match node.kind() {
        "string" => NodeClass::StringLiteral,
        "string_fragment" | "escape_sequence" => NodeClass::StringContent,
        "pair" => NodeClass::PropertyBinding,
        "call_expression" => NodeClass::CallExpression,
        "member_expression" => NodeClass::MemberAccess,
        "identifier" => NodeClass::Identifier,
        _ => NodeClass::Other,
    }
}

// ============================================================================
// Detection
// ============================================================================

/// Find the route literal at `offset`, if any
///
/// `offset` is a byte offset into `source`; out-of-range offsets yield `None`.
/// A hit requires all of:
/// - the offset lies inside a string literal (the opening quote counts),
/// - the literal is the value of a property binding named `route`,
/// - an enclosing call expression's callee is `$path`, either as a bare
///   identifier or as the accessed member,
/// - the literal text starts with `/`.
pub fn detect(tree: &Tree, source: &str, offset: usize) -> Option<RouteLiteral> {
    let node = innermost_node_at(tree.root_node(), offset)?;
    let literal = enclosing_string_literal(node)?;

    let binding = literal.parent()?;
    if !is_route_binding(&binding, &literal, source) {
        return None;
    }

    if !has_path_call_ancestor(literal, source) {
        return None;
    }

    let text = unquoted_text(&literal, source)?;
    if !text.starts_with('/') {
        // Non-absolute route strings are silently ignored; this is a
        // heuristic filter, not a validator.
        return None;
    }

    Some(RouteLiteral {
        text: text.to_string(),
        start: literal.start_byte(),
        end: literal.end_byte(),
    })
}

/// Descend to the innermost node whose span contains `offset`
///
/// Containment is `start <= offset < end`, so a cursor sitting on a node's
/// first byte (e.g. a string's opening quote) belongs to that node. The
/// descent considers anonymous tokens too; `enclosing_string_literal`
/// normalizes those afterwards.
fn innermost_node_at(root: Node, offset: usize) -> Option<Node> {
    if offset < root.start_byte() || offset >= root.end_byte() {
        return None;
    }

    let mut node = root;
    loop {
        let mut cursor = node.walk();
        let next = node
            .children(&mut cursor)
            .find(|child| child.start_byte() <= offset && offset < child.end_byte());
        match next {
            Some(child) => node = child,
            None => return Some(node),
        }
    }
}

/// Normalize a node to the string literal it belongs to
///
/// The innermost node at a cursor inside a string is a fragment, an escape
/// sequence, or one of the quote tokens; all of those belong to the `string`
/// node one level up. Anything that is not part of a string literal is
/// rejected (template strings included).
fn enclosing_string_literal(node: Node) -> Option<Node> {
    let mut current = node;
    loop {
        match classify(&current) {
            NodeClass::StringLiteral => return Some(current),
            NodeClass::StringContent => current = current.parent()?,
            // Anonymous tokens (quotes) sit directly under their literal
            _ if !current.is_named() => current = current.parent()?,
            _ => return None,
        }
    }
}

/// Check that `literal` is the value of a property binding named `route`
///
/// No other property names qualify, even semantically similar ones
/// (`path`, `url`). Cursor positions on the key itself never reach this
/// check since the key is not a string literal.
fn is_route_binding(binding: &Node, literal: &Node, source: &str) -> bool {
    if classify(binding) != NodeClass::PropertyBinding {
        return false;
    }

    let is_value = binding
        .child_by_field_name("value")
        .map_or(false, |value| value.id() == literal.id());
    if !is_value {
        return false;
    }

    binding.child_by_field_name("key").map_or(false, |key| {
        classify(&key) != NodeClass::StringLiteral && node_text(&key, source) == Some(ROUTE_PROPERTY)
    })
}

/// Walk the ancestor chain looking for an enclosing `$path(...)` call
///
/// The walk is iterative and unbounded: a literal nested inside extra
/// parentheses or spread across multiple lines is still found. It terminates
/// at the tree root.
fn has_path_call_ancestor(start: Node, source: &str) -> bool {
    let mut current = start.parent();
    while let Some(node) = current {
        if classify(&node) == NodeClass::CallExpression {
            if let Some(callee) = node.child_by_field_name("function") {
                if callee_is_path_helper(&callee, source) {
                    return true;
                }
            }
        }
        current = node.parent();
    }
    false
}

fn callee_is_path_helper(callee: &Node, source: &str) -> bool {
    match classify(callee) {
        NodeClass::Identifier => node_text(callee, source) == Some(PATH_HELPER),
        NodeClass::MemberAccess => callee
            .child_by_field_name("property")
            .map_or(false, |property| node_text(&property, source) == Some(PATH_HELPER)),
        _ => false,
    }
}

/// The literal's source text with the delimiting quotes stripped
fn unquoted_text<'a>(literal: &Node, source: &'a str) -> Option<&'a str> {
    let start = literal.start_byte();
    let end = literal.end_byte();
    if end < start + 2 {
        return None;
    }
    source.get(start + 1..end - 1)
}

fn node_text<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    source.get(node.start_byte()..node.end_byte())
}
