//! Node roles and the narrow accessors resolution needs
//!
//! tree-sitter exposes untyped nodes. Resolution only ever cares about a handful
//! of shapes, so each node is classified once into a [`NodeRole`] and read
//! through the accessors below instead of probing kinds ad hoc.

use tree_sitter::Node;

use super::source::SourceFile;
use crate::error::ResolveResult;

/// Syntactic role of a node as far as props resolution is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    ObjectLiteral,
    Reference,
    Assignment,
    VariableDeclarator,
    ImportStatement,
    ExportStatement,
    Spread,
    Pair,
    Other,
}

impl NodeRole {
    pub fn of(node: Node<'_>) -> Self {
        match node.kind() {
            "object" => NodeRole::ObjectLiteral,
            "identifier" => NodeRole::Reference,
            "assignment_expression" => NodeRole::Assignment,
            "variable_declarator" => NodeRole::VariableDeclarator,
            "import_statement" => NodeRole::ImportStatement,
            "export_statement" => NodeRole::ExportStatement,
            "spread_element" => NodeRole::Spread,
            "pair" => NodeRole::Pair,
            _ => NodeRole::Other,
        }
    }
}

/// Expression wrappers that do not change which object is meant
const TRANSPARENT_WRAPPERS: &[&str] = &[
    "parenthesized_expression",
    "as_expression",
    "satisfies_expression",
    "non_null_expression",
];

/// Strip parentheses and TypeScript type assertions around an expression.
pub fn unwrap_transparent(mut node: Node<'_>) -> Node<'_> {
    while TRANSPARENT_WRAPPERS.contains(&node.kind()) {
        match first_named_child(node) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// First named child that is not a comment
pub fn first_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|child| child.kind() != "comment")
}

/// Operand of a spread element (`...operand`)
pub fn spread_operand(spread: Node<'_>) -> Option<Node<'_>> {
    if NodeRole::of(spread) != NodeRole::Spread {
        return None;
    }
    first_named_child(spread).map(unwrap_transparent)
}

/// Initializer of `name = value` inside a declaration
pub fn declarator_initializer(declarator: Node<'_>) -> Option<Node<'_>> {
    declarator
        .child_by_field_name("value")
        .map(unwrap_transparent)
}

/// Right-hand side of an assignment expression
pub fn assignment_rhs(assignment: Node<'_>) -> Option<Node<'_>> {
    assignment
        .child_by_field_name("right")
        .map(unwrap_transparent)
}

/// Variable declarators of a `const`/`let`/`var` statement
pub fn declarators(declaration: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = declaration.walk();
    declaration
        .named_children(&mut cursor)
        .filter(|child| NodeRole::of(*child) == NodeRole::VariableDeclarator)
        .collect()
}

/// True for `const`/`let`/`var` statements
pub fn is_variable_statement(node: Node<'_>) -> bool {
    matches!(node.kind(), "lexical_declaration" | "variable_declaration")
}

/// Name of an object entry key. `None` for computed keys.
pub fn property_key_name(file: &SourceFile, key: Node<'_>) -> ResolveResult<Option<String>> {
    let name = match key.kind() {
        "property_identifier" | "identifier" | "private_property_identifier" | "number" => {
            file.node_text(key)?.to_string()
        }
        "string" => unquote(file.node_text(key)?).to_string(),
        _ => return Ok(None),
    };
    Ok(Some(name))
}

/// Strip one layer of JS string quotes
pub fn unquote(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

/// Nearest ancestor (excluding `node`) matching `pred`
pub fn find_ancestor<'t>(node: Node<'t>, mut pred: impl FnMut(Node<'t>) -> bool) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(candidate) = current {
        if pred(candidate) {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}

/// Pre-order traversal of `root` and all its descendants.
pub fn walk_descendants<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>) -> bool) {
    let mut cursor = root.walk();
    loop {
        if !visit(cursor.node()) {
            return;
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.node() == root {
                return;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// First node in pre-order (excluding `root` itself) matching `pred`
pub fn find_descendant<'t>(root: Node<'t>, mut pred: impl FnMut(Node<'t>) -> bool) -> Option<Node<'t>> {
    let mut found = None;
    walk_descendants(root, |node| {
        if node != root && pred(node) {
            found = Some(node);
            return false;
        }
        true
    });
    found
}
