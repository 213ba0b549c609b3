//! Export and import statement inspection
//!
//! Pure syntax helpers: they find the statement or expression a module
//! exports under some name, and the source path of an import. Following
//! references and crossing files is left to the resolver.

use regex::Regex;
use std::sync::LazyLock;
use tree_sitter::Node;

use crate::error::ResolveResult;
use crate::parsing::node::{declarators, find_descendant, first_named_child, unquote, unwrap_transparent, NodeRole};
use crate::parsing::scope::declarator_name;
use crate::parsing::SourceFile;

static FROM_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"from\s+['"](.+?)['"]"#).expect("valid from clause regex"));

/// Name under which the default export is exported
pub const DEFAULT_EXPORT: &str = "default";

/// What a module exports under one name
#[derive(Debug, Clone)]
pub enum ExportTarget<'t> {
    /// An expression or declarator of this file
    Local(Node<'t>),
    /// `export { name } from 'source'`
    ReExport { source: String, name: String },
}

/// Source path of an import (or re-export) statement, quotes removed.
pub fn import_source(file: &SourceFile, statement: Node<'_>) -> ResolveResult<Option<String>> {
    let text = file.node_text(statement)?;
    if let Some(path) = FROM_CLAUSE.captures(text).and_then(|c| c.get(1)) {
        return Ok(Some(path.as_str().to_string()));
    }
    match statement.child_by_field_name("source") {
        Some(source) => Ok(Some(unquote(file.node_text(source)?).to_string())),
        None => Ok(None),
    }
}

/// True for `export default ...` and `export { x as default }`, or, failing
/// a structural match, for an export whose text reads `export default`.
pub fn is_default_export(file: &SourceFile, statement: Node<'_>) -> ResolveResult<bool> {
    Ok(is_structural_default(file, statement)? || is_textual_default(file, statement)?)
}

fn is_structural_default(file: &SourceFile, statement: Node<'_>) -> ResolveResult<bool> {
    if NodeRole::of(statement) != NodeRole::ExportStatement {
        return Ok(false);
    }
    let mut cursor = statement.walk();
    if statement
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == DEFAULT_EXPORT)
    {
        return Ok(true);
    }
    Ok(clause_specifier(file, statement, DEFAULT_EXPORT)?.is_some())
}

fn is_textual_default(file: &SourceFile, statement: Node<'_>) -> ResolveResult<bool> {
    Ok(NodeRole::of(statement) == NodeRole::ExportStatement
        && export_clause(statement).is_none()
        && file.node_text(statement)?.contains("export default"))
}

/// The module's default export, if it has one. Every export is checked
/// structurally before the textual signal is consulted.
pub fn find_default_export<'t>(file: &'t SourceFile) -> ResolveResult<Option<ExportTarget<'t>>> {
    let exports = top_level_exports(file);
    for statement in &exports {
        if is_structural_default(file, *statement)? {
            return default_target(file, *statement);
        }
    }
    for statement in &exports {
        if is_textual_default(file, *statement)? {
            return default_target(file, *statement);
        }
    }
    Ok(None)
}

fn default_target<'t>(file: &'t SourceFile, statement: Node<'t>) -> ResolveResult<Option<ExportTarget<'t>>> {
    if let Some(target) = clause_target(file, statement, DEFAULT_EXPORT)? {
        return Ok(Some(target));
    }
    Ok(export_payload(statement).map(ExportTarget::Local))
}

/// The export named `name` (`export const name = ...`, `export { local as name }`).
pub fn find_named_export<'t>(file: &'t SourceFile, name: &str) -> ResolveResult<Option<ExportTarget<'t>>> {
    for statement in top_level_exports(file) {
        if let Some(declaration) = statement.child_by_field_name("declaration") {
            for declarator in declarators(declaration) {
                if declarator_name(file, declarator)? == Some(name) {
                    return Ok(Some(ExportTarget::Local(declarator)));
                }
            }
            continue;
        }
        if let Some(target) = clause_target(file, statement, name)? {
            return Ok(Some(target));
        }
    }
    Ok(None)
}

/// The value carried by an export statement: the exported expression, the
/// first declarator of an exported declaration, or failing both the first
/// object literal, reference or declarator found inside the statement.
pub fn export_payload(statement: Node<'_>) -> Option<Node<'_>> {
    if let Some(value) = statement.child_by_field_name("value") {
        return Some(unwrap_transparent(value));
    }
    if let Some(declaration) = statement.child_by_field_name("declaration") {
        return Some(declarators(declaration).into_iter().next().unwrap_or(declaration));
    }

    let is_payload = |node: Node<'_>| {
        matches!(
            NodeRole::of(node),
            NodeRole::ObjectLiteral | NodeRole::Reference | NodeRole::VariableDeclarator
        )
    };
    let mut cursor = statement.walk();
    let direct = statement
        .named_children(&mut cursor)
        .map(unwrap_transparent)
        .find(|child| is_payload(*child));
    direct.or_else(|| find_descendant(statement, is_payload))
}

fn top_level_exports(file: &SourceFile) -> Vec<Node<'_>> {
    let root = file.root();
    let mut cursor = root.walk();
    root.named_children(&mut cursor)
        .filter(|node| NodeRole::of(*node) == NodeRole::ExportStatement)
        .collect()
}

fn export_clause(statement: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = statement.walk();
    statement
        .named_children(&mut cursor)
        .find(|child| child.kind() == "export_clause")
}

/// Specifier of `statement`'s export clause exported as `exported`
fn clause_specifier<'t>(
    file: &'t SourceFile,
    statement: Node<'t>,
    exported: &str,
) -> ResolveResult<Option<Node<'t>>> {
    let Some(clause) = export_clause(statement) else {
        return Ok(None);
    };
    let mut cursor = clause.walk();
    for specifier in clause.named_children(&mut cursor) {
        if specifier.kind() != "export_specifier" {
            continue;
        }
        let Some(local) = specifier.child_by_field_name("name") else {
            continue;
        };
        let public = specifier.child_by_field_name("alias").unwrap_or(local);
        if unquote(file.node_text(public)?) == exported {
            return Ok(Some(specifier));
        }
    }
    Ok(None)
}

/// Target of an export clause entry exported as `exported`
fn clause_target<'t>(
    file: &'t SourceFile,
    statement: Node<'t>,
    exported: &str,
) -> ResolveResult<Option<ExportTarget<'t>>> {
    let Some(specifier) = clause_specifier(file, statement, exported)? else {
        return Ok(None);
    };
    let Some(local) = specifier.child_by_field_name("name") else {
        return Ok(None);
    };

    if statement.child_by_field_name("source").is_some() {
        let Some(source) = import_source(file, statement)? else {
            return Ok(None);
        };
        return Ok(Some(ExportTarget::ReExport {
            source,
            name: unquote(file.node_text(local)?).to_string(),
        }));
    }

    Ok(first_named_child(specifier)
        .filter(|n| NodeRole::of(*n) == NodeRole::Reference)
        .map(ExportTarget::Local))
}
