//! Name resolution within one file
//!
//! Maps an identifier to the statement that binds it by walking enclosing
//! lexical scopes outward. Only the binding forms that can carry a props object
//! are distinguished; everything else resolves to [`Declaration::Other`].

use tree_sitter::Node;

use super::node::{declarators, find_descendant, is_variable_statement, unquote, NodeRole};
use super::source::SourceFile;
use crate::error::ResolveResult;

/// What an import statement binds to a local name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    /// `import local from '...'`
    Default,
    /// `import { imported as local } from '...'`
    Named(String),
    /// `import * as local from '...'`
    Namespace,
}

/// A local name introduced by an import statement
#[derive(Debug, Clone)]
pub struct ImportBinding<'t> {
    pub statement: Node<'t>,
    pub local: String,
    pub kind: ImportKind,
}

/// Declaration site of a referenced name
#[derive(Debug, Clone)]
pub enum Declaration<'t> {
    /// `const name = ...` (or `let`/`var`)
    Variable(Node<'t>),
    /// A name bound by an import statement
    Import(ImportBinding<'t>),
    /// `export const name = ...`
    Export {
        statement: Node<'t>,
        declarator: Node<'t>,
    },
    /// Parameters, functions, classes and anything else
    Other(Node<'t>),
}

const SCOPE_KINDS: &[&str] = &["program", "statement_block", "class_static_block"];

const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "function_expression",
    "function",
    "generator_function",
    "generator_function_declaration",
    "arrow_function",
    "method_definition",
];

/// Resolve `reference` (an identifier) to the declaration binding its name.
pub fn resolve_reference<'t>(
    file: &'t SourceFile,
    reference: Node<'t>,
) -> ResolveResult<Option<Declaration<'t>>> {
    if NodeRole::of(reference) != NodeRole::Reference {
        return Ok(None);
    }
    let name = file.node_text(reference)?;

    let mut current = reference.parent();
    while let Some(scope) = current {
        if FUNCTION_KINDS.contains(&scope.kind()) {
            if let Some(param) = parameter_binding(file, scope, name)? {
                return Ok(Some(Declaration::Other(param)));
            }
        }
        if SCOPE_KINDS.contains(&scope.kind()) {
            let mut cursor = scope.walk();
            for statement in scope.named_children(&mut cursor) {
                if let Some(declaration) = declaration_in_statement(file, statement, name)? {
                    return Ok(Some(declaration));
                }
            }
        }
        current = scope.parent();
    }

    Ok(None)
}

/// First variable declarator named `name` anywhere in the file.
pub fn find_local_variable<'t>(file: &'t SourceFile, name: &str) -> Option<Node<'t>> {
    find_descendant(file.root(), |node| {
        NodeRole::of(node) == NodeRole::VariableDeclarator
            && declarator_name(file, node).ok().flatten() == Some(name)
    })
}

/// Simple identifier name of a declarator. Destructuring patterns yield `None`.
pub fn declarator_name<'t>(file: &'t SourceFile, declarator: Node<'t>) -> ResolveResult<Option<&'t str>> {
    match declarator.child_by_field_name("name") {
        Some(name) if name.kind() == "identifier" => Ok(Some(file.node_text(name)?)),
        _ => Ok(None),
    }
}

fn declaration_in_statement<'t>(
    file: &'t SourceFile,
    statement: Node<'t>,
    name: &str,
) -> ResolveResult<Option<Declaration<'t>>> {
    if is_variable_statement(statement) {
        return Ok(matching_declarator(file, statement, name)?.map(Declaration::Variable));
    }

    match statement.kind() {
        "export_statement" => {
            let Some(declaration) = statement.child_by_field_name("declaration") else {
                return Ok(None);
            };
            if is_variable_statement(declaration) {
                return Ok(matching_declarator(file, declaration, name)?.map(|declarator| {
                    Declaration::Export {
                        statement,
                        declarator,
                    }
                }));
            }
            named_declaration(file, declaration, name)
        }
        "import_statement" => Ok(import_binding(file, statement, name)?.map(Declaration::Import)),
        _ => named_declaration(file, statement, name),
    }
}

fn matching_declarator<'t>(
    file: &'t SourceFile,
    declaration: Node<'t>,
    name: &str,
) -> ResolveResult<Option<Node<'t>>> {
    for declarator in declarators(declaration) {
        if declarator_name(file, declarator)? == Some(name) {
            return Ok(Some(declarator));
        }
    }
    Ok(None)
}

/// `function name() {}` / `class name {}`
fn named_declaration<'t>(
    file: &'t SourceFile,
    statement: Node<'t>,
    name: &str,
) -> ResolveResult<Option<Declaration<'t>>> {
    if !matches!(
        statement.kind(),
        "function_declaration"
            | "generator_function_declaration"
            | "class_declaration"
            | "abstract_class_declaration"
    ) {
        return Ok(None);
    }
    match statement.child_by_field_name("name") {
        Some(id) if file.node_text(id)? == name => Ok(Some(Declaration::Other(statement))),
        _ => Ok(None),
    }
}

fn import_binding<'t>(
    file: &'t SourceFile,
    statement: Node<'t>,
    name: &str,
) -> ResolveResult<Option<ImportBinding<'t>>> {
    let clause = {
        let mut cursor = statement.walk();
        statement
            .named_children(&mut cursor)
            .find(|c| c.kind() == "import_clause")
    };
    let Some(clause) = clause else {
        return Ok(None);
    };

    let binding = |kind| ImportBinding {
        statement,
        local: name.to_string(),
        kind,
    };

    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        match child.kind() {
            "identifier" if file.node_text(child)? == name => {
                return Ok(Some(binding(ImportKind::Default)));
            }
            "named_imports" => {
                let mut inner = child.walk();
                for specifier in child.named_children(&mut inner) {
                    if specifier.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(imported) = specifier.child_by_field_name("name") else {
                        continue;
                    };
                    let imported = unquote(file.node_text(imported)?);
                    let local = match specifier.child_by_field_name("alias") {
                        Some(alias) => file.node_text(alias)?,
                        None => imported,
                    };
                    if local == name {
                        let kind = if imported == "default" {
                            ImportKind::Default
                        } else {
                            ImportKind::Named(imported.to_string())
                        };
                        return Ok(Some(binding(kind)));
                    }
                }
            }
            "namespace_import" => {
                let mut inner = child.walk();
                let bound = child
                    .named_children(&mut inner)
                    .find(|n| n.kind() == "identifier");
                if let Some(id) = bound {
                    if file.node_text(id)? == name {
                        return Ok(Some(binding(ImportKind::Namespace)));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(None)
}

/// Parameter of `function` binding `name`, if any
fn parameter_binding<'t>(
    file: &'t SourceFile,
    function: Node<'t>,
    name: &str,
) -> ResolveResult<Option<Node<'t>>> {
    // `x => ...` has a bare identifier parameter
    if let Some(param) = function.child_by_field_name("parameter") {
        if param.kind() == "identifier" && file.node_text(param)? == name {
            return Ok(Some(param));
        }
    }
    let Some(params) = function.child_by_field_name("parameters") else {
        return Ok(None);
    };
    let mut found = None;
    let mut failure = None;
    super::node::walk_descendants(params, |node| {
        if node.kind() == "identifier" {
            match file.node_text(node) {
                Ok(text) if text == name => {
                    found = Some(node);
                    return false;
                }
                Ok(_) => {}
                Err(e) => {
                    failure = Some(e);
                    return false;
                }
            }
        }
        true
    });
    match failure {
        Some(e) => Err(e),
        None => Ok(found),
    }
}
