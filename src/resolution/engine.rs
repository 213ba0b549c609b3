//! Props extraction engine
//!
//! Starting from the operand of a spread, the engine finds the object literal
//! being merged in (directly, through local variables, through imports and
//! exports in other files) and turns its entries into [`PropInfo`] values.
//!
//! Every recursive step checks the host's cancellation signal. A failure
//! while extracting a single entry drops only that entry; cancellation always
//! reaches the caller.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tree_sitter::Node;

use super::exports::{self, ExportTarget};
use crate::error::{ResolveError, ResolveResult};
use crate::guard::{recover, ResolveContext};
use crate::model::{PropInfo, PropsMap};
use crate::parsing::node::{
    assignment_rhs, declarator_initializer, property_key_name, spread_operand, unwrap_transparent,
    NodeRole,
};
use crate::parsing::scope::{self, Declaration, ImportBinding, ImportKind};
use crate::parsing::{SourceFile, SourceStore};
use crate::project_resolver::ImportResolver;

/// Sub-keys of a `{ type, required, default, validator }` prop definition
const TYPE_KEY: &str = "type";
const REQUIRED_KEY: &str = "required";
const DEFAULT_KEY: &str = "default";
const VALIDATOR_KEY: &str = "validator";

/// What an expression is, as far as locating an object literal goes
#[derive(Debug, Clone, Copy)]
pub enum ResolutionTarget<'t> {
    ObjectLiteral(Node<'t>),
    Reference(Node<'t>),
    Unsupported,
}

impl<'t> ResolutionTarget<'t> {
    pub fn of(expression: Node<'t>) -> Self {
        let expression = unwrap_transparent(expression);
        match NodeRole::of(expression) {
            NodeRole::ObjectLiteral => ResolutionTarget::ObjectLiteral(expression),
            NodeRole::Reference => ResolutionTarget::Reference(expression),
            _ => ResolutionTarget::Unsupported,
        }
    }
}

/// An object literal in some file, kept alive independently of the file
/// that led to it.
#[derive(Debug, Clone)]
pub struct LiteralRef {
    file: Arc<SourceFile>,
    start: usize,
    end: usize,
}

impl LiteralRef {
    pub fn new(file: &Arc<SourceFile>, object: Node<'_>) -> Self {
        Self {
            file: Arc::clone(file),
            start: object.start_byte(),
            end: object.end_byte(),
        }
    }

    pub fn file(&self) -> &Arc<SourceFile> {
        &self.file
    }

    pub fn offset(&self) -> usize {
        self.start
    }

    pub fn node(&self) -> Option<Node<'_>> {
        self.file.node_at(self.start, self.end, "object")
    }
}

type VisitKey = (PathBuf, usize);

/// Removes its key from the active set when the step it guards returns.
struct ActiveStep<'r> {
    active: &'r RefCell<HashSet<VisitKey>>,
    key: VisitKey,
}

impl Drop for ActiveStep<'_> {
    fn drop(&mut self) {
        self.active.borrow_mut().remove(&self.key);
    }
}

/// One resolution pass. Cheap to build; holds the per-pass cycle guard.
pub struct PropsResolver<'a> {
    store: &'a SourceStore,
    imports: &'a ImportResolver,
    ctx: &'a ResolveContext,
    max_depth: usize,
    active: RefCell<HashSet<VisitKey>>,
}

impl<'a> PropsResolver<'a> {
    pub fn new(store: &'a SourceStore, imports: &'a ImportResolver, ctx: &'a ResolveContext) -> Self {
        Self {
            store,
            imports,
            ctx,
            max_depth: imports.config().max_resolution_depth,
            active: RefCell::new(HashSet::new()),
        }
    }

    /// Props merged in by `spread` (a spread element of `file`).
    pub fn resolve_merged_props(&self, file: &Arc<SourceFile>, spread: Node<'_>) -> ResolveResult<PropsMap> {
        self.ctx.checkpoint()?;
        let Some(operand) = spread_operand(spread) else {
            tracing::debug!("spread without operand at {}:{}", file.path().display(), spread.start_byte());
            return Ok(PropsMap::new());
        };

        match self.locate(file, operand, 0)? {
            Some(literal) => self.extract_props(&literal, 0),
            None => Ok(PropsMap::new()),
        }
    }

    /// Props declared by an object literal written in place (`props: { ... }`).
    pub fn resolve_direct_props(&self, file: &Arc<SourceFile>, object: Node<'_>) -> ResolveResult<PropsMap> {
        self.ctx.checkpoint()?;
        if NodeRole::of(object) != NodeRole::ObjectLiteral {
            return Ok(PropsMap::new());
        }
        self.extract_props(&LiteralRef::new(file, object), 0)
    }

    /// Object literal produced by the default export of `file`.
    pub fn find_default_export_object_literal(&self, file: &Arc<SourceFile>) -> ResolveResult<Option<LiteralRef>> {
        self.default_export_literal(file, 0)
    }

    fn enter(&self, file: &SourceFile, offset: usize) -> Option<ActiveStep<'_>> {
        let key = (file.path().to_path_buf(), offset);
        if !self.active.borrow_mut().insert(key.clone()) {
            tracing::debug!("cycle at {}:{offset}", file.path().display());
            return None;
        }
        Some(ActiveStep {
            active: &self.active,
            key,
        })
    }

    fn within_depth(&self, depth: usize) -> bool {
        if depth > self.max_depth {
            tracing::debug!("resolution depth {depth} exceeds {}", self.max_depth);
            return false;
        }
        true
    }

    fn locate(&self, file: &Arc<SourceFile>, expression: Node<'_>, depth: usize) -> ResolveResult<Option<LiteralRef>> {
        self.ctx.checkpoint()?;
        if !self.within_depth(depth) {
            return Ok(None);
        }

        match ResolutionTarget::of(expression) {
            ResolutionTarget::ObjectLiteral(object) => Ok(Some(LiteralRef::new(file, object))),
            ResolutionTarget::Reference(reference) => {
                let Some(_step) = self.enter(file, reference.start_byte()) else {
                    return Ok(None);
                };
                self.locate_reference(file, reference, depth)
            }
            ResolutionTarget::Unsupported => {
                tracing::debug!("unsupported spread operand kind {}", expression.kind());
                Ok(None)
            }
        }
    }

    fn locate_reference(&self, file: &Arc<SourceFile>, reference: Node<'_>, depth: usize) -> ResolveResult<Option<LiteralRef>> {
        match scope::resolve_reference(file, reference)? {
            Some(Declaration::Import(binding)) => self.locate_imported_binding(file, &binding, depth),
            Some(Declaration::Export { declarator, .. }) | Some(Declaration::Variable(declarator)) => {
                self.locate_declarator(file, declarator, depth + 1)
            }
            Some(Declaration::Other(node)) => {
                tracing::debug!("reference bound to {}, not a variable", node.kind());
                Ok(None)
            }
            None => {
                tracing::debug!(
                    "unresolved reference {} in {}",
                    file.node_text(reference)?,
                    file.path().display()
                );
                Ok(None)
            }
        }
    }

    /// Follow an import into its target file. When that fails a same-named
    /// local variable is used instead.
    fn locate_imported_binding(
        &self,
        file: &Arc<SourceFile>,
        binding: &ImportBinding<'_>,
        depth: usize,
    ) -> ResolveResult<Option<LiteralRef>> {
        if let Some(found) = recover(None, || self.locate_import(file, binding, depth))? {
            return Ok(Some(found));
        }

        match scope::find_local_variable(file, &binding.local) {
            Some(declarator) => self.locate_declarator(file, declarator, depth + 1),
            None => Ok(None),
        }
    }

    fn locate_import(
        &self,
        file: &Arc<SourceFile>,
        binding: &ImportBinding<'_>,
        depth: usize,
    ) -> ResolveResult<Option<LiteralRef>> {
        let name = match &binding.kind {
            ImportKind::Default => None,
            ImportKind::Named(name) => Some(name.as_str()),
            ImportKind::Namespace => {
                tracing::debug!("namespace import {} is not followed", binding.local);
                return Ok(None);
            }
        };
        let Some(source) = exports::import_source(file, binding.statement)? else {
            return Ok(None);
        };
        self.locate_in_module(file, &source, name, depth + 1)
    }

    /// Export `name` (the default export for `None`) of the module `source`
    /// imported from `file`.
    fn locate_in_module(
        &self,
        file: &Arc<SourceFile>,
        source: &str,
        name: Option<&str>,
        depth: usize,
    ) -> ResolveResult<Option<LiteralRef>> {
        self.ctx.checkpoint()?;
        let Some(path) = self.imports.resolve_import_to_file(file.path(), source) else {
            return Ok(None);
        };
        let target = self.store.load(&path).map_err(ResolveError::from)?;

        match name {
            None => self.default_export_literal(&target, depth),
            Some(name) => match exports::find_named_export(&target, name)? {
                Some(export) => self.locate_export(&target, export, depth),
                None => {
                    tracing::debug!("{} has no export named {name}", path.display());
                    Ok(None)
                }
            },
        }
    }

    fn default_export_literal(&self, file: &Arc<SourceFile>, depth: usize) -> ResolveResult<Option<LiteralRef>> {
        self.ctx.checkpoint()?;
        if !self.within_depth(depth) {
            return Ok(None);
        }
        match exports::find_default_export(file)? {
            Some(export) => self.locate_export(file, export, depth),
            None => {
                tracing::debug!("no default export in {}", file.path().display());
                Ok(None)
            }
        }
    }

    fn locate_export(&self, file: &Arc<SourceFile>, export: ExportTarget<'_>, depth: usize) -> ResolveResult<Option<LiteralRef>> {
        match export {
            ExportTarget::Local(node) => match NodeRole::of(node) {
                NodeRole::ObjectLiteral => Ok(Some(LiteralRef::new(file, node))),
                NodeRole::Reference => self.locate(file, node, depth + 1),
                NodeRole::VariableDeclarator => self.locate_declarator(file, node, depth + 1),
                _ => {
                    tracing::debug!("exported {} is not an object", node.kind());
                    Ok(None)
                }
            },
            ExportTarget::ReExport { source, name } => {
                let name = (name != exports::DEFAULT_EXPORT).then_some(name.as_str());
                self.locate_in_module(file, &source, name, depth + 1)
            }
        }
    }

    /// Object literal a variable is initialized with
    fn locate_declarator(&self, file: &Arc<SourceFile>, declarator: Node<'_>, depth: usize) -> ResolveResult<Option<LiteralRef>> {
        let Some(initializer) = declarator_initializer(declarator) else {
            return Ok(None);
        };
        match NodeRole::of(initializer) {
            NodeRole::ObjectLiteral => Ok(Some(LiteralRef::new(file, initializer))),
            NodeRole::Assignment => match assignment_rhs(initializer) {
                Some(rhs) if NodeRole::of(rhs) == NodeRole::ObjectLiteral => {
                    Ok(Some(LiteralRef::new(file, rhs)))
                }
                _ => Ok(None),
            },
            NodeRole::Reference => self.locate(file, initializer, depth + 1),
            _ => Ok(None),
        }
    }

    /// Entries of `literal` in declaration order, nested spreads spliced in.
    pub fn extract_props(&self, literal: &LiteralRef, depth: usize) -> ResolveResult<PropsMap> {
        let mut props = PropsMap::new();
        let file = literal.file();
        let Some(object) = literal.node() else {
            return Ok(props);
        };
        let Some(_step) = self.enter(file, literal.offset()) else {
            return Ok(props);
        };

        let mut cursor = object.walk();
        for entry in object.named_children(&mut cursor) {
            self.ctx.checkpoint()?;
            match entry.kind() {
                "spread_element" => {
                    let nested = recover(PropsMap::new(), || {
                        let Some(operand) = spread_operand(entry) else {
                            return Ok(PropsMap::new());
                        };
                        match self.locate(file, operand, depth + 1)? {
                            Some(inner) => self.extract_props(&inner, depth + 1),
                            None => Ok(PropsMap::new()),
                        }
                    })?;
                    props.extend(nested);
                }
                "comment" => {}
                _ => {
                    if let Some(info) = recover(None, || entry_prop(file, entry))? {
                        props.insert(info.name.clone(), info);
                    }
                }
            }
        }

        Ok(props)
    }
}

/// One entry of a props object. `None` for entries without a usable name.
fn entry_prop(file: &SourceFile, entry: Node<'_>) -> ResolveResult<Option<PropInfo>> {
    if entry.has_error() {
        return Err(ResolveError::failed(format!(
            "syntax error in props entry at byte {}",
            entry.start_byte()
        )));
    }

    match entry.kind() {
        "pair" => {
            let Some(key) = entry.child_by_field_name("key") else {
                return Ok(None);
            };
            let Some(name) = property_key_name(file, key)? else {
                return Ok(None);
            };
            let Some(value) = entry.child_by_field_name("value") else {
                return Ok(Some(PropInfo::new(name)));
            };
            let object = unwrap_transparent(value);
            if NodeRole::of(object) == NodeRole::ObjectLiteral {
                return Ok(Some(prop_definition(file, name, object)?));
            }
            Ok(Some(PropInfo::new(name).with_type(file.node_text(value)?.trim())))
        }
        "shorthand_property_identifier" => {
            let name = file.node_text(entry)?;
            Ok(Some(PropInfo::new(name).with_type(name)))
        }
        "method_definition" => {
            let Some(key) = entry.child_by_field_name("name") else {
                return Ok(None);
            };
            let Some(name) = property_key_name(file, key)? else {
                return Ok(None);
            };
            Ok(Some(PropInfo::new(name).with_type(method_body_text(file, entry)?)))
        }
        _ => Ok(None),
    }
}

/// `{ type, required, default, validator }`; other keys are ignored.
fn prop_definition(file: &SourceFile, name: String, object: Node<'_>) -> ResolveResult<PropInfo> {
    let mut info = PropInfo::new(name);
    let mut cursor = object.walk();
    for member in object.named_children(&mut cursor) {
        let (key, value) = match member.kind() {
            "pair" => {
                let Some(key) = member.child_by_field_name("key") else {
                    continue;
                };
                let value = match member.child_by_field_name("value") {
                    Some(value) => file.node_text(value)?.trim().to_string(),
                    None => String::new(),
                };
                (property_key_name(file, key)?, value)
            }
            "shorthand_property_identifier" => {
                let text = file.node_text(member)?.to_string();
                (Some(text.clone()), text)
            }
            "method_definition" => {
                let Some(key) = member.child_by_field_name("name") else {
                    continue;
                };
                (property_key_name(file, key)?, method_body_text(file, member)?)
            }
            _ => continue,
        };

        match key.as_deref() {
            Some(TYPE_KEY) => info.type_expression = Some(value),
            Some(REQUIRED_KEY) => info.required = value.eq_ignore_ascii_case("true"),
            Some(DEFAULT_KEY) => info.default_expression = Some(value),
            Some(VALIDATOR_KEY) => info.has_validator = true,
            _ => {}
        }
    }

    Ok(info)
}

/// `default() { return [] }` is rendered from its parameter list on.
fn method_body_text(file: &SourceFile, method: Node<'_>) -> ResolveResult<String> {
    let start = method
        .child_by_field_name("parameters")
        .map_or(method.start_byte(), |p| p.start_byte());
    file.text()
        .get(start..method.end_byte())
        .map(|text| text.trim().to_string())
        .ok_or_else(|| ResolveError::failed(format!("method text out of range at byte {start}")))
}
