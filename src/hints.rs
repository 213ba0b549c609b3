//! Inline hints and gutter markers
//!
//! The rendering side of resolution: turns resolved props into positioned
//! text for the host to draw. A failure on one node is logged and skipped,
//! cancellation stops the whole pass.

use serde::Serialize;
use std::sync::Arc;
use tree_sitter::Node;

use crate::classifier::{is_direct_props_assignment, is_inside_props_declaration};
use crate::error::{Cancelled, ResolveResult};
use crate::guard::ResolveContext;
use crate::model::PropsMap;
use crate::parsing::node::walk_descendants;
use crate::parsing::{FileKind, NodeRole, SourceFile};
use crate::service::PropsService;

/// Indent of the spread's line is repeated this many times before a hint
const INDENT_REPEAT: usize = 3;

/// One rendered prop, drawn as a block below the spread it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropHint {
    /// Byte offset of the spread the hint is attached to
    pub anchor_offset: usize,
    /// 1-based position among the hints of the same anchor
    pub line_offset: usize,
    pub text: String,
}

/// Gutter marker summarizing the props of a spread or a props object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropsMarker {
    pub offset: usize,
    pub tooltip: String,
}

fn annotates(file: &SourceFile) -> bool {
    matches!(file.kind(), FileKind::Vue) || file.kind().is_script()
}

/// Hints for one spread; empty unless it sits in a props declaration.
pub fn hints_for_node(
    service: &PropsService,
    file: &Arc<SourceFile>,
    node: Node<'_>,
    ctx: &ResolveContext,
) -> ResolveResult<Vec<PropHint>> {
    ctx.checkpoint()?;
    if NodeRole::of(node) != NodeRole::Spread || !is_inside_props_declaration(file, node)? {
        return Ok(Vec::new());
    }

    let props = service.resolve_spread_props(file, node, ctx)?;
    let indent = file.line_indent(node.start_byte()).repeat(INDENT_REPEAT);

    Ok(props
        .iter()
        .take(service.settings().hints.max_props_to_show)
        .enumerate()
        .map(|(i, (name, info))| PropHint {
            anchor_offset: node.start_byte(),
            line_offset: i + 1,
            text: format!("{indent}{name}: {}", single_line(&info.display_string())),
        })
        .collect())
}

/// Hints for every spread in a props declaration of `file`, in source order.
pub fn collect_hints(
    service: &PropsService,
    file: &Arc<SourceFile>,
    ctx: &ResolveContext,
) -> Result<Vec<PropHint>, Cancelled> {
    let mut hints = Vec::new();
    if !annotates(file) {
        return Ok(hints);
    }

    for spread in nodes_with_role(file, NodeRole::Spread) {
        if let Some(found) = isolate(file, spread, hints_for_node(service, file, spread, ctx))? {
            hints.extend(found);
        }
    }
    Ok(hints)
}

/// Gutter markers for props spreads and inline props objects of `file`.
pub fn collect_markers(
    service: &PropsService,
    file: &Arc<SourceFile>,
    ctx: &ResolveContext,
) -> Result<Vec<PropsMarker>, Cancelled> {
    let mut markers = Vec::new();
    if !annotates(file) {
        return Ok(markers);
    }

    let mut candidates = nodes_with_role(file, NodeRole::Spread);
    candidates.extend(nodes_with_role(file, NodeRole::ObjectLiteral));
    candidates.sort_by_key(|node| node.start_byte());

    for node in candidates {
        let marker = isolate(file, node, marker_for_node(service, file, node, ctx))?;
        markers.extend(marker.flatten());
    }
    Ok(markers)
}

fn marker_for_node(
    service: &PropsService,
    file: &Arc<SourceFile>,
    node: Node<'_>,
    ctx: &ResolveContext,
) -> ResolveResult<Option<PropsMarker>> {
    ctx.checkpoint()?;
    let props = match NodeRole::of(node) {
        NodeRole::Spread if is_inside_props_declaration(file, node)? => {
            service.resolve_spread_props(file, node, ctx)?
        }
        NodeRole::ObjectLiteral if is_direct_props_assignment(file, node)? => {
            Arc::new(service.resolve_direct_props(file, node, ctx)?)
        }
        _ => return Ok(None),
    };

    if props.is_empty() {
        return Ok(None);
    }
    Ok(Some(PropsMarker {
        offset: node.start_byte(),
        tooltip: render_tooltip(&props),
    }))
}

/// `// name: display` per prop, one per line
pub fn render_tooltip(props: &PropsMap) -> String {
    props
        .iter()
        .map(|(name, info)| format!("// {name}: {}", info.display_string()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

fn nodes_with_role(file: &SourceFile, role: NodeRole) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    walk_descendants(file.root(), |node| {
        if NodeRole::of(node) == role {
            nodes.push(node);
        }
        true
    });
    nodes
}

/// Keep cancellation, log anything else and move on to the next node.
fn isolate<T>(file: &SourceFile, node: Node<'_>, result: ResolveResult<T>) -> Result<Option<T>, Cancelled> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => match err.into_cancelled() {
            Ok(cancelled) => Err(cancelled),
            Err(err) => {
                tracing::error!(
                    "failed to annotate {} at {}:{}: {err}",
                    node.kind(),
                    file.path().display(),
                    node.start_byte()
                );
                Ok(None)
            }
        },
    }
}

/// Multi-line source text (function defaults) shown on one line
fn single_line(text: &str) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
