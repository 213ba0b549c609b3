//! Declaration-site classifier
//!
//! Decides whether a node sits inside a component's `props` declaration. The
//! component check is deliberately light: `.vue` files always qualify, plain
//! script files qualify when their text mentions `export default` or
//! `Vue.component`. A `props` key elsewhere in such a file is accepted too.

use tree_sitter::Node;

use crate::error::ResolveResult;
use crate::parsing::node::{find_ancestor, property_key_name, unwrap_transparent, NodeRole};
use crate::parsing::SourceFile;

pub const PROPS_KEY: &str = "props";

/// Text markers of a component definition in a plain script file
pub const COMPONENT_MARKERS: &[&str] = &["Vue.component", "export default"];

/// True when `file` plausibly defines a component.
pub fn is_component_file(file: &SourceFile) -> bool {
    let kind = file.kind();
    kind.is_component_file()
        || (kind.is_script() && COMPONENT_MARKERS.iter().any(|m| file.text().contains(m)))
}

/// True when `node` lies inside the `props` declaration of a component.
///
/// The nearest enclosing pair decides; without one, the pair holding the
/// nearest enclosing object literal does.
pub fn is_inside_props_declaration(file: &SourceFile, node: Node<'_>) -> ResolveResult<bool> {
    let pair = match find_ancestor(node, |n| NodeRole::of(n) == NodeRole::Pair) {
        Some(pair) => Some(pair),
        None => find_ancestor(node, |n| NodeRole::of(n) == NodeRole::ObjectLiteral)
            .and_then(|object| object.parent())
            .filter(|parent| NodeRole::of(*parent) == NodeRole::Pair),
    };

    match pair {
        Some(pair) => Ok(is_props_pair(file, pair)? && is_component_file(file)),
        None => Ok(false),
    }
}

/// True when `object` is the value of a component's `props` key.
pub fn is_direct_props_assignment(file: &SourceFile, object: Node<'_>) -> ResolveResult<bool> {
    if NodeRole::of(object) != NodeRole::ObjectLiteral {
        return Ok(false);
    }
    let Some(pair) = find_ancestor(object, |n| NodeRole::of(n) == NodeRole::Pair) else {
        return Ok(false);
    };
    let is_value = pair
        .child_by_field_name("value")
        .is_some_and(|value| unwrap_transparent(value) == object);
    Ok(is_value && is_props_pair(file, pair)? && is_component_file(file))
}

fn is_props_pair(file: &SourceFile, pair: Node<'_>) -> ResolveResult<bool> {
    match pair.child_by_field_name("key") {
        Some(key) => Ok(property_key_name(file, key)?.as_deref() == Some(PROPS_KEY)),
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::node::find_descendant;

    fn first<'t>(file: &'t SourceFile, kind: &str) -> Node<'t> {
        find_descendant(file.root(), |n| n.kind() == kind).unwrap()
    }

    #[test]
    fn spread_in_props_of_exported_component() {
        let file = SourceFile::parse("/p/comp.js", "export default { props: { ...shared } }").unwrap();
        assert!(is_inside_props_declaration(&file, first(&file, "spread_element")).unwrap());
    }

    #[test]
    fn vue_file_needs_no_marker() {
        let file = SourceFile::parse(
            "/p/Comp.vue",
            "<script>\nconst options = { props: { ...shared } }\n</script>",
        )
        .unwrap();
        assert!(is_inside_props_declaration(&file, first(&file, "spread_element")).unwrap());
    }

    #[test]
    fn plain_script_without_marker_is_rejected() {
        let file = SourceFile::parse("/p/util.js", "const config = { props: { ...shared } };").unwrap();
        assert!(!is_inside_props_declaration(&file, first(&file, "spread_element")).unwrap());
    }

    #[test]
    fn legacy_global_registration_counts() {
        let file = SourceFile::parse(
            "/p/legacy.js",
            "Vue.component('x', { props: { ...shared } });",
        )
        .unwrap();
        assert!(is_inside_props_declaration(&file, first(&file, "spread_element")).unwrap());
    }

    #[test]
    fn other_keys_and_nested_definitions_are_rejected() {
        let file = SourceFile::parse(
            "/p/comp.js",
            "export default { data: { ...x }, props: { a: { ...y } } }",
        )
        .unwrap();
        let mut spreads = Vec::new();
        crate::parsing::node::walk_descendants(file.root(), |n| {
            if n.kind() == "spread_element" {
                spreads.push(n);
            }
            true
        });
        assert!(!is_inside_props_declaration(&file, spreads[0]).unwrap());
        assert!(!is_inside_props_declaration(&file, spreads[1]).unwrap());
    }

    #[test]
    fn direct_props_object() {
        let file = SourceFile::parse(
            "/p/comp.js",
            "export default { props: { a: String } }",
        )
        .unwrap();
        let props_object = find_descendant(file.root(), |n| {
            n.kind() == "object" && file.node_text(n).unwrap().starts_with("{ a")
        })
        .unwrap();
        assert!(is_direct_props_assignment(&file, props_object).unwrap());
        assert!(!is_direct_props_assignment(&file, first(&file, "object")).unwrap());
    }

    #[test]
    fn other_file_kinds_are_not_components() {
        let file = SourceFile::parse("/p/notes.md", "export default {}").unwrap();
        assert!(!is_component_file(&file));
    }
}
