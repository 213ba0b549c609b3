//! Spread props resolved through local names, imports and re-exports

use propslens::{ResolveContext, collect_markers};

use crate::common::fixtures::{EXPECTED_SHARED, NAMED_PROPS_JS, PROPS_JS};
use crate::common::{TestProject, pairs, resolve_spread};

#[test]
fn test_relative_default_import() {
    let project = TestProject::new();
    project.add_file("src/props.js", PROPS_JS);
    let comp = project.add_file(
        "src/Comp.js",
        "import shared from './props';\nexport default { props: { ...shared } };\n",
    );

    let service = project.service();
    assert_eq!(resolve_spread(&service, &comp, 0), pairs(EXPECTED_SHARED));
}

#[test]
fn test_named_imports_and_reexports() {
    let project = TestProject::new();
    project.add_file("src/namedProps.js", NAMED_PROPS_JS);
    let comp = project.add_file(
        "src/Comp.js",
        r#"import { sizeProps, colorProps, paletteProps as palette } from './namedProps.js';
export default {
  props: {
    ...sizeProps,
    ...colorProps,
    ...palette,
  },
};
"#,
    );

    let service = project.service();
    assert_eq!(resolve_spread(&service, &comp, 0), pairs(&[("size", "String, default: 'md'")]));
    assert_eq!(resolve_spread(&service, &comp, 1), pairs(&[("color", "String")]));
    assert_eq!(resolve_spread(&service, &comp, 2), pairs(&[("color", "String")]));
}

#[test]
fn test_imported_equals_inline() {
    let project = TestProject::new();
    project.add_file("src/props.js", PROPS_JS);
    let imported = project.add_file(
        "src/Imported.js",
        "import shared from './props';\nexport default { props: { ...shared } };\n",
    );
    let body = PROPS_JS.trim().trim_start_matches("export default").trim_end_matches(';');
    let inline = project.add_file(
        "src/Inline.js",
        &format!("const shared = {body};\nexport default {{ props: {{ ...shared }} }};\n"),
    );

    let service = project.service();
    assert_eq!(resolve_spread(&service, &imported, 0), resolve_spread(&service, &inline, 0));
}

#[test]
fn test_unresolvable_spreads_are_empty() {
    let project = TestProject::new();
    let comp = project.add_file(
        "src/Comp.js",
        r#"import missing from './nowhere';
import lib from 'some-package';
function build() { return {}; }
export default {
  props: {
    ...missing,
    ...lib,
    ...undeclared,
    ...build(),
  },
};
"#,
    );

    let service = project.service();
    for index in 0..4 {
        assert!(resolve_spread(&service, &comp, index).is_empty(), "spread {index}");
    }
}

#[test]
fn test_later_spread_overrides_earlier() {
    let project = TestProject::new();
    let comp = project.add_file(
        "src/Comp.js",
        r#"const base = { a: String, b: Number };
const extended = { ...base, a: { type: Boolean, required: true } };
export default { props: { ...extended } };
"#,
    );

    let service = project.service();
    assert_eq!(
        resolve_spread(&service, &comp, 1),
        pairs(&[("a", "Boolean, required: true"), ("b", "Number")])
    );
}

#[test]
fn test_markers_for_vue_component() {
    let project = TestProject::new();
    project.add_file("src/props.js", PROPS_JS);
    let card = project.add_file(
        "src/Card.vue",
        r#"<script>
import shared from './props';
export default {
  props: {
    ...shared,
  },
};
</script>
"#,
    );

    let service = project.service();
    let file = service.store().load(&card).unwrap();
    let markers = collect_markers(&service, &file, &ResolveContext::detached()).unwrap();
    let spread_marker = markers
        .iter()
        .find(|m| m.offset == file.text().find("...shared").unwrap())
        .expect("marker on the spread");
    assert!(spread_marker.tooltip.starts_with("// id: String, required: true\n// title:"));
}
