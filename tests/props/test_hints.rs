//! Inline hints for components on disk

use propslens::{ResolveContext, collect_hints};

use crate::common::TestProject;
use crate::common::fixtures::{COMPONENT_VUE, PROPS_JS};

#[test]
fn test_vue_component_hints() {
    let project = TestProject::new();
    project.add_file("src/shared/props.js", PROPS_JS);
    let card = project.add_file("src/components/Card.vue", COMPONENT_VUE);

    let service = project.service();
    let file = service.store().load(&card).unwrap();
    let hints = collect_hints(&service, &file, &ResolveContext::detached()).unwrap();

    let indent = " ".repeat(12);
    let texts: Vec<String> = hints.iter().map(|h| h.text.clone()).collect();
    assert_eq!(
        texts,
        vec![
            format!("{indent}id: String, required: true"),
            format!("{indent}title: String, default: 'Default Title'"),
            format!("{indent}count: Number"),
            format!("{indent}items: Array, default: () => []"),
            format!("{indent}level: Number, validator: ..."),
        ]
    );
    assert_eq!(hints[0].line_offset, 1);
    assert_eq!(hints[4].line_offset, 5);
}

#[test]
fn test_hints_respect_configured_limit() {
    let project = TestProject::new();
    project.add_file("src/shared/props.js", PROPS_JS);
    let card = project.add_file("src/components/Card.vue", COMPONENT_VUE);

    let mut settings = project.settings();
    settings.hints.max_props_to_show = 3;
    let service = project.service_with(settings);
    let file = service.store().load(&card).unwrap();

    let hints = collect_hints(&service, &file, &ResolveContext::detached()).unwrap();
    assert_eq!(hints.len(), 3);
    assert_eq!(hints.last().map(|h| h.line_offset), Some(3));
}

#[test]
fn test_non_component_script_has_no_hints() {
    let project = TestProject::new();
    project.add_file("src/shared/props.js", PROPS_JS);
    let util = project.add_file(
        "src/util.js",
        "import shared from '@/shared/props';\nconst options = { props: { ...shared } };\n",
    );

    let service = project.service();
    let file = service.store().load(&util).unwrap();
    assert!(collect_hints(&service, &file, &ResolveContext::detached()).unwrap().is_empty());
}
