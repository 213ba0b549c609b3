//! Result caching across edits and cancellation

use propslens::{CancellationToken, ResolveContext};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::common::{TestProject, pairs, resolve_spread, spreads};

const COMPONENT: &str = "import shared from './props';\nexport default { props: { ...shared } };\n";

#[test]
fn test_stale_result_until_expiry() {
    let project = TestProject::new();
    let props = project.add_file("src/props.js", "export default { a: String };\n");
    let comp = project.add_file("src/Comp.js", COMPONENT);

    let mut settings = project.settings();
    settings.cache.expiration_ms = 100;
    let service = project.service_with(settings);

    assert_eq!(resolve_spread(&service, &comp, 0), pairs(&[("a", "String")]));

    service
        .store()
        .update(&props, "export default { a: Number, b: Boolean };\n")
        .unwrap();
    assert_eq!(resolve_spread(&service, &comp, 0), pairs(&[("a", "String")]));

    thread::sleep(Duration::from_millis(200));
    assert_eq!(
        resolve_spread(&service, &comp, 0),
        pairs(&[("a", "Number"), ("b", "Boolean")])
    );
}

#[test]
fn test_disk_change_visible_after_expiry() {
    let project = TestProject::new();
    project.add_file("src/props.js", "export default { a: String };\n");
    let comp = project.add_file("src/Comp.js", COMPONENT);

    let mut settings = project.settings();
    settings.cache.expiration_ms = 50;
    let service = project.service_with(settings);

    assert_eq!(resolve_spread(&service, &comp, 0), pairs(&[("a", "String")]));

    // Rewritten behind the store's back, as a checkout or another tool would
    project.add_file("src/props.js", "export default { a: Number, b: Boolean };\n");
    assert_eq!(resolve_spread(&service, &comp, 0), pairs(&[("a", "String")]));

    thread::sleep(Duration::from_millis(120));
    assert_eq!(
        resolve_spread(&service, &comp, 0),
        pairs(&[("a", "Number"), ("b", "Boolean")])
    );
}

#[test]
fn test_cache_hit_shares_result() {
    let project = TestProject::new();
    project.add_file("src/props.js", "export default { a: String };\n");
    let comp = project.add_file("src/Comp.js", COMPONENT);

    let service = project.service();
    let file = service.store().load(&comp).unwrap();
    let spread = spreads(&file)[0];
    let ctx = ResolveContext::detached();

    let first = service.resolve_spread_props(&file, spread, &ctx).unwrap();
    let second = service.resolve_spread_props(&file, spread, &ctx).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(service.cache().len(), 1);
}

#[test]
fn test_cancelled_resolution_leaves_no_entry() {
    let project = TestProject::new();
    project.add_file("src/props.js", "export default { a: String };\n");
    let comp = project.add_file("src/Comp.js", COMPONENT);

    let service = project.service();
    let file = service.store().load(&comp).unwrap();
    let spread = spreads(&file)[0];

    let token = CancellationToken::new();
    token.cancel();
    assert!(
        service
            .resolve_spread_props(&file, spread, &ResolveContext::new(token))
            .is_err()
    );
    assert!(service.cache().is_empty());

    let props = service
        .resolve_spread_props(&file, spread, &ResolveContext::detached())
        .unwrap();
    assert_eq!(props["a"].display_string(), "String");
}
