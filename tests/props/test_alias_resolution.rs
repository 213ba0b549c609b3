//! Alias-prefixed imports resolved from tsconfig, webpack and fallback roots

use crate::common::fixtures::{COMPONENT_VUE, EXPECTED_SHARED, PROPS_JS};
use crate::common::{TestProject, pairs, resolve_spread};

#[test]
fn test_tsconfig_path_mapping() {
    let project = TestProject::new();
    project.add_file(
        "tsconfig.json",
        r#"{
  // comments are allowed
  "compilerOptions": {
    "baseUrl": ".",
    "paths": { "@/*": ["src/*"] },
  }
}"#,
    );
    project.add_file("src/shared/props.js", PROPS_JS);
    let card = project.add_file("src/components/Card.vue", COMPONENT_VUE);

    let service = project.service();
    assert_eq!(resolve_spread(&service, &card, 0), pairs(EXPECTED_SHARED));
}

#[test]
fn test_jsconfig_extends_chain() {
    let project = TestProject::new();
    project.add_file(
        "config/base.json",
        r#"{ "compilerOptions": { "paths": { "@/*": ["./client/*"] } } }"#,
    );
    project.add_file("jsconfig.json", r#"{ "extends": "./config/base.json" }"#);
    project.add_file("client/shared/props.js", PROPS_JS);
    let card = project.add_file("client/Card.vue", COMPONENT_VUE);

    let service = project.service();
    assert_eq!(resolve_spread(&service, &card, 0), pairs(EXPECTED_SHARED));
}

#[test]
fn test_webpack_alias() {
    let project = TestProject::new();
    project.add_file(
        "webpack.config.js",
        r#"const path = require('path');
module.exports = {
  resolve: {
    alias: {
      '@': path.resolve(__dirname, 'frontend/app'),
    },
  },
};"#,
    );
    project.add_file("frontend/app/shared/props.js", PROPS_JS);
    let card = project.add_file("frontend/app/Card.vue", COMPONENT_VUE);

    let service = project.service();
    assert_eq!(resolve_spread(&service, &card, 0), pairs(EXPECTED_SHARED));
}

#[test]
fn test_fallback_roots_in_order() {
    let project = TestProject::new();
    // `src` exists but lacks the module; the next fallback root has it
    project.add_file("src/unrelated.js", "export default {};");
    project.add_file("app/javascript/src/shared/props.js", PROPS_JS);
    let card = project.add_file("app/javascript/src/components/Card.vue", COMPONENT_VUE);

    let service = project.service();
    let roots = service.imports().alias_roots();
    assert!(roots.is_fallback());
    assert_eq!(resolve_spread(&service, &card, 0), pairs(EXPECTED_SHARED));
}

#[test]
fn test_index_file_and_extension_order() {
    let project = TestProject::new();
    project.add_file("src/shared/props/index.js", PROPS_JS);
    project.add_file("src/shared/props/index.vue", "<script>export default { bogus: String }</script>");
    let card = project.add_file("src/components/Card.vue", COMPONENT_VUE);

    let service = project.service();
    assert_eq!(resolve_spread(&service, &card, 0), pairs(EXPECTED_SHARED));
}

#[test]
fn test_unmapped_alias_is_empty() {
    let project = TestProject::new();
    let card = project.add_file("lib/Card.vue", COMPONENT_VUE);

    let service = project.service();
    assert!(resolve_spread(&service, &card, 0).is_empty());
}
