use propslens::{PropsService, ResolveContext, Settings, SourceFile};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tree_sitter::Node;

/// A throwaway project directory on disk
pub struct TestProject {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn settings(&self) -> Settings {
        Settings {
            project_root: Some(self.path().to_path_buf()),
            ..Settings::default()
        }
    }

    /// Service rooted at this project, reading from disk
    pub fn service(&self) -> PropsService {
        PropsService::on_disk(Arc::new(self.settings()))
    }

    pub fn service_with(&self, settings: Settings) -> PropsService {
        PropsService::on_disk(Arc::new(settings))
    }
}

/// Spread elements of `file` in source order
#[allow(dead_code)]
pub fn spreads(file: &SourceFile) -> Vec<Node<'_>> {
    let mut found = Vec::new();
    propslens::parsing::node::walk_descendants(file.root(), |node| {
        if node.kind() == "spread_element" {
            found.push(node);
        }
        true
    });
    found
}

/// `(name, display)` pairs resolved for the `index`-th spread of `path`
#[allow(dead_code)]
pub fn resolve_spread(service: &PropsService, path: &Path, index: usize) -> Vec<(String, String)> {
    let file = service.store().load(path).expect("Failed to load file");
    let spread = spreads(&file)[index];
    let props = service
        .resolve_spread_props(&file, spread, &ResolveContext::detached())
        .expect("resolution was cancelled");
    propslens::model::display_pairs(&props)
}

#[allow(dead_code)]
pub fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(name, display)| (name.to_string(), display.to_string()))
        .collect()
}

pub mod fixtures {
    /// Shared props module exporting a default object
    pub const PROPS_JS: &str = r#"
export default {
  id: {
    type: String,
    required: true,
  },
  title: {
    type: String,
    default: 'Default Title',
  },
  count: Number,
  items: {
    type: Array,
    default: () => [],
  },
  level: {
    type: Number,
    validator: (value) => value > 0,
  },
};
"#;

    /// Shared props module exporting named objects
    pub const NAMED_PROPS_JS: &str = r#"
export const sizeProps = {
  size: {
    type: String,
    default: 'md',
  },
};

const colorProps = {
  color: String,
};

export { colorProps };
export { colorProps as paletteProps };
"#;

    pub const COMPONENT_VUE: &str = r#"<template>
  <div>{{ title }}</div>
</template>

<script>
import sharedProps from '@/shared/props';

export default {
  name: 'Card',
  props: {
    ...sharedProps,
    extra: Boolean,
  },
};
</script>
"#;

    pub const EXPECTED_SHARED: &[(&str, &str)] = &[
        ("id", "String, required: true"),
        ("title", "String, default: 'Default Title'"),
        ("count", "Number"),
        ("items", "Array, default: () => []"),
        ("level", "Number, validator: ..."),
    ];
}
