//! webpack `resolve.alias` scraping
//!
//! Only the `'<alias>': path.resolve(__dirname, '<dir>')` form is recognized.

use regex::Regex;
use std::path::Path;

use crate::parsing::store::FileSystem;

pub const CONFIG_FILE: &str = "webpack.config.js";

/// Directory mapped to `alias` in raw webpack config text
pub fn scrape_alias_root(text: &str, alias: &str) -> Option<String> {
    let pattern = format!(
        r#"['"]{}['"]\s*:\s*path\.resolve\(\s*__dirname\s*,\s*['"]([^'"]+)['"]\s*\)"#,
        regex::escape(alias)
    );
    let regex = Regex::new(&pattern).ok()?;
    regex
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Directory mapped to `alias` by the project's webpack config, if any
pub fn webpack_alias_root(fs: &dyn FileSystem, project_root: &Path, alias: &str) -> Option<String> {
    let path = project_root.join(CONFIG_FILE);
    if !fs.is_file(&path) {
        return None;
    }
    match fs.read_to_string(&path) {
        Ok(text) => scrape_alias_root(&text, alias),
        Err(e) => {
            tracing::warn!("cannot read {}: {e}", path.display());
            None
        }
    }
}
