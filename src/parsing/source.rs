//! Parsed source files
//!
//! A [`SourceFile`] owns the file text and its tree-sitter tree. Vue single-file
//! components are parsed through their `<script>` blocks only: everything else
//! is blanked out with spaces so node offsets stay valid for the whole file.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::{ParseError, ResolveError, ResolveResult};

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("valid script block regex")
});

static LANG_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\blang\s*=\s*["']?([a-z]+)"#).expect("valid lang attribute regex")
});

/// Kind of a source file, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Vue,
    JavaScript,
    TypeScript,
    Tsx,
    Other,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("vue") => FileKind::Vue,
            Some("js" | "jsx" | "mjs" | "cjs") => FileKind::JavaScript,
            Some("ts" | "mts" | "cts") => FileKind::TypeScript,
            Some("tsx") => FileKind::Tsx,
            _ => FileKind::Other,
        }
    }

    /// Files holding a component by construction
    pub fn is_component_file(&self) -> bool {
        matches!(self, FileKind::Vue)
    }

    /// Plain script files
    pub fn is_script(&self) -> bool {
        matches!(
            self,
            FileKind::JavaScript | FileKind::TypeScript | FileKind::Tsx
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grammar {
    JavaScript,
    TypeScript,
    Tsx,
}

impl Grammar {
    fn language(self) -> Language {
        match self {
            Grammar::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Grammar::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Grammar::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Grammar::JavaScript => "javascript",
            Grammar::TypeScript => "typescript",
            Grammar::Tsx => "tsx",
        }
    }
}

/// A source file together with its syntax tree
pub struct SourceFile {
    path: PathBuf,
    kind: FileKind,
    text: String,
    tree: Tree,
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("len", &self.text.len())
            .finish()
    }
}

impl SourceFile {
    /// Parse `text` as the content of `path`.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, ParseError> {
        let path = path.into();
        let text = text.into();
        let kind = FileKind::from_path(&path);

        let (grammar, parsed_text) = match kind {
            FileKind::Vue => {
                let (masked, lang) = mask_vue_scripts(&text);
                let grammar = match lang.as_deref() {
                    Some("ts") => Grammar::TypeScript,
                    Some("tsx") => Grammar::Tsx,
                    _ => Grammar::JavaScript,
                };
                (grammar, Some(masked))
            }
            FileKind::TypeScript => (Grammar::TypeScript, None),
            FileKind::Tsx => (Grammar::Tsx, None),
            FileKind::JavaScript | FileKind::Other => (Grammar::JavaScript, None),
        };

        let mut parser = Parser::new();
        parser
            .set_language(&grammar.language())
            .map_err(|e| ParseError::ParserInit {
                language: grammar.name().to_string(),
                reason: e.to_string(),
            })?;

        let tree = parser
            .parse(parsed_text.as_deref().unwrap_or(&text), None)
            .ok_or_else(|| ParseError::NoTree { path: path.clone() })?;

        Ok(Self {
            path,
            kind,
            text,
            tree,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`
    pub fn node_text(&self, node: Node<'_>) -> ResolveResult<&str> {
        node.utf8_text(self.text.as_bytes()).map_err(|e| {
            ResolveError::failed_with(
                format!("invalid UTF-8 in {} at byte {}", node.kind(), node.start_byte()),
                e,
            )
        })
    }

    /// The node of `kind` spanning exactly `start..end`, if any.
    pub fn node_at(&self, start: usize, end: usize, kind: &str) -> Option<Node<'_>> {
        let mut node = self.root().descendant_for_byte_range(start, end)?;
        loop {
            if node.kind() == kind && node.start_byte() == start && node.end_byte() == end {
                return Some(node);
            }
            if node.start_byte() < start || node.end_byte() > end {
                return None;
            }
            node = node.parent()?;
        }
    }

    /// Whitespace characters between the start of the line holding `offset`
    /// and `offset`, with everything else on that stretch dropped
    pub fn line_indent(&self, offset: usize) -> String {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line_start = self.text[..offset].rfind('\n').map_or(0, |i| i + 1);
        self.text[line_start..offset]
            .chars()
            .filter(|c| c.is_whitespace())
            .collect()
    }
}

/// Blank everything outside `<script>` blocks, keeping newlines and byte length.
/// Returns the masked text and the `lang` attribute of the first script block.
fn mask_vue_scripts(text: &str) -> (String, Option<String>) {
    let mut masked: Vec<u8> = text
        .bytes()
        .map(|b| if b == b'\n' { b'\n' } else { b' ' })
        .collect();
    let mut lang = None;

    for caps in SCRIPT_BLOCK.captures_iter(text) {
        if lang.is_none() {
            lang = caps
                .get(1)
                .and_then(|attrs| LANG_ATTR.captures(attrs.as_str()))
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_ascii_lowercase());
        }
        if let Some(body) = caps.get(2) {
            masked[body.range()].copy_from_slice(&text.as_bytes()[body.range()]);
        }
    }

    // Only ASCII spaces were introduced and script bodies are copied whole
    let masked = String::from_utf8(masked).unwrap_or_default();
    (masked, lang)
}
