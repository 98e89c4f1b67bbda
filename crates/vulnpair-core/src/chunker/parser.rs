//! Language parsing wrapper used by extraction passes.

use std::path::Path;

use crate::chunker::languages::{Language, LanguageTable};
use crate::errors::{VulnPairError, VulnPairResult};

/// Parsed source unit: raw bytes plus the tree built over them.
///
/// Byte offsets of every node index into `content`; the tree never outlives
/// the unit.
pub struct ParsedUnit {
    pub path: String,
    pub language: Language,
    pub content: Vec<u8>,
    pub tree: tree_sitter::Tree,
}

impl ParsedUnit {
    /// Text of `node`, decoded lossily from the raw bytes.
    pub fn node_text(&self, node: tree_sitter::Node<'_>) -> String {
        node_text(&self.content, node)
    }
}

/// Lossy UTF-8 text of a node's byte range. Invalid sequences become U+FFFD.
pub fn node_text(content: &[u8], node: tree_sitter::Node<'_>) -> String {
    byte_range_text(content, node.start_byte(), node.end_byte())
}

pub fn byte_range_text(content: &[u8], start: usize, end: usize) -> String {
    let end = end.min(content.len());
    let start = start.min(end);
    String::from_utf8_lossy(&content[start..end]).into_owned()
}

pub fn parse_bytes(language: Language, content: &[u8]) -> VulnPairResult<tree_sitter::Tree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.ts_language())
        .map_err(|e| VulnPairError::Parse(format!("Failed to set language: {e}")))?;
    parser.parse(content, None).ok_or_else(|| {
        VulnPairError::Parse(format!("{} parser returned no tree", language.grammar_id()))
    })
}

/// Parse `content` with the grammar the table assigns to `extension`.
///
/// Callers are expected to filter by [`LanguageTable::for_extension`] first;
/// an unknown extension is reported as `UnsupportedExtension`.
pub fn parse(
    table: &LanguageTable,
    extension: &str,
    content: &[u8],
) -> VulnPairResult<tree_sitter::Tree> {
    let language = table
        .for_extension(extension)
        .ok_or_else(|| VulnPairError::UnsupportedExtension(extension.to_string()))?;
    parse_bytes(language, content)
}

pub fn parse_file(table: &LanguageTable, path: &Path) -> VulnPairResult<ParsedUnit> {
    let language = table
        .for_path(path)
        .ok_or_else(|| VulnPairError::UnsupportedExtension(path.display().to_string()))?;
    let content = std::fs::read(path)?;
    let tree = parse_bytes(language, &content)?;
    Ok(ParsedUnit {
        path: path.to_string_lossy().to_string(),
        language,
        content,
        tree,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_c_root() {
        let table = LanguageTable::standard();
        let tree = parse(&table, ".c", b"int main(void) { return 0; }").unwrap();
        assert_eq!(tree.root_node().kind(), "translation_unit");
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_parse_unsupported_extension() {
        let table = LanguageTable::standard();
        let err = parse(&table, ".rb", b"def x; end").unwrap_err();
        assert!(matches!(err, VulnPairError::UnsupportedExtension(ref e) if e == ".rb"));
    }

    #[test]
    fn test_node_text_is_lossy() {
        let table = LanguageTable::standard();
        let content = b"int f(void) { char *s = \"\xff\xfe\"; return 0; }".to_vec();
        let tree = parse(&table, ".c", &content).unwrap();
        let text = node_text(&content, tree.root_node());
        assert!(text.contains('\u{FFFD}'));
        assert!(text.starts_with("int f(void)"));
    }

    #[test]
    fn test_byte_range_text_clamps() {
        assert_eq!(byte_range_text(b"abc", 1, 10), "bc");
        assert_eq!(byte_range_text(b"abc", 5, 2), "");
    }
}
