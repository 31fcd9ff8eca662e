//! Document identity owned by the session.

use std::path::{Path, PathBuf};

/// Markdown file extensions accepted for preview (lowercase).
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkdn", "mkd"];

/// The single document a session is previewing.
///
/// Owned exclusively by the session and replaced wholesale on each load.
/// Content is deliberately not cached here: every render re-reads the file
/// so a burst of change signals collapses to "render reflects latest
/// observed content".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path of the previewed file.
    pub path: PathBuf,
    /// Parent directory; the page's base resource location.
    pub base_dir: PathBuf,
}

impl Document {
    pub fn new(path: PathBuf) -> Self {
        let base_dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { path, base_dir }
    }

    /// Whether the path carries a known markdown extension
    /// (case-insensitive).
    pub fn is_markdown_path(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                MARKDOWN_EXTENSIONS.iter().any(|known| *known == ext)
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_is_parent() {
        let doc = Document::new(PathBuf::from("/docs/notes/todo.md"));
        assert_eq!(doc.base_dir, PathBuf::from("/docs/notes"));
    }

    #[test]
    fn test_base_dir_for_bare_file_name() {
        let doc = Document::new(PathBuf::from("todo.md"));
        assert_eq!(doc.base_dir, PathBuf::from("."));
    }

    #[test]
    fn test_is_markdown_path() {
        assert!(Document::is_markdown_path(Path::new("README.md")));
        assert!(Document::is_markdown_path(Path::new("notes.MARKDOWN")));
        assert!(Document::is_markdown_path(Path::new("a/b/c.mkd")));
        assert!(!Document::is_markdown_path(Path::new("file.txt")));
        assert!(!Document::is_markdown_path(Path::new("no_extension")));
    }
}
