//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce the non-blocking
//! model of the widget core and the terminal surface:
//! - No sleep() calls outside the animation timer and frame limiting
//! - No blocking I/O inside async code
//!
//! The helpers here walk the production sources and locate the function a
//! line belongs to, so each test only has to state its policy.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["widget/core/src", "tui/src"];

/// Workspace root (two levels above this package)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// A production source file split into lines
pub struct SourceFile {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// File contents
    pub content: String,
}

impl SourceFile {
    /// Lines of the file
    pub fn lines(&self) -> Vec<&str> {
        self.content.lines().collect()
    }

    /// Whether the path ends with `suffix` (forward slashes)
    pub fn is(&self, suffix: &str) -> bool {
        self.path.ends_with(suffix)
    }
}

/// Every `.rs` file under the production directories
pub fn production_sources() -> Vec<SourceFile> {
    let root = workspace_root();
    let mut files = Vec::new();

    for dir in PRODUCTION_DIRS {
        let path = root.join(dir);
        assert!(path.exists(), "missing production directory {}", path.display());

        for entry in walkdir::WalkDir::new(&path)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.path().extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(entry.path()) {
                let relative = entry
                    .path()
                    .strip_prefix(&root)
                    .unwrap_or(entry.path())
                    .to_path_buf();
                files.push(SourceFile {
                    path: relative,
                    content,
                });
            }
        }
    }

    files
}

/// Code part of a line (comments stripped)
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Whether the line sits inside a `#[cfg(test)]` module
pub fn is_in_test_module(lines: &[&str], current_idx: usize) -> bool {
    lines[..current_idx]
        .iter()
        .any(|l| l.trim().starts_with("#[cfg(test)]"))
}

/// Signature line of the function enclosing `current_idx`, if any
pub fn enclosing_fn<'a>(lines: &[&'a str], current_idx: usize) -> Option<&'a str> {
    for i in (0..current_idx).rev() {
        let line = lines[i].trim();
        if line.starts_with("fn ")
            || line.starts_with("pub fn ")
            || line.starts_with("async fn ")
            || line.starts_with("pub async fn ")
            || line.contains(" fn ")
        {
            return Some(lines[i]);
        }
    }
    None
}

/// Whether the enclosing function is async
pub fn is_in_async_function(lines: &[&str], current_idx: usize) -> bool {
    enclosing_fn(lines, current_idx).is_some_and(|sig| sig.contains("async fn "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }

    #[test]
    fn test_async_detection() {
        let code = vec![
            "pub async fn load(&self) {",
            "    let x = std::fs::read_to_string(\"a\");",
            "}",
        ];
        assert!(is_in_async_function(&code, 1));

        let code = vec![
            "fn load_config() {",
            "    let x = std::fs::read_to_string(\"a\");",
            "}",
        ];
        assert!(!is_in_async_function(&code, 1));
    }

    #[test]
    fn test_test_module_detection() {
        let code = vec!["fn a() {}", "#[cfg(test)]", "mod tests {", "    fn b() {}"];
        assert!(!is_in_test_module(&code, 0));
        assert!(is_in_test_module(&code, 3));
    }

    #[test]
    fn test_code_part_strips_comments() {
        assert_eq!(code_part("let a = 1; // std::fs::"), "let a = 1; ");
    }
}
