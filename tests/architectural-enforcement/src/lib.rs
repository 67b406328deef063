//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No blocking I/O inside async functions
//! - No sleeping in production code
//! - The core crate stays headless (no CLI or subscriber crates)
//!
//! The helpers here do a line-based scan of production sources. Everything
//! from a `#[cfg(test)]` line to the end of a file is treated as test code.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source roots, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["catalog/core/src", "catalog/cli/src"];

/// Core library source root, relative to the workspace root
pub const CORE_DIR: &str = "catalog/core/src";

/// One offending line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File the line was found in
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// What rule was broken
    pub rule: &'static str,
    /// The offending source line, trimmed
    pub source: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.rule,
            self.source
        )
    }
}

/// A production line handed to a rule
#[derive(Debug, Clone, Copy)]
pub struct CodeLine<'a> {
    /// Code with any trailing `//` comment removed
    pub code: &'a str,
    /// Whether the enclosing function is `async`
    pub in_async_fn: bool,
}

/// Absolute path of the workspace root
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Resolve a workspace-relative directory, panicking if it does not exist
///
/// A missing directory would make every scan pass vacuously.
#[must_use]
pub fn source_dir(relative: &str) -> PathBuf {
    let path = workspace_root().join(relative);
    assert!(
        path.is_dir(),
        "source directory {} not found",
        path.display()
    );
    path
}

/// Run `rule` over every production line of every `.rs` file under `dir`
///
/// `rule` returns the name of the broken rule, or `None` if the line is fine.
pub fn scan_directory<F>(dir: &Path, rule: F) -> Vec<Violation>
where
    F: Fn(CodeLine<'_>) -> Option<&'static str>,
{
    let mut violations = Vec::new();

    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
    {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("rs") {
            continue;
        }
        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue;
        };
        violations.extend(scan_source(entry.path(), &content, &rule));
    }

    violations
}

/// Run `rule` over the production lines of one file's contents
pub fn scan_source<F>(path: &Path, content: &str, rule: &F) -> Vec<Violation>
where
    F: Fn(CodeLine<'_>) -> Option<&'static str>,
{
    let mut violations = Vec::new();
    let mut in_async_fn = false;

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with("#[cfg(test)]") {
            break;
        }
        if trimmed.starts_with("//") {
            continue;
        }

        let code = line.split("//").next().unwrap_or(line);
        if let Some(is_async) = fn_header(code) {
            in_async_fn = is_async;
        } else if trimmed.starts_with("impl ") || trimmed.starts_with("mod ") {
            in_async_fn = false;
        }

        if let Some(rule_name) = rule(CodeLine { code, in_async_fn }) {
            violations.push(Violation {
                path: path.to_path_buf(),
                line: idx + 1,
                rule: rule_name,
                source: trimmed.to_string(),
            });
        }
    }

    violations
}

/// If `code` opens a function, whether that function is `async`
fn fn_header(code: &str) -> Option<bool> {
    let mut words = code.split_whitespace().peekable();
    let mut is_async = false;

    while let Some(word) = words.next() {
        match word {
            "pub" | "const" | "unsafe" | "extern" => {}
            w if w.starts_with("pub(") => {}
            "async" => is_async = true,
            "fn" => return words.peek().map(|_| is_async),
            _ => return None,
        }
    }

    None
}

/// Panic with every violation listed
pub fn report(title: &str, guidance: &[&str], violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!();
    for line in guidance {
        eprintln!("  {line}");
    }

    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn async_lines(source: &str) -> Vec<usize> {
        scan_source(Path::new("x.rs"), source, &|line: CodeLine<'_>| {
            line.in_async_fn.then_some("async")
        })
        .into_iter()
        .map(|v| v.line)
        .collect()
    }

    #[test]
    fn test_fn_header_detection() {
        assert_eq!(fn_header("fn main() {"), Some(false));
        assert_eq!(fn_header("    pub async fn fetch(&self) {"), Some(true));
        assert_eq!(fn_header("pub(crate) fn decode(body: &str)"), Some(false));
        assert_eq!(fn_header("let f = fn_name();"), None);
        assert_eq!(fn_header("// fn commented"), None);
    }

    #[test]
    fn test_tracks_enclosing_async_fn() {
        let source = "fn a() {\n    x();\n}\nasync fn b() {\n    y();\n}\n";
        assert_eq!(async_lines(source), vec![4, 5, 6]);
    }

    #[test]
    fn test_stops_at_test_module() {
        let source = "async fn a() {\n}\n#[cfg(test)]\nmod tests {\n    async fn t() {}\n}\n";
        assert_eq!(async_lines(source), vec![1, 2]);
    }
}
