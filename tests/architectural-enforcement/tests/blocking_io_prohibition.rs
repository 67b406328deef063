//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async functions in the catalog core and CLI MUST NOT use
//! blocking I/O. Fetches run on the tokio runtime next to every other
//! controller; one blocked worker stalls them all.
//!
//! Blocking calls are acceptable in non-async functions (config loading
//! before the runtime starts, the one-shot route probe) and in test code.

use architectural_enforcement::{report, scan_directory, source_dir, CodeLine, PRODUCTION_DIRS};

const BLOCKING_PATTERNS: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("File::open(", "Blocking file I/O"),
    ("std::net::", "Blocking network I/O"),
    ("TcpStream::connect(", "Blocking network I/O"),
    ("UdpSocket::bind(", "Blocking network I/O"),
    ("std::process::Command", "Blocking process I/O"),
    ("reqwest::blocking", "Blocking HTTP client"),
    ("std::io::stdin()", "Blocking stdin in async"),
];

fn blocking_io(line: CodeLine<'_>) -> Option<&'static str> {
    if !line.in_async_fn {
        return None;
    }
    BLOCKING_PATTERNS
        .iter()
        .find(|(pattern, _)| line.code.contains(pattern))
        .map(|(_, rule)| *rule)
}

/// Test that async production code does not use blocking I/O
#[test]
fn test_no_blocking_io_in_async_code() {
    let violations: Vec<_> = PRODUCTION_DIRS
        .iter()
        .flat_map(|dir| scan_directory(&source_dir(dir), blocking_io))
        .collect();

    report(
        "CRITICAL: Blocking I/O calls found in async code!",
        &[
            "❌ FORBIDDEN in async fn: std::fs, std::net, std::process::Command, reqwest::blocking",
            "✅ REQUIRED: tokio::fs, tokio::net, tokio::process, async reqwest",
            "✅ ACCEPTABLE: non-async functions and test code",
        ],
        &violations,
    );
}

#[test]
fn test_detector_flags_async_only() {
    let flagged = CodeLine {
        code: "    let body = std::fs::read_to_string(path)?;",
        in_async_fn: true,
    };
    let allowed = CodeLine {
        in_async_fn: false,
        ..flagged
    };

    assert_eq!(blocking_io(flagged), Some("Blocking file I/O"));
    assert_eq!(blocking_io(allowed), None);
}
