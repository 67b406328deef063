//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT sleep. The list and detail layers
//! react to responses and the connectivity observer reacts to events; there
//! is no polling loop that could justify a sleep. Tests may use
//! `tokio::time::timeout` to bound waits.

use architectural_enforcement::{report, scan_directory, source_dir, CodeLine, PRODUCTION_DIRS};

fn sleeps(line: CodeLine<'_>) -> Option<&'static str> {
    (line.code.contains("::sleep(") || line.code.contains(".sleep(")).then_some("Sleep call")
}

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations: Vec<_> = PRODUCTION_DIRS
        .iter()
        .flat_map(|dir| scan_directory(&source_dir(dir), sleeps))
        .collect();

    report(
        "CRITICAL: Sleep calls found in production code!",
        &[
            "❌ FORBIDDEN: sleep in polling loops or as synchronization",
            "✅ REQUIRED: await the response, a watch channel, or an mpsc receiver",
        ],
        &violations,
    );
}

#[test]
fn test_detector_matches_both_forms() {
    for code in ["std::thread::sleep(d);", "tokio::time::sleep(d).await;"] {
        let line = CodeLine {
            code,
            in_async_fn: false,
        };
        assert_eq!(sleeps(line), Some("Sleep call"));
    }
}
