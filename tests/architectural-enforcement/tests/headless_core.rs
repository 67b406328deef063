//! Integration Test: Headless Core
//!
//! **Policy**: `anime-catalog-core` has no presentation concerns. It logs
//! through `tracing` macros and exposes state through watch channels; it never
//! parses arguments, installs a subscriber, or writes to the console. Those
//! belong to the `anime-catalog` binary.

use architectural_enforcement::{report, scan_directory, source_dir, CodeLine, CORE_DIR};

fn surface_concern(line: CodeLine<'_>) -> Option<&'static str> {
    if line.code.contains("clap::") {
        Some("Argument parsing in core")
    } else if line.code.contains("tracing_subscriber") {
        Some("Subscriber setup in core")
    } else if line.code.contains("println!(") || line.code.contains("eprintln!(") {
        Some("Console output in core")
    } else {
        None
    }
}

#[test]
fn test_core_has_no_surface_code() {
    let violations = scan_directory(&source_dir(CORE_DIR), surface_concern);

    report(
        "CRITICAL: Presentation code found in anime-catalog-core!",
        &["✅ Move it to catalog/cli, or log through tracing instead"],
        &violations,
    );
}

#[test]
fn test_core_manifest_has_no_surface_dependencies() {
    let manifest = std::fs::read_to_string(source_dir("catalog/core").join("Cargo.toml"))
        .expect("core manifest readable");

    for forbidden in ["clap", "tracing-subscriber", "anyhow"] {
        let declared = manifest
            .lines()
            .any(|line| line.trim_start().starts_with(&format!("{forbidden} ")));
        assert!(!declared, "anime-catalog-core must not depend on {forbidden}");
    }
}
