//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async code in the widget core and the TUI MUST NOT use
//! blocking I/O.
//! **Required**: `tokio::fs` for files, `reqwest` (async) for HTTP.
//! **Acceptable**: Non-async functions that run before the runtime does
//! real work (config loading, log file setup), test code.

use architectural_enforcement::{
    code_part, is_in_async_function, is_in_test_module, production_sources, SourceFile,
};

/// Test that production code does not use blocking I/O
#[test]
fn test_no_blocking_io_in_production_code() {
    let violations = find_blocking_io_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ Blocking I/O calls found in async production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }

        eprintln!("\n❌ FORBIDDEN blocking I/O in async code:");
        eprintln!("  - std::fs::read(), std::fs::write(), std::fs::File");
        eprintln!("  - std::net::TcpStream");
        eprintln!("  - std::process::Command");
        eprintln!("\n✅ REQUIRED async I/O:");
        eprintln!("  - tokio::fs::read().await, tokio::fs::write().await");
        eprintln!("  - reqwest::Client::get(..).send().await");

        panic!(
            "\nFound {} blocking I/O violation(s) in production code.",
            violations.len()
        );
    }
}

/// The blocking HTTP client is banned everywhere, async or not
#[test]
fn test_no_blocking_http_client() {
    let mut violations = Vec::new();
    for file in production_sources() {
        for (idx, line) in file.lines().iter().enumerate() {
            if code_part(line).contains("reqwest::blocking") {
                violations.push(format!("{}:{}", file.path.display(), idx + 1));
            }
        }
    }
    assert!(
        violations.is_empty(),
        "reqwest::blocking used at: {:?}",
        violations
    );
}

/// Find all blocking I/O calls inside async functions
fn find_blocking_io_violations() -> Vec<String> {
    let mut violations = Vec::new();
    for file in production_sources() {
        check_file(&file, &mut violations);
    }
    violations
}

fn check_file(file: &SourceFile, violations: &mut Vec<String>) {
    let lines = file.lines();

    for (idx, line) in lines.iter().enumerate() {
        let code = code_part(line);

        let kind = if code.contains("std::fs::") || code.contains("use std::fs") {
            "Blocking file I/O"
        } else if code.contains("std::net::") || code.contains("use std::net") {
            "Blocking network I/O"
        } else if code.contains("std::process::Command") {
            "Blocking process I/O"
        } else {
            continue;
        };

        if is_in_test_module(&lines, idx) {
            continue;
        }

        // Module-level imports count as async use; anything else only inside async fns
        let is_import = code.trim_start().starts_with("use ");
        if !is_import && !is_in_async_function(&lines, idx) {
            continue;
        }

        violations.push(format!(
            "{}:{} - {}: {}",
            file.path.display(),
            idx + 1,
            kind,
            line.trim()
        ));
    }
}

#[test]
fn test_sync_loader_is_acceptable() {
    let code = vec![
        "pub fn load_config_from_path(path: Option<PathBuf>) -> Result<WidgetConfig> {",
        "    let text = std::fs::read_to_string(path)?;",
        "}",
    ];
    assert!(!is_in_async_function(&code, 1));
}
