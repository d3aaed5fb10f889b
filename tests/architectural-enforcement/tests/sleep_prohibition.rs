//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code waits on channels, timers it owns, or I/O,
//! never on a bare sleep.
//! **Exceptions**: The widget's animation timer task, frame rate limiting
//! in the TUI event loop, test code.

use architectural_enforcement::{
    code_part, enclosing_fn, is_in_test_module, production_sources, SourceFile,
};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ Sleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }

        eprintln!("\n✅ ACCEPTABLE sleep uses:");
        eprintln!("  - AnimationTimer::spawn in widget/core/src/lifecycle.rs");
        eprintln!("  - Frame rate limiting in tui/src/app.rs");
        eprintln!("  - #[cfg(test)] modules");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleep in polling loops");
        eprintln!("  - Sleep as poor man's synchronization");
        eprintln!("  - std::thread::sleep anywhere");

        panic!(
            "\nFound {} sleep violation(s) in production code.",
            violations.len()
        );
    }
}

/// Find all sleep() calls in production code
fn find_sleep_violations() -> Vec<String> {
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
        if !(code.contains("::sleep(") || code.contains(".sleep(")) {
            continue;
        }

        if code.contains("thread::sleep") {
            violations.push(format!(
                "{}:{} - Blocking thread sleep: {}",
                file.path.display(),
                idx + 1,
                line.trim()
            ));
            continue;
        }

        if is_in_test_module(&lines, idx) {
            continue;
        }

        if file.is("widget/core/src/lifecycle.rs") && is_animation_timer(&lines, idx) {
            continue;
        }

        if file.is("tui/src/app.rs") && is_frame_limiting_context(&lines, idx) {
            continue;
        }

        violations.push(format!(
            "{}:{} - {}",
            file.path.display(),
            idx + 1,
            line.trim()
        ));
    }
}

/// Check if sleep is the animation timer's delay
fn is_animation_timer(lines: &[&str], current_idx: usize) -> bool {
    enclosing_fn(lines, current_idx).is_some_and(|sig| sig.contains("fn spawn"))
}

/// Check if sleep is used for frame rate limiting
fn is_frame_limiting_context(lines: &[&str], current_idx: usize) -> bool {
    let context_range = current_idx.saturating_sub(5)..std::cmp::min(current_idx + 2, lines.len());

    lines[context_range].iter().any(|line| {
        let line = line.to_lowercase();
        line.contains("frame") || line.contains("fps")
    })
}

#[test]
fn test_frame_limiting_detection() {
    let code = vec![
        "async fn run() {",
        "    let frame_duration = Duration::from_millis(33); // ~30 FPS",
        "    loop {",
        "        render();",
        "        tokio::time::sleep(frame_duration).await;",
        "    }",
        "}",
    ];
    assert!(is_frame_limiting_context(&code, 4));
}

#[test]
fn test_animation_timer_detection() {
    let code = vec![
        "    pub fn spawn<T>(delay: Duration, tx: Sender<T>, event: T) -> Self",
        "    where",
        "        T: Send + 'static,",
        "    {",
        "        let handle = tokio::spawn(async move {",
        "            tokio::time::sleep(delay).await;",
    ];
    assert!(is_animation_timer(&code, 5));

    let code = vec!["async fn retry() {", "    tokio::time::sleep(d).await;"];
    assert!(!is_animation_timer(&code, 1));
}
