//! CLI arg parsing tests for dgos
use assert_cmd::Command;

fn run_dgos(args: &[&str]) -> (Option<i32>, String) {
    let td = tempfile::tempdir().unwrap();
    let output = Command::cargo_bin("dgos")
        .unwrap()
        .args(args)
        .env("XDG_CONFIG_HOME", td.path())
        .output()
        .expect("run dgos");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (output.status.code(), text)
}

#[test]
fn test_help_mentions_short_and_long_flags() {
    let (code, text) = run_dgos(&["--help"]);
    assert_eq!(code, Some(0));
    assert!(
        text.contains("--interval-ms")
            && text.contains("-i")
            && text.contains("--profile")
            && text.contains("-P"),
        "help text missing expected flags (--interval-ms/-i, --profile/-P)\n{text}"
    );
}

#[test]
fn test_flags_before_help_are_accepted() {
    for args in [
        &["--interval-ms", "500", "--help"][..],
        &["-i", "500", "--help"][..],
        &["--profile", "dev", "--help"][..],
        &["--timeout-ms", "100", "--help"][..],
    ] {
        let (code, text) = run_dgos(args);
        assert_eq!(code, Some(0), "{args:?} did not succeed: {text}");
        assert!(text.contains("Usage:"));
    }
}

#[test]
fn test_unknown_option_is_rejected() {
    let (code, text) = run_dgos(&["--tls-ca", "/tmp/cert.pem"]);
    assert_eq!(code, Some(2));
    assert!(text.contains("Unknown option"), "{text}");
}

#[test]
fn test_interval_must_be_numeric() {
    let (code, text) = run_dgos(&["--interval-ms", "fast", "http://localhost:8080"]);
    assert_eq!(code, Some(2));
    assert!(text.contains("not a number"), "{text}");
}

#[test]
fn test_dry_run_prints_resolved_endpoint() {
    let (code, text) = run_dgos(&["--dry-run", "-i", "3000", "http://mon.local:8080/"]);
    assert_eq!(code, Some(0), "{text}");
    assert!(text.contains("endpoint: http://mon.local:8080/api/metrics"), "{text}");
    assert!(text.contains("interval_ms: 3000"), "{text}");
}

#[test]
fn test_dry_run_clamps_tiny_interval() {
    let (code, text) = run_dgos(&["--dry-run", "-i", "10", "http://mon.local:8080"]);
    assert_eq!(code, Some(0), "{text}");
    assert!(text.contains("interval_ms: 250"), "{text}");
}

#[test]
fn test_once_in_demo_mode_prints_a_snapshot() {
    let (code, text) = run_dgos(&["--demo", "--once"]);
    assert_eq!(code, Some(0), "{text}");
    assert!(text.contains("\"agents\""), "{text}");
    assert!(text.contains("build-01"), "{text}");
}
