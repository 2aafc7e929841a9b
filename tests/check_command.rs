//! Integration test: `chatscroll --check N` runs headlessly and prints a
//! JSON validation report.

use std::process::Command;

fn run_check(args: &[&str]) -> (bool, serde_json::Value) {
    let output = Command::new(env!("CARGO_BIN_EXE_chatscroll"))
        .args(args)
        .env_remove("CHATSCROLL_CONFIG")
        .env_remove("CHATSCROLL_SEED")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute binary");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let report = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not a JSON report ({e}): {stdout}"));
    (output.status.success(), report)
}

#[test]
fn check_reports_all_structural_checks() {
    // GIVEN/WHEN: a seeded headless run
    let (success, report) = run_check(&["--check", "40", "--seed", "7"]);

    // THEN: every check passed and the exit code says so
    assert!(success, "{report:#}");
    for key in [
        "layout_non_overlap",
        "media_aspect_ratio_ok",
        "time_header_stability",
        "accessibility_smoke",
    ] {
        assert_eq!(report[key]["status"], "pass", "{key}: {report:#}");
    }
    assert_eq!(report["seed"], 7);
    assert_eq!(report["inserts"], 40);
}

#[test]
fn check_is_reproducible_for_a_seed() {
    let (_, a) = run_check(&["--check", "25", "--seed", "3"]);
    let (_, b) = run_check(&["--check", "25", "--seed", "3"]);

    assert_eq!(a["entry_count"], b["entry_count"]);
    assert_eq!(a["frames"], b["frames"]);
}

#[test]
fn check_honours_eviction_caps() {
    let (success, report) = run_check(&[
        "--check",
        "60",
        "--seed",
        "1",
        "--max-headers",
        "3",
        "--max-messages",
        "15",
    ]);

    assert!(success, "{report:#}");
    assert!(report["entry_count"].as_u64().unwrap() <= 18);
}
