//! Integration tests: cli commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn snowball() -> Command {
    let mut cmd = Command::cargo_bin("snowball").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

/// A two-file roster directory plus a skipped template.
fn roster_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("a.json"),
        r#"{"name": "Alpha", "accuracy": 0.7, "dodge": 0.2}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("b.json"),
        r#"{"name": "Beta", "accuracy": 0.4, "dodge": 0.3, "stray_magnet": 1.5}"#,
    )
    .unwrap();
    fs::write(dir.path().join("_template.json"), r#"{"name": "Template"}"#).unwrap();
    dir
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_prints_timeline_and_scoreboard() {
    snowball()
        .args(["play", "--seed", "7", "--turns", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("seed=7, turns=5"))
        .stdout(predicate::str::contains("[t00]"))
        .stdout(predicate::str::contains("Landed"))
        .stdout(predicate::str::contains("Events"))
        .stdout(predicate::str::contains("Kryssie"));
}

#[test]
fn play_writes_a_jsonl_ledger_with_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out/ledger.jsonl");
    snowball()
        .args(["play", "--turns", "4", "--ledger"])
        .arg(&path)
        .assert()
        .success();

    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    let header: serde_json::Value = serde_json::from_str(lines.next().unwrap()).unwrap();
    assert_eq!(header["event_type"], "LEDGER_HEADER");
    assert_eq!(header["seed"], 42);
    assert_eq!(header["turns"], 4);

    let events: Vec<serde_json::Value> =
        lines.map(|l| serde_json::from_str(l).unwrap()).collect();
    assert!(!events.is_empty());
    assert!(events.iter().all(|e| e["turn"].as_u64().unwrap() <= 4));
}

#[test]
fn same_seed_writes_identical_ledgers() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.jsonl");
    let second = dir.path().join("second.jsonl");
    for path in [&first, &second] {
        snowball()
            .args(["play", "--seed", "1001", "--turns", "12", "--ledger"])
            .arg(path)
            .assert()
            .success();
    }
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn play_summary_json() {
    let output = snowball()
        .args(["play", "--turns", "6", "--summary", "json", "--timeline", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let json_start = stdout.rfind("\n{").unwrap() + 1;
    let summary: serde_json::Value = serde_json::from_str(&stdout[json_start..]).unwrap();
    assert_eq!(summary["turns"], 6);
    assert!(summary["counts"]["HIT"].is_u64());
    assert!(summary["mvp"]["name"].is_string());
}

#[test]
fn play_with_scenario_and_audit() {
    snowball()
        .args([
            "play",
            "--seed",
            "1003",
            "--turns",
            "5",
            "--scenario",
            "hierarchy_test",
            "--audit-mode",
            "stabilize",
            "--audit",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scenario: hierarchy_test"))
        .stdout(predicate::str::contains("JURISDICTION_ERROR"));
}

#[test]
fn play_with_roster_dir_and_no_prologue() {
    let dir = roster_dir();
    snowball()
        .args(["play", "--turns", "3", "--no-prologue", "--roster"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("agents=2"))
        .stdout(predicate::str::contains("Alpha"))
        .stdout(predicate::str::contains("[t00]").not())
        .stdout(predicate::str::contains("Template").not());
}

#[test]
fn play_with_custom_scenario_file() {
    let dir = roster_dir();
    let scenario = dir.path().join("aim.scenario");
    fs::write(
        &scenario,
        r#"{"name": "aim", "actions": [
            {"turn": 1, "actor": "Alpha", "intent": "FORCE_RICOCHET", "target": "Beta"}
        ]}"#,
    )
    .unwrap();
    snowball()
        .args(["play", "--turns", "1", "--no-prologue", "--roster"])
        .arg(dir.path())
        .arg("--scenario")
        .arg(&scenario)
        .assert()
        .success()
        .stdout(predicate::str::contains("RICOCHET_HIT -> Beta"))
        .stdout(predicate::str::contains("[FORCED]"));
}

#[test]
fn play_with_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("sim.json");
    fs::write(&config, r#"{"seed": 5, "turns": 2, "prologue": false}"#).unwrap();
    snowball()
        .args(["play", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("seed=5, turns=2"));
}

#[test]
fn play_classic_mode_fields_the_original_six() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("classic.jsonl");
    snowball()
        .args(["play", "--mode", "classic", "--turns", "3", "--ledger"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("mode=classic"))
        .stdout(predicate::str::contains("agents=6"))
        .stdout(predicate::str::contains("Oracle").not());

    let text = fs::read_to_string(&path).unwrap();
    let header: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert_eq!(header["mode"], "classic");
    assert_eq!(
        header["roster"],
        serde_json::json!(["Ace", "Claude", "Janus", "Kryssie", "Mega", "Quinn"])
    );
}

#[test]
fn play_accepts_council_as_open_mode() {
    snowball()
        .args(["play", "--mode", "council", "--turns", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode=open"))
        .stdout(predicate::str::contains("agents=9"));
}

#[test]
fn play_rejects_unknown_audit_mode() {
    snowball()
        .args(["play", "--audit-mode", "lenient"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lenient"));
}

#[test]
fn play_rejects_unknown_scenario() {
    snowball()
        .args(["play", "--scenario", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scenario"));
}

#[test]
fn play_rejects_missing_roster() {
    snowball()
        .args(["play", "--roster", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// ---------------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------------

#[test]
fn verify_all_passes() {
    snowball()
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS audit"))
        .stdout(predicate::str::contains("PASS hierarchy"))
        .stdout(predicate::str::contains("PASS determinism"))
        .stdout(predicate::str::contains("PASS chaos"))
        .stdout(predicate::str::contains("PASS lock"))
        .stdout(predicate::str::contains("All 5 suite(s) verified."));
}

#[test]
fn verify_single_suite() {
    snowball()
        .args(["verify", "hierarchy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("JURISDICTION_ERROR"))
        .stdout(predicate::str::contains("All 1 suite(s) verified."));
}

// ---------------------------------------------------------------------------
// roster
// ---------------------------------------------------------------------------

#[test]
fn roster_lists_the_sample_council() {
    snowball()
        .arg("roster")
        .assert()
        .success()
        .stdout(predicate::str::contains("Oracle"))
        .stdout(predicate::str::contains("paradox budget 3"))
        .stdout(predicate::str::contains("9 agents, open mode (built-in sample)"));
}

#[test]
fn roster_classic_mode_keeps_legacy_seating() {
    let output = snowball().args(["roster", "--mode", "classic"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let kryssie = stdout.find("Kryssie").unwrap();
    let quinn = stdout.find("Quinn").unwrap();
    assert!(kryssie < quinn);
    assert!(!stdout.contains("Oracle"));
    assert!(stdout.contains("6 agents, classic mode"));
}

#[test]
fn roster_from_directory() {
    let dir = roster_dir();
    snowball()
        .args(["roster", "--roster"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Beta"))
        .stdout(predicate::str::contains("magnet 1.5"))
        .stdout(predicate::str::contains("2 agents"));
}
