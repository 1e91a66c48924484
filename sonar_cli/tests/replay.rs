use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("cfg.toml");
    fs::write(
        &path,
        "[pins]\ntrigger = 23\necho = 24\nbutton1 = 17\nbutton2 = 27\n",
    )
    .unwrap();
    path
}

fn replay(dir: &Path, trace: &str, extra: &[&str]) -> assert_cmd::assert::Assert {
    let cfg = write_config(dir);
    let trace_path = dir.join("trace.csv");
    fs::write(&trace_path, trace).unwrap();
    Command::cargo_bin("sonar_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace_path)
        .args(extra)
        .assert()
}

#[test]
fn replay_shows_hold_and_slew_limit() {
    let dir = tempdir().unwrap();
    // 500 mm, a miss, then a jump to 1800 mm.
    replay(dir.path(), "tick,echo_us\n0,2915\n1,0\n2,10496\n", &[])
        .success()
        .stdout("btn1,btn2,pot,dist_mm\n0,0,0,500\n0,0,0,500\n0,0,0,520\n");
}

#[test]
fn replay_fills_missing_ticks_as_misses() {
    let dir = tempdir().unwrap();
    replay(dir.path(), "tick,echo_us\n10,2915\n12,10496\n", &["--no-header"])
        .success()
        .stdout("0,0,0,500\n0,0,0,500\n0,0,0,520\n");
}

#[test]
fn replay_rejects_out_of_range_as_held() {
    let dir = tempdir().unwrap();
    // 20 mm is below the valid window and never replaces the hold.
    replay(dir.path(), "tick,echo_us\n0,2915\n1,117\n", &["--no-header"])
        .success()
        .stdout("0,0,0,500\n0,0,0,500\n");
}

#[test]
fn replay_reports_bad_trace_header() {
    let dir = tempdir().unwrap();
    replay(dir.path(), "t,width\n0,2915\n", &[])
        .failure()
        .stderr(predicate::str::contains("Invalid headers in echo trace CSV"));
}

#[test]
fn replay_reports_unordered_ticks() {
    let dir = tempdir().unwrap();
    replay(dir.path(), "tick,echo_us\n3,2915\n1,2915\n", &[])
        .failure()
        .stderr(predicate::str::contains("strictly increasing"));
}
