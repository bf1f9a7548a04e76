use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::process::Command;

#[test]
fn summary_replays_keys_for_continuous_variant() {
    let mut cmd = Command::cargo_bin("hourglass").expect("binary exists");
    cmd.arg("--summary-only").arg("--keys").arg("8 8 + w*10 d*4");
    cmd.assert()
        .success()
        .stdout(contains("Variant: continuous"))
        .stdout(contains("Hourglass: 36 vertices (12 triangles)"))
        .stdout(contains("Grid:").not())
        .stdout(contains("Replayed 5 key event(s)"))
        .stdout(contains(
            "Final transform: translate=(0.00, 0.40) scale=1.20 rotation=(-5.00, 2.00, 0.00)",
        ));
}

#[test]
fn grid_variant_reports_grid_and_single_step_rotation() {
    let mut cmd = Command::cargo_bin("hourglass-grid").expect("binary exists");
    cmd.arg("--summary-only").arg("--keys").arg("x x*20 4");
    cmd.assert()
        .success()
        .stdout(contains("Variant: grid"))
        .stdout(contains("Grid: 42 lines (84 vertices)"))
        .stdout(contains(
            "Final transform: translate=(-0.20, 0.00) scale=1.00 rotation=(10.00, 0.00, 0.00)",
        ));
}

#[test]
fn grid_size_follows_flags() {
    let mut cmd = Command::cargo_bin("hourglass-grid").expect("binary exists");
    cmd.args(["--summary-only", "--grid-extent", "2", "--grid-step", "0.5"]);
    cmd.assert()
        .success()
        .stdout(contains("Grid: 18 lines (36 vertices)"));
}

#[test]
fn exit_key_stops_replay() {
    let mut cmd = Command::cargo_bin("hourglass").expect("binary exists");
    cmd.args(["--summary-only", "--keys", "- Esc -"]);
    cmd.assert()
        .success()
        .stdout(contains("Replayed 2 key event(s)"))
        .stdout(contains("Exit requested"))
        .stdout(contains("scale=0.80"));
}

#[test]
fn unknown_flag_fails() {
    let mut cmd = Command::cargo_bin("hourglass").expect("binary exists");
    cmd.arg("--fullscreen");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --fullscreen"));
}

#[test]
fn bad_key_script_fails() {
    let mut cmd = Command::cargo_bin("hourglass").expect("binary exists");
    cmd.args(["--summary-only", "--keys", "w*many"]);
    cmd.assert()
        .failure()
        .stderr(contains("invalid hold count"));
}

#[test]
fn oversized_grid_fails_cleanly() {
    let mut cmd = Command::cargo_bin("hourglass-grid").expect("binary exists");
    cmd.args([
        "--summary-only",
        "--grid-extent",
        "1e30",
        "--grid-step",
        "1e-30",
    ]);
    cmd.assert()
        .failure()
        .stderr(contains("grid lines"))
        .stdout(contains("Grid:").not());
}

#[test]
fn uneven_grid_step_stays_inside_extent() {
    let mut cmd = Command::cargo_bin("hourglass-grid").expect("binary exists");
    cmd.args(["--summary-only", "--grid-extent", "10", "--grid-step", "0.3"]);
    cmd.assert()
        .success()
        .stdout(contains("Grid: 134 lines (268 vertices)"));
}

#[test]
fn absurd_hold_count_is_rejected() {
    let mut cmd = Command::cargo_bin("hourglass").expect("binary exists");
    cmd.args(["--summary-only", "--keys", "w*4294967295"]);
    cmd.assert()
        .failure()
        .stderr(contains("invalid hold count"));
}
