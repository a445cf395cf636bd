//! Preview Runs Against Real Processes
//!
//! Drives the orchestrator with [`SystemToolchain`] using `sh` as both the
//! build tool and the emulator. The "ROM" the fake build produces is itself a
//! shell script, so launching it leaves a marker file behind.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mp2k-tests --test system_toolchain
//! ```

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use mp2k_core::{ErrorKind, PipelineResult, PreviewRequest, Stage};
use mp2k_preview::{Orchestrator, OrchestratorConfig};
use mp2k_tests::{SmfBuilder, TestHarness, TrackBuilder};

fn song() -> Vec<u8> {
    SmfBuilder::new()
        .track(TrackBuilder::new().program(0, 0, 1).note_on(0, 0, 60, 100))
        .build()
}

/// Writes `build.sh` into the repo and returns a config that runs it with
/// `sh` and no clean step.
fn sh_config(harness: &TestHarness, script: &str) -> OrchestratorConfig {
    let build = harness.write("repo/build.sh", script);
    OrchestratorConfig::default()
        .build_program("sh")
        .build_args([build.display().to_string()])
        .clean_first(false)
}

fn wait_for(path: &Path) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if path.is_file() {
            return true;
        }
        thread::sleep(Duration::from_millis(50));
    }
    false
}

/// Build produces a ROM, the emulator is started on it and returns at once.
#[test]
fn test_build_and_launch_with_sh() {
    let harness = TestHarness::new();
    let repo = harness.fake_repo();
    let midi = harness.write("song.mid", song());
    let marker = harness.path().join("launched.txt");
    harness.write(
        "repo/rom.sh",
        format!("echo launched > \"{}\"\n", marker.display()),
    );

    let config = sh_config(&harness, "cp rom.sh pokeemerald.gba\n");
    let request = PreviewRequest::new(repo, midi, "route101", "sh");
    let report = Orchestrator::with_config(config).run(&request);

    assert_eq!(
        report.result,
        PipelineResult::Success {
            rom_path: harness.rom_path()
        }
    );
    assert!(wait_for(&marker), "emulator never ran the ROM");
}

/// A failing build reports its exit status and the tail of stderr.
#[test]
fn test_failing_build_reports_stderr() {
    let harness = TestHarness::new();
    let repo = harness.fake_repo();
    let midi = harness.write("song.mid", song());

    let config = sh_config(
        &harness,
        "echo 'compiling...' >&2\necho 'sound/songs/midi/mus_preview.s: error' >&2\nexit 2\n",
    );
    let request = PreviewRequest::new(repo, midi, "route101", "sh");
    let report = Orchestrator::with_config(config).run(&request);

    match &report.result {
        PipelineResult::Failed {
            stage,
            error_kind,
            detail,
        } => {
            assert_eq!(*stage, Stage::Building);
            assert_eq!(*error_kind, ErrorKind::BuildFailure);
            assert!(detail.contains("mus_preview.s: error"), "{}", detail);
        }
        other => panic!("expected build failure, got {}", other),
    }
    assert!(!harness.rom_path().exists());
}

/// A build tool that cannot be found fails the build stage as NotFound.
#[test]
fn test_missing_build_tool() {
    let harness = TestHarness::new();
    let repo = harness.fake_repo();
    let midi = harness.write("song.mid", song());

    let config = OrchestratorConfig::default().build_program("mp2k-no-such-make");
    let request = PreviewRequest::new(repo, midi, "route101", "sh");
    let report = Orchestrator::with_config(config).run(&request);

    assert_eq!(
        report.result.failure(),
        Some((Stage::Building, ErrorKind::NotFound))
    );
}

/// An emulator that cannot be found fails the launch stage as NotFound.
#[test]
fn test_missing_emulator() {
    let harness = TestHarness::new();
    let repo = harness.fake_repo();
    let midi = harness.write("song.mid", song());

    let config = sh_config(&harness, "touch pokeemerald.gba\n");
    let emulator = PathBuf::from("mp2k-no-such-emulator");
    let request = PreviewRequest::new(repo, midi, "route101", emulator);
    let report = Orchestrator::with_config(config).run(&request);

    assert_eq!(
        report.result.failure(),
        Some((Stage::Launching, ErrorKind::NotFound))
    );
    assert!(harness.rom_path().exists());
}
