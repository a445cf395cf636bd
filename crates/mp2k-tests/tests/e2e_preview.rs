//! End-to-End Preview Tests for mp2k
//!
//! Tests verify the full flow a user runs:
//! - Index a sound tree and pick a voice group
//! - Map MIDI channels onto the group's slots
//! - Stage, configure, build, and launch through the orchestrator
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mp2k-tests --test e2e_preview
//! ```

use std::fs;
use std::path::PathBuf;

use mp2k_core::{
    ChannelVoiceMap, ErrorKind, PipelineResult, PreviewRequest, RewriteMode, RewritePlan, Stage,
    VoiceKind,
};
use mp2k_preview::{Orchestrator, OrchestratorConfig, DEFAULT_PREVIEW_SLOT};
use mp2k_tests::fixtures::{program_offsets, ROUTE101_GROUP};
use mp2k_tests::{BuildOutcome, RecordingToolchain, SmfBuilder, TestHarness, TrackBuilder};
use pretty_assertions::assert_eq;

fn piano_and_strings() -> Vec<u8> {
    SmfBuilder::new()
        .track(
            TrackBuilder::new()
                .meta(0, 0x51, &[0x07, 0xA1, 0x20])
                .program(0, 0, 0)
                .note_on(0, 0, 60, 100)
                .note_off(96, 0, 60),
        )
        .track(
            TrackBuilder::new()
                .program(0, 1, 48)
                .note_on(0, 1, 64, 90)
                .note_off(96, 1, 64),
        )
        .build()
}

fn request(repo: PathBuf, midi: PathBuf) -> PreviewRequest {
    PreviewRequest::new(repo, midi, "route101", "mgba")
}

// ============================================================================
// Full Scenario
// ============================================================================

/// Index, map channel 0 to slot 2, and preview with default playback values.
#[test]
fn test_index_map_and_preview() {
    let harness = TestHarness::new();
    harness.write_manifest(&["voicegroups/route101.inc"]);
    harness.write_voicegroups("voicegroups/route101.inc", ROUTE101_GROUP);
    let repo = harness.fake_repo();
    let midi = harness.write("song.mid", piano_and_strings());

    let index = mp2k_voicegroup::index(&harness.sound_dir()).unwrap();
    let group = index.get("route101").unwrap();
    let kinds: Vec<VoiceKind> = group.entries().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![VoiceKind::Direct, VoiceKind::Square, VoiceKind::Direct]
    );

    let mut map = ChannelVoiceMap::new();
    map.insert(0, 2).unwrap();
    let req = request(repo.clone(), midi.clone())
        .rewrite(RewritePlan::new(map, RewriteMode::RewriteAll));

    let toolchain = RecordingToolchain::default();
    let orchestrator = Orchestrator::with_toolchain(OrchestratorConfig::default(), toolchain);
    let mut stages = Vec::new();
    let report = orchestrator.run_with_observer(&req, |stage| stages.push(stage));

    assert_eq!(
        report.result,
        PipelineResult::Success {
            rom_path: harness.rom_path()
        }
    );
    assert_eq!(
        stages,
        vec![
            Stage::Validating,
            Stage::Staging,
            Stage::ConfigWriting,
            Stage::Building,
            Stage::ArtifactCheck,
            Stage::Launching,
            Stage::Done,
        ]
    );
    assert_eq!(report.timings.len(), 6);

    // Staged MIDI: channel 0 now selects slot 2, everything else untouched.
    let original = fs::read(&midi).unwrap();
    let staged = fs::read(repo.join(DEFAULT_PREVIEW_SLOT)).unwrap();
    assert_eq!(staged.len(), original.len());
    let offsets = program_offsets(&original);
    assert_eq!(offsets.len(), 2);
    for (i, (a, b)) in original.iter().zip(&staged).enumerate() {
        if i == offsets[0].1 {
            assert_eq!(*b, 2);
        } else {
            assert_eq!(a, b, "byte {} changed", i);
        }
    }
    let summary = report.rewrite.unwrap();
    assert_eq!(summary.rewritten, 1);
    assert_eq!(summary.passed_through, 1);

    // midi.cfg: only the preview line changed.
    let cfg = harness.read_string("repo/sound/songs/midi/midi.cfg");
    let lines: Vec<&str> = cfg.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "mus_route101.mid: -E -R50 -G_route101 -V080");
    assert!(lines[1].contains("-R50 -G_route101 -V090"));
    assert_eq!(lines[2], "mus_route110.mid: -E -R50 -G_route110 -V080");

    assert_eq!(
        *orchestrator.toolchain().launches.borrow(),
        vec![(PathBuf::from("mgba"), harness.rom_path())]
    );
}

/// Without a rewrite plan the staged file is a byte copy of the source.
#[test]
fn test_preview_without_mapping_stages_copy() {
    let harness = TestHarness::new();
    let repo = harness.fake_repo();
    let midi = harness.write("song.mid", piano_and_strings());

    let orchestrator =
        Orchestrator::with_toolchain(OrchestratorConfig::default(), RecordingToolchain::default());
    let report = orchestrator.run(&request(repo.clone(), midi.clone()));

    assert!(report.result.is_success());
    assert!(report.rewrite.is_none());
    assert_eq!(
        fs::read(repo.join(DEFAULT_PREVIEW_SLOT)).unwrap(),
        fs::read(&midi).unwrap()
    );
}

/// A config without a preview line gets one appended.
#[test]
fn test_preview_appends_missing_cfg_line() {
    let harness = TestHarness::new();
    let repo = harness.fake_repo();
    harness.write(
        "repo/sound/songs/midi/midi.cfg",
        "mus_route101.mid: -E -R50 -G_route101 -V080",
    );
    let midi = harness.write("song.mid", piano_and_strings());

    let orchestrator =
        Orchestrator::with_toolchain(OrchestratorConfig::default(), RecordingToolchain::default());
    let req = request(repo, midi).volume(127).reverb(0).priority(15);
    assert!(orchestrator.run(&req).result.is_success());

    assert_eq!(
        harness.read_string("repo/sound/songs/midi/midi.cfg"),
        "mus_route101.mid: -E -R50 -G_route101 -V080\n\
         mus_preview.mid: -E -R00 -G_route101 -V127 -P15\n"
    );
}

// ============================================================================
// Failure Classification
// ============================================================================

/// Each failing stage stops the run and reports the stage and kind.
#[test]
fn test_failures_stop_at_their_stage() {
    struct Case {
        name: &'static str,
        toolchain: RecordingToolchain,
        midi: Vec<u8>,
        priority: u8,
        expected: (Stage, ErrorKind),
        builds: usize,
    }

    let valid = piano_and_strings();
    let cases = vec![
        Case {
            name: "not a midi",
            toolchain: RecordingToolchain::default(),
            midi: b"RIFF\x00\x00\x00\x00WAVE".to_vec(),
            priority: 0,
            expected: (Stage::Validating, ErrorKind::InvalidFormat),
            builds: 0,
        },
        Case {
            name: "priority out of range",
            toolchain: RecordingToolchain::default(),
            midi: valid.clone(),
            priority: 16,
            expected: (Stage::ConfigWriting, ErrorKind::RangeError),
            builds: 0,
        },
        Case {
            name: "build fails",
            toolchain: RecordingToolchain::new(BuildOutcome::Fail),
            midi: valid.clone(),
            priority: 0,
            expected: (Stage::Building, ErrorKind::BuildFailure),
            builds: 1,
        },
        Case {
            name: "no rom",
            toolchain: RecordingToolchain::new(BuildOutcome::NoRom),
            midi: valid.clone(),
            priority: 0,
            expected: (Stage::ArtifactCheck, ErrorKind::MissingArtifact),
            builds: 1,
        },
        Case {
            name: "no emulator",
            toolchain: RecordingToolchain::default().without_emulator(),
            midi: valid.clone(),
            priority: 0,
            expected: (Stage::Launching, ErrorKind::NotFound),
            builds: 1,
        },
    ];

    for case in cases {
        let harness = TestHarness::new();
        let repo = harness.fake_repo();
        let midi = harness.write("song.mid", &case.midi);
        let orchestrator =
            Orchestrator::with_toolchain(OrchestratorConfig::default(), case.toolchain);
        let req = request(repo, midi).priority(case.priority);

        let report = orchestrator.run(&req);
        assert_eq!(
            report.result.failure(),
            Some(case.expected),
            "case '{}': {}",
            case.name,
            report.result
        );
        assert_eq!(
            orchestrator.toolchain().builds.borrow().len(),
            case.builds,
            "case '{}'",
            case.name
        );
    }
}

/// An out-of-range mapping fails while staging and leaves no staged file.
#[test]
fn test_out_of_range_mapping_fails_in_staging() {
    let harness = TestHarness::new();
    let repo = harness.fake_repo();
    let midi = harness.write("song.mid", piano_and_strings());

    let mut map = ChannelVoiceMap::new();
    map.insert(0, 128).unwrap();
    let req = request(repo.clone(), midi)
        .rewrite(RewritePlan::new(map, RewriteMode::RewriteAll));

    let orchestrator =
        Orchestrator::with_toolchain(OrchestratorConfig::default(), RecordingToolchain::default());
    let report = orchestrator.run(&req);

    assert_eq!(
        report.result.failure(),
        Some((Stage::Staging, ErrorKind::RangeError))
    );
    assert!(!repo.join(DEFAULT_PREVIEW_SLOT).exists());
    assert_eq!(
        harness.read_string("repo/sound/songs/midi/midi.cfg"),
        mp2k_tests::harness::SAMPLE_MIDI_CFG
    );
}

/// A missing MIDI file is reported as not found, before anything is touched.
#[test]
fn test_missing_midi_is_not_found() {
    let harness = TestHarness::new();
    let repo = harness.fake_repo();
    let orchestrator =
        Orchestrator::with_toolchain(OrchestratorConfig::default(), RecordingToolchain::default());

    let report = orchestrator.run(&request(repo, harness.path().join("gone.mid")));
    assert_eq!(
        report.result.failure(),
        Some((Stage::Validating, ErrorKind::NotFound))
    );
    assert!(report.staged_midi.is_none());
}

/// The JSON form of a report carries the stage and kind names.
#[test]
fn test_report_serializes_failure() {
    let harness = TestHarness::new();
    let repo = harness.fake_repo();
    let midi = harness.write("song.mid", piano_and_strings());
    let orchestrator = Orchestrator::with_toolchain(
        OrchestratorConfig::default(),
        RecordingToolchain::new(BuildOutcome::Fail),
    );

    let report = orchestrator.run(&request(repo, midi));
    let json = serde_json::to_value(&report).unwrap();
    let text = json.to_string();
    assert!(text.contains("Building"), "{}", text);
    assert!(text.contains("BuildFailure"), "{}", text);
    assert!(json["staged_midi"].is_string());
}
