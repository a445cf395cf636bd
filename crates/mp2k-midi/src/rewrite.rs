//! Program-change rewriting.
//!
//! The output is the input with some program bytes replaced. Nothing else in
//! the container changes: chunk layout, track count and order, time division,
//! deltas, running status, and every non-program-change event are
//! byte-identical.

use mp2k_core::{ChannelVoiceMap, RewriteMode, MAX_CHANNEL};
use serde::Serialize;
use std::path::Path;

use crate::error::{MidiError, MidiResult};
use crate::smf::{chunks, parse_header, walk_track};

/// Counts of what a rewrite touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteSummary {
    /// Track chunks walked.
    pub tracks: usize,
    /// Program changes whose program byte was set from the map.
    pub rewritten: usize,
    /// Program changes left as they were.
    pub passed_through: usize,
}

/// Rewrites program changes in `input` according to `map`.
///
/// A program change whose resolved target falls outside 0-127 fails the whole
/// rewrite with a range error and nothing is returned. Targets on channels that
/// never change program are not checked.
pub fn rewrite(input: &[u8], map: &ChannelVoiceMap, mode: RewriteMode) -> MidiResult<Vec<u8>> {
    rewrite_with_summary(input, map, mode).map(|(bytes, _)| bytes)
}

/// Like [`rewrite`], also returning a [`RewriteSummary`].
pub fn rewrite_with_summary(
    input: &[u8],
    map: &ChannelVoiceMap,
    mode: RewriteMode,
) -> MidiResult<(Vec<u8>, RewriteSummary)> {
    let (_, header_end) = parse_header(input)?;

    let mut output = input.to_vec();
    let mut summary = RewriteSummary::default();
    // Tracked per channel across all tracks, not per track.
    let mut rewritten_once = [false; MAX_CHANNEL as usize + 1];

    for chunk in chunks(input, header_end)?.iter().filter(|c| c.is_track()) {
        summary.tracks += 1;
        walk_track(input, chunk, |event| {
            let Some((channel, offset)) = event.program_change() else {
                return Ok(());
            };
            let seen = &mut rewritten_once[usize::from(channel)];
            if mode == RewriteMode::RewriteFirstOnly && *seen {
                summary.passed_through += 1;
                return Ok(());
            }
            match map.target_for(channel)? {
                Some(program) => {
                    output[offset] = program;
                    *seen = true;
                    summary.rewritten += 1;
                }
                None => summary.passed_through += 1,
            }
            Ok(())
        })?;
    }

    Ok((output, summary))
}

/// Reads `input`, rewrites it, and writes the result to `output`.
///
/// The output file (and its parent directories) is only created when the
/// rewrite succeeds.
pub fn rewrite_file(
    input: &Path,
    output: &Path,
    map: &ChannelVoiceMap,
    mode: RewriteMode,
) -> MidiResult<RewriteSummary> {
    let bytes = std::fs::read(input).map_err(|e| MidiError::read(input, e))?;
    let (rewritten, summary) = rewrite_with_summary(&bytes, map, mode)?;

    let write_err = |source| MidiError::Write {
        path: output.to_path_buf(),
        source,
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(output, rewritten).map_err(write_err)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp2k_core::{ErrorKind, PreviewFailure};
    use pretty_assertions::assert_eq;

    fn smf(tracks: &[&[u8]]) -> Vec<u8> {
        let mut out = b"MThd\x00\x00\x00\x06\x00\x01".to_vec();
        out.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
        out.extend_from_slice(&96u16.to_be_bytes());
        for track in tracks {
            out.extend_from_slice(b"MTrk");
            out.extend_from_slice(&(track.len() as u32).to_be_bytes());
            out.extend_from_slice(track);
        }
        out
    }

    const EOT: &[u8] = b"\x00\xFF\x2F\x00";

    fn track(body: &[u8]) -> Vec<u8> {
        let mut t = body.to_vec();
        t.extend_from_slice(EOT);
        t
    }

    fn map(entries: &[(u8, i32)]) -> ChannelVoiceMap {
        let mut map = ChannelVoiceMap::new();
        for &(channel, voice) in entries {
            map.insert(channel, voice).unwrap();
        }
        map
    }

    #[test]
    fn test_rewrite_all_only_touches_program_byte() {
        let t = track(b"\x00\xC0\x05\x00\x90\x3C\x64\x30\x80\x3C\x00\x00\xB0\x07\x64");
        let input = smf(&[&t]);
        let out = rewrite(&input, &map(&[(0, 2)]), RewriteMode::RewriteAll).unwrap();

        assert_eq!(out.len(), input.len());
        let diffs: Vec<usize> = (0..input.len()).filter(|&i| input[i] != out[i]).collect();
        assert_eq!(diffs, vec![24]);
        assert_eq!(out[24], 2);
    }

    #[test]
    fn test_first_only_mode_across_tracks() {
        let t1 = track(b"\x00\xC5\x01");
        let t2 = track(b"\x00\xC5\x07\x10\xC5\x09");
        let input = smf(&[&t1, &t2]);

        let (out, summary) =
            rewrite_with_summary(&input, &map(&[(5, 10)]), RewriteMode::RewriteFirstOnly).unwrap();

        // first track's program change is the first one seen on channel 5
        assert_eq!(out[24], 10);
        let t2_start = 22 + t1.len() + 8;
        assert_eq!(out[t2_start + 2], 0x07);
        assert_eq!(out[t2_start + 5], 0x09);
        assert_eq!(summary.rewritten, 1);
        assert_eq!(summary.passed_through, 2);
        assert_eq!(summary.tracks, 2);
    }

    #[test]
    fn test_default_voice_applies_to_unmapped_channels() {
        let t = track(b"\x00\xC0\x01\x00\xC1\x02\x00\xC2\x03");
        let input = smf(&[&t]);
        let m = map(&[(1, 40)]).with_default(7);
        let out = rewrite(&input, &m, RewriteMode::RewriteAll).unwrap();

        assert_eq!(out[24], 7);
        assert_eq!(out[27], 40);
        assert_eq!(out[30], 7);
    }

    #[test]
    fn test_unmapped_channels_pass_through() {
        let t = track(b"\x00\xC3\x11");
        let input = smf(&[&t]);
        let out = rewrite(&input, &map(&[(0, 1)]), RewriteMode::RewriteAll).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_running_status_program_changes() {
        // C0 05, then running-status program change 06
        let t = track(b"\x00\xC0\x05\x00\x06");
        let input = smf(&[&t]);
        let out = rewrite(&input, &map(&[(0, 20)]), RewriteMode::RewriteAll).unwrap();
        assert_eq!(out[24], 20);
        assert_eq!(out[26], 20);
        assert_eq!(out.len(), input.len());
    }

    #[test]
    fn test_out_of_range_target_fails() {
        let t = track(b"\x00\xC0\x05");
        let input = smf(&[&t]);

        let err = rewrite(&input, &map(&[(0, 128)]), RewriteMode::RewriteAll).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RangeError);

        let err = rewrite(&input, &map(&[(0, -1)]), RewriteMode::RewriteAll).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RangeError);

        let bad_default = ChannelVoiceMap::new().with_default(300);
        assert!(rewrite(&input, &bad_default, RewriteMode::RewriteFirstOnly).is_err());
    }

    #[test]
    fn test_out_of_range_target_on_unused_channel_is_ignored() {
        let t = track(b"\x00\xC0\x05\x00\x93\x3C\x64");
        let input = smf(&[&t]);

        let (out, summary) =
            rewrite_with_summary(&input, &map(&[(0, 2), (3, 200)]), RewriteMode::RewriteAll)
                .unwrap();
        assert_eq!(out[24], 2);
        assert_eq!(summary.rewritten, 1);

        // Channel 3 only plays notes, so its target is never resolved.
        let first_only = rewrite(&input, &map(&[(3, -1)]), RewriteMode::RewriteFirstOnly).unwrap();
        assert_eq!(first_only, input);
    }

    #[test]
    fn test_idempotent_with_total_mapping() {
        let t = track(b"\x00\xC0\x05\x00\x90\x3C\x64\x00\xC9\x00\x10\xC0\x33");
        let input = smf(&[&t]);
        let mut m = ChannelVoiceMap::new();
        for channel in 0..16u8 {
            m.insert(channel, i32::from(channel) + 3).unwrap();
        }

        let once = rewrite(&input, &m, RewriteMode::RewriteAll).unwrap();
        let twice = rewrite(&once, &m, RewriteMode::RewriteAll).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rejects_non_midi() {
        let err = rewrite(b"RIFF....", &ChannelVoiceMap::new(), RewriteMode::RewriteAll)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_rewrite_file_writes_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mid");
        std::fs::write(&input, smf(&[&track(b"\x00\xC0\x05")])).unwrap();

        let bad_out = dir.path().join("out/bad.mid");
        assert!(rewrite_file(&input, &bad_out, &map(&[(0, 128)]), RewriteMode::RewriteAll).is_err());
        assert!(!bad_out.exists());

        let good_out = dir.path().join("out/nested/good.mid");
        let summary =
            rewrite_file(&input, &good_out, &map(&[(0, 9)]), RewriteMode::RewriteAll).unwrap();
        assert_eq!(summary.rewritten, 1);
        assert_eq!(std::fs::read(&good_out).unwrap()[24], 9);
    }
}
