//! `midi.cfg` line writer.
//!
//! The build reads per-song assembler flags from `sound/songs/midi/midi.cfg`,
//! one line per MIDI file. The preview slot owns a single line keyed by
//! `mus_preview.mid:`; this module rewrites that line and leaves every other
//! line exactly as it was.

use mp2k_core::check_playback_ranges;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{ConfigError, ConfigResult};

/// Key the preview line starts with.
pub const PREVIEW_KEY: &str = "mus_preview.mid:";

fn preview_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*mus_preview\.mid:\s+.*$").expect("invalid regex pattern"))
}

/// How [`update`] changed the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEdit {
    /// An existing preview line (zero-based line number) was replaced.
    Replaced { line: usize },
    /// No preview line existed; one was appended.
    Appended,
}

/// Builds the preview line, without a line terminator.
///
/// ```
/// let line = mp2k_preview::config::format_line("route101", 90, 50, 0);
/// assert_eq!(line, "mus_preview.mid: -E -R50 -G_route101 -V090 -P0");
/// ```
pub fn format_line(voicegroup: &str, volume: u8, reverb: u8, priority: u8) -> String {
    format!(
        "{} -E -R{:02} -G_{} -V{:03} -P{}",
        PREVIEW_KEY, reverb, voicegroup, volume, priority
    )
}

/// Returns `text` with the first preview line replaced by `line`, or with
/// `line` appended if there is none.
pub fn apply(text: &str, line: &str) -> (String, ConfigEdit) {
    let mut out = String::with_capacity(text.len() + line.len() + 2);
    let mut edit = None;

    for (number, raw) in text.split_inclusive('\n').enumerate() {
        let content = raw.trim_end_matches(['\n', '\r']);
        if edit.is_none() && preview_line_regex().is_match(content) {
            out.push_str(line);
            out.push('\n');
            edit = Some(ConfigEdit::Replaced { line: number });
        } else {
            out.push_str(raw);
        }
    }

    match edit {
        Some(edit) => (out, edit),
        None => {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(line);
            out.push('\n');
            (out, ConfigEdit::Appended)
        }
    }
}

/// Writes the preview line for the given playback settings into `config_path`.
///
/// Ranges are checked before the file is read, so an out-of-range value never
/// touches the file. The file must already exist.
pub fn update(
    config_path: &Path,
    voicegroup: &str,
    volume: u8,
    reverb: u8,
    priority: u8,
) -> ConfigResult<ConfigEdit> {
    check_playback_ranges(volume, reverb, priority)?;

    let text = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let (updated, edit) = apply(&text, &format_line(voicegroup, volume, reverb, priority));
    std::fs::write(config_path, updated).map_err(|source| ConfigError::Write {
        path: config_path.to_path_buf(),
        source,
    })?;
    Ok(edit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp2k_core::{ErrorKind, PreviewFailure};
    use pretty_assertions::assert_eq;

    const CFG: &str = "mus_route101.mid: -E -R50 -G_route101 -V080\n\
                       mus_preview.mid: -E -R10 -G_petalburg -V100 -P3\n\
                       mus_rg_title.mid: -E -R50 -G_rg_title -V090 -P1\n";

    #[test]
    fn test_format_line_padding() {
        assert_eq!(
            format_line("route110", 5, 7, 15),
            "mus_preview.mid: -E -R07 -G_route110 -V005 -P15"
        );
        assert_eq!(
            format_line("x", 127, 127, 0),
            "mus_preview.mid: -E -R127 -G_x -V127 -P0"
        );
    }

    #[test]
    fn test_replaces_only_preview_line() {
        let (out, edit) = apply(CFG, &format_line("route101", 90, 50, 0));
        assert_eq!(edit, ConfigEdit::Replaced { line: 1 });
        assert_eq!(
            out,
            "mus_route101.mid: -E -R50 -G_route101 -V080\n\
             mus_preview.mid: -E -R50 -G_route101 -V090 -P0\n\
             mus_rg_title.mid: -E -R50 -G_rg_title -V090 -P1\n"
        );
    }

    #[test]
    fn test_key_match_is_case_insensitive_and_indented() {
        let text = "a.mid: -E\n   MUS_Preview.MID:   -E -R00\nb.mid: -E\n";
        let (out, edit) = apply(text, "NEW");
        assert_eq!(edit, ConfigEdit::Replaced { line: 1 });
        assert_eq!(out, "a.mid: -E\nNEW\nb.mid: -E\n");
    }

    #[test]
    fn test_key_without_flags_is_not_the_preview_line() {
        // the key must be followed by whitespace
        let (out, edit) = apply("mus_preview.mid:\n", "NEW");
        assert_eq!(edit, ConfigEdit::Appended);
        assert_eq!(out, "mus_preview.mid:\nNEW\n");
    }

    #[test]
    fn test_only_first_preview_line_replaced() {
        let text = "mus_preview.mid: -E -R01\nmus_preview.mid: -E -R02\n";
        let (out, _) = apply(text, "NEW");
        assert_eq!(out, "NEW\nmus_preview.mid: -E -R02\n");
    }

    #[test]
    fn test_append_adds_missing_terminator() {
        let (out, edit) = apply("a.mid: -E -V100", "NEW");
        assert_eq!(edit, ConfigEdit::Appended);
        assert_eq!(out, "a.mid: -E -V100\nNEW\n");

        let (out, _) = apply("", "NEW");
        assert_eq!(out, "NEW\n");
    }

    #[test]
    fn test_crlf_lines_preserved() {
        let text = "a.mid: -E\r\nmus_preview.mid: -E -R00\r\nb.mid: -E\r\n";
        let (out, _) = apply(text, "NEW");
        assert_eq!(out, "a.mid: -E\r\nNEW\nb.mid: -E\r\n");
    }

    #[test]
    fn test_update_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("midi.cfg");
        std::fs::write(&path, CFG).unwrap();

        let edit = update(&path, "route101", 5, 7, 0).unwrap();
        assert_eq!(edit, ConfigEdit::Replaced { line: 1 });
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("mus_preview.mid: -E -R07 -G_route101 -V005 -P0\n"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_out_of_range_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("midi.cfg");
        std::fs::write(&path, CFG).unwrap();

        for (volume, reverb, priority) in [(128, 0, 0), (0, 200, 0), (0, 0, 16)] {
            let err = update(&path, "route101", volume, reverb, priority).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::RangeError);
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CFG);
    }

    #[test]
    fn test_missing_config_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = update(&dir.path().join("midi.cfg"), "route101", 90, 50, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoError);
    }
}
