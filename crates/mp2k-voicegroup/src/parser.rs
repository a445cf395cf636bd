//! Line-oriented parser for voicegroup assembly files.
//!
//! The files are not a closed grammar. Only three line shapes matter:
//!
//! ```text
//! voice_group route101
//!     voice_directsound 60, 0, DirectSoundWaveData_sc88pro_piano1, 255, 252, 0, 239
//!     voice_square_1 60, 0, 0, 2, 0, 0, 15, 0
//! @ comment
//! ```
//!
//! Everything else is ignored, so unknown macros and stray directives never
//! abort parsing.

use mp2k_core::VoiceGroup;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

const GROUP_PATTERN: &str = r"^\s*voice_group\s+([A-Za-z0-9_]+)\s*$";
const ENTRY_PATTERN: &str = r"^\s*(voice_[A-Za-z0-9_]+)\b(.*)$";

/// Line-comment markers used by the assembler sources.
const COMMENT_MARKERS: [char; 2] = ['@', ';'];

static GROUP_REGEX: OnceLock<Regex> = OnceLock::new();
static ENTRY_REGEX: OnceLock<Regex> = OnceLock::new();

fn group_regex() -> &'static Regex {
    GROUP_REGEX.get_or_init(|| Regex::new(GROUP_PATTERN).expect("invalid regex pattern"))
}

fn entry_regex() -> &'static Regex {
    ENTRY_REGEX.get_or_init(|| Regex::new(ENTRY_PATTERN).expect("invalid regex pattern"))
}

/// Parses every `voice_group` block in `text`, in file order.
///
/// Duplicate names within one file are all returned; deduplication happens
/// when blocks are inserted into an index.
pub fn parse_voicegroups(text: &str, source_file: &Path) -> Vec<VoiceGroup> {
    let mut blocks = Vec::new();
    let mut current: Option<VoiceGroup> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.starts_with(COMMENT_MARKERS) {
            continue;
        }

        if let Some(caps) = group_regex().captures(line) {
            blocks.extend(current.take());
            current = Some(VoiceGroup::new(&caps[1]));
            continue;
        }

        let Some(group) = current.as_mut() else {
            continue;
        };
        if stripped.is_empty() {
            continue;
        }

        // A `voice_group` line with trailing tokens is not an opener; it takes a slot.
        if let Some(caps) = entry_regex().captures(line) {
            group.push(&caps[1], caps[2].trim(), source_file);
        }
    }

    blocks.extend(current);
    blocks
}
