//! Voicegroup indexer for mp2k sound trees.
//!
//! Builds a [`VoicegroupIndex`] from a game's `sound/` directory by reading the
//! root manifest (`voice_groups.inc`), following its `.include` directives, and
//! parsing the `voice_group` blocks in every included file.
//!
//! # Guarantees
//!
//! - Within a group, `entries[i].index == i`.
//! - When a group name is defined more than once, the first definition in
//!   manifest include order (then file order) wins.
//! - Includes that do not exist are skipped; unrecognized lines are ignored.
//! - Identical input bytes always produce an identical index.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let index = mp2k_voicegroup::index(Path::new("pokeemerald/sound"))?;
//! let route101 = index.get("route101").expect("group exists");
//! for voice in route101.entries() {
//!     println!("{:3} {:<24} {}", voice.index, voice.macro_name, voice.kind);
//! }
//! # Ok::<(), mp2k_voicegroup::IndexError>(())
//! ```

pub mod error;
pub mod manifest;
pub mod parser;

use mp2k_core::VoicegroupIndex;
use std::path::{Path, PathBuf};

pub use error::{IndexError, IndexResult};
pub use manifest::{scan_manifest, IncludeScan, MANIFEST_FILE_NAME};
pub use parser::parse_voicegroups;

/// An index together with details about how it was assembled.
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    pub index: VoicegroupIndex,
    /// Included files that were parsed, in manifest order.
    pub files: Vec<PathBuf>,
    /// Includes listed in the manifest but absent on disk.
    pub missing_includes: Vec<PathBuf>,
    /// Group definitions discarded because the name was already indexed.
    pub duplicates: Vec<DuplicateGroup>,
}

/// A discarded duplicate group definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub name: String,
    pub source_file: PathBuf,
}

/// Builds the voicegroup index for `sound_dir`.
///
/// Fails with [`IndexError::ManifestNotFound`] if `voice_groups.inc` is absent
/// and [`IndexError::EmptyIndex`] if nothing usable was found.
pub fn index(sound_dir: &Path) -> IndexResult<VoicegroupIndex> {
    index_with_report(sound_dir).map(|report| report.index)
}

/// Like [`index`], but also reports skipped includes and duplicate groups.
pub fn index_with_report(sound_dir: &Path) -> IndexResult<IndexReport> {
    let scan = scan_manifest(sound_dir)?;
    let mut report = IndexReport {
        missing_includes: scan.missing,
        ..Default::default()
    };

    for file in scan.resolved {
        let text = manifest::read_lossy(&file)?;
        for group in parse_voicegroups(&text, &file) {
            let name = group.name().to_string();
            if !report.index.insert(group) {
                report.duplicates.push(DuplicateGroup {
                    name,
                    source_file: file.clone(),
                });
            }
        }
        report.files.push(file);
    }

    if report.index.is_empty() {
        return Err(IndexError::EmptyIndex {
            manifest: manifest::manifest_path(sound_dir),
            resolved: report.files.len(),
        });
    }

    Ok(report)
}

/// Writes the index as pretty-printed JSON, creating parent directories.
pub fn write_json(index: &VoicegroupIndex, path: &Path) -> IndexResult<()> {
    let json = serde_json::to_string_pretty(index)?;
    let write_err = |source| IndexError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, json).map_err(write_err)
}

/// Reads an index previously written by [`write_json`].
pub fn read_json(path: &Path) -> IndexResult<VoicegroupIndex> {
    let text = std::fs::read_to_string(path).map_err(|source| IndexError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp2k_core::{ErrorKind, PreviewFailure, VoiceKind};
    use pretty_assertions::assert_eq;
    use std::fs;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_index_merges_in_include_order() {
        let dir = tempfile::tempdir().unwrap();
        let sound = dir.path();
        write(
            sound,
            "voice_groups.inc",
            ".include \"sound/voicegroups/b.inc\"\n.include \"sound/voicegroups/a.inc\"\n",
        );
        write(
            sound,
            "voicegroups/a.inc",
            "voice_group shared\n\tvoice_square_1 from_a\nvoice_group only_a\n\tvoice_noise 1\n",
        );
        write(
            sound,
            "voicegroups/b.inc",
            "voice_group shared\n\tvoice_directsound from_b\n\tvoice_wave 2\n",
        );

        let report = index_with_report(sound).unwrap();
        let index = &report.index;

        assert_eq!(index.names().collect::<Vec<_>>(), vec!["shared", "only_a"]);
        let shared = index.get("shared").unwrap();
        assert_eq!(shared.len(), 2);
        assert_eq!(shared.entries()[0].args, "from_b");
        assert_eq!(shared.entries()[0].kind, VoiceKind::Direct);
        assert_eq!(
            shared.entries()[0].source_file,
            sound.join("voicegroups/b.inc")
        );

        assert_eq!(
            report.duplicates,
            vec![DuplicateGroup {
                name: "shared".to_string(),
                source_file: sound.join("voicegroups/a.inc"),
            }]
        );
    }

    #[test]
    fn test_duplicate_within_one_file_keeps_first() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "voice_groups.inc", ".include \"x.inc\"\n");
        write(
            dir.path(),
            "x.inc",
            "voice_group g\n\tvoice_square_1 first\nvoice_group g\n\tvoice_noise second\n",
        );

        let index = index(dir.path()).unwrap();
        assert_eq!(index.get("g").unwrap().entries()[0].args, "first");
    }

    #[test]
    fn test_empty_index_when_no_include_resolves() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "voice_groups.inc",
            ".include \"sound/voicegroups/missing.inc\"\n",
        );

        let err = index(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyIndex);
    }

    #[test]
    fn test_empty_index_when_includes_have_no_groups() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "voice_groups.inc", ".include \"x.inc\"\n");
        write(dir.path(), "x.inc", "@ nothing here\n");

        let err = index(dir.path()).unwrap_err();
        assert!(matches!(err, IndexError::EmptyIndex { resolved: 1, .. }));
    }

    #[test]
    fn test_missing_manifest_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = index(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "voice_groups.inc", ".include \"x.inc\"\n");
        let mut bytes = b"voice_group g\n\tvoice_square_1 ".to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE]);
        bytes.extend_from_slice(b"\n");
        fs::write(dir.path().join("x.inc"), bytes).unwrap();

        let index = index(dir.path()).unwrap();
        assert_eq!(index.get("g").unwrap().len(), 1);
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "voice_groups.inc", ".include \"x.inc\"\n");
        write(
            dir.path(),
            "x.inc",
            "voice_group g\n\tvoice_square_1 1\n\tvoice_noise 2\n",
        );
        let index = index(dir.path()).unwrap();

        let out = dir.path().join("out/index.json");
        write_json(&index, &out).unwrap();
        assert_eq!(read_json(&out).unwrap(), index);
    }
}
