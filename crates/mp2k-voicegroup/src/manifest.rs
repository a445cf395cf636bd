//! Root manifest (`voice_groups.inc`) include traversal.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{IndexError, IndexResult};

/// File name of the root manifest inside the sound directory.
pub const MANIFEST_FILE_NAME: &str = "voice_groups.inc";

/// Leading segment of include paths written relative to the repository root.
pub const SOUND_PREFIX: &str = "sound/";

const INCLUDE_PATTERN: &str = r#"^\s*\.include\s+"([^"]+)"\s*$"#;

static INCLUDE_REGEX: OnceLock<Regex> = OnceLock::new();

fn include_regex() -> &'static Regex {
    INCLUDE_REGEX.get_or_init(|| Regex::new(INCLUDE_PATTERN).expect("invalid regex pattern"))
}

/// Returns the manifest path for a sound directory.
pub fn manifest_path(sound_dir: &Path) -> PathBuf {
    sound_dir.join(MANIFEST_FILE_NAME)
}

/// Extracts the quoted paths of every `.include` directive, in order.
pub fn include_paths(manifest_text: &str) -> Vec<String> {
    manifest_text
        .lines()
        .filter_map(|line| include_regex().captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Resolves an include path against the sound directory.
///
/// `sound/voicegroups/route101.inc` becomes `<sound_dir>/voicegroups/route101.inc`.
pub fn resolve_include(sound_dir: &Path, include: &str) -> PathBuf {
    let relative = include.strip_prefix(SOUND_PREFIX).unwrap_or(include);
    sound_dir.join(relative)
}

/// Outcome of resolving a manifest's includes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeScan {
    /// Includes that exist on disk, in manifest order.
    pub resolved: Vec<PathBuf>,
    /// Includes that were listed but absent; skipped, not fatal.
    pub missing: Vec<PathBuf>,
}

/// Reads the manifest and resolves its includes.
pub fn scan_manifest(sound_dir: &Path) -> IndexResult<IncludeScan> {
    let manifest = manifest_path(sound_dir);
    if !manifest.is_file() {
        return Err(IndexError::ManifestNotFound { path: manifest });
    }

    let text = read_lossy(&manifest)?;
    let mut scan = IncludeScan::default();
    for include in include_paths(&text) {
        let path = resolve_include(sound_dir, &include);
        if path.is_file() {
            scan.resolved.push(path);
        } else {
            scan.missing.push(path);
        }
    }
    Ok(scan)
}

/// Reads a text file, replacing invalid UTF-8 instead of failing.
pub(crate) fn read_lossy(path: &Path) -> IndexResult<String> {
    let bytes = std::fs::read(path).map_err(|source| IndexError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
