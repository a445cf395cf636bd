//! Remembered user settings.
//!
//! Only the sound directory is remembered. Library entry points never read
//! this file themselves; the CLI loads it to fill in a missing argument and
//! saves it after an index run succeeds.

use mp2k_voicegroup::MANIFEST_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Directory under the user config dir.
pub const SETTINGS_DIR_NAME: &str = "mp2k-preview";
/// File name inside [`SETTINGS_DIR_NAME`].
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Persisted preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Last sound directory that indexed successfully.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_dir: Option<PathBuf>,
}

impl Settings {
    /// `<config dir>/mp2k-preview/settings.json`.
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
            .ok_or(SettingsError::NoConfigDir)
    }

    /// Loads settings from `path`. A missing file yields default settings.
    pub fn load_from(path: &Path) -> SettingsResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes settings to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> SettingsResult<()> {
        let write_err = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json + "\n").map_err(write_err)
    }

    /// The remembered sound directory, if it still holds a manifest.
    pub fn valid_sound_dir(&self) -> Option<&Path> {
        self.sound_dir
            .as_deref()
            .filter(|dir| validate_sound_dir(dir))
    }
}

/// True if `dir` contains `voice_groups.inc`.
pub fn validate_sound_dir(dir: &Path) -> bool {
    dir.join(MANIFEST_FILE_NAME).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp2k_core::{ErrorKind, PreviewFailure};

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");
        let settings = Settings {
            sound_dir: Some(PathBuf::from("/games/pokeemerald/sound")),
        };
        settings.save_to(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"sound_dir\""));
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Settings::load_from(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_validate_sound_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!validate_sound_dir(dir.path()));

        let mut settings = Settings {
            sound_dir: Some(dir.path().to_path_buf()),
        };
        assert!(settings.valid_sound_dir().is_none());

        std::fs::write(dir.path().join("voice_groups.inc"), "").unwrap();
        assert!(validate_sound_dir(dir.path()));
        assert_eq!(settings.valid_sound_dir(), Some(dir.path()));

        settings.sound_dir = None;
        assert!(settings.valid_sound_dir().is_none());
    }
}
