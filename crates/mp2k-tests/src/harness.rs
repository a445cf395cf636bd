//! Test harness utilities: temporary sound trees, fake game repositories, and
//! a toolchain that records calls instead of spawning processes.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use mp2k_preview::{
    PipelineError, PipelineStageResult, Toolchain, DEFAULT_ARTIFACT_PATH, DEFAULT_CONFIG_PATH,
};

/// `midi.cfg` contents of a freshly created fake repository.
pub const SAMPLE_MIDI_CFG: &str = "\
mus_route101.mid: -E -R50 -G_route101 -V080
mus_preview.mid: -E -R40 -G_petalburg -V100 -P1
mus_route110.mid: -E -R50 -G_route110 -V080
";

/// A test harness rooted in a temporary directory.
pub struct TestHarness {
    /// Working directory for test inputs and outputs.
    pub work_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().expect("Failed to create work dir"),
        }
    }

    /// Get the working directory path.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    /// Read `rel` as UTF-8.
    pub fn read_string(&self, rel: &str) -> String {
        fs::read_to_string(self.path().join(rel)).expect("Failed to read file")
    }

    /// The `sound/` directory of the harness.
    pub fn sound_dir(&self) -> PathBuf {
        self.path().join("sound")
    }

    /// Write `sound/voice_groups.inc` listing `includes` in order.
    ///
    /// Includes are given relative to the sound directory, e.g.
    /// `voicegroups/route101.inc`.
    pub fn write_manifest(&self, includes: &[&str]) -> PathBuf {
        let text: String = includes
            .iter()
            .map(|inc| format!("\t.include \"sound/{}\"\n", inc))
            .collect();
        self.write("sound/voice_groups.inc", text)
    }

    /// Write a voicegroup include below the sound directory.
    pub fn write_voicegroups(&self, rel: &str, text: &str) -> PathBuf {
        self.write(&format!("sound/{}", rel), text)
    }

    /// Create `repo/` with a sample `midi.cfg` and return its path.
    pub fn fake_repo(&self) -> PathBuf {
        self.write(&format!("repo/{}", DEFAULT_CONFIG_PATH), SAMPLE_MIDI_CFG);
        self.path().join("repo")
    }

    /// Path of the ROM a build in the fake repo produces.
    pub fn rom_path(&self) -> PathBuf {
        self.path().join("repo").join(DEFAULT_ARTIFACT_PATH)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// What [`RecordingToolchain::build`] does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Exit zero and leave a ROM behind.
    WriteRom,
    /// Exit zero without producing a ROM.
    NoRom,
    /// Exit non-zero.
    Fail,
}

/// A [`Toolchain`] that records every call and never spawns a process.
#[derive(Debug)]
pub struct RecordingToolchain {
    pub build: BuildOutcome,
    pub launch_ok: bool,
    /// Each build's repository root.
    pub builds: RefCell<Vec<PathBuf>>,
    /// Each launch as `(emulator, rom)`.
    pub launches: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl RecordingToolchain {
    pub fn new(build: BuildOutcome) -> Self {
        Self {
            build,
            launch_ok: true,
            builds: RefCell::new(Vec::new()),
            launches: RefCell::new(Vec::new()),
        }
    }

    /// A toolchain whose emulator can never be started.
    pub fn without_emulator(mut self) -> Self {
        self.launch_ok = false;
        self
    }
}

impl Default for RecordingToolchain {
    fn default() -> Self {
        Self::new(BuildOutcome::WriteRom)
    }
}

impl Toolchain for RecordingToolchain {
    fn build(&self, repo_root: &Path) -> PipelineStageResult<()> {
        self.builds.borrow_mut().push(repo_root.to_path_buf());
        match self.build {
            BuildOutcome::WriteRom => {
                fs::write(repo_root.join(DEFAULT_ARTIFACT_PATH), b"ROM").map_err(|source| {
                    PipelineError::BuildSpawn {
                        program: "fake-make".to_string(),
                        source,
                    }
                })
            }
            BuildOutcome::NoRom => Ok(()),
            BuildOutcome::Fail => Err(PipelineError::BuildFailed {
                command: "fake-make".to_string(),
                exit_code: Some(2),
                stderr: "make: *** [Makefile:1] Error 1".to_string(),
            }),
        }
    }

    fn launch(&self, emulator: &Path, rom: &Path) -> PipelineStageResult<()> {
        self.launches
            .borrow_mut()
            .push((emulator.to_path_buf(), rom.to_path_buf()));
        if self.launch_ok {
            Ok(())
        } else {
            Err(PipelineError::Launch {
                program: emulator.display().to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "emulator not installed"),
            })
        }
    }
}
