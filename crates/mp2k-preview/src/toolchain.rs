//! External build tool and emulator.
//!
//! The orchestrator only talks to these through [`Toolchain`], so tests can
//! swap in a fake that never spawns a process.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{PipelineError, PipelineStageResult};

/// Lines of build stderr kept in a failure report.
pub const STDERR_TAIL_LINES: usize = 20;

/// The two process boundaries of a preview run.
pub trait Toolchain {
    /// Builds the ROM in `repo_root`, blocking until the build exits.
    fn build(&self, repo_root: &Path) -> PipelineStageResult<()>;

    /// Starts `emulator` with `rom` as its only argument and returns without
    /// waiting for it.
    fn launch(&self, emulator: &Path, rom: &Path) -> PipelineStageResult<()>;
}

/// Resolves a program the way a shell would.
///
/// An existing file path is returned as is; anything else is looked up on
/// `PATH`.
pub fn resolve_program(program: &Path) -> Option<PathBuf> {
    if program.is_file() {
        return Some(program.to_path_buf());
    }
    which::which(program).ok()
}

fn not_found(program: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("'{}' is not a file and was not found on PATH", program.display()),
    )
}

/// Runs a real build tool (`make` by default) and a real emulator.
#[derive(Debug, Clone)]
pub struct SystemToolchain {
    build_program: PathBuf,
    build_args: Vec<String>,
    clean_first: bool,
}

impl SystemToolchain {
    pub fn new(build_program: impl Into<PathBuf>, build_args: Vec<String>, clean_first: bool) -> Self {
        Self {
            build_program: build_program.into(),
            build_args,
            clean_first,
        }
    }

    fn command_line<S: AsRef<OsStr>>(&self, args: &[S]) -> String {
        let mut line = self.build_program.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(&arg.as_ref().to_string_lossy());
        }
        line
    }

    fn run_step<S: AsRef<OsStr>>(
        &self,
        program: &Path,
        repo_root: &Path,
        args: &[S],
    ) -> PipelineStageResult<()> {
        let command = self.command_line(args);
        let child = Command::new(program)
            .args(args)
            .current_dir(repo_root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PipelineError::BuildSpawn {
                program: command.clone(),
                source,
            })?;

        let output = child
            .wait_with_output()
            .map_err(|source| PipelineError::BuildSpawn {
                program: command.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }
        Err(PipelineError::BuildFailed {
            command,
            exit_code: output.status.code(),
            stderr: stderr_tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_LINES),
        })
    }
}

impl Default for SystemToolchain {
    fn default() -> Self {
        Self::new(crate::DEFAULT_BUILD_PROGRAM, vec!["-j1".to_string()], true)
    }
}

impl Toolchain for SystemToolchain {
    fn build(&self, repo_root: &Path) -> PipelineStageResult<()> {
        let program =
            resolve_program(&self.build_program).ok_or_else(|| PipelineError::BuildSpawn {
                program: self.build_program.display().to_string(),
                source: not_found(&self.build_program),
            })?;

        if self.clean_first {
            self.run_step(&program, repo_root, &["clean"])?;
        }
        self.run_step(&program, repo_root, &self.build_args)
    }

    fn launch(&self, emulator: &Path, rom: &Path) -> PipelineStageResult<()> {
        let launch_err = |source| PipelineError::Launch {
            program: emulator.display().to_string(),
            source,
        };
        let program = resolve_program(emulator).ok_or_else(|| launch_err(not_found(emulator)))?;

        // Dropping the handle leaves the emulator running on its own.
        Command::new(program)
            .arg(rom)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(launch_err)?;
        Ok(())
    }
}

/// The last `max_lines` lines of `stderr`.
pub fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
