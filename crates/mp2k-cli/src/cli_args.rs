//! CLI argument definitions for the mp2k command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Args, Parser, Subcommand};
use mp2k_cli::commands::MapArg;

/// mp2k - voicegroup indexing and MIDI previews for GBA sound engines
#[derive(Parser)]
#[command(name = "mp2k")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Index every voice group reachable from voice_groups.inc
    Index {
        /// Sound directory holding voice_groups.inc (default: remembered directory)
        #[arg(short, long)]
        sound_dir: Option<String>,

        /// Write the index as JSON to this path
        #[arg(short, long)]
        output: Option<String>,

        /// Do not remember the sound directory after a successful run
        #[arg(long)]
        no_save: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Summarize which channels a MIDI file uses
    Inspect {
        /// MIDI file to inspect
        midi: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Rewrite program changes so each channel selects a voice slot
    Rewrite {
        /// Input MIDI file
        input: String,

        /// Output MIDI file
        #[arg(short, long)]
        output: String,

        #[command(flatten)]
        mapping: MappingArgs,

        /// Check mapped slots against this voice group
        #[arg(long)]
        voicegroup: Option<String>,

        /// Sound directory used with --voicegroup (default: remembered directory)
        #[arg(short, long)]
        sound_dir: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Stage a MIDI into the game repository, build the ROM, and launch it
    Preview {
        /// Root of the decompiled game repository
        #[arg(short, long)]
        repo: String,

        /// MIDI file to preview
        #[arg(short, long)]
        midi: String,

        /// Voice group suffix for the preview song (e.g. route101)
        #[arg(short, long, default_value = "route101")]
        voicegroup: String,

        /// Song volume (0-127)
        #[arg(long, default_value_t = 90)]
        volume: u8,

        /// Reverb amount (0-127)
        #[arg(long, default_value_t = 50)]
        reverb: u8,

        /// Song priority (0-15)
        #[arg(long, default_value_t = 0)]
        priority: u8,

        /// Emulator executable (path or name on PATH)
        #[arg(short, long, default_value = "mgba")]
        emulator: String,

        #[command(flatten)]
        mapping: MappingArgs,

        /// Build tool (path or name on PATH)
        #[arg(long, default_value = "make")]
        make: String,

        /// Arguments for the build step (repeatable)
        #[arg(long = "build-arg", default_values_t = vec!["-j1".to_string()])]
        build_args: Vec<String>,

        /// Skip `make clean` before building
        #[arg(long)]
        no_clean: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Show or change remembered settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Check that the build tool, emulator, and sound directory are usable
    Doctor {
        /// Emulator to look for
        #[arg(short, long, default_value = "mgba")]
        emulator: String,

        /// Build tool to look for
        #[arg(long, default_value = "make")]
        make: String,

        /// Sound directory to check (default: remembered directory)
        #[arg(short, long)]
        sound_dir: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

/// Channel-to-voice mapping flags shared by `rewrite` and `preview`.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct MappingArgs {
    /// Channel mapping as CHANNEL=VOICE, e.g. --map 0=2 (repeatable)
    #[arg(long = "map", value_name = "CHANNEL=VOICE")]
    pub map: Vec<MapArg>,

    /// Voice for program changes on channels without a --map entry
    #[arg(long = "default-voice", value_name = "VOICE", allow_negative_numbers = true)]
    pub default_voice: Option<i32>,

    /// Only rewrite the first program change on each channel
    #[arg(long)]
    pub first_only: bool,
}

#[derive(Subcommand)]
pub(crate) enum SettingsCommands {
    /// Print the settings file location and contents
    Show {
        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
    /// Remember a sound directory
    SetSoundDir {
        /// Sound directory holding voice_groups.inc
        path: String,
    },
    /// Forget all settings
    Clear,
}
