//! mp2k CLI - voicegroup indexing and MIDI previews
//!
//! This binary indexes a sound directory's voice groups, maps MIDI channels
//! onto voice slots, and drives the stage/build/launch preview pipeline.

mod cli_args;

use clap::Parser;
use std::process::ExitCode;

use cli_args::{Cli, Commands, SettingsCommands};
use mp2k_cli::commands;
use mp2k_cli::commands::preview::PreviewOptions;
use mp2k_cli::commands::rewrite::GroupCheck;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Index {
            sound_dir,
            output,
            no_save,
            json,
        } => commands::index::run(sound_dir.as_deref(), output.as_deref(), no_save, json),
        Commands::Inspect { midi, json } => commands::inspect::run(&midi, json),
        Commands::Rewrite {
            input,
            output,
            mapping,
            voicegroup,
            sound_dir,
            json,
        } => {
            let check = voicegroup.as_deref().map(|voicegroup| GroupCheck {
                voicegroup,
                sound_dir: sound_dir.as_deref(),
            });
            commands::rewrite::run(
                &input,
                &output,
                &mapping.map,
                mapping.default_voice,
                mapping.first_only,
                check,
                json,
            )
        }
        Commands::Preview {
            repo,
            midi,
            voicegroup,
            volume,
            reverb,
            priority,
            emulator,
            mapping,
            make,
            build_args,
            no_clean,
            json,
        } => {
            let options = PreviewOptions {
                repo,
                midi,
                voicegroup,
                volume,
                reverb,
                priority,
                emulator,
                map: mapping.map,
                default_voice: mapping.default_voice,
                first_only: mapping.first_only,
                make,
                build_args,
                no_clean,
            };
            commands::preview::run(&options, json)
        }
        Commands::Settings { command } => match command {
            SettingsCommands::Show { json } => commands::settings::show(json),
            SettingsCommands::SetSoundDir { path } => commands::settings::set_sound_dir(&path),
            SettingsCommands::Clear => commands::settings::clear(),
        },
        Commands::Doctor {
            emulator,
            make,
            sound_dir,
            json,
        } => commands::doctor::run(&emulator, &make, sound_dir.as_deref(), json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
