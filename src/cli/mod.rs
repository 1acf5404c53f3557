// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line interface code. The library stays usable without any of
//! this; the binary is a thin driver for flagging raw baseline dumps and
//! inspecting strategies.
//!
//! Only three things are public here: [RfiSweep], [RfiSweep::run] and
//! [CliError].

mod error;
mod flag;
mod show_strategy;

pub use error::CliError;

use clap::{AppSettings, Args, Parser, Subcommand};
use log::info;

#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    about = "Detects radio-frequency interference in radio-telescope visibility data."
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_subcommands = true)]
#[clap(propagate_version = true)]
pub struct RfiSweep {
    #[clap(flatten)]
    global_opts: GlobalArgs,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Don't draw progress bars.
    #[clap(long)]
    #[clap(global = true)]
    no_progress_bars: bool,

    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    #[clap(global = true)]
    verbosity: u8,
}

#[derive(Debug, Subcommand)]
#[clap(arg_required_else_help = true)]
enum Command {
    /// Flag one or more baselines from a raw little-endian f32 dump and
    /// write the masks (and optionally quality statistics).
    Flag(flag::FlagArgs),

    /// Print the action tree a telescope and flag combination produces.
    ShowStrategy(show_strategy::ShowStrategyArgs),
}

impl RfiSweep {
    pub fn run(self) -> Result<(), CliError> {
        setup_logging(self.global_opts.verbosity).expect("the logger was set up twice");
        let sub_command = match &self.command {
            Command::Flag(_) => "flag",
            Command::ShowStrategy(_) => "show-strategy",
        };
        info!("rfisweep {} {}", sub_command, env!("CARGO_PKG_VERSION"));

        match self.command {
            Command::Flag(args) => args.run(!self.global_opts.no_progress_bars)?,
            Command::ShowStrategy(args) => args.run()?,
        }

        info!("rfisweep {} complete.", sub_command);
        Ok(())
    }
}

/// Activate a logger. All log messages are put onto `stdout`. `env_logger`
/// automatically only uses colours if we're on a tty; piped output is
/// formatted sensibly.
fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        _ => builder.filter_level(log::LevelFilter::Trace),
    };
    builder.try_init()
}
