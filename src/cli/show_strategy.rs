// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use clap::Args;

use super::error::CliError;
use crate::{
    flagger::{StrategyFlags, TelescopeId},
    settings::StrategySettings,
    strategy::builder,
};

#[derive(Debug, Args)]
pub(crate) struct ShowStrategyArgs {
    /// Telescope whose default strategy to show.
    #[clap(short, long, default_value = "generic")]
    telescope: TelescopeId,

    /// Keep transient celestial signals.
    #[clap(long)]
    transients: bool,

    /// More iterations for better convergence.
    #[clap(long)]
    robust: bool,

    /// Drop any flags already present instead of combining with them.
    #[clap(long)]
    clear_flags: bool,

    /// TOML strategy settings; overrides the telescope defaults.
    #[clap(short, long, parse(from_os_str))]
    strategy: Option<PathBuf>,
}

impl ShowStrategyArgs {
    pub(crate) fn run(&self) -> Result<(), CliError> {
        let mut flags = StrategyFlags::NONE;
        if self.transients {
            flags = flags | StrategyFlags::TRANSIENTS;
        }
        if self.robust {
            flags = flags | StrategyFlags::ROBUST;
        }
        if self.clear_flags {
            flags = flags | StrategyFlags::CLEAR_FLAGS;
        }

        let strategy = match &self.strategy {
            Some(path) => {
                let settings =
                    StrategySettings::load(path).map_err(crate::RfiSweepError::Settings)?;
                let telescope = settings.telescope.unwrap_or(self.telescope);
                builder::strategy_for(&settings.resolve(telescope, flags))
            }
            None => builder::default_strategy(self.telescope, flags, 0.0, 0.0, 0.0),
        };
        println!("{} ({}):", self.telescope, flags);
        print!("{strategy}");
        Ok(())
    }
}
