// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
TOML strategy settings.

A settings file names a telescope and overrides individual knobs of its
default strategy. This is deliberately *not* a serialisation of the action
tree; tools that need to persist arbitrary trees have their own format, and
wire compatibility with it is their concern, not ours.

Every key is optional so a file can say only what it means:

```toml
version = 1
telescope = "mwa"
iteration_count = 4
keep_transients = true
```
 */


use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    flagger::{StrategyFlags, TelescopeId},
    strategy::{
        builder::{self, StrategySetup},
        Strategy,
    },
};

/// The newest settings layout this build understands.
pub const SETTINGS_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("couldn't read strategy settings from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("couldn't parse strategy settings in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(
        "strategy settings version {found} is newer than the supported version {SETTINGS_VERSION}"
    )]
    UnsupportedVersion { found: u32 },
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StrategySettings {
    pub version: Option<u32>,
    pub telescope: Option<TelescopeId>,
    pub iteration_count: Option<usize>,
    pub sensitivity_start: Option<f64>,
    pub keep_transients: Option<bool>,
    pub calibrate_passband: Option<bool>,
    pub clear_flags: Option<bool>,
    pub reset_contaminated: Option<bool>,
}

impl StrategySettings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<StrategySettings, SettingsError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: StrategySettings =
            toml::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        match settings.version {
            Some(found) if found > SETTINGS_VERSION => {
                Err(SettingsError::UnsupportedVersion { found })
            }
            _ => Ok(settings),
        }
    }

    /// Overlay the set keys onto `setup`. An explicit iteration count also
    /// rescales the sensitivity start unless the file pins that too.
    pub fn apply(&self, setup: &mut StrategySetup) {
        if let Some(n) = self.iteration_count {
            setup.iteration_count = n;
            setup.sensitivity_start = 2.0 * 2.0_f64.powf(n as f64 / 2.0);
        }
        if let Some(s) = self.sensitivity_start {
            setup.sensitivity_start = s;
        }
        if let Some(v) = self.keep_transients {
            setup.keep_transients = v;
        }
        if let Some(v) = self.calibrate_passband {
            setup.calibrate_passband = v;
        }
        if let Some(v) = self.clear_flags {
            setup.clear_flags = v;
        }
        if let Some(v) = self.reset_contaminated {
            setup.reset_contaminated = v;
        }
    }

    /// The telescope's default setup with this file's overrides applied.
    pub fn resolve(&self, telescope: TelescopeId, flags: StrategyFlags) -> StrategySetup {
        let mut setup = StrategySetup::from_flags(telescope, flags);
        self.apply(&mut setup);
        setup
    }

    /// A ready strategy: the named telescope (generic when absent) with the
    /// file's overrides.
    pub fn into_strategy(&self) -> Strategy {
        let telescope = self.telescope.unwrap_or(TelescopeId::Generic);
        builder::strategy_for(&self.resolve(telescope, StrategyFlags::NONE))
    }
}
