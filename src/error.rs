// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all rfisweep-related errors.

use thiserror::Error;

use crate::{flagger::ConfigError, settings::SettingsError, strategy::ActionError};

#[derive(Error, Debug)]
pub enum RfiSweepError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Action(#[from] ActionError),

    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
