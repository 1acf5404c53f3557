// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Detection of radio-frequency interference in radio-telescope visibility
data.

One baseline's data is a time-frequency image (channels by time steps);
`rfisweep` runs a configurable tree of detection and morphology actions
over it and returns a boolean mask of the contaminated samples. See
[Flagger] for the five-minute tour: make an image set, make a strategy,
run, read the mask.
 */

pub mod artifacts;
pub mod cli;
pub mod constants;
pub mod filter;
pub mod flagger;
pub mod image;
pub mod morphology;
pub mod progress;
pub mod qstats;
pub mod settings;
pub mod sir;
pub mod stats;
pub mod strategy;
pub mod sumthreshold;
pub mod timefreq;

pub(crate) mod error;

// Re-exports.
pub use error::RfiSweepError;
pub use flagger::{
    run_baselines_parallel, ConfigError, FlagMask, Flagger, ImageSet, StrategyFlags, TelescopeId,
};
pub use image::{Image2D, Mask2D};
pub use progress::{CancellableProgress, NoProgress, ProgressListener};
pub use qstats::QualityStatistics;
pub use settings::{SettingsError, StrategySettings};
pub use strategy::{Action, ActionError, Strategy};
pub use timefreq::{DataKind, TimeFrequencyData};
