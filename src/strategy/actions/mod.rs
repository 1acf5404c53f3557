// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The individual actions of the strategy tree. Each action is a plain
//! configuration struct whose `perform` reads and mutates an
//! [crate::artifacts::ArtifactSet].

mod baseline_selection;
mod calibrate_passband;
mod change_resolution;
mod combine;
mod for_each_complex_component;
mod for_each_polarisation;
mod high_pass_filter;
mod iteration;
mod plot;
mod selection;
mod set_flagging;
mod set_image;
mod statistical_flag;
mod sum_threshold;
mod write_flags;

pub use baseline_selection::BaselineSelectionAction;
pub use calibrate_passband::CalibratePassbandAction;
pub use change_resolution::ChangeResolutionAction;
pub use combine::CombineFlagResults;
pub use for_each_complex_component::ForEachComplexComponentBlock;
pub use for_each_polarisation::ForEachPolarisationBlock;
pub use high_pass_filter::{FilterMode, HighPassFilterAction};
pub use iteration::IterationBlock;
pub use plot::{PlotAction, PlotKind};
pub use selection::{FrequencySelectionAction, TimeSelectionAction};
pub use set_flagging::{NewFlagging, SetFlaggingAction};
pub use set_image::{SetImageAction, SetImageSource};
pub use statistical_flag::StatisticalFlagAction;
pub use sum_threshold::SumThresholdAction;
pub use write_flags::WriteFlagsAction;
