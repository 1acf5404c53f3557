// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Construction of the canonical per-telescope strategies.

The telescope and the caller's hint flags are first reduced to a
[StrategySetup]; the setup then deterministically produces the tree. Keeping
the two steps separate lets a configuration file override individual knobs
without re-deriving the whole decision table.
 */

use log::debug;

use crate::{
    flagger::{StrategyFlags, TelescopeId},
    strategy::{
        Action, ActionBlock, BaselineSelectionAction, CalibratePassbandAction,
        ChangeResolutionAction, CombineFlagResults, FilterMode, ForEachComplexComponentBlock,
        ForEachPolarisationBlock, FrequencySelectionAction, HighPassFilterAction, IterationBlock,
        NewFlagging, PlotAction, SetFlaggingAction, SetImageAction, StatisticalFlagAction,
        Strategy, SumThresholdAction, TimeSelectionAction,
    },
};

/// The resolved knobs of one default strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrategySetup {
    pub iteration_count: usize,
    pub sensitivity_start: f64,
    pub keep_transients: bool,
    pub calibrate_passband: bool,
    pub clear_flags: bool,
    pub reset_contaminated: bool,
}

impl StrategySetup {
    /// Apply the decision table to a telescope and its hint flags.
    pub fn from_flags(telescope: TelescopeId, flags: StrategyFlags) -> StrategySetup {
        let calibrate_passband =
            // This instrument's observations have a strong frequency slope
            // unless the band is known to be narrow.
            (telescope == TelescopeId::Mwa && !flags.contains(StrategyFlags::SMALL_BANDWIDTH))
                || flags.contains(StrategyFlags::LARGE_BANDWIDTH);
        let iteration_count = if flags.contains(StrategyFlags::ROBUST) {
            4
        } else {
            2
        };
        StrategySetup {
            iteration_count,
            sensitivity_start: 2.0 * 2.0_f64.powf(iteration_count as f64 / 2.0),
            keep_transients: flags.contains(StrategyFlags::TRANSIENTS),
            calibrate_passband,
            clear_flags: flags.contains(StrategyFlags::CLEAR_FLAGS)
                || flags.contains(StrategyFlags::GUI_FRIENDLY),
            reset_contaminated: flags.contains(StrategyFlags::GUI_FRIENDLY),
        }
    }
}

/// The canonical strategy for a telescope. The resolution hints currently
/// only inform; passing zeros is fine.
pub fn default_strategy(
    telescope: TelescopeId,
    flags: StrategyFlags,
    frequency: f64,
    time_res: f64,
    frequency_res: f64,
) -> Strategy {
    if frequency > 0.0 || time_res > 0.0 || frequency_res > 0.0 {
        debug!(
            "strategy hints: frequency {frequency} Hz, time resolution {time_res} s, \
             frequency resolution {frequency_res} Hz"
        );
    }
    strategy_for(&StrategySetup::from_flags(telescope, flags))
}

/// Build the tree for a resolved setup.
pub fn strategy_for(setup: &StrategySetup) -> Strategy {
    let mut root = ActionBlock::new();

    if setup.reset_contaminated {
        root.push(Action::SetImage(SetImageAction::default()));
    }
    root.push(Action::SetFlagging(SetFlaggingAction {
        new_flagging: NewFlagging::None,
    }));

    root.push(Action::ForEachPolarisation(ForEachPolarisationBlock {
        children: one_block(Action::ForEachComplexComponent(amplitude_block(setup))),
    }));

    root.push(Action::Plot(PlotAction::default()));
    root.push(Action::SetFlagging(SetFlaggingAction {
        new_flagging: NewFlagging::PolarisationsEqual,
    }));
    root.push(Action::StatisticalFlag(StatisticalFlagAction::default()));
    if !setup.keep_transients {
        root.push(Action::TimeSelection(TimeSelectionAction::default()));
    }
    root.push(Action::BaselineSelection(BaselineSelectionAction {
        preparation_step: true,
    }));
    if !setup.clear_flags {
        root.push(Action::SetFlagging(SetFlaggingAction {
            new_flagging: NewFlagging::OrOriginal,
        }));
    }

    Strategy::new(root)
}

/// The per-polarisation amplitude pipeline: iterated detect/select/refit,
/// then an optional passband calibration and a final full-sensitivity
/// detection.
fn amplitude_block(setup: &StrategySetup) -> ForEachComplexComponentBlock {
    let mut children = ActionBlock::new();

    let mut iteration = ActionBlock::new();
    iteration.push(Action::SumThreshold(SumThresholdAction {
        base_sensitivity: 1.0,
        frequency_direction_flagging: !setup.keep_transients,
        ..SumThresholdAction::default()
    }));

    let mut selections = ActionBlock::new();
    selections.push(Action::FrequencySelection(
        FrequencySelectionAction::default(),
    ));
    if !setup.keep_transients {
        selections.push(Action::TimeSelection(TimeSelectionAction::default()));
    }
    iteration.push(Action::CombineFlagResults(CombineFlagResults {
        children: selections,
    }));

    iteration.push(Action::SetImage(SetImageAction::default()));
    iteration.push(Action::ChangeResolution(ChangeResolutionAction {
        time_decrease_factor: if setup.keep_transients { 1 } else { 3 },
        frequency_decrease_factor: 3,
        children: one_block(Action::HighPassFilter(HighPassFilterAction {
            window_width: if setup.keep_transients { 1 } else { 21 },
            window_height: 31,
            horizontal_sigma_sq: 2.5,
            vertical_sigma_sq: 5.0,
            mode: FilterMode::StoreRevised,
        })),
        ..ChangeResolutionAction::default()
    }));

    children.push(Action::Iteration(IterationBlock {
        iteration_count: setup.iteration_count,
        sensitivity_start: setup.sensitivity_start,
        children: iteration,
    }));

    if setup.calibrate_passband {
        children.push(Action::CalibratePassband(CalibratePassbandAction::default()));
    }
    children.push(Action::SumThreshold(SumThresholdAction {
        frequency_direction_flagging: !setup.keep_transients,
        ..SumThresholdAction::default()
    }));

    ForEachComplexComponentBlock {
        on_amplitude: true,
        restore_from_amplitude: false,
        children,
        ..ForEachComplexComponentBlock::default()
    }
}

fn one_block(action: Action) -> ActionBlock {
    let mut block = ActionBlock::new();
    block.push(action);
    block
}
