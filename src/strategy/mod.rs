// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The action tree.

A flagging recipe is a tree of actions with a single root ([Strategy]).
Actions are plain values: block actions own their children by value, so a
strategy is cheap to clone and has no interior mutability. `perform` takes
the per-baseline [ArtifactSet] by mutable reference, which is what makes one
shared strategy safe to execute concurrently on disjoint baselines.

Execution is strictly depth-first, left-to-right; the mask depends on the
order of mutations, so no reordering is ever allowed. Blocks poll the
progress listener's cancellation flag between children.
 */

pub(crate) mod actions;
pub mod builder;
#[cfg(test)]
mod tests;

use std::{fmt, path::PathBuf};

use thiserror::Error;

use crate::{artifacts::ArtifactSet, progress::ProgressListener};

pub use actions::{
    BaselineSelectionAction, CalibratePassbandAction, ChangeResolutionAction, CombineFlagResults,
    FilterMode, ForEachComplexComponentBlock, ForEachPolarisationBlock, HighPassFilterAction,
    IterationBlock, NewFlagging, PlotAction, PlotKind, SetFlaggingAction, SetImageAction,
    SetImageSource, StatisticalFlagAction, SumThresholdAction, TimeSelectionAction,
    FrequencySelectionAction, WriteFlagsAction,
};

/// A fatal error from inside the tree. Detection finding no RFI is *not* an
/// error; these are the cases the run cannot recover from.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("couldn't write flags to {}: {source}", path.display())]
    WriteFlags {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("a non-finite value escaped the {action} action")]
    NonFinite { action: &'static str },

    #[error("the run was cancelled")]
    Cancelled,
}

/// One node of the strategy tree.
#[derive(Clone, Debug)]
pub enum Action {
    SetImage(SetImageAction),
    SetFlagging(SetFlaggingAction),
    ForEachPolarisation(ForEachPolarisationBlock),
    ForEachComplexComponent(ForEachComplexComponentBlock),
    Iteration(IterationBlock),
    HighPassFilter(HighPassFilterAction),
    SumThreshold(SumThresholdAction),
    CombineFlagResults(CombineFlagResults),
    FrequencySelection(FrequencySelectionAction),
    TimeSelection(TimeSelectionAction),
    StatisticalFlag(StatisticalFlagAction),
    ChangeResolution(ChangeResolutionAction),
    CalibratePassband(CalibratePassbandAction),
    BaselineSelection(BaselineSelectionAction),
    Plot(PlotAction),
    WriteFlags(WriteFlagsAction),
}

impl Action {
    /// Execute this node on `artifacts`. Either the artifact is updated and
    /// `Ok` is returned, or a fatal error propagates; there is no partial
    /// failure state below an action.
    pub fn perform(
        &self,
        artifacts: &mut ArtifactSet,
        progress: &dyn ProgressListener,
    ) -> Result<(), ActionError> {
        match self {
            Action::SetImage(a) => a.perform(artifacts),
            Action::SetFlagging(a) => a.perform(artifacts),
            Action::ForEachPolarisation(a) => a.perform(artifacts, progress),
            Action::ForEachComplexComponent(a) => a.perform(artifacts, progress),
            Action::Iteration(a) => a.perform(artifacts, progress),
            Action::HighPassFilter(a) => a.perform(artifacts),
            Action::SumThreshold(a) => a.perform(artifacts),
            Action::CombineFlagResults(a) => a.perform(artifacts, progress),
            Action::FrequencySelection(a) => a.perform(artifacts),
            Action::TimeSelection(a) => a.perform(artifacts),
            Action::StatisticalFlag(a) => a.perform(artifacts),
            Action::ChangeResolution(a) => a.perform(artifacts, progress),
            Action::CalibratePassband(a) => a.perform(artifacts),
            Action::BaselineSelection(a) => a.perform(artifacts),
            Action::Plot(a) => a.perform(artifacts),
            Action::WriteFlags(a) => a.perform(artifacts),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::SetImage(_) => "SetImage",
            Action::SetFlagging(_) => "SetFlagging",
            Action::ForEachPolarisation(_) => "ForEachPolarisation",
            Action::ForEachComplexComponent(_) => "ForEachComplexComponent",
            Action::Iteration(_) => "Iteration",
            Action::HighPassFilter(_) => "HighPassFilter",
            Action::SumThreshold(_) => "SumThreshold",
            Action::CombineFlagResults(_) => "CombineFlagResults",
            Action::FrequencySelection(_) => "FrequencySelection",
            Action::TimeSelection(_) => "TimeSelection",
            Action::StatisticalFlag(_) => "StatisticalFlag",
            Action::ChangeResolution(_) => "ChangeResolution",
            Action::CalibratePassband(_) => "CalibratePassband",
            Action::BaselineSelection(_) => "BaselineSelection",
            Action::Plot(_) => "Plot",
            Action::WriteFlags(_) => "WriteFlags",
        }
    }

    /// The ordered children of a block action; empty for leaves.
    pub fn children(&self) -> &[Action] {
        match self {
            Action::ForEachPolarisation(a) => a.children.children(),
            Action::ForEachComplexComponent(a) => a.children.children(),
            Action::Iteration(a) => a.children.children(),
            Action::CombineFlagResults(a) => a.children.children(),
            Action::ChangeResolution(a) => a.children.children(),
            _ => &[],
        }
    }

    /// Whether the contaminated mask after this action is always a superset
    /// of the mask before it. False exactly for the actions that may replace
    /// or clear state: SetImage and SetFlagging.
    pub fn is_mask_monotonic(&self) -> bool {
        !matches!(self, Action::SetImage(_) | Action::SetFlagging(_))
    }
}

/// An ordered sequence of actions, executed front to back.
#[derive(Clone, Debug, Default)]
pub struct ActionBlock {
    children: Vec<Action>,
}

impl ActionBlock {
    pub fn new() -> ActionBlock {
        ActionBlock::default()
    }

    pub fn push(&mut self, action: Action) {
        self.children.push(action);
    }

    pub fn children(&self) -> &[Action] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Run every child in order, polling cancellation between children.
    pub fn perform_children(
        &self,
        artifacts: &mut ArtifactSet,
        progress: &dyn ProgressListener,
    ) -> Result<(), ActionError> {
        let total = self.children.len();
        for (done, child) in self.children.iter().enumerate() {
            if progress.is_cancelled() {
                return Err(ActionError::Cancelled);
            }
            progress.on_action_start(child.name());
            let result = child.perform(artifacts, progress);
            progress.on_action_end();
            result?;
            progress.on_progress(done + 1, total);
        }
        Ok(())
    }
}

/// The root of an action tree: one `perform` is one flagging pass over one
/// baseline.
#[derive(Clone, Debug, Default)]
pub struct Strategy {
    root: ActionBlock,
}

impl Strategy {
    pub fn new(root: ActionBlock) -> Strategy {
        Strategy { root }
    }

    pub fn actions(&self) -> &[Action] {
        self.root.children()
    }

    pub fn perform(
        &self,
        artifacts: &mut ArtifactSet,
        progress: &dyn ProgressListener,
    ) -> Result<(), ActionError> {
        self.root.perform_children(artifacts, progress)
    }
}

fn fmt_tree(f: &mut fmt::Formatter, actions: &[Action], depth: usize) -> fmt::Result {
    for action in actions {
        writeln!(f, "{:indent$}- {}", "", action.name(), indent = depth * 2)?;
        fmt_tree(f, action.children(), depth + 1)?;
    }
    Ok(())
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Strategy")?;
        fmt_tree(f, self.actions(), 1)
    }
}
