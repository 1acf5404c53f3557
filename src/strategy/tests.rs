// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::{builder::*, *};
use crate::{
    artifacts::ArtifactSet,
    flagger::{StrategyFlags, TelescopeId},
    image::{Image2D, Mask2D},
    progress::{CancellableProgress, NoProgress},
    timefreq::{DataKind, TimeFrequencyData},
};

fn amplitude_artifact(image: Image2D) -> ArtifactSet {
    ArtifactSet::new(TimeFrequencyData::new(DataKind::Amplitude, vec![image]))
}

fn action_names(actions: &[Action]) -> Vec<&'static str> {
    actions.iter().map(Action::name).collect()
}

/// Walk the whole tree depth-first.
fn collect<'a>(actions: &'a [Action], into: &mut Vec<&'a Action>) {
    for action in actions {
        into.push(action);
        collect(action.children(), into);
    }
}

fn all_actions(strategy: &Strategy) -> Vec<&Action> {
    let mut out = Vec::new();
    collect(strategy.actions(), &mut out);
    out
}

#[test]
fn default_tree_has_the_canonical_shape() {
    let strategy = default_strategy(
        TelescopeId::Generic,
        StrategyFlags::NONE,
        0.0,
        0.0,
        0.0,
    );
    assert_eq!(
        action_names(strategy.actions()),
        vec![
            "SetFlagging",
            "ForEachPolarisation",
            "Plot",
            "SetFlagging",
            "StatisticalFlag",
            "TimeSelection",
            "BaselineSelection",
            "SetFlagging",
        ]
    );

    // Inside: one complex-component block holding the iteration, then the
    // final full-sensitivity threshold.
    let fep = &strategy.actions()[1];
    assert_eq!(action_names(fep.children()), vec!["ForEachComplexComponent"]);
    let focc = &fep.children()[0];
    assert_eq!(
        action_names(focc.children()),
        vec!["Iteration", "SumThreshold"]
    );
    let iteration = &focc.children()[0];
    assert_eq!(
        action_names(iteration.children()),
        vec![
            "SumThreshold",
            "CombineFlagResults",
            "SetImage",
            "ChangeResolution"
        ]
    );
}

#[test]
fn iteration_defaults_follow_the_decision_table() {
    let plain = StrategySetup::from_flags(TelescopeId::Generic, StrategyFlags::NONE);
    assert_eq!(plain.iteration_count, 2);
    assert_abs_diff_eq!(plain.sensitivity_start, 4.0);

    let robust = StrategySetup::from_flags(TelescopeId::Generic, StrategyFlags::ROBUST);
    assert_eq!(robust.iteration_count, 4);
    assert_abs_diff_eq!(robust.sensitivity_start, 8.0);
}

#[test]
fn transients_disable_frequency_direction_everywhere() {
    let strategy = default_strategy(
        TelescopeId::Generic,
        StrategyFlags::TRANSIENTS,
        0.0,
        0.0,
        0.0,
    );
    let mut saw_sum_threshold = false;
    for action in all_actions(&strategy) {
        match action {
            Action::SumThreshold(t) => {
                saw_sum_threshold = true;
                assert!(!t.frequency_direction_flagging);
                assert!(t.time_direction_flagging);
            }
            Action::TimeSelection(_) => panic!("transients must not reject time steps"),
            Action::ChangeResolution(c) => assert_eq!(c.time_decrease_factor, 1),
            Action::HighPassFilter(h) => assert_eq!(h.window_width, 1),
            _ => {}
        }
    }
    assert!(saw_sum_threshold);
}

#[test]
fn passband_calibration_follows_telescope_and_bandwidth() {
    let has_calibration = |telescope, flags| {
        all_actions(&default_strategy(telescope, flags, 0.0, 0.0, 0.0))
            .iter()
            .any(|a| matches!(a, Action::CalibratePassband(_)))
    };
    assert!(has_calibration(TelescopeId::Mwa, StrategyFlags::NONE));
    assert!(!has_calibration(
        TelescopeId::Mwa,
        StrategyFlags::SMALL_BANDWIDTH
    ));
    assert!(has_calibration(
        TelescopeId::Generic,
        StrategyFlags::LARGE_BANDWIDTH
    ));
    assert!(!has_calibration(TelescopeId::Lofar, StrategyFlags::NONE));
}

#[test]
fn gui_friendly_resets_and_clears() {
    let strategy = default_strategy(
        TelescopeId::Generic,
        StrategyFlags::GUI_FRIENDLY,
        0.0,
        0.0,
        0.0,
    );
    let names = action_names(strategy.actions());
    assert_eq!(names[0], "SetImage");
    // No trailing OrOriginal: the last SetFlagging is PolarisationsEqual.
    let set_flagging_count = names.iter().filter(|&&n| n == "SetFlagging").count();
    assert_eq!(set_flagging_count, 2);
}

#[test]
fn monotonicity_marks_the_replacing_actions() {
    assert!(!Action::SetImage(SetImageAction::default()).is_mask_monotonic());
    assert!(!Action::SetFlagging(SetFlaggingAction::default()).is_mask_monotonic());
    assert!(Action::SumThreshold(SumThresholdAction::default()).is_mask_monotonic());
    assert!(Action::StatisticalFlag(StatisticalFlagAction::default()).is_mask_monotonic());
}

#[test]
fn set_flagging_clears_equalises_and_combines() {
    let images = (0..4).map(|_| Image2D::new_zero(4, 4)).collect();
    let mut data = TimeFrequencyData::new(DataKind::Dipole2Pol, images);
    let mut m0 = Mask2D::new_false(4, 4);
    m0.set_value(0, 0, true);
    let m1 = Mask2D::new_false(4, 4);
    data.set_polarisation_masks(vec![m0, m1]);
    let mut artifacts = ArtifactSet::new(data);

    // PolarisationsEqual: both polarisations get the union.
    SetFlaggingAction {
        new_flagging: NewFlagging::PolarisationsEqual,
    }
    .perform(&mut artifacts)
    .unwrap();
    assert!(artifacts.contaminated().mask_for_polarisation(1).value(0, 0));

    // None: everything cleared.
    SetFlaggingAction {
        new_flagging: NewFlagging::None,
    }
    .perform(&mut artifacts)
    .unwrap();
    assert_eq!(artifacts.contaminated().single_mask().count_flagged(), 0);

    // OrOriginal: the original's flags come back.
    SetFlaggingAction {
        new_flagging: NewFlagging::OrOriginal,
    }
    .perform(&mut artifacts)
    .unwrap();
    assert!(artifacts.contaminated().single_mask().value(0, 0));
}

#[test]
fn set_image_restores_and_swaps_sources() {
    let image = Image2D::new_set(4, 4, 2.0);
    let mut artifacts = amplitude_artifact(image);
    // Mangle the contaminated image, then restore from the original.
    artifacts
        .contaminated_mut()
        .set_image(0, Image2D::new_set(4, 4, 9.0));
    SetImageAction {
        source: SetImageSource::FromOriginal,
    }
    .perform(&mut artifacts)
    .unwrap();
    assert_abs_diff_eq!(artifacts.contaminated().image(0).value(0, 0), 2.0);

    // FromRevised copies the (zeroed) background in.
    SetImageAction {
        source: SetImageSource::FromRevised,
    }
    .perform(&mut artifacts)
    .unwrap();
    assert_abs_diff_eq!(artifacts.contaminated().image(0).value(0, 0), 0.0);
}

#[test]
fn combine_flag_results_ors_children_from_the_entry_mask() {
    // A hot row and a hot column; frequency selection catches the row,
    // time selection the column, and the combination keeps both.
    let mut image = Image2D::new_zero(16, 16);
    for x in 0..16 {
        image.set_value(x, 3, 100.0);
    }
    for y in 0..16 {
        image.set_value(7, y, 100.0);
    }
    let mut artifacts = amplitude_artifact(image);

    let mut children = ActionBlock::new();
    children.push(Action::FrequencySelection(
        FrequencySelectionAction::default(),
    ));
    children.push(Action::TimeSelection(TimeSelectionAction::default()));
    CombineFlagResults { children }
        .perform(&mut artifacts, &NoProgress)
        .unwrap();

    let mask = artifacts.contaminated().single_mask();
    for x in 0..16 {
        assert!(mask.value(x, 3), "row sample {x} missing");
    }
    for y in 0..16 {
        assert!(mask.value(7, y), "column sample {y} missing");
    }
}

#[test]
fn change_resolution_restores_an_upsampled_background() {
    let image = Image2D::new_set(24, 24, 5.0);
    let mut artifacts = amplitude_artifact(image);

    let mut children = ActionBlock::new();
    children.push(Action::HighPassFilter(HighPassFilterAction::default()));
    ChangeResolutionAction {
        time_decrease_factor: 3,
        frequency_decrease_factor: 3,
        children,
        ..ChangeResolutionAction::default()
    }
    .perform(&mut artifacts, &NoProgress)
    .unwrap();

    // The background of a constant image is that constant, surviving the
    // round trip through the reduced resolution.
    let revised = artifacts.revised().image(0);
    assert_eq!(revised.width(), 24);
    assert_eq!(revised.height(), 24);
    assert_abs_diff_eq!(revised.value(12, 12), 5.0, epsilon = 1.0e-4);
}

#[test]
fn cancellation_stops_between_actions() {
    let strategy = default_strategy(
        TelescopeId::Generic,
        StrategyFlags::NONE,
        0.0,
        0.0,
        0.0,
    );
    let progress = CancellableProgress::new();
    progress.cancel();
    let mut artifacts = amplitude_artifact(Image2D::new_zero(8, 8));
    let result = strategy.perform(&mut artifacts, &progress);
    assert!(matches!(result, Err(ActionError::Cancelled)));
}

#[test]
fn write_flags_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flags.txt");

    let mut artifacts = amplitude_artifact(Image2D::new_zero(3, 2));
    let mut mask = Mask2D::new_false(3, 2);
    mask.set_value(1, 0, true);
    artifacts.contaminated_mut().set_global_mask(mask);

    WriteFlagsAction::new(&path).perform(&mut artifacts).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "3 2\n010\n000\n");
}

#[test]
fn write_flags_to_a_bad_path_is_an_io_error() {
    let mut artifacts = amplitude_artifact(Image2D::new_zero(2, 2));
    let result =
        WriteFlagsAction::new("/nonexistent-dir/flags.txt").perform(&mut artifacts);
    assert!(matches!(result, Err(ActionError::WriteFlags { .. })));
}

#[test]
fn baseline_selection_records_a_summary() {
    let mut artifacts = amplitude_artifact(Image2D::new_zero(4, 4));
    let mut mask = Mask2D::new_false(4, 4);
    mask.set_value(0, 0, true);
    artifacts.contaminated_mut().set_global_mask(mask);

    BaselineSelectionAction::default().perform(&mut artifacts).unwrap();
    let shared = artifacts.shared().lock().unwrap();
    assert_eq!(shared.baseline_summaries.len(), 1);
    assert_abs_diff_eq!(shared.baseline_summaries[0].flag_ratio(), 1.0 / 16.0);
}

#[test]
fn plot_accumulates_polarisation_counts() {
    let mut artifacts = amplitude_artifact(Image2D::new_zero(4, 4));
    let mut mask = Mask2D::new_false(4, 4);
    mask.set_value(0, 0, true);
    mask.set_value(1, 1, true);
    artifacts.contaminated_mut().set_global_mask(mask);

    PlotAction::default().perform(&mut artifacts).unwrap();
    PlotAction::default().perform(&mut artifacts).unwrap();
    let shared = artifacts.shared().lock().unwrap();
    assert_eq!(shared.polarisation_statistics.len(), 1);
    assert_eq!(shared.polarisation_statistics[0].total_samples, 32);
    assert_eq!(shared.polarisation_statistics[0].flagged_samples, 4);
}

#[test]
fn display_prints_an_indented_tree() {
    let strategy = default_strategy(
        TelescopeId::Generic,
        StrategyFlags::NONE,
        0.0,
        0.0,
        0.0,
    );
    let printed = strategy.to_string();
    assert!(printed.starts_with("Strategy\n"));
    assert!(printed.contains("  - ForEachPolarisation\n"));
    assert!(printed.contains("        - SumThreshold\n"));
}
