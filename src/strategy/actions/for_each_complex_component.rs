// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::debug;

use crate::{
    artifacts::ArtifactSet,
    progress::ProgressListener,
    strategy::{ActionBlock, ActionError},
    timefreq::{DataKind, TimeFrequencyData},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Component {
    Amplitude,
    Phase,
    Real,
    Imaginary,
}

/// Run the children on derived components of the active (single
/// polarisation) data. The default strategies only enable the amplitude.
///
/// The derived view lives for the whole block, so a background stored into
/// its revised slot is seen by every later child. When the block closes,
/// the view's flags become the polarisation's flags; with
/// `restore_from_amplitude` set, amplitude changes are folded back into the
/// complex pair as well.
#[derive(Clone, Debug, Default)]
pub struct ForEachComplexComponentBlock {
    pub on_amplitude: bool,
    pub on_phase: bool,
    pub on_real: bool,
    pub on_imaginary: bool,
    pub restore_from_amplitude: bool,
    pub children: ActionBlock,
}

impl ForEachComplexComponentBlock {
    pub fn perform(
        &self,
        artifacts: &mut ArtifactSet,
        progress: &dyn ProgressListener,
    ) -> Result<(), ActionError> {
        let kind = artifacts.contaminated().kind();
        if kind != DataKind::Amplitude && kind != DataKind::Complex {
            // Multi-polarisation data reaches this block only in hand-built
            // trees; there is no component to derive, so operate in place.
            debug!("ForEachComplexComponent on multi-polarisation data; running in place");
            return self.children.perform_children(artifacts, progress);
        }

        let components = [
            (Component::Amplitude, self.on_amplitude),
            (Component::Phase, self.on_phase),
            (Component::Real, self.on_real),
            (Component::Imaginary, self.on_imaginary),
        ];
        for (component, enabled) in components {
            if !enabled {
                continue;
            }
            if progress.is_cancelled() {
                return Err(ActionError::Cancelled);
            }
            self.perform_on_component(component, artifacts, progress)?;
        }
        Ok(())
    }

    fn perform_on_component(
        &self,
        component: Component,
        artifacts: &mut ArtifactSet,
        progress: &dyn ProgressListener,
    ) -> Result<(), ActionError> {
        if artifacts.contaminated().kind() == DataKind::Amplitude {
            if component == Component::Amplitude {
                return self.children.perform_children(artifacts, progress);
            }
            debug!("amplitude-only data has no {component:?} component; skipping");
            return Ok(());
        }

        let derive = |data: &TimeFrequencyData| match component {
            Component::Amplitude => data.amplitude_part(),
            Component::Phase => data.phase_part(),
            Component::Real => data.real_part(),
            Component::Imaginary => data.imaginary_part(),
        };
        // The active data is complex here, so every component derives.
        let (original, contaminated, revised) = match (
            derive(artifacts.original()),
            derive(artifacts.contaminated()),
            derive(artifacts.revised()),
        ) {
            (Some(o), Some(c), Some(r)) => (o, c, r),
            _ => return Ok(()),
        };

        let mut sub = artifacts.child(original, contaminated, revised);
        self.children.perform_children(&mut sub, progress)?;

        if self.restore_from_amplitude && component == Component::Amplitude {
            let amplitude = sub.contaminated().image(0).clone();
            artifacts.contaminated_mut().scale_to_amplitude(&amplitude);
        }
        let mask = sub.contaminated().single_mask();
        artifacts.contaminated_mut().set_global_mask(mask);
        artifacts.set_sensitivity(sub.sensitivity());
        Ok(())
    }
}
