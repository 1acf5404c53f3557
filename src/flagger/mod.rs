// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The stable boundary of the flagger.

Callers fill an [ImageSet] with one baseline's visibilities, pick or build a
[Strategy](crate::strategy::Strategy), and get a [FlagMask] back from
[Flagger::run]. A strategy is immutable during execution, so one strategy
can serve any number of concurrent runs as long as every run gets its own
image set; [run_baselines_parallel] does exactly that over a worker pool.
 */

mod error;

use std::{fmt, ops::BitOr, path::Path};

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::{
    artifacts::ArtifactSet,
    error::RfiSweepError,
    image::{Image2D, Mask2D},
    progress::{NoProgress, ProgressListener},
    qstats::QualityStatistics,
    settings::StrategySettings,
    strategy::{builder, ActionError, Strategy},
    timefreq::{DataKind, TimeFrequencyData},
};

pub use error::ConfigError;

/// The telescopes with a tuned default strategy. `Generic` works everywhere
/// at some cost in precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TelescopeId {
    Generic,
    Lofar,
    Mwa,
    Wsrt,
}

/// Hint flags that alter a default strategy. Combine with `|`. The numeric
/// values are public interface and stay stable across releases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StrategyFlags(u32);

impl StrategyFlags {
    pub const NONE: StrategyFlags = StrategyFlags(0x000);
    /// Optimize for the telescope's lower frequencies.
    pub const LOW_FREQUENCY: StrategyFlags = StrategyFlags(0x001);
    /// Optimize for the telescope's higher frequencies.
    pub const HIGH_FREQUENCY: StrategyFlags = StrategyFlags(0x002);
    /// The observation spans a large fractional bandwidth.
    pub const LARGE_BANDWIDTH: StrategyFlags = StrategyFlags(0x004);
    /// The observation spans a small fractional bandwidth.
    pub const SMALL_BANDWIDTH: StrategyFlags = StrategyFlags(0x008);
    /// Keep transient celestial signals: don't reject broadband features
    /// that are narrow in time.
    pub const TRANSIENTS: StrategyFlags = StrategyFlags(0x010);
    /// Trade speed for convergence (more iterations).
    pub const ROBUST: StrategyFlags = StrategyFlags(0x020);
    /// Trade accuracy for speed.
    pub const FAST: StrategyFlags = StrategyFlags(0x040);
    /// A strong off-axis source may produce rapid fringes.
    pub const OFF_AXIS_SOURCES: StrategyFlags = StrategyFlags(0x080);
    /// Flag less than the telescope default.
    pub const UNSENSITIVE: StrategyFlags = StrategyFlags(0x100);
    /// Flag more than the telescope default.
    pub const SENSITIVE: StrategyFlags = StrategyFlags(0x200);
    /// Keep intermediate images around for display.
    pub const GUI_FRIENDLY: StrategyFlags = StrategyFlags(0x400);
    /// Erase flags that were already set instead of combining with them.
    pub const CLEAR_FLAGS: StrategyFlags = StrategyFlags(0x800);
    /// The baseline is an auto-correlation.
    pub const AUTO_CORRELATION: StrategyFlags = StrategyFlags(0x1000);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> StrategyFlags {
        StrategyFlags(bits)
    }

    pub const fn contains(self, other: StrategyFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for StrategyFlags {
    type Output = StrategyFlags;

    fn bitor(self, rhs: StrategyFlags) -> StrategyFlags {
        StrategyFlags(self.0 | rhs.0)
    }
}

impl fmt::Display for StrategyFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const NAMES: [(StrategyFlags, &str); 13] = [
            (StrategyFlags::LOW_FREQUENCY, "low-frequency"),
            (StrategyFlags::HIGH_FREQUENCY, "high-frequency"),
            (StrategyFlags::LARGE_BANDWIDTH, "large-bandwidth"),
            (StrategyFlags::SMALL_BANDWIDTH, "small-bandwidth"),
            (StrategyFlags::TRANSIENTS, "transients"),
            (StrategyFlags::ROBUST, "robust"),
            (StrategyFlags::FAST, "fast"),
            (StrategyFlags::OFF_AXIS_SOURCES, "off-axis-sources"),
            (StrategyFlags::UNSENSITIVE, "unsensitive"),
            (StrategyFlags::SENSITIVE, "sensitive"),
            (StrategyFlags::GUI_FRIENDLY, "gui-friendly"),
            (StrategyFlags::CLEAR_FLAGS, "clear-flags"),
            (StrategyFlags::AUTO_CORRELATION, "auto-correlation"),
        ];
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, " | ")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// The time-frequency images of one baseline.
///
/// The number of images determines the interpretation: 1 holds amplitudes
/// of one polarisation; 2 holds real and imaginary parts of one
/// polarisation; 4 and 8 hold real/imaginary pairs of two and four
/// polarisations. Rows are padded to [Self::horizontal_stride] floats, so
/// sample `(x, y)` of image `i` lives at `image_buffer(i)[y * stride + x]`.
#[derive(Clone, Debug)]
pub struct ImageSet {
    images: Vec<Image2D>,
}

impl ImageSet {
    /// Wrap existing images. The count is validated by [Flagger::run], not
    /// here, so drivers can build sets generically.
    pub fn from_images(images: Vec<Image2D>) -> Result<ImageSet, ConfigError> {
        if images.is_empty() {
            return Err(ConfigError::EmptyImageSet);
        }
        if !images.windows(2).all(|w| w[0].is_same_size(&w[1])) {
            return Err(ConfigError::MismatchedImageSizes);
        }
        Ok(ImageSet { images })
    }

    pub fn width(&self) -> usize {
        self.images[0].width()
    }

    pub fn height(&self) -> usize {
        self.images[0].height()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Floats per padded row.
    pub fn horizontal_stride(&self) -> usize {
        self.images[0].stride()
    }

    pub fn image_buffer(&self, image_index: usize) -> &[f32] {
        self.images[image_index].as_slice()
    }

    pub fn image_buffer_mut(&mut self, image_index: usize) -> &mut [f32] {
        self.images[image_index].as_slice_mut()
    }

    pub fn value(&self, image_index: usize, x: usize, y: usize) -> f32 {
        self.images[image_index].value(x, y)
    }

    pub fn set_value(&mut self, image_index: usize, x: usize, y: usize, value: f32) {
        self.images[image_index].set_value(x, y, value);
    }

    pub(crate) fn images(&self) -> &[Image2D] {
        &self.images
    }
}

/// The boolean answer for one baseline; `true` marks RFI. Same stride
/// contract as [ImageSet].
#[derive(Clone, Debug)]
pub struct FlagMask {
    mask: Mask2D,
}

impl FlagMask {
    pub fn width(&self) -> usize {
        self.mask.width()
    }

    pub fn height(&self) -> usize {
        self.mask.height()
    }

    pub fn horizontal_stride(&self) -> usize {
        self.mask.stride()
    }

    pub fn buffer(&self) -> &[bool] {
        self.mask.as_slice()
    }

    pub fn value(&self, x: usize, y: usize) -> bool {
        self.mask.value(x, y)
    }

    pub fn flagged_count(&self) -> usize {
        self.mask.count_flagged()
    }

    pub(crate) fn mask(&self) -> &Mask2D {
        &self.mask
    }

    pub(crate) fn from_mask(mask: Mask2D) -> FlagMask {
        FlagMask { mask }
    }
}

/// Entry point to the flagger.
#[derive(Clone, Copy, Debug, Default)]
pub struct Flagger;

impl Flagger {
    pub fn new() -> Flagger {
        Flagger
    }

    /// A new image set with zeroed samples.
    pub fn make_image_set(
        &self,
        width: usize,
        height: usize,
        count: usize,
    ) -> Result<ImageSet, ConfigError> {
        self.make_image_set_initialized(width, height, count, 0.0)
    }

    /// A new image set with every sample set to `initial_value`.
    pub fn make_image_set_initialized(
        &self,
        width: usize,
        height: usize,
        count: usize,
        initial_value: f32,
    ) -> Result<ImageSet, ConfigError> {
        assert_valid_count(count)?;
        let images = (0..count)
            .map(|_| Image2D::new_set(width, height, initial_value))
            .collect();
        ImageSet::from_images(images)
    }

    /// The default strategy for a telescope. All parameters besides the
    /// telescope are hints.
    pub fn make_strategy(
        &self,
        telescope: TelescopeId,
        flags: StrategyFlags,
        frequency: f64,
        time_res: f64,
        frequency_res: f64,
    ) -> Strategy {
        info!("building {telescope} strategy with flags: {flags}");
        builder::default_strategy(telescope, flags, frequency, time_res, frequency_res)
    }

    /// Build a strategy from a TOML settings file; unset keys fall back to
    /// the default strategy of the telescope named in the file.
    pub fn load_strategy<P: AsRef<Path>>(&self, path: P) -> Result<Strategy, RfiSweepError> {
        let settings = StrategySettings::load(path)?;
        Ok(settings.into_strategy())
    }

    /// One flagging pass over one baseline. Thread-safe as long as distinct
    /// image sets are passed to concurrent calls; the strategy may be
    /// shared freely.
    pub fn run(&self, strategy: &Strategy, input: &ImageSet) -> Result<FlagMask, RfiSweepError> {
        self.run_with_listener(strategy, input, &NoProgress)
    }

    /// As [Self::run], with progress callbacks and cooperative
    /// cancellation. A cancelled run returns the partial mask the completed
    /// actions produced.
    pub fn run_with_listener(
        &self,
        strategy: &Strategy,
        input: &ImageSet,
        listener: &dyn ProgressListener,
    ) -> Result<FlagMask, RfiSweepError> {
        let data = wrap_image_set(input)?;
        let mut artifacts = ArtifactSet::new(data);
        match strategy.perform(&mut artifacts, listener) {
            Ok(()) => {}
            Err(ActionError::Cancelled) => {
                info!("flagging run cancelled; returning the partial mask");
            }
            Err(error) => {
                listener.on_error(&error);
                return Err(error.into());
            }
        }
        Ok(FlagMask::from_mask(artifacts.contaminated().single_mask()))
    }

    /// A fresh statistics collector for `polarisation_count` polarisations
    /// over the given scan times and channel frequencies.
    pub fn make_quality_statistics(
        &self,
        scan_times: &[f64],
        channel_frequencies: &[f64],
        polarisation_count: usize,
    ) -> QualityStatistics {
        QualityStatistics::new(scan_times, channel_frequencies, polarisation_count)
    }

    /// Fold one baseline into `destination`. `correlator_flags` marks
    /// samples the correlator already rejected; they are ignored entirely.
    pub fn collect_statistics(
        &self,
        destination: &mut QualityStatistics,
        image_set: &ImageSet,
        rfi_flags: &FlagMask,
        correlator_flags: &FlagMask,
    ) {
        destination.collect(
            image_set.images(),
            rfi_flags.mask(),
            correlator_flags.mask(),
        );
    }

    /// Write collected statistics as TSV.
    pub fn write_statistics<P: AsRef<Path>>(
        &self,
        statistics: &QualityStatistics,
        path: P,
    ) -> Result<(), RfiSweepError> {
        statistics.write_tsv(path).map_err(RfiSweepError::Io)
    }
}

/// Flag many baselines over a worker pool, one artifact per baseline. The
/// returned masks keep the input order.
pub fn run_baselines_parallel(
    strategy: &Strategy,
    image_sets: &[ImageSet],
) -> Result<Vec<FlagMask>, RfiSweepError> {
    let flagger = Flagger::new();
    image_sets
        .par_iter()
        .map(|input| flagger.run(strategy, input))
        .collect()
}

fn assert_valid_count(count: usize) -> Result<(), ConfigError> {
    match count {
        1 | 2 | 4 | 8 => Ok(()),
        _ => Err(ConfigError::InvalidImageCount { count }),
    }
}

/// Bundle the caller's buffers per the documented layout, with fresh
/// all-false masks.
fn wrap_image_set(input: &ImageSet) -> Result<TimeFrequencyData, ConfigError> {
    assert_valid_count(input.image_count())?;
    let kind = match input.image_count() {
        1 => DataKind::Amplitude,
        2 => DataKind::Complex,
        4 => DataKind::Dipole2Pol,
        _ => DataKind::Dipole4Pol,
    };
    let mut data = TimeFrequencyData::new(kind, input.images().to_vec());
    if data.polarisation_count() > 1 {
        let mask = Mask2D::new_false(input.width(), input.height());
        let masks = vec![mask; data.polarisation_count()];
        data.set_polarisation_masks(masks);
    }
    Ok(data)
}

// Strides are part of the public buffer contract; re-export the helper so
// drivers can compute offsets before making a set.
pub use crate::image::stride_for_width;
