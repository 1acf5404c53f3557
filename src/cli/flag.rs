// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::Args;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::*;

use super::error::CliError;
use crate::{
    flagger::{FlagMask, Flagger, ImageSet, StrategyFlags, TelescopeId},
    settings::StrategySettings,
    strategy::{builder, Strategy},
};

#[derive(Debug, Args)]
pub(crate) struct FlagArgs {
    /// Raw visibility dump: little-endian f32, laid out as baselines,
    /// then images, then channels, then time steps (fastest).
    #[clap(name = "DATA_FILE", parse(from_os_str))]
    data: PathBuf,

    /// Number of time steps per image.
    #[clap(short = 'x', long)]
    width: usize,

    /// Number of frequency channels per image.
    #[clap(short = 'y', long)]
    height: usize,

    /// Images per baseline: 1 (amplitudes), 2 (complex), 4 or 8
    /// (complex dual/full polarisation).
    #[clap(short, long, default_value = "1")]
    count: usize,

    /// Number of baselines in the dump; each is flagged independently on
    /// the worker pool.
    #[clap(short, long, default_value = "1")]
    baselines: usize,

    /// Telescope whose default strategy to use.
    #[clap(short, long, default_value = "generic")]
    telescope: TelescopeId,

    /// Keep transient celestial signals (disables frequency-direction
    /// detection and time-step rejection).
    #[clap(long)]
    transients: bool,

    /// More iterations for better convergence.
    #[clap(long)]
    robust: bool,

    /// Drop any flags already present instead of combining with them.
    #[clap(long)]
    clear_flags: bool,

    /// The observation spans a large fractional bandwidth.
    #[clap(long)]
    large_bandwidth: bool,

    /// The observation spans a small fractional bandwidth.
    #[clap(long)]
    small_bandwidth: bool,

    /// TOML strategy settings; overrides the telescope defaults.
    #[clap(short, long, parse(from_os_str))]
    strategy: Option<PathBuf>,

    /// Where to write the masks. With multiple baselines, `-N` is inserted
    /// before the extension. Without this, only a summary is printed.
    #[clap(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Write per-channel quality statistics as TSV.
    #[clap(long, parse(from_os_str))]
    stats: Option<PathBuf>,
}

impl FlagArgs {
    pub(crate) fn run(&self, progress_bars: bool) -> Result<(), CliError> {
        let flagger = Flagger::new();
        let strategy = self.build_strategy(&flagger)?;
        debug!("running strategy:\n{strategy}");

        let inputs = self.read_baselines()?;
        info!(
            "flagging {} baseline(s) of {} x {} samples, {} image(s) each",
            inputs.len(),
            self.width,
            self.height,
            self.count
        );

        let bar = ProgressBar::new(inputs.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{msg}: [{wide_bar:.blue}] {pos}/{len} ({elapsed_precise})",
            )
            .expect("the progress template is valid")
            .progress_chars("=> "),
        );
        bar.set_message("baselines");
        if !progress_bars {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }

        let masks: Vec<FlagMask> = inputs
            .par_iter()
            .map(|input| {
                let mask = flagger.run(&strategy, input);
                bar.inc(1);
                mask
            })
            .collect::<Result<_, _>>()?;
        bar.finish();

        let occupancies = masks
            .iter()
            .map(|m| m.flagged_count() as f64 / (self.width * self.height) as f64);
        info!(
            "flag occupancy per baseline: {}",
            occupancies.map(|o| format!("{:.2}%", o * 100.0)).join(", ")
        );

        if let Some(output) = &self.output {
            for (i, mask) in masks.iter().enumerate() {
                let path = numbered_path(output, i, masks.len());
                write_mask(mask, &path).map_err(|source| CliError::WriteMask {
                    path: path.clone(),
                    source,
                })?;
                info!("wrote {}", path.display());
            }
        }

        if let Some(stats_path) = &self.stats {
            let scan_times: Vec<f64> = (0..self.width).map(|t| t as f64).collect();
            let channel_frequencies: Vec<f64> = (0..self.height).map(|c| c as f64).collect();
            let polarisation_count = (self.count / 2).max(1);
            let mut stats =
                flagger.make_quality_statistics(&scan_times, &channel_frequencies, polarisation_count);
            let no_flags =
                FlagMask::from_mask(crate::image::Mask2D::new_false(self.width, self.height));
            for (input, mask) in inputs.iter().zip(&masks) {
                flagger.collect_statistics(&mut stats, input, mask, &no_flags);
            }
            flagger.write_statistics(&stats, stats_path)?;
            info!("wrote {}", stats_path.display());
        }

        Ok(())
    }

    fn strategy_flags(&self) -> StrategyFlags {
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
        if self.large_bandwidth {
            flags = flags | StrategyFlags::LARGE_BANDWIDTH;
        }
        if self.small_bandwidth {
            flags = flags | StrategyFlags::SMALL_BANDWIDTH;
        }
        flags
    }

    fn build_strategy(&self, flagger: &Flagger) -> Result<Strategy, CliError> {
        let flags = self.strategy_flags();
        match &self.strategy {
            Some(path) => {
                let settings = StrategySettings::load(path)
                    .map_err(crate::RfiSweepError::Settings)?;
                let telescope = settings.telescope.unwrap_or(self.telescope);
                info!("strategy settings from {}", path.display());
                Ok(builder::strategy_for(&settings.resolve(telescope, flags)))
            }
            None => Ok(flagger.make_strategy(self.telescope, flags, 0.0, 0.0, 0.0)),
        }
    }

    fn read_baselines(&self) -> Result<Vec<ImageSet>, CliError> {
        let bytes = std::fs::read(&self.data).map_err(|source| CliError::ReadData {
            path: self.data.clone(),
            source,
        })?;
        let found = bytes.len() / 4;
        let expected = self.baselines * self.count * self.height * self.width;
        if bytes.len() % 4 != 0 || found != expected {
            return Err(CliError::WrongDataSize {
                path: self.data.clone(),
                found,
                expected,
                baselines: self.baselines,
                count: self.count,
                height: self.height,
                width: self.width,
            });
        }

        let flagger = Flagger::new();
        let mut samples = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]));
        let mut inputs = Vec::with_capacity(self.baselines);
        for _ in 0..self.baselines {
            let mut set = flagger
                .make_image_set(self.width, self.height, self.count)
                .map_err(crate::RfiSweepError::Config)?;
            for i in 0..self.count {
                let stride = set.horizontal_stride();
                let buffer = set.image_buffer_mut(i);
                for y in 0..self.height {
                    for x in 0..self.width {
                        buffer[y * stride + x] =
                            samples.next().expect("sample count verified above");
                    }
                }
            }
            inputs.push(set);
        }
        Ok(inputs)
    }
}

/// `flags.txt` stays `flags.txt` for one baseline and becomes
/// `flags-3.txt` for baseline 3 of many.
fn numbered_path(base: &Path, index: usize, total: usize) -> PathBuf {
    if total == 1 {
        return base.to_path_buf();
    }
    let stem = base.file_stem().unwrap_or_default().to_string_lossy();
    let name = match base.extension() {
        Some(ext) => format!("{stem}-{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{index}"),
    };
    base.with_file_name(name)
}

/// Same text format as the WriteFlags action: a size header, then one
/// `0`/`1` line per channel.
fn write_mask(mask: &FlagMask, path: &Path) -> Result<(), std::io::Error> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{} {}", mask.width(), mask.height())?;
    let mut line = String::with_capacity(mask.width());
    for y in 0..mask.height() {
        line.clear();
        for x in 0..mask.width() {
            line.push(if mask.value(x, y) { '1' } else { '0' });
        }
        writeln!(out, "{line}")?;
    }
    out.flush()
}
