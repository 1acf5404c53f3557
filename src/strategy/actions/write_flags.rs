// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use log::info;

use crate::{artifacts::ArtifactSet, image::Mask2D, strategy::ActionError};

/// Dump the current single mask to a text file: a `width height` header
/// line, then one line of `0`/`1` characters per channel.
#[derive(Clone, Debug)]
pub struct WriteFlagsAction {
    pub path: PathBuf,
}

impl WriteFlagsAction {
    pub fn new<P: Into<PathBuf>>(path: P) -> WriteFlagsAction {
        WriteFlagsAction { path: path.into() }
    }

    pub fn perform(&self, artifacts: &mut ArtifactSet) -> Result<(), ActionError> {
        let mask = artifacts.contaminated().single_mask();
        info!(
            "writing {} flags to {}",
            mask.count_flagged(),
            self.path.display()
        );
        write_mask(&mask, &self.path).map_err(|source| ActionError::WriteFlags {
            path: self.path.clone(),
            source,
        })
    }
}

fn write_mask(mask: &Mask2D, path: &PathBuf) -> Result<(), std::io::Error> {
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
