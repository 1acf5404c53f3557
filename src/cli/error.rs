// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::RfiSweepError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    RfiSweep(#[from] RfiSweepError),

    #[error("couldn't read visibility data from {}: {source}", path.display())]
    ReadData {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "{} holds {found} f32 samples, but {expected} were expected \
         (baselines x images x channels x time steps = {baselines} x {count} x {height} x {width})",
        path.display()
    )]
    WrongDataSize {
        path: PathBuf,
        found: usize,
        expected: usize,
        baselines: usize,
        count: usize,
        height: usize,
        width: usize,
    },

    #[error("couldn't write the flag mask to {}: {source}", path.display())]
    WriteMask {
        path: PathBuf,
        source: std::io::Error,
    },
}
