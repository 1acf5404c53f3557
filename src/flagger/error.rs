// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid image count {count} in an image set; it must be 1, 2, 4 or 8")]
    InvalidImageCount { count: usize },

    #[error("an image set needs at least one image")]
    EmptyImageSet,

    #[error("all images of an image set must have the same size")]
    MismatchedImageSizes,
}
