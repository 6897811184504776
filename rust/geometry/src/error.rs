// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or projecting cover geometry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Zero-area or collinear input. The contribution is skipped, the batch continues.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A transform could not be inverted.
    #[error("Singular matrix (determinant {determinant:e})")]
    SingularMatrix { determinant: f64 },

    /// An obstacle is missing position or elevation data and cannot be built.
    #[error("Missing obstacle data: {0}")]
    MissingObstacleData(String),
}

impl Error {
    /// Shorthand for [`Error::DegenerateGeometry`]
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Error::DegenerateGeometry(msg.into())
    }

    /// Shorthand for [`Error::MissingObstacleData`]
    pub fn missing(msg: impl Into<String>) -> Self {
        Error::MissingObstacleData(msg.into())
    }
}
