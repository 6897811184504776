// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::keys::ObstacleId;
use thiserror::Error;

/// Result type for cover queries
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the cover engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Geometry error: {0}")]
    Geometry(#[from] token_cover_geometry::Error),

    /// Rejected by [`crate::CoverConfig::validate`]
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The id is not in the scene, or is not a token
    #[error("Unknown token: {0:?}")]
    UnknownToken(ObstacleId),

    #[error("Unknown obstacle: {0:?}")]
    UnknownObstacle(ObstacleId),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
