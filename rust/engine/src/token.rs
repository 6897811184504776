// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host description of a token

use crate::config::{CoverConfig, TokenBlocking};
use token_cover_geometry::{Footprint, Point2d, Point3d, TokenPrism};

#[derive(Debug, Clone, PartialEq)]
pub struct TokenData {
    pub footprint: Footprint,
    /// Elevation of the token's base
    pub elevation: f64,
    /// Standing height
    pub height: f64,
    pub prone: bool,
    pub dead: bool,
    /// Polygon the footprint is clipped to, e.g. the space walls leave around it
    pub constraint: Option<Vec<Point2d>>,
}

impl TokenData {
    pub fn new(footprint: Footprint, elevation: f64, height: f64) -> Self {
        Self {
            footprint,
            elevation,
            height,
            prone: false,
            dead: false,
            constraint: None,
        }
    }

    pub fn prone(mut self, prone: bool) -> Self {
        self.prone = prone;
        self
    }

    pub fn dead(mut self, dead: bool) -> Self {
        self.dead = dead;
        self
    }

    pub fn with_constraint(mut self, constraint: Vec<Point2d>) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Height after lying down
    pub fn effective_height(&self, config: &CoverConfig) -> f64 {
        if self.prone {
            self.height * config.prone_height_multiplier
        } else {
            self.height
        }
    }

    /// Elevation of the token's top
    pub fn top(&self, config: &CoverConfig) -> f64 {
        self.elevation + self.effective_height(config)
    }

    /// Viewpoint: footprint center at the top of the token
    pub fn eye(&self, config: &CoverConfig) -> Point3d {
        let c = self.footprint.center();
        Point3d::new(c.x, c.y, self.top(config))
    }

    /// Does this token obstruct sight under the given toggles
    pub fn blocks(&self, blocking: &TokenBlocking) -> bool {
        if self.dead {
            blocking.dead
        } else if self.prone {
            blocking.prone
        } else {
            blocking.live
        }
    }

    pub fn prism(&self, config: &CoverConfig) -> token_cover_geometry::Result<TokenPrism> {
        let ring = self.footprint.constrained_ring(self.constraint.as_deref())?;
        TokenPrism::build(ring, self.elevation, self.top(config))
    }
}
