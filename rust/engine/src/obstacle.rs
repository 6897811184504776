// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene obstacles and the geometry built from them

use crate::config::CoverConfig;
use crate::token::TokenData;
use token_cover_geometry::{
    DrawingData, DrawingGeometry, Placeable, TileData, TileGeometry, TokenPrism, WallData, WallGeometry,
};

/// Authoritative host data for one obstacle
#[derive(Debug, Clone, PartialEq)]
pub enum Obstacle {
    Wall(WallData),
    Tile(TileData),
    Drawing(DrawingData),
    Token(TokenData),
}

impl Obstacle {
    pub fn as_token(&self) -> Option<&TokenData> {
        match self {
            Obstacle::Token(token) => Some(token),
            _ => None,
        }
    }

    #[inline]
    pub fn is_token(&self) -> bool {
        matches!(self, Obstacle::Token(_))
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        matches!(self, Obstacle::Wall(_))
    }

    /// Build faces; prone token height depends on the config
    pub fn build(&self, config: &CoverConfig) -> token_cover_geometry::Result<ObstacleGeometry> {
        Ok(match self {
            Obstacle::Wall(data) => ObstacleGeometry::Wall(WallGeometry::build(data)?),
            Obstacle::Tile(data) => ObstacleGeometry::Tile(TileGeometry::build(data)?),
            Obstacle::Drawing(data) => ObstacleGeometry::Drawing(DrawingGeometry::build(data)?),
            Obstacle::Token(data) => ObstacleGeometry::Token(data.prism(config)?),
        })
    }
}

impl From<WallData> for Obstacle {
    fn from(data: WallData) -> Self {
        Obstacle::Wall(data)
    }
}

impl From<TileData> for Obstacle {
    fn from(data: TileData) -> Self {
        Obstacle::Tile(data)
    }
}

impl From<DrawingData> for Obstacle {
    fn from(data: DrawingData) -> Self {
        Obstacle::Drawing(data)
    }
}

impl From<TokenData> for Obstacle {
    fn from(data: TokenData) -> Self {
        Obstacle::Token(data)
    }
}

/// Built faces of one obstacle
#[derive(Debug, Clone)]
pub enum ObstacleGeometry {
    Wall(WallGeometry),
    Tile(TileGeometry),
    Drawing(DrawingGeometry),
    Token(TokenPrism),
}

impl ObstacleGeometry {
    pub fn placeable(&self) -> &dyn Placeable {
        match self {
            ObstacleGeometry::Wall(g) => g,
            ObstacleGeometry::Tile(g) => g,
            ObstacleGeometry::Drawing(g) => g,
            ObstacleGeometry::Token(g) => g,
        }
    }

    /// Elevation of a horizontal obstacle
    pub fn horizontal_elevation(&self) -> Option<f64> {
        match self {
            ObstacleGeometry::Tile(g) => Some(g.elevation()),
            ObstacleGeometry::Drawing(g) => Some(g.elevation()),
            _ => None,
        }
    }
}
