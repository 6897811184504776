// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Obstacle keys for arena-based storage.
//!
//! Keys are created by `slotmap::SlotMap` and stay valid (and unique) after
//! other obstacles are removed.

use slotmap::new_key_type;

new_key_type! {
    /// Key for any obstacle in a scene: wall, tile, drawing or token.
    pub struct ObstacleId;
}
