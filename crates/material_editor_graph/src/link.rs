// SPDX-License-Identifier: MIT OR Apache-2.0
//! Link (edge) definitions for the graph.

use crate::id::{LinkId, PinId};
use serde::{Deserialize, Serialize};

/// A connection from an output pin to an input pin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Unique link ID
    pub id: LinkId,
    /// Output side
    pub start_pin: PinId,
    /// Input side
    pub end_pin: PinId,
    /// Display color
    pub color: [u8; 3],
}

impl Link {
    /// Create a new white link
    pub fn new(id: LinkId, start_pin: PinId, end_pin: PinId) -> Self {
        Self {
            id,
            start_pin,
            end_pin,
            color: [255, 255, 255],
        }
    }

    /// Set the display color
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    /// Check if this link touches a specific pin
    pub fn involves_pin(&self, pin_id: PinId) -> bool {
        self.start_pin == pin_id || self.end_pin == pin_id
    }
}
