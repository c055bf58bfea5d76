// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pin definitions for node inputs/outputs.

use crate::id::{NodeId, PinId};
use serde::{Deserialize, Serialize};

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinKind {
    /// Output pin
    Output,
    /// Input pin
    Input,
}

/// Data type carried by a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinType {
    /// Execution flow
    Flow,
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// String value
    String,
    /// Object reference
    Object,
    /// Function reference
    Function,
    /// Event delegate
    Delegate,
}

/// Icon drawn for a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconShape {
    /// Execution arrow
    Flow,
    /// Round socket
    Circle,
    /// Square socket
    Square,
}

impl PinType {
    /// Get the icon color for this pin type (for UI)
    pub fn icon_color(self) -> [u8; 3] {
        match self {
            Self::Flow => [255, 255, 255],
            Self::Bool => [220, 48, 48],
            Self::Int => [68, 201, 156],
            Self::Float => [147, 226, 74],
            Self::String => [124, 21, 153],
            Self::Object => [51, 150, 215],
            Self::Function => [218, 0, 183],
            Self::Delegate => [255, 48, 48],
        }
    }

    /// Get the icon shape for this pin type
    pub fn icon_shape(self) -> IconShape {
        match self {
            Self::Flow => IconShape::Flow,
            Self::Delegate => IconShape::Square,
            Self::Bool
            | Self::Int
            | Self::Float
            | Self::String
            | Self::Object
            | Self::Function => IconShape::Circle,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Flow => "Flow",
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::String => "String",
            Self::Object => "Object",
            Self::Function => "Function",
            Self::Delegate => "Delegate",
        }
    }
}

/// A pin on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    /// Unique pin ID
    pub id: PinId,
    /// Owning node, filled in when the node is built
    pub node: NodeId,
    /// Pin name (may be empty)
    pub name: String,
    /// Data type
    pub pin_type: PinType,
    /// Direction, filled in when the node is built
    pub kind: PinKind,
}

impl Pin {
    /// Create a new pin. Owner and kind are assigned by [`crate::Graph::add_node`].
    pub fn new(id: PinId, name: impl Into<String>, pin_type: PinType) -> Self {
        Self {
            id,
            node: NodeId(0),
            name: name.into(),
            pin_type,
            kind: PinKind::Input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_shapes() {
        assert_eq!(PinType::Flow.icon_shape(), IconShape::Flow);
        assert_eq!(PinType::Delegate.icon_shape(), IconShape::Square);
        assert_eq!(PinType::Float.icon_shape(), IconShape::Circle);
        assert_eq!(PinType::Object.icon_shape(), IconShape::Circle);
    }

    #[test]
    fn test_new_pin_defaults() {
        let pin = Pin::new(PinId(4), "Condition", PinType::Bool);
        assert_eq!(pin.kind, PinKind::Input);
        assert_eq!(pin.node, NodeId(0));
        assert_eq!(pin.name, "Condition");
    }
}
