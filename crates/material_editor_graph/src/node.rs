// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph.

use crate::id::{NodeId, PinId};
use crate::pin::Pin;
use serde::{Deserialize, Serialize};

/// Rendering archetype of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Header plus labeled pin rows
    Blueprint,
    /// Headerless, name between the pin columns
    Simple,
    /// Compact behavior-tree box
    Tree,
    /// Resizable background frame without pins
    Comment,
    /// Rounded body with pins on the top and bottom edges
    Houdini,
}

impl NodeType {
    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Blueprint => "Blueprint",
            Self::Simple => "Simple",
            Self::Tree => "Tree",
            Self::Comment => "Comment",
            Self::Houdini => "Houdini",
        }
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Input pins, in display order
    pub inputs: Vec<Pin>,
    /// Output pins, in display order
    pub outputs: Vec<Pin>,
    /// Header / tint color
    pub color: [u8; 3],
    /// Rendering archetype
    pub node_type: NodeType,
    /// Position in the graph UI (top-left corner, graph space)
    pub position: [f32; 2],
    /// Size, recomputed by rendering (user-controlled for comments)
    pub size: [f32; 2],
    /// Current editor state as RON
    pub state: String,
    /// Snapshot of `state` taken by the user
    pub saved_state: String,
}

impl Node {
    /// Create a new blueprint node with no pins
    pub fn new(id: NodeId, name: impl Into<String>, color: [u8; 3]) -> Self {
        Self {
            id,
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            color,
            node_type: NodeType::Blueprint,
            position: [0.0, 0.0],
            size: [0.0, 0.0],
            state: String::new(),
            saved_state: String::new(),
        }
    }

    /// Set the rendering archetype
    pub fn with_type(mut self, node_type: NodeType) -> Self {
        self.node_type = node_type;
        self
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Get a pin by ID
    pub fn pin(&self, pin_id: PinId) -> Option<&Pin> {
        self.inputs
            .iter()
            .find(|p| p.id == pin_id)
            .or_else(|| self.outputs.iter().find(|p| p.id == pin_id))
    }

    /// Get all pins
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.inputs.iter().chain(self.outputs.iter())
    }
}

/// Layout snapshot of a node, stored in [`Node::state`] as RON
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    /// Node position
    pub position: [f32; 2],
    /// Node size
    pub size: [f32; 2],
}

impl NodeState {
    /// Capture the current layout of a node
    pub fn capture(node: &Node) -> Self {
        Self {
            position: node.position,
            size: node.size,
        }
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::to_string(self)
    }

    /// Parse from RON
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Write this layout back into a node
    pub fn apply(&self, node: &mut Node) {
        node.position = self.position;
        node.size = self.size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::PinType;

    #[test]
    fn test_pin_lookup() {
        let mut node = Node::new(NodeId(1), "Branch", [255, 255, 255]);
        node.inputs.push(Pin::new(PinId(2), "", PinType::Flow));
        node.outputs.push(Pin::new(PinId(3), "True", PinType::Flow));

        assert_eq!(node.pin(PinId(3)).map(|p| p.name.as_str()), Some("True"));
        assert!(node.pin(PinId(9)).is_none());
        assert_eq!(node.pins().count(), 2);
    }

    #[test]
    fn test_state_roundtrip() {
        let mut node = Node::new(NodeId(1), "Comment", [255, 255, 255]).with_position(112.0, 576.0);
        node.size = [384.0, 154.0];

        let ron_str = NodeState::capture(&node).to_ron().unwrap();
        node.position = [0.0, 0.0];
        node.size = [1.0, 1.0];

        NodeState::from_ron(&ron_str).unwrap().apply(&mut node);
        assert_eq!(node.position, [112.0, 576.0]);
        assert_eq!(node.size, [384.0, 154.0]);
    }

    #[test]
    fn test_state_rejects_garbage() {
        assert!(NodeState::from_ron("not ron at all").is_err());
    }
}
