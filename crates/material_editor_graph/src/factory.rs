// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed catalog of demo node archetypes.
//!
//! Each archetype has a hardcoded name, color, rendering type and pin set.
//! Spawning allocates the node id first and then one id per pin, in the
//! order the pins are declared below.

use crate::graph::Graph;
use crate::id::{NodeId, PinId};
use crate::node::{Node, NodeType};
use crate::pin::{Pin, PinType};

const WHITE: [u8; 3] = [255, 255, 255];
const BLUE: [u8; 3] = [128, 195, 248];

/// Default size of a freshly spawned comment
pub const COMMENT_DEFAULT_SIZE: [f32; 2] = [300.0, 200.0];

/// Demo node archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeArchetype {
    /// Input action with pressed/released flows
    InputAction,
    /// If/else branching
    Branch,
    /// Do N times
    DoN,
    /// Output action
    OutputAction,
    /// Print a string
    PrintString,
    /// Simple message source
    Message,
    /// Set timer by function name
    SetTimer,
    /// Less-than comparison
    Less,
    /// Odd multi-output node
    Weird,
    /// Single line trace by channel
    TraceByChannel,
    /// Behavior tree sequence
    TreeSequence,
    /// Behavior tree "Move To" task
    TreeTask,
    /// Behavior tree "Random Wait" task
    TreeTask2,
    /// Comment frame
    Comment,
    /// Houdini-style transform
    HoudiniTransform,
    /// Houdini-style group
    HoudiniGroup,
}

/// Pin list entry: (name, type)
type PinDecl = (&'static str, PinType);

/// Hardcoded description of an archetype
struct Template {
    name: &'static str,
    color: [u8; 3],
    node_type: NodeType,
    inputs: &'static [PinDecl],
    outputs: &'static [PinDecl],
}

impl NodeArchetype {
    /// All archetypes in menu order
    pub const ALL: [NodeArchetype; 16] = [
        Self::InputAction,
        Self::OutputAction,
        Self::Branch,
        Self::DoN,
        Self::SetTimer,
        Self::Less,
        Self::Weird,
        Self::TraceByChannel,
        Self::PrintString,
        Self::Comment,
        Self::TreeSequence,
        Self::TreeTask,
        Self::TreeTask2,
        Self::Message,
        Self::HoudiniTransform,
        Self::HoudiniGroup,
    ];

    /// Menu label
    pub fn label(self) -> &'static str {
        match self {
            Self::InputAction => "Input Action",
            Self::Branch => "Branch",
            Self::DoN => "Do N",
            Self::OutputAction => "Output Action",
            Self::PrintString => "Print String",
            Self::Message => "Message",
            Self::SetTimer => "Set Timer",
            Self::Less => "Less",
            Self::Weird => "o.O",
            Self::TraceByChannel => "Single Line Trace by Channel",
            Self::TreeSequence => "Sequence",
            Self::TreeTask => "Move To",
            Self::TreeTask2 => "Random Wait",
            Self::Comment => "Comment",
            Self::HoudiniTransform => "Transform",
            Self::HoudiniGroup => "Group",
        }
    }

    fn template(self) -> Template {
        use PinType::*;
        match self {
            Self::InputAction => Template {
                name: "InputAction Fire",
                color: [255, 128, 128],
                node_type: NodeType::Blueprint,
                inputs: &[],
                outputs: &[("", Delegate), ("Pressed", Flow), ("Released", Flow)],
            },
            Self::Branch => Template {
                name: "Branch",
                color: WHITE,
                node_type: NodeType::Blueprint,
                inputs: &[("", Flow), ("Condition", Bool)],
                outputs: &[("True", Flow), ("False", Flow)],
            },
            Self::DoN => Template {
                name: "Do N",
                color: WHITE,
                node_type: NodeType::Blueprint,
                inputs: &[("Enter", Flow), ("N", Int), ("Reset", Flow)],
                outputs: &[("Exit", Flow), ("Counter", Int)],
            },
            Self::OutputAction => Template {
                name: "OutputAction",
                color: WHITE,
                node_type: NodeType::Blueprint,
                inputs: &[("Sample", Float), ("Event", Delegate)],
                outputs: &[("Condition", Flow)],
            },
            Self::PrintString => Template {
                name: "Print String",
                color: WHITE,
                node_type: NodeType::Blueprint,
                inputs: &[("", Flow), ("In String", String)],
                outputs: &[("", Flow)],
            },
            Self::Message => Template {
                name: "",
                color: BLUE,
                node_type: NodeType::Simple,
                inputs: &[],
                outputs: &[("Message", String)],
            },
            Self::SetTimer => Template {
                name: "Set Timer",
                color: BLUE,
                node_type: NodeType::Blueprint,
                inputs: &[
                    ("", Flow),
                    ("Object", Object),
                    ("Function Name", Function),
                    ("Time", Float),
                    ("Looping", Bool),
                ],
                outputs: &[("", Flow)],
            },
            Self::Less => Template {
                name: "<",
                color: BLUE,
                node_type: NodeType::Simple,
                inputs: &[("", Float), ("", Float)],
                outputs: &[("", Float)],
            },
            Self::Weird => Template {
                name: "o.O",
                color: BLUE,
                node_type: NodeType::Simple,
                inputs: &[("", Float)],
                outputs: &[("", Float), ("", Float)],
            },
            Self::TraceByChannel => Template {
                name: "Single Line Trace by Channel",
                color: [255, 128, 64],
                node_type: NodeType::Blueprint,
                inputs: &[
                    ("", Flow),
                    ("Start", Int),
                    ("End", Int),
                    ("Trace Channel", Float),
                    ("Trace Complex", Bool),
                    ("Actors to Ignore", Object),
                    ("Draw Debug Type", Bool),
                    ("Ignore Self", Bool),
                ],
                outputs: &[("", Flow), ("Out Hit", Bool), ("Return Value", Float)],
            },
            Self::TreeSequence => Template {
                name: "Sequence",
                color: WHITE,
                node_type: NodeType::Tree,
                inputs: &[("", Flow)],
                outputs: &[("", Flow)],
            },
            Self::TreeTask => Template {
                name: "Move To",
                color: WHITE,
                node_type: NodeType::Tree,
                inputs: &[("", Flow)],
                outputs: &[],
            },
            Self::TreeTask2 => Template {
                name: "Random Wait",
                color: WHITE,
                node_type: NodeType::Tree,
                inputs: &[("", Flow)],
                outputs: &[],
            },
            Self::Comment => Template {
                name: "Test Comment",
                color: WHITE,
                node_type: NodeType::Comment,
                inputs: &[],
                outputs: &[],
            },
            Self::HoudiniTransform => Template {
                name: "Transform",
                color: WHITE,
                node_type: NodeType::Houdini,
                inputs: &[("", Flow)],
                outputs: &[("", Flow)],
            },
            Self::HoudiniGroup => Template {
                name: "Group",
                color: WHITE,
                node_type: NodeType::Houdini,
                inputs: &[("", Flow), ("", Flow)],
                outputs: &[("", Flow)],
            },
        }
    }
}

impl Graph {
    /// Spawn a node of the given archetype and return it
    pub fn spawn(&mut self, archetype: NodeArchetype) -> &mut Node {
        let template = archetype.template();

        let id = NodeId(self.next_id());
        let mut node = Node::new(id, template.name, template.color).with_type(template.node_type);
        for &(name, pin_type) in template.inputs {
            node.inputs.push(Pin::new(PinId(self.next_id()), name, pin_type));
        }
        for &(name, pin_type) in template.outputs {
            node.outputs.push(Pin::new(PinId(self.next_id()), name, pin_type));
        }
        if template.node_type == NodeType::Comment {
            node.size = COMMENT_DEFAULT_SIZE;
        }

        tracing::debug!("Spawned {:?} node {}", archetype, id);
        self.insert_node(node)
    }

    /// Spawn an "InputAction Fire" node
    pub fn spawn_input_action_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::InputAction)
    }

    /// Spawn a "Branch" node
    pub fn spawn_branch_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::Branch)
    }

    /// Spawn a "Do N" node
    pub fn spawn_do_n_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::DoN)
    }

    /// Spawn an "OutputAction" node
    pub fn spawn_output_action_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::OutputAction)
    }

    /// Spawn a "Print String" node
    pub fn spawn_print_string_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::PrintString)
    }

    /// Spawn a message node
    pub fn spawn_message_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::Message)
    }

    /// Spawn a "Set Timer" node
    pub fn spawn_set_timer_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::SetTimer)
    }

    /// Spawn a "<" node
    pub fn spawn_less_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::Less)
    }

    /// Spawn an "o.O" node
    pub fn spawn_weird_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::Weird)
    }

    /// Spawn a "Single Line Trace by Channel" node
    pub fn spawn_trace_by_channel_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::TraceByChannel)
    }

    /// Spawn a tree "Sequence" node
    pub fn spawn_tree_sequence_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::TreeSequence)
    }

    /// Spawn a tree "Move To" task
    pub fn spawn_tree_task_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::TreeTask)
    }

    /// Spawn a tree "Random Wait" task
    pub fn spawn_tree_task2_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::TreeTask2)
    }

    /// Spawn a comment frame
    pub fn spawn_comment(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::Comment)
    }

    /// Spawn a Houdini "Transform" node
    pub fn spawn_houdini_transform_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::HoudiniTransform)
    }

    /// Spawn a Houdini "Group" node
    pub fn spawn_houdini_group_node(&mut self) -> &mut Node {
        self.spawn(NodeArchetype::HoudiniGroup)
    }
}
