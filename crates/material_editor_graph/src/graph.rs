// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and links.

use crate::id::{IdAllocator, LinkId, NodeId, PinId};
use crate::link::Link;
use crate::node::Node;
use crate::pin::{Pin, PinKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Rules applied when the user drags out a new link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPolicy {
    /// Reject links between pins of different [`crate::PinType`]s
    pub enforce_pin_types: bool,
}

/// A node graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Nodes in insertion (render) order
    nodes: IndexMap<NodeId, Node>,
    /// Links in insertion order
    links: IndexMap<LinkId, Link>,
    /// Shared id source for nodes, pins and links
    ids: IdAllocator,
    /// Link creation rules
    pub policy: LinkPolicy,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            links: IndexMap::new(),
            ids: IdAllocator::new(),
            policy: LinkPolicy::default(),
        }
    }

    /// Create a new empty graph with a link policy
    pub fn with_policy(policy: LinkPolicy) -> Self {
        Self {
            policy,
            ..Self::new()
        }
    }

    /// Take the next id from the shared sequence
    pub fn next_id(&mut self) -> u32 {
        self.ids.next_id()
    }

    /// Take the next id as a link id
    pub fn next_link_id(&mut self) -> LinkId {
        LinkId(self.ids.next_id())
    }

    /// Add a node, wiring every pin back to it and fixing pin kinds
    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.insert_node(node).id
    }

    pub(crate) fn insert_node(&mut self, mut node: Node) -> &mut Node {
        let id = node.id;
        for pin in &mut node.inputs {
            pin.node = id;
            pin.kind = PinKind::Input;
        }
        for pin in &mut node.outputs {
            pin.node = id;
            pin.kind = PinKind::Output;
        }
        let (index, _) = self.nodes.insert_full(id, node);
        &mut self.nodes[index]
    }

    /// Remove a node and every link attached to its pins
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let node = self.nodes.shift_remove(&node_id)?;
        let before = self.links.len();
        self.links
            .retain(|_, link| !node.pins().any(|pin| link.involves_pin(pin.id)));
        tracing::debug!(
            "Removed node {} ({}) and {} attached links",
            node.id,
            node.name,
            before - self.links.len()
        );
        Some(node)
    }

    /// Find a node by ID
    pub fn find_node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Find a mutable node by ID
    pub fn find_node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Find a link by ID
    pub fn find_link(&self, link_id: LinkId) -> Option<&Link> {
        self.links.get(&link_id)
    }

    /// Find a pin by ID (linear scan over all nodes)
    pub fn find_pin(&self, pin_id: PinId) -> Option<&Pin> {
        self.nodes.values().find_map(|node| node.pin(pin_id))
    }

    /// Check whether any link starts or ends at a pin
    pub fn is_pin_linked(&self, pin_id: PinId) -> bool {
        self.links.values().any(|link| link.involves_pin(pin_id))
    }

    /// Check whether two pins may be linked: different kinds, different nodes.
    ///
    /// Pin types are not compared here; see [`LinkPolicy`].
    pub fn can_create_link(&self, a: &Pin, b: &Pin) -> bool {
        a.id != b.id && a.kind != b.kind && a.node != b.node
    }

    /// Why the create gesture should refuse linking `a` to `b`, if it should
    pub fn link_rejection(&self, a: &Pin, b: &Pin) -> Option<LinkRejection> {
        if a.id == b.id {
            Some(LinkRejection::SamePin)
        } else if a.kind == b.kind {
            Some(LinkRejection::IncompatibleKind)
        } else if a.node == b.node {
            Some(LinkRejection::SameNode)
        } else if self.policy.enforce_pin_types && a.pin_type != b.pin_type {
            Some(LinkRejection::IncompatibleType)
        } else {
            None
        }
    }

    /// Link two pins in either order; the output pin becomes the start
    pub fn connect(&mut self, a: PinId, b: PinId) -> Result<LinkId, LinkRejection> {
        let pin_a = self.find_pin(a).ok_or(LinkRejection::PinNotFound(a))?;
        let pin_b = self.find_pin(b).ok_or(LinkRejection::PinNotFound(b))?;

        if let Some(rejection) = self.link_rejection(pin_a, pin_b) {
            return Err(rejection);
        }

        let (start, end) = if pin_a.kind == PinKind::Input {
            (pin_b, pin_a)
        } else {
            (pin_a, pin_b)
        };
        let (start_id, end_id) = (start.id, end.id);
        let color = start.pin_type.icon_color();

        let id = self.next_link_id();
        self.links
            .insert(id, Link::new(id, start_id, end_id).with_color(color));
        tracing::debug!("Created link {id}: {start_id} -> {end_id}");
        Ok(id)
    }

    /// Remove a link
    pub fn remove_link(&mut self, link_id: LinkId) -> Option<Link> {
        let link = self.links.shift_remove(&link_id)?;
        tracing::debug!("Removed link {link_id}");
        Some(link)
    }

    /// Get all nodes in render order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all nodes mutably in render order
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// Get the node at a position in render order
    pub fn node_at(&self, index: usize) -> Option<&Node> {
        self.nodes.get_index(index).map(|(_, node)| node)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get all links
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Get links attached to a pin
    pub fn links_for_pin(&self, pin_id: PinId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |l| l.involves_pin(pin_id))
    }

    /// Get the number of links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/// Reason a link cannot be created
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LinkRejection {
    /// Pin does not exist
    #[error("x Unknown Pin {0}")]
    PinNotFound(PinId),

    /// Both ends are the same pin
    #[error("x Same Pin")]
    SamePin,

    /// Both ends are inputs or both are outputs
    #[error("x Incompatible Pin Kind")]
    IncompatibleKind,

    /// Both ends sit on the same node
    #[error("x Cannot connect to self")]
    SameNode,

    /// Pin types differ and the policy enforces types
    #[error("x Incompatible Pin Type")]
    IncompatibleType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::PinType;

    fn two_node_graph() -> (Graph, PinId, PinId, PinId) {
        let mut graph = Graph::new();
        let print = graph.spawn_print_string_node();
        let print_out = print.outputs[0].id;
        let print_in = print.inputs[0].id;
        let branch = graph.spawn_branch_node();
        let branch_in = branch.inputs[0].id;
        (graph, print_out, print_in, branch_in)
    }

    #[test]
    fn test_add_node_sets_back_references() {
        let mut graph = Graph::new();
        let id = NodeId(graph.next_id());
        let mut node = Node::new(id, "Test", [255, 255, 255]);
        node.inputs.push(Pin::new(PinId(graph.next_id()), "In", PinType::Float));
        node.outputs.push(Pin::new(PinId(graph.next_id()), "Out", PinType::Float));
        graph.add_node(node);

        let node = graph.find_node(id).unwrap();
        assert!(node.inputs.iter().all(|p| p.node == id && p.kind == PinKind::Input));
        assert!(node.outputs.iter().all(|p| p.node == id && p.kind == PinKind::Output));
    }

    #[test]
    fn test_can_create_link() {
        let (graph, print_out, print_in, branch_in) = two_node_graph();
        let out = graph.find_pin(print_out).unwrap();
        let own_in = graph.find_pin(print_in).unwrap();
        let other_in = graph.find_pin(branch_in).unwrap();
        let branch_out = graph
            .find_pin(graph.node_at(1).unwrap().outputs[0].id)
            .unwrap();

        // Same node
        assert!(!graph.can_create_link(out, own_in));
        // Same kind
        assert!(!graph.can_create_link(own_in, other_in));
        assert!(!graph.can_create_link(out, branch_out));
        // Same pin
        assert!(!graph.can_create_link(out, out));
        // Valid either way round
        assert!(graph.can_create_link(out, other_in));
        assert!(graph.can_create_link(other_in, out));
    }

    #[test]
    fn test_can_create_link_ignores_types() {
        let mut graph = Graph::new();
        let message_out = graph.spawn_message_node().outputs[0].id;
        let branch_in = graph.spawn_branch_node().inputs[1].id;
        let a = graph.find_pin(message_out).unwrap();
        let b = graph.find_pin(branch_in).unwrap();
        assert_ne!(a.pin_type, b.pin_type);
        assert!(graph.can_create_link(a, b));
        assert_eq!(graph.link_rejection(a, b), None);
    }

    #[test]
    fn test_policy_enforces_types() {
        let mut graph = Graph::with_policy(LinkPolicy {
            enforce_pin_types: true,
        });
        let message_out = graph.spawn_message_node().outputs[0].id;
        let branch_in = graph.spawn_branch_node().inputs[1].id;
        assert_eq!(
            graph.connect(message_out, branch_in),
            Err(LinkRejection::IncompatibleType)
        );
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_links_only_join_live_output_to_input() {
        let (mut graph, print_out, _, branch_in) = two_node_graph();
        let do_n = graph.spawn_do_n_node();
        let do_n_id = do_n.id;
        let do_n_in = do_n.inputs[0].id;
        graph.connect(print_out, branch_in).unwrap();
        graph.connect(do_n_in, print_out).unwrap();
        assert!(graph.connect(branch_in, do_n_in).is_err());

        graph.remove_node(do_n_id);
        assert_eq!(graph.link_count(), 1);
        for link in graph.links() {
            let start = graph.find_pin(link.start_pin).unwrap();
            let end = graph.find_pin(link.end_pin).unwrap();
            assert_eq!(start.kind, PinKind::Output);
            assert_eq!(end.kind, PinKind::Input);
            assert_ne!(start.node, end.node);
        }
    }

    #[test]
    fn test_connect_orders_endpoints() {
        let (mut graph, print_out, _, branch_in) = two_node_graph();
        let id = graph.connect(branch_in, print_out).unwrap();
        let link = graph.find_link(id).unwrap();
        assert_eq!(link.start_pin, print_out);
        assert_eq!(link.end_pin, branch_in);
        assert_eq!(link.color, PinType::Flow.icon_color());
        assert!(graph.is_pin_linked(print_out));
        assert!(graph.is_pin_linked(branch_in));
    }

    #[test]
    fn test_connect_rejections() {
        let (mut graph, print_out, print_in, branch_in) = two_node_graph();
        assert_eq!(
            graph.connect(print_out, print_in),
            Err(LinkRejection::SameNode)
        );
        assert_eq!(
            graph.connect(print_in, branch_in),
            Err(LinkRejection::IncompatibleKind)
        );
        assert_eq!(
            graph.connect(print_out, PinId(999)),
            Err(LinkRejection::PinNotFound(PinId(999)))
        );
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_remove_link_removes_exactly_one() {
        let mut graph = Graph::new();
        let seq = graph.spawn_tree_sequence_node().outputs[0].id;
        let task = graph.spawn_tree_task_node().inputs[0].id;
        let task2 = graph.spawn_tree_task2_node().inputs[0].id;
        let first = graph.connect(seq, task).unwrap();
        let second = graph.connect(seq, task2).unwrap();

        assert!(graph.remove_link(first).is_some());
        assert_eq!(graph.link_count(), 1);
        assert!(graph.find_link(first).is_none());
        assert!(graph.find_link(second).is_some());

        // Removing again is a no-op
        assert!(graph.remove_link(first).is_none());
        assert_eq!(graph.link_count(), 1);
    }

    #[test]
    fn test_remove_node_drops_attached_links() {
        let mut graph = Graph::new();
        let seq_node = graph.spawn_tree_sequence_node().id;
        let seq = graph.find_node(seq_node).unwrap().outputs[0].id;
        let task = graph.spawn_tree_task_node().inputs[0].id;
        let transform = graph.spawn_houdini_transform_node().outputs[0].id;
        let group = graph.spawn_houdini_group_node().inputs[0].id;
        graph.connect(seq, task).unwrap();
        let kept = graph.connect(transform, group).unwrap();

        assert!(graph.remove_node(seq_node).is_some());
        assert_eq!(graph.link_count(), 1);
        assert!(graph.find_link(kept).is_some());
        assert!(!graph.is_pin_linked(task));
        assert!(graph.find_pin(seq).is_none());
    }

    #[test]
    fn test_lookups_return_none() {
        let graph = Graph::new();
        assert!(graph.find_node(NodeId(1)).is_none());
        assert!(graph.find_link(LinkId(1)).is_none());
        assert!(graph.find_pin(PinId(1)).is_none());
        assert!(!graph.is_pin_linked(PinId(1)));
    }

    #[test]
    fn test_rejection_labels() {
        assert_eq!(
            LinkRejection::IncompatibleKind.to_string(),
            "x Incompatible Pin Kind"
        );
        assert_eq!(
            LinkRejection::IncompatibleType.to_string(),
            "x Incompatible Pin Type"
        );
    }
}
