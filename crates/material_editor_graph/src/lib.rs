// SPDX-License-Identifier: MIT OR Apache-2.0
//! Blueprint-style node graph for the material editor.
//!
//! This crate provides:
//! - The graph model (nodes, pins, links) with identifier lookups
//! - A fixed catalog of demo node archetypes
//! - Touch highlight timers
//! - A canvas widget that lays out, renders and reports gestures
//!
//! ## Architecture
//!
//! The canvas widget never creates or deletes graph entries itself. Each
//! frame it reports what the user asked for (a new link, a new node, a
//! deletion, a context click) in an [`editor::EditorResponse`], and the
//! caller decides whether to apply it to the [`Graph`].

pub mod id;
pub mod pin;
pub mod node;
pub mod link;
pub mod graph;
pub mod factory;
pub mod touch;
pub mod style;
pub mod layout;
pub mod render;
pub mod editor;

pub use editor::{ContextMenuRequest, ContextTarget, EditorContext, EditorResponse, NodeEditor};
pub use factory::NodeArchetype;
pub use graph::{Graph, LinkPolicy, LinkRejection};
pub use id::{IdAllocator, LinkId, NodeId, PinId};
pub use link::Link;
pub use node::{Node, NodeState, NodeType};
pub use pin::{IconShape, Pin, PinKind, PinType};
pub use render::HeaderTexture;
pub use style::EditorStyle;
pub use touch::TouchTracker;
