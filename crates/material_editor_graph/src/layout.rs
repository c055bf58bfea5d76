// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node geometry in graph space.
//!
//! Every node category gets its own arrangement of header, body and pins.
//! Layouts are recomputed each frame from the node and the current style;
//! text widths come from a caller-supplied measuring function so the same
//! code serves the painter and the tests.

use crate::id::{NodeId, PinId};
use crate::node::{Node, NodeType};
use crate::pin::{Pin, PinKind};
use crate::style::EditorStyle;
use egui::{Pos2, Rect, Vec2};

/// Blueprint header height
pub const HEADER_HEIGHT: f32 = 28.0;
/// Vertical gap between pin rows
pub const PIN_ROW_SPACING: f32 = 4.0;
/// Gap between a pin icon and its label
pub const LABEL_GAP: f32 = 4.0;
/// Gap between the input and output columns
pub const COLUMN_GAP: f32 = 24.0;
/// Nominal text height
pub const TEXT_HEIGHT: f32 = 14.0;
/// Narrowest pin-carrying node
pub const MIN_NODE_WIDTH: f32 = 80.0;
/// Thickness of tree node pin bars
pub const TREE_BAR_HEIGHT: f32 = 8.0;
/// Narrowest tree node
pub const TREE_MIN_WIDTH: f32 = 128.0;
/// Houdini pin tab size
pub const HOUDINI_TAB_SIZE: Vec2 = Vec2::new(24.0, 8.0);
/// Horizontal gap between Houdini pin tabs
pub const HOUDINI_TAB_GAP: f32 = 12.0;
/// Narrowest Houdini node
pub const HOUDINI_MIN_WIDTH: f32 = 120.0;
/// Comment title strip height
pub const COMMENT_HEADER_HEIGHT: f32 = 24.0;
/// Comment resize grip size
pub const RESIZE_HANDLE_SIZE: f32 = 14.0;
/// Smallest comment frame
pub const COMMENT_MIN_SIZE: Vec2 = Vec2::new(120.0, 60.0);
/// Title scale used by simple nodes
pub const SIMPLE_TITLE_SCALE: f32 = 1.6;

/// Text width measuring function
pub type Measure<'a> = &'a dyn Fn(&str) -> f32;

/// Rough text width for contexts without fonts
pub fn approx_text_width(text: &str) -> f32 {
    text.chars().count() as f32 * 7.0
}

/// Geometry of one pin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinAnchor {
    /// Pin this anchor belongs to
    pub pin: PinId,
    /// Input or output
    pub kind: PinKind,
    /// Hit region (icon plus label)
    pub rect: Rect,
    /// Icon or bar region
    pub icon: Rect,
    /// Where links attach
    pub anchor: Pos2,
    /// Unit tangent links leave along
    pub direction: Vec2,
}

/// Geometry of one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    /// Node this layout belongs to
    pub node: NodeId,
    /// Category the layout was built for
    pub node_type: NodeType,
    /// Full node bounds
    pub rect: Rect,
    /// Colored header (blueprint) or title strip (comment)
    pub header: Option<Rect>,
    /// Where the name is drawn
    pub title: Rect,
    /// Pin geometry, inputs first
    pub pins: Vec<PinAnchor>,
}

impl NodeLayout {
    /// Compute the layout of a node
    pub fn compute(node: &Node, style: &EditorStyle, measure: Measure<'_>) -> Self {
        match node.node_type {
            NodeType::Blueprint | NodeType::Simple => blueprint_layout(node, style, measure),
            NodeType::Tree => tree_layout(node, style, measure),
            NodeType::Houdini => houdini_layout(node, style, measure),
            NodeType::Comment => comment_layout(node),
        }
    }

    /// Find a pin's geometry
    pub fn pin(&self, pin_id: PinId) -> Option<&PinAnchor> {
        self.pins.iter().find(|p| p.pin == pin_id)
    }

    /// Pin under a graph-space position, with some slack around icons
    pub fn pin_at(&self, pos: Pos2, slack: f32) -> Option<&PinAnchor> {
        self.pins
            .iter()
            .find(|p| p.rect.expand(slack).contains(pos))
    }

    /// Comment resize grip
    pub fn resize_handle(&self) -> Option<Rect> {
        (self.node_type == NodeType::Comment).then(|| {
            Rect::from_min_max(
                self.rect.max - Vec2::splat(RESIZE_HANDLE_SIZE),
                self.rect.max,
            )
        })
    }

    /// Whether a graph-space position grabs the node for dragging.
    ///
    /// Comments can only be grabbed by their title strip so that nodes placed
    /// inside them stay clickable.
    pub fn grabs(&self, pos: Pos2) -> bool {
        match self.node_type {
            NodeType::Comment => self.header.is_some_and(|h| h.contains(pos)),
            _ => self.rect.contains(pos),
        }
    }
}

fn column_width(pins: &[Pin], icon: f32, measure: Measure<'_>) -> f32 {
    pins.iter()
        .map(|pin| {
            if pin.name.is_empty() {
                icon
            } else {
                icon + LABEL_GAP + measure(&pin.name)
            }
        })
        .fold(0.0, f32::max)
}

fn blueprint_layout(node: &Node, style: &EditorStyle, measure: Measure<'_>) -> NodeLayout {
    let padding = style.node_padding;
    let icon = style.pin_icon_size;
    let row_height = icon + PIN_ROW_SPACING;
    let origin = Pos2::new(node.position[0], node.position[1]);
    let simple = node.node_type == NodeType::Simple;

    let inputs_width = column_width(&node.inputs, icon, measure);
    let outputs_width = column_width(&node.outputs, icon, measure);
    let rows = node.inputs.len().max(node.outputs.len()) as f32;
    let rows_height = rows * row_height;

    let (width, height, header, title) = if simple {
        let title_width = measure(&node.name) * SIMPLE_TITLE_SCALE;
        let title_height = TEXT_HEIGHT * SIMPLE_TITLE_SCALE;
        let width = (inputs_width + title_width + outputs_width + 2.0 * COLUMN_GAP + 2.0 * padding)
            .max(MIN_NODE_WIDTH);
        let height = rows_height.max(title_height) + 2.0 * padding;
        let title = Rect::from_center_size(
            Pos2::new(
                origin.x + padding + inputs_width + COLUMN_GAP + title_width / 2.0,
                origin.y + height / 2.0,
            ),
            Vec2::new(title_width, title_height),
        );
        (width, height, None, title)
    } else {
        let title_width = measure(&node.name);
        let body_width = inputs_width + COLUMN_GAP + outputs_width;
        let width = (title_width.max(body_width) + 2.0 * padding).max(MIN_NODE_WIDTH);
        let height = HEADER_HEIGHT + rows_height + 2.0 * padding;
        let header = Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT));
        let title = Rect::from_min_size(
            Pos2::new(origin.x + padding, origin.y),
            Vec2::new(title_width, HEADER_HEIGHT),
        );
        (width, height, Some(header), title)
    };

    let rect = Rect::from_min_size(origin, Vec2::new(width, height));
    let body_top = header.map_or(origin.y, |h| h.bottom()) + padding;

    let mut pins = Vec::with_capacity(node.inputs.len() + node.outputs.len());
    for (i, pin) in node.inputs.iter().enumerate() {
        let row_top = body_top + i as f32 * row_height;
        let icon_rect = Rect::from_min_size(Pos2::new(rect.left() + padding, row_top), Vec2::splat(icon));
        let label = if pin.name.is_empty() { 0.0 } else { LABEL_GAP + measure(&pin.name) };
        pins.push(PinAnchor {
            pin: pin.id,
            kind: PinKind::Input,
            rect: Rect::from_min_size(icon_rect.min, Vec2::new(icon + label, icon)),
            icon: icon_rect,
            anchor: icon_rect.center(),
            direction: Vec2::new(-1.0, 0.0),
        });
    }
    for (i, pin) in node.outputs.iter().enumerate() {
        let row_top = body_top + i as f32 * row_height;
        let icon_rect = Rect::from_min_size(
            Pos2::new(rect.right() - padding - icon, row_top),
            Vec2::splat(icon),
        );
        let label = if pin.name.is_empty() { 0.0 } else { LABEL_GAP + measure(&pin.name) };
        pins.push(PinAnchor {
            pin: pin.id,
            kind: PinKind::Output,
            rect: Rect::from_min_max(
                Pos2::new(icon_rect.left() - label, icon_rect.top()),
                icon_rect.max,
            ),
            icon: icon_rect,
            anchor: icon_rect.center(),
            direction: Vec2::new(1.0, 0.0),
        });
    }

    NodeLayout {
        node: node.id,
        node_type: node.node_type,
        rect,
        header,
        title,
        pins,
    }
}

/// Split `[left, left + width]` into `count` equal segments
fn segments(left: f32, width: f32, count: usize) -> impl Iterator<Item = (f32, f32)> {
    let step = width / count.max(1) as f32;
    (0..count).map(move |i| (left + i as f32 * step, step))
}

fn tree_layout(node: &Node, style: &EditorStyle, measure: Measure<'_>) -> NodeLayout {
    let padding = style.node_padding;
    let origin = Pos2::new(node.position[0], node.position[1]);
    let width = (measure(&node.name) + 4.0 * padding).max(TREE_MIN_WIDTH);
    let height = 2.0 * TREE_BAR_HEIGHT + 2.0 * padding + TEXT_HEIGHT + 2.0 * padding;
    let rect = Rect::from_min_size(origin, Vec2::new(width, height));

    let mut pins = Vec::new();
    let inner_left = rect.left() + padding;
    let inner_width = width - 2.0 * padding;
    for ((left, step), pin) in segments(inner_left, inner_width, node.inputs.len()).zip(&node.inputs) {
        let bar = Rect::from_min_size(Pos2::new(left, rect.top()), Vec2::new(step, TREE_BAR_HEIGHT));
        pins.push(PinAnchor {
            pin: pin.id,
            kind: PinKind::Input,
            rect: bar,
            icon: bar,
            anchor: Pos2::new(bar.center().x, bar.top()),
            direction: Vec2::new(0.0, -1.0),
        });
    }
    for ((left, step), pin) in segments(inner_left, inner_width, node.outputs.len()).zip(&node.outputs) {
        let bar = Rect::from_min_size(
            Pos2::new(left, rect.bottom() - TREE_BAR_HEIGHT),
            Vec2::new(step, TREE_BAR_HEIGHT),
        );
        pins.push(PinAnchor {
            pin: pin.id,
            kind: PinKind::Output,
            rect: bar,
            icon: bar,
            anchor: Pos2::new(bar.center().x, bar.bottom()),
            direction: Vec2::new(0.0, 1.0),
        });
    }

    let title = Rect::from_center_size(rect.center(), Vec2::new(measure(&node.name), TEXT_HEIGHT));
    NodeLayout {
        node: node.id,
        node_type: node.node_type,
        rect,
        header: None,
        title,
        pins,
    }
}

fn houdini_layout(node: &Node, style: &EditorStyle, measure: Measure<'_>) -> NodeLayout {
    let padding = style.node_padding;
    let origin = Pos2::new(node.position[0], node.position[1]);
    let tabs = node.inputs.len().max(node.outputs.len()) as f32;
    let tabs_width = tabs * HOUDINI_TAB_SIZE.x + (tabs - 1.0).max(0.0) * HOUDINI_TAB_GAP;
    let width = (measure(&node.name) + 4.0 * padding)
        .max(tabs_width + 2.0 * padding)
        .max(HOUDINI_MIN_WIDTH);
    let body_height = TEXT_HEIGHT + 4.0 * padding;
    let height = body_height + 2.0 * HOUDINI_TAB_SIZE.y;
    let rect = Rect::from_min_size(origin, Vec2::new(width, height));
    let body = Rect::from_min_size(
        Pos2::new(rect.left(), rect.top() + HOUDINI_TAB_SIZE.y),
        Vec2::new(width, body_height),
    );

    let tab_row = |count: usize| {
        let n = count as f32;
        let row_width = n * HOUDINI_TAB_SIZE.x + (n - 1.0).max(0.0) * HOUDINI_TAB_GAP;
        let left = rect.center().x - row_width / 2.0;
        (0..count).map(move |i| left + i as f32 * (HOUDINI_TAB_SIZE.x + HOUDINI_TAB_GAP))
    };

    let mut pins = Vec::new();
    for (left, pin) in tab_row(node.inputs.len()).zip(&node.inputs) {
        let tab = Rect::from_min_size(Pos2::new(left, rect.top()), HOUDINI_TAB_SIZE);
        pins.push(PinAnchor {
            pin: pin.id,
            kind: PinKind::Input,
            rect: tab,
            icon: tab,
            anchor: Pos2::new(tab.center().x, tab.top()),
            direction: Vec2::new(0.0, -1.0),
        });
    }
    for (left, pin) in tab_row(node.outputs.len()).zip(&node.outputs) {
        let tab = Rect::from_min_size(Pos2::new(left, body.bottom()), HOUDINI_TAB_SIZE);
        pins.push(PinAnchor {
            pin: pin.id,
            kind: PinKind::Output,
            rect: tab,
            icon: tab,
            anchor: Pos2::new(tab.center().x, tab.bottom()),
            direction: Vec2::new(0.0, 1.0),
        });
    }

    let title = Rect::from_center_size(body.center(), Vec2::new(measure(&node.name), TEXT_HEIGHT));
    NodeLayout {
        node: node.id,
        node_type: node.node_type,
        rect,
        header: Some(body),
        title,
        pins,
    }
}

fn comment_layout(node: &Node) -> NodeLayout {
    let origin = Pos2::new(node.position[0], node.position[1]);
    let size = Vec2::new(node.size[0], node.size[1]).max(COMMENT_MIN_SIZE);
    let rect = Rect::from_min_size(origin, size);
    let header = Rect::from_min_size(origin, Vec2::new(size.x, COMMENT_HEADER_HEIGHT));
    NodeLayout {
        node: node.id,
        node_type: node.node_type,
        rect,
        header: Some(header),
        title: header.shrink2(Vec2::new(8.0, 0.0)),
        pins: Vec::new(),
    }
}
