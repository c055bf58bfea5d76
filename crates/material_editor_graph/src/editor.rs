// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive node-editor canvas.
//!
//! Features:
//! - Pan/zoom navigation and zoom to content
//! - Node and link selection, box selection
//! - Node dragging (comments carry the nodes they enclose)
//! - Comment resizing
//! - Link drag-to-create and drop-to-create-node requests
//! - Context click reporting
//! - Link flow animation
//!
//! The widget moves and resizes nodes itself. Creation and deletion are only
//! reported through [`EditorResponse`] and applied by the caller.

use crate::graph::Graph;
use crate::id::{LinkId, NodeId, PinId};
use crate::layout::{Measure, NodeLayout, PinAnchor, COMMENT_MIN_SIZE};
use crate::node::NodeType;
use crate::pin::PinKind;
use crate::render::{
    self, HeaderTexture, LinkCurve, NodeHighlight, RenderContext, View, FONT_SIZE,
};
use crate::style::{self, EditorStyle};
use crate::touch::TouchTracker;
use egui::{Color32, FontId, Pos2, Rect, Stroke, Vec2};
use indexmap::IndexSet;
use std::collections::HashMap;

const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 4.0;
const PIN_HIT_SLACK: f32 = 4.0;
const LINK_HIT_DISTANCE: f32 = 6.0;
const CONTENT_PADDING: f32 = 50.0;
const FLOW_MARKER_RADIUS: f32 = 3.0;

/// What a secondary click landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextTarget {
    /// A node body
    Node(NodeId),
    /// A pin
    Pin(PinId),
    /// A link curve
    Link(LinkId),
    /// Empty canvas
    Background,
}

/// A context menu request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenuRequest {
    /// Clicked element
    pub target: ContextTarget,
    /// Screen position of the click
    pub screen_pos: Pos2,
}

/// Per-frame inputs supplied by the application
pub struct EditorContext<'a> {
    /// Canvas style
    pub style: &'a EditorStyle,
    /// Blueprint header background, if loaded
    pub header_texture: Option<HeaderTexture>,
    /// Touch highlight timers
    pub touch: &'a TouchTracker,
}

/// Everything the user asked for during one frame
#[derive(Debug, Clone)]
pub struct EditorResponse {
    /// Pin the link drag started on and the pin under the pointer
    pub new_link: Option<(PinId, PinId)>,
    /// The pointer was released over `new_link`'s end pin this frame
    pub link_accepted: bool,
    /// A link drag was released over empty canvas
    pub new_node: Option<PinId>,
    /// Screen position of that release
    pub new_node_pos: Option<Pos2>,
    /// Nodes to delete
    pub deleted_nodes: Vec<NodeId>,
    /// Links to delete
    pub deleted_links: Vec<LinkId>,
    /// Secondary click
    pub context: Option<ContextMenuRequest>,
    /// Nodes whose drag or resize ended this frame
    pub moved_nodes: Vec<NodeId>,
    /// Pin under the pointer
    pub hovered_pin: Option<PinId>,
    /// Canvas rectangle in screen space
    pub canvas_rect: Rect,
}

impl EditorResponse {
    fn empty(canvas_rect: Rect) -> Self {
        Self {
            new_link: None,
            link_accepted: false,
            new_node: None,
            new_node_pos: None,
            deleted_nodes: Vec::new(),
            deleted_links: Vec::new(),
            context: None,
            moved_nodes: Vec::new(),
            hovered_pin: None,
            canvas_rect,
        }
    }
}

/// Canvas interaction mode
#[derive(Debug, Clone, Default)]
pub enum InteractionMode {
    /// Default mode - selecting and clicking
    #[default]
    Normal,
    /// Panning the view
    Panning,
    /// Dragging nodes
    DraggingNodes {
        /// Nodes moving with the pointer
        nodes: Vec<NodeId>,
    },
    /// Dragging a comment's resize grip
    ResizingComment {
        /// Comment being resized
        node: NodeId,
    },
    /// Dragging a new link out of a pin
    CreatingLink {
        /// Pin the drag started on
        from: PinId,
        /// Current pointer position (screen space)
        current: Pos2,
    },
    /// Box selection (screen space)
    BoxSelect {
        /// Start corner
        start: Pos2,
        /// Current corner
        current: Pos2,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Navigate {
    Content,
    Selection,
}

#[derive(Debug, Clone, Copy)]
struct LinkFlow {
    link: LinkId,
    /// Set on the first frame the flow is drawn
    started: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Hover {
    node: Option<NodeId>,
    pin: Option<PinId>,
    link: Option<LinkId>,
}

/// Node editor canvas state
pub struct NodeEditor {
    /// Current pan offset (graph space)
    pub pan: Vec2,
    /// Current zoom level
    pub zoom: f32,
    /// Show grid
    pub show_grid: bool,
    selected_nodes: IndexSet<NodeId>,
    selected_links: IndexSet<LinkId>,
    mode: InteractionMode,
    flows: Vec<LinkFlow>,
    pending_node_deletes: Vec<NodeId>,
    pending_link_deletes: Vec<LinkId>,
    navigate_pending: Option<Navigate>,
    canvas: Rect,
    hover: Hover,
}

impl NodeEditor {
    /// Create a new editor state
    pub fn new() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            show_grid: true,
            selected_nodes: IndexSet::new(),
            selected_links: IndexSet::new(),
            mode: InteractionMode::Normal,
            flows: Vec::new(),
            pending_node_deletes: Vec::new(),
            pending_link_deletes: Vec::new(),
            navigate_pending: None,
            canvas: Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)),
            hover: Hover::default(),
        }
    }

    /// Current interaction mode
    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    fn view(&self) -> View {
        View {
            canvas: self.canvas,
            pan: self.pan,
            zoom: self.zoom,
        }
    }

    /// Convert screen position to graph position
    pub fn screen_to_graph(&self, screen_pos: Pos2) -> Pos2 {
        self.view().to_graph(screen_pos)
    }

    /// Convert graph position to screen position
    pub fn graph_to_screen(&self, graph_pos: Pos2) -> Pos2 {
        self.view().to_screen(graph_pos)
    }

    /// Frame every node on the next [`NodeEditor::show`]
    pub fn navigate_to_content(&mut self) {
        self.navigate_pending = Some(Navigate::Content);
    }

    /// Frame the selected nodes on the next [`NodeEditor::show`]
    pub fn navigate_to_selection(&mut self) {
        self.navigate_pending = Some(Navigate::Selection);
    }

    /// Start (or restart) the flow animation on a link
    pub fn flow(&mut self, link_id: LinkId) {
        self.flows.retain(|flow| flow.link != link_id);
        self.flows.push(LinkFlow {
            link: link_id,
            started: None,
        });
    }

    /// Number of running flow animations
    pub fn active_flows(&self) -> usize {
        self.flows.len()
    }

    /// Select a node (optionally add to selection)
    pub fn select_node(&mut self, node_id: NodeId, add_to_selection: bool) {
        if !add_to_selection {
            self.clear_selection();
        }
        self.selected_nodes.insert(node_id);
    }

    /// Select a link (optionally add to selection)
    pub fn select_link(&mut self, link_id: LinkId, add_to_selection: bool) {
        if !add_to_selection {
            self.clear_selection();
        }
        self.selected_links.insert(link_id);
    }

    /// Toggle node selection
    pub fn toggle_node_selection(&mut self, node_id: NodeId) {
        if !self.selected_nodes.shift_remove(&node_id) {
            self.selected_nodes.insert(node_id);
        }
    }

    /// Clear selection
    pub fn clear_selection(&mut self) {
        self.selected_nodes.clear();
        self.selected_links.clear();
    }

    /// Whether a node is selected
    pub fn is_node_selected(&self, node_id: NodeId) -> bool {
        self.selected_nodes.contains(&node_id)
    }

    /// Selected nodes in selection order
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.selected_nodes.iter().copied().collect()
    }

    /// Selected links in selection order
    pub fn selected_links(&self) -> Vec<LinkId> {
        self.selected_links.iter().copied().collect()
    }

    /// Queue a node deletion, reported by the next [`NodeEditor::show`]
    pub fn delete_node(&mut self, node_id: NodeId) {
        self.pending_node_deletes.push(node_id);
    }

    /// Queue a link deletion, reported by the next [`NodeEditor::show`]
    pub fn delete_link(&mut self, link_id: LinkId) {
        self.pending_link_deletes.push(link_id);
    }

    /// Show the "cannot link" tooltip beside the pointer
    pub fn set_rejection_label(&self, ctx: &egui::Context, text: &str) {
        show_label(ctx, text, Color32::from_rgba_unmultiplied(45, 32, 32, 180));
    }

    /// Show the "will create" tooltip beside the pointer
    pub fn set_accept_label(&self, ctx: &egui::Context, text: &str) {
        show_label(ctx, text, Color32::from_rgba_unmultiplied(32, 45, 32, 180));
    }

    /// Zoom by `factor` keeping the graph point under `screen_pos` fixed
    pub fn zoom_at(&mut self, screen_pos: Pos2, factor: f32) {
        let anchor = self.screen_to_graph(screen_pos);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let center = self.canvas.center();
        self.pan = (screen_pos - center) / self.zoom - anchor.to_vec2();
    }

    /// Render the canvas and collect this frame's requests
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        graph: &mut Graph,
        ctx: &EditorContext<'_>,
    ) -> EditorResponse {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        self.canvas = rect;
        self.prune_selection(graph);

        let font = FontId::proportional(FONT_SIZE);
        let measure = |text: &str| {
            ui.fonts(|fonts| {
                fonts
                    .layout_no_wrap(text.to_owned(), font.clone(), Color32::WHITE)
                    .size()
                    .x
            })
        };

        let layouts = compute_layouts(graph, ctx.style, &measure);
        if let Some(target) = self.navigate_pending.take() {
            self.fit_to(&layouts, target);
        }

        let mut out = EditorResponse::empty(rect);
        self.handle_input(ui, &response, graph, &layouts, ctx.style, &mut out);

        // Positions may have changed while handling input
        let layouts = compute_layouts(graph, ctx.style, &measure);
        let anchors = pin_anchors(&layouts);
        let now = ui.input(|i| i.time);

        painter.rect_filled(rect, 0.0, style::color(ctx.style.background));
        if self.show_grid {
            self.draw_grid(&painter, ctx.style);
        }

        let graph: &Graph = graph;
        let dragging_from = match &self.mode {
            InteractionMode::CreatingLink { from, .. } => graph.find_pin(*from),
            _ => None,
        };
        let render_ctx = RenderContext {
            painter: &painter,
            view: self.view(),
            style: ctx.style,
            graph,
            header_texture: ctx.header_texture,
            dragging_from,
        };

        let (comments, nodes): (Vec<&NodeLayout>, Vec<&NodeLayout>) = layouts
            .iter()
            .partition(|layout| layout.node_type == NodeType::Comment);

        for layout in comments {
            self.draw_node(&render_ctx, layout, ctx.touch);
        }
        self.draw_links(&render_ctx, &anchors);
        self.draw_flows(&render_ctx, &anchors, now);
        self.draw_link_drag(&render_ctx, &anchors);
        for layout in nodes {
            self.draw_node(&render_ctx, layout, ctx.touch);
        }
        if let InteractionMode::BoxSelect { start, current } = self.mode {
            draw_box_selection(&painter, ctx.style, Rect::from_two_pos(start, current));
        }
        self.draw_status_bar(&painter, graph);

        if !self.flows.is_empty() || !matches!(self.mode, InteractionMode::Normal) {
            ui.ctx().request_repaint();
        }

        out
    }

    fn prune_selection(&mut self, graph: &Graph) {
        self.selected_nodes
            .retain(|id| graph.find_node(*id).is_some());
        self.selected_links
            .retain(|id| graph.find_link(*id).is_some());
    }

    fn fit_to(&mut self, layouts: &[NodeLayout], target: Navigate) {
        let Some(bounds) = layouts
            .iter()
            .filter(|layout| {
                target == Navigate::Content || self.selected_nodes.contains(&layout.node)
            })
            .map(|layout| layout.rect)
            .reduce(|a, b| a.union(b))
        else {
            return;
        };
        let (pan, zoom) = fit_view(bounds, self.canvas);
        self.pan = pan;
        self.zoom = zoom;
    }

    fn handle_input(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        graph: &mut Graph,
        layouts: &[NodeLayout],
        style: &EditorStyle,
        out: &mut EditorResponse,
    ) {
        let pointer = ui
            .input(|i| i.pointer.hover_pos())
            .filter(|pos| self.canvas.contains(*pos));
        self.hover = pointer
            .map(|pos| self.hit_test(pos, graph, layouts, style))
            .unwrap_or_default();
        out.hovered_pin = self.hover.pin;

        // Zoom with scroll wheel
        if let Some(pos) = pointer {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                self.zoom_at(pos, 1.0 + scroll * 0.001);
            }
        }

        let mode = std::mem::take(&mut self.mode);
        self.mode = self.next_mode(mode, ui, response, graph, layouts, style, pointer, out);

        // Delete key
        let delete_pressed = !ui.ctx().wants_keyboard_input()
            && ui.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace));
        if delete_pressed && pointer.is_some() {
            self.pending_node_deletes
                .extend(self.selected_nodes.iter().copied());
            self.pending_link_deletes
                .extend(self.selected_links.iter().copied());
        }

        let (nodes, links) = self.take_deletions(graph);
        out.deleted_nodes = nodes;
        out.deleted_links = links;
    }

    fn next_mode(
        &mut self,
        mode: InteractionMode,
        ui: &egui::Ui,
        response: &egui::Response,
        graph: &mut Graph,
        layouts: &[NodeLayout],
        style: &EditorStyle,
        pointer: Option<Pos2>,
        out: &mut EditorResponse,
    ) -> InteractionMode {
        let shift_held = ui.input(|i| i.modifiers.shift);
        let graph_delta = response.drag_delta() / self.zoom;

        match mode {
            InteractionMode::Normal => {
                if response.drag_started_by(egui::PointerButton::Middle)
                    || response.drag_started_by(egui::PointerButton::Secondary)
                {
                    return InteractionMode::Panning;
                }

                if response.drag_started_by(egui::PointerButton::Primary) {
                    let origin = ui
                        .input(|i| i.pointer.press_origin())
                        .or(pointer)
                        .unwrap_or(self.canvas.center());
                    return self.begin_primary_drag(origin, graph, layouts, style, shift_held);
                }

                if response.clicked() {
                    if let Some(node_id) = self.hover.node {
                        if shift_held {
                            self.toggle_node_selection(node_id);
                        } else {
                            self.select_node(node_id, false);
                        }
                    } else if let Some(link_id) = self.hover.link {
                        self.select_link(link_id, shift_held);
                    } else if !shift_held {
                        self.clear_selection();
                    }
                }

                if response.secondary_clicked() {
                    let target = if let Some(pin_id) = self.hover.pin {
                        ContextTarget::Pin(pin_id)
                    } else if let Some(node_id) = self.hover.node {
                        ContextTarget::Node(node_id)
                    } else if let Some(link_id) = self.hover.link {
                        ContextTarget::Link(link_id)
                    } else {
                        ContextTarget::Background
                    };
                    out.context = Some(ContextMenuRequest {
                        target,
                        screen_pos: pointer.unwrap_or(self.canvas.center()),
                    });
                }

                InteractionMode::Normal
            }

            InteractionMode::Panning => {
                if response.dragged() {
                    self.pan += graph_delta;
                    InteractionMode::Panning
                } else {
                    InteractionMode::Normal
                }
            }

            InteractionMode::DraggingNodes { nodes } => {
                if response.dragged() {
                    for node_id in &nodes {
                        if let Some(node) = graph.find_node_mut(*node_id) {
                            node.position[0] += graph_delta.x;
                            node.position[1] += graph_delta.y;
                        }
                    }
                    InteractionMode::DraggingNodes { nodes }
                } else {
                    out.moved_nodes = nodes;
                    InteractionMode::Normal
                }
            }

            InteractionMode::ResizingComment { node } => {
                if response.dragged() {
                    if let Some(comment) = graph.find_node_mut(node) {
                        comment.size[0] = (comment.size[0] + graph_delta.x).max(COMMENT_MIN_SIZE.x);
                        comment.size[1] = (comment.size[1] + graph_delta.y).max(COMMENT_MIN_SIZE.y);
                    }
                    InteractionMode::ResizingComment { node }
                } else {
                    out.moved_nodes = vec![node];
                    InteractionMode::Normal
                }
            }

            InteractionMode::CreatingLink { from, current } => {
                let current = pointer.unwrap_or(current);
                let released = response.drag_stopped() || !response.dragged();

                if let Some(target) = self.hover.pin.filter(|pin| *pin != from) {
                    out.new_link = Some((from, target));
                    out.link_accepted = released;
                } else if released && self.hover.node.is_none() && pointer.is_some() {
                    out.new_node = Some(from);
                    out.new_node_pos = Some(current);
                }

                if released {
                    InteractionMode::Normal
                } else {
                    InteractionMode::CreatingLink { from, current }
                }
            }

            InteractionMode::BoxSelect { start, current } => {
                let current = pointer.unwrap_or(current);
                if response.dragged() {
                    return InteractionMode::BoxSelect { start, current };
                }

                let selection = Rect::from_two_pos(start, current);
                if !shift_held {
                    self.clear_selection();
                }
                let view = self.view();
                for layout in layouts {
                    let screen = view.rect_to_screen(layout.rect);
                    let hit = match layout.node_type {
                        NodeType::Comment => selection.contains_rect(screen),
                        _ => selection.intersects(screen),
                    };
                    if hit {
                        self.selected_nodes.insert(layout.node);
                    }
                }
                InteractionMode::Normal
            }
        }
    }

    fn begin_primary_drag(
        &mut self,
        origin: Pos2,
        graph: &Graph,
        layouts: &[NodeLayout],
        style: &EditorStyle,
        shift_held: bool,
    ) -> InteractionMode {
        let graph_pos = self.screen_to_graph(origin);

        let grip = layouts.iter().rev().find(|layout| {
            layout
                .resize_handle()
                .is_some_and(|handle| handle.contains(graph_pos))
        });
        if let Some(layout) = grip {
            return InteractionMode::ResizingComment { node: layout.node };
        }

        let hit = self.hit_test(origin, graph, layouts, style);
        if let Some(pin) = hit.pin {
            return InteractionMode::CreatingLink {
                from: pin,
                current: origin,
            };
        }
        if let Some(node_id) = hit.node {
            if !self.selected_nodes.contains(&node_id) {
                self.select_node(node_id, shift_held);
            }
            return InteractionMode::DraggingNodes {
                nodes: self.drag_set(layouts),
            };
        }

        InteractionMode::BoxSelect {
            start: origin,
            current: origin,
        }
    }

    /// Selected nodes plus everything enclosed by a selected comment
    fn drag_set(&self, layouts: &[NodeLayout]) -> Vec<NodeId> {
        let mut nodes = self.selected_nodes.clone();
        let groups: Vec<Rect> = layouts
            .iter()
            .filter(|layout| {
                layout.node_type == NodeType::Comment && self.selected_nodes.contains(&layout.node)
            })
            .map(|layout| layout.rect)
            .collect();
        for group in groups {
            for layout in layouts {
                if layout.node_type != NodeType::Comment && group.contains_rect(layout.rect) {
                    nodes.insert(layout.node);
                }
            }
        }
        nodes.into_iter().collect()
    }

    fn hit_test(
        &self,
        screen_pos: Pos2,
        graph: &Graph,
        layouts: &[NodeLayout],
        style: &EditorStyle,
    ) -> Hover {
        let graph_pos = self.screen_to_graph(screen_pos);
        let slack = PIN_HIT_SLACK / self.zoom;

        // Topmost first: regular nodes are drawn above comments
        let ordered = layouts
            .iter()
            .filter(|layout| layout.node_type != NodeType::Comment)
            .rev()
            .chain(
                layouts
                    .iter()
                    .filter(|layout| layout.node_type == NodeType::Comment)
                    .rev(),
            );
        for layout in ordered {
            if let Some(anchor) = layout.pin_at(graph_pos, slack) {
                return Hover {
                    node: Some(layout.node),
                    pin: Some(anchor.pin),
                    link: None,
                };
            }
            if layout.grabs(graph_pos) {
                return Hover {
                    node: Some(layout.node),
                    ..Hover::default()
                };
            }
        }

        let anchors = pin_anchors(layouts);
        let view = self.view();
        let link = graph
            .links()
            .filter_map(|link| {
                let start = anchors.get(&link.start_pin)?;
                let end = anchors.get(&link.end_pin)?;
                let points = link_points(&view, start, end, style);
                Some((link.id, render::distance_to_polyline(&points, screen_pos)))
            })
            .filter(|(_, distance)| *distance <= LINK_HIT_DISTANCE)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);

        Hover {
            link,
            ..Hover::default()
        }
    }

    /// Drain queued deletions that still refer to existing entries
    fn take_deletions(&mut self, graph: &Graph) -> (Vec<NodeId>, Vec<LinkId>) {
        let mut nodes: IndexSet<NodeId> = IndexSet::new();
        for node_id in self.pending_node_deletes.drain(..) {
            if graph.find_node(node_id).is_some() {
                nodes.insert(node_id);
            }
        }
        let mut links: IndexSet<LinkId> = IndexSet::new();
        for link_id in self.pending_link_deletes.drain(..) {
            if graph.find_link(link_id).is_some() {
                links.insert(link_id);
            }
        }

        for node_id in &nodes {
            self.selected_nodes.shift_remove(node_id);
        }
        for link_id in &links {
            self.selected_links.shift_remove(link_id);
        }
        self.flows.retain(|flow| !links.contains(&flow.link));

        (nodes.into_iter().collect(), links.into_iter().collect())
    }

    fn draw_grid(&self, painter: &egui::Painter, style: &EditorStyle) {
        let rect = self.canvas;
        let spacing = style.grid_spacing * self.zoom;
        if spacing < 4.0 {
            return;
        }
        let stroke = Stroke::new(1.0, style::color(style.grid));
        let origin = self.graph_to_screen(Pos2::ZERO);

        let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(spacing);
        while x < rect.right() {
            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
            x += spacing;
        }

        let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(spacing);
        while y < rect.bottom() {
            painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
            y += spacing;
        }
    }

    fn draw_node(&self, ctx: &RenderContext<'_>, layout: &NodeLayout, touch: &TouchTracker) {
        let Some(node) = ctx.graph.find_node(layout.node) else {
            return;
        };
        let screen = ctx.view.rect_to_screen(layout.rect);
        if !screen.intersects(self.canvas) {
            return;
        }
        let highlight = NodeHighlight {
            selected: self.selected_nodes.contains(&node.id),
            hovered: self.hover.node == Some(node.id),
            touch: touch.progress(node.id),
        };
        render::draw_node(ctx, node, layout, highlight);
    }

    fn draw_links(&self, ctx: &RenderContext<'_>, anchors: &HashMap<PinId, PinAnchor>) {
        let thickness = ctx.style.link_thickness * ctx.view.zoom;
        for link in ctx.graph.links() {
            let (Some(start), Some(end)) = (anchors.get(&link.start_pin), anchors.get(&link.end_pin))
            else {
                continue;
            };
            let points = link_points(&ctx.view, start, end, ctx.style);

            if self.selected_links.contains(&link.id) {
                render::draw_link(
                    ctx.painter,
                    &points,
                    style::color(ctx.style.selected_link),
                    thickness + 4.0 * ctx.view.zoom,
                );
            } else if self.hover.link == Some(link.id) {
                let [r, g, b, _] = ctx.style.selected_link;
                render::draw_link(
                    ctx.painter,
                    &points,
                    Color32::from_rgba_unmultiplied(r, g, b, 96),
                    thickness + 4.0 * ctx.view.zoom,
                );
            }
            render::draw_link(ctx.painter, &points, style::rgb(link.color), thickness);
        }
    }

    fn draw_flows(
        &mut self,
        ctx: &RenderContext<'_>,
        anchors: &HashMap<PinId, PinAnchor>,
        now: f64,
    ) {
        let duration = ctx.style.flow_duration;
        self.flows.retain_mut(|flow| {
            let started = *flow.started.get_or_insert(now);
            let elapsed = (now - started) as f32;
            if elapsed > duration {
                return false;
            }
            let Some(link) = ctx.graph.find_link(flow.link) else {
                return false;
            };
            let (Some(start), Some(end)) = (anchors.get(&link.start_pin), anchors.get(&link.end_pin))
            else {
                return true;
            };

            let points = link_points(&ctx.view, start, end, ctx.style);
            let fade = if duration > 0.0 { 1.0 - elapsed / duration } else { 0.0 };
            let [r, g, b, a] = ctx.style.flow;
            render::draw_flow(
                ctx.painter,
                &points,
                elapsed * ctx.style.flow_speed * ctx.view.zoom,
                ctx.style.flow_marker_distance * ctx.view.zoom,
                FLOW_MARKER_RADIUS * ctx.view.zoom,
                Color32::from_rgba_unmultiplied(r, g, b, (a as f32 * fade) as u8),
            );
            true
        });
    }

    fn draw_link_drag(&self, ctx: &RenderContext<'_>, anchors: &HashMap<PinId, PinAnchor>) {
        let InteractionMode::CreatingLink { from, current } = self.mode else {
            return;
        };
        let (Some(anchor), Some(pin)) = (anchors.get(&from), ctx.graph.find_pin(from)) else {
            return;
        };

        let pin_pos = ctx.view.to_screen(anchor.anchor);
        let curve = match anchor.kind {
            PinKind::Output => LinkCurve {
                from: pin_pos,
                from_dir: anchor.direction,
                to: current,
                to_dir: -anchor.direction,
            },
            PinKind::Input => LinkCurve {
                from: current,
                from_dir: -anchor.direction,
                to: pin_pos,
                to_dir: anchor.direction,
            },
        };
        let points = curve.points(ctx.style.link_strength * ctx.view.zoom);
        render::draw_link(
            ctx.painter,
            &points,
            style::rgb(pin.pin_type.icon_color()),
            ctx.style.link_thickness * ctx.view.zoom,
        );
    }

    fn draw_status_bar(&self, painter: &egui::Painter, graph: &Graph) {
        let rect = self.canvas;
        painter.text(
            Pos2::new(rect.left() + 5.0, rect.bottom() - 11.0),
            egui::Align2::LEFT_CENTER,
            format!(
                "Nodes: {} | Links: {} | Zoom: {:.0}% | Selected: {}",
                graph.node_count(),
                graph.link_count(),
                self.zoom * 100.0,
                self.selected_nodes.len(),
            ),
            FontId::proportional(11.0),
            Color32::from_gray(150),
        );
    }
}

impl Default for NodeEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Lay out every node, comments first, and store measured sizes on the nodes
fn compute_layouts(graph: &mut Graph, style: &EditorStyle, measure: Measure<'_>) -> Vec<NodeLayout> {
    let mut comments = Vec::new();
    let mut nodes = Vec::new();
    for node in graph.nodes_mut() {
        let layout = NodeLayout::compute(node, style, measure);
        if node.node_type == NodeType::Comment {
            comments.push(layout);
        } else {
            node.size = [layout.rect.width(), layout.rect.height()];
            nodes.push(layout);
        }
    }
    comments.extend(nodes);
    comments
}

fn pin_anchors(layouts: &[NodeLayout]) -> HashMap<PinId, PinAnchor> {
    layouts
        .iter()
        .flat_map(|layout| layout.pins.iter().map(|anchor| (anchor.pin, *anchor)))
        .collect()
}

fn link_points(view: &View, start: &PinAnchor, end: &PinAnchor, style: &EditorStyle) -> Vec<Pos2> {
    LinkCurve {
        from: view.to_screen(start.anchor),
        from_dir: start.direction,
        to: view.to_screen(end.anchor),
        to_dir: end.direction,
    }
    .points(style.link_strength * view.zoom)
}

/// Pan and zoom that frame `bounds` (graph space) inside `canvas`
fn fit_view(bounds: Rect, canvas: Rect) -> (Vec2, f32) {
    let padded = bounds.expand(CONTENT_PADDING);
    let zoom = (canvas.width() / padded.width())
        .min(canvas.height() / padded.height())
        .clamp(MIN_ZOOM, 1.0);
    (-padded.center().to_vec2(), zoom)
}

fn draw_box_selection(painter: &egui::Painter, style: &EditorStyle, rect: Rect) {
    let fill = style::color(style.selection_rect);
    let [r, g, b, _] = style.selection_rect;
    painter.rect_filled(rect, 0.0, fill);
    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::from_rgb(r, g, b)));
}

fn show_label(ctx: &egui::Context, text: &str, background: Color32) {
    let Some(pointer) = ctx.pointer_hover_pos() else {
        return;
    };
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Tooltip,
        egui::Id::new("node_editor_label"),
    ));
    let galley = painter.layout_no_wrap(text.to_owned(), FontId::proportional(FONT_SIZE), Color32::WHITE);
    let pos = pointer + Vec2::new(0.0, -(galley.size().y + 20.0));
    let frame = Rect::from_min_size(pos, galley.size()).expand(4.0);
    painter.rect_filled(frame, 4.0, background);
    painter.galley(pos, galley, Color32::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::NodeArchetype;

    const SCREEN: Vec2 = Vec2::new(800.0, 600.0);

    /// Headless canvas driven by synthetic pointer events
    struct Harness {
        ctx: egui::Context,
        editor: NodeEditor,
        graph: Graph,
        style: EditorStyle,
        touch: TouchTracker,
        time: f64,
    }

    impl Harness {
        fn new(graph: Graph) -> Self {
            Self {
                ctx: egui::Context::default(),
                editor: NodeEditor::new(),
                graph,
                style: EditorStyle::default(),
                touch: TouchTracker::default(),
                time: 0.0,
            }
        }

        fn frame(&mut self, events: Vec<egui::Event>) -> EditorResponse {
            self.time += 1.0 / 60.0;
            let input = egui::RawInput {
                screen_rect: Some(Rect::from_min_size(Pos2::ZERO, SCREEN)),
                time: Some(self.time),
                events,
                ..Default::default()
            };
            let mut result = None;
            let Self {
                ctx,
                editor,
                graph,
                style,
                touch,
                ..
            } = self;
            let _ = ctx.run(input, |ctx| {
                egui::CentralPanel::default()
                    .frame(egui::Frame::none())
                    .show(ctx, |ui| {
                        let editor_ctx = EditorContext {
                            style: &*style,
                            header_texture: None,
                            touch: &*touch,
                        };
                        result = Some(editor.show(ui, graph, &editor_ctx));
                    });
            });
            result.unwrap()
        }

        fn move_to(&mut self, pos: Pos2) -> EditorResponse {
            self.frame(vec![egui::Event::PointerMoved(pos)])
        }

        fn button(&mut self, pos: Pos2, pressed: bool) -> EditorResponse {
            self.frame(vec![
                egui::Event::PointerMoved(pos),
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    modifiers: egui::Modifiers::NONE,
                },
            ])
        }

        /// Press on `from` and drag far enough to start a link
        fn start_link_drag(&mut self, from: Pos2) {
            self.move_to(from);
            self.button(from, true);
            self.move_to(from + Vec2::new(10.0, 0.0));
        }
    }

    /// Screen center of the first input pin icon of a blueprint node
    fn first_input_center(node_pos: Pos2, style: &EditorStyle) -> Pos2 {
        let canvas_center = Rect::from_min_size(Pos2::ZERO, SCREEN).center();
        let half_icon = style.pin_icon_size / 2.0;
        node_pos
            + Vec2::new(
                style.node_padding + half_icon,
                crate::layout::HEADER_HEIGHT + style.node_padding + half_icon,
            )
            + canvas_center.to_vec2()
    }

    fn two_blueprint_nodes() -> (Graph, PinId, Pos2, PinId, Pos2) {
        let style = EditorStyle::default();
        let mut graph = Graph::new();
        let print = graph.spawn(NodeArchetype::PrintString);
        print.position = [-300.0, -100.0];
        let from = print.inputs[0].id;
        let branch = graph.spawn(NodeArchetype::Branch);
        branch.position = [100.0, -100.0];
        let target = branch.inputs[0].id;
        (
            graph,
            from,
            first_input_center(Pos2::new(-300.0, -100.0), &style),
            target,
            first_input_center(Pos2::new(100.0, -100.0), &style),
        )
    }

    #[test]
    fn test_link_drag_released_over_pin() {
        let (graph, from, from_pos, target, target_pos) = two_blueprint_nodes();
        let mut harness = Harness::new(graph);

        let hovered = harness.move_to(from_pos);
        assert_eq!(hovered.hovered_pin, Some(from));

        harness.start_link_drag(from_pos);
        harness.move_to(target_pos);
        assert!(matches!(
            harness.editor.mode(),
            InteractionMode::CreatingLink { from: start, .. } if *start == from
        ));

        let dragging = harness.move_to(target_pos + Vec2::new(1.0, 0.0));
        assert_eq!(dragging.new_link, Some((from, target)));
        assert!(!dragging.link_accepted);

        let released = harness.button(target_pos, false);
        assert_eq!(released.new_link, Some((from, target)));
        assert!(released.link_accepted);
        assert!(released.new_node.is_none());
        assert!(matches!(harness.editor.mode(), InteractionMode::Normal));

        // The widget only reports; the graph is untouched
        assert_eq!(harness.graph.link_count(), 0);
    }

    #[test]
    fn test_link_drag_released_over_empty_canvas() {
        let (graph, from, from_pos, _, _) = two_blueprint_nodes();
        let mut harness = Harness::new(graph);
        let empty = Pos2::new(400.0, 550.0);

        harness.start_link_drag(from_pos);
        let dragging = harness.move_to(empty);
        assert!(dragging.new_node.is_none());
        assert!(dragging.new_link.is_none());

        let released = harness.button(empty, false);
        assert_eq!(released.new_node, Some(from));
        assert_eq!(released.new_node_pos, Some(empty));
        assert!(released.new_link.is_none());
        assert!(!released.link_accepted);
        assert!(matches!(harness.editor.mode(), InteractionMode::Normal));
    }

    #[test]
    fn test_coordinate_transform() {
        let mut editor = NodeEditor::new();
        editor.canvas = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0));
        editor.pan = Vec2::new(100.0, -50.0);
        editor.zoom = 2.0;

        let screen = editor.graph_to_screen(Pos2::new(10.0, 20.0));
        assert_eq!(screen, Pos2::new(620.0, 240.0));
        assert_eq!(editor.screen_to_graph(screen), Pos2::new(10.0, 20.0));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut editor = NodeEditor::new();
        let pointer = Pos2::new(250.0, 120.0);
        let before = editor.screen_to_graph(pointer);
        editor.zoom_at(pointer, 1.5);
        let after = editor.screen_to_graph(pointer);
        assert!((before.x - after.x).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-3);

        editor.zoom_at(pointer, 1000.0);
        assert_eq!(editor.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_fit_view_centers_content() {
        let canvas = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0));
        let bounds = Rect::from_min_max(Pos2::new(-400.0, -100.0), Pos2::new(1400.0, 700.0));
        let (pan, zoom) = fit_view(bounds, canvas);
        assert!(zoom < 1.0 && zoom >= MIN_ZOOM);

        let view = View { canvas, pan, zoom };
        let center = view.to_screen(bounds.center());
        assert!((center.x - canvas.center().x).abs() < 1e-3);
        assert!((center.y - canvas.center().y).abs() < 1e-3);
        assert!(canvas.contains_rect(view.rect_to_screen(bounds)));
    }

    #[test]
    fn test_queued_deletions() {
        let mut graph = Graph::new();
        let a = graph.spawn(NodeArchetype::Branch).id;
        let b = graph.spawn(NodeArchetype::DoN).id;
        let out = graph.find_node(a).unwrap().outputs[0].id;
        let input = graph.find_node(b).unwrap().inputs[0].id;
        let link = graph.connect(out, input).unwrap();

        let mut editor = NodeEditor::new();
        editor.select_node(a, false);
        editor.select_link(link, true);
        editor.delete_node(a);
        editor.delete_node(a);
        editor.delete_node(NodeId(999));
        editor.delete_link(link);

        let (nodes, links) = editor.take_deletions(&graph);
        assert_eq!(nodes, vec![a]);
        assert_eq!(links, vec![link]);
        assert!(editor.selected_nodes().is_empty());
        assert!(editor.selected_links().is_empty());

        // Reported once
        let (nodes, links) = editor.take_deletions(&graph);
        assert!(nodes.is_empty() && links.is_empty());
    }

    #[test]
    fn test_selection() {
        let mut editor = NodeEditor::new();
        editor.select_node(NodeId(1), false);
        editor.select_node(NodeId(2), true);
        assert_eq!(editor.selected_nodes(), vec![NodeId(1), NodeId(2)]);

        editor.toggle_node_selection(NodeId(1));
        assert_eq!(editor.selected_nodes(), vec![NodeId(2)]);

        editor.select_link(LinkId(7), false);
        assert!(editor.selected_nodes().is_empty());
        assert_eq!(editor.selected_links(), vec![LinkId(7)]);

        editor.clear_selection();
        assert!(editor.selected_links().is_empty());
    }

    #[test]
    fn test_flow_restarts() {
        let mut editor = NodeEditor::new();
        editor.flow(LinkId(3));
        editor.flow(LinkId(3));
        editor.flow(LinkId(4));
        assert_eq!(editor.active_flows(), 2);
    }

    #[test]
    fn test_comment_drags_enclosed_nodes() {
        let mut graph = Graph::new();
        let style = EditorStyle::default();
        let comment = graph.spawn(NodeArchetype::Comment);
        comment.position = [0.0, 0.0];
        comment.size = [600.0, 400.0];
        let comment = comment.id;
        let inside = graph.spawn(NodeArchetype::Less);
        inside.position = [100.0, 100.0];
        let inside = inside.id;
        let outside = graph.spawn(NodeArchetype::Weird);
        outside.position = [900.0, 100.0];
        let outside = outside.id;

        let layouts = compute_layouts(&mut graph, &style, &crate::layout::approx_text_width);
        let mut editor = NodeEditor::new();
        editor.select_node(comment, false);
        let dragged = editor.drag_set(&layouts);
        assert!(dragged.contains(&comment));
        assert!(dragged.contains(&inside));
        assert!(!dragged.contains(&outside));
    }

    #[test]
    fn test_layouts_store_sizes() {
        let mut graph = Graph::new();
        let id = graph.spawn(NodeArchetype::PrintString).id;
        let layouts = compute_layouts(
            &mut graph,
            &EditorStyle::default(),
            &crate::layout::approx_text_width,
        );
        let node = graph.find_node(id).unwrap();
        assert_eq!(node.size, [layouts[0].rect.width(), layouts[0].rect.height()]);
    }
}
