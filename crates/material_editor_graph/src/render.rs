// SPDX-License-Identifier: MIT OR Apache-2.0
//! Painting of nodes, pins and links.
//!
//! There is one drawing strategy per layout family: blueprint and simple
//! nodes share labeled pin rows, tree nodes are compact boxes with pin bars,
//! Houdini nodes have a distinct rounded body with pin tabs, and comments
//! are resizable background frames.

use crate::graph::Graph;
use crate::layout::{NodeLayout, PinAnchor};
use crate::node::{Node, NodeType};
use crate::pin::{IconShape, Pin, PinKind};
use crate::style::{self, EditorStyle};
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Rounding, Shape, Stroke, Vec2};

/// Alpha of pins that cannot accept the link being dragged
pub const DIMMED_PIN_ALPHA: u8 = 48;
/// Base font size at zoom 1
pub const FONT_SIZE: f32 = 13.0;
/// Samples per link curve
pub const LINK_SEGMENTS: usize = 32;

/// Pins the dragged link could not be accepted by are dimmed
pub fn pin_alpha(graph: &Graph, dragging_from: Option<&Pin>, pin: &Pin) -> u8 {
    match dragging_from {
        Some(from) if from.id != pin.id && graph.link_rejection(from, pin).is_some() => {
            DIMMED_PIN_ALPHA
        }
        _ => 255,
    }
}

/// Graph-to-screen transform of the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    /// Screen rectangle of the canvas
    pub canvas: Rect,
    /// Pan offset (graph space)
    pub pan: Vec2,
    /// Zoom level
    pub zoom: f32,
}

impl View {
    /// Convert graph position to screen position
    pub fn to_screen(&self, graph_pos: Pos2) -> Pos2 {
        let center = self.canvas.center();
        Pos2::new(
            (graph_pos.x + self.pan.x) * self.zoom + center.x,
            (graph_pos.y + self.pan.y) * self.zoom + center.y,
        )
    }

    /// Convert screen position to graph position
    pub fn to_graph(&self, screen_pos: Pos2) -> Pos2 {
        let center = self.canvas.center();
        Pos2::new(
            (screen_pos.x - center.x) / self.zoom - self.pan.x,
            (screen_pos.y - center.y) / self.zoom - self.pan.y,
        )
    }

    /// Convert a graph-space rectangle to screen space
    pub fn rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.to_screen(rect.min), self.to_screen(rect.max))
    }
}

/// Texture drawn behind blueprint headers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderTexture {
    /// Texture handle
    pub id: egui::TextureId,
    /// Texture size in pixels
    pub size: Vec2,
}

/// Shared state for painting one frame
pub struct RenderContext<'a> {
    /// Clipped canvas painter
    pub painter: &'a Painter,
    /// Current transform
    pub view: View,
    /// Canvas style
    pub style: &'a EditorStyle,
    /// Graph being drawn (for link state)
    pub graph: &'a Graph,
    /// Optional header background
    pub header_texture: Option<HeaderTexture>,
    /// Pin a link is currently being dragged from
    pub dragging_from: Option<&'a Pin>,
}

/// Per-node highlight state
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeHighlight {
    /// Node is selected
    pub selected: bool,
    /// Pointer is over the node
    pub hovered: bool,
    /// Touch highlight progress, 0 when idle
    pub touch: f32,
}

impl RenderContext<'_> {
    fn font(&self, scale: f32) -> FontId {
        FontId::proportional(FONT_SIZE * scale * self.view.zoom)
    }

    fn rounding(&self) -> f32 {
        self.style.node_rounding * self.view.zoom
    }

    /// Alpha for a pin given the link currently being dragged
    pub fn pin_alpha(&self, pin: &Pin) -> u8 {
        pin_alpha(self.graph, self.dragging_from, pin)
    }

    fn border(&self, rect: Rect, rounding: impl Into<Rounding>, highlight: NodeHighlight) {
        let (width, rgba) = if highlight.selected {
            (self.style.selected_node_border_width, self.style.selected_node_border)
        } else if highlight.hovered {
            (self.style.hovered_node_border_width, self.style.hovered_node_border)
        } else {
            (self.style.node_border_width, self.style.node_border)
        };
        self.painter
            .rect_stroke(rect, rounding, Stroke::new(width * self.view.zoom, style::color(rgba)));

        if highlight.touch > 0.0 {
            let alpha = ((1.0 - highlight.touch) * 255.0) as u8;
            let [r, g, b, _] = self.style.hovered_node_border;
            self.painter.rect_stroke(
                rect.expand(4.0 * self.view.zoom),
                self.rounding(),
                Stroke::new(2.0 * self.view.zoom, Color32::from_rgba_unmultiplied(r, g, b, alpha)),
            );
        }
    }
}

/// Draw a node with the strategy matching its category
pub fn draw_node(ctx: &RenderContext<'_>, node: &Node, layout: &NodeLayout, highlight: NodeHighlight) {
    match node.node_type {
        NodeType::Blueprint | NodeType::Simple => draw_blueprint_node(ctx, node, layout, highlight),
        NodeType::Tree => draw_tree_node(ctx, node, layout, highlight),
        NodeType::Houdini => draw_houdini_node(ctx, node, layout, highlight),
        NodeType::Comment => draw_comment_node(ctx, node, layout, highlight),
    }
}

/// Blueprint and simple nodes: optional textured header, labeled pin rows
pub fn draw_blueprint_node(
    ctx: &RenderContext<'_>,
    node: &Node,
    layout: &NodeLayout,
    highlight: NodeHighlight,
) {
    let rect = ctx.view.rect_to_screen(layout.rect);
    let rounding = ctx.rounding();
    ctx.painter.rect_filled(rect, rounding, style::color(ctx.style.node_bg));

    if let Some(header) = layout.header {
        let header = ctx.view.rect_to_screen(header);
        let header_rounding = Rounding {
            nw: rounding,
            ne: rounding,
            sw: 0.0,
            se: 0.0,
        };
        let [r, g, b] = node.color;
        match ctx.header_texture {
            Some(texture) if texture.size.x > 0.0 && texture.size.y > 0.0 => {
                let uv = Rect::from_min_max(
                    Pos2::ZERO,
                    Pos2::new(
                        layout.rect.width() / (4.0 * texture.size.x),
                        header.height() / ctx.view.zoom / (4.0 * texture.size.y),
                    ),
                );
                ctx.painter.image(
                    texture.id,
                    header,
                    uv,
                    Color32::from_rgba_unmultiplied(r, g, b, 160),
                );
            }
            _ => {
                ctx.painter.rect_filled(
                    header,
                    header_rounding,
                    Color32::from_rgba_unmultiplied(r, g, b, 96),
                );
            }
        }
        ctx.painter.line_segment(
            [header.left_bottom(), header.right_bottom()],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(255, 255, 255, 96)),
        );
        ctx.painter.text(
            Pos2::new(ctx.view.to_screen(layout.title.left_center()).x, header.center().y),
            Align2::LEFT_CENTER,
            &node.name,
            ctx.font(1.0),
            Color32::WHITE,
        );
    } else {
        ctx.painter.text(
            ctx.view.to_screen(layout.title.center()),
            Align2::CENTER_CENTER,
            &node.name,
            ctx.font(crate::layout::SIMPLE_TITLE_SCALE),
            Color32::from_gray(200),
        );
    }

    for pin in node.pins() {
        let Some(anchor) = layout.pin(pin.id) else {
            continue;
        };
        draw_pin_row(ctx, pin, anchor);
    }

    ctx.border(rect, rounding, highlight);
}

fn draw_pin_row(ctx: &RenderContext<'_>, pin: &Pin, anchor: &PinAnchor) {
    let alpha = ctx.pin_alpha(pin);
    let icon = ctx.view.rect_to_screen(anchor.icon);
    let [r, g, b] = pin.pin_type.icon_color();
    let color = Color32::from_rgba_unmultiplied(r, g, b, alpha);
    let inner = Color32::from_rgba_unmultiplied(32, 32, 32, alpha);
    draw_pin_icon(
        ctx.painter,
        icon,
        pin.pin_type.icon_shape(),
        ctx.graph.is_pin_linked(pin.id),
        color,
        inner,
    );

    if pin.name.is_empty() {
        return;
    }
    let text_color = Color32::from_rgba_unmultiplied(255, 255, 255, alpha);
    let gap = crate::layout::LABEL_GAP * ctx.view.zoom;
    match pin.kind {
        PinKind::Input => ctx.painter.text(
            Pos2::new(icon.right() + gap, icon.center().y),
            Align2::LEFT_CENTER,
            &pin.name,
            ctx.font(1.0),
            text_color,
        ),
        PinKind::Output => ctx.painter.text(
            Pos2::new(icon.left() - gap, icon.center().y),
            Align2::RIGHT_CENTER,
            &pin.name,
            ctx.font(1.0),
            text_color,
        ),
    };
}

/// Tree nodes: compact box with input bars on top and output bars below
pub fn draw_tree_node(
    ctx: &RenderContext<'_>,
    node: &Node,
    layout: &NodeLayout,
    highlight: NodeHighlight,
) {
    let rect = ctx.view.rect_to_screen(layout.rect);
    let rounding = 5.0 * ctx.view.zoom;
    ctx.painter
        .rect_filled(rect, rounding, Color32::from_rgba_unmultiplied(60, 60, 60, 220));

    for pin in node.pins() {
        let Some(anchor) = layout.pin(pin.id) else {
            continue;
        };
        let bar = ctx.view.rect_to_screen(anchor.icon);
        let alpha = ctx.pin_alpha(pin);
        let fill = if ctx.graph.is_pin_linked(pin.id) {
            Color32::from_rgba_unmultiplied(60, 180, 255, alpha)
        } else {
            Color32::from_rgba_unmultiplied(60, 180, 255, alpha / 2)
        };
        let bar_rounding = match anchor.kind {
            PinKind::Input => Rounding { nw: 4.0, ne: 4.0, sw: 0.0, se: 0.0 },
            PinKind::Output => Rounding { nw: 0.0, ne: 0.0, sw: 4.0, se: 4.0 },
        };
        ctx.painter.rect_filled(bar, bar_rounding, fill);
    }

    ctx.painter.text(
        ctx.view.to_screen(layout.title.center()),
        Align2::CENTER_CENTER,
        &node.name,
        ctx.font(1.0),
        Color32::WHITE,
    );
    ctx.border(rect, rounding, highlight);
}

/// Houdini nodes: rounded colored body with pin tabs on both edges
pub fn draw_houdini_node(
    ctx: &RenderContext<'_>,
    node: &Node,
    layout: &NodeLayout,
    highlight: NodeHighlight,
) {
    let body = ctx.view.rect_to_screen(layout.header.unwrap_or(layout.rect));
    let rounding = 10.0 * ctx.view.zoom;
    let [r, g, b] = node.color;
    ctx.painter
        .rect_filled(body, rounding, Color32::from_rgba_unmultiplied(r / 4, g / 4, b / 4, 230));

    for pin in node.pins() {
        let Some(anchor) = layout.pin(pin.id) else {
            continue;
        };
        let tab = ctx.view.rect_to_screen(anchor.icon);
        let alpha = ctx.pin_alpha(pin);
        let fill = if ctx.graph.is_pin_linked(pin.id) {
            Color32::from_rgba_unmultiplied(255, 255, 255, alpha)
        } else {
            Color32::from_rgba_unmultiplied(120, 120, 120, alpha)
        };
        ctx.painter.rect_filled(tab, 3.0 * ctx.view.zoom, fill);
    }

    ctx.painter.text(
        ctx.view.to_screen(layout.title.center()),
        Align2::CENTER_CENTER,
        &node.name,
        ctx.font(1.0),
        Color32::WHITE,
    );
    ctx.border(body, rounding, highlight);
}

/// Comments: translucent frame with a title strip and a resize grip
pub fn draw_comment_node(
    ctx: &RenderContext<'_>,
    node: &Node,
    layout: &NodeLayout,
    highlight: NodeHighlight,
) {
    let rect = ctx.view.rect_to_screen(layout.rect);
    let rounding = 6.0 * ctx.view.zoom;
    ctx.painter
        .rect_filled(rect, rounding, style::color(ctx.style.comment_bg));

    if let Some(header) = layout.header {
        let header = ctx.view.rect_to_screen(header);
        ctx.painter.text(
            Pos2::new(header.left() + 8.0 * ctx.view.zoom, header.center().y),
            Align2::LEFT_CENTER,
            &node.name,
            ctx.font(1.0),
            Color32::WHITE,
        );
        ctx.painter.line_segment(
            [header.left_bottom(), header.right_bottom()],
            Stroke::new(1.0, style::color(ctx.style.comment_border)),
        );
    }

    if let Some(grip) = layout.resize_handle() {
        let grip = ctx.view.rect_to_screen(grip);
        let stroke = Stroke::new(1.0, style::color(ctx.style.comment_border));
        let step = grip.width() / 3.0;
        for i in 1..=3 {
            let d = i as f32 * step;
            ctx.painter.line_segment(
                [
                    Pos2::new(grip.right() - d, grip.bottom()),
                    Pos2::new(grip.right(), grip.bottom() - d),
                ],
                stroke,
            );
        }
    }

    if highlight.selected || highlight.hovered || highlight.touch > 0.0 {
        ctx.border(rect, rounding, highlight);
    } else {
        ctx.painter
            .rect_stroke(rect, rounding, Stroke::new(1.0, style::color(ctx.style.comment_border)));
    }
}

/// Draw a pin icon into `rect` (screen space)
pub fn draw_pin_icon(
    painter: &Painter,
    rect: Rect,
    shape: IconShape,
    filled: bool,
    color: Color32,
    inner_color: Color32,
) {
    let center = rect.center();
    let size = rect.width().min(rect.height());
    let stroke = Stroke::new((size * 0.08).max(1.0), color);

    match shape {
        IconShape::Circle => {
            let radius = size * 0.3;
            if filled {
                painter.circle_filled(center, radius, color);
            } else {
                painter.circle_filled(center, radius, inner_color);
                painter.circle_stroke(center, radius, stroke);
            }
        }
        IconShape::Square => {
            let square = Rect::from_center_size(center, Vec2::splat(size * 0.5));
            if filled {
                painter.rect_filled(square, 0.0, color);
            } else {
                painter.rect_filled(square, 0.0, inner_color);
                painter.rect_stroke(square, 0.0, stroke);
            }
        }
        IconShape::Flow => {
            let points = flow_arrow(center, size);
            if filled {
                painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
            } else {
                painter.add(Shape::convex_polygon(points, inner_color, stroke));
            }
        }
    }
}

/// Outline of the execution arrow icon
fn flow_arrow(center: Pos2, size: f32) -> Vec<Pos2> {
    let half_w = size * 0.35;
    let half_h = size * 0.3;
    let left = center.x - half_w;
    let right = center.x + half_w;
    let shoulder = right - size * 0.25;
    vec![
        Pos2::new(left, center.y - half_h),
        Pos2::new(shoulder, center.y - half_h),
        Pos2::new(right, center.y),
        Pos2::new(shoulder, center.y + half_h),
        Pos2::new(left, center.y + half_h),
    ]
}

/// Screen-space geometry of a link curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkCurve {
    /// Start point
    pub from: Pos2,
    /// Tangent at the start
    pub from_dir: Vec2,
    /// End point
    pub to: Pos2,
    /// Tangent at the end (pointing away from the curve)
    pub to_dir: Vec2,
}

impl LinkCurve {
    /// Sample the curve
    pub fn points(&self, strength: f32) -> Vec<Pos2> {
        let distance = self.from.distance(self.to);
        let pull = strength.min(distance * 0.5).max(10.0);
        bezier_points(
            self.from,
            self.from + self.from_dir * pull,
            self.to + self.to_dir * pull,
            self.to,
            LINK_SEGMENTS,
        )
    }
}

/// Draw a link curve
pub fn draw_link(painter: &Painter, points: &[Pos2], color: Color32, thickness: f32) {
    if points.len() < 2 {
        return;
    }
    painter.add(Shape::line(points.to_vec(), Stroke::new(thickness, color)));
}

/// Draw flow markers travelling along a link
pub fn draw_flow(painter: &Painter, points: &[Pos2], offset: f32, spacing: f32, radius: f32, color: Color32) {
    for marker in points_along(points, offset, spacing) {
        painter.circle_filled(marker, radius, color);
    }
}

/// Evenly spaced points along a polyline, starting `offset` in
pub fn points_along(points: &[Pos2], offset: f32, spacing: f32) -> Vec<Pos2> {
    let mut markers = Vec::new();
    if points.len() < 2 || spacing <= 0.0 {
        return markers;
    }

    let mut next = offset.rem_euclid(spacing);
    let mut travelled = 0.0;
    for pair in points.windows(2) {
        let segment = pair[0].distance(pair[1]);
        if segment <= f32::EPSILON {
            continue;
        }
        while next <= travelled + segment {
            let t = (next - travelled) / segment;
            markers.push(pair[0].lerp(pair[1], t));
            next += spacing;
        }
        travelled += segment;
    }
    markers
}

/// Distance from a point to a polyline
pub fn distance_to_polyline(points: &[Pos2], pos: Pos2) -> f32 {
    points
        .windows(2)
        .map(|pair| distance_to_segment(pair[0], pair[1], pos))
        .fold(f32::INFINITY, f32::min)
}

fn distance_to_segment(a: Pos2, b: Pos2, p: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return a.distance(p);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t).distance(p)
}

/// Generate points along a cubic bezier curve
pub fn bezier_points(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, segments: usize) -> Vec<Pos2> {
    let mut points = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * p0.x + 3.0 * mt2 * t * p1.x + 3.0 * mt * t2 * p2.x + t3 * p3.x;
        let y = mt3 * p0.y + 3.0 * mt2 * t * p1.y + 3.0 * mt * t2 * p2.y + t3 * p3.y;

        points.push(Pos2::new(x, y));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_roundtrip() {
        let view = View {
            canvas: Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(800.0, 600.0)),
            pan: Vec2::new(-20.0, 35.0),
            zoom: 1.5,
        };
        let graph_pos = Pos2::new(12.0, -7.0);
        let back = view.to_graph(view.to_screen(graph_pos));
        assert!((back.x - graph_pos.x).abs() < 1e-4);
        assert!((back.y - graph_pos.y).abs() < 1e-4);
    }

    #[test]
    fn test_bezier_endpoints() {
        let p0 = Pos2::new(0.0, 0.0);
        let p3 = Pos2::new(100.0, 50.0);
        let points = bezier_points(p0, Pos2::new(50.0, 0.0), Pos2::new(50.0, 50.0), p3, 16);
        assert_eq!(points.len(), 17);
        assert_eq!(points[0], p0);
        assert!((points[16].x - p3.x).abs() < 1e-4);
        assert!((points[16].y - p3.y).abs() < 1e-4);
    }

    #[test]
    fn test_points_along_straight_line() {
        let line = [Pos2::new(0.0, 0.0), Pos2::new(100.0, 0.0)];
        let markers = points_along(&line, 5.0, 30.0);
        assert_eq!(markers.len(), 4);
        for (marker, expected) in markers.iter().zip([5.0, 35.0, 65.0, 95.0]) {
            assert!((marker.x - expected).abs() < 1e-3);
        }

        // Offsets wrap around the spacing
        let wrapped = points_along(&line, 65.0, 30.0);
        assert!((wrapped[0].x - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_pin_alpha_follows_link_policy() {
        use crate::graph::LinkPolicy;

        let mut graph = Graph::with_policy(LinkPolicy {
            enforce_pin_types: true,
        });
        let message_out = graph.spawn_message_node().outputs[0].clone();
        let print = graph.spawn_print_string_node();
        let (flow_in, string_in) = (print.inputs[0].clone(), print.inputs[1].clone());

        assert_eq!(pin_alpha(&graph, None, &flow_in), 255);
        assert_eq!(pin_alpha(&graph, Some(&message_out), &message_out), 255);
        assert_eq!(pin_alpha(&graph, Some(&message_out), &string_in), 255);
        assert_eq!(pin_alpha(&graph, Some(&message_out), &flow_in), DIMMED_PIN_ALPHA);

        graph.policy.enforce_pin_types = false;
        assert_eq!(pin_alpha(&graph, Some(&message_out), &flow_in), 255);
    }

    #[test]
    fn test_distance_to_polyline() {
        let line = [Pos2::new(0.0, 0.0), Pos2::new(100.0, 0.0), Pos2::new(100.0, 100.0)];
        assert_eq!(distance_to_polyline(&line, Pos2::new(50.0, 10.0)), 10.0);
        assert_eq!(distance_to_polyline(&line, Pos2::new(110.0, 50.0)), 10.0);
        assert_eq!(distance_to_polyline(&line, Pos2::new(-3.0, -4.0)), 5.0);
    }
}
