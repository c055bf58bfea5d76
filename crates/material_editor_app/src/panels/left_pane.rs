// SPDX-License-Identifier: MIT OR Apache-2.0
//! Left pane: view buttons, node list with state snapshots, selection summary.

use egui::{Color32, Vec2};
use material_editor_graph::{Graph, NodeEditor, NodeId, TouchTracker};

const ICON_SIZE: Vec2 = Vec2::splat(18.0);
const TOUCH_BAR_SIZE: Vec2 = Vec2::new(4.0, 16.0);

/// Icons for the per-node state buttons
#[derive(Debug, Clone, Copy, Default)]
pub struct StateIcons {
    /// "Save state" icon
    pub save: Option<egui::TextureId>,
    /// "Restore state" icon
    pub restore: Option<egui::TextureId>,
}

/// Read-only inputs of the pane
pub struct LeftPaneView<'a> {
    /// Graph being edited
    pub graph: &'a Graph,
    /// Canvas state, for selection
    pub editor: &'a NodeEditor,
    /// Touch highlight timers
    pub touch: &'a TouchTracker,
    /// State button icons
    pub icons: StateIcons,
    /// How often the selection changed
    pub selection_changes: usize,
}

/// Something the user clicked in the pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneAction {
    /// Frame every node
    ZoomToContent,
    /// Animate flow on every link
    ShowFlow,
    /// Open or close the style editor
    ToggleStyleEditor,
    /// Select a node and frame the selection
    SelectNode {
        /// Node clicked
        node: NodeId,
        /// Keep the existing selection
        add: bool,
    },
    /// Remove a node from the selection
    DeselectNode(NodeId),
    /// Clear the selection
    ClearSelection,
    /// Snapshot a node's state
    SaveState(NodeId),
    /// Restore a node's snapshot
    RestoreState(NodeId),
}

/// Draw the pane and collect the clicked actions
pub fn show(ui: &mut egui::Ui, view: &LeftPaneView<'_>) -> Vec<PaneAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        if ui.button("Zoom to Content").clicked() {
            actions.push(PaneAction::ZoomToContent);
        }
        if ui.button("Show Flow").clicked() {
            actions.push(PaneAction::ShowFlow);
        }
        if ui.button("Edit Style").clicked() {
            actions.push(PaneAction::ToggleStyleEditor);
        }
    });

    ui.separator();
    ui.heading("Nodes");
    egui::ScrollArea::vertical()
        .id_salt("left_pane_nodes")
        .max_height(ui.available_height() * 0.6)
        .show(ui, |ui| {
            for node in view.graph.nodes() {
                node_row(ui, view, node.id, &node.name, &node.state, &node.saved_state, &mut actions);
            }
        });

    ui.separator();
    let selected_nodes = view.editor.selected_nodes();
    let selected_links = view.editor.selected_links();
    ui.horizontal(|ui| {
        ui.heading("Selection");
        if ui
            .add_enabled(
                !selected_nodes.is_empty() || !selected_links.is_empty(),
                egui::Button::new("Deselect"),
            )
            .clicked()
        {
            actions.push(PaneAction::ClearSelection);
        }
    });
    ui.label(format!("Changed {} time(s)", view.selection_changes));
    for node_id in &selected_nodes {
        let name = view
            .graph
            .find_node(*node_id)
            .map_or("?", |node| node.name.as_str());
        ui.label(format!("Node {node_id}: {name}"));
    }
    for link_id in &selected_links {
        ui.label(format!("Link {link_id}"));
    }

    actions
}

fn node_row(
    ui: &mut egui::Ui,
    view: &LeftPaneView<'_>,
    node_id: NodeId,
    name: &str,
    state: &str,
    saved_state: &str,
    actions: &mut Vec<PaneAction>,
) {
    ui.horizontal(|ui| {
        let (bar, _) = ui.allocate_exact_size(TOUCH_BAR_SIZE, egui::Sense::hover());
        if view.touch.remaining(node_id).is_some() {
            let alpha = ((1.0 - view.touch.progress(node_id)) * 255.0) as u8;
            ui.painter()
                .rect_filled(bar, 1.0, Color32::from_rgba_unmultiplied(255, 176, 50, alpha));
        }

        let selected = view.editor.is_node_selected(node_id);
        let response = ui.selectable_label(selected, format!("{name} ({node_id})"));
        if response.clicked() {
            let ctrl = ui.input(|i| i.modifiers.command);
            if ctrl && selected {
                actions.push(PaneAction::DeselectNode(node_id));
            } else {
                actions.push(PaneAction::SelectNode { node: node_id, add: ctrl });
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let can_restore = !saved_state.is_empty();
            if state_button(ui, view.icons.restore, "Restore", can_restore)
                .on_hover_text("Restore state")
                .clicked()
            {
                actions.push(PaneAction::RestoreState(node_id));
            }

            let can_save = state != saved_state;
            if state_button(ui, view.icons.save, "Save", can_save)
                .on_hover_text("Save state")
                .clicked()
            {
                actions.push(PaneAction::SaveState(node_id));
            }
        });
    });
}

fn state_button(
    ui: &mut egui::Ui,
    icon: Option<egui::TextureId>,
    fallback: &str,
    enabled: bool,
) -> egui::Response {
    match icon {
        Some(texture) => ui.add_enabled(enabled, egui::ImageButton::new((texture, ICON_SIZE))),
        None => ui.add_enabled(enabled, egui::Button::new(fallback).small()),
    }
}
