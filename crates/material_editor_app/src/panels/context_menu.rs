// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node, pin, link and background popup menus.

use egui::Pos2;
use material_editor_graph::{ContextTarget, Graph, LinkId, NodeArchetype, NodeId, PinId};

/// An open popup menu
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    /// What the menu is about
    pub target: ContextTarget,
    /// Screen position of the popup
    pub screen_pos: Pos2,
    /// Filter for the "Create New Node" list
    pub search: String,
    /// Set on the frame the menu opened, so the opening click does not close it
    just_opened: bool,
}

impl ContextMenu {
    /// Open a menu at a screen position
    pub fn new(target: ContextTarget, screen_pos: Pos2) -> Self {
        Self {
            target,
            screen_pos,
            search: String::new(),
            just_opened: true,
        }
    }
}

/// Something the user picked from a menu
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuAction {
    /// Delete a node
    DeleteNode(NodeId),
    /// Delete a link
    DeleteLink(LinkId),
    /// Delete every link attached to a pin
    DeletePinLinks(PinId),
    /// Spawn an archetype at a screen position
    CreateNode(NodeArchetype, Pos2),
    /// The menu closed without an action
    Dismissed,
}

/// Archetypes whose label contains `search` (case-insensitive)
pub fn filter_archetypes(search: &str) -> Vec<NodeArchetype> {
    let needle = search.trim().to_lowercase();
    NodeArchetype::ALL
        .iter()
        .copied()
        .filter(|archetype| needle.is_empty() || archetype.label().to_lowercase().contains(&needle))
        .collect()
}

/// Draw the open menu, if any; returns the chosen action
pub fn show(ctx: &egui::Context, menu: &mut Option<ContextMenu>, graph: &Graph) -> Option<MenuAction> {
    let state = menu.as_mut()?;
    let mut action = None;

    let area = egui::Area::new(egui::Id::new("material_editor_context_menu"))
        .order(egui::Order::Foreground)
        .fixed_pos(state.screen_pos)
        .show(ctx, |ui| {
            egui::Frame::menu(ui.style()).show(ui, |ui| {
                ui.set_max_width(260.0);
                action = match state.target {
                    ContextTarget::Node(node_id) => node_menu(ui, graph, node_id),
                    ContextTarget::Pin(pin_id) => pin_menu(ui, graph, pin_id),
                    ContextTarget::Link(link_id) => link_menu(ui, graph, link_id),
                    ContextTarget::Background => create_node_menu(ui, state),
                };
            });
        });

    let dismissed = ctx.input(|i| i.key_pressed(egui::Key::Escape))
        || (!state.just_opened && area.response.clicked_elsewhere());
    state.just_opened = false;

    if action.is_some() {
        *menu = None;
        action
    } else if dismissed {
        *menu = None;
        Some(MenuAction::Dismissed)
    } else {
        None
    }
}

fn node_menu(ui: &mut egui::Ui, graph: &Graph, node_id: NodeId) -> Option<MenuAction> {
    ui.label("Node Context Menu");
    ui.separator();
    match graph.find_node(node_id) {
        Some(node) => {
            ui.label(format!("ID: {}", node.id));
            ui.label(format!("Type: {}", node.node_type.name()));
            ui.label(format!("Inputs: {}", node.inputs.len()));
            ui.label(format!("Outputs: {}", node.outputs.len()));
        }
        None => {
            ui.label(format!("Unknown node: {node_id}"));
        }
    }
    ui.separator();
    ui.button("Delete")
        .clicked()
        .then_some(MenuAction::DeleteNode(node_id))
}

fn pin_menu(ui: &mut egui::Ui, graph: &Graph, pin_id: PinId) -> Option<MenuAction> {
    ui.label("Pin Context Menu");
    ui.separator();
    match graph.find_pin(pin_id) {
        Some(pin) => {
            ui.label(format!("ID: {}", pin.id));
            ui.label(format!("Node: {}", pin.node));
            ui.label(format!("Type: {} ({:?})", pin.pin_type.name(), pin.kind));
        }
        None => {
            ui.label(format!("Unknown pin: {pin_id}"));
        }
    }

    if !graph.is_pin_linked(pin_id) {
        return None;
    }
    ui.separator();
    ui.button("Delete Links")
        .clicked()
        .then_some(MenuAction::DeletePinLinks(pin_id))
}

fn link_menu(ui: &mut egui::Ui, graph: &Graph, link_id: LinkId) -> Option<MenuAction> {
    ui.label("Link Context Menu");
    ui.separator();
    match graph.find_link(link_id) {
        Some(link) => {
            ui.label(format!("ID: {}", link.id));
            ui.label(format!("From: {}", link.start_pin));
            ui.label(format!("To: {}", link.end_pin));
        }
        None => {
            ui.label(format!("Unknown link: {link_id}"));
        }
    }
    ui.separator();
    ui.button("Delete")
        .clicked()
        .then_some(MenuAction::DeleteLink(link_id))
}

fn create_node_menu(ui: &mut egui::Ui, state: &mut ContextMenu) -> Option<MenuAction> {
    ui.label("Create New Node");
    ui.separator();
    let response = ui.text_edit_singleline(&mut state.search);
    if state.just_opened {
        response.request_focus();
    }
    ui.separator();

    let mut chosen = None;
    egui::ScrollArea::vertical()
        .max_height(320.0)
        .show(ui, |ui| {
            for archetype in filter_archetypes(&state.search) {
                if ui.button(archetype.label()).clicked() {
                    chosen = Some(MenuAction::CreateNode(archetype, state.screen_pos));
                }
            }
        });
    chosen
}
