// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material editor application: lifecycle and per-frame logic.

use crate::config::AppConfig;
use crate::host::TextureHost;
use crate::panels::context_menu::{self, ContextMenu, MenuAction};
use crate::panels::left_pane::{self, LeftPaneView, PaneAction, StateIcons};
use crate::panels::style_window;
use egui::{Pos2, TextureId, Vec2};
use material_editor_graph::editor::{EditorContext, EditorResponse, InteractionMode};
use material_editor_graph::{
    ContextTarget, EditorStyle, Graph, HeaderTexture, LinkId, LinkRejection, NodeArchetype,
    NodeEditor, NodeId, NodeState, PinId, TouchTracker,
};

/// Nodes of the demo scene with their initial positions and comment sizes
const DEMO_SCENE: [(NodeArchetype, [f32; 2], Option<[f32; 2]>); 16] = [
    (NodeArchetype::InputAction, [-252.0, 220.0], None),
    (NodeArchetype::Branch, [-300.0, 351.0], None),
    (NodeArchetype::DoN, [-238.0, 504.0], None),
    (NodeArchetype::OutputAction, [71.0, 80.0], None),
    (NodeArchetype::SetTimer, [168.0, 316.0], None),
    (NodeArchetype::TreeSequence, [1028.0, 329.0], None),
    (NodeArchetype::TreeTask, [1204.0, 458.0], None),
    (NodeArchetype::TreeTask2, [868.0, 538.0], None),
    (NodeArchetype::Comment, [112.0, 576.0], Some([384.0, 154.0])),
    (NodeArchetype::Comment, [800.0, 224.0], Some([640.0, 400.0])),
    (NodeArchetype::Less, [366.0, 652.0], None),
    (NodeArchetype::Weird, [144.0, 652.0], None),
    (NodeArchetype::Message, [-348.0, 698.0], None),
    (NodeArchetype::PrintString, [-69.0, 652.0], None),
    (NodeArchetype::HoudiniTransform, [500.0, -70.0], None),
    (NodeArchetype::HoudiniGroup, [500.0, 42.0], None),
];

/// Initial links as (from node index, to node index), first output to first input
const DEMO_LINKS: [(usize, usize); 3] = [(5, 6), (5, 7), (14, 15)];

/// Textures loaded during initialization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppTextures {
    /// Blueprint header background
    pub header_background: Option<TextureId>,
    /// "Save state" icon
    pub save_icon: Option<TextureId>,
    /// "Restore state" icon
    pub restore_icon: Option<TextureId>,
}

impl AppTextures {
    fn take_all(&mut self) -> Vec<TextureId> {
        [
            self.header_background.take(),
            self.save_icon.take(),
            self.restore_icon.take(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// The material editor demo
pub struct MaterialEditorApp<H: TextureHost> {
    host: H,
    config: AppConfig,
    graph: Graph,
    editor: NodeEditor,
    touch: TouchTracker,
    style: EditorStyle,
    textures: AppTextures,
    show_style_editor: bool,
    context_menu: Option<ContextMenu>,
    /// Pin a link was dragged from before the "Create New Node" popup opened
    new_node_pin: Option<PinId>,
    last_selection: (Vec<NodeId>, Vec<LinkId>),
    selection_changes: usize,
    initialized: bool,
}

impl<H: TextureHost> MaterialEditorApp<H> {
    /// Create the application; nothing is loaded until [`Self::initialize`]
    pub fn new(host: H, config: AppConfig) -> Self {
        Self {
            host,
            graph: Graph::with_policy(config.link_policy),
            editor: NodeEditor::new(),
            touch: TouchTracker::new(config.touch_time),
            style: config.style.clone(),
            textures: AppTextures::default(),
            show_style_editor: false,
            context_menu: None,
            new_node_pin: None,
            last_selection: (Vec::new(), Vec::new()),
            selection_changes: 0,
            initialized: false,
            config,
        }
    }

    /// Application name
    pub fn name(&self) -> &'static str {
        "MaterialEditor"
    }

    /// Texture host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Load textures and build the demo scene
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        tracing::info!("Initializing {}", self.name());

        let assets = self.config.assets.clone();
        self.textures = AppTextures {
            header_background: self.load_texture(&assets.header_background),
            save_icon: self.load_texture(&assets.save_icon),
            restore_icon: self.load_texture(&assets.restore_icon),
        };

        self.graph = Graph::with_policy(self.config.link_policy);
        self.editor = NodeEditor::new();
        self.touch = TouchTracker::new(self.config.touch_time);
        self.context_menu = None;
        self.new_node_pin = None;
        self.last_selection = (Vec::new(), Vec::new());

        self.build_scene();
        self.editor.navigate_to_content();
        self.initialized = true;
    }

    /// Release every texture; safe to call more than once
    pub fn finalize(&mut self) {
        for id in self.textures.take_all() {
            self.host.destroy_texture(id);
        }
        if std::mem::take(&mut self.initialized) {
            tracing::info!("Finalized {}", self.name());
        }
    }

    fn load_texture(&mut self, file: &str) -> Option<TextureId> {
        let path = self.config.assets.path(file);
        match self.host.load_texture(&path) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("Texture {} unavailable: {e}", path.display());
                None
            }
        }
    }

    fn build_scene(&mut self) {
        let mut ids = Vec::with_capacity(DEMO_SCENE.len());
        for (archetype, position, size) in DEMO_SCENE {
            let node = self.graph.spawn(archetype);
            node.position = position;
            if let Some(size) = size {
                node.size = size;
            }
            ids.push(node.id);
        }

        for (from, to) in DEMO_LINKS {
            let start = self
                .graph
                .find_node(ids[from])
                .and_then(|node| node.outputs.first())
                .map(|pin| pin.id);
            let end = self
                .graph
                .find_node(ids[to])
                .and_then(|node| node.inputs.first())
                .map(|pin| pin.id);
            if let (Some(start), Some(end)) = (start, end) {
                if let Err(e) = self.graph.connect(start, end) {
                    tracing::warn!("Demo link {start} -> {end} rejected: {e}");
                }
            }
        }

        for id in ids {
            self.refresh_state(id);
        }
        tracing::info!(
            "Demo scene ready: {} nodes, {} links",
            self.graph.node_count(),
            self.graph.link_count()
        );
    }

    fn header_texture(&self) -> Option<HeaderTexture> {
        let id = self.textures.header_background?;
        Some(HeaderTexture {
            id,
            size: Vec2::new(
                self.host.texture_width(id) as f32,
                self.host.texture_height(id) as f32,
            ),
        })
    }

    /// Run one frame of UI
    pub fn run_frame(&mut self, ctx: &egui::Context) {
        self.touch.update(ctx.input(|i| i.stable_dt));
        if !self.touch.is_empty() {
            ctx.request_repaint();
        }

        let pane = LeftPaneView {
            graph: &self.graph,
            editor: &self.editor,
            touch: &self.touch,
            icons: StateIcons {
                save: self.textures.save_icon,
                restore: self.textures.restore_icon,
            },
            selection_changes: self.selection_changes,
        };
        let actions = egui::SidePanel::left("left_pane")
            .resizable(true)
            .default_width(self.config.left_pane_width)
            .show(ctx, |ui| left_pane::show(ui, &pane))
            .inner;
        for action in actions {
            self.apply_pane_action(action);
        }

        style_window(ctx, &mut self.style, &mut self.show_style_editor);

        let header_texture = self.header_texture();
        let response = egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let editor_ctx = EditorContext {
                    style: &self.style,
                    header_texture,
                    touch: &self.touch,
                };
                self.editor.show(ui, &mut self.graph, &editor_ctx)
            })
            .inner;

        self.handle_response(ctx, &response);

        if let Some(action) = context_menu::show(ctx, &mut self.context_menu, &self.graph) {
            self.apply_menu_action(action);
        }

        self.track_selection();
    }

    fn handle_response(&mut self, ctx: &egui::Context, response: &EditorResponse) {
        if let Some((a, b)) = response.new_link {
            match self.accept_new_link(a, b, response.link_accepted) {
                Err(rejection) => self.editor.set_rejection_label(ctx, &rejection.to_string()),
                Ok(None) => self.editor.set_accept_label(ctx, "+ Create Link"),
                Ok(Some(_)) => {}
            }
        } else if matches!(self.editor.mode(), InteractionMode::CreatingLink { .. }) {
            self.editor.set_accept_label(ctx, "+ Create Node");
        }

        if let Some(pin) = response.new_node {
            let pos = response
                .new_node_pos
                .unwrap_or(response.canvas_rect.center());
            self.open_create_menu(Some(pin), pos);
        }

        self.apply_deletions(&response.deleted_nodes, &response.deleted_links);

        if let Some(request) = response.context {
            match request.target {
                ContextTarget::Background => self.open_create_menu(None, request.screen_pos),
                target => self.context_menu = Some(ContextMenu::new(target, request.screen_pos)),
            }
        }

        for &node_id in &response.moved_nodes {
            self.refresh_state(node_id);
            self.touch.touch(node_id);
        }
    }

    fn open_create_menu(&mut self, pin: Option<PinId>, screen_pos: Pos2) {
        self.new_node_pin = pin;
        self.context_menu = Some(ContextMenu::new(ContextTarget::Background, screen_pos));
    }

    fn apply_pane_action(&mut self, action: PaneAction) {
        match action {
            PaneAction::ZoomToContent => self.editor.navigate_to_content(),
            PaneAction::ShowFlow => {
                let links: Vec<LinkId> = self.graph.links().map(|link| link.id).collect();
                for link_id in links {
                    self.editor.flow(link_id);
                }
            }
            PaneAction::ToggleStyleEditor => self.show_style_editor = !self.show_style_editor,
            PaneAction::SelectNode { node, add } => {
                self.editor.select_node(node, add);
                self.editor.navigate_to_selection();
            }
            PaneAction::DeselectNode(node) => {
                self.editor.toggle_node_selection(node);
                self.editor.navigate_to_selection();
            }
            PaneAction::ClearSelection => self.editor.clear_selection(),
            PaneAction::SaveState(node) => self.save_node_state(node),
            PaneAction::RestoreState(node) => {
                self.restore_node_state(node);
            }
        }
    }

    fn apply_menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::DeleteNode(node_id) => self.editor.delete_node(node_id),
            MenuAction::DeleteLink(link_id) => self.editor.delete_link(link_id),
            MenuAction::DeletePinLinks(pin_id) => {
                let links: Vec<LinkId> = self.graph.links_for_pin(pin_id).map(|link| link.id).collect();
                for link_id in links {
                    self.editor.delete_link(link_id);
                }
            }
            MenuAction::CreateNode(archetype, screen_pos) => {
                let position = self.editor.screen_to_graph(screen_pos);
                self.create_node(archetype, position);
            }
            MenuAction::Dismissed => self.new_node_pin = None,
        }
    }

    fn track_selection(&mut self) {
        let selection = (self.editor.selected_nodes(), self.editor.selected_links());
        if selection != self.last_selection {
            self.selection_changes += 1;
            self.last_selection = selection;
        }
    }

    /// Validate a link gesture between two pins.
    ///
    /// Returns the rejection to show, `Ok(None)` while the gesture is still
    /// pending, or the created link once `accepted` is set.
    pub fn accept_new_link(
        &mut self,
        a: PinId,
        b: PinId,
        accepted: bool,
    ) -> Result<Option<LinkId>, LinkRejection> {
        let pin_a = self.graph.find_pin(a).ok_or(LinkRejection::PinNotFound(a))?;
        let pin_b = self.graph.find_pin(b).ok_or(LinkRejection::PinNotFound(b))?;
        if let Some(rejection) = self.graph.link_rejection(pin_a, pin_b) {
            return Err(rejection);
        }
        if !accepted {
            return Ok(None);
        }
        self.graph.connect(a, b).map(Some)
    }

    /// Spawn a node at a graph position, auto-connecting it to the pin the
    /// "Create New Node" popup was opened from
    pub fn create_node(&mut self, archetype: NodeArchetype, position: Pos2) -> NodeId {
        let node = self.graph.spawn(archetype);
        node.position = [position.x, position.y];
        let node_id = node.id;

        if let Some(start) = self
            .new_node_pin
            .take()
            .and_then(|pin_id| self.graph.find_pin(pin_id).cloned())
        {
            let target = self.graph.find_node(node_id).and_then(|node| {
                node.pins()
                    .find(|pin| self.graph.link_rejection(&start, pin).is_none())
                    .map(|pin| pin.id)
            });
            if let Some(target) = target {
                if let Err(e) = self.graph.connect(start.id, target) {
                    tracing::warn!("Could not connect new node {node_id}: {e}");
                }
            }
        }

        self.refresh_state(node_id);
        node_id
    }

    /// Remove links, then nodes (with their attached links)
    pub fn apply_deletions(&mut self, nodes: &[NodeId], links: &[LinkId]) {
        for &link_id in links {
            self.graph.remove_link(link_id);
        }
        for &node_id in nodes {
            if self.graph.remove_node(node_id).is_some() {
                self.touch.forget(node_id);
            }
        }
    }

    /// Re-serialize a node's position and size into its `state`
    pub fn refresh_state(&mut self, node_id: NodeId) {
        let Some(node) = self.graph.find_node_mut(node_id) else {
            return;
        };
        match NodeState::capture(node).to_ron() {
            Ok(state) => node.state = state,
            Err(e) => tracing::warn!("Failed to serialize state of node {node_id}: {e}"),
        }
    }

    /// Snapshot a node's current state
    pub fn save_node_state(&mut self, node_id: NodeId) {
        self.refresh_state(node_id);
        if let Some(node) = self.graph.find_node_mut(node_id) {
            node.saved_state = node.state.clone();
            tracing::debug!("Saved state of node {node_id}");
        }
    }

    /// Restore a node's snapshot and clear it; returns whether anything changed
    pub fn restore_node_state(&mut self, node_id: NodeId) -> bool {
        let Some(node) = self.graph.find_node_mut(node_id) else {
            return false;
        };
        if node.saved_state.is_empty() {
            return false;
        }
        match NodeState::from_ron(&node.saved_state) {
            Ok(state) => {
                state.apply(node);
                node.state = std::mem::take(&mut node.saved_state);
                self.touch.touch(node_id);
                tracing::debug!("Restored state of node {node_id}");
                true
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable state of node {node_id}: {e}");
                node.saved_state.clear();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostError;
    use material_editor_graph::PinKind;
    use std::path::{Path, PathBuf};

    /// Host that hands out fake ids and records what is alive
    #[derive(Default)]
    struct RecordingHost {
        next: u64,
        alive: Vec<TextureId>,
        loaded: Vec<PathBuf>,
        fail: Vec<String>,
    }

    impl TextureHost for RecordingHost {
        fn load_texture(&mut self, path: &Path) -> Result<TextureId, HostError> {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            if self.fail.contains(&name) {
                return Err(HostError::Unknown(format!("refused {name}")));
            }
            self.next += 1;
            let id = TextureId::User(self.next);
            self.alive.push(id);
            self.loaded.push(path.to_path_buf());
            Ok(id)
        }

        fn destroy_texture(&mut self, id: TextureId) {
            self.alive.retain(|alive| *alive != id);
        }

        fn texture_width(&self, id: TextureId) -> usize {
            if self.alive.contains(&id) { 64 } else { 0 }
        }

        fn texture_height(&self, id: TextureId) -> usize {
            if self.alive.contains(&id) { 64 } else { 0 }
        }
    }

    fn app() -> MaterialEditorApp<RecordingHost> {
        let mut app = MaterialEditorApp::new(RecordingHost::default(), AppConfig::default());
        app.initialize();
        app
    }

    #[test]
    fn test_name() {
        assert_eq!(app().name(), "MaterialEditor");
    }

    #[test]
    fn test_initialize_then_finalize_releases_textures() {
        let mut app = app();
        assert_eq!(app.host().loaded.len(), 3);
        assert_eq!(app.host().alive.len(), 3);
        assert!(app.header_texture().is_some());

        app.finalize();
        assert!(app.host().alive.is_empty());
        assert_eq!(app.textures, AppTextures::default());

        app.finalize();
        assert!(app.host().alive.is_empty());
    }

    #[test]
    fn test_failed_texture_leaves_slot_empty() {
        let host = RecordingHost {
            fail: vec!["ic_save_white_24dp.png".to_string()],
            ..RecordingHost::default()
        };
        let mut app = MaterialEditorApp::new(host, AppConfig::default());
        app.initialize();

        let textures = app.textures;
        assert!(textures.header_background.is_some());
        assert!(textures.save_icon.is_none());
        assert!(textures.restore_icon.is_some());
        assert_eq!(app.graph.node_count(), 16);

        app.finalize();
        assert!(app.host().alive.is_empty());
    }

    #[test]
    fn test_demo_scene() {
        let app = app();
        let graph = &app.graph;
        assert_eq!(graph.node_count(), 16);
        assert_eq!(graph.link_count(), 3);

        let sequence = graph.node_at(5).unwrap();
        assert_eq!(sequence.name, "Sequence");
        assert_eq!(sequence.position, [1028.0, 329.0]);
        assert_eq!(graph.links_for_pin(sequence.outputs[0].id).count(), 2);

        let comment = graph.node_at(9).unwrap();
        assert_eq!(comment.size, [640.0, 400.0]);

        let transform = graph.node_at(14).unwrap();
        let group = graph.node_at(15).unwrap();
        let link = graph.links().nth(2).unwrap();
        assert_eq!(link.start_pin, transform.outputs[0].id);
        assert_eq!(link.end_pin, group.inputs[0].id);

        assert!(graph.nodes().all(|node| !node.state.is_empty()));
    }

    #[test]
    fn test_accept_new_link() {
        let mut app = app();
        let branch = app.graph.spawn(NodeArchetype::Branch).id;
        let print = app.graph.spawn(NodeArchetype::PrintString).id;
        let branch_node = app.graph.find_node(branch).unwrap();
        let (out_a, out_b) = (branch_node.outputs[0].id, branch_node.outputs[1].id);
        let print_in = app.graph.find_node(print).unwrap().inputs[0].id;
        let links_before = app.graph.link_count();

        assert_eq!(
            app.accept_new_link(out_a, out_b, true),
            Err(LinkRejection::IncompatibleKind)
        );
        assert_eq!(app.accept_new_link(out_a, print_in, false), Ok(None));
        assert_eq!(app.graph.link_count(), links_before);

        let link = app.accept_new_link(print_in, out_a, true).unwrap().unwrap();
        let link = app.graph.find_link(link).unwrap();
        assert_eq!(link.start_pin, out_a);
        assert_eq!(link.end_pin, print_in);
    }

    #[test]
    fn test_create_node_auto_connects() {
        let mut app = app();
        let branch = app.graph.spawn(NodeArchetype::Branch).id;
        let from = app.graph.find_node(branch).unwrap().outputs[0].id;

        app.open_create_menu(Some(from), Pos2::ZERO);
        let node_id = app.create_node(NodeArchetype::PrintString, Pos2::new(40.0, 60.0));

        let node = app.graph.find_node(node_id).unwrap();
        assert_eq!(node.position, [40.0, 60.0]);
        let target = node.inputs[0].id;
        assert!(app.graph.links().any(|l| l.start_pin == from && l.end_pin == target));

        // The pin is consumed by the first creation
        let plain = app.create_node(NodeArchetype::Less, Pos2::ZERO);
        let plain = app.graph.find_node(plain).unwrap();
        assert!(plain.pins().all(|pin| !app.graph.is_pin_linked(pin.id)));
    }

    #[test]
    fn test_create_node_auto_connect_respects_pin_types() {
        let mut config = AppConfig::default();
        config.link_policy.enforce_pin_types = true;
        let mut app = MaterialEditorApp::new(RecordingHost::default(), config);
        app.initialize();

        let message = app.graph.spawn(NodeArchetype::Message).id;
        let from = app.graph.find_node(message).unwrap().outputs[0].id;

        app.open_create_menu(Some(from), Pos2::ZERO);
        let node_id = app.create_node(NodeArchetype::PrintString, Pos2::ZERO);

        let node = app.graph.find_node(node_id).unwrap();
        assert!(!app.graph.is_pin_linked(node.inputs[0].id));
        let link = app.graph.links_for_pin(node.inputs[1].id).next().unwrap();
        assert_eq!(link.start_pin, from);
    }

    #[test]
    fn test_reinitialize_rebuilds_scene() {
        let mut app = app();
        app.graph.spawn(NodeArchetype::Branch);
        app.finalize();
        app.initialize();

        assert_eq!(app.graph.node_count(), 16);
        assert_eq!(app.graph.link_count(), 3);
        assert_eq!(app.host().alive.len(), 3);
        assert_eq!(app.host().loaded.len(), 6);
        assert!(app.new_node_pin.is_none());
    }

    #[test]
    fn test_create_node_from_input_pin() {
        let mut app = app();
        let print = app.graph.spawn(NodeArchetype::PrintString).id;
        let input = app.graph.find_node(print).unwrap().inputs[0].id;

        app.open_create_menu(Some(input), Pos2::ZERO);
        let node_id = app.create_node(NodeArchetype::Branch, Pos2::ZERO);

        let node = app.graph.find_node(node_id).unwrap();
        let link = app.graph.links_for_pin(input).next().unwrap();
        let start = app.graph.find_pin(link.start_pin).unwrap();
        assert_eq!(start.node, node.id);
        assert_eq!(start.kind, PinKind::Output);
    }

    #[test]
    fn test_apply_deletions() {
        let mut app = app();
        let sequence = app.graph.node_at(5).unwrap().id;
        let houdini_link = app.graph.links().nth(2).unwrap().id;
        app.touch.touch(sequence);

        app.apply_deletions(&[sequence], &[houdini_link]);
        assert!(app.graph.find_node(sequence).is_none());
        assert_eq!(app.graph.link_count(), 0);
        assert!(app.touch.remaining(sequence).is_none());
    }

    #[test]
    fn test_save_and_restore_state() {
        let mut app = app();
        let id = app.graph.node_at(0).unwrap().id;

        app.save_node_state(id);
        let saved = app.graph.find_node(id).unwrap().saved_state.clone();
        assert!(!saved.is_empty());

        app.graph.find_node_mut(id).unwrap().position = [5.0, 5.0];
        app.refresh_state(id);
        assert_ne!(app.graph.find_node(id).unwrap().state, saved);

        assert!(app.restore_node_state(id));
        let node = app.graph.find_node(id).unwrap();
        assert_eq!(node.position, [-252.0, 220.0]);
        assert_eq!(node.state, saved);
        assert!(node.saved_state.is_empty());
        assert!(app.touch.remaining(id).is_some());

        assert!(!app.restore_node_state(id));
    }

    #[test]
    fn test_unreadable_saved_state_is_discarded() {
        let mut app = app();
        let id = app.graph.node_at(1).unwrap().id;
        app.graph.find_node_mut(id).unwrap().saved_state = "not ron".to_string();
        assert!(!app.restore_node_state(id));
        assert!(app.graph.find_node(id).unwrap().saved_state.is_empty());
    }
}
