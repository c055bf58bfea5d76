// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visual style of the node editor canvas.

use egui::Color32;
use serde::{Deserialize, Serialize};

/// Canvas style, editable at runtime through [`EditorStyle::settings_ui`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorStyle {
    /// Inner padding of node bodies
    pub node_padding: f32,
    /// Corner rounding of nodes
    pub node_rounding: f32,
    /// Border width of idle nodes
    pub node_border_width: f32,
    /// Border width of hovered nodes
    pub hovered_node_border_width: f32,
    /// Border width of selected nodes
    pub selected_node_border_width: f32,
    /// Size of the pin icons
    pub pin_icon_size: f32,
    /// Horizontal pull of link curves
    pub link_strength: f32,
    /// Link stroke width
    pub link_thickness: f32,
    /// Spacing between flow markers
    pub flow_marker_distance: f32,
    /// Flow marker speed in points per second
    pub flow_speed: f32,
    /// How long a flow animation lasts in seconds
    pub flow_duration: f32,
    /// Canvas grid spacing
    pub grid_spacing: f32,

    /// Canvas background
    pub background: [u8; 4],
    /// Grid lines
    pub grid: [u8; 4],
    /// Node body fill
    pub node_bg: [u8; 4],
    /// Node border
    pub node_border: [u8; 4],
    /// Hovered node border
    pub hovered_node_border: [u8; 4],
    /// Selected node border
    pub selected_node_border: [u8; 4],
    /// Comment body fill
    pub comment_bg: [u8; 4],
    /// Comment border
    pub comment_border: [u8; 4],
    /// Selected link overlay
    pub selected_link: [u8; 4],
    /// Flow marker color
    pub flow: [u8; 4],
    /// Box selection fill
    pub selection_rect: [u8; 4],
}

impl Default for EditorStyle {
    fn default() -> Self {
        Self {
            node_padding: 8.0,
            node_rounding: 12.0,
            node_border_width: 1.5,
            hovered_node_border_width: 3.5,
            selected_node_border_width: 3.5,
            pin_icon_size: 24.0,
            link_strength: 100.0,
            link_thickness: 2.0,
            flow_marker_distance: 30.0,
            flow_speed: 150.0,
            flow_duration: 2.0,
            grid_spacing: 32.0,

            background: [60, 60, 70, 200],
            grid: [120, 120, 120, 40],
            node_bg: [32, 32, 32, 200],
            node_border: [255, 255, 255, 96],
            hovered_node_border: [50, 176, 255, 255],
            selected_node_border: [255, 176, 50, 255],
            comment_bg: [255, 255, 255, 64],
            comment_border: [255, 255, 255, 64],
            selected_link: [255, 176, 50, 255],
            flow: [255, 128, 64, 255],
            selection_rect: [5, 130, 255, 64],
        }
    }
}

/// Convert a stored RGBA quadruple to an egui color
pub fn color(rgba: [u8; 4]) -> Color32 {
    Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Convert a stored RGB triple to an opaque egui color
pub fn rgb(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

impl EditorStyle {
    /// Reset to defaults
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Render the style editor; returns true when anything changed
    pub fn settings_ui(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;

        ui.horizontal(|ui| {
            ui.heading("Style");
            if ui.button("Reset to Defaults").clicked() {
                self.reset();
                changed = true;
            }
        });
        ui.separator();

        ui.label("Values");
        changed |= ui
            .add(egui::Slider::new(&mut self.node_padding, 0.0..=40.0).text("Node Padding"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.node_rounding, 0.0..=40.0).text("Node Rounding"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.node_border_width, 0.0..=15.0).text("Node Border Width"))
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut self.hovered_node_border_width, 0.0..=15.0)
                    .text("Hovered Node Border Width"),
            )
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut self.selected_node_border_width, 0.0..=15.0)
                    .text("Selected Node Border Width"),
            )
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.pin_icon_size, 8.0..=48.0).text("Pin Icon Size"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.link_strength, 0.0..=500.0).text("Link Strength"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.link_thickness, 0.5..=8.0).text("Link Thickness"))
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut self.flow_marker_distance, 1.0..=200.0)
                    .text("Flow Marker Distance"),
            )
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.flow_speed, 1.0..=2000.0).text("Flow Speed"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.flow_duration, 0.0..=5.0).text("Flow Duration"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut self.grid_spacing, 8.0..=128.0).text("Grid Spacing"))
            .changed();

        ui.separator();
        ui.label("Colors");
        egui::Grid::new("editor_style_colors")
            .num_columns(2)
            .show(ui, |ui| {
                let mut row = |ui: &mut egui::Ui, label: &str, value: &mut [u8; 4]| {
                    ui.label(label);
                    changed |= ui.color_edit_button_srgba_unmultiplied(value).changed();
                    ui.end_row();
                };
                row(ui, "Background", &mut self.background);
                row(ui, "Grid", &mut self.grid);
                row(ui, "Node Background", &mut self.node_bg);
                row(ui, "Node Border", &mut self.node_border);
                row(ui, "Hovered Node Border", &mut self.hovered_node_border);
                row(ui, "Selected Node Border", &mut self.selected_node_border);
                row(ui, "Comment Background", &mut self.comment_bg);
                row(ui, "Comment Border", &mut self.comment_border);
                row(ui, "Selected Link", &mut self.selected_link);
                row(ui, "Flow", &mut self.flow);
                row(ui, "Selection Rect", &mut self.selection_rect);
            });

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization() {
        let style = EditorStyle {
            link_thickness: 3.0,
            ..EditorStyle::default()
        };
        let ron_str = ron::ser::to_string_pretty(&style, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: EditorStyle = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, style);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded: EditorStyle = ron::from_str("(node_rounding: 4.0)").unwrap();
        assert_eq!(loaded.node_rounding, 4.0);
        assert_eq!(loaded.pin_icon_size, EditorStyle::default().pin_icon_size);
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(rgb([1, 2, 3]), Color32::from_rgb(1, 2, 3));
        assert_eq!(color([255, 255, 255, 255]), Color32::WHITE);
    }
}
