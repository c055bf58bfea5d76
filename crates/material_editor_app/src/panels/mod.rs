// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor panel implementations.

pub mod context_menu;
pub mod left_pane;

use material_editor_graph::EditorStyle;

/// Style editor window
pub fn style_window(ctx: &egui::Context, style: &mut EditorStyle, show: &mut bool) {
    if !*show {
        return;
    }

    let mut open = true;
    egui::Window::new("Style")
        .open(&mut open)
        .resizable(true)
        .default_width(350.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                if style.settings_ui(ui) {
                    tracing::debug!("Editor style changed");
                }
            });
        });

    if !open {
        *show = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frame(style: &mut EditorStyle, show: &mut bool) {
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| style_window(ctx, style, show));
    }

    #[test]
    fn test_style_window_keeps_visibility() {
        let mut style = EditorStyle::default();

        let mut show = true;
        run_frame(&mut style, &mut show);
        assert!(show);

        let mut show = false;
        run_frame(&mut style, &mut show);
        assert!(!show);
    }
}
