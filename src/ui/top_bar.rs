use eframe::egui;

use crate::app::session::EditorSession;
use crate::app::tools::Tool;
use crate::brush_engine::ShapeKind;
use crate::ui::PanelState;
use crate::utils::color::Color;
use crate::utils::exporter::ExportFormat;

/// Tool strip, brush controls and canvas actions.
pub fn top_bar(session: &mut EditorSession, panel: &mut PanelState, ctx: &egui::Context) {
    egui::TopBottomPanel::top("quick_settings").show(ctx, |ui| {
        ui.horizontal_wrapped(|ui| {
            let current = session.tool();
            for (tool, label) in [
                (Tool::Brush, "🖌 Brush"),
                (Tool::Eraser, "Eraser"),
                (Tool::Select, "⬚ Select"),
                (Tool::Text, "Text"),
            ] {
                if ui.selectable_label(current == tool, label).clicked() {
                    session.set_tool(tool);
                }
            }

            let shape_label = match current {
                Tool::Shape(kind) => kind.label(),
                _ => "Shapes",
            };
            ui.menu_button(shape_label, |ui| {
                for kind in ShapeKind::ALL {
                    if ui
                        .selectable_label(current == Tool::Shape(kind), kind.label())
                        .clicked()
                    {
                        session.set_tool(Tool::Shape(kind));
                        ui.close_menu();
                    }
                }
            });
            let mut fill = session.shape_fill();
            if ui.checkbox(&mut fill, "Fill").changed() {
                session.set_shape_fill(fill);
            }

            ui.separator();
            let mut size = session.size();
            if ui
                .add(egui::Slider::new(&mut size, 1.0..=200.0).text("px"))
                .changed()
            {
                session.set_size(size);
            }
            let mut color = session.color();
            if ui.color_edit_button_srgba(&mut color).changed() {
                session.set_color(color);
                panel.color_hex = Color::from_color32(color).to_hex();
            }
            let hex = ui.add(egui::TextEdit::singleline(&mut panel.color_hex).desired_width(70.0));
            if hex.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                let value = panel.color_hex.clone();
                session.set_color_hex(&value);
            }

            ui.separator();
            if ui.button("Undo").clicked() {
                session.undo();
            }
            if ui.button("Clear").clicked() {
                session.clear_active();
            }
            if ui.button("Copy").clicked() {
                session.copy();
            }
            if ui.button("Paste").clicked() {
                session.paste();
            }
            if ui.button("Export…").clicked() {
                if let Some(path) = pick_file() {
                    session.export(&path);
                }
            }
            ui.label(format!("{:.0}%", session.view().scale * 100.0));
        });
    });
}

fn pick_file() -> Option<std::path::PathBuf> {
    let mut dialog = rfd::FileDialog::new().set_file_name("illustration.png");
    for format in ExportFormat::ALL {
        dialog = dialog.add_filter(format.label(), &[format.extension()]);
    }
    dialog.save_file()
}
