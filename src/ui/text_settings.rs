use eframe::egui;

use crate::app::session::EditorSession;
use crate::app::tools::Tool;
use crate::canvas::layer::FontFamily;

/// Font controls, shown while the text tool is active.
pub fn text_settings_window(ctx: &egui::Context, session: &mut EditorSession) {
    if session.tool() != Tool::Text {
        return;
    }
    let mut style = session.text_style().clone();
    let mut changed = false;
    egui::Window::new("Text")
        .default_width(200.0)
        .show(ctx, |ui| {
            egui::ComboBox::from_label("Font")
                .selected_text(style.family.label())
                .show_ui(ui, |ui| {
                    for family in [FontFamily::Sans, FontFamily::Mono] {
                        changed |= ui
                            .selectable_value(&mut style.family, family, family.label())
                            .changed();
                    }
                });
            changed |= ui
                .add(egui::Slider::new(&mut style.weight, 100..=900).step_by(100.0).text("Weight"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut style.size, 8.0..=200.0).text("Size"))
                .changed();
            if session.text_edit().is_some() {
                ui.label("Enter to confirm, Esc to cancel");
            }
        });
    if changed {
        session.set_text_style(style);
    }
}
