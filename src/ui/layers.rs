use eframe::egui;

use crate::app::session::EditorSession;
use crate::ui::PanelState;

/// Sidebar that manages the layer stack.
pub fn layers_window(ctx: &egui::Context, session: &mut EditorSession, panel: &mut PanelState) {
    egui::Window::new("Layers")
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("New Layer").clicked() {
                    session.add_layer();
                }
                if ui.button("Delete").clicked() {
                    session.delete_layer();
                }
                let picks: Vec<_> = panel.merge_picks.iter().copied().collect();
                if ui
                    .add_enabled(picks.len() >= 2, egui::Button::new("Merge"))
                    .clicked()
                    && session.merge_layers(&picks).succeeded
                {
                    panel.merge_picks.clear();
                }
            });
            ui.separator();

            let active = session.store().active_id();
            let rows: Vec<_> = session
                .store()
                .layers()
                .iter()
                .enumerate()
                .map(|(idx, l)| (idx, l.id, l.name.clone(), l.visible, l.is_raster()))
                .collect();
            let top = rows.len().saturating_sub(1);

            // Top layers first.
            for (idx, id, name, visible, raster) in rows.into_iter().rev() {
                ui.horizontal(|ui| {
                    let mut shown = visible;
                    if ui.checkbox(&mut shown, "").changed() {
                        session.set_layer_visibility(id, shown);
                    }
                    let mut picked = panel.merge_picks.contains(&id);
                    if ui.checkbox(&mut picked, "").on_hover_text("Merge").changed() {
                        if picked {
                            panel.merge_picks.insert(id);
                        } else {
                            panel.merge_picks.remove(&id);
                        }
                    }

                    match &mut panel.renaming {
                        Some((renaming, buffer)) if *renaming == id => {
                            let edit = ui.text_edit_singleline(buffer);
                            if edit.lost_focus() {
                                let new_name = buffer.clone();
                                session.rename_layer(id, &new_name);
                                panel.renaming = None;
                            }
                        }
                        _ => {
                            let label = if raster { name.clone() } else { format!("T {name}") };
                            let response = ui.selectable_label(id == active, label);
                            if response.clicked() {
                                session.select_layer(id);
                            }
                            if response.double_clicked() {
                                panel.renaming = Some((id, name.clone()));
                            }
                        }
                    }

                    if ui.add_enabled(idx < top, egui::Button::new("▲")).clicked() {
                        session.reorder_layers(id, idx + 1);
                    }
                    if ui.add_enabled(idx > 0, egui::Button::new("▼")).clicked() {
                        session.reorder_layers(id, idx - 1);
                    }
                });
            }
            panel
                .merge_picks
                .retain(|id| session.store().contains(*id));
        });
}
