use std::time::{Duration, Instant};

use eframe::egui;

const NOTICE_LIFETIME: Duration = Duration::from_millis(1900);

/// Transient messages shown in the bottom-right corner.
#[derive(Default)]
pub struct NoticeBoard {
    shown: Vec<(String, Instant)>,
}

impl NoticeBoard {
    pub fn push(&mut self, message: String, max: usize) {
        while self.shown.len() >= max.max(1) {
            self.shown.remove(0);
        }
        self.shown.push((message, Instant::now()));
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        self.shown.retain(|(_, at)| at.elapsed() < NOTICE_LIFETIME);
        if self.shown.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("notices"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .show(ctx, |ui| {
                for (message, _) in &self.shown {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(message);
                    });
                }
            });
        ctx.request_repaint_after(Duration::from_millis(200));
    }
}
