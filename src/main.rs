use rusty_illustrator::{parse_launch_env, EditorConfig, IllustratorApp};

/// Launch the native egui application.
fn main() -> eframe::Result<()> {
    env_logger::init();

    let mut config = EditorConfig::default();
    parse_launch_env().apply(&mut config);
    log::info!("World {}x{}", config.world_width, config.world_height);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 840.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Rusty Illustrator",
        options,
        Box::new(|cc| Ok(Box::new(IllustratorApp::new(cc, config)))),
    )
}
