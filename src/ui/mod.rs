//! egui panels that drive the editor session through its intents.
pub mod layers;
pub mod notices;
pub mod text_settings;
pub mod top_bar;

use std::collections::BTreeSet;

use crate::canvas::layer::LayerId;

/// Panel-local state that is not part of the editor session.
#[derive(Default)]
pub struct PanelState {
    /// Layers ticked for merging.
    pub merge_picks: BTreeSet<LayerId>,
    /// Layer being renamed and its edit buffer.
    pub renaming: Option<(LayerId, String)>,
    pub color_hex: String,
}
