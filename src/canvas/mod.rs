pub mod compositor;
pub mod history;
pub mod layer;
pub mod store;
pub mod surface;
pub mod text;

pub use compositor::{Compositor, FloatingOverlay, Scene};
pub use history::{History, Snapshot};
pub use layer::{FontFamily, Layer, LayerId, LayerKind, TextContent, TextStyle};
pub use store::LayerStore;
pub use surface::{CompositeMode, Surface};
pub use text::TextRenderer;
