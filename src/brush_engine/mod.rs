pub mod brush;
pub mod shapes;
pub mod stroke;

pub use brush::Brush;
pub use shapes::ShapeKind;
pub use stroke::StrokeState;
