pub mod app;
pub mod brush_engine;
pub mod canvas;
pub mod error;
pub mod selection;
pub mod ui;
pub mod utils;
pub mod viewport;

pub use app::{
    parse_launch_args, parse_launch_env, EditorConfig, EditorSession, IllustratorApp, Outcome,
    Tool,
};
pub use error::{EditorError, EditorResult};
