pub mod clipboard;
pub mod input_handler;
pub mod painter;
pub mod session;
pub mod state;
pub mod text_edit;
pub mod tools;

pub use clipboard::{ArboardClipboard, ClipboardBackend, MemoryClipboard};
pub use input_handler::{Key, Modifiers, PointerButton, PointerEvent, PointerId, PointerKind};
pub use painter::IllustratorApp;
pub use session::{EditorSession, Outcome};
pub use state::{parse_launch_args, parse_launch_env, EditorConfig, LaunchOptions};
pub use tools::Tool;
