//! Collage editor: the state object that wires the scene graph, selection,
//! viewport and export to a rendering engine.

pub mod config;
pub mod decode;
pub mod editor;
pub mod error;
pub mod export;
pub mod panel;
pub mod selection;
pub mod shortcuts;
pub mod viewport;

pub use config::EditorConfig;
pub use decode::{FileUpload, VideoBackend, VideoStream};
pub use editor::{Editor, UploadReport};
pub use error::{DecodeError, EditorError, EditorResult};
pub use export::{ExportCompositor, ExportPayload};
pub use panel::StylePanelState;
pub use selection::SelectionController;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use viewport::ViewportController;
