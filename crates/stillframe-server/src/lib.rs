//! Live preview server for stillframe.
//!
//! Serves the converted entry component inside a sandboxed frame, watches the
//! source tree, and pushes refreshed previews to connected browsers over a
//! WebSocket.

pub mod server;
pub mod templates;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use templates::{ShellContext, TemplateEngine};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{HmrHub, HmrMessage};
