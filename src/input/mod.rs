//! Global page navigation hotkeys

pub mod backend;
pub mod listener;
pub mod x11_backend;

pub use backend::{DisabledBackend, HotkeyBackend};
pub use listener::{HotkeyRegistry, PageCommand};
pub use x11_backend::X11Backend;
