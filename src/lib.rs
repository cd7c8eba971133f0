pub mod bootstrap;
pub mod capability;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod display;
pub mod errors;
pub mod event;
pub mod event_loop;
pub mod listener;

pub mod prelude {
    pub use crate::Config;
    pub use crate::display::{DisplayConnection, XlibDisplay};
    pub use crate::errors::WmError;
    pub use crate::event::EventKind;
    pub use crate::event_loop::{EventLoop, StopHandle};
    pub use crate::handlers;
    pub use crate::listener::{Context, EventListener, ProtocolError};
    pub use x11rb::protocol::xproto::EventMask;
}

use x11rb::protocol::xproto::EventMask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub event_mask: EventMask,
    pub debug: bool,
}

/// Claims the redirect right by default, which is what makes the process
/// the window manager.
impl Default for Config {
    fn default() -> Self {
        Self {
            event_mask: EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT,
            debug: false,
        }
    }
}
