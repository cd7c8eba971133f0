pub mod xlib;

use crate::event::Envelope;
use crate::listener::ProtocolError;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use x11rb::protocol::xproto::EventMask;

pub use self::xlib::XlibDisplay;

pub type Window = ::x11::xlib::Window;

/// Where the connection sends asynchronous server errors.
#[derive(Debug, Clone, Default)]
pub enum ErrorHandler {
    /// Logs the error and drops it.
    #[default]
    Default,
    /// Sets the flag and swallows the error.
    Probe(Arc<AtomicBool>),
    /// Queues the error for [`DisplayConnection::take_errors`].
    Forward,
}

/// The server connection the event loop runs on.
///
/// Requests are asynchronous: an error caused by `select_events` is only
/// guaranteed to have reached the installed [`ErrorHandler`] once
/// `synchronize` returns.
pub trait DisplayConnection {
    type Envelope: Envelope;

    fn root(&self) -> Window;

    fn select_events(&mut self, window: Window, mask: EventMask);

    /// Round-trips with the server, routing every error it produced so far.
    fn synchronize(&mut self, discard: bool);

    /// Blocks until the server delivers the next event.
    fn next_event(&mut self) -> Self::Envelope;

    /// Installs `handler` and returns the one it replaces.
    fn install_error_handler(&mut self, handler: ErrorHandler) -> ErrorHandler;

    /// Errors queued by [`ErrorHandler::Forward`] since the last call.
    fn take_errors(&mut self) -> Vec<ProtocolError>;
}
