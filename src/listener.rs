use crate::display::{DisplayConnection, Window};
use crate::event::EventKind;
use crate::event::kind::event_kinds;
use crate::event_loop::RuntimeState;
use std::os::raw::c_int;
use x11::xlib;
use x11rb::protocol::xproto::EventMask;

/// Error code the server sends when a client asks for a redirect right
/// another client already holds.
pub const BAD_ACCESS: u8 = 10;

/// An asynchronous error reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    pub error_code: u8,
    pub request_code: u8,
    pub minor_code: u8,
    pub resource_id: u64,
    pub serial: u64,
    pub description: String,
}

impl ProtocolError {
    pub fn is_access(&self) -> bool {
        self.error_code == BAD_ACCESS
    }
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (error {}, request {}.{}, resource 0x{:x})",
            self.description, self.error_code, self.request_code, self.minor_code, self.resource_id
        )
    }
}

/// What a handler can see of the running loop, including the connection
/// the event arrived on.
pub struct Context<'a, D> {
    state: &'a RuntimeState,
    display: &'a D,
}

impl<'a, D: DisplayConnection> Context<'a, D> {
    pub(crate) fn new(state: &'a RuntimeState, display: &'a D) -> Self {
        Self { state, display }
    }

    /// The connection, for issuing requests in reply to an event.
    pub fn display(&self) -> &D {
        self.display
    }

    pub fn root(&self) -> Window {
        self.display.root()
    }

    /// Milliseconds since the current event was picked up for dispatch.
    pub fn time(&self) -> i64 {
        self.state.elapsed_millis()
    }

    /// Stops the loop once the current handler returns.
    pub fn stop(&self) {
        self.state.request_stop();
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn is_debug(&self) -> bool {
        self.state.debug
    }

    pub fn event_mask(&self) -> EventMask {
        self.state.event_mask
    }
}

macro_rules! handler_methods {
    ($($kind:ident, $selector:literal, $shape:ident, $payload:ident, $handler:ident;)*) => {
        $(
            #[doc = concat!("Handles `", stringify!($kind), "` events.")]
            fn $handler(&mut self, _cx: &Context<Self::Display>, _event: &xlib::$payload) {}
        )*
    };
}

/// A window manager built on the event loop.
///
/// Every handler defaults to doing nothing. Handlers must be declared
/// through the [`handlers!`](crate::handlers) macro, which overrides the
/// methods and records their kinds in `HANDLES` from the same block. A
/// handler overridden outside the macro is never called, because kinds
/// missing from `HANDLES` are skipped before their payload is decoded.
pub trait EventListener {
    type Display: DisplayConnection;

    #[doc(hidden)]
    const HANDLES: &'static [EventKind] = &[];

    event_kinds!(handler_methods);

    /// Receives server errors once startup has succeeded.
    fn on_error(&mut self, cx: &Context<Self::Display>, error: &ProtocolError) -> c_int;

    /// Runs once after startup, before the first event is awaited.
    fn pre_loop(&mut self, _cx: &Context<Self::Display>) {}
}
