//! Startup negotiation for the redirect right on the root window.
//!
//! Selecting `SUBSTRUCTURE_REDIRECT` on the root fails with `BadAccess`
//! when another client already holds it, but the failure arrives later as
//! an asynchronous error rather than as a return value. A probe handler
//! catches it, and a synchronize call guarantees it has arrived before the
//! probe is inspected.

use crate::display::{DisplayConnection, ErrorHandler};
use crate::errors::WmError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error};
use x11rb::protocol::xproto::EventMask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Idle,
    ProbeInstalled,
    MaskRequested,
    Synchronized,
    Rejected,
    Accepted,
    PermanentHandlerInstalled,
}

#[derive(Debug)]
pub struct Bootstrap {
    state: BootstrapState,
    another_manager_detected: Arc<AtomicBool>,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new()
    }
}

impl Bootstrap {
    pub fn new() -> Self {
        Self {
            state: BootstrapState::Idle,
            another_manager_detected: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Claims `mask` on the root window. Returns `Ok(false)` when another
    /// window manager already holds the redirect right.
    ///
    /// Runs once; a second call is an error whatever the first outcome was.
    pub fn run<D: DisplayConnection>(
        &mut self,
        display: &mut D,
        mask: EventMask,
    ) -> Result<bool, WmError> {
        if self.state != BootstrapState::Idle {
            return Err(WmError::AlreadyBootstrapped);
        }

        let previous =
            display.install_error_handler(ErrorHandler::Probe(self.another_manager_detected.clone()));
        self.advance(BootstrapState::ProbeInstalled);

        let root = display.root();
        display.select_events(root, mask);
        self.advance(BootstrapState::MaskRequested);

        // Any rejection of the select has been routed to the probe after this.
        display.synchronize(false);
        self.advance(BootstrapState::Synchronized);

        if self.another_manager_detected.load(Ordering::SeqCst) {
            self.advance(BootstrapState::Rejected);
            error!("Another window manager is running!");
            display.install_error_handler(previous);
            return Ok(false);
        }
        self.advance(BootstrapState::Accepted);

        display.install_error_handler(ErrorHandler::Forward);
        self.advance(BootstrapState::PermanentHandlerInstalled);

        Ok(true)
    }

    fn advance(&mut self, next: BootstrapState) {
        debug!("bootstrap: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Window;
    use crate::listener::ProtocolError;
    use x11::xlib;

    /// Records calls and, when `occupied`, answers a redirect select with an
    /// error that only reaches the handler on synchronize.
    #[derive(Default)]
    struct Probe {
        occupied: bool,
        handler: ErrorHandler,
        pending_rejection: bool,
        calls: Vec<&'static str>,
    }

    impl DisplayConnection for Probe {
        type Envelope = xlib::XEvent;

        fn root(&self) -> Window {
            0x1e1
        }

        fn select_events(&mut self, _window: Window, mask: EventMask) {
            self.calls.push("select_events");
            if self.occupied && mask.contains(EventMask::SUBSTRUCTURE_REDIRECT) {
                self.pending_rejection = true;
            }
        }

        fn synchronize(&mut self, _discard: bool) {
            self.calls.push("synchronize");
            if std::mem::take(&mut self.pending_rejection) {
                if let ErrorHandler::Probe(flag) = &self.handler {
                    flag.store(true, Ordering::SeqCst);
                }
            }
        }

        fn next_event(&mut self) -> xlib::XEvent {
            unreachable!("bootstrap never waits for events")
        }

        fn install_error_handler(&mut self, handler: ErrorHandler) -> ErrorHandler {
            self.calls.push(match handler {
                ErrorHandler::Default => "install_default",
                ErrorHandler::Probe(_) => "install_probe",
                ErrorHandler::Forward => "install_forward",
            });
            std::mem::replace(&mut self.handler, handler)
        }

        fn take_errors(&mut self) -> Vec<ProtocolError> {
            Vec::new()
        }
    }

    fn wm_mask() -> EventMask {
        EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT
    }

    #[test]
    fn free_display_ends_with_forwarding_handler() {
        let mut display = Probe::default();
        let mut bootstrap = Bootstrap::new();

        assert!(bootstrap.run(&mut display, wm_mask()).unwrap());
        assert_eq!(bootstrap.state(), BootstrapState::PermanentHandlerInstalled);
        assert!(matches!(display.handler, ErrorHandler::Forward));
        assert_eq!(
            display.calls,
            vec!["install_probe", "select_events", "synchronize", "install_forward"]
        );
    }

    #[test]
    fn occupied_display_is_rejected_after_synchronize() {
        let mut display = Probe {
            occupied: true,
            ..Probe::default()
        };
        let mut bootstrap = Bootstrap::new();

        assert!(!bootstrap.run(&mut display, wm_mask()).unwrap());
        assert_eq!(bootstrap.state(), BootstrapState::Rejected);
        assert!(matches!(display.handler, ErrorHandler::Default));
        assert!(!display.calls.contains(&"install_forward"));
    }

    #[test]
    fn notify_only_mask_is_never_rejected() {
        let mut display = Probe {
            occupied: true,
            ..Probe::default()
        };
        let mut bootstrap = Bootstrap::new();

        assert!(bootstrap.run(&mut display, EventMask::SUBSTRUCTURE_NOTIFY).unwrap());
    }

    #[test]
    fn second_run_is_refused() {
        let mut display = Probe::default();
        let mut bootstrap = Bootstrap::new();
        bootstrap.run(&mut display, wm_mask()).unwrap();

        assert!(matches!(
            bootstrap.run(&mut display, wm_mask()),
            Err(WmError::AlreadyBootstrapped)
        ));
    }
}
