use crate::Config;
use crate::bootstrap::{Bootstrap, BootstrapState};
use crate::capability::CapabilitySet;
use crate::clock::{Clock, SystemClock};
use crate::dispatch::{DispatchTable, Dispatched};
use crate::display::DisplayConnection;
use crate::errors::WmError;
use crate::listener::{Context, EventListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, trace, warn};
use x11rb::protocol::xproto::EventMask;

/// State owned by the loop. Only `running` is shared, through [`StopHandle`].
pub struct RuntimeState {
    pub(crate) event_mask: EventMask,
    pub(crate) debug: bool,
    running: Arc<AtomicBool>,
    last_dispatch_start: i64,
    unknown_events: u64,
    clock: Box<dyn Clock>,
}

impl RuntimeState {
    pub fn new(config: &Config, clock: Box<dyn Clock>) -> Self {
        Self {
            event_mask: config.event_mask,
            debug: config.debug,
            running: Arc::new(AtomicBool::new(false)),
            last_dispatch_start: clock.now_millis(),
            unknown_events: 0,
            clock,
        }
    }

    pub fn elapsed_millis(&self) -> i64 {
        self.clock.now_millis() - self.last_dispatch_start
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    fn mark_dispatch_start(&mut self) {
        self.last_dispatch_start = self.clock.now_millis();
    }
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self::new(&Config::default(), Box::new(SystemClock))
    }
}

/// Requests a stop from outside the loop, e.g. from a signal handler.
///
/// The loop notices between events; a wait already in progress is not
/// interrupted.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Single-threaded event pump: negotiates startup, then waits for events
/// and routes each one through the dispatch table in delivery order.
pub struct EventLoop<D: DisplayConnection, L: EventListener<Display = D>> {
    display: D,
    listener: L,
    table: DispatchTable<L, D::Envelope>,
    state: RuntimeState,
    bootstrap: Bootstrap,
}

impl<D: DisplayConnection, L: EventListener<Display = D>> EventLoop<D, L> {
    pub fn new(display: D, listener: L, config: &Config) -> Result<Self, WmError> {
        Self::with_clock(display, listener, config, Box::new(SystemClock))
    }

    pub fn with_clock(
        display: D,
        listener: L,
        config: &Config,
        clock: Box<dyn Clock>,
    ) -> Result<Self, WmError> {
        let capabilities = CapabilitySet::of::<L>()?;
        debug!("listener handles {} event kinds", capabilities.len());

        Ok(Self {
            display,
            listener,
            table: DispatchTable::build(capabilities),
            state: RuntimeState::new(config, clock),
            bootstrap: Bootstrap::new(),
        })
    }

    /// Claims the display and pumps events until stopped.
    ///
    /// Returns `Ok(false)` without entering the loop when another window
    /// manager is running. A stop requested while startup is negotiating
    /// is kept, and `run` then returns before the first wait. Handler
    /// panics are not caught.
    pub fn run(&mut self) -> Result<bool, WmError> {
        self.state.start();

        let accepted = match self.bootstrap.run(&mut self.display, self.state.event_mask) {
            Ok(accepted) => accepted,
            Err(error) => {
                self.state.request_stop();
                return Err(error);
            }
        };
        if !accepted {
            self.state.request_stop();
            return Ok(false);
        }

        if !self.state.is_running() {
            info!("stop requested during startup");
            return Ok(true);
        }
        info!("event loop started");

        self.listener.pre_loop(&Context::new(&self.state, &self.display));

        while self.state.is_running() {
            let envelope = self.display.next_event();
            self.deliver_errors();
            self.state.mark_dispatch_start();

            let cx = Context::new(&self.state, &self.display);
            let dispatched = self.table.dispatch(&mut self.listener, &cx, &envelope);

            match dispatched {
                Dispatched::Invoked(kind) if self.state.debug => {
                    debug!("{} took {}ms", kind.handler(), cx.time());
                }
                Dispatched::Invoked(_) => {}
                Dispatched::Skipped(kind) => trace!("skipped {}", kind),
                Dispatched::Unknown(code) => {
                    warn!("Received unknown event {}", code);
                    self.state.unknown_events += 1;
                }
            }
        }

        info!("event loop stopped");
        Ok(true)
    }

    fn deliver_errors(&mut self) {
        for error in self.display.take_errors() {
            let cx = Context::new(&self.state, &self.display);
            let status = self.listener.on_error(&cx, &error);
            trace!("on_error returned {} for {}", status, error);
        }
    }

    pub fn stop(&self) {
        self.state.request_stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: self.state.running.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Milliseconds since the last event was picked up for dispatch.
    pub fn time(&self) -> i64 {
        self.state.elapsed_millis()
    }

    pub fn event_mask(&self) -> EventMask {
        self.state.event_mask
    }

    /// Takes effect when `run` claims the root window.
    pub fn set_event_mask(&mut self, event_mask: EventMask) {
        self.state.event_mask = event_mask;
    }

    pub fn is_debug(&self) -> bool {
        self.state.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.state.debug = debug;
    }

    pub fn unknown_events(&self) -> u64 {
        self.state.unknown_events
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.table.capabilities()
    }

    pub fn bootstrap_state(&self) -> BootstrapState {
        self.bootstrap.state()
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}
