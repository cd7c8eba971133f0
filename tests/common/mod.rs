#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::os::raw::c_int;
use std::rc::Rc;
use std::sync::atomic::Ordering;
use x11::xlib;
use xlisten::clock::Clock;
use xlisten::display::{DisplayConnection, ErrorHandler, Window};
use xlisten::listener::{BAD_ACCESS, ProtocolError};
use xlisten::prelude::*;

pub const ROOT: Window = 0x1e1;

pub enum Scripted {
    Event(xlib::XEvent),
    Error(ProtocolError),
}

/// In-memory display. Errors caused by requests stay in flight until the
/// next synchronize or wait, as on a real connection.
#[derive(Default)]
pub struct ScriptedDisplay {
    pub script: VecDeque<Scripted>,
    /// Another client holds the redirect right on the root window.
    pub occupied: bool,
    pub handler: ErrorHandler,
    in_flight: Vec<ProtocolError>,
    forwarded: Vec<ProtocolError>,
    pub dropped_errors: usize,
    pub selected: Vec<(Window, EventMask)>,
    pub next_event_calls: usize,
    /// Stopped when startup synchronizes, like a signal arriving mid-negotiation.
    pub stop_on_synchronize: Option<StopHandle>,
}

impl ScriptedDisplay {
    pub fn with_script(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    fn route(&mut self, error: ProtocolError) {
        match &self.handler {
            ErrorHandler::Probe(detected) => detected.store(true, Ordering::SeqCst),
            ErrorHandler::Forward => self.forwarded.push(error),
            ErrorHandler::Default => self.dropped_errors += 1,
        }
    }

    fn route_in_flight(&mut self) {
        for error in std::mem::take(&mut self.in_flight) {
            self.route(error);
        }
    }
}

impl DisplayConnection for ScriptedDisplay {
    type Envelope = xlib::XEvent;

    fn root(&self) -> Window {
        ROOT
    }

    fn select_events(&mut self, window: Window, mask: EventMask) {
        self.selected.push((window, mask));
        if self.occupied && mask.contains(EventMask::SUBSTRUCTURE_REDIRECT) {
            self.in_flight.push(protocol_error(BAD_ACCESS, window));
        }
    }

    fn synchronize(&mut self, _discard: bool) {
        self.route_in_flight();
        if let Some(handle) = self.stop_on_synchronize.take() {
            handle.stop();
        }
    }

    fn next_event(&mut self) -> xlib::XEvent {
        self.next_event_calls += 1;
        self.route_in_flight();
        loop {
            match self.script.pop_front() {
                Some(Scripted::Event(event)) => return event,
                Some(Scripted::Error(error)) => self.route(error),
                None => panic!("script exhausted: the loop kept waiting"),
            }
        }
    }

    fn install_error_handler(&mut self, handler: ErrorHandler) -> ErrorHandler {
        std::mem::replace(&mut self.handler, handler)
    }

    fn take_errors(&mut self) -> Vec<ProtocolError> {
        std::mem::take(&mut self.forwarded)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    pub now: Rc<Cell<i64>>,
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.get()
    }
}

pub fn protocol_error(error_code: u8, resource_id: Window) -> ProtocolError {
    ProtocolError {
        error_code,
        request_code: 2,
        minor_code: 0,
        resource_id: resource_id as u64,
        serial: 7,
        description: String::from("scripted error"),
    }
}

pub fn map_notify(window: Window) -> Scripted {
    let mut event: xlib::XMapEvent = unsafe { std::mem::zeroed() };
    event.type_ = xlib::MapNotify;
    event.event = ROOT;
    event.window = window;
    Scripted::Event(xlib::XEvent::from(event))
}

pub fn destroy_notify(window: Window) -> Scripted {
    let mut event: xlib::XDestroyWindowEvent = unsafe { std::mem::zeroed() };
    event.type_ = xlib::DestroyNotify;
    event.event = ROOT;
    event.window = window;
    Scripted::Event(xlib::XEvent::from(event))
}

pub fn create_notify(window: Window) -> Scripted {
    let mut event: xlib::XCreateWindowEvent = unsafe { std::mem::zeroed() };
    event.type_ = xlib::CreateNotify;
    event.parent = ROOT;
    event.window = window;
    Scripted::Event(xlib::XEvent::from(event))
}

pub fn raw_event(code: c_int) -> Scripted {
    let mut event: xlib::XAnyEvent = unsafe { std::mem::zeroed() };
    event.type_ = code;
    Scripted::Event(xlib::XEvent::from(event))
}

/// Handles map and destroy only. Destroying `stop_on` stops the loop.
#[derive(Default)]
pub struct Recorder {
    pub log: Vec<String>,
    pub errors: Vec<ProtocolError>,
    /// Waits the connection had served when each error was delivered.
    pub errors_after_waits: Vec<usize>,
    pub stop_on: Option<Window>,
    pub stop_handle: Option<StopHandle>,
    pub timings: Vec<i64>,
    pub clock: Option<ManualClock>,
}

impl Recorder {
    pub fn stopping_on(window: Window) -> Self {
        Self {
            stop_on: Some(window),
            ..Self::default()
        }
    }
}

pub type Cx<'a> = Context<'a, ScriptedDisplay>;

impl EventListener for Recorder {
    type Display = ScriptedDisplay;

    handlers! {
        fn on_map_notify(&mut self, cx: &Cx, event: &xlib::XMapEvent) {
            assert_eq!(cx.root(), event.event);
            if let Some(clock) = &self.clock {
                clock.now.set(clock.now.get() + 25);
            }
            self.timings.push(cx.time());
            self.log.push(format!("map 0x{:x}", event.window));
        }

        fn on_destroy_notify(&mut self, cx: &Cx, event: &xlib::XDestroyWindowEvent) {
            if self.stop_on == Some(event.window) {
                match &self.stop_handle {
                    Some(handle) => handle.stop(),
                    None => cx.stop(),
                }
            }
            self.log.push(format!("destroy 0x{:x}", event.window));
        }
    }

    fn on_error(&mut self, cx: &Cx, error: &ProtocolError) -> c_int {
        self.errors_after_waits.push(cx.display().next_event_calls);
        self.errors.push(error.clone());
        0
    }

    fn pre_loop(&mut self, cx: &Cx) {
        assert!(cx.is_running());
        self.log.push(String::from("pre_loop"));
    }
}
