use super::{DisplayConnection, ErrorHandler, Window};
use crate::errors::{WmError, X11Error};
use crate::listener::ProtocolError;
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_long};
use std::sync::atomic::Ordering;
use tracing::{trace, warn};
use x11::xlib;
use x11rb::protocol::xproto::EventMask;

thread_local! {
    static ROUTE: RefCell<ErrorHandler> = RefCell::new(ErrorHandler::Default);
    static PENDING: RefCell<Vec<ProtocolError>> = const { RefCell::new(Vec::new()) };
}

/// Xlib gives error callbacks no user data, so the active route lives in
/// thread-local state. Xlib ignores the return value.
unsafe extern "C" fn route_error(display: *mut xlib::Display, event: *mut xlib::XErrorEvent) -> c_int {
    let error = unsafe { protocol_error(display, &*event) };

    ROUTE.with(|route| match &*route.borrow() {
        ErrorHandler::Probe(detected) => detected.store(true, Ordering::SeqCst),
        ErrorHandler::Forward => PENDING.with(|pending| pending.borrow_mut().push(error)),
        ErrorHandler::Default => warn!("X error: {}", error),
    });

    0
}

unsafe fn protocol_error(display: *mut xlib::Display, event: &xlib::XErrorEvent) -> ProtocolError {
    let mut buffer = [0 as c_char; 1024];
    unsafe {
        xlib::XGetErrorText(
            display,
            event.error_code as c_int,
            buffer.as_mut_ptr(),
            buffer.len() as c_int,
        );
    }
    let description = unsafe { CStr::from_ptr(buffer.as_ptr()) }
        .to_string_lossy()
        .into_owned();

    ProtocolError {
        error_code: event.error_code,
        request_code: event.request_code,
        minor_code: event.minor_code,
        resource_id: event.resourceid as u64,
        serial: event.serial as u64,
        description,
    }
}

/// A connection to the X server through Xlib.
pub struct XlibDisplay {
    raw: *mut xlib::Display,
    root: Window,
}

impl XlibDisplay {
    /// Opens `name`, or `$DISPLAY` when `None`.
    pub fn open(name: Option<&str>) -> Result<Self, WmError> {
        let name_cstr = name.map(CString::new).transpose().map_err(X11Error::from)?;
        let name_ptr = name_cstr
            .as_ref()
            .map_or(std::ptr::null(), |name| name.as_ptr());

        let raw = unsafe { xlib::XOpenDisplay(name_ptr) };
        if raw.is_null() {
            let shown = name
                .map(String::from)
                .or_else(|| std::env::var("DISPLAY").ok())
                .unwrap_or_default();
            return Err(X11Error::DisplayOpenFailed(shown).into());
        }

        let root = unsafe { xlib::XDefaultRootWindow(raw) };
        unsafe { xlib::XSetErrorHandler(Some(route_error)) };

        Ok(Self { raw, root })
    }

    /// The underlying Xlib handle, for window operations the event loop
    /// does not wrap.
    pub fn raw(&self) -> *mut xlib::Display {
        self.raw
    }
}

impl Drop for XlibDisplay {
    fn drop(&mut self) {
        unsafe {
            xlib::XCloseDisplay(self.raw);
        }
    }
}

impl DisplayConnection for XlibDisplay {
    type Envelope = xlib::XEvent;

    fn root(&self) -> Window {
        self.root
    }

    fn select_events(&mut self, window: Window, mask: EventMask) {
        unsafe {
            xlib::XSelectInput(self.raw, window, u32::from(mask) as c_long);
        }
    }

    fn synchronize(&mut self, discard: bool) {
        unsafe {
            xlib::XSync(self.raw, discard as xlib::Bool);
        }
    }

    fn next_event(&mut self) -> xlib::XEvent {
        let mut event: xlib::XEvent = unsafe { std::mem::zeroed() };
        unsafe {
            xlib::XNextEvent(self.raw, &mut event);
        }
        event
    }

    fn install_error_handler(&mut self, handler: ErrorHandler) -> ErrorHandler {
        trace!("installing error handler {:?}", handler);
        ROUTE.with(|route| route.replace(handler))
    }

    fn take_errors(&mut self) -> Vec<ProtocolError> {
        PENDING.with(|pending| pending.take())
    }
}
