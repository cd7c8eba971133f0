use std::os::raw::c_int;
use x11::xlib;

/// Expands `$callback! { ... }` with one row per event kind, in code order:
/// `Kind, "selector", Shape, PayloadStruct, handler_method;`.
///
/// The kind name doubles as the name of its Xlib code constant. Every
/// per-kind table in the crate is generated from these rows.
macro_rules! event_kinds {
    ($callback:ident) => {
        $callback! {
            KeyPress,         "xkey",              Key,              XKeyEvent,              on_key_press;
            KeyRelease,       "xkey",              Key,              XKeyEvent,              on_key_release;
            ButtonPress,      "xbutton",           Button,           XButtonEvent,           on_button_press;
            ButtonRelease,    "xbutton",           Button,           XButtonEvent,           on_button_release;
            MotionNotify,     "xmotion",           Motion,           XMotionEvent,           on_motion_notify;
            EnterNotify,      "xcrossing",         Crossing,         XCrossingEvent,         on_enter_notify;
            LeaveNotify,      "xcrossing",         Crossing,         XCrossingEvent,         on_leave_notify;
            FocusIn,          "xfocus",            FocusChange,      XFocusChangeEvent,      on_focus_in;
            FocusOut,         "xfocus",            FocusChange,      XFocusChangeEvent,      on_focus_out;
            KeymapNotify,     "xkeymap",           Keymap,           XKeymapEvent,           on_keymap_notify;
            Expose,           "xexpose",           Expose,           XExposeEvent,           on_expose;
            GraphicsExpose,   "xgraphicsexpose",   GraphicsExpose,   XGraphicsExposeEvent,   on_graphics_expose;
            NoExpose,         "xnoexpose",         NoExpose,         XNoExposeEvent,         on_no_expose;
            VisibilityNotify, "xvisibility",       Visibility,       XVisibilityEvent,       on_visibility_notify;
            CreateNotify,     "xcreatewindow",     CreateWindow,     XCreateWindowEvent,     on_create_notify;
            DestroyNotify,    "xdestroywindow",    DestroyWindow,    XDestroyWindowEvent,    on_destroy_notify;
            UnmapNotify,      "xunmap",            Unmap,            XUnmapEvent,            on_unmap_notify;
            MapNotify,        "xmap",              Map,              XMapEvent,              on_map_notify;
            MapRequest,       "xmaprequest",       MapRequest,       XMapRequestEvent,       on_map_request;
            ReparentNotify,   "xreparent",         Reparent,         XReparentEvent,         on_reparent_notify;
            ConfigureNotify,  "xconfigure",        Configure,        XConfigureEvent,        on_configure_notify;
            ConfigureRequest, "xconfigurerequest", ConfigureRequest, XConfigureRequestEvent, on_configure_request;
            GravityNotify,    "xgravity",          Gravity,          XGravityEvent,          on_gravity_notify;
            ResizeRequest,    "xresizerequest",    ResizeRequest,    XResizeRequestEvent,    on_resize_request;
            CirculateNotify,  "xcirculate",        Circulate,        XCirculateEvent,        on_circulate_notify;
            CirculateRequest, "xcirculaterequest", CirculateRequest, XCirculateRequestEvent, on_circulate_request;
            PropertyNotify,   "xproperty",         Property,         XPropertyEvent,         on_property_notify;
            SelectionClear,   "xselectionclear",   SelectionClear,   XSelectionClearEvent,   on_selection_clear;
            SelectionRequest, "xselectionrequest", SelectionRequest, XSelectionRequestEvent, on_selection_request;
            SelectionNotify,  "xselection",        Selection,        XSelectionEvent,        on_selection_notify;
            ColormapNotify,   "xcolormap",         Colormap,         XColormapEvent,         on_colormap_notify;
            ClientMessage,    "xclient",           ClientMessage,    XClientMessageEvent,    on_client_message;
            MappingNotify,    "xmapping",          Mapping,          XMappingEvent,          on_mapping_notify;
        }
    };
}

pub(crate) use event_kinds;

macro_rules! define_registry {
    ($($kind:ident, $selector:literal, $shape:ident, $payload:ident, $handler:ident;)*) => {
        /// Structural and notification events a listener can handle.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum EventKind {
            $($kind,)*
        }

        pub const EVENT_KIND_COUNT: usize = [$(stringify!($kind)),*].len();

        const KINDS: [EventKindInfo; EVENT_KIND_COUNT] = [
            $(EventKindInfo {
                kind: EventKind::$kind,
                code: xlib::$kind,
                selector: $selector,
                shape: PayloadShape::$shape,
                handler: stringify!($handler),
            },)*
        ];
    };
}

event_kinds!(define_registry);

pub static REGISTRY: [EventKindInfo; EVENT_KIND_COUNT] = KINDS;

/// Highest core protocol event code routed by the dispatcher.
pub const MAX_EVENT_CODE: usize = KINDS[EVENT_KIND_COUNT - 1].code as usize;

/// The Xlib structure a kind's payload is read as.
///
/// Some shapes are shared: both key events carry `XKeyEvent`, both
/// crossing events carry `XCrossingEvent`, both focus events carry
/// `XFocusChangeEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadShape {
    Key,
    Button,
    Motion,
    Crossing,
    FocusChange,
    Keymap,
    Expose,
    GraphicsExpose,
    NoExpose,
    Visibility,
    CreateWindow,
    DestroyWindow,
    Unmap,
    Map,
    MapRequest,
    Reparent,
    Configure,
    ConfigureRequest,
    Gravity,
    ResizeRequest,
    Circulate,
    CirculateRequest,
    Property,
    SelectionClear,
    SelectionRequest,
    Selection,
    Colormap,
    ClientMessage,
    Mapping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventKindInfo {
    pub kind: EventKind,
    pub code: c_int,
    /// Name of the `XEvent` union member holding the payload.
    pub selector: &'static str,
    pub shape: PayloadShape,
    /// Name of the `EventListener` method handling this kind.
    pub handler: &'static str,
}

impl EventKind {
    /// Registry entries are ordered by code, and codes start at 2.
    const FIRST_CODE: c_int = xlib::KeyPress;

    pub fn all() -> impl Iterator<Item = EventKind> {
        REGISTRY.iter().map(|entry| entry.kind)
    }

    pub fn lookup(code: c_int) -> Option<EventKind> {
        let index = usize::try_from(code.checked_sub(Self::FIRST_CODE)?).ok()?;
        REGISTRY.get(index).map(|entry| entry.kind)
    }

    pub const fn from_handler_name(name: &str) -> Option<EventKind> {
        let mut index = 0;
        while index < EVENT_KIND_COUNT {
            if bytes_eq(KINDS[index].handler.as_bytes(), name.as_bytes()) {
                return Some(KINDS[index].kind);
            }
            index += 1;
        }
        None
    }

    /// Resolves a handler method name while building `HANDLES` in
    /// [`handlers!`](crate::handlers); an unknown name fails const evaluation.
    #[doc(hidden)]
    pub const fn handled_by(name: &str) -> EventKind {
        match Self::from_handler_name(name) {
            Some(kind) => kind,
            None => panic!("not an event handler method"),
        }
    }

    pub fn info(self) -> &'static EventKindInfo {
        &REGISTRY[self as usize]
    }

    pub fn code(self) -> c_int {
        self.info().code
    }

    pub fn selector(self) -> &'static str {
        self.info().selector
    }

    pub fn shape(self) -> PayloadShape {
        self.info().shape
    }

    pub fn handler(self) -> &'static str {
        self.info().handler
    }
}

const fn bytes_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut index = 0;
    while index < a.len() {
        if a[index] != b[index] {
            return false;
        }
        index += 1;
    }
    true
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
