use super::kind::PayloadShape;
use std::os::raw::c_int;
use x11::xlib;

/// An event record as delivered by a display connection.
pub trait Envelope {
    fn code(&self) -> c_int;

    /// Reads the kind-specific payload out of the envelope.
    fn extract<P: Payload>(&self) -> P;
}

/// A kind-specific event structure that can be projected out of an `XEvent`.
pub trait Payload: Sized {
    const SHAPE: PayloadShape;

    fn project(event: &xlib::XEvent) -> Self;
}

impl Envelope for xlib::XEvent {
    fn code(&self) -> c_int {
        self.get_type()
    }

    fn extract<P: Payload>(&self) -> P {
        P::project(self)
    }
}

macro_rules! payloads {
    ($($ty:ident => $shape:ident),* $(,)?) => {
        $(
            impl Payload for xlib::$ty {
                const SHAPE: PayloadShape = PayloadShape::$shape;

                fn project(event: &xlib::XEvent) -> Self {
                    xlib::$ty::from(*event)
                }
            }
        )*
    };
}

payloads! {
    XKeyEvent => Key,
    XButtonEvent => Button,
    XMotionEvent => Motion,
    XCrossingEvent => Crossing,
    XFocusChangeEvent => FocusChange,
    XKeymapEvent => Keymap,
    XExposeEvent => Expose,
    XGraphicsExposeEvent => GraphicsExpose,
    XNoExposeEvent => NoExpose,
    XVisibilityEvent => Visibility,
    XCreateWindowEvent => CreateWindow,
    XDestroyWindowEvent => DestroyWindow,
    XUnmapEvent => Unmap,
    XMapEvent => Map,
    XMapRequestEvent => MapRequest,
    XReparentEvent => Reparent,
    XConfigureEvent => Configure,
    XConfigureRequestEvent => ConfigureRequest,
    XGravityEvent => Gravity,
    XResizeRequestEvent => ResizeRequest,
    XCirculateEvent => Circulate,
    XCirculateRequestEvent => CirculateRequest,
    XPropertyEvent => Property,
    XSelectionClearEvent => SelectionClear,
    XSelectionRequestEvent => SelectionRequest,
    XSelectionEvent => Selection,
    XColormapEvent => Colormap,
    XClientMessageEvent => ClientMessage,
    XMappingEvent => Mapping,
}
