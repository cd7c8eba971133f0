use crate::capability::CapabilitySet;
use crate::event::kind::event_kinds;
use crate::event::{Envelope, EventKind, MAX_EVENT_CODE};
use crate::listener::{Context, EventListener};
use std::os::raw::c_int;
use x11::xlib;

type Invoke<L, E> = fn(&mut L, &Context<<L as EventListener>::Display>, &E);

struct DispatchEntry<L: EventListener, E> {
    kind: EventKind,
    invoke: Invoke<L, E>,
}

/// What [`DispatchTable::dispatch`] did with an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Invoked(EventKind),
    /// The listener does not handle this kind; the payload was not read.
    Skipped(EventKind),
    Unknown(c_int),
}

/// Routes envelopes to listener handlers by event code.
pub struct DispatchTable<L: EventListener, E> {
    entries: Vec<Option<DispatchEntry<L, E>>>,
    capabilities: CapabilitySet,
}

impl<L: EventListener, E: Envelope> DispatchTable<L, E> {
    pub fn build(capabilities: CapabilitySet) -> Self {
        let entries = (0..=MAX_EVENT_CODE as c_int)
            .map(|code| {
                EventKind::lookup(code).map(|kind| DispatchEntry {
                    kind,
                    invoke: invoker::<L, E>(kind),
                })
            })
            .collect();

        Self {
            entries,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    pub fn dispatch(
        &self,
        listener: &mut L,
        cx: &Context<L::Display>,
        envelope: &E,
    ) -> Dispatched {
        let code = envelope.code();
        let entry = usize::try_from(code)
            .ok()
            .and_then(|index| self.entries.get(index))
            .and_then(Option::as_ref);

        let Some(entry) = entry else {
            return Dispatched::Unknown(code);
        };

        if !self.capabilities.contains(entry.kind) {
            return Dispatched::Skipped(entry.kind);
        }

        (entry.invoke)(listener, cx, envelope);
        Dispatched::Invoked(entry.kind)
    }
}

fn invoker<L: EventListener, E: Envelope>(kind: EventKind) -> Invoke<L, E> {
    macro_rules! route {
        ($($kind:ident, $selector:literal, $shape:ident, $payload:ident, $handler:ident;)*) => {
            match kind {
                $(EventKind::$kind => |listener, cx, envelope| {
                    listener.$handler(cx, &envelope.extract::<xlib::$payload>())
                },)*
            }
        };
    }

    let invoke: Invoke<L, E> = event_kinds!(route);
    invoke
}
