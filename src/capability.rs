use crate::errors::CapabilityError;
use crate::event::{EventKind, MAX_EVENT_CODE, REGISTRY};
use crate::listener::EventListener;
use tracing::debug;

/// The event kinds a listener type actually handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet {
    bits: u64,
}

const _: () = assert!(MAX_EVENT_CODE < u64::BITS as usize);

impl CapabilitySet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Builds the set from `L::HANDLES`, rejecting repeated kinds.
    pub fn of<L: EventListener>() -> Result<Self, CapabilityError> {
        let mut set = Self::empty();
        for &kind in L::HANDLES {
            if set.contains(kind) {
                return Err(CapabilityError::DuplicateHandler(kind));
            }
            set.insert(kind);
            debug!("Added handler: {}", kind.handler());
        }
        Ok(set)
    }

    pub fn insert(&mut self, kind: EventKind) {
        self.bits |= Self::bit(kind);
    }

    pub fn contains(&self, kind: EventKind) -> bool {
        self.bits & Self::bit(kind) != 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Kinds in the set, in code order.
    pub fn iter(&self) -> impl Iterator<Item = EventKind> + '_ {
        REGISTRY
            .iter()
            .map(|entry| entry.kind)
            .filter(|kind| self.contains(*kind))
    }

    fn bit(kind: EventKind) -> u64 {
        1 << kind.code()
    }
}

impl FromIterator<EventKind> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = EventKind>>(iter: I) -> Self {
        let mut set = Self::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

/// Declares event handlers inside an `impl EventListener` block and fills
/// in `HANDLES` with exactly the kinds declared.
///
/// ```ignore
/// impl EventListener for Watcher {
///     type Display = XlibDisplay;
///
///     xlisten::handlers! {
///         fn on_map_notify(&mut self, cx: &Context<XlibDisplay>, event: &XMapEvent) {
///             println!("mapped 0x{:x} in {}ms", event.window, cx.time());
///         }
///     }
///
///     fn on_error(&mut self, _cx: &Context<XlibDisplay>, _error: &ProtocolError) -> c_int {
///         0
///     }
/// }
/// ```
///
/// A method name that is not one of the listener's handlers fails to
/// expand.
#[macro_export]
macro_rules! handlers {
    ($(fn $name:ident $params:tt $body:block)*) => {
        const HANDLES: &'static [$crate::event::EventKind] =
            &[$($crate::event::EventKind::handled_by(stringify!($name))),*];

        $(fn $name $params $body)*
    };
}
