pub mod kind;
pub mod payload;

pub use kind::{EVENT_KIND_COUNT, EventKind, EventKindInfo, MAX_EVENT_CODE, PayloadShape, REGISTRY};
pub use payload::{Envelope, Payload};
