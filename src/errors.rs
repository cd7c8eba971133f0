use crate::event::EventKind;

#[derive(Debug)]
pub enum WmError {
    X11(X11Error),
    Io(std::io::Error),
    Config(ConfigError),
    Capability(CapabilityError),
    AlreadyBootstrapped,
}

#[derive(Debug)]
pub enum X11Error {
    DisplayOpenFailed(String),
    InvalidDisplayName(std::ffi::NulError),
}

#[derive(Debug)]
pub enum ConfigError {
    ParseError(ron::error::SpannedError),
    EmptyEventMask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityError {
    DuplicateHandler(EventKind),
}

impl std::fmt::Display for WmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X11(error) => write!(f, "{}", error),
            Self::Io(error) => write!(f, "{}", error),
            Self::Config(error) => write!(f, "{}", error),
            Self::Capability(error) => write!(f, "{}", error),
            Self::AlreadyBootstrapped => {
                write!(f, "startup negotiation already ran for this listener")
            }
        }
    }
}

impl std::error::Error for WmError {}

impl std::fmt::Display for X11Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DisplayOpenFailed(name) => write!(f, "cannot open display {}", name),
            Self::InvalidDisplayName(err) => write!(f, "invalid display name: {}", err),
        }
    }
}

impl std::error::Error for X11Error {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseError(err) => write!(f, "Failed to parse RON config: {}", err),
            Self::EmptyEventMask => write!(f, "event_mask must name at least one event"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl std::fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateHandler(kind) => {
                write!(f, "handler {} is declared more than once", kind.handler())
            }
        }
    }
}

impl std::error::Error for CapabilityError {}

impl<T: Into<X11Error>> From<T> for WmError {
    fn from(value: T) -> Self {
        Self::X11(value.into())
    }
}

impl From<std::io::Error> for WmError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ConfigError> for WmError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<CapabilityError> for WmError {
    fn from(value: CapabilityError) -> Self {
        Self::Capability(value)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(value: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(value)
    }
}

impl From<std::ffi::NulError> for X11Error {
    fn from(value: std::ffi::NulError) -> Self {
        X11Error::InvalidDisplayName(value)
    }
}
