use crate::errors::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use x11rb::protocol::xproto::EventMask;

/// Core protocol event mask bits, as named in the config file.
#[derive(Debug, Clone, Copy, Deserialize)]
pub enum MaskBit {
    KeyPress,
    KeyRelease,
    ButtonPress,
    ButtonRelease,
    EnterWindow,
    LeaveWindow,
    PointerMotion,
    PointerMotionHint,
    Button1Motion,
    Button2Motion,
    Button3Motion,
    Button4Motion,
    Button5Motion,
    ButtonMotion,
    KeymapState,
    Exposure,
    VisibilityChange,
    StructureNotify,
    ResizeRedirect,
    SubstructureNotify,
    SubstructureRedirect,
    FocusChange,
    PropertyChange,
    ColorMapChange,
    OwnerGrabButton,
}

impl MaskBit {
    fn to_event_mask(self) -> EventMask {
        match self {
            MaskBit::KeyPress => EventMask::KEY_PRESS,
            MaskBit::KeyRelease => EventMask::KEY_RELEASE,
            MaskBit::ButtonPress => EventMask::BUTTON_PRESS,
            MaskBit::ButtonRelease => EventMask::BUTTON_RELEASE,
            MaskBit::EnterWindow => EventMask::ENTER_WINDOW,
            MaskBit::LeaveWindow => EventMask::LEAVE_WINDOW,
            MaskBit::PointerMotion => EventMask::POINTER_MOTION,
            MaskBit::PointerMotionHint => EventMask::POINTER_MOTION_HINT,
            MaskBit::Button1Motion => EventMask::BUTTON1_MOTION,
            MaskBit::Button2Motion => EventMask::BUTTON2_MOTION,
            MaskBit::Button3Motion => EventMask::BUTTON3_MOTION,
            MaskBit::Button4Motion => EventMask::BUTTON4_MOTION,
            MaskBit::Button5Motion => EventMask::BUTTON5_MOTION,
            MaskBit::ButtonMotion => EventMask::BUTTON_MOTION,
            MaskBit::KeymapState => EventMask::KEYMAP_STATE,
            MaskBit::Exposure => EventMask::EXPOSURE,
            MaskBit::VisibilityChange => EventMask::VISIBILITY_CHANGE,
            MaskBit::StructureNotify => EventMask::STRUCTURE_NOTIFY,
            MaskBit::ResizeRedirect => EventMask::RESIZE_REDIRECT,
            MaskBit::SubstructureNotify => EventMask::SUBSTRUCTURE_NOTIFY,
            MaskBit::SubstructureRedirect => EventMask::SUBSTRUCTURE_REDIRECT,
            MaskBit::FocusChange => EventMask::FOCUS_CHANGE,
            MaskBit::PropertyChange => EventMask::PROPERTY_CHANGE,
            MaskBit::ColorMapChange => EventMask::COLOR_MAP_CHANGE,
            MaskBit::OwnerGrabButton => EventMask::OWNER_GRAB_BUTTON,
        }
    }
}

pub fn mask_from_bits(bits: &[MaskBit]) -> EventMask {
    bits.iter()
        .fold(EventMask::NO_EVENT, |mask, bit| mask | bit.to_event_mask())
}

fn default_mask_bits() -> Vec<MaskBit> {
    vec![MaskBit::SubstructureNotify, MaskBit::SubstructureRedirect]
}

#[derive(Debug, Deserialize)]
struct ConfigData {
    #[serde(default = "default_mask_bits")]
    event_mask: Vec<MaskBit>,
    #[serde(default)]
    debug: bool,
}

pub fn parse_config(input: &str) -> Result<crate::Config, ConfigError> {
    let config_data: ConfigData = ron::from_str(input)?;

    if config_data.event_mask.is_empty() {
        return Err(ConfigError::EmptyEventMask);
    }

    Ok(crate::Config {
        event_mask: mask_from_bits(&config_data.event_mask),
        debug: config_data.debug,
    })
}

/// `$XDG_CONFIG_HOME/xlisten/config.ron`, when a config directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("xlisten").join("config.ron"))
}
