//! Property identifiers for both control domains and their mapping to the
//! platform control ids.
//!
//! DirectShow splits camera properties across two interfaces:
//! `IAMCameraControl` (mechanical device control) and `IAMVideoProcAmp`
//! (signal processing). The numeric ids below are the values of the
//! `CameraControlProperty` and `VideoProcAmpProperty` platform enums and are
//! part of the wire contract with the driver.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::ControlMode;

/// The two families of controllable properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlDomain {
    /// Mechanical device control: pan, tilt, zoom, focus, exposure.
    CameraControl,
    /// Signal processing: brightness, contrast, white balance, gain.
    VideoProcAmp,
}

/// Properties served by `IAMCameraControl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraControlProperty {
    Pan,
    Tilt,
    Roll,
    Zoom,
    Exposure,
    Iris,
    Focus,
}

impl CameraControlProperty {
    pub const ALL: [CameraControlProperty; 7] = [
        Self::Pan,
        Self::Tilt,
        Self::Roll,
        Self::Zoom,
        Self::Exposure,
        Self::Iris,
        Self::Focus,
    ];

    /// Platform id (`CameraControl_Pan` .. `CameraControl_Focus`).
    pub fn native_id(self) -> i32 {
        match self {
            Self::Pan => 0,
            Self::Tilt => 1,
            Self::Roll => 2,
            Self::Zoom => 3,
            Self::Exposure => 4,
            Self::Iris => 5,
            Self::Focus => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pan => "Pan",
            Self::Tilt => "Tilt",
            Self::Roll => "Roll",
            Self::Zoom => "Zoom",
            Self::Exposure => "Exposure",
            Self::Iris => "Iris",
            Self::Focus => "Focus",
        }
    }
}

impl FromStr for CameraControlProperty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pan" => Ok(Self::Pan),
            "Tilt" => Ok(Self::Tilt),
            "Roll" => Ok(Self::Roll),
            "Zoom" => Ok(Self::Zoom),
            "Exposure" => Ok(Self::Exposure),
            "Iris" => Ok(Self::Iris),
            "Focus" => Ok(Self::Focus),
            _ => Err(()),
        }
    }
}

/// Properties served by `IAMVideoProcAmp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoProcAmpProperty {
    Brightness,
    Contrast,
    Hue,
    Saturation,
    Sharpness,
    Gamma,
    ColorEnable,
    WhiteBalance,
    BacklightCompensation,
    Gain,
}

impl VideoProcAmpProperty {
    pub const ALL: [VideoProcAmpProperty; 10] = [
        Self::Brightness,
        Self::Contrast,
        Self::Hue,
        Self::Saturation,
        Self::Sharpness,
        Self::Gamma,
        Self::ColorEnable,
        Self::WhiteBalance,
        Self::BacklightCompensation,
        Self::Gain,
    ];

    /// Platform id (`VideoProcAmp_Brightness` .. `VideoProcAmp_Gain`).
    pub fn native_id(self) -> i32 {
        match self {
            Self::Brightness => 0,
            Self::Contrast => 1,
            Self::Hue => 2,
            Self::Saturation => 3,
            Self::Sharpness => 4,
            Self::Gamma => 5,
            Self::ColorEnable => 6,
            Self::WhiteBalance => 7,
            Self::BacklightCompensation => 8,
            Self::Gain => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brightness => "Brightness",
            Self::Contrast => "Contrast",
            Self::Hue => "Hue",
            Self::Saturation => "Saturation",
            Self::Sharpness => "Sharpness",
            Self::Gamma => "Gamma",
            Self::ColorEnable => "ColorEnable",
            Self::WhiteBalance => "WhiteBalance",
            Self::BacklightCompensation => "BacklightCompensation",
            Self::Gain => "Gain",
        }
    }
}

impl FromStr for VideoProcAmpProperty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Brightness" => Ok(Self::Brightness),
            "Contrast" => Ok(Self::Contrast),
            "Hue" => Ok(Self::Hue),
            "Saturation" => Ok(Self::Saturation),
            "Sharpness" => Ok(Self::Sharpness),
            "Gamma" => Ok(Self::Gamma),
            "ColorEnable" => Ok(Self::ColorEnable),
            "WhiteBalance" => Ok(Self::WhiteBalance),
            "BacklightCompensation" => Ok(Self::BacklightCompensation),
            "Gain" => Ok(Self::Gain),
            _ => Err(()),
        }
    }
}

/// One property from either domain. The variant selects which native
/// control surface the operation is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    CameraControl(CameraControlProperty),
    VideoProcAmp(VideoProcAmpProperty),
}

impl Property {
    pub fn domain(self) -> ControlDomain {
        match self {
            Self::CameraControl(_) => ControlDomain::CameraControl,
            Self::VideoProcAmp(_) => ControlDomain::VideoProcAmp,
        }
    }

    pub fn native_id(self) -> i32 {
        match self {
            Self::CameraControl(p) => p.native_id(),
            Self::VideoProcAmp(p) => p.native_id(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CameraControl(p) => p.as_str(),
            Self::VideoProcAmp(p) => p.as_str(),
        }
    }

    /// Every property in both domains, camera control first. Scan order of
    /// the capability scanner.
    pub fn all() -> impl Iterator<Item = Property> {
        CameraControlProperty::ALL
            .iter()
            .copied()
            .map(Property::CameraControl)
            .chain(
                VideoProcAmpProperty::ALL
                    .iter()
                    .copied()
                    .map(Property::VideoProcAmp),
            )
    }
}

impl From<CameraControlProperty> for Property {
    fn from(p: CameraControlProperty) -> Self {
        Property::CameraControl(p)
    }
}

impl From<VideoProcAmpProperty> for Property {
    fn from(p: VideoProcAmpProperty) -> Self {
        Property::VideoProcAmp(p)
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Flag words shared by `CameraControl_Flags_*` and `VideoProcAmp_Flags_*`;
// both domains use 0x1 for auto and 0x2 for manual.
pub const FLAG_AUTO: i32 = 0x0001;
pub const FLAG_MANUAL: i32 = 0x0002;

pub fn mode_to_flags(mode: ControlMode) -> i32 {
    match mode {
        ControlMode::Auto => FLAG_AUTO,
        ControlMode::Manual => FLAG_MANUAL,
    }
}

/// Drivers are expected to report exactly one of the two flag bits; an
/// auto bit anywhere in the word wins, everything else reads as manual.
pub fn flags_to_mode(flags: i32) -> ControlMode {
    if flags & FLAG_AUTO != 0 {
        ControlMode::Auto
    } else {
        ControlMode::Manual
    }
}
