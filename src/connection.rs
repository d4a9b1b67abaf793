//! One bound connection to a physical device's control surfaces.

use crate::backend::{ControlSurface, DeviceEnumerator};
use crate::errors::{ControlError, Result};
use crate::properties::{ControlDomain, Property};
use crate::types::{DeviceIdentity, PropertyRange, PropertySetting};

/// Owns the native control surfaces of one device: the camera-control
/// surface and the video-proc-amp surface, each optional.
///
/// Construction is best-effort and never fails loudly: a device that cannot
/// be located or bound yields a connection with both surfaces absent, so
/// pool lookups can use a uniform try-and-check-validity pattern. Validity
/// is fixed at construction time; a device unplugged afterwards is detected
/// by the failing native calls, not by re-probing.
pub struct DeviceConnection {
    identity: DeviceIdentity,
    camera_control: Option<Box<dyn ControlSurface>>,
    video_proc_amp: Option<Box<dyn ControlSurface>>,
}

impl DeviceConnection {
    /// Bind to the device named by `identity`. Bind failures are logged and
    /// leave the affected surface absent.
    pub fn open(enumerator: &dyn DeviceEnumerator, identity: &DeviceIdentity) -> Self {
        let (camera_control, video_proc_amp) = match enumerator.open_filter(identity) {
            Ok(filter) => (
                filter.control_surface(ControlDomain::CameraControl),
                filter.control_surface(ControlDomain::VideoProcAmp),
            ),
            Err(e) => {
                log::debug!("could not bind filter for {}: {}", identity, e);
                (None, None)
            }
        };

        if camera_control.is_none() && video_proc_amp.is_none() {
            log::debug!("no control surface bound for {}", identity);
        }

        Self {
            identity: identity.clone(),
            camera_control,
            video_proc_amp,
        }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// True iff at least one surface bound at construction time.
    pub fn is_valid(&self) -> bool {
        self.camera_control.is_some() || self.video_proc_amp.is_some()
    }

    fn surface(&self, domain: ControlDomain) -> Result<&dyn ControlSurface> {
        let surface = match domain {
            ControlDomain::CameraControl => self.camera_control.as_deref(),
            ControlDomain::VideoProcAmp => self.video_proc_amp.as_deref(),
        };
        surface.ok_or_else(|| {
            ControlError::device_not_found(format!(
                "no {:?} surface bound for {}",
                domain, self.identity
            ))
        })
    }

    /// Read the current setting of `property`.
    ///
    /// A native failure on a bound surface reads as `PropertyNotSupported`;
    /// whether the device vanished instead is not knowable from the call
    /// alone and is left to the caller to confirm via the enumerator.
    pub fn get(&self, property: Property) -> Result<PropertySetting> {
        self.surface(property.domain())?.get(property.native_id())
    }

    /// Write `setting`. No clamping or validation happens here; callers
    /// validate against a previously fetched range.
    pub fn set(&self, property: Property, setting: PropertySetting) -> Result<()> {
        self.surface(property.domain())?
            .set(property.native_id(), setting)
    }

    /// Query min/max/step/default for `property`.
    pub fn range(&self, property: Property) -> Result<PropertyRange> {
        self.surface(property.domain())?
            .range(property.native_id())
    }
}

impl std::fmt::Debug for DeviceConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceConnection")
            .field("identity", &self.identity)
            .field("camera_control", &self.camera_control.is_some())
            .field("video_proc_amp", &self.video_proc_amp.is_some())
            .finish()
    }
}
