//! Capability scanning: which properties a device supports, with ranges and
//! current values.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::DeviceEnumerator;
use crate::connection::DeviceConnection;
use crate::errors::{ControlError, Result};
use crate::properties::{CameraControlProperty, Property, VideoProcAmpProperty};
use crate::types::{DeviceIdentity, PropertyCapability};

/// Builds a full supported/unsupported picture of one device by probing
/// every catalog property in both domains.
///
/// The scanner opens its own [`DeviceConnection`] per refresh rather than
/// borrowing from the pool, so a scan never competes with a caller's cached
/// connection and never leaves a half-probed binding in the cache.
pub struct CapabilityScanner {
    enumerator: Arc<dyn DeviceEnumerator>,
    identity: DeviceIdentity,
    capabilities: HashMap<Property, PropertyCapability>,
}

impl std::fmt::Debug for CapabilityScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityScanner")
            .field("identity", &self.identity)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

impl CapabilityScanner {
    /// A scanner with no results yet; call [`refresh`](Self::refresh) to
    /// populate it.
    pub fn new(enumerator: Arc<dyn DeviceEnumerator>, identity: DeviceIdentity) -> Self {
        Self {
            enumerator,
            identity,
            capabilities: HashMap::new(),
        }
    }

    /// Construct and run the first scan in one step.
    pub fn scan(enumerator: Arc<dyn DeviceEnumerator>, identity: DeviceIdentity) -> Result<Self> {
        let mut scanner = Self::new(enumerator, identity);
        scanner.refresh()?;
        Ok(scanner)
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Re-scan from scratch, replacing all prior results.
    ///
    /// Fails `DeviceNotFound` when the device is no longer enumerable.
    /// Range success is the sole supported/unsupported signal; a failed
    /// current-value fetch is logged and leaves `current` empty without
    /// downgrading support.
    pub fn refresh(&mut self) -> Result<()> {
        let present = self
            .enumerator
            .list_devices()?
            .iter()
            .any(|d| *d == self.identity);
        if !present {
            return Err(ControlError::device_not_found(format!(
                "{} is no longer enumerable",
                self.identity
            )));
        }

        let connection = DeviceConnection::open(self.enumerator.as_ref(), &self.identity);

        let mut capabilities = HashMap::new();
        for property in Property::all() {
            let capability = match connection.range(property) {
                Ok(range) => {
                    let current = match connection.get(property) {
                        Ok(setting) => Some(setting),
                        Err(e) => {
                            log::debug!(
                                "{}: {} range is known but current value failed: {}",
                                self.identity,
                                property,
                                e
                            );
                            None
                        }
                    };
                    PropertyCapability {
                        supported: true,
                        range: Some(range),
                        current,
                    }
                }
                Err(_) => PropertyCapability::default(),
            };
            capabilities.insert(property, capability);
        }

        let supported = capabilities.values().filter(|c| c.supported).count();
        log::info!(
            "scanned {}: {} of {} properties supported",
            self.identity,
            supported,
            capabilities.len()
        );

        self.capabilities = capabilities;
        Ok(())
    }

    /// Capability of one property. Unknown ids answer with the default
    /// unsupported capability; absence is a normal queryable state.
    pub fn capability(&self, property: Property) -> PropertyCapability {
        self.capabilities.get(&property).cloned().unwrap_or_default()
    }

    /// Camera-control properties the last scan found supported, in catalog
    /// order.
    pub fn supported_camera_controls(&self) -> Vec<CameraControlProperty> {
        CameraControlProperty::ALL
            .iter()
            .copied()
            .filter(|p| self.capability(Property::CameraControl(*p)).supported)
            .collect()
    }

    /// Video-proc-amp properties the last scan found supported, in catalog
    /// order.
    pub fn supported_video_proc_amps(&self) -> Vec<VideoProcAmpProperty> {
        VideoProcAmpProperty::ALL
            .iter()
            .copied()
            .filter(|p| self.capability(Property::VideoProcAmp(*p)).supported)
            .collect()
    }
}
