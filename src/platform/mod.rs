//! Platform backends behind the [`backend`](crate::backend) seam.
//!
//! Only Windows has a real implementation (DirectShow); other platforms get
//! stubs that enumerate nothing, so the core stays linkable everywhere
//! without pretending to a cross-platform abstraction it does not have.

use std::sync::Arc;

use crate::backend::DeviceEnumerator;
use crate::hotplug::HotplugSource;

#[cfg(target_os = "windows")]
pub mod windows;

/// The enumerator for the current platform.
pub fn default_enumerator() -> Arc<dyn DeviceEnumerator> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::DirectShowEnumerator::new())
    }
    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(unsupported::UnsupportedEnumerator)
    }
}

/// The hotplug notification source for the current platform.
pub fn default_hotplug_source() -> Arc<dyn HotplugSource> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::hotplug::DeviceNotificationSource::new())
    }
    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(unsupported::UnsupportedHotplugSource)
    }
}

#[cfg(not(target_os = "windows"))]
mod unsupported {
    use crate::backend::{DeviceEnumerator, DeviceFilter};
    use crate::errors::{ControlError, Result};
    use crate::hotplug::{HotplugSink, HotplugSource, HotplugSubscription};
    use crate::types::DeviceIdentity;

    pub struct UnsupportedEnumerator;

    impl DeviceEnumerator for UnsupportedEnumerator {
        fn list_devices(&self) -> Result<Vec<DeviceIdentity>> {
            Ok(Vec::new())
        }

        fn open_filter(&self, identity: &DeviceIdentity) -> Result<Box<dyn DeviceFilter>> {
            Err(ControlError::not_implemented(format!(
                "camera control for {} is only supported on Windows",
                identity
            )))
        }
    }

    pub struct UnsupportedHotplugSource;

    impl HotplugSource for UnsupportedHotplugSource {
        fn subscribe(&self, _sink: HotplugSink) -> Result<Box<dyn HotplugSubscription>> {
            Err(ControlError::not_implemented(
                "device notifications are only supported on Windows",
            ))
        }
    }
}
