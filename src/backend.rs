//! Platform seam: the interfaces the core consumes instead of talking to
//! the multimedia framework directly.
//!
//! The Windows backend in `platform::windows` implements these over
//! DirectShow; the synthetic backend in `testing` implements them over
//! in-memory state so the lifecycle and pooling logic can be exercised
//! offline.

use std::path::Path;

use crate::errors::{ControlError, Result};
use crate::properties::ControlDomain;
use crate::types::{DeviceIdentity, PropertyRange, PropertySetting, VendorPropertyKey};

/// A native control surface bound to one device, serving one property
/// domain. Implementations translate between [`PropertySetting`] and the
/// platform's value+flags calling convention.
///
/// Calls on one surface are not serialized by the crate; concurrent use of
/// a single device is the caller's responsibility.
pub trait ControlSurface: Send + Sync {
    fn get(&self, native_id: i32) -> Result<PropertySetting>;
    fn set(&self, native_id: i32, setting: PropertySetting) -> Result<()>;
    fn range(&self, native_id: i32) -> Result<PropertyRange>;
}

/// A bound native filter object for one physical device. Control surfaces
/// and the vendor interface are interface queries against the same filter;
/// absence of an interface is a property of the driver, not an error.
pub trait DeviceFilter: Send {
    fn control_surface(&self, domain: ControlDomain) -> Option<Box<dyn ControlSurface>>;
    fn vendor_interface(&self) -> Option<Box<dyn VendorInterface>>;
}

/// Generic extensible-property-set access (`IKsPropertySet` on Windows).
pub trait VendorInterface: Send + Sync {
    /// Support flag word for one property; see [`SUPPORT_GET`] and
    /// [`SUPPORT_SET`].
    fn query_support(&self, key: &VendorPropertyKey) -> Result<u32>;
    fn get(&self, key: &VendorPropertyKey) -> Result<Vec<u8>>;
    fn set(&self, key: &VendorPropertyKey, data: &[u8]) -> Result<()>;
}

/// The property can be read (`KSPROPERTY_SUPPORT_GET`).
pub const SUPPORT_GET: u32 = 0x1;
/// The property can be written (`KSPROPERTY_SUPPORT_SET`).
pub const SUPPORT_SET: u32 = 0x2;

/// An optional dynamically loaded proxy module backing a vendor property
/// set. Dropping the box unloads the library, so every native object
/// obtained while it was loaded must already be released by then.
pub trait ProxyModule: Send {}

/// Enumeration and binding entry point for one platform backend.
pub trait DeviceEnumerator: Send + Sync {
    /// Currently present devices of the capture category.
    fn list_devices(&self) -> Result<Vec<DeviceIdentity>>;

    /// Bind the native filter for `identity`. `DeviceNotFound` when no
    /// present device matches.
    fn open_filter(&self, identity: &DeviceIdentity) -> Result<Box<dyn DeviceFilter>>;

    /// Load a vendor proxy module. Backends without dynamic loading keep
    /// the default.
    fn load_proxy_module(&self, path: &Path) -> Result<Box<dyn ProxyModule>> {
        Err(ControlError::not_implemented(format!(
            "proxy module loading is not available on this backend: {}",
            path.display()
        )))
    }
}
