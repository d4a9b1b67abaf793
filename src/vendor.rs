//! Vendor extension property-set access.
//!
//! Manufacturer-defined property sets (identified by a 128-bit set id plus
//! a numeric property id) live outside the two-domain control model and are
//! reached through the platform's generic extensible-property-set
//! interface. Some vendors ship that interface in a proxy library loaded at
//! runtime; the accessor owns that library's lifetime and guarantees the
//! release ordering its address-space mapping requires.

use std::path::Path;

use crate::backend::{DeviceEnumerator, ProxyModule, VendorInterface};
use crate::errors::{ControlError, Result};
use crate::types::{DeviceIdentity, VendorPropertyKey};

pub use crate::backend::{SUPPORT_GET, SUPPORT_SET};

mod sealed {
    pub trait Sealed {}
}

/// Fixed-size scalar payloads for the typed accessor wrappers, encoded in
/// native byte order as the drivers expect.
pub trait VendorValue: sealed::Sealed + Copy + Sized {
    fn to_bytes(self) -> Vec<u8>;
    fn from_bytes(bytes: &[u8]) -> Option<Self>;
}

macro_rules! vendor_value {
    ($($ty:ty),+) => {
        $(
            impl sealed::Sealed for $ty {}

            impl VendorValue for $ty {
                fn to_bytes(self) -> Vec<u8> {
                    self.to_ne_bytes().to_vec()
                }

                fn from_bytes(bytes: &[u8]) -> Option<Self> {
                    Some(<$ty>::from_ne_bytes(bytes.try_into().ok()?))
                }
            }
        )+
    };
}

vendor_value!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// Open session against one device's extensible-property-set interface.
///
/// Construction is hard-fail, unlike [`DeviceConnection`]: vendor access
/// without the capability is meaningless, so a device whose filter does not
/// answer the interface query is an error, not an invalid-but-usable
/// object.
///
/// Field order is load-bearing for teardown: `interface` (and every native
/// object behind it) is released before `proxy`, because the property-set
/// objects execute code mapped from the proxy library.
///
/// [`DeviceConnection`]: crate::connection::DeviceConnection
pub struct VendorPropertyAccessor {
    identity: DeviceIdentity,
    interface: Option<Box<dyn VendorInterface>>,
    proxy: Option<Box<dyn ProxyModule>>,
}

impl VendorPropertyAccessor {
    /// Open the vendor interface on `identity` without a proxy module.
    pub fn open(enumerator: &dyn DeviceEnumerator, identity: &DeviceIdentity) -> Result<Self> {
        Self::open_with_proxy(enumerator, identity, None)
    }

    /// Open the vendor interface, first loading the proxy module at
    /// `proxy_path` when one is given.
    ///
    /// Ordering: the module is loaded before the filter is bound, so the
    /// interface query runs with the proxy's class objects registered. If
    /// the capability turns out to be absent, the bound filter is released
    /// and the module unloaded before the error is surfaced.
    pub fn open_with_proxy(
        enumerator: &dyn DeviceEnumerator,
        identity: &DeviceIdentity,
        proxy_path: Option<&Path>,
    ) -> Result<Self> {
        let proxy = match proxy_path {
            Some(path) => {
                log::debug!("loading vendor proxy module {}", path.display());
                Some(enumerator.load_proxy_module(path)?)
            }
            None => None,
        };

        // From here on, every early return must release filter-derived
        // objects before `proxy` drops. Locals drop in reverse declaration
        // order, which gives exactly that.
        let filter = match enumerator.open_filter(identity) {
            Ok(filter) => filter,
            Err(e) => {
                drop(proxy);
                return Err(e);
            }
        };

        let interface = match filter.vendor_interface() {
            Some(interface) => interface,
            None => {
                drop(filter);
                drop(proxy);
                return Err(ControlError::property_not_supported(format!(
                    "{} does not expose a property-set interface",
                    identity
                )));
            }
        };
        drop(filter);

        Ok(Self {
            identity: identity.clone(),
            interface: Some(interface),
            proxy,
        })
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    fn interface(&self) -> &dyn VendorInterface {
        // Only `drop` takes the interface, so it is present for the whole
        // accessible lifetime.
        self.interface
            .as_deref()
            .expect("vendor interface taken before drop")
    }

    /// Get/set support bits for one property; `SUPPORT_GET` and
    /// `SUPPORT_SET`.
    pub fn query_support(&self, key: &VendorPropertyKey) -> Result<u32> {
        self.interface().query_support(key)
    }

    /// Fetch the raw payload of one property.
    pub fn get_property(&self, key: &VendorPropertyKey) -> Result<Vec<u8>> {
        self.interface().get(key)
    }

    /// Write the raw payload of one property.
    pub fn set_property(&self, key: &VendorPropertyKey, data: &[u8]) -> Result<()> {
        self.interface().set(key, data)
    }

    /// Fetch a property whose payload is exactly one `T`. A payload of any
    /// other size is `InvalidValue`.
    pub fn get_property_typed<T: VendorValue>(&self, key: &VendorPropertyKey) -> Result<T> {
        let bytes = self.get_property(key)?;
        if bytes.len() != std::mem::size_of::<T>() {
            return Err(ControlError::invalid_value(format!(
                "property {:#x}:{} returned {} byte(s), expected {}",
                key.set_id,
                key.property_id,
                bytes.len(),
                std::mem::size_of::<T>()
            )));
        }
        T::from_bytes(&bytes).ok_or_else(|| {
            ControlError::invalid_value(format!(
                "property {:#x}:{} payload could not be decoded",
                key.set_id, key.property_id
            ))
        })
    }

    /// Write a property whose payload is exactly one `T`.
    pub fn set_property_typed<T: VendorValue>(
        &self,
        key: &VendorPropertyKey,
        value: T,
    ) -> Result<()> {
        self.set_property(key, &value.to_bytes())
    }
}

impl Drop for VendorPropertyAccessor {
    fn drop(&mut self) {
        // Property-set objects before the module that maps their code.
        self.interface.take();
        self.proxy.take();
    }
}

impl std::fmt::Debug for VendorPropertyAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorPropertyAccessor")
            .field("identity", &self.identity)
            .field("proxy_loaded", &self.proxy.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_value_round_trip() {
        let bytes = 0x0102_0304_i32.to_bytes();
        assert_eq!(bytes.len(), 4);
        assert_eq!(i32::from_bytes(&bytes), Some(0x0102_0304));
        assert_eq!(i32::from_bytes(&bytes[..2]), None);
    }
}
