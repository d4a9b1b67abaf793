//! In-memory stand-ins for the native enumerator, control surfaces, vendor
//! interface, and hotplug channel.
//!
//! Surfaces echo state: a `set` followed by a `get` observes the written
//! setting. The vendor teardown log records release order so tests can
//! assert that property-set objects go away before the proxy module.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::backend::{
    ControlSurface, DeviceEnumerator, DeviceFilter, ProxyModule, VendorInterface,
};
use crate::errors::{ControlError, Result};
use crate::hotplug::{HotplugEvent, HotplugSink, HotplugSource, HotplugSubscription};
use crate::properties::{ControlDomain, Property};
use crate::types::{DeviceIdentity, PropertyRange, PropertySetting, VendorPropertyKey};

#[derive(Clone)]
struct PropertyState {
    range: PropertyRange,
    setting: PropertySetting,
    fail_get: bool,
}

#[derive(Clone)]
struct VendorProperty {
    data: Vec<u8>,
    flags: u32,
    fail_fetch: bool,
}

struct DeviceState {
    identity: DeviceIdentity,
    camera_control: bool,
    video_proc_amp: bool,
    vendor: bool,
    properties: HashMap<(ControlDomain, i32), PropertyState>,
    vendor_properties: HashMap<VendorPropertyKey, VendorProperty>,
}

/// Builder for one scripted device.
pub struct SyntheticDevice {
    state: DeviceState,
}

impl SyntheticDevice {
    pub fn new(identity: DeviceIdentity) -> Self {
        Self {
            state: DeviceState {
                identity,
                camera_control: true,
                video_proc_amp: true,
                vendor: false,
                properties: HashMap::new(),
                vendor_properties: HashMap::new(),
            },
        }
    }

    /// Declare a supported property with its range, initialized to the
    /// range default.
    pub fn with_property(mut self, property: Property, range: PropertyRange) -> Self {
        self.state.properties.insert(
            (property.domain(), property.native_id()),
            PropertyState {
                range,
                setting: PropertySetting {
                    value: range.default_value,
                    mode: range.default_mode,
                },
                fail_get: false,
            },
        );
        self
    }

    /// Like `with_property`, but every current-value read fails while the
    /// range stays readable. Models drivers that report ranges for stalled
    /// controls.
    pub fn with_unreadable_property(mut self, property: Property, range: PropertyRange) -> Self {
        self = self.with_property(property, range);
        self.state
            .properties
            .get_mut(&(property.domain(), property.native_id()))
            .expect("property just inserted")
            .fail_get = true;
        self
    }

    /// Remove the camera-control surface entirely.
    pub fn without_camera_control(mut self) -> Self {
        self.state.camera_control = false;
        self
    }

    /// Remove the video-proc-amp surface entirely.
    pub fn without_video_proc_amp(mut self) -> Self {
        self.state.video_proc_amp = false;
        self
    }

    /// Expose the vendor property-set interface.
    pub fn with_vendor_interface(mut self) -> Self {
        self.state.vendor = true;
        self
    }

    /// Declare one vendor property with payload and support flags. Implies
    /// `with_vendor_interface`.
    pub fn with_vendor_property(
        mut self,
        key: VendorPropertyKey,
        data: Vec<u8>,
        flags: u32,
    ) -> Self {
        self.state.vendor = true;
        self.state.vendor_properties.insert(
            key,
            VendorProperty {
                data,
                flags,
                fail_fetch: false,
            },
        );
        self
    }

    /// Declare a vendor property whose data fetch fails after the size
    /// query succeeded.
    pub fn with_failing_vendor_property(
        mut self,
        key: VendorPropertyKey,
        data: Vec<u8>,
        flags: u32,
    ) -> Self {
        self = self.with_vendor_property(key, data, flags);
        self.state
            .vendor_properties
            .get_mut(&key)
            .expect("vendor property just inserted")
            .fail_fetch = true;
        self
    }
}

/// Scriptable enumerator over synthetic devices. Devices can be attached
/// and detached while the enumerator is live, which is how hotplug polling
/// tests drive arrivals and removals.
#[derive(Clone)]
pub struct SyntheticEnumerator {
    devices: Arc<Mutex<Vec<Arc<Mutex<DeviceState>>>>>,
    teardown_log: Arc<Mutex<Vec<String>>>,
    fail_listing: Arc<Mutex<bool>>,
}

impl SyntheticEnumerator {
    pub fn new() -> Self {
        Self {
            devices: Arc::new(Mutex::new(Vec::new())),
            teardown_log: Arc::new(Mutex::new(Vec::new())),
            fail_listing: Arc::new(Mutex::new(false)),
        }
    }

    pub fn attach(&self, device: SyntheticDevice) {
        self.devices
            .lock()
            .expect("lock poisoned")
            .push(Arc::new(Mutex::new(device.state)));
    }

    /// Detach the device whose identity key matches. Existing bound
    /// surfaces keep working against the shared state, mirroring how an
    /// unplugged device's COM pointers stay callable (and failing) until
    /// released.
    pub fn detach(&self, key: &str) -> bool {
        let mut devices = self.devices.lock().expect("lock poisoned");
        let before = devices.len();
        devices.retain(|d| d.lock().expect("lock poisoned").identity.key() != key);
        devices.len() != before
    }

    /// Make `list_devices` fail until re-enabled; for exercising scan
    /// error paths.
    pub fn set_listing_failure(&self, fail: bool) {
        *self.fail_listing.lock().expect("lock poisoned") = fail;
    }

    /// Release-order log: vendor interfaces push `interface:release`,
    /// proxy modules push `proxy:unload`.
    pub fn teardown_log(&self) -> Vec<String> {
        self.teardown_log.lock().expect("lock poisoned").clone()
    }

    fn find(&self, identity: &DeviceIdentity) -> Option<Arc<Mutex<DeviceState>>> {
        self.devices
            .lock()
            .expect("lock poisoned")
            .iter()
            .find(|d| d.lock().expect("lock poisoned").identity == *identity)
            .cloned()
    }
}

impl Default for SyntheticEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceEnumerator for SyntheticEnumerator {
    fn list_devices(&self) -> Result<Vec<DeviceIdentity>> {
        if *self.fail_listing.lock().expect("lock poisoned") {
            return Err(ControlError::system("synthetic listing failure"));
        }
        Ok(self
            .devices
            .lock()
            .expect("lock poisoned")
            .iter()
            .map(|d| d.lock().expect("lock poisoned").identity.clone())
            .collect())
    }

    fn open_filter(&self, identity: &DeviceIdentity) -> Result<Box<dyn DeviceFilter>> {
        let state = self.find(identity).ok_or_else(|| {
            ControlError::device_not_found(format!("no synthetic device matches {}", identity))
        })?;
        Ok(Box::new(SyntheticFilter {
            state,
            teardown_log: Arc::clone(&self.teardown_log),
        }))
    }

    fn load_proxy_module(&self, path: &Path) -> Result<Box<dyn ProxyModule>> {
        Ok(Box::new(SyntheticProxyModule {
            path: path.display().to_string(),
            teardown_log: Arc::clone(&self.teardown_log),
        }))
    }
}

struct SyntheticFilter {
    state: Arc<Mutex<DeviceState>>,
    teardown_log: Arc<Mutex<Vec<String>>>,
}

impl DeviceFilter for SyntheticFilter {
    fn control_surface(&self, domain: ControlDomain) -> Option<Box<dyn ControlSurface>> {
        let bound = {
            let state = self.state.lock().expect("lock poisoned");
            match domain {
                ControlDomain::CameraControl => state.camera_control,
                ControlDomain::VideoProcAmp => state.video_proc_amp,
            }
        };
        if !bound {
            return None;
        }
        Some(Box::new(SyntheticSurface {
            state: Arc::clone(&self.state),
            domain,
        }))
    }

    fn vendor_interface(&self) -> Option<Box<dyn VendorInterface>> {
        if !self.state.lock().expect("lock poisoned").vendor {
            return None;
        }
        Some(Box::new(SyntheticVendorInterface {
            state: Arc::clone(&self.state),
            teardown_log: Arc::clone(&self.teardown_log),
        }))
    }
}

struct SyntheticSurface {
    state: Arc<Mutex<DeviceState>>,
    domain: ControlDomain,
}

impl ControlSurface for SyntheticSurface {
    fn get(&self, native_id: i32) -> Result<PropertySetting> {
        let state = self.state.lock().expect("lock poisoned");
        let prop = state
            .properties
            .get(&(self.domain, native_id))
            .ok_or_else(|| {
                ControlError::property_not_supported(format!(
                    "{:?} property {} not supported",
                    self.domain, native_id
                ))
            })?;
        if prop.fail_get {
            return Err(ControlError::property_not_supported(format!(
                "{:?} property {} read failed",
                self.domain, native_id
            )));
        }
        Ok(prop.setting)
    }

    fn set(&self, native_id: i32, setting: PropertySetting) -> Result<()> {
        let mut state = self.state.lock().expect("lock poisoned");
        let prop = state
            .properties
            .get_mut(&(self.domain, native_id))
            .ok_or_else(|| {
                ControlError::property_not_supported(format!(
                    "{:?} property {} not supported",
                    self.domain, native_id
                ))
            })?;
        prop.setting = setting;
        Ok(())
    }

    fn range(&self, native_id: i32) -> Result<PropertyRange> {
        let state = self.state.lock().expect("lock poisoned");
        state
            .properties
            .get(&(self.domain, native_id))
            .map(|p| p.range)
            .ok_or_else(|| {
                ControlError::property_not_supported(format!(
                    "{:?} property {} not supported",
                    self.domain, native_id
                ))
            })
    }
}

struct SyntheticVendorInterface {
    state: Arc<Mutex<DeviceState>>,
    teardown_log: Arc<Mutex<Vec<String>>>,
}

impl VendorInterface for SyntheticVendorInterface {
    fn query_support(&self, key: &VendorPropertyKey) -> Result<u32> {
        let state = self.state.lock().expect("lock poisoned");
        state
            .vendor_properties
            .get(key)
            .map(|p| p.flags)
            .ok_or_else(|| {
                ControlError::property_not_supported(format!(
                    "vendor property {:#x}:{} not supported",
                    key.set_id, key.property_id
                ))
            })
    }

    fn get(&self, key: &VendorPropertyKey) -> Result<Vec<u8>> {
        let state = self.state.lock().expect("lock poisoned");
        let prop = state.vendor_properties.get(key).ok_or_else(|| {
            // Size-query phase: an unknown property fails here.
            ControlError::property_not_supported(format!(
                "vendor property {:#x}:{} not supported",
                key.set_id, key.property_id
            ))
        })?;
        if prop.fail_fetch {
            return Err(ControlError::system(format!(
                "vendor property {:#x}:{} fetch failed",
                key.set_id, key.property_id
            )));
        }
        Ok(prop.data.clone())
    }

    fn set(&self, key: &VendorPropertyKey, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock().expect("lock poisoned");
        let prop = state.vendor_properties.get_mut(key).ok_or_else(|| {
            ControlError::property_not_supported(format!(
                "vendor property {:#x}:{} not supported",
                key.set_id, key.property_id
            ))
        })?;
        prop.data = data.to_vec();
        Ok(())
    }
}

impl Drop for SyntheticVendorInterface {
    fn drop(&mut self) {
        self.teardown_log
            .lock()
            .expect("lock poisoned")
            .push("interface:release".to_string());
    }
}

/// Fake proxy module whose unload is observable through the teardown log.
pub struct SyntheticProxyModule {
    path: String,
    teardown_log: Arc<Mutex<Vec<String>>>,
}

impl ProxyModule for SyntheticProxyModule {}

impl Drop for SyntheticProxyModule {
    fn drop(&mut self) {
        log::debug!("unloading synthetic proxy module {}", self.path);
        self.teardown_log
            .lock()
            .expect("lock poisoned")
            .push("proxy:unload".to_string());
    }
}

/// Hotplug source driven directly by the test through [`emit`].
///
/// [`emit`]: SyntheticHotplugSource::emit
#[derive(Clone)]
pub struct SyntheticHotplugSource {
    sink: Arc<Mutex<Option<HotplugSink>>>,
}

impl SyntheticHotplugSource {
    pub fn new() -> Self {
        Self {
            sink: Arc::new(Mutex::new(None)),
        }
    }

    /// Deliver one event to the subscribed sink, synchronously on the
    /// calling thread. Dropped silently when nothing is subscribed, like a
    /// notification arriving after unregistration.
    pub fn emit(&self, event: &HotplugEvent) {
        if let Some(sink) = self.sink.lock().expect("lock poisoned").as_ref() {
            sink(event);
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.sink.lock().expect("lock poisoned").is_some()
    }
}

impl Default for SyntheticHotplugSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HotplugSource for SyntheticHotplugSource {
    fn subscribe(&self, sink: HotplugSink) -> Result<Box<dyn HotplugSubscription>> {
        *self.sink.lock().expect("lock poisoned") = Some(sink);
        Ok(Box::new(SyntheticSubscription {
            sink: Arc::clone(&self.sink),
        }))
    }
}

struct SyntheticSubscription {
    sink: Arc<Mutex<Option<HotplugSink>>>,
}

impl HotplugSubscription for SyntheticSubscription {}

impl Drop for SyntheticSubscription {
    fn drop(&mut self) {
        *self.sink.lock().expect("lock poisoned") = None;
    }
}
