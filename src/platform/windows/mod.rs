//! DirectShow backend: device enumeration, filter binding, and the
//! IAMCameraControl / IAMVideoProcAmp / IKsPropertySet surfaces.

pub mod hotplug;

use std::cell::Cell;
use std::ffi::c_void;
use std::path::Path;

use windows::core::{Interface, GUID, HSTRING, PCWSTR};
use windows::Win32::Foundation::HMODULE;
use windows::Win32::Media::DirectShow::{
    IAMCameraControl, IAMVideoProcAmp, IBaseFilter, ICreateDevEnum, IKsPropertySet,
    CLSID_SystemDeviceEnum, CLSID_VideoInputDeviceCategory,
};
use windows::Win32::System::Com::StructuredStorage::IPropertyBag;
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, IEnumMoniker, IMoniker, CLSCTX_INPROC_SERVER,
    COINIT_MULTITHREADED,
};
use windows::Win32::System::LibraryLoader::{FreeLibrary, LoadLibraryW};
use windows::Win32::System::Variant::{VariantClear, VARIANT, VT_BSTR};

use crate::backend::{
    ControlSurface, DeviceEnumerator, DeviceFilter, ProxyModule, VendorInterface,
};
use crate::errors::{ControlError, Result};
use crate::properties::{flags_to_mode, mode_to_flags, ControlDomain};
use crate::types::{
    ControlMode, DeviceIdentity, PropertyRange, PropertySetting, VendorPropertyKey,
};

thread_local! {
    static COM_READY: Cell<bool> = const { Cell::new(false) };
}

/// Bring COM up on the calling thread. S_FALSE and RPC_E_CHANGED_MODE both
/// mean an apartment already exists, which is fine for our purposes.
fn ensure_com() {
    COM_READY.with(|ready| {
        if !ready.get() {
            unsafe {
                let _ = CoInitializeEx(None, COINIT_MULTITHREADED);
            }
            ready.set(true);
        }
    });
}

/// Enumerates capture devices through the system device enumerator and
/// binds their filters.
pub struct DirectShowEnumerator;

impl DirectShowEnumerator {
    pub fn new() -> Self {
        Self
    }

    fn class_enumerator(&self) -> Result<Option<IEnumMoniker>> {
        ensure_com();
        unsafe {
            let dev_enum: ICreateDevEnum =
                CoCreateInstance(&CLSID_SystemDeviceEnum, None, CLSCTX_INPROC_SERVER)
                    .map_err(|e| {
                        ControlError::system(format!("system device enumerator: {}", e))
                    })?;

            let mut monikers: Option<IEnumMoniker> = None;
            // S_FALSE with a null enumerator means the category is empty.
            dev_enum
                .CreateClassEnumerator(&CLSID_VideoInputDeviceCategory, &mut monikers, 0)
                .map_err(|e| {
                    ControlError::system(format!("video input class enumerator: {}", e))
                })?;
            Ok(monikers)
        }
    }

    fn for_each_moniker<T>(
        &self,
        mut visit: impl FnMut(&IMoniker, DeviceIdentity) -> Option<T>,
    ) -> Result<Option<T>> {
        let Some(monikers) = self.class_enumerator()? else {
            return Ok(None);
        };

        loop {
            let mut slot: [Option<IMoniker>; 1] = [None];
            let fetched = unsafe { monikers.Next(&mut slot, None) };
            if fetched.is_err() || slot[0].is_none() {
                return Ok(None);
            }
            let moniker = slot[0].take().expect("moniker fetched");

            let identity = match unsafe { read_identity(&moniker) } {
                Ok(identity) => identity,
                Err(e) => {
                    log::debug!("skipping moniker without readable identity: {}", e);
                    continue;
                }
            };

            if let Some(found) = visit(&moniker, identity) {
                return Ok(Some(found));
            }
        }
    }
}

impl Default for DirectShowEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceEnumerator for DirectShowEnumerator {
    fn list_devices(&self) -> Result<Vec<DeviceIdentity>> {
        let mut devices = Vec::new();
        self.for_each_moniker::<()>(|_, identity| {
            devices.push(identity);
            None
        })?;
        log::debug!("enumerated {} capture device(s)", devices.len());
        Ok(devices)
    }

    fn open_filter(&self, identity: &DeviceIdentity) -> Result<Box<dyn DeviceFilter>> {
        let filter = self.for_each_moniker(|moniker, candidate| {
            if candidate != *identity {
                return None;
            }
            match unsafe { bind_filter(moniker) } {
                Ok(filter) => Some(filter),
                Err(e) => {
                    log::warn!("matched {} but filter bind failed: {}", identity, e);
                    None
                }
            }
        })?;

        match filter {
            Some(filter) => Ok(Box::new(DirectShowFilter { filter })),
            None => Err(ControlError::device_not_found(format!(
                "no capture device matches {}",
                identity
            ))),
        }
    }

    fn load_proxy_module(&self, path: &Path) -> Result<Box<dyn ProxyModule>> {
        let wide = HSTRING::from(path.as_os_str());
        let handle = unsafe { LoadLibraryW(PCWSTR(wide.as_ptr())) }.map_err(|e| {
            ControlError::system(format!("LoadLibrary({}) failed: {}", path.display(), e))
        })?;
        log::info!("loaded vendor proxy module {}", path.display());
        Ok(Box::new(Win32ProxyModule { handle }))
    }
}

/// Read FriendlyName and DevicePath from the moniker's property bag. A
/// missing DevicePath (virtual cameras) leaves the path empty and identity
/// matching falls back to the name.
unsafe fn read_identity(moniker: &IMoniker) -> windows::core::Result<DeviceIdentity> {
    let mut raw: *mut c_void = std::ptr::null_mut();
    moniker.BindToStorage(None, None, &IPropertyBag::IID, &mut raw)?;
    let bag = IPropertyBag::from_raw(raw);

    let name = read_bag_string(&bag, windows::core::w!("FriendlyName")).unwrap_or_default();
    let path = read_bag_string(&bag, windows::core::w!("DevicePath")).unwrap_or_default();
    Ok(DeviceIdentity::new(name, path))
}

unsafe fn read_bag_string(bag: &IPropertyBag, name: PCWSTR) -> Option<String> {
    let mut variant = VARIANT::default();
    if bag.Read(name, &mut variant, None).is_err() {
        return None;
    }
    let value = if variant.Anonymous.Anonymous.vt == VT_BSTR {
        Some(variant.Anonymous.Anonymous.Anonymous.bstrVal.to_string())
    } else {
        None
    };
    let _ = VariantClear(&mut variant);
    value
}

unsafe fn bind_filter(moniker: &IMoniker) -> windows::core::Result<IBaseFilter> {
    let mut raw: *mut c_void = std::ptr::null_mut();
    moniker.BindToObject(None, None, &IBaseFilter::IID, &mut raw)?;
    Ok(IBaseFilter::from_raw(raw))
}

/// A bound capture filter. Control surfaces and the vendor interface are
/// interface queries against it; each query failure just reads as absence.
struct DirectShowFilter {
    filter: IBaseFilter,
}

// The filter is only used for interface queries; the COM pointers involved
// are free-threaded for the capture drivers this crate targets.
unsafe impl Send for DirectShowFilter {}

impl DeviceFilter for DirectShowFilter {
    fn control_surface(&self, domain: ControlDomain) -> Option<Box<dyn ControlSurface>> {
        match domain {
            ControlDomain::CameraControl => self
                .filter
                .cast::<IAMCameraControl>()
                .ok()
                .map(|iface| Box::new(CameraControlSurface { iface }) as Box<dyn ControlSurface>),
            ControlDomain::VideoProcAmp => self
                .filter
                .cast::<IAMVideoProcAmp>()
                .ok()
                .map(|iface| Box::new(VideoProcAmpSurface { iface }) as Box<dyn ControlSurface>),
        }
    }

    fn vendor_interface(&self) -> Option<Box<dyn VendorInterface>> {
        self.filter
            .cast::<IKsPropertySet>()
            .ok()
            .map(|iface| Box::new(KsPropertySetInterface { iface }) as Box<dyn VendorInterface>)
    }
}

struct CameraControlSurface {
    iface: IAMCameraControl,
}

unsafe impl Send for CameraControlSurface {}
unsafe impl Sync for CameraControlSurface {}

impl ControlSurface for CameraControlSurface {
    fn get(&self, native_id: i32) -> Result<PropertySetting> {
        let mut value = 0i32;
        let mut flags = 0i32;
        unsafe { self.iface.Get(native_id, &mut value, &mut flags) }.map_err(|e| {
            ControlError::property_not_supported(format!(
                "CameraControl::Get({}) failed: {}",
                native_id, e
            ))
        })?;
        Ok(PropertySetting {
            value,
            mode: flags_to_mode(flags),
        })
    }

    fn set(&self, native_id: i32, setting: PropertySetting) -> Result<()> {
        unsafe {
            self.iface
                .Set(native_id, setting.value, mode_to_flags(setting.mode))
        }
        .map_err(|e| {
            ControlError::property_not_supported(format!(
                "CameraControl::Set({}) failed: {}",
                native_id, e
            ))
        })
    }

    fn range(&self, native_id: i32) -> Result<PropertyRange> {
        let (mut min, mut max, mut step, mut default, mut caps) = (0i32, 0i32, 0i32, 0i32, 0i32);
        unsafe {
            self.iface.GetRange(
                native_id,
                &mut min,
                &mut max,
                &mut step,
                &mut default,
                &mut caps,
            )
        }
        .map_err(|e| {
            ControlError::property_not_supported(format!(
                "CameraControl::GetRange({}) failed: {}",
                native_id, e
            ))
        })?;
        Ok(PropertyRange {
            min,
            max,
            step,
            default_value: default,
            default_mode: caps_default_mode(caps),
        })
    }
}

struct VideoProcAmpSurface {
    iface: IAMVideoProcAmp,
}

unsafe impl Send for VideoProcAmpSurface {}
unsafe impl Sync for VideoProcAmpSurface {}

impl ControlSurface for VideoProcAmpSurface {
    fn get(&self, native_id: i32) -> Result<PropertySetting> {
        let mut value = 0i32;
        let mut flags = 0i32;
        unsafe { self.iface.Get(native_id, &mut value, &mut flags) }.map_err(|e| {
            ControlError::property_not_supported(format!(
                "VideoProcAmp::Get({}) failed: {}",
                native_id, e
            ))
        })?;
        Ok(PropertySetting {
            value,
            mode: flags_to_mode(flags),
        })
    }

    fn set(&self, native_id: i32, setting: PropertySetting) -> Result<()> {
        unsafe {
            self.iface
                .Set(native_id, setting.value, mode_to_flags(setting.mode))
        }
        .map_err(|e| {
            ControlError::property_not_supported(format!(
                "VideoProcAmp::Set({}) failed: {}",
                native_id, e
            ))
        })
    }

    fn range(&self, native_id: i32) -> Result<PropertyRange> {
        let (mut min, mut max, mut step, mut default, mut caps) = (0i32, 0i32, 0i32, 0i32, 0i32);
        unsafe {
            self.iface.GetRange(
                native_id,
                &mut min,
                &mut max,
                &mut step,
                &mut default,
                &mut caps,
            )
        }
        .map_err(|e| {
            ControlError::property_not_supported(format!(
                "VideoProcAmp::GetRange({}) failed: {}",
                native_id, e
            ))
        })?;
        Ok(PropertyRange {
            min,
            max,
            step,
            default_value: default,
            default_mode: caps_default_mode(caps),
        })
    }
}

/// Caps flags share the auto/manual bit layout with the per-call flags.
fn caps_default_mode(caps: i32) -> ControlMode {
    flags_to_mode(caps)
}

struct KsPropertySetInterface {
    iface: IKsPropertySet,
}

unsafe impl Send for KsPropertySetInterface {}
unsafe impl Sync for KsPropertySetInterface {}

impl VendorInterface for KsPropertySetInterface {
    fn query_support(&self, key: &VendorPropertyKey) -> Result<u32> {
        let guid = GUID::from_u128(key.set_id);
        let mut support = 0u32;
        unsafe {
            self.iface
                .QuerySupported(&guid, key.property_id, &mut support)
        }
        .map_err(|e| {
            ControlError::property_not_supported(format!(
                "QuerySupported({:#x}:{}) failed: {}",
                key.set_id, key.property_id, e
            ))
        })?;
        Ok(support)
    }

    fn get(&self, key: &VendorPropertyKey) -> Result<Vec<u8>> {
        let guid = GUID::from_u128(key.set_id);

        // Phase one: ask for the payload size with a null buffer. Failure
        // here means the property set or id is unsupported.
        let mut needed = 0u32;
        unsafe {
            self.iface
                .Get(&guid, key.property_id, None, 0, None, 0, &mut needed)
        }
        .map_err(|e| {
            ControlError::property_not_supported(format!(
                "property {:#x}:{} size query failed: {}",
                key.set_id, key.property_id, e
            ))
        })?;

        if needed == 0 {
            return Ok(Vec::new());
        }

        // Phase two: fetch into a buffer of the reported size. Failure here
        // is a driver-side fault, not a support question.
        let mut data = vec![0u8; needed as usize];
        let mut returned = 0u32;
        unsafe {
            self.iface.Get(
                &guid,
                key.property_id,
                None,
                0,
                Some(data.as_mut_ptr() as *mut c_void),
                data.len() as u32,
                &mut returned,
            )
        }
        .map_err(|e| {
            ControlError::system(format!(
                "property {:#x}:{} fetch failed: {}",
                key.set_id, key.property_id, e
            ))
        })?;

        data.truncate(returned as usize);
        Ok(data)
    }

    fn set(&self, key: &VendorPropertyKey, data: &[u8]) -> Result<()> {
        let guid = GUID::from_u128(key.set_id);
        unsafe {
            self.iface.Set(
                &guid,
                key.property_id,
                None,
                0,
                Some(data.as_ptr() as *const c_void),
                data.len() as u32,
            )
        }
        .map_err(|e| {
            ControlError::system(format!(
                "property {:#x}:{} write failed: {}",
                key.set_id, key.property_id, e
            ))
        })
    }
}

/// A loaded vendor proxy library. Dropping unloads it, so it must outlive
/// every property-set object created while it was mapped; the vendor
/// accessor's field order enforces that.
struct Win32ProxyModule {
    handle: HMODULE,
}

unsafe impl Send for Win32ProxyModule {}

impl ProxyModule for Win32ProxyModule {}

impl Drop for Win32ProxyModule {
    fn drop(&mut self) {
        unsafe {
            let _ = FreeLibrary(self.handle);
        }
    }
}
