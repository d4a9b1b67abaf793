//! camctl: DirectShow camera property control
//!
//! This crate drives the controllable properties of video capture hardware
//! on Windows: mechanical device control (pan, tilt, zoom, focus, exposure)
//! and signal processing (brightness, contrast, white balance, gain), plus
//! manufacturer-defined vendor property sets reached through the generic
//! extensible-property-set interface.
//!
//! # Features
//! - Pooled per-device native bindings with invalidation and recovery
//! - Range queries with clamp/validate helpers
//! - Vendor property-set access, including proxy-library lifetime handling
//! - Capability scanning across the full property catalog
//! - Hotplug arrival/removal notification
//!
//! # Usage
//! ```rust,ignore
//! use camctl::{global_pool, CameraControlProperty, Property, PropertySetting};
//!
//! let identity = camctl::platform::default_enumerator()
//!     .list_devices()?
//!     .into_iter()
//!     .next()
//!     .expect("a camera is connected");
//!
//! let connection = global_pool().get_or_create(&identity);
//! let range = connection.range(Property::CameraControl(CameraControlProperty::Zoom))?;
//! connection.set(
//!     Property::CameraControl(CameraControlProperty::Zoom),
//!     PropertySetting::manual(range.clamp(150)),
//! )?;
//! ```
pub mod backend;
pub mod config;
pub mod connection;
pub mod errors;
pub mod hotplug;
pub mod platform;
pub mod pool;
pub mod properties;
pub mod scanner;
pub mod types;
pub mod vendor;

// Testing utilities - synthetic backend for offline tests
pub mod testing;

// Re-exports for convenience
pub use backend::{DeviceEnumerator, SUPPORT_GET, SUPPORT_SET};
pub use config::CamCtlConfig;
pub use connection::DeviceConnection;
pub use errors::{ControlError, ErrorKind, Result};
pub use hotplug::{global_monitor, HotplugEvent, HotplugMonitor, PollingHotplugSource};
pub use pool::{global_pool, ConnectionPool};
pub use properties::{
    CameraControlProperty, ControlDomain, Property, VideoProcAmpProperty,
};
pub use scanner::CapabilityScanner;
pub use types::{
    ControlMode, DeviceIdentity, PropertyCapability, PropertyRange, PropertySetting,
    VendorPropertyKey,
};
pub use vendor::{VendorPropertyAccessor, VendorValue};

/// Initialize logging for the control core
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "camctl=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
