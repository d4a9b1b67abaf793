//! Testing utilities for camctl
//!
//! Provides a synthetic in-memory backend implementing the platform seam,
//! so connection, pooling, vendor, scanner, and hotplug logic can be
//! exercised without camera hardware.

pub mod synthetic;

pub use synthetic::{
    SyntheticDevice, SyntheticEnumerator, SyntheticHotplugSource, SyntheticProxyModule,
};
