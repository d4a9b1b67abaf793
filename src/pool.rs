//! Process-wide cache of device connections.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::backend::DeviceEnumerator;
use crate::connection::DeviceConnection;
use crate::platform;
use crate::types::DeviceIdentity;

/// Cache mapping device identity to an open [`DeviceConnection`], so
/// repeated property operations on one device reuse the native binding
/// instead of paying the bind cost (tens to hundreds of milliseconds)
/// every call.
///
/// One mutex guards the whole map. Operations on this layer are dominated
/// by native I/O latency, not lock contention, so coarse-grained locking
/// keeps the invariants simple. Property calls themselves happen outside
/// the lock, on the returned `Arc`.
pub struct ConnectionPool {
    enumerator: Arc<dyn DeviceEnumerator>,
    connections: Mutex<HashMap<String, Arc<DeviceConnection>>>,
}

impl ConnectionPool {
    pub fn new(enumerator: Arc<dyn DeviceEnumerator>) -> Self {
        Self {
            enumerator,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached connection for `identity`, opening one if the
    /// cache has none or only a stale one.
    ///
    /// Only valid connections are cached: a bind against a missing or busy
    /// device hands the caller an invalid connection to inspect, but never
    /// poisons the cache for later attempts. The returned `Arc` stays
    /// usable across `evict`/`clear_all` on other threads; it just no
    /// longer matches what the pool hands out next.
    pub fn get_or_create(&self, identity: &DeviceIdentity) -> Arc<DeviceConnection> {
        let mut connections = self.connections.lock().expect("lock poisoned");

        if let Some(existing) = connections.get(identity.key()) {
            if existing.is_valid() {
                return Arc::clone(existing);
            }
            log::debug!("cached connection for {} is stale, rebinding", identity);
        }

        let connection = Arc::new(DeviceConnection::open(self.enumerator.as_ref(), identity));
        if connection.is_valid() {
            connections.insert(identity.key().to_string(), Arc::clone(&connection));
        } else {
            // Drop any stale entry rather than caching the failed bind.
            connections.remove(identity.key());
        }
        connection
    }

    /// Remove one entry, for callers that know the device was unplugged.
    /// Returns whether an entry existed.
    pub fn evict(&self, identity: &DeviceIdentity) -> bool {
        let mut connections = self.connections.lock().expect("lock poisoned");
        connections.remove(identity.key()).is_some()
    }

    /// Drop every cached connection. Used for bulk recovery after hotplug
    /// churn; safe to call repeatedly.
    pub fn clear_all(&self) {
        let mut connections = self.connections.lock().expect("lock poisoned");
        if !connections.is_empty() {
            log::info!("clearing {} pooled connection(s)", connections.len());
        }
        connections.clear();
    }

    pub fn len(&self) -> usize {
        self.connections.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_POOL: ConnectionPool = ConnectionPool::new(platform::default_enumerator());
}

/// The process-wide pool over the platform's default enumerator. Tests and
/// embedders that need isolated state construct their own
/// [`ConnectionPool`] instead.
pub fn global_pool() -> &'static ConnectionPool {
    &GLOBAL_POOL
}
