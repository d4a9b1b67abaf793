//! Device arrival/removal notification.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::DeviceEnumerator;
use crate::errors::Result;
use crate::platform;

/// One arrival or removal, decoded from the platform notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotplugEvent {
    pub added: bool,
    pub device_path: String,
}

/// Callback wired into a source. Runs on the source's own thread.
pub type HotplugSink = Box<dyn Fn(&HotplugEvent) + Send + Sync>;

/// A platform notification channel. `subscribe` starts delivering events to
/// the sink; dropping the returned subscription tears the channel down.
pub trait HotplugSource: Send + Sync {
    fn subscribe(&self, sink: HotplugSink) -> Result<Box<dyn HotplugSubscription>>;
}

/// Live subscription handle; drop to unsubscribe.
pub trait HotplugSubscription: Send {}

/// At-most-one-registration monitor over a notification source.
///
/// Events are dispatched on whatever thread the source owns, never the
/// registering thread, and may race ordinary property operations; callbacks
/// must treat all core APIs as thread-safe entry points.
pub struct HotplugMonitor {
    source: Arc<dyn HotplugSource>,
    active: Mutex<Option<Box<dyn HotplugSubscription>>>,
}

impl HotplugMonitor {
    pub fn new(source: Arc<dyn HotplugSource>) -> Self {
        Self {
            source,
            active: Mutex::new(None),
        }
    }

    /// Register `callback` for device events.
    ///
    /// While a registration is active, further calls are no-ops with a
    /// warning; the first callback stays wired. A panic escaping the
    /// callback is caught and logged, never propagated into platform event
    /// dispatch.
    pub fn register<F>(&self, callback: F) -> Result<()>
    where
        F: Fn(&HotplugEvent) + Send + Sync + 'static,
    {
        let mut active = self.active.lock().expect("lock poisoned");
        if active.is_some() {
            log::warn!("hotplug callback already registered, ignoring new registration");
            return Ok(());
        }

        let sink: HotplugSink = Box::new(move |event| {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                log::error!(
                    "hotplug callback panicked on {} of {}",
                    if event.added { "arrival" } else { "removal" },
                    event.device_path
                );
            }
        });

        let subscription = self.source.subscribe(sink)?;
        *active = Some(subscription);
        log::info!("hotplug monitoring started");
        Ok(())
    }

    /// Tear down the active subscription. Idempotent.
    pub fn unregister(&self) {
        // The subscription must drop outside the lock: teardown joins the
        // source thread, and an in-flight callback may be calling back into
        // this monitor.
        let subscription = self.active.lock().expect("lock poisoned").take();
        if subscription.is_some() {
            log::info!("hotplug monitoring stopped");
        }
    }

    pub fn is_registered(&self) -> bool {
        self.active.lock().expect("lock poisoned").is_some()
    }
}

/// Fallback source that diffs enumerator snapshots on a worker thread.
///
/// Devices present at subscribe time produce no events; only later
/// arrivals and removals do.
pub struct PollingHotplugSource {
    enumerator: Arc<dyn DeviceEnumerator>,
    interval: Duration,
}

impl PollingHotplugSource {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

    pub fn new(enumerator: Arc<dyn DeviceEnumerator>, interval: Duration) -> Self {
        Self {
            enumerator,
            interval,
        }
    }
}

struct PollingSubscription {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl HotplugSubscription for PollingSubscription {}

impl Drop for PollingSubscription {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn snapshot(devices: Vec<crate::types::DeviceIdentity>) -> HashSet<String> {
    devices
        .into_iter()
        .map(|d| d.key().to_string())
        .collect()
}

impl HotplugSource for PollingHotplugSource {
    fn subscribe(&self, sink: HotplugSink) -> Result<Box<dyn HotplugSubscription>> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let enumerator = Arc::clone(&self.enumerator);
        let interval = self.interval;

        // The baseline is fixed before subscribe returns; devices already
        // present never read as arrivals, however the worker is scheduled.
        let mut known = match enumerator.list_devices() {
            Ok(devices) => snapshot(devices),
            Err(e) => {
                log::warn!("initial device scan failed: {}", e);
                HashSet::new()
            }
        };

        let worker = std::thread::Builder::new()
            .name("camctl-hotplug-poll".into())
            .spawn(move || {
                while !stop_flag.load(Ordering::Relaxed) {
                    std::thread::sleep(interval);
                    if stop_flag.load(Ordering::Relaxed) {
                        break;
                    }

                    let current = match enumerator.list_devices() {
                        Ok(devices) => snapshot(devices),
                        Err(e) => {
                            log::debug!("device scan failed, keeping last snapshot: {}", e);
                            continue;
                        }
                    };

                    for path in known.difference(&current) {
                        log::info!("device removed: {}", path);
                        sink(&HotplugEvent {
                            added: false,
                            device_path: path.clone(),
                        });
                    }
                    for path in current.difference(&known) {
                        log::info!("device arrived: {}", path);
                        sink(&HotplugEvent {
                            added: true,
                            device_path: path.clone(),
                        });
                    }

                    known = current;
                }
            })
            .map_err(|e| crate::errors::ControlError::system(format!("spawn failed: {}", e)))?;

        Ok(Box::new(PollingSubscription {
            stop,
            worker: Some(worker),
        }))
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_MONITOR: HotplugMonitor =
        HotplugMonitor::new(platform::default_hotplug_source());
}

/// The process-wide monitor over the platform's default notification
/// source. Tests construct their own [`HotplugMonitor`] to keep state
/// isolated.
pub fn global_monitor() -> &'static HotplugMonitor {
    &GLOBAL_MONITOR
}
