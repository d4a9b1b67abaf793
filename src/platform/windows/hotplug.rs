//! Device arrival/removal notifications through a message-only window.
//!
//! The subscription owns a dedicated thread running a Win32 message loop;
//! `WM_DEVICECHANGE` broadcasts for the camera device-interface class are
//! decoded there and handed to the sink. Callbacks therefore run on this
//! thread, never the registering one.

use std::ffi::c_void;
use std::sync::mpsc;
use std::thread::JoinHandle;

use windows::core::{GUID, PCWSTR};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DispatchMessageW, GetMessageW, GetWindowLongPtrW,
    PostMessageW, PostQuitMessage, RegisterClassW, RegisterDeviceNotificationW,
    SetWindowLongPtrW, TranslateMessage, UnregisterDeviceNotification,
    DBT_DEVICEARRIVAL, DBT_DEVICEREMOVECOMPLETE, DBT_DEVTYP_DEVICEINTERFACE,
    DEVICE_NOTIFY_WINDOW_HANDLE, DEV_BROADCAST_DEVICEINTERFACE_W, DEV_BROADCAST_HDR,
    GWLP_USERDATA, HWND_MESSAGE, MSG, WINDOW_EX_STYLE, WINDOW_STYLE, WM_CLOSE,
    WM_DESTROY, WM_DEVICECHANGE, WNDCLASSW,
};

use crate::errors::{ControlError, Result};
use crate::hotplug::{HotplugEvent, HotplugSink, HotplugSource, HotplugSubscription};

/// `KSCATEGORY_VIDEO_CAMERA`: the device-interface class of capture
/// cameras.
const VIDEO_CAMERA_CLASS: GUID = GUID::from_u128(0xe5323777_f976_4f5b_9b55_b94699c46e44);

const WINDOW_CLASS: PCWSTR = windows::core::w!("camctl-hotplug");

pub struct DeviceNotificationSource;

impl DeviceNotificationSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeviceNotificationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HotplugSource for DeviceNotificationSource {
    fn subscribe(&self, sink: HotplugSink) -> Result<Box<dyn HotplugSubscription>> {
        let (ready_tx, ready_rx) = mpsc::channel::<std::result::Result<isize, String>>();

        let worker = std::thread::Builder::new()
            .name("camctl-hotplug".into())
            .spawn(move || run_message_loop(sink, ready_tx))
            .map_err(|e| ControlError::system(format!("spawn failed: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(hwnd)) => Ok(Box::new(NotificationSubscription {
                hwnd,
                worker: Some(worker),
            })),
            Ok(Err(message)) => {
                let _ = worker.join();
                Err(ControlError::system(message))
            }
            Err(_) => {
                let _ = worker.join();
                Err(ControlError::system(
                    "notification thread exited before reporting readiness",
                ))
            }
        }
    }
}

struct NotificationSubscription {
    // HWND is a raw pointer and not Send; the integer value is.
    hwnd: isize,
    worker: Option<JoinHandle<()>>,
}

impl HotplugSubscription for NotificationSubscription {}

impl Drop for NotificationSubscription {
    fn drop(&mut self) {
        unsafe {
            let _ = PostMessageW(
                HWND(self.hwnd as *mut c_void),
                WM_CLOSE,
                WPARAM(0),
                LPARAM(0),
            );
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_message_loop(sink: HotplugSink, ready: mpsc::Sender<std::result::Result<isize, String>>) {
    unsafe {
        let class = WNDCLASSW {
            lpfnWndProc: Some(wndproc),
            lpszClassName: WINDOW_CLASS,
            ..Default::default()
        };
        // Re-registration after a previous subscription fails harmlessly.
        let _ = RegisterClassW(&class);

        // The sink is double-boxed so a thin pointer fits the window word.
        let sink = Box::new(sink);
        let hwnd = match CreateWindowExW(
            WINDOW_EX_STYLE(0),
            WINDOW_CLASS,
            WINDOW_CLASS,
            WINDOW_STYLE(0),
            0,
            0,
            0,
            0,
            HWND_MESSAGE,
            None,
            None,
            None,
        ) {
            Ok(hwnd) => hwnd,
            Err(e) => {
                let _ = ready.send(Err(format!("notification window: {}", e)));
                return;
            }
        };
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(sink) as isize);

        let filter = DEV_BROADCAST_DEVICEINTERFACE_W {
            dbcc_size: std::mem::size_of::<DEV_BROADCAST_DEVICEINTERFACE_W>() as u32,
            dbcc_devicetype: DBT_DEVTYP_DEVICEINTERFACE.0,
            dbcc_reserved: 0,
            dbcc_classguid: VIDEO_CAMERA_CLASS,
            dbcc_name: [0],
        };
        let notification = match RegisterDeviceNotificationW(
            windows::Win32::Foundation::HANDLE(hwnd.0),
            &filter as *const _ as *const c_void,
            DEVICE_NOTIFY_WINDOW_HANDLE,
        ) {
            Ok(handle) => handle,
            Err(e) => {
                drop(Box::from_raw(
                    GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut HotplugSink
                ));
                let _ = ready.send(Err(format!("RegisterDeviceNotification: {}", e)));
                return;
            }
        };

        let _ = ready.send(Ok(hwnd.0 as isize));
        log::debug!("device notification window running");

        let mut msg = MSG::default();
        while GetMessageW(&mut msg, HWND::default(), 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }

        let _ = UnregisterDeviceNotification(notification);
        drop(Box::from_raw(
            GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut HotplugSink
        ));
    }
}

unsafe extern "system" fn wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_DEVICECHANGE => {
            let added = wparam.0 as u32 == DBT_DEVICEARRIVAL;
            let removed = wparam.0 as u32 == DBT_DEVICEREMOVECOMPLETE;
            if (added || removed) && lparam.0 != 0 {
                let header = lparam.0 as *const DEV_BROADCAST_HDR;
                if (*header).dbch_devicetype == DBT_DEVTYP_DEVICEINTERFACE.0 {
                    let broadcast = lparam.0 as *const DEV_BROADCAST_DEVICEINTERFACE_W;
                    let device_path = decode_broadcast_name(broadcast);
                    let sink = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const HotplugSink;
                    if !sink.is_null() {
                        log::info!(
                            "device {}: {}",
                            if added { "arrived" } else { "removed" },
                            device_path
                        );
                        (*sink)(&HotplugEvent { added, device_path });
                    }
                }
            }
            // TRUE: the event was handled.
            LRESULT(1)
        }
        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

/// `dbcc_name` is a variable-length, nul-terminated wide string that
/// extends past the declared struct; walk it until the terminator.
unsafe fn decode_broadcast_name(broadcast: *const DEV_BROADCAST_DEVICEINTERFACE_W) -> String {
    let name_ptr = std::ptr::addr_of!((*broadcast).dbcc_name) as *const u16;
    let mut len = 0usize;
    while *name_ptr.add(len) != 0 {
        len += 1;
    }
    String::from_utf16_lossy(std::slice::from_raw_parts(name_ptr, len))
}
