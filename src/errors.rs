use thiserror::Error;

/// Failure categories for camera control operations.
///
/// Success is not a variant: a successful operation is the `Ok` arm of
/// [`Result`]. Every error carries exactly one kind, chosen at the failure
/// site and propagated unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    DeviceNotFound,
    DeviceBusy,
    PropertyNotSupported,
    InvalidValue,
    PermissionDenied,
    SystemError,
    InvalidArgument,
    NotImplemented,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ControlError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ControlError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn device_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeviceNotFound, message)
    }

    pub fn device_busy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeviceBusy, message)
    }

    pub fn property_not_supported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PropertyNotSupported, message)
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidValue, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SystemError, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, message)
    }
}

pub type Result<T> = std::result::Result<T, ControlError>;
