mod error_tests {
    use camctl::errors::{ControlError, ErrorKind, Result};
    use std::error::Error;

    #[test]
    fn test_error_display_is_the_message() {
        let error = ControlError::device_not_found("no device matches \\\\?\\usb#cam");
        assert_eq!(error.to_string(), "no device matches \\\\?\\usb#cam");
    }

    #[test]
    fn test_error_debug_format() {
        let error = ControlError::invalid_argument("poll interval out of range");
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("InvalidArgument"));
        assert!(debug_str.contains("poll interval out of range"));
    }

    #[test]
    fn test_error_implements_error_trait() {
        let error = ControlError::permission_denied("camera in exclusive use");
        let as_dyn: &dyn Error = &error;
        assert!(as_dyn.source().is_none());
    }

    #[test]
    fn test_all_error_kinds_construct() {
        let errors = vec![
            ControlError::device_not_found("device not found"),
            ControlError::device_busy("device busy"),
            ControlError::property_not_supported("property not supported"),
            ControlError::invalid_value("invalid value"),
            ControlError::permission_denied("permission denied"),
            ControlError::system("system error"),
            ControlError::invalid_argument("invalid argument"),
            ControlError::not_implemented("not implemented"),
        ];

        let kinds: Vec<ErrorKind> = errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::DeviceNotFound,
                ErrorKind::DeviceBusy,
                ErrorKind::PropertyNotSupported,
                ErrorKind::InvalidValue,
                ErrorKind::PermissionDenied,
                ErrorKind::SystemError,
                ErrorKind::InvalidArgument,
                ErrorKind::NotImplemented,
            ]
        );

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }

    #[test]
    fn test_result_arms_are_mutually_exclusive() {
        let ok: Result<u32> = Ok(7);
        let err: Result<u32> = Err(ControlError::system("native call failed"));

        assert!(ok.is_ok());
        assert!(!ok.is_err());
        assert!(err.is_err());
        assert!(!err.is_ok());
    }

    #[test]
    #[should_panic]
    fn test_unwrapping_the_wrong_arm_is_rejected() {
        let err: Result<u32> = Err(ControlError::system("native call failed"));
        let _ = err.unwrap();
    }

    #[test]
    fn test_error_kind_serializes() {
        let encoded = serde_json::to_string(&ErrorKind::PropertyNotSupported).unwrap();
        assert_eq!(encoded, "\"PropertyNotSupported\"");
        let decoded: ErrorKind = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, ErrorKind::PropertyNotSupported);
    }
}
