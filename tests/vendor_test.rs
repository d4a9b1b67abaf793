mod vendor_tests {
    use std::path::Path;

    use camctl::errors::ErrorKind;
    use camctl::testing::{SyntheticDevice, SyntheticEnumerator};
    use camctl::types::{DeviceIdentity, VendorPropertyKey};
    use camctl::{VendorPropertyAccessor, SUPPORT_GET, SUPPORT_SET};

    // A plausible vendor extension unit set id.
    const SET_ID: u128 = 0x1a2b3c4d_5e6f_4a0b_8c1d_2e3f40516273;

    fn identity() -> DeviceIdentity {
        DeviceIdentity::new("Vendor Cam", "\\\\?\\usb#vendor")
    }

    fn attach_vendor_device(enumerator: &SyntheticEnumerator) {
        enumerator.attach(
            SyntheticDevice::new(identity())
                .with_vendor_property(
                    VendorPropertyKey::new(SET_ID, 1),
                    42i32.to_ne_bytes().to_vec(),
                    SUPPORT_GET | SUPPORT_SET,
                )
                .with_vendor_property(
                    VendorPropertyKey::new(SET_ID, 2),
                    vec![0x01, 0x02],
                    SUPPORT_GET,
                ),
        );
    }

    #[test]
    fn test_open_fails_without_capability() {
        let enumerator = SyntheticEnumerator::new();
        enumerator.attach(SyntheticDevice::new(identity()));

        let err = VendorPropertyAccessor::open(&enumerator, &identity()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PropertyNotSupported);
    }

    #[test]
    fn test_open_fails_on_missing_device() {
        let enumerator = SyntheticEnumerator::new();
        let err = VendorPropertyAccessor::open(&enumerator, &identity()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DeviceNotFound);
    }

    #[test]
    fn test_query_support_reports_flags() {
        let enumerator = SyntheticEnumerator::new();
        attach_vendor_device(&enumerator);

        let accessor = VendorPropertyAccessor::open(&enumerator, &identity()).unwrap();
        assert_eq!(
            accessor
                .query_support(&VendorPropertyKey::new(SET_ID, 1))
                .unwrap(),
            SUPPORT_GET | SUPPORT_SET
        );
        assert_eq!(
            accessor
                .query_support(&VendorPropertyKey::new(SET_ID, 2))
                .unwrap(),
            SUPPORT_GET
        );
        let err = accessor
            .query_support(&VendorPropertyKey::new(SET_ID, 99))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PropertyNotSupported);
    }

    #[test]
    fn test_typed_round_trip() {
        let enumerator = SyntheticEnumerator::new();
        attach_vendor_device(&enumerator);
        let key = VendorPropertyKey::new(SET_ID, 1);

        let accessor = VendorPropertyAccessor::open(&enumerator, &identity()).unwrap();
        assert_eq!(accessor.get_property_typed::<i32>(&key).unwrap(), 42);

        accessor.set_property_typed(&key, -7i32).unwrap();
        assert_eq!(accessor.get_property_typed::<i32>(&key).unwrap(), -7);
    }

    #[test]
    fn test_typed_size_mismatch_is_invalid_value() {
        let enumerator = SyntheticEnumerator::new();
        attach_vendor_device(&enumerator);

        let accessor = VendorPropertyAccessor::open(&enumerator, &identity()).unwrap();
        // Property 2 stores a two-byte payload.
        let err = accessor
            .get_property_typed::<i32>(&VendorPropertyKey::new(SET_ID, 2))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);

        // The raw accessor still hands the payload out.
        let raw = accessor
            .get_property(&VendorPropertyKey::new(SET_ID, 2))
            .unwrap();
        assert_eq!(raw, vec![0x01, 0x02]);
    }

    #[test]
    fn test_failed_fetch_is_system_error() {
        let enumerator = SyntheticEnumerator::new();
        enumerator.attach(SyntheticDevice::new(identity()).with_failing_vendor_property(
            VendorPropertyKey::new(SET_ID, 7),
            vec![0u8; 4],
            SUPPORT_GET,
        ));

        let accessor = VendorPropertyAccessor::open(&enumerator, &identity()).unwrap();
        let err = accessor
            .get_property(&VendorPropertyKey::new(SET_ID, 7))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::SystemError);
    }

    #[test]
    fn test_teardown_releases_interface_before_proxy() {
        let enumerator = SyntheticEnumerator::new();
        attach_vendor_device(&enumerator);

        let accessor = VendorPropertyAccessor::open_with_proxy(
            &enumerator,
            &identity(),
            Some(Path::new("ksproxy_vendor.dll")),
        )
        .unwrap();
        assert!(enumerator.teardown_log().is_empty());

        drop(accessor);
        assert_eq!(
            enumerator.teardown_log(),
            vec!["interface:release".to_string(), "proxy:unload".to_string()]
        );
    }

    #[test]
    fn test_capability_failure_still_unloads_proxy() {
        let enumerator = SyntheticEnumerator::new();
        enumerator.attach(SyntheticDevice::new(identity()));

        let err = VendorPropertyAccessor::open_with_proxy(
            &enumerator,
            &identity(),
            Some(Path::new("ksproxy_vendor.dll")),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PropertyNotSupported);

        // The module was loaded for nothing, but it was unloaded before the
        // error surfaced.
        assert_eq!(
            enumerator.teardown_log(),
            vec!["proxy:unload".to_string()]
        );
    }

    #[test]
    fn test_missing_device_unloads_proxy() {
        let enumerator = SyntheticEnumerator::new();

        let err = VendorPropertyAccessor::open_with_proxy(
            &enumerator,
            &identity(),
            Some(Path::new("ksproxy_vendor.dll")),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DeviceNotFound);
        assert_eq!(
            enumerator.teardown_log(),
            vec!["proxy:unload".to_string()]
        );
    }

    #[test]
    fn test_proxy_path_from_config() {
        let enumerator = SyntheticEnumerator::new();
        attach_vendor_device(&enumerator);

        let mut config = camctl::CamCtlConfig::default();
        config.vendor.proxy_module = Some("ksproxy_vendor.dll".into());

        let accessor = VendorPropertyAccessor::open_with_proxy(
            &enumerator,
            &identity(),
            config.vendor.proxy_path(),
        )
        .unwrap();
        drop(accessor);
        assert_eq!(enumerator.teardown_log().last().map(String::as_str), Some("proxy:unload"));
    }
}
