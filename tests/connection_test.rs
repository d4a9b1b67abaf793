mod connection_tests {
    use camctl::errors::ErrorKind;
    use camctl::properties::{CameraControlProperty, Property, VideoProcAmpProperty};
    use camctl::testing::{SyntheticDevice, SyntheticEnumerator};
    use camctl::types::{ControlMode, DeviceIdentity, PropertyRange, PropertySetting};
    use camctl::DeviceConnection;

    fn brightness_range() -> PropertyRange {
        PropertyRange {
            min: 0,
            max: 255,
            step: 1,
            default_value: 128,
            default_mode: ControlMode::Auto,
        }
    }

    fn pan_range() -> PropertyRange {
        PropertyRange {
            min: -36000,
            max: 36000,
            step: 3600,
            default_value: 0,
            default_mode: ControlMode::Manual,
        }
    }

    #[test]
    fn test_connection_against_missing_device_is_invalid() {
        let enumerator = SyntheticEnumerator::new();
        let ghost = DeviceIdentity::new("Ghost Cam", "\\\\?\\usb#ghost");

        let connection = DeviceConnection::open(&enumerator, &ghost);
        assert!(!connection.is_valid());

        let err = connection
            .get(Property::CameraControl(CameraControlProperty::Pan))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DeviceNotFound);
    }

    #[test]
    fn test_set_then_get_echoes_setting() {
        let enumerator = SyntheticEnumerator::new();
        let identity = DeviceIdentity::new("PTZ Pro", "\\\\?\\usb#ptz");
        enumerator.attach(
            SyntheticDevice::new(identity.clone())
                .with_property(
                    Property::VideoProcAmp(VideoProcAmpProperty::Brightness),
                    brightness_range(),
                )
                .with_property(Property::CameraControl(CameraControlProperty::Pan), pan_range()),
        );

        let connection = DeviceConnection::open(&enumerator, &identity);
        assert!(connection.is_valid());

        let brightness = Property::VideoProcAmp(VideoProcAmpProperty::Brightness);
        let wanted = PropertySetting::manual(200);
        connection.set(brightness, wanted).unwrap();
        assert_eq!(connection.get(brightness).unwrap(), wanted);

        // The other domain is untouched by the write.
        let pan = Property::CameraControl(CameraControlProperty::Pan);
        assert_eq!(connection.get(pan).unwrap(), PropertySetting::manual(0));
    }

    #[test]
    fn test_unsupported_property_on_bound_surface() {
        let enumerator = SyntheticEnumerator::new();
        let identity = DeviceIdentity::new("Fixed Lens", "\\\\?\\usb#fixed");
        enumerator.attach(SyntheticDevice::new(identity.clone()).with_property(
            Property::VideoProcAmp(VideoProcAmpProperty::Brightness),
            brightness_range(),
        ));

        let connection = DeviceConnection::open(&enumerator, &identity);
        let err = connection
            .get(Property::VideoProcAmp(VideoProcAmpProperty::Gain))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PropertyNotSupported);
    }

    #[test]
    fn test_single_domain_device() {
        let enumerator = SyntheticEnumerator::new();
        let identity = DeviceIdentity::new("ProcAmp Only", "\\\\?\\usb#procamp");
        enumerator.attach(
            SyntheticDevice::new(identity.clone())
                .without_camera_control()
                .with_property(
                    Property::VideoProcAmp(VideoProcAmpProperty::Contrast),
                    brightness_range(),
                ),
        );

        let connection = DeviceConnection::open(&enumerator, &identity);
        assert!(connection.is_valid());

        let err = connection
            .get(Property::CameraControl(CameraControlProperty::Zoom))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DeviceNotFound);

        assert!(connection
            .get(Property::VideoProcAmp(VideoProcAmpProperty::Contrast))
            .is_ok());
    }

    #[test]
    fn test_range_query_reports_catalog_values() {
        let enumerator = SyntheticEnumerator::new();
        let identity = DeviceIdentity::new("PTZ Pro", "\\\\?\\usb#ptz");
        enumerator.attach(
            SyntheticDevice::new(identity.clone())
                .with_property(Property::CameraControl(CameraControlProperty::Pan), pan_range()),
        );

        let connection = DeviceConnection::open(&enumerator, &identity);
        let range = connection
            .range(Property::CameraControl(CameraControlProperty::Pan))
            .unwrap();
        assert_eq!(range, pan_range());
        assert!(range.is_valid(range.clamp(12345)));
    }

    #[test]
    fn test_set_does_not_clamp() {
        let enumerator = SyntheticEnumerator::new();
        let identity = DeviceIdentity::new("PTZ Pro", "\\\\?\\usb#ptz");
        enumerator.attach(SyntheticDevice::new(identity.clone()).with_property(
            Property::VideoProcAmp(VideoProcAmpProperty::Brightness),
            brightness_range(),
        ));

        let connection = DeviceConnection::open(&enumerator, &identity);
        let brightness = Property::VideoProcAmp(VideoProcAmpProperty::Brightness);

        // Out-of-range values pass through untouched; validation belongs to
        // the caller holding the range.
        connection
            .set(brightness, PropertySetting::manual(9999))
            .unwrap();
        assert_eq!(connection.get(brightness).unwrap().value, 9999);
    }
}
