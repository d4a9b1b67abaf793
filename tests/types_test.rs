mod types_tests {
    use camctl::properties::{CameraControlProperty, Property};
    use camctl::types::{
        ControlMode, DeviceIdentity, PropertyCapability, PropertyRange, PropertySetting,
    };

    #[test]
    fn test_identity_serde_round_trip() {
        let identity = DeviceIdentity::new("PTZ Pro 2", "\\\\?\\usb#vid_046d&pid_0858");
        let encoded = serde_json::to_string(&identity).unwrap();
        let decoded: DeviceIdentity = serde_json::from_str(&encoded).unwrap();
        assert_eq!(identity, decoded);
        assert_eq!(decoded.name, "PTZ Pro 2");
    }

    #[test]
    fn test_setting_serde_round_trip() {
        let setting = PropertySetting::manual(-3600);
        let encoded = serde_json::to_string(&setting).unwrap();
        let decoded: PropertySetting = serde_json::from_str(&encoded).unwrap();
        assert_eq!(setting, decoded);
        assert_eq!(decoded.mode, ControlMode::Manual);
    }

    #[test]
    fn test_capability_serializes_with_range() {
        let capability = PropertyCapability {
            supported: true,
            range: Some(PropertyRange {
                min: 100,
                max: 400,
                step: 10,
                default_value: 100,
                default_mode: ControlMode::Manual,
            }),
            current: Some(PropertySetting::manual(120)),
        };
        let encoded = serde_json::to_value(&capability).unwrap();
        assert_eq!(encoded["supported"], true);
        assert_eq!(encoded["range"]["max"], 400);
        assert_eq!(encoded["current"]["value"], 120);
    }

    #[test]
    fn test_property_serde_names_the_domain() {
        let property = Property::CameraControl(CameraControlProperty::Zoom);
        let encoded = serde_json::to_string(&property).unwrap();
        assert!(encoded.contains("CameraControl"));
        let decoded: Property = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, property);
    }

    #[test]
    fn test_display_forms() {
        let identity = DeviceIdentity::new("BRIO", "\\\\?\\usb#brio");
        assert_eq!(identity.to_string(), "BRIO (\\\\?\\usb#brio)");

        let pathless = DeviceIdentity::new("Virtual Cam", "");
        assert_eq!(pathless.to_string(), "Virtual Cam");

        let property = Property::CameraControl(CameraControlProperty::Exposure);
        assert_eq!(property.to_string(), "Exposure");
    }
}
