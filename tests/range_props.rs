//! Property-Based Tests for the camctl Range Model
//!
//! These tests verify the clamp/validate invariants of PropertyRange using
//! proptest for input generation and shrinking.
//!
//! Run with: cargo test --test range_props

use proptest::prelude::*;

use camctl::types::{ControlMode, PropertyRange};

fn arb_mode() -> impl Strategy<Value = ControlMode> {
    prop_oneof![Just(ControlMode::Auto), Just(ControlMode::Manual)]
}

fn arb_range() -> impl Strategy<Value = PropertyRange> {
    (
        any::<i32>(),
        any::<i32>(),
        // Include zero and negative steps: drivers report those too.
        -4i32..1000,
        any::<i32>(),
        arb_mode(),
    )
        .prop_map(|(a, b, step, default_value, default_mode)| PropertyRange {
            min: a.min(b),
            max: a.max(b),
            step,
            default_value,
            default_mode,
        })
}

proptest! {
    /// INVARIANT: clamp lands inside the bounds for every input.
    #[test]
    fn clamp_is_in_bounds(range in arb_range(), value in any::<i32>()) {
        let clamped = range.clamp(value);
        prop_assert!(clamped >= range.min, "clamp({}) = {} below min {}", value, clamped, range.min);
        prop_assert!(clamped <= range.max, "clamp({}) = {} above max {}", value, clamped, range.max);
    }

    /// INVARIANT: clamp output always validates.
    #[test]
    fn clamp_output_is_valid(range in arb_range(), value in any::<i32>()) {
        prop_assert!(range.is_valid(range.clamp(value)));
    }

    /// INVARIANT: clamp is idempotent.
    #[test]
    fn clamp_is_idempotent(range in arb_range(), value in any::<i32>()) {
        let once = range.clamp(value);
        prop_assert_eq!(range.clamp(once), once);
    }

    /// INVARIANT: values that validate pass through clamp untouched.
    #[test]
    fn valid_values_are_fixed_points(range in arb_range(), value in any::<i32>()) {
        if range.is_valid(value) {
            prop_assert_eq!(range.clamp(value), value);
        }
    }

    /// INVARIANT: clamp never rounds upward past the requested value once
    /// inside the bounds.
    #[test]
    fn clamp_rounds_down(range in arb_range(), value in any::<i32>()) {
        if value >= range.min && value <= range.max {
            prop_assert!(range.clamp(value) <= value);
        }
    }

    /// INVARIANT: the minimum always validates, whatever the step.
    #[test]
    fn min_is_always_valid(range in arb_range()) {
        prop_assert!(range.is_valid(range.min));
        prop_assert_eq!(range.clamp(range.min), range.min);
    }
}
