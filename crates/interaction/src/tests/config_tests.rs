use std::time::Duration;

use super::*;

#[test]
fn defaults_sit_inside_the_documented_bounds() {
    let tuning = InteractionTuning::default();
    assert!(tuning.hysteresis_degrees > 2.0 && tuning.hysteresis_degrees < 24.0);
    assert!(tuning.sort_deadband_degrees >= 5.0 && tuning.sort_deadband_degrees <= 15.0);
    assert!(tuning.debounce_ms >= 500 && tuning.debounce_ms <= 600);
}

#[test]
fn partial_toml_only_overrides_named_fields() {
    let tuning = InteractionTuning::from_toml("hysteresis_degrees = 20.0\n").unwrap();
    assert_eq!(tuning.hysteresis_degrees, 20.0);
    assert_eq!(
        tuning.sort_deadband_degrees,
        InteractionTuning::default().sort_deadband_degrees
    );
    assert_eq!(tuning.poll_interval(), Duration::from_millis(50));
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(InteractionTuning::from_toml("no_such_knob = 1\n").is_err());
}
