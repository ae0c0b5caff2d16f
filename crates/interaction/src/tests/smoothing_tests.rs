use super::*;

#[test]
fn empty_window_averages_to_zero() {
    let smoother = RotationSmoother::new(5);
    assert!(smoother.is_empty());
    assert_eq!(smoother.average(), 0.0);
}

#[test]
fn circular_average_handles_the_zero_seam() {
    let mut smoother = RotationSmoother::new(5);
    smoother.add_reading(350.0);
    let average = smoother.add_reading(10.0);
    // An arithmetic mean would land at 180; the circular mean sits near 0.
    assert!(
        average < 1.0 || average > 359.0,
        "expected average near 0, got {average}"
    );
}

#[test]
fn window_evicts_oldest_reading_past_capacity() {
    let mut smoother = RotationSmoother::new(3);
    smoother.add_reading(10.0);
    smoother.add_reading(20.0);
    smoother.add_reading(30.0);
    smoother.add_reading(40.0);
    assert_eq!(smoother.len(), 3);
    // Window is now {20, 30, 40}; the evicted 10 no longer pulls the mean.
    assert!((smoother.average() - 30.0).abs() < 1e-9);
}

#[test]
fn reset_clears_all_readings() {
    let mut smoother = RotationSmoother::new(4);
    smoother.add_reading(123.0);
    smoother.reset();
    assert!(smoother.is_empty());
    assert_eq!(smoother.average(), 0.0);
}

#[test]
fn readings_are_normalized_on_entry() {
    let mut smoother = RotationSmoother::new(2);
    let average = smoother.add_reading(-90.0);
    assert!((average - 270.0).abs() < 1e-9);
}

#[test]
fn normalize_degrees_wraps_into_range() {
    assert_eq!(normalize_degrees(360.0), 0.0);
    assert_eq!(normalize_degrees(725.0), 5.0);
    assert_eq!(normalize_degrees(-10.0), 350.0);
}
