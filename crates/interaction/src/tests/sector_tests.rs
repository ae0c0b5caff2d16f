use super::*;

const H: f64 = 15.0;
const B: f64 = 12.0;

#[test]
fn reading_just_past_a_boundary_is_ignored() {
    // Four candidates, 90-degree sectors, currently in sector 1 [90, 180):
    // one degree past the upper edge is jitter, not a selection change.
    assert_eq!(select_sector(181.0, 4, 1, H), None);
}

#[test]
fn reading_well_past_a_boundary_is_adopted() {
    assert_eq!(select_sector(205.0, 4, 1, H), Some(2));
}

#[test]
fn hysteresis_applies_backward_across_the_lower_edge() {
    assert_eq!(select_sector(89.0, 4, 1, H), None);
    assert_eq!(select_sector(60.0, 4, 1, H), Some(0));
}

#[test]
fn hysteresis_applies_across_the_wraparound_seam() {
    // Sector 0 of four; a reading drifting just below 360 is still jitter.
    assert_eq!(select_sector(350.0, 4, 0, H), None);
    assert_eq!(select_sector(330.0, 4, 0, H), Some(3));
}

#[test]
fn reading_inside_the_current_sector_never_changes_selection() {
    assert_eq!(select_sector(135.0, 4, 1, H), None);
}

#[test]
fn two_candidates_split_the_circle_in_half() {
    assert_eq!(select_sector(270.0, 2, 0, H), Some(1));
}

#[test]
fn degenerate_candidate_lists_are_no_ops() {
    assert_eq!(select_sector(123.0, 0, 0, H), None);
    assert_eq!(select_sector(123.0, 1, 0, H), None);
}

#[test]
fn out_of_range_current_index_is_clamped() {
    assert_eq!(select_sector(45.0, 4, 17, H), Some(0));
}

#[test]
fn sort_zone_deadband_around_180_is_a_no_op() {
    assert_eq!(classify_sort_zone(170.0, B), None);
    assert_eq!(classify_sort_zone(190.0, B), None);
}

#[test]
fn sort_zone_deadband_around_the_seam_is_a_no_op() {
    assert_eq!(classify_sort_zone(5.0, B), None);
    assert_eq!(classify_sort_zone(355.0, B), None);
}

#[test]
fn solid_readings_classify_into_their_half() {
    assert_eq!(classify_sort_zone(90.0, B), Some(SortOrder::Ascending));
    assert_eq!(classify_sort_zone(140.0, B), Some(SortOrder::Ascending));
    assert_eq!(classify_sort_zone(220.0, B), Some(SortOrder::Descending));
    assert_eq!(classify_sort_zone(270.0, B), Some(SortOrder::Descending));
}
