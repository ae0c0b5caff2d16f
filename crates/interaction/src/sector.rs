use shared::domain::SortOrder;

use crate::smoothing::normalize_degrees;

/// Map an angle onto one of `candidates` equal sectors, resisting flips near
/// sector boundaries.
///
/// The raw target is `floor(degrees / (360 / candidates)) mod candidates`. A
/// target differing from `current` is adopted only when the reading sits more
/// than `hysteresis` degrees past the nearer edge of the current sector,
/// measured forward past its upper edge or backward past its lower edge.
/// Returns the adopted index, or `None` when the selection is unchanged.
pub fn select_sector(
    degrees: f64,
    candidates: usize,
    current: usize,
    hysteresis: f64,
) -> Option<usize> {
    if candidates < 2 {
        return None;
    }
    let span = 360.0 / candidates as f64;
    let theta = normalize_degrees(degrees);
    let raw = ((theta / span).floor() as usize) % candidates;
    let current = current.min(candidates - 1);
    if raw == current {
        return None;
    }

    let lower = current as f64 * span;
    let upper = lower + span;
    let past_upper = normalize_degrees(theta - upper);
    let past_lower = normalize_degrees(lower - theta);
    if past_upper.min(past_lower) > hysteresis {
        Some(raw)
    } else {
        None
    }
}

/// Sort-order zones: the ascending half is [0, 180), the descending half
/// [180, 360), with a no-change deadband of half-width `deadband` around the
/// 0 and 180 degree boundaries. `None` inside a deadband.
pub fn classify_sort_zone(degrees: f64, deadband: f64) -> Option<SortOrder> {
    let theta = normalize_degrees(degrees);
    let to_seam = theta.min(360.0 - theta);
    let to_half = (theta - 180.0).abs();
    if to_seam < deadband || to_half < deadband {
        return None;
    }
    if theta < 180.0 {
        Some(SortOrder::Ascending)
    } else {
        Some(SortOrder::Descending)
    }
}

#[cfg(test)]
#[path = "tests/sector_tests.rs"]
mod tests;
