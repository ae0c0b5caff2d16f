use std::collections::VecDeque;

/// Map any angle into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Fixed-capacity sliding window over yaw readings with a circular mean.
///
/// An arithmetic mean of raw degrees is wrong across the 0/360 seam
/// ({350, 10} must average near 0, not 180), so the mean is computed by
/// averaging sine and cosine components and recombining with `atan2`.
#[derive(Debug)]
pub struct RotationSmoother {
    window_size: usize,
    readings: VecDeque<f64>,
}

impl RotationSmoother {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            readings: VecDeque::with_capacity(window_size),
        }
    }

    /// Push a sample, evicting the oldest when the window is full, and
    /// return the updated circular average.
    pub fn add_reading(&mut self, degrees: f64) -> f64 {
        self.readings.push_back(normalize_degrees(degrees));
        if self.readings.len() > self.window_size {
            self.readings.pop_front();
        }
        self.average()
    }

    /// Circular mean of the window in [0, 360); 0.0 when empty.
    pub fn average(&self) -> f64 {
        if self.readings.is_empty() {
            return 0.0;
        }
        let count = self.readings.len() as f64;
        let (sin_sum, cos_sum) = self
            .readings
            .iter()
            .map(|degrees| degrees.to_radians())
            .fold((0.0_f64, 0.0_f64), |(sins, coss), radians| {
                (sins + radians.sin(), coss + radians.cos())
            });
        let mean = (sin_sum / count).atan2(cos_sum / count).to_degrees();
        normalize_degrees(mean)
    }

    pub fn reset(&mut self) {
        self.readings.clear();
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/smoothing_tests.rs"]
mod tests;
