/// Move a value toward a target with a bounded rate of change.
///
/// The value moves by at most `rate * delta` toward `target`. If the target is
/// within reach it is returned exactly, so repeated ramps settle on the target
/// instead of oscillating around it.
pub fn ramp(current: f64, target: f64, rate: f64, delta: f64) -> f64 {
    let difference = target - current;
    let max_change = rate * delta;

    if difference.abs() <= max_change {
        target
    } else if difference.is_sign_positive() {
        current + max_change
    } else {
        current - max_change
    }
}

/// Check if two values are strictly closer than the tolerance.
#[inline]
pub fn within(value: f64, target: f64, tolerance: f64) -> bool {
    (value - target).abs() < tolerance
}

/// Linear interpolation.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
