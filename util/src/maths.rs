//! Utility maths functions
//!
//! Angles handled by the autopilot are in degrees. Helpers that work in radians say so in their
//! name.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Limit `value` to the closed range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Map a value in the range [-pi, pi] to [0, 2pi]
pub fn map_pi_to_2pi<T>(value: T) -> T
where
    T: Float,
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap_or_else(T::nan);

    if value < T::zero() {
        tau_t + value
    } else {
        value
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn wrap_360_deg<T>(angle_deg: T) -> T
where
    T: Float,
{
    let full = T::from(360.0).unwrap_or_else(T::nan);
    let r = rem_euclid(angle_deg, full);

    // Round-off can land exactly on the upper bound
    if r >= full {
        T::zero()
    } else {
        r
    }
}

/// Unsigned angular separation of two angles in degrees, folded into `[0, 180]`.
///
/// The difference is taken as `|a - b| mod 360`, then anything above 180 is
/// reflected with `360 - d`.
pub fn abs_ang_diff_deg<T>(a: T, b: T) -> T
where
    T: Float,
{
    let full = T::from(360.0).unwrap_or_else(T::nan);
    let half = T::from(180.0).unwrap_or_else(T::nan);

    let d = (a - b).abs() % full;

    if d > half {
        full - d
    } else {
        d
    }
}
