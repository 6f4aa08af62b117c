//! Power-of-two and gcd arithmetic shared by the transfer functions.
//!
//! Every helper is exact. Anything that could overflow saturates at
//! [`MAX_DIVISIBILITY`] instead of wrapping.

use crate::info::{INIT_VALUE, MAX_DIVISIBILITY};

/// Largest power of two dividing `n`, or [`MAX_DIVISIBILITY`] for zero.
///
/// ```
/// use tilir_axis::utils::highest_pow_of_2_divisor;
/// assert_eq!(highest_pow_of_2_divisor(1), 1);
/// assert_eq!(highest_pow_of_2_divisor(6), 2);
/// assert_eq!(highest_pow_of_2_divisor(-8), 8);
/// ```
pub fn highest_pow_of_2_divisor(n: i64) -> i64 {
    if n == 0 {
        return MAX_DIVISIBILITY;
    }
    let bits = n as u64;
    (bits & bits.wrapping_neg()).min(MAX_DIVISIBILITY as u64) as i64
}

/// Greatest common divisor (Euclid). Always non-negative; `gcd(0, 0) == 0`.
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.min(i64::MAX as u64) as i64
}

/// `floor(log2(n))` for `n >= 1`, `0` otherwise.
pub fn log2_int(n: i64) -> u32 {
    if n <= 1 { 0 } else { n.ilog2() }
}

pub fn is_power_of_two(n: i64) -> bool {
    n > 0 && (n as u64).is_power_of_two()
}

/// `value << shift`, saturating at [`MAX_DIVISIBILITY`]. Meant for
/// divisibility facts, which are positive powers of two.
pub fn shl_capped(value: i64, shift: i64) -> i64 {
    let max_bits = log2_int(MAX_DIVISIBILITY) as i64;
    if value <= 0 || shift < 0 {
        return INIT_VALUE;
    }
    if shift + log2_int(value) as i64 > max_bits {
        return MAX_DIVISIBILITY;
    }
    value << shift
}

/// Divisibility left after dividing a multiple of `divisibility` by `divisor`.
///
/// Exact only when `divisor` is itself a power of two; for anything else the
/// quotient has no guaranteed power-of-two factor, so the answer is
/// [`INIT_VALUE`]. Floored at [`INIT_VALUE`].
pub fn pow2_floor_div(divisibility: i64, divisor: i64) -> i64 {
    if !is_power_of_two(divisor) {
        return INIT_VALUE;
    }
    (divisibility / divisor).max(INIT_VALUE)
}
