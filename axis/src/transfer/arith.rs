//! Integer arithmetic: add/sub (and pointer offsets), mul, div, rem, shifts.

use tilir_ir::BinaryOp;

use super::{BinaryPolicy, OpContext, binary_op, binary_transfer, expect_operands, fold_constants};
use crate::info::{AxisInfo, INIT_VALUE, MAX_DIVISIBILITY, UNKNOWN_STRIDE_VALUE};
use crate::utils::{gcd, highest_pow_of_2_divisor, is_power_of_two, log2_int, pow2_floor_div, shl_capped};

// =========================================================================
// Add / Sub
// =========================================================================

pub const ADD_SUB: BinaryPolicy = BinaryPolicy {
    // lhs = k * d_lhs, rhs = p * d_rhs, so lhs +/- rhs is a multiple of gcd(d_lhs, d_rhs).
    divisibility: |_, lhs, rhs, d| gcd(lhs.divisibility(d), rhs.divisibility(d)),
    stride: |_, lhs, rhs, d| gcd(lhs.stride(d), rhs.stride(d)),
    stride_value: |op, lhs, rhs, d| {
        let (l, r) = (lhs.stride_value(d), rhs.stride_value(d));
        if l == UNKNOWN_STRIDE_VALUE || r == UNKNOWN_STRIDE_VALUE {
            return UNKNOWN_STRIDE_VALUE;
        }
        match op {
            BinaryOp::Sub => l.wrapping_sub(r),
            _ => l.wrapping_add(r),
        }
    },
    constant: fold_constants,
};

pub fn add_sub(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    binary_transfer(&ADD_SUB, ctx, operands)
}

// =========================================================================
// Mul
// =========================================================================

pub const MUL: BinaryPolicy = BinaryPolicy {
    // k * d_lhs * p * d_rhs
    divisibility: |_, lhs, rhs, d| shl_capped(lhs.divisibility(d), log2_int(rhs.divisibility(d)) as i64),
    stride: |_, lhs, rhs, d| {
        gcd(lhs.constancy(d), rhs.stride(d)).max(gcd(lhs.stride(d), rhs.constancy(d)))
    },
    stride_value: |_, lhs, rhs, d| {
        let (l, r) = (lhs.stride_value(d), rhs.stride_value(d));
        if l == UNKNOWN_STRIDE_VALUE || r == UNKNOWN_STRIDE_VALUE {
            return UNKNOWN_STRIDE_VALUE;
        }
        let scaled = |step: i64, factor: Option<i64>| {
            factor.and_then(|c| step.checked_mul(c)).unwrap_or(UNKNOWN_STRIDE_VALUE)
        };
        scaled(l, rhs.constant_value()).max(scaled(r, lhs.constant_value()))
    },
    constant: fold_constants,
};

pub fn mul(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    binary_transfer(&MUL, ctx, operands)
}

// =========================================================================
// Shifts
// =========================================================================

/// Constant shift amount in `0..64`.
fn shift_amount(rhs: &AxisInfo) -> Option<i64> {
    rhs.constant_value().filter(|s| (0..64).contains(s))
}

pub const SHL: BinaryPolicy = BinaryPolicy {
    divisibility: |_, lhs, rhs, d| match shift_amount(rhs) {
        Some(shift) => shl_capped(lhs.divisibility(d), shift),
        None => INIT_VALUE,
    },
    stride: |_, lhs, rhs, d| if shift_amount(rhs).is_some() { lhs.stride(d) } else { INIT_VALUE },
    stride_value: |_, lhs, rhs, d| match (shift_amount(rhs), lhs.stride_value(d)) {
        (Some(shift), step) if step != UNKNOWN_STRIDE_VALUE => {
            let shifted = step.checked_mul(1 << shift).filter(|s| s.unsigned_abs() <= MAX_DIVISIBILITY as u64);
            shifted.unwrap_or(UNKNOWN_STRIDE_VALUE)
        }
        _ => UNKNOWN_STRIDE_VALUE,
    },
    constant: fold_constants,
};

pub fn shl(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    binary_transfer(&SHL, ctx, operands)
}

pub const SHR: BinaryPolicy = BinaryPolicy {
    divisibility: |_, lhs, rhs, d| match shift_amount(rhs) {
        Some(shift) => (lhs.divisibility(d) >> shift).max(INIT_VALUE),
        None => INIT_VALUE,
    },
    stride: |_, lhs, rhs, d| if shift_amount(rhs) == Some(0) { lhs.stride(d) } else { INIT_VALUE },
    stride_value: |_, lhs, rhs, d| {
        if shift_amount(rhs) == Some(0) { lhs.stride_value(d) } else { UNKNOWN_STRIDE_VALUE }
    },
    constant: fold_constants,
};

pub fn shr(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    binary_transfer(&SHR, ctx, operands)
}

// =========================================================================
// Div
// =========================================================================

/// Signed and unsigned division. First matching case wins per dimension:
///
/// 1. `x / 1` or `0 / y`: the dividend.
/// 2. Both constant: the exact quotient.
/// 3. Dividend a non-constant progression with a power-of-two step, divisor a
///    positive power-of-two constant: runs shrink to what stays within one
///    quotient bucket.
/// 4. Otherwise unknown.
pub fn div(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    expect_operands(ctx, operands, 2);
    let op = binary_op(ctx);
    let (lhs, rhs) = (&operands[0], &operands[1]);
    let shape = ctx.shape();

    if rhs.constant_value() == Some(1) || lhs.constant_value() == Some(0) {
        return lhs.clone();
    }

    let mut result = AxisInfo::top(ctx.rank());
    let quotient = fold_constants(op, lhs, rhs);
    for d in 0..ctx.rank() {
        if let Some(q) = quotient {
            result.set_dim(d, highest_pow_of_2_divisor(q), lhs.constancy(d), 0);
        } else if let Some(divisor) = rhs.constant_value()
            && is_power_of_two(divisor)
            && !lhs.is_constant_dim(&shape, d)
            && lhs.is_strided_dim(&shape, d)
            && rhs.is_constant_dim(&shape, d)
            && is_power_of_two(lhs.stride_value(d))
        {
            // lhs: d_lhs * k + i * s, i in 0..stride. A bucket of `divisor`
            // consecutive integers aligned on gcd(d_lhs, d_rhs) holds at least
            // gcd(d_lhs, d_rhs) / s progression elements.
            let step = lhs.stride_value(d);
            let common = gcd(lhs.divisibility(d), rhs.divisibility(d));
            let run = gcd(lhs.stride(d), (common / step).max(INIT_VALUE));
            // Shorter runs past the first start one quotient higher.
            let divisibility =
                if run == lhs.stride(d) { pow2_floor_div(lhs.divisibility(d), divisor) } else { INIT_VALUE };
            result.set_dim(d, divisibility, run, step / divisor);
        }
    }
    result.with_constant(quotient)
}

// =========================================================================
// Rem
// =========================================================================

/// Signed and unsigned remainder. First matching case wins per dimension:
///
/// 1. `x % 1` or `0 % y`: exactly zero.
/// 2. Both constant: the exact remainder.
/// 3. Dividend contiguous over the dimension, divisor constant over it:
///    unit-step runs bounded by the common divisibility.
/// 4. Otherwise unknown.
pub fn rem(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    expect_operands(ctx, operands, 2);
    let op = binary_op(ctx);
    let (lhs, rhs) = (&operands[0], &operands[1]);
    let shape = ctx.shape();

    if rhs.constant_value() == Some(1) || lhs.constant_value() == Some(0) {
        return AxisInfo::zero(&shape);
    }

    let mut result = AxisInfo::top(ctx.rank());
    let remainder = fold_constants(op, lhs, rhs);
    for d in 0..ctx.rank() {
        if let Some(r) = remainder {
            result.set_dim(d, highest_pow_of_2_divisor(r), lhs.constancy(d), 0);
        } else if lhs.is_contiguous_dim(&shape, d) && rhs.is_constant_dim(&shape, d) {
            // lhs = gcd * k'' and rhs = gcd * p'', so lhs % rhs stays a multiple
            // of gcd, and lhs walks through at least gcd values before wrapping.
            let common = gcd(lhs.divisibility(d), rhs.divisibility(d));
            result.set_dim(d, common, gcd(lhs.contiguity(d), common), 1);
        }
    }
    result.with_constant(remainder)
}
