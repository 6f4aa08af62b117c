//! Integer comparison.

use tilir_ir::Op;

use super::{OpContext, expect_operands};
use crate::info::{AxisInfo, INIT_VALUE};
use crate::utils::gcd;

/// Comparisons yield runs of identical booleans.
///
/// Two constants fold exactly. For strict orderings the result keeps the
/// constant runs both operands share, extended when a constant side meets
/// a contiguous side: `k0 * d` against `k1 * d + i` cannot change answer
/// within a block of `gcd(d_lhs, d_rhs)` elements.
pub fn cmp(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    expect_operands(ctx, operands, 2);
    let Op::Cmp(predicate, ..) = ctx.op() else {
        panic!("{:?} is not a comparison", ctx.op().kind());
    };
    let (lhs, rhs) = (&operands[0], &operands[1]);
    let shape = ctx.shape();

    if let (Some(l), Some(r)) = (lhs.constant_value(), rhs.constant_value()) {
        return AxisInfo::constant(predicate.evaluate(l, r) as i64, &shape);
    }

    let mut result = AxisInfo::top(ctx.rank());
    for d in 0..ctx.rank() {
        let mut hint = INIT_VALUE;
        if predicate.is_strict_ordering() {
            hint = gcd(lhs.constancy(d), rhs.constancy(d));
            let common = gcd(lhs.divisibility(d), rhs.divisibility(d));
            if lhs.is_constant_dim(&shape, d) && rhs.is_contiguous_dim(&shape, d) {
                hint = hint.max(gcd(rhs.contiguity(d), common));
            } else if lhs.is_contiguous_dim(&shape, d) && rhs.is_constant_dim(&shape, d) {
                hint = hint.max(gcd(lhs.contiguity(d), common));
            }
        }
        result.set_dim(d, INIT_VALUE, hint, 0);
    }
    result
}
