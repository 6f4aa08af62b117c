//! Bitwise and/or/xor and signed/unsigned min/max.

use tilir_ir::BinaryOp;

use super::{OpContext, binary_op, expect_operands};
use crate::info::AxisInfo;

/// Only fully constant operands are understood.
///
/// Min and max return one of their operands verbatim, so the winner's facts
/// carry over. Bitwise results keep the folded constant and nothing else.
pub fn logic(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    expect_operands(ctx, operands, 2);
    let op = binary_op(ctx);
    let (lhs, rhs) = (&operands[0], &operands[1]);
    let top = AxisInfo::top(ctx.rank());

    let (Some(l), Some(r)) = (lhs.constant_value(), rhs.constant_value()) else {
        return top;
    };
    let Some(value) = op.evaluate(l, r) else {
        return top;
    };

    match op {
        BinaryOp::MaxS | BinaryOp::MaxU | BinaryOp::MinS | BinaryOp::MinU => {
            let winner = if value == l { lhs } else { rhs };
            winner.clone()
        }
        _ => top.with_constant(Some(value)),
    }
}
