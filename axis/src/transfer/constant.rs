use tilir_ir::Op;

use super::{OpContext, expect_operands};
use crate::info::AxisInfo;

/// Integer literals, splatted over the result shape.
pub fn constant(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    expect_operands(ctx, operands, 0);
    let Op::Const(value) = *ctx.op() else {
        panic!("{:?} is not an integer constant", ctx.op().kind());
    };
    AxisInfo::constant(value, &ctx.shape())
}

/// Casts keep the value, so they keep the fact.
pub fn identity(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    expect_operands(ctx, operands, 1);
    operands[0].clone()
}
