//! Ranges and shape manipulation.

use tilir_ir::Op;

use super::{OpContext, expect_operands};
use crate::info::{AxisInfo, INIT_VALUE};
use crate::utils::highest_pow_of_2_divisor;

/// `[start, end)`: a single unit-step run.
pub fn make_range(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    expect_operands(ctx, operands, 0);
    let Op::MakeRange { start, end } = *ctx.op() else {
        panic!("{:?} is not a range", ctx.op().kind());
    };
    AxisInfo::new(&[highest_pow_of_2_divisor(start)], &[end - start], &[1], None)
}

/// Replicated dimensions become constant over the target extent; the others
/// keep the source facts. A scalar source replicates along every dimension.
pub fn broadcast(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    expect_operands(ctx, operands, 1);
    let src = &operands[0];
    let src_ty = ctx.operand_ty(0);
    let shape = ctx.shape();
    assert!(
        src_ty.is_scalar() || src_ty.rank() == ctx.ty().rank(),
        "broadcast source rank {} differs from result rank {}",
        src_ty.rank(),
        ctx.ty().rank()
    );

    let mut result = AxisInfo::top(ctx.rank());
    for d in 0..ctx.rank() {
        let src_dim = if src_ty.is_scalar() { 0 } else { d };
        if src_ty.extent(src_dim) == 1 {
            result.set_dim(d, src.divisibility(src_dim), shape[d], 0);
        } else {
            result.set_dim(d, src.divisibility(d), src.stride(d), src.stride_value(d));
        }
    }
    result.with_constant(src.constant_value())
}

/// A scalar copied everywhere: uniform over the result.
pub fn splat(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    expect_operands(ctx, operands, 1);
    let src = &operands[0];
    let mut result = AxisInfo::top(ctx.rank());
    for (d, extent) in ctx.shape().into_iter().enumerate() {
        result.set_dim(d, src.divisibility(0), extent, 0);
    }
    result.with_constant(src.constant_value())
}

/// Inserts an extent-1 dimension with no claims of its own.
pub fn expand_dims(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    expect_operands(ctx, operands, 1);
    let Op::ExpandDims { axis, .. } = *ctx.op() else {
        panic!("{:?} is not expand_dims", ctx.op().kind());
    };
    let src = &operands[0];
    // A scalar already carries its single degenerate dimension.
    if ctx.operand_ty(0).is_scalar() {
        return src.clone();
    }

    let insert = |values: &[i64], fill: i64| {
        let mut values = values.to_vec();
        values.insert(axis, fill);
        values
    };
    AxisInfo::new(
        &insert(src.divisibilities(), INIT_VALUE),
        &insert(src.strides(), INIT_VALUE),
        &insert(src.stride_values(), 0),
        src.constant_value(),
    )
}
