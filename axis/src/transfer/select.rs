use super::{OpContext, expect_operands};
use crate::info::AxisInfo;
use crate::utils::gcd;

/// `select(cond, on_true, on_false)`.
///
/// A constant condition picks its branch exactly. Otherwise the branches are
/// joined and every run is cut at the condition's constant runs. A scalar
/// condition is uniform over the whole result.
pub fn select(ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    expect_operands(ctx, operands, 3);
    let (cond, on_true, on_false) = (&operands[0], &operands[1], &operands[2]);

    if let Some(value) = cond.constant_value() {
        return if value != 0 { on_true.clone() } else { on_false.clone() };
    }

    let shape = ctx.shape();
    let scalar_cond = ctx.operand_ty(0).is_scalar() && !ctx.ty().is_scalar();
    let mut result = on_true.join(on_false);
    for d in 0..ctx.rank() {
        let cond_run = if scalar_cond { shape[d] } else { cond.constancy(d) };
        let (div, stride, step) = (result.divisibility(d), result.stride(d), result.stride_value(d));
        result.set_dim(d, div, gcd(stride, cond_run), step);
    }
    result
}
