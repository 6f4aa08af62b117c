//! Transfer functions: one pure rule per operator category.
//!
//! Every rule maps the operand facts of a value to the fact of its result and
//! never claims more than the operator's exact semantics allow. Anything a rule
//! cannot derive becomes [`AxisInfo::top`] for that dimension.
//!
//! Add, sub, pointer offset, mul and the shifts share one skeleton,
//! [`binary_transfer`], parameterised by a [`BinaryPolicy`].

use smallvec::SmallVec;
use tilir_ir::{BinaryOp, Graph, Op, ValueId, ValueType};

use crate::info::AxisInfo;
use crate::utils::highest_pow_of_2_divisor;

pub mod arith;
pub mod compare;
pub mod constant;
pub mod logic;
pub mod select;
pub mod shape;

/// The value being analysed together with its defining op and types.
#[derive(Debug, Clone, Copy)]
pub struct OpContext<'g> {
    graph: &'g Graph,
    value: ValueId,
}

impl<'g> OpContext<'g> {
    #[track_caller]
    pub fn new(graph: &'g Graph, value: ValueId) -> Self {
        assert!(graph.contains(value), "{value} is not part of the graph");
        Self { graph, value }
    }

    pub fn value(&self) -> ValueId {
        self.value
    }

    pub fn op(&self) -> &'g Op {
        self.graph.op(self.value)
    }

    /// Result type.
    pub fn ty(&self) -> &'g ValueType {
        self.graph.ty(self.value)
    }

    /// Type of the `index`-th operand.
    #[track_caller]
    pub fn operand_ty(&self, index: usize) -> &'g ValueType {
        self.graph.ty(self.op().operands()[index])
    }

    /// Fact rank of the result.
    pub fn rank(&self) -> usize {
        self.ty().fact_rank()
    }

    /// Result extents in fact space.
    pub fn shape(&self) -> SmallVec<[i64; 4]> {
        self.ty().fact_shape()
    }
}

/// Contract check shared by every rule.
#[track_caller]
pub(crate) fn expect_operands(ctx: &OpContext<'_>, operands: &[AxisInfo], arity: usize) {
    assert_eq!(operands.len(), arity, "{:?} expects {arity} operand facts", ctx.op().kind());
    for (index, info) in operands.iter().enumerate() {
        assert_eq!(
            info.rank(),
            ctx.operand_ty(index).fact_rank(),
            "operand {index} of {:?} has a fact of the wrong rank",
            ctx.op().kind()
        );
    }
}

/// The binary operator a value applies, with `AddPtr` treated as `Add`.
#[track_caller]
pub(crate) fn binary_op(ctx: &OpContext<'_>) -> BinaryOp {
    match ctx.op() {
        Op::Binary(op, ..) => *op,
        Op::AddPtr { .. } => BinaryOp::Add,
        other => panic!("{:?} is not a binary operation", other.kind()),
    }
}

// =========================================================================
// Binary skeleton
// =========================================================================

/// Per-dimension combinator: `(op, lhs, rhs, dim) -> entry`.
pub type DimRule = fn(BinaryOp, &AxisInfo, &AxisInfo, usize) -> i64;

/// Whole-value constant folder.
pub type ConstantRule = fn(BinaryOp, &AxisInfo, &AxisInfo) -> Option<i64>;

/// How one family of binary operators combines its operand facts.
#[derive(Debug, Clone, Copy)]
pub struct BinaryPolicy {
    pub divisibility: DimRule,
    pub stride: DimRule,
    pub stride_value: DimRule,
    pub constant: ConstantRule,
}

/// Apply `policy` dimension by dimension.
///
/// When the constant folds, every dimension becomes exact: divisibility from
/// the folded value, the longer of the two operand runs, step zero.
pub fn binary_transfer(policy: &BinaryPolicy, ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
    expect_operands(ctx, operands, 2);
    let op = binary_op(ctx);
    let (lhs, rhs) = (&operands[0], &operands[1]);
    let constant = (policy.constant)(op, lhs, rhs);

    let mut result = AxisInfo::top(ctx.rank());
    for d in 0..ctx.rank() {
        match constant {
            Some(value) => {
                result.set_dim(d, highest_pow_of_2_divisor(value), lhs.stride(d).max(rhs.stride(d)), 0);
            }
            None => result.set_dim(
                d,
                (policy.divisibility)(op, lhs, rhs, d),
                (policy.stride)(op, lhs, rhs, d),
                (policy.stride_value)(op, lhs, rhs, d),
            ),
        }
    }
    result.with_constant(constant)
}

/// Fold both constants through the operator's exact semantics.
pub(crate) fn fold_constants(op: BinaryOp, lhs: &AxisInfo, rhs: &AxisInfo) -> Option<i64> {
    op.evaluate(lhs.constant_value()?, rhs.constant_value()?)
}
