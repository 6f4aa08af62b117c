//! Small graphs whose last value is the op under test.

use tilir_dtype::DType;
use tilir_ir::{BinaryOp, CmpPredicate, Graph, ValueId, ValueType};

use crate::info::{AxisInfo, MAX_DIVISIBILITY};
use crate::registry::default_registry;
use crate::transfer::OpContext;

pub fn i32_ty(shape: &[usize]) -> ValueType {
    ValueType::tensor(DType::Int32, shape)
}

/// `arg0 <op> arg1` over `i32` values of `shape` (empty for scalars).
pub fn binary(op: BinaryOp, shape: &[usize]) -> (Graph, ValueId) {
    let mut g = Graph::new();
    let a = g.arg(0, i32_ty(shape)).unwrap();
    let b = g.arg(1, i32_ty(shape)).unwrap();
    let v = g.binary(op, a, b).unwrap();
    (g, v)
}

pub fn cmp(predicate: CmpPredicate, shape: &[usize]) -> (Graph, ValueId) {
    let mut g = Graph::new();
    let a = g.arg(0, i32_ty(shape)).unwrap();
    let b = g.arg(1, i32_ty(shape)).unwrap();
    let v = g.cmp(predicate, a, b).unwrap();
    (g, v)
}

/// Run the default rule for `value` on hand-written operand facts.
pub fn apply(graph: &Graph, value: ValueId, operands: &[AxisInfo]) -> AxisInfo {
    default_registry().transfer(&OpContext::new(graph, value), operands)
}

/// Rank-1 fact.
pub fn fact(divisibility: i64, stride: i64, stride_value: i64, constant: Option<i64>) -> AxisInfo {
    AxisInfo::new(&[divisibility], &[stride], &[stride_value], constant)
}

/// Fact of `make_range(0, len)`.
pub fn range(len: i64) -> AxisInfo {
    fact(MAX_DIVISIBILITY, len, 1, None)
}
