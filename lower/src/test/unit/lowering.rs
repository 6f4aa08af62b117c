//! `AtomicRmw` rewrites on whole graphs.

use tilir_axis::AnalysisConfig;
use tilir_dtype::{AddrSpace, DType};
use tilir_ir::{AtomicKind, CastOp, Graph, Op, RmwOp, ValueId, ValueType};

use crate::access::AccessPattern;
use crate::atomic::{AtomicRmwLowering, LoweringPath};
use crate::error::Error;

fn lowering() -> AtomicRmwLowering {
    AtomicRmwLowering::new(AnalysisConfig::default())
}

fn ptr_arg(g: &mut Graph, index: usize, elem: DType) -> ValueId {
    g.arg(index, ValueType::scalar(elem.ptr(AddrSpace::Global))).unwrap()
}

/// `base + pid * 128 + range(0, 128)` as a tensor of pointers.
fn block_pointers(g: &mut Graph, elem: DType) -> ValueId {
    let base = ptr_arg(g, 0, elem);
    let pid = g.arg(1, ValueType::scalar(DType::Int32)).unwrap();
    let block = g.const_of(128i32).unwrap();
    let start = g.try_mul(pid, block).unwrap();
    let start = g.splat(start, &[128]).unwrap();
    let lanes = g.make_range(0, 128).unwrap();
    let offsets = g.try_add(start, lanes).unwrap();
    let ptrs = g.splat(base, &[128]).unwrap();
    g.add_ptr(ptrs, offsets).unwrap()
}

// =========================================================================
// Scattered path
// =========================================================================

#[test]
fn test_contiguous_block_atomic() {
    let mut g = Graph::new();
    let ptrs = block_pointers(&mut g, DType::Int32);
    let values = g.arg(2, ValueType::tensor(DType::Int32, &[128])).unwrap();
    let atomic = g.atomic_rmw(RmwOp::Add, ptrs, values, None).unwrap();
    let user = g.try_add(atomic, values).unwrap();

    let lowered = lowering().lower_all(&mut g).unwrap();
    assert_eq!(lowered.len(), 1);
    let lowered = &lowered[0];
    assert_eq!(lowered.atomic, atomic);
    assert_eq!(lowered.kind, AtomicKind::AddI);
    assert_eq!(lowered.path, LoweringPath::Scattered);
    assert_eq!(lowered.pattern, AccessPattern::Contiguous { width: 128, aligned: true });

    let Op::GatherAtomicRmw { kind, base, values: gathered_values, mask, .. } = g.op(lowered.replacement).clone() else {
        panic!("expected a gather atomic, got {:?}", g.op(lowered.replacement));
    };
    assert_eq!(kind, AtomicKind::AddI);
    assert!(matches!(g.op(base), Op::Arg { index: 0 }));
    assert_eq!(gathered_values, values);
    assert_eq!(mask, None);

    assert!(g.users_of(atomic).is_empty());
    assert_eq!(*g.op(user), Op::Binary(tilir_ir::BinaryOp::Add, lowered.replacement, values));
}

#[test]
fn test_masked_2d_atomic_is_flattened() {
    let mut g = Graph::new();
    let base = ptr_arg(&mut g, 0, DType::Float32);
    let ptrs = g.splat(base, &[4, 16]).unwrap();
    let offsets = g.arg(1, ValueType::tensor(DType::Int32, &[4, 16])).unwrap();
    let ptrs = g.add_ptr(ptrs, offsets).unwrap();
    let values = g.arg(2, ValueType::tensor(DType::Float32, &[4, 16])).unwrap();
    let mask = g.arg(3, ValueType::tensor(DType::Bool, &[4, 16])).unwrap();
    let atomic = g.atomic_rmw(RmwOp::Max, ptrs, values, Some(mask)).unwrap();

    let lowered = lowering().lower(&mut g, atomic).unwrap();
    assert_eq!(lowered.kind, AtomicKind::MaximumF);
    assert_eq!(lowered.path, LoweringPath::Scattered);
    assert_eq!(lowered.pattern, AccessPattern::Gather);
    assert_eq!(*g.ty(lowered.replacement), ValueType::tensor(DType::Float32, &[4, 16]));

    let Op::Reshape(gathered) = *g.op(lowered.replacement) else {
        panic!("expected the result to be reshaped back");
    };
    let Op::GatherAtomicRmw { base: gathered_base, values: flat_values, indices, mask: Some(flat_mask), .. } =
        g.op(gathered).clone()
    else {
        panic!("expected a masked gather atomic");
    };
    assert_eq!(gathered_base, base);
    assert_eq!(*g.op(flat_values), Op::Reshape(values));
    assert_eq!(*g.op(indices), Op::Reshape(offsets));
    assert_eq!(*g.ty(flat_mask), ValueType::tensor(DType::Int8, &[64]));
    let Op::Cast(CastOp::ExtS, bool_mask) = *g.op(flat_mask) else {
        panic!("expected the mask to be sign-extended");
    };
    assert_eq!(*g.op(bool_mask), Op::Reshape(mask));
}

// =========================================================================
// Scalar path
// =========================================================================

#[test]
fn test_masked_scalar_atomic() {
    let mut g = Graph::new();
    let base = ptr_arg(&mut g, 0, DType::Float32);
    let pid = g.arg(1, ValueType::scalar(DType::Int32)).unwrap();
    let ptr = g.add_ptr(base, pid).unwrap();
    let value = g.arg(2, ValueType::scalar(DType::Float32)).unwrap();
    let mask = g.arg(3, ValueType::scalar(DType::Bool)).unwrap();
    let atomic = g.atomic_rmw(RmwOp::FAdd, ptr, value, Some(mask)).unwrap();

    let lowered = lowering().lower(&mut g, atomic).unwrap();
    assert_eq!(lowered.path, LoweringPath::Scalar);
    assert_eq!(lowered.pattern, AccessPattern::Uniform);
    assert_eq!(*g.ty(lowered.replacement), ValueType::scalar(DType::Float32));

    let Op::Select { cond, on_true, on_false } = *g.op(lowered.replacement) else {
        panic!("expected a select on the mask");
    };
    assert_eq!(cond, mask);
    assert_eq!(*g.op(on_false), Op::ConstFloat(0.0));

    let Op::Reshape(gathered) = *g.op(on_true) else {
        panic!("expected the single element to be reshaped to a scalar");
    };
    let Op::GatherAtomicRmw { kind, base: moved, indices, mask: gather_mask, .. } = g.op(gathered).clone() else {
        panic!("expected a gather atomic");
    };
    assert_eq!(kind, AtomicKind::AddF);
    assert_eq!(*g.op(moved), Op::AddPtr { ptr: base, offset: pid });
    assert_eq!(*g.op(indices), Op::Const(0));
    assert_eq!(*g.ty(indices), ValueType::tensor(DType::Int32, &[1]));
    assert!(gather_mask.is_some(), "a false mask must skip the update");
}

#[test]
fn test_unmasked_scalar_atomic() {
    let mut g = Graph::new();
    let base = ptr_arg(&mut g, 0, DType::Int64);
    let value = g.const_of(1i64).unwrap();
    let atomic = g.atomic_rmw(RmwOp::Xchg, base, value, None).unwrap();

    let lowered = lowering().lower(&mut g, atomic).unwrap();
    assert_eq!(lowered.kind, AtomicKind::Xchg);
    let Op::Reshape(gathered) = *g.op(lowered.replacement) else {
        panic!("expected a reshape");
    };
    assert!(matches!(g.op(gathered), Op::GatherAtomicRmw { mask: None, .. }));
}

// =========================================================================
// Chained atomics
// =========================================================================

/// Values that still read an `AtomicRmw` result.
fn atomic_readers(g: &Graph) -> Vec<ValueId> {
    g.values()
        .filter(|&v| g.op(v).operands().iter().any(|&operand| matches!(g.op(operand), Op::AtomicRmw { .. })))
        .collect()
}

#[test]
fn test_atomic_feeding_atomic_value() {
    let mut g = Graph::new();
    let base = ptr_arg(&mut g, 0, DType::Int32);
    let ptrs = g.splat(base, &[16]).unwrap();
    let lanes = g.make_range(0, 16).unwrap();
    let ptrs = g.add_ptr(ptrs, lanes).unwrap();
    let values = g.arg(1, ValueType::tensor(DType::Int32, &[16])).unwrap();
    let first = g.atomic_rmw(RmwOp::Add, ptrs, values, None).unwrap();
    let second = g.atomic_rmw(RmwOp::Add, ptrs, first, None).unwrap();
    let user = g.try_add(second, values).unwrap();

    let lowered = lowering().lower_all(&mut g).unwrap();
    assert_eq!(lowered.len(), 2);
    let (first_new, second_new) = (lowered[0].replacement, lowered[1].replacement);

    let Op::GatherAtomicRmw { values: second_values, .. } = *g.op(second_new) else {
        panic!("expected a gather atomic, got {:?}", g.op(second_new));
    };
    assert_eq!(second_values, first_new);
    assert_eq!(*g.op(user), Op::Binary(tilir_ir::BinaryOp::Add, second_new, values));

    let readers = atomic_readers(&g);
    assert!(readers.is_empty(), "values still reading an atomic: {readers:?}");
}

#[test]
fn test_atomic_feeding_atomic_offset() {
    // slot = atomic_add(counter, 1); table[slot] = value
    let mut g = Graph::new();
    let counter = ptr_arg(&mut g, 0, DType::Int32);
    let one = g.const_of(1i32).unwrap();
    let slot = g.atomic_rmw(RmwOp::Add, counter, one, None).unwrap();
    let table = ptr_arg(&mut g, 1, DType::Int32);
    let entry = g.add_ptr(table, slot).unwrap();
    let value = g.arg(2, ValueType::scalar(DType::Int32)).unwrap();
    g.atomic_rmw(RmwOp::Xchg, entry, value, None).unwrap();

    let lowered = lowering().lower_all(&mut g).unwrap();
    let slot_new = lowered[0].replacement;

    let Op::Reshape(gathered) = *g.op(lowered[1].replacement) else {
        panic!("expected a reshape");
    };
    let Op::GatherAtomicRmw { base: moved, .. } = *g.op(gathered) else {
        panic!("expected a gather atomic");
    };
    assert_eq!(*g.op(moved), Op::AddPtr { ptr: table, offset: slot_new });
    assert!(g.users_of(slot).is_empty());
}

// =========================================================================
// Failures
// =========================================================================

#[test]
fn test_unsupported_kind_fails() {
    let mut g = Graph::new();
    let base = ptr_arg(&mut g, 0, DType::Float32);
    let value = g.arg(1, ValueType::scalar(DType::Float32)).unwrap();
    let atomic = g.atomic_rmw(RmwOp::Add, base, value, None).unwrap();

    let err = lowering().lower(&mut g, atomic).unwrap_err();
    assert!(matches!(err, Error::UnsupportedAtomic { op: RmwOp::Add, .. }));
}

#[test]
fn test_lower_all_stops_at_first_error() {
    let mut g = Graph::new();
    let fbase = ptr_arg(&mut g, 0, DType::Float32);
    let fvalue = g.arg(1, ValueType::scalar(DType::Float32)).unwrap();
    let bad = g.atomic_rmw(RmwOp::And, fbase, fvalue, None).unwrap();
    let ibase = ptr_arg(&mut g, 2, DType::Int32);
    let ivalue = g.const_of(1i32).unwrap();
    let good = g.atomic_rmw(RmwOp::Or, ibase, ivalue, None).unwrap();
    let user = g.try_add(good, ivalue).unwrap();

    assert!(lowering().lower_all(&mut g).is_err());
    assert!(matches!(g.op(bad), Op::AtomicRmw { .. }));
    assert_eq!(g.users_of(good).as_slice(), &[user]);
}

#[test]
fn test_not_an_atomic() {
    let mut g = Graph::new();
    let value = g.const_of(1i32).unwrap();
    let err = lowering().lower(&mut g, value).unwrap_err();
    assert!(matches!(err, Error::NotAnAtomic { value: v } if v == value));
}

#[test]
fn test_untracked_pointer_fails() {
    let mut g = Graph::new();
    let ptr_ty = DType::Int32.ptr(AddrSpace::Global);
    let ptrs = g.arg(0, ValueType::tensor(ptr_ty, &[8])).unwrap();
    let values = g.arg(1, ValueType::tensor(DType::Int32, &[8])).unwrap();
    g.atomic_rmw(RmwOp::Add, ptrs, values, None).unwrap();

    assert!(matches!(lowering().lower_all(&mut g), Err(Error::UntrackedPointer { .. })));
}

// =========================================================================
// Bookkeeping
// =========================================================================

#[test]
fn test_graph_without_atomics() {
    let mut g = Graph::new();
    g.make_range(0, 8).unwrap();
    let len = g.len();
    assert!(lowering().lower_all(&mut g).unwrap().is_empty());
    assert_eq!(g.len(), len);
}

#[test]
fn test_lowers_in_value_order() {
    let mut g = Graph::new();
    let base = ptr_arg(&mut g, 0, DType::Int32);
    let one = g.const_of(1i32).unwrap();
    let first = g.atomic_rmw(RmwOp::UMax, base, one, None).unwrap();
    let second = g.atomic_rmw(RmwOp::Min, base, one, None).unwrap();

    let lowered = lowering().lower_all(&mut g).unwrap();
    let order: Vec<_> = lowered.iter().map(|l| (l.atomic, l.kind)).collect();
    assert_eq!(order, vec![(first, AtomicKind::MaxU), (second, AtomicKind::MinS)]);
}

#[test]
#[tracing_test::traced_test]
fn test_logs_path_and_pattern() {
    let mut g = Graph::new();
    let ptrs = block_pointers(&mut g, DType::Float32);
    let values = g.arg(2, ValueType::tensor(DType::Float32, &[128])).unwrap();
    g.atomic_rmw(RmwOp::FAdd, ptrs, values, None).unwrap();

    lowering().lower_all(&mut g).unwrap();
    assert!(logs_contain("lowered atomic rmw"));
    assert!(logs_contain("Scattered"));
    assert!(logs_contain("contiguous(128, aligned)"));
}
