//! Operation enum and implementation.
//!
//! The [`Op`] enum defines every operation a [`crate::Graph`] value can be defined
//! by. [`OpKind`] is the payload-free tag used to key analysis dispatch tables.

use smallvec::SmallVec;

use crate::ValueId;
use crate::types::*;

/// Operation type with typed operands.
///
/// Each operation encodes its operand structure directly in the enum variant,
/// so operand count is fixed by construction. `Merge` is the only variable-arity
/// op and the only one allowed to reference values defined after it (loop
/// back-edges).
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    // Leaves
    /// Integer literal, splatted over the result shape for tensors.
    Const(i64),
    /// Float literal, splatted over the result shape for tensors.
    ConstFloat(f64),
    /// Function argument.
    Arg { index: usize },

    // Elementwise
    Cast(CastOp, ValueId),
    Binary(BinaryOp, ValueId, ValueId),
    /// Pointer plus element offset.
    AddPtr { ptr: ValueId, offset: ValueId },
    Cmp(CmpPredicate, ValueId, ValueId),
    Select { cond: ValueId, on_true: ValueId, on_false: ValueId },

    // Shape
    /// 1-D tensor `[start, start + 1, ..., end - 1]`.
    MakeRange { start: i64, end: i64 },
    /// Replicate a scalar to the result shape.
    Splat(ValueId),
    /// Replicate extent-1 dimensions to the result shape.
    Broadcast(ValueId),
    /// Insert an extent-1 dimension at `axis`.
    ExpandDims { src: ValueId, axis: usize },
    /// Reinterpret the element order under a new shape with the same element count.
    Reshape(ValueId),

    // Control flow
    /// Control-flow merge: the value is one of `inputs`, chosen at run time.
    /// Loop-carried values are merges whose inputs include a back-edge.
    Merge { inputs: SmallVec<[ValueId; 2]> },

    // Memory
    /// Source-level atomic RMW through a (tensor of) pointer(s).
    AtomicRmw { op: RmwOp, ptr: ValueId, value: ValueId, mask: Option<ValueId> },
    /// Lowered atomic RMW: `values`, `indices` and `mask` share one shape; `base`
    /// is a scalar pointer and `indices` are element offsets from it.
    GatherAtomicRmw { kind: AtomicKind, base: ValueId, values: ValueId, indices: ValueId, mask: Option<ValueId> },
}

/// Payload-free operation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Const,
    ConstFloat,
    Arg,
    Cast(CastOp),
    Binary(BinaryOp),
    AddPtr,
    Cmp,
    Select,
    MakeRange,
    Splat,
    Broadcast,
    ExpandDims,
    Reshape,
    Merge,
    AtomicRmw,
    GatherAtomicRmw,
}

impl OpKind {
    pub fn from_op(op: &Op) -> Self {
        match op {
            Op::Const(_) => Self::Const,
            Op::ConstFloat(_) => Self::ConstFloat,
            Op::Arg { .. } => Self::Arg,
            Op::Cast(cast, _) => Self::Cast(*cast),
            Op::Binary(bin, ..) => Self::Binary(*bin),
            Op::AddPtr { .. } => Self::AddPtr,
            Op::Cmp(..) => Self::Cmp,
            Op::Select { .. } => Self::Select,
            Op::MakeRange { .. } => Self::MakeRange,
            Op::Splat(_) => Self::Splat,
            Op::Broadcast(_) => Self::Broadcast,
            Op::ExpandDims { .. } => Self::ExpandDims,
            Op::Reshape(_) => Self::Reshape,
            Op::Merge { .. } => Self::Merge,
            Op::AtomicRmw { .. } => Self::AtomicRmw,
            Op::GatherAtomicRmw { .. } => Self::GatherAtomicRmw,
        }
    }
}

impl Op {
    pub fn kind(&self) -> OpKind {
        OpKind::from_op(self)
    }

    /// Operands in positional order.
    pub fn operands(&self) -> SmallVec<[ValueId; 4]> {
        match self {
            Self::Const(_) | Self::ConstFloat(_) | Self::Arg { .. } | Self::MakeRange { .. } => SmallVec::new(),

            Self::Cast(_, x) | Self::Splat(x) | Self::Broadcast(x) | Self::Reshape(x) => SmallVec::from_slice(&[*x]),
            Self::ExpandDims { src, .. } => SmallVec::from_slice(&[*src]),

            Self::Binary(_, a, b) | Self::Cmp(_, a, b) => SmallVec::from_slice(&[*a, *b]),
            Self::AddPtr { ptr, offset } => SmallVec::from_slice(&[*ptr, *offset]),
            Self::Select { cond, on_true, on_false } => SmallVec::from_slice(&[*cond, *on_true, *on_false]),

            Self::Merge { inputs } => inputs.iter().copied().collect(),

            Self::AtomicRmw { ptr, value, mask, .. } => {
                let mut operands = SmallVec::from_slice(&[*ptr, *value]);
                operands.extend(*mask);
                operands
            }
            Self::GatherAtomicRmw { base, values, indices, mask, .. } => {
                let mut operands = SmallVec::from_slice(&[*base, *values, *indices]);
                operands.extend(*mask);
                operands
            }
        }
    }

    /// Rewrite every operand equal to `from` into `to`.
    pub(crate) fn replace_operand(&mut self, from: ValueId, to: ValueId) {
        let swap = |v: &mut ValueId| {
            if *v == from {
                *v = to;
            }
        };
        match self {
            Self::Const(_) | Self::ConstFloat(_) | Self::Arg { .. } | Self::MakeRange { .. } => {}
            Self::Cast(_, x) | Self::Splat(x) | Self::Broadcast(x) | Self::Reshape(x) => swap(x),
            Self::ExpandDims { src, .. } => swap(src),
            Self::Binary(_, a, b) | Self::Cmp(_, a, b) => {
                swap(a);
                swap(b);
            }
            Self::AddPtr { ptr, offset } => {
                swap(ptr);
                swap(offset);
            }
            Self::Select { cond, on_true, on_false } => {
                swap(cond);
                swap(on_true);
                swap(on_false);
            }
            Self::Merge { inputs } => inputs.iter_mut().for_each(swap),
            Self::AtomicRmw { ptr, value, mask, .. } => {
                swap(ptr);
                swap(value);
                if let Some(m) = mask {
                    swap(m);
                }
            }
            Self::GatherAtomicRmw { base, values, indices, mask, .. } => {
                swap(base);
                swap(values);
                swap(indices);
                if let Some(m) = mask {
                    swap(m);
                }
            }
        }
    }

    /// Check if this operation has side effects and must not be removed.
    pub fn has_side_effects(&self) -> bool {
        matches!(self, Self::AtomicRmw { .. } | Self::GatherAtomicRmw { .. })
    }
}
