//! Split a (tensor of) pointer(s) into a scalar base and an element offset.

use snafu::ResultExt;
use tilir_dtype::DType;
use tilir_ir::{CastOp, Graph, Op, ValueId, ValueType};

use crate::error::*;

/// Scalar base pointer plus the integer offsets added to it.
///
/// `offset` has the shape of the tracked pointer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerTracker {
    base: ValueId,
    offset: ValueId,
}

impl PointerTracker {
    /// Walk `AddPtr`, `Splat` and `Broadcast` chains from `ptr` down to a scalar
    /// pointer. Offsets met on the way are summed with new `Add` ops and
    /// replicated alongside the pointer. A chain without any `AddPtr` gets a
    /// zero offset.
    ///
    /// Any scalar pointer ends the walk. A tensor of pointers defined by
    /// anything else is [`Error::UntrackedPointer`].
    pub fn parse(graph: &mut Graph, ptr: ValueId) -> Result<Self> {
        let (base, offset) = walk(graph, ptr)?;
        let offset = match offset {
            Some(offset) => offset,
            None => {
                let shape = graph.ty(ptr).shape.clone();
                graph.constant(0, ValueType::tensor(DType::Int32, &shape)).context(IrSnafu)?
            }
        };
        tracing::trace!(%ptr, %base, %offset, "tracked pointer");
        Ok(Self { base, offset })
    }

    pub fn base(&self) -> ValueId {
        self.base
    }

    pub fn offset(&self) -> ValueId {
        self.offset
    }

    /// Rename both values, e.g. after their definitions were replaced.
    pub(crate) fn map(self, f: impl Fn(ValueId) -> ValueId) -> Self {
        Self { base: f(self.base), offset: f(self.offset) }
    }
}

fn walk(graph: &mut Graph, value: ValueId) -> Result<(ValueId, Option<ValueId>)> {
    match graph.op(value).clone() {
        Op::AddPtr { ptr, offset } => {
            let (base, inner) = walk(graph, ptr)?;
            let offset = match inner {
                Some(inner) => add_offsets(graph, inner, offset)?,
                None => offset,
            };
            Ok((base, Some(offset)))
        }
        Op::Splat(src) => {
            let (base, inner) = walk(graph, src)?;
            let shape = graph.ty(value).shape.clone();
            let offset = inner.map(|o| graph.splat(o, &shape)).transpose().context(IrSnafu)?;
            Ok((base, offset))
        }
        Op::Broadcast(src) => {
            let (base, inner) = walk(graph, src)?;
            let shape = graph.ty(value).shape.clone();
            let offset = inner.map(|o| graph.broadcast(o, &shape)).transpose().context(IrSnafu)?;
            Ok((base, offset))
        }
        _ if graph.ty(value).is_scalar() => Ok((value, None)),
        op => UntrackedPointerSnafu { value, kind: op.kind() }.fail(),
    }
}

/// `lhs + rhs`, widening the narrower offset first.
fn add_offsets(graph: &mut Graph, lhs: ValueId, rhs: ValueId) -> Result<ValueId> {
    let (lhs_dtype, rhs_dtype) = (graph.ty(lhs).dtype.clone(), graph.ty(rhs).dtype.clone());
    let (lhs, rhs) = if lhs_dtype == rhs_dtype {
        (lhs, rhs)
    } else if lhs_dtype.bytes() < rhs_dtype.bytes() {
        (widen(graph, lhs, rhs_dtype)?, rhs)
    } else {
        (lhs, widen(graph, rhs, lhs_dtype)?)
    };
    graph.try_add(lhs, rhs).context(IrSnafu)
}

fn widen(graph: &mut Graph, value: ValueId, dtype: DType) -> Result<ValueId> {
    let cast = if graph.ty(value).dtype.bytes() == dtype.bytes() { CastOp::IndexCast } else { CastOp::ExtS };
    graph.cast(cast, value, dtype).context(IrSnafu)
}
