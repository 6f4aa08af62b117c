//! Atomic read-modify-write lowering.
//!
//! A source-level [`Op::AtomicRmw`] addresses memory through a (tensor of)
//! pointer(s). The target only offers [`Op::GatherAtomicRmw`]: one scalar base
//! pointer, flat 1-D values and element indices, and an optional `i8` mask.
//!
//! Scalar atomics move the base by their offset and issue a single-element
//! gather at index 0. A false mask skips the update and yields zero. Tensor
//! atomics flatten values, offsets and mask and reshape the result back.

use std::collections::HashMap;

use snafu::ResultExt;
use tilir_axis::{AnalysisConfig, AxisInfoAnalysis, default_registry};
use tilir_dtype::DType;
use tilir_ir::{AtomicKind, CastOp, Graph, Op, RmwOp, ValueId, ValueType};

use crate::access::AccessPattern;
use crate::error::*;
use crate::pointer::PointerTracker;

/// Hardware primitive for `op` on elements of type `elem`.
///
/// `Max`/`Min` pick the signed integer variant for integer and index elements
/// and the floating variant for floats. Combinations without a primitive
/// (integer `Add` on floats, bitwise ops on floats, `FAdd` on integers) fail.
pub fn atomic_kind(op: RmwOp, elem: &DType) -> Result<AtomicKind> {
    let (int, float) = (elem.is_int(), elem.is_float());
    let kind = match op {
        RmwOp::And if int => AtomicKind::AndI,
        RmwOp::Or if int => AtomicKind::OrI,
        RmwOp::Xor if int => AtomicKind::XorI,
        RmwOp::Add if int => AtomicKind::AddI,
        RmwOp::FAdd if float => AtomicKind::AddF,
        RmwOp::Max if int => AtomicKind::MaxS,
        RmwOp::Max if float => AtomicKind::MaximumF,
        RmwOp::Min if int => AtomicKind::MinS,
        RmwOp::Min if float => AtomicKind::MinimumF,
        RmwOp::UMax => AtomicKind::MaxU,
        RmwOp::UMin => AtomicKind::MinU,
        RmwOp::Xchg => AtomicKind::Xchg,
        _ => return UnsupportedAtomicSnafu { op, dtype: elem.clone() }.fail(),
    };
    Ok(kind)
}

/// Which rewrite an atomic went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoweringPath {
    Scalar,
    Scattered,
}

/// Record of one rewritten atomic.
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredAtomic {
    /// The original `AtomicRmw`. It keeps its node but has no users left.
    pub atomic: ValueId,
    /// Value now standing in for `atomic`.
    pub replacement: ValueId,
    pub kind: AtomicKind,
    pub path: LoweringPath,
    /// Access pattern of the tracked offsets.
    pub pattern: AccessPattern,
}

/// Operands of an `AtomicRmw` with its pointer already tracked.
#[derive(Debug, Clone, Copy)]
struct Target {
    atomic: ValueId,
    op: RmwOp,
    value: ValueId,
    mask: Option<ValueId>,
    pointer: PointerTracker,
}

/// Rewrites `AtomicRmw` ops into `GatherAtomicRmw`.
#[derive(Debug, Clone, Default)]
pub struct AtomicRmwLowering {
    config: AnalysisConfig,
}

impl AtomicRmwLowering {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Lowering with analysis configuration read from the environment.
    pub fn from_env() -> Self {
        Self::new(AnalysisConfig::from_env())
    }

    /// Rewrite the single atomic `atomic`.
    pub fn lower(&self, graph: &mut Graph, atomic: ValueId) -> Result<LoweredAtomic> {
        let target = track(graph, atomic)?;
        let analysis = AxisInfoAnalysis::run_with(graph, default_registry(), &self.config);
        let pattern = access_pattern(graph, &analysis, target.pointer.offset());
        rewrite(graph, target, pattern)
    }

    /// Rewrite every atomic in `graph`, in value order. Stops at the first error;
    /// atomics rewritten before it stay rewritten.
    #[tracing::instrument(skip_all, fields(values = graph.len()))]
    pub fn lower_all(&self, graph: &mut Graph) -> Result<Vec<LoweredAtomic>> {
        let atomics: Vec<ValueId> =
            graph.values().filter(|&v| matches!(graph.op(v), Op::AtomicRmw { .. })).collect();
        if atomics.is_empty() {
            return Ok(Vec::new());
        }

        // Offsets built while tracking pointers must exist before the analysis runs.
        let mut targets = Vec::with_capacity(atomics.len());
        for atomic in atomics {
            targets.push(track(graph, atomic)?);
        }
        let analysis = AxisInfoAnalysis::run_with(graph, default_registry(), &self.config);

        // Earlier rewrites redirect uses of their atomic; an atomic feeding a
        // later one must be read through its replacement.
        let mut replaced = HashMap::new();
        let mut lowered = Vec::with_capacity(targets.len());
        for target in targets {
            let pattern = access_pattern(graph, &analysis, target.pointer.offset());
            let done = rewrite(graph, target.refresh(graph, &replaced), pattern)?;
            replaced.insert(done.atomic, done.replacement);
            lowered.push(done);
        }
        tracing::debug!(count = lowered.len(), "lowered atomic rmw ops");
        Ok(lowered)
    }
}

fn track(graph: &mut Graph, atomic: ValueId) -> Result<Target> {
    let Op::AtomicRmw { op, ptr, value, mask } = graph.op(atomic).clone() else {
        return NotAnAtomicSnafu { value: atomic }.fail();
    };
    let pointer = PointerTracker::parse(graph, ptr)?;
    Ok(Target { atomic, op, value, mask, pointer })
}

impl Target {
    /// Operands as they stand now, with replaced atomics swapped for their replacements.
    fn refresh(self, graph: &Graph, replaced: &HashMap<ValueId, ValueId>) -> Self {
        let resolve = |v: ValueId| replaced.get(&v).copied().unwrap_or(v);
        let (value, mask) = match graph.op(self.atomic) {
            Op::AtomicRmw { value, mask, .. } => (*value, *mask),
            _ => (self.value, self.mask),
        };
        Self {
            value: resolve(value),
            mask: mask.map(resolve),
            pointer: self.pointer.map(resolve),
            ..self
        }
    }
}

fn access_pattern(graph: &Graph, analysis: &AxisInfoAnalysis, offset: ValueId) -> AccessPattern {
    AccessPattern::classify(&analysis.get(offset), graph.ty(offset))
}

fn rewrite(graph: &mut Graph, target: Target, pattern: AccessPattern) -> Result<LoweredAtomic> {
    let ty = graph.ty(target.atomic).clone();
    let kind = atomic_kind(target.op, &ty.dtype)?;

    let (path, replacement) = if ty.is_scalar() {
        (LoweringPath::Scalar, lower_scalar(graph, &target, kind, &ty)?)
    } else {
        (LoweringPath::Scattered, lower_scattered(graph, &target, kind, &ty)?)
    };
    tracing::debug!(atomic = %target.atomic, %replacement, %kind, ?path, %pattern, "lowered atomic rmw");

    graph.replace_all_uses(target.atomic, replacement).context(IrSnafu)?;
    Ok(LoweredAtomic { atomic: target.atomic, replacement, kind, path, pattern })
}

fn lower_scalar(graph: &mut Graph, target: &Target, kind: AtomicKind, ty: &ValueType) -> Result<ValueId> {
    let base = graph.add_ptr(target.pointer.base(), target.pointer.offset()).context(IrSnafu)?;
    let values = graph.reshape(target.value, &[1]).context(IrSnafu)?;
    let index = graph.constant(0, ValueType::tensor(DType::Int32, &[1])).context(IrSnafu)?;
    let mask = target.mask.map(|m| widen_mask(graph, m, &[1])).transpose()?;

    let gathered = graph.gather_atomic_rmw(kind, base, values, index, mask).context(IrSnafu)?;
    let result = graph.reshape(gathered, &[]).context(IrSnafu)?;
    let Some(mask) = target.mask else {
        return Ok(result);
    };

    let zero = if ty.dtype.is_float() { graph.const_float(0.0, ty.clone()) } else { graph.constant(0, ty.clone()) };
    let zero = zero.context(IrSnafu)?;
    graph.select(mask, result, zero).context(IrSnafu)
}

fn lower_scattered(graph: &mut Graph, target: &Target, kind: AtomicKind, ty: &ValueType) -> Result<ValueId> {
    let flat = [ty.num_elements()];
    let values = flatten(graph, target.value, &flat)?;
    let indices = flatten(graph, target.pointer.offset(), &flat)?;
    let mask = target.mask.map(|m| widen_mask(graph, m, &flat)).transpose()?;

    let gathered = graph.gather_atomic_rmw(kind, target.pointer.base(), values, indices, mask).context(IrSnafu)?;
    if ty.rank() == 1 {
        return Ok(gathered);
    }
    graph.reshape(gathered, &ty.shape).context(IrSnafu)
}

fn flatten(graph: &mut Graph, value: ValueId, shape: &[usize]) -> Result<ValueId> {
    if graph.ty(value).shape.as_slice() == shape {
        return Ok(value);
    }
    graph.reshape(value, shape).context(IrSnafu)
}

/// Flatten a bool mask and sign-extend it to `i8`.
fn widen_mask(graph: &mut Graph, mask: ValueId, shape: &[usize]) -> Result<ValueId> {
    let flat = flatten(graph, mask, shape)?;
    graph.cast(CastOp::ExtS, flat, DType::Int8).context(IrSnafu)
}
