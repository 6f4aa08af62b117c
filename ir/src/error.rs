use snafu::Snafu;
use tilir_dtype::DType;

use crate::shape::Shape;
use crate::{OpKind, ValueId};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Operand id does not belong to this graph.
    #[snafu(display("unknown value {value:?} (graph has {len} values)"))]
    UnknownValue { value: ValueId, len: usize },

    /// DType mismatch between operands.
    #[snafu(display("dtype mismatch in {kind:?}: {lhs} vs {rhs}"))]
    DTypeMismatch { kind: OpKind, lhs: DType, rhs: DType },

    /// Operand dtype not accepted by the operation (e.g. a float in an integer op).
    #[snafu(display("invalid dtype for {kind:?}: {dtype}"))]
    InvalidDType { kind: OpKind, dtype: DType },

    /// Shape mismatch in elementwise operation.
    #[snafu(display("shape mismatch in {kind:?}: {lhs:?} vs {rhs:?}"))]
    ShapeMismatch { kind: OpKind, lhs: Shape, rhs: Shape },

    /// Operation requires a scalar operand.
    #[snafu(display("{kind:?} requires a scalar operand, got shape {shape:?}"))]
    ExpectedScalar { kind: OpKind, shape: Shape },

    /// Zero-sized dimension.
    #[snafu(display("shape {shape:?} has a zero extent"))]
    ZeroExtent { shape: Shape },

    /// Broadcasting shape mismatch.
    #[snafu(display("cannot broadcast {src:?} to {target:?}"))]
    BroadcastShapeMismatch { src: Shape, target: Shape },

    /// Reshape size mismatch.
    #[snafu(display("reshape size mismatch: input size {input_size} != output size {output_size}"))]
    ReshapeSizeMismatch { input_size: usize, output_size: usize },

    /// ExpandDims axis beyond the result rank.
    #[snafu(display("expand_dims axis {axis} is invalid for rank {rank}"))]
    ExpandAxisInvalid { axis: usize, rank: usize },

    /// Range with `end <= start`.
    #[snafu(display("make_range requires start < end, got [{start}, {end})"))]
    EmptyRange { start: i64, end: i64 },

    /// Select condition must be bool.
    #[snafu(display("select condition must be i1, got {actual}"))]
    ConditionNotBool { actual: DType },

    /// Pointer operand expected.
    #[snafu(display("{kind:?} requires a pointer operand, got {actual}"))]
    ExpectedPointer { kind: OpKind, actual: DType },

    /// Value passed where a merge was expected.
    #[snafu(display("{value:?} is not defined by a merge"))]
    NotAMerge { value: ValueId },
}
