//! Error types for lowering passes.

use snafu::Snafu;
use tilir_dtype::DType;
use tilir_ir::{OpKind, RmwOp, ValueId};

/// Result type for lowering operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that abort a single rewrite.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// No hardware primitive exists for this operator on this element type.
    #[snafu(display("no atomic primitive for {op:?} on {dtype}"))]
    UnsupportedAtomic { op: RmwOp, dtype: DType },

    /// Pointer chain ends in something other than a scalar base pointer.
    #[snafu(display("cannot track pointer {value} through {kind:?}"))]
    UntrackedPointer { value: ValueId, kind: OpKind },

    /// Value passed to the atomic lowering is not an `AtomicRmw`.
    #[snafu(display("{value} is not an atomic read-modify-write"))]
    NotAnAtomic { value: ValueId },

    /// Building the replacement ops failed.
    #[snafu(display("IR error: {source}"))]
    Ir {
        #[snafu(source)]
        source: tilir_ir::Error,
    },
}
