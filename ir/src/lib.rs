//! Host intermediate representation for tilir.
//!
//! A [`Graph`] is an arena of typed values. Each value is produced by exactly one
//! [`Op`]; analyses key their dispatch on the payload-free [`OpKind`] tag.
//!
//! # Module Organization
//!
//! - [`types`] - Operator enums (binary, cast, compare, atomic)
//! - [`op`] - Operation enum and its operand accessors
//! - [`shape`] - Value types and shape validation
//! - [`graph`] - Value arena with validated builders
//! - [`error`] - Error types and result handling

pub mod error;
pub mod graph;
pub mod op;
pub mod shape;
pub mod types;


pub use error::{Error, Result};
pub use graph::{Graph, Node, ValueId};
pub use op::{Op, OpKind};
pub use shape::{Shape, ValueType};
pub use types::{AtomicKind, BinaryOp, CastOp, CmpPredicate, RmwOp};

pub use tilir_dtype::{AddrSpace, DType, ScalarDType};
