//! Lowering passes driven by axis information.
//!
//! # Module Organization
//!
//! - [`atomic`] - `AtomicRmw` to `GatherAtomicRmw` rewrite and the atomic kind mapping
//! - [`pointer`] - Base pointer and offset tracking
//! - [`access`] - Access pattern classification from axis facts
//! - [`error`] - Error types and result handling
//!
//! # Example
//!
//! ```
//! use tilir_ir::{AddrSpace, DType, Graph, RmwOp, ValueType};
//! use tilir_lower::{AccessPattern, AtomicRmwLowering, LoweringPath};
//!
//! let mut graph = Graph::new();
//! let ptr_ty = ValueType::scalar(DType::Float32.ptr(AddrSpace::Global));
//! let base = graph.arg(0, ptr_ty).unwrap();
//! let ptrs = graph.splat(base, &[64]).unwrap();
//! let offsets = graph.make_range(0, 64).unwrap();
//! let ptrs = graph.add_ptr(ptrs, offsets).unwrap();
//! let values = graph.arg(1, ValueType::tensor(DType::Float32, &[64])).unwrap();
//! graph.atomic_rmw(RmwOp::FAdd, ptrs, values, None).unwrap();
//!
//! let lowered = AtomicRmwLowering::default().lower_all(&mut graph).unwrap();
//! assert_eq!(lowered[0].path, LoweringPath::Scattered);
//! assert_eq!(lowered[0].pattern, AccessPattern::Contiguous { width: 64, aligned: true });
//! ```

pub mod access;
pub mod atomic;
pub mod error;
pub mod pointer;


pub use access::AccessPattern;
pub use atomic::{AtomicRmwLowering, LoweredAtomic, LoweringPath, atomic_kind};
pub use error::{Error, Result};
pub use pointer::PointerTracker;
