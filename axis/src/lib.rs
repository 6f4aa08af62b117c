//! Integer axis-information inference for tilir graphs.
//!
//! For every integer or pointer value the analysis derives an [`AxisInfo`]:
//! per dimension, a power-of-two divisibility, the length of runs that form
//! arithmetic progressions and their step, plus an optional known constant.
//! Lowering passes use these facts to pick vectorised or scalar code paths.
//!
//! # Module Organization
//!
//! - [`info`] - The lattice element and its join
//! - [`utils`] - Power-of-two and gcd helpers
//! - [`transfer`] - Per-operator transfer functions
//! - [`registry`] - `OpKind` to transfer function dispatch
//! - [`analysis`] - Worklist fixpoint driver and query API
//! - [`config`] - Driver configuration
//!
//! # Example
//!
//! ```
//! use tilir_axis::AxisInfoAnalysis;
//! use tilir_ir::Graph;
//!
//! let mut graph = Graph::new();
//! let offsets = graph.make_range(0, 128).unwrap();
//! let analysis = AxisInfoAnalysis::run(&graph);
//! assert_eq!(analysis.get(offsets).contiguity(0), 128);
//! ```

pub mod analysis;
pub mod config;
pub mod info;
pub mod registry;
pub mod transfer;
pub mod utils;


pub use analysis::AxisInfoAnalysis;
pub use config::AnalysisConfig;
pub use info::{AxisInfo, INIT_VALUE, MAX_DIVISIBILITY, UNKNOWN_STRIDE_VALUE};
pub use registry::{AxisInfoRegistry, TransferFn, default_registry};
pub use transfer::{BinaryPolicy, OpContext};
