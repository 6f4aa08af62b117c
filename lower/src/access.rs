//! Memory access shape derived from the axis facts of an offset.

use tilir_axis::AxisInfo;
use tilir_ir::ValueType;

/// How the innermost dimension of an offset walks memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPattern {
    /// Every lane touches the same element.
    Uniform,
    /// Runs of `width` consecutive elements; `aligned` when each run starts at
    /// a multiple of `width`.
    Contiguous { width: i64, aligned: bool },
    /// Runs with a fixed, non-unit step between neighbours.
    Strided { step: i64 },
    /// Nothing useful is known.
    Gather,
}

impl AccessPattern {
    pub fn classify(info: &AxisInfo, ty: &ValueType) -> Self {
        let shape = ty.fact_shape();
        let dim = shape.len() - 1;
        let extent = shape[dim];

        if info.constancy(dim) >= extent {
            return Self::Uniform;
        }
        if info.contiguity(dim) > 1 {
            let width = info.contiguity(dim).min(extent);
            return Self::Contiguous { width, aligned: info.divisibility(dim) % width == 0 };
        }
        if info.stride(dim) > 1 && info.is_strided_dim(&shape, dim) && info.stride_value(dim) != 0 {
            return Self::Strided { step: info.stride_value(dim) };
        }
        Self::Gather
    }

    pub fn is_vectorizable(&self) -> bool {
        matches!(self, Self::Uniform | Self::Contiguous { .. })
    }
}

impl std::fmt::Display for AccessPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uniform => write!(f, "uniform"),
            Self::Contiguous { width, aligned: true } => write!(f, "contiguous({width}, aligned)"),
            Self::Contiguous { width, aligned: false } => write!(f, "contiguous({width})"),
            Self::Strided { step } => write!(f, "strided({step})"),
            Self::Gather => write!(f, "gather"),
        }
    }
}
