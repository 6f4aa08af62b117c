//! The per-value axis fact and its lattice operations.

use smallvec::SmallVec;

use crate::utils::{gcd, highest_pow_of_2_divisor};

/// Weakest divisibility and run length: every integer is a multiple of 1 and
/// every element trivially starts a run of one.
pub const INIT_VALUE: i64 = 1;

/// Per-step delta that is not known.
pub const UNKNOWN_STRIDE_VALUE: i64 = -1;

/// Divisibility of zero, the largest power of two an `i64` fact tracks.
pub const MAX_DIVISIBILITY: i64 = 1 << 62;

/// One entry per dimension; tile ranks rarely exceed four.
pub type DimVec = SmallVec<[i64; 4]>;

/// Arithmetic summary of an integer (or pointer) value along each dimension.
///
/// * `divisibility[d]` - power of two dividing the first element of every run
///   along `d` (every element, when the runs are constant).
/// * `stride[d]` - run length: elements come in runs of this many consecutive
///   entries along `d`, each run an arithmetic progression with step
///   `stride_value[d]`.
/// * `stride_value[d]` - the step of those progressions, or
///   [`UNKNOWN_STRIDE_VALUE`]. A step of `0` means the run is constant.
/// * `constant_value` - the single literal every element equals, if known.
///
/// Scalars carry rank 1 and are treated as one dimension of extent 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AxisInfo {
    divisibility: DimVec,
    stride: DimVec,
    stride_value: DimVec,
    constant_value: Option<i64>,
}

impl AxisInfo {
    /// Build a fact from explicit per-dimension vectors.
    ///
    /// # Panics
    ///
    /// Panics if the vectors disagree in length.
    #[track_caller]
    pub fn new(divisibility: &[i64], stride: &[i64], stride_value: &[i64], constant_value: Option<i64>) -> Self {
        assert!(
            divisibility.len() == stride.len() && stride.len() == stride_value.len(),
            "axis info rank mismatch: divisibility {}, stride {}, stride value {}",
            divisibility.len(),
            stride.len(),
            stride_value.len()
        );
        Self {
            divisibility: SmallVec::from_slice(divisibility),
            stride: SmallVec::from_slice(stride),
            stride_value: SmallVec::from_slice(stride_value),
            constant_value,
        }
    }

    /// The fact that states nothing, for a value of fact rank `rank`.
    pub fn top(rank: usize) -> Self {
        Self {
            divisibility: SmallVec::from_elem(INIT_VALUE, rank),
            stride: SmallVec::from_elem(INIT_VALUE, rank),
            stride_value: SmallVec::from_elem(UNKNOWN_STRIDE_VALUE, rank),
            constant_value: None,
        }
    }

    /// Exact fact of a value that is `value` everywhere over `shape`
    /// (extents in fact space, see `ValueType::fact_shape`).
    pub fn constant(value: i64, shape: &[i64]) -> Self {
        Self {
            divisibility: SmallVec::from_elem(highest_pow_of_2_divisor(value), shape.len()),
            stride: SmallVec::from_slice(shape),
            stride_value: SmallVec::from_elem(0, shape.len()),
            constant_value: Some(value),
        }
    }

    pub fn zero(shape: &[i64]) -> Self {
        Self::constant(0, shape)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn rank(&self) -> usize {
        self.divisibility.len()
    }

    #[track_caller]
    pub fn divisibility(&self, dim: usize) -> i64 {
        self.divisibility[dim]
    }

    #[track_caller]
    pub fn stride(&self, dim: usize) -> i64 {
        self.stride[dim]
    }

    #[track_caller]
    pub fn stride_value(&self, dim: usize) -> i64 {
        self.stride_value[dim]
    }

    pub fn constant_value(&self) -> Option<i64> {
        self.constant_value
    }

    pub fn divisibilities(&self) -> &[i64] {
        &self.divisibility
    }

    pub fn strides(&self) -> &[i64] {
        &self.stride
    }

    pub fn stride_values(&self) -> &[i64] {
        &self.stride_value
    }

    pub fn is_top(&self) -> bool {
        *self == Self::top(self.rank())
    }

    // =========================================================================
    // Derived predicates
    // =========================================================================

    /// Length of unit-step runs along `dim`.
    pub fn contiguity(&self, dim: usize) -> i64 {
        if self.stride_value(dim) == 1 { self.stride(dim) } else { INIT_VALUE }
    }

    /// Length of constant runs along `dim`.
    pub fn constancy(&self, dim: usize) -> i64 {
        if self.stride_value(dim) == 0 { self.stride(dim) } else { INIT_VALUE }
    }

    /// Whole dimension holds one value.
    pub fn is_constant_dim(&self, shape: &[i64], dim: usize) -> bool {
        self.constancy(dim) == shape[dim]
    }

    /// Whole dimension is a single unit-step progression.
    pub fn is_contiguous_dim(&self, shape: &[i64], dim: usize) -> bool {
        self.contiguity(dim) == shape[dim]
    }

    pub fn is_unit_step(&self, dim: usize) -> bool {
        self.stride_value(dim) == 1
    }

    /// Dimension is made of progressions with a known step that fit in the extent.
    pub fn is_strided_dim(&self, shape: &[i64], dim: usize) -> bool {
        self.stride_value(dim) != UNKNOWN_STRIDE_VALUE && self.stride(dim) <= shape[dim]
    }

    // =========================================================================
    // Lattice
    // =========================================================================

    /// Least precise fact implied by both `self` and `other`.
    ///
    /// # Panics
    ///
    /// Panics if the ranks differ.
    #[track_caller]
    pub fn join(&self, other: &Self) -> Self {
        assert_eq!(self.rank(), other.rank(), "cannot join axis info of different ranks");
        let pointwise = |a: &DimVec, b: &DimVec| -> DimVec { a.iter().zip(b).map(|(&x, &y)| gcd(x, y)).collect() };
        let stride_value = self
            .stride_value
            .iter()
            .zip(&other.stride_value)
            .map(|(&x, &y)| if x == y { x } else { UNKNOWN_STRIDE_VALUE })
            .collect();
        let constant_value = match (self.constant_value, other.constant_value) {
            (Some(x), Some(y)) if x == y => Some(x),
            _ => None,
        };
        Self {
            divisibility: pointwise(&self.divisibility, &other.divisibility),
            stride: pointwise(&self.stride, &other.stride),
            stride_value,
            constant_value,
        }
    }

    /// Whether every claim `self` makes also follows from `other`, i.e. `self`
    /// is at most as precise as `other`.
    pub fn is_weaker_or_equal(&self, other: &Self) -> bool {
        if self.rank() != other.rank() {
            return false;
        }
        let divides = |a: &DimVec, b: &DimVec| a.iter().zip(b).all(|(&x, &y)| x != 0 && y % x == 0);
        let steps = self.stride_value.iter().zip(&other.stride_value).all(|(&x, &y)| x == UNKNOWN_STRIDE_VALUE || x == y);
        let constant = self.constant_value.is_none() || self.constant_value == other.constant_value;
        divides(&self.divisibility, &other.divisibility) && divides(&self.stride, &other.stride) && steps && constant
    }

    /// Replace dimension `dim` with the given triple.
    pub(crate) fn set_dim(&mut self, dim: usize, divisibility: i64, stride: i64, stride_value: i64) {
        self.divisibility[dim] = divisibility;
        self.stride[dim] = stride;
        self.stride_value[dim] = stride_value;
    }

    pub(crate) fn with_constant(mut self, constant_value: Option<i64>) -> Self {
        self.constant_value = constant_value;
        self
    }
}

impl std::fmt::Display for AxisInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{div={:?}, stride={:?}, step={:?}, const=",
            self.divisibility.as_slice(),
            self.stride.as_slice(),
            self.stride_value.as_slice()
        )?;
        match self.constant_value {
            Some(value) => write!(f, "{value}}}"),
            None => write!(f, "none}}"),
        }
    }
}
