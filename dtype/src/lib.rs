//! Element types for tilir values.
//!
//! A [`DType`] is either a scalar element type or a pointer to one. Lowering passes
//! only need a handful of classification predicates (signed, unsigned, float, index),
//! so the type set is deliberately small.

pub mod ext;


/// Address space for pointer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AddrSpace {
    /// Global/device memory.
    #[default]
    Global,
    /// Local/shared memory.
    Local,
}

/// Scalar data types (base numeric types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::Display)]
pub enum ScalarDType {
    #[strum(serialize = "i1")]
    Bool,

    #[strum(serialize = "i8")]
    Int8,
    #[strum(serialize = "u8")]
    UInt8,
    #[strum(serialize = "i16")]
    Int16,
    #[strum(serialize = "u16")]
    UInt16,
    #[strum(serialize = "i32")]
    Int32,
    #[strum(serialize = "u32")]
    UInt32,
    #[strum(serialize = "i64")]
    Int64,
    #[strum(serialize = "u64")]
    UInt64,

    #[strum(serialize = "f16")]
    Float16,
    #[strum(serialize = "bf16")]
    BFloat16,
    #[strum(serialize = "f32")]
    Float32,
    #[strum(serialize = "f64")]
    Float64,

    /// Index type for offsets and loop induction values.
    #[strum(serialize = "index")]
    Index,
}

/// Element type of a value: a scalar element or a pointer to one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DType {
    /// Scalar type (single value per tensor element).
    Scalar(ScalarDType),

    /// Pointer type.
    Ptr { base: Box<DType>, addrspace: AddrSpace },
}

impl ScalarDType {
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 => 4,
            Self::Int64 | Self::UInt64 => 8,
            Self::Float16 | Self::BFloat16 => 2,
            Self::Float32 => 4,
            Self::Float64 => 8,
            Self::Index => 8, // Treat as 64-bit index
        }
    }

    /// Bit width of the type (`Bool` is a single bit).
    pub const fn bits(&self) -> u32 {
        match self {
            Self::Bool => 1,
            _ => (self.bytes() * 8) as u32,
        }
    }

    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    pub const fn is_unsigned(&self) -> bool {
        matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }

    /// Integer or index. `Bool` is an `i1` integer as far as arithmetic goes.
    pub const fn is_int(&self) -> bool {
        self.is_signed() || self.is_unsigned() || matches!(self, Self::Index | Self::Bool)
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float16 | Self::BFloat16 | Self::Float32 | Self::Float64)
    }
}

impl From<ScalarDType> for DType {
    fn from(scalar: ScalarDType) -> Self {
        Self::Scalar(scalar)
    }
}

impl DType {
    /// Create a pointer type from this dtype.
    pub fn ptr(self, addrspace: AddrSpace) -> Self {
        match self {
            Self::Ptr { .. } => panic!("Cannot make a pointer from a pointer"),
            _ => Self::Ptr { base: Box::new(self), addrspace },
        }
    }

    pub fn scalar(&self) -> Option<ScalarDType> {
        match self {
            Self::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    /// Pointee type for pointers, `None` otherwise.
    pub fn pointee(&self) -> Option<&DType> {
        match self {
            Self::Ptr { base, .. } => Some(base),
            _ => None,
        }
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self, Self::Ptr { .. })
    }

    /// Get the base scalar type (for pointers, the pointee's).
    pub fn base(&self) -> ScalarDType {
        match self {
            Self::Scalar(s) => *s,
            Self::Ptr { base, .. } => base.base(),
        }
    }

    pub fn bytes(&self) -> usize {
        match self {
            Self::Scalar(s) => s.bytes(),
            Self::Ptr { .. } => 8, // Pointers are 64-bit
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.scalar(), Some(ScalarDType::Bool))
    }

    pub fn is_signed(&self) -> bool {
        self.scalar().is_some_and(|s| s.is_signed())
    }

    pub fn is_unsigned(&self) -> bool {
        self.scalar().is_some_and(|s| s.is_unsigned())
    }

    pub fn is_int(&self) -> bool {
        self.scalar().is_some_and(|s| s.is_int())
    }

    pub fn is_float(&self) -> bool {
        self.scalar().is_some_and(|s| s.is_float())
    }

    /// Integer-like types the axis analysis reasons about: integers, index and pointers.
    pub fn is_int_or_ptr(&self) -> bool {
        self.is_int() || self.is_ptr()
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Ptr { base, addrspace: AddrSpace::Global } => write!(f, "!ptr<{base}>"),
            Self::Ptr { base, addrspace: AddrSpace::Local } => write!(f, "!ptr<{base}, local>"),
        }
    }
}

// Shorthand constants for scalar dtypes
#[allow(non_upper_case_globals)]
impl DType {
    pub const Bool: Self = Self::Scalar(ScalarDType::Bool);
    pub const Int8: Self = Self::Scalar(ScalarDType::Int8);
    pub const Int16: Self = Self::Scalar(ScalarDType::Int16);
    pub const Int32: Self = Self::Scalar(ScalarDType::Int32);
    pub const Int64: Self = Self::Scalar(ScalarDType::Int64);
    pub const UInt8: Self = Self::Scalar(ScalarDType::UInt8);
    pub const UInt16: Self = Self::Scalar(ScalarDType::UInt16);
    pub const UInt32: Self = Self::Scalar(ScalarDType::UInt32);
    pub const UInt64: Self = Self::Scalar(ScalarDType::UInt64);
    pub const Float16: Self = Self::Scalar(ScalarDType::Float16);
    pub const BFloat16: Self = Self::Scalar(ScalarDType::BFloat16);
    pub const Float32: Self = Self::Scalar(ScalarDType::Float32);
    pub const Float64: Self = Self::Scalar(ScalarDType::Float64);
    pub const Index: Self = Self::Scalar(ScalarDType::Index);
}
