//! Type definitions for IR operations.
//!
//! This module contains the operator enums carried by [`crate::Op`] variants:
//! integer binary operators, cast flavours, comparison predicates and the two
//! atomic read-modify-write vocabularies (source-level and hardware-level).

/// Integer binary operation types.
///
/// All binary operations preserve the LHS dtype. Signed/unsigned flavours are
/// distinct operators because their exact semantics differ on the same bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BinaryOp {
    /// Addition: a + b (wrapping)
    Add,
    /// Subtraction: a - b (wrapping)
    Sub,
    /// Multiplication: a * b (wrapping)
    Mul,
    /// Signed division, truncated toward zero.
    DivS,
    /// Unsigned division.
    DivU,
    /// Signed remainder; the result has the sign of the dividend.
    RemS,
    /// Unsigned remainder.
    RemU,
    /// Left shift: a << b
    Shl,
    /// Arithmetic right shift.
    ShrS,
    /// Logical right shift.
    ShrU,
    /// Bitwise AND: a & b
    And,
    /// Bitwise OR: a | b
    Or,
    /// Bitwise XOR: a ^ b
    Xor,
    /// Signed maximum.
    MaxS,
    /// Unsigned maximum.
    MaxU,
    /// Signed minimum.
    MinS,
    /// Unsigned minimum.
    MinU,
}

impl BinaryOp {
    /// Returns true if this is a bitwise operation.
    pub fn is_bitwise(self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Xor | Self::Shl | Self::ShrS | Self::ShrU)
    }

    /// Returns true if this operation is commutative.
    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Mul | Self::And | Self::Or | Self::Xor | Self::MaxS | Self::MaxU | Self::MinS | Self::MinU
        )
    }

    /// Evaluate on 64-bit operands. `None` when the result is undefined
    /// (division by zero, shift amount outside `0..64`).
    pub fn evaluate(self, lhs: i64, rhs: i64) -> Option<i64> {
        let (ul, ur) = (lhs as u64, rhs as u64);
        Some(match self {
            Self::Add => lhs.wrapping_add(rhs),
            Self::Sub => lhs.wrapping_sub(rhs),
            Self::Mul => lhs.wrapping_mul(rhs),
            Self::DivS => lhs.checked_div(rhs)?,
            Self::DivU => ul.checked_div(ur)? as i64,
            Self::RemS => lhs.checked_rem(rhs)?,
            Self::RemU => ul.checked_rem(ur)? as i64,
            Self::Shl => lhs.checked_shl(shift_amount(rhs)?)?,
            Self::ShrS => lhs.checked_shr(shift_amount(rhs)?)?,
            Self::ShrU => ul.checked_shr(shift_amount(rhs)?)? as i64,
            Self::And => lhs & rhs,
            Self::Or => lhs | rhs,
            Self::Xor => lhs ^ rhs,
            Self::MaxS => lhs.max(rhs),
            Self::MaxU => ul.max(ur) as i64,
            Self::MinS => lhs.min(rhs),
            Self::MinU => ul.min(ur) as i64,
        })
    }
}

fn shift_amount(rhs: i64) -> Option<u32> {
    u32::try_from(rhs).ok().filter(|&s| s < 64)
}

/// Cast flavours. Every cast is value-preserving as far as axis facts go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CastOp {
    /// Sign extension.
    ExtS,
    /// Zero extension.
    ExtU,
    /// Integer truncation.
    Trunc,
    /// Integer <-> index conversion.
    IndexCast,
    /// Same-width reinterpretation.
    Bitcast,
    IntToPtr,
    PtrToInt,
}

/// Integer comparison predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CmpPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

impl CmpPredicate {
    /// Evaluate the predicate on two 64-bit operands.
    ///
    /// Unsigned predicates compare the operands' bit patterns as `u64`.
    pub fn evaluate(self, lhs: i64, rhs: i64) -> bool {
        let (ul, ur) = (lhs as u64, rhs as u64);
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Slt => lhs < rhs,
            Self::Sle => lhs <= rhs,
            Self::Sgt => lhs > rhs,
            Self::Sge => lhs >= rhs,
            Self::Ult => ul < ur,
            Self::Ule => ul <= ur,
            Self::Ugt => ul > ur,
            Self::Uge => ul >= ur,
        }
    }

    /// Strict less-than / greater-than predicates (signed or unsigned).
    pub fn is_strict_ordering(self) -> bool {
        matches!(self, Self::Slt | Self::Sgt | Self::Ult | Self::Ugt)
    }
}

/// Source-level atomic read-modify-write operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RmwOp {
    And,
    Or,
    Xor,
    /// Integer add.
    Add,
    /// Float add.
    FAdd,
    /// Maximum; signedness or floatness comes from the element type.
    Max,
    /// Minimum; signedness or floatness comes from the element type.
    Min,
    /// Unsigned maximum.
    UMax,
    /// Unsigned minimum.
    UMin,
    /// Exchange.
    Xchg,
}

/// Hardware atomic primitives targeted by lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AtomicKind {
    AndI,
    OrI,
    XorI,
    AddI,
    AddF,
    MaxS,
    MinS,
    MaxU,
    MinU,
    MaximumF,
    MinimumF,
    Xchg,
}
