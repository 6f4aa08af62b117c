use super::*;

/// Rust integer primitives usable as integer literals.
pub trait IntLiteral: Copy {
    const DTYPE: DType;

    /// Value widened to the 64-bit literal payload (unsigned types wrap).
    fn to_literal(self) -> i64;
}

macro_rules! impl_int_literal {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(impl IntLiteral for $ty {
            const DTYPE: DType = DType::$dtype;

            fn to_literal(self) -> i64 {
                self as i64
            }
        })*
    };
}

impl_int_literal! {
    bool => Bool,
    i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64,
    u8 => UInt8, u16 => UInt16, u32 => UInt32, u64 => UInt64,
    usize => Index,
}
