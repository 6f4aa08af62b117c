//! Arena-backed value graph.
//!
//! Every value is defined by exactly one [`Op`] and carries a [`ValueType`].
//! Values are addressed by dense [`ValueId`]s in creation order. Operands must
//! already exist when an op is created; the one exception is
//! [`Graph::add_merge_input`], which closes loop back-edges after the loop body
//! has been built, so the graph may contain cycles through merges.

use smallvec::SmallVec;
use snafu::{OptionExt, ensure};
use tilir_dtype::DType;
use tilir_dtype::ext::IntLiteral;

use crate::error::*;
use crate::shape::{Shape, ValueType, validate_broadcast, validate_shape};
use crate::types::{AtomicKind, BinaryOp, CastOp, CmpPredicate, RmwOp};
use crate::{Op, OpKind, Result};

/// Dense handle of a value inside a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

impl ValueId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ValueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// A value together with its defining operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub op: Op,
    pub ty: ValueType,
}

/// Value dependency graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

/// Macro for integer binary operations: both operands share one integer type.
macro_rules! binary_int_ops {
    ($($method:ident => $op:ident),+ $(,)?) => {
        $(
            #[track_caller]
            pub fn $method(&mut self, lhs: ValueId, rhs: ValueId) -> Result<ValueId> {
                self.binary(BinaryOp::$op, lhs, rhs)
            }
        )+
    };
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All value ids in creation order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = ValueId> + ExactSizeIterator + use<> {
        (0..self.nodes.len() as u32).map(ValueId)
    }

    pub fn contains(&self, value: ValueId) -> bool {
        value.index() < self.nodes.len()
    }

    #[track_caller]
    pub fn node(&self, value: ValueId) -> &Node {
        &self.nodes[value.index()]
    }

    #[track_caller]
    pub fn op(&self, value: ValueId) -> &Op {
        &self.node(value).op
    }

    #[track_caller]
    pub fn ty(&self, value: ValueId) -> &ValueType {
        &self.node(value).ty
    }

    /// Dependents of every value, indexed by `ValueId::index`. A user appears
    /// once per value even if it references it through several operands.
    pub fn users(&self) -> Vec<SmallVec<[ValueId; 4]>> {
        let mut users: Vec<SmallVec<[ValueId; 4]>> = vec![SmallVec::new(); self.nodes.len()];
        for user in self.values() {
            for operand in self.op(user).operands() {
                let list = &mut users[operand.index()];
                if !list.contains(&user) {
                    list.push(user);
                }
            }
        }
        users
    }

    /// Dependents of a single value.
    pub fn users_of(&self, value: ValueId) -> SmallVec<[ValueId; 4]> {
        self.values().filter(|&user| self.op(user).operands().contains(&value)).collect()
    }

    /// Redirect every use of `old` to `new`. Types must match.
    pub fn replace_all_uses(&mut self, old: ValueId, new: ValueId) -> Result<()> {
        self.check(old)?;
        self.check(new)?;
        self.expect_same_type(OpKind::Merge, old, new)?;
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if index != new.index() {
                node.op.replace_operand(old, new);
            }
        }
        tracing::trace!(%old, %new, "replaced all uses");
        Ok(())
    }

    // =========================================================================
    // Leaves
    // =========================================================================

    pub fn arg(&mut self, index: usize, ty: ValueType) -> Result<ValueId> {
        validate_shape(&ty.shape)?;
        Ok(self.push(Op::Arg { index }, ty))
    }

    /// Integer literal of type `ty` (splatted when `ty` is a tensor).
    pub fn constant(&mut self, value: i64, ty: ValueType) -> Result<ValueId> {
        validate_shape(&ty.shape)?;
        ensure!(ty.dtype.is_int(), InvalidDTypeSnafu { kind: OpKind::Const, dtype: ty.dtype });
        Ok(self.push(Op::Const(value), ty))
    }

    /// Scalar integer literal typed after a Rust primitive.
    pub fn const_of<T: IntLiteral>(&mut self, value: T) -> Result<ValueId> {
        self.constant(value.to_literal(), ValueType::scalar(T::DTYPE))
    }

    /// Scalar `i1` literal.
    pub fn const_bool(&mut self, value: bool) -> Result<ValueId> {
        self.constant(value as i64, ValueType::scalar(DType::Bool))
    }

    pub fn const_float(&mut self, value: f64, ty: ValueType) -> Result<ValueId> {
        validate_shape(&ty.shape)?;
        ensure!(ty.dtype.is_float(), InvalidDTypeSnafu { kind: OpKind::ConstFloat, dtype: ty.dtype });
        Ok(self.push(Op::ConstFloat(value), ty))
    }

    // =========================================================================
    // Elementwise
    // =========================================================================

    pub fn cast(&mut self, cast: CastOp, src: ValueId, dtype: DType) -> Result<ValueId> {
        self.check(src)?;
        let src_ty = self.ty(src).clone();
        let kind = OpKind::Cast(cast);
        let accepted = match cast {
            CastOp::IntToPtr => src_ty.dtype.is_int() && dtype.is_ptr(),
            CastOp::PtrToInt => src_ty.dtype.is_ptr() && dtype.is_int(),
            CastOp::Bitcast => src_ty.dtype.bytes() == dtype.bytes(),
            CastOp::ExtS | CastOp::ExtU | CastOp::Trunc | CastOp::IndexCast => {
                src_ty.dtype.is_int() && dtype.is_int()
            }
        };
        ensure!(accepted, InvalidDTypeSnafu { kind, dtype });
        Ok(self.push(Op::Cast(cast, src), src_ty.with_dtype(dtype)))
    }

    #[track_caller]
    pub fn binary(&mut self, op: BinaryOp, lhs: ValueId, rhs: ValueId) -> Result<ValueId> {
        let kind = OpKind::Binary(op);
        self.check(lhs)?;
        self.check(rhs)?;
        self.expect_same_type(kind, lhs, rhs)?;
        let ty = self.ty(lhs).clone();
        ensure!(ty.dtype.is_int(), InvalidDTypeSnafu { kind, dtype: ty.dtype });
        Ok(self.push(Op::Binary(op, lhs, rhs), ty))
    }

    binary_int_ops! {
        try_add => Add, try_sub => Sub, try_mul => Mul,
        try_div_s => DivS, try_div_u => DivU, try_rem_s => RemS, try_rem_u => RemU,
        try_shl => Shl, try_shr_s => ShrS, try_shr_u => ShrU,
        try_and => And, try_or => Or, try_xor => Xor,
        try_max_s => MaxS, try_max_u => MaxU, try_min_s => MinS, try_min_u => MinU,
    }

    pub fn add_ptr(&mut self, ptr: ValueId, offset: ValueId) -> Result<ValueId> {
        self.check(ptr)?;
        self.check(offset)?;
        let ptr_ty = self.ty(ptr).clone();
        let offset_ty = self.ty(offset);
        ensure!(ptr_ty.dtype.is_ptr(), ExpectedPointerSnafu { kind: OpKind::AddPtr, actual: ptr_ty.dtype });
        ensure!(
            offset_ty.dtype.is_int(),
            InvalidDTypeSnafu { kind: OpKind::AddPtr, dtype: offset_ty.dtype.clone() }
        );
        ensure!(
            ptr_ty.shape == offset_ty.shape,
            ShapeMismatchSnafu { kind: OpKind::AddPtr, lhs: ptr_ty.shape.clone(), rhs: offset_ty.shape.clone() }
        );
        Ok(self.push(Op::AddPtr { ptr, offset }, ptr_ty))
    }

    pub fn cmp(&mut self, predicate: CmpPredicate, lhs: ValueId, rhs: ValueId) -> Result<ValueId> {
        self.check(lhs)?;
        self.check(rhs)?;
        self.expect_same_type(OpKind::Cmp, lhs, rhs)?;
        let ty = self.ty(lhs).with_dtype(DType::Bool);
        Ok(self.push(Op::Cmp(predicate, lhs, rhs), ty))
    }

    /// Choose between `on_true` and `on_false`. The condition is either a scalar
    /// or has the branches' shape.
    pub fn select(&mut self, cond: ValueId, on_true: ValueId, on_false: ValueId) -> Result<ValueId> {
        self.check(cond)?;
        self.check(on_true)?;
        self.check(on_false)?;
        self.expect_same_type(OpKind::Select, on_true, on_false)?;
        let cond_ty = self.ty(cond);
        let ty = self.ty(on_true).clone();
        ensure!(cond_ty.dtype.is_bool(), ConditionNotBoolSnafu { actual: cond_ty.dtype.clone() });
        ensure!(
            cond_ty.is_scalar() || cond_ty.shape == ty.shape,
            ShapeMismatchSnafu { kind: OpKind::Select, lhs: cond_ty.shape.clone(), rhs: ty.shape.clone() }
        );
        Ok(self.push(Op::Select { cond, on_true, on_false }, ty))
    }

    // =========================================================================
    // Shape
    // =========================================================================

    /// `tensor<(end - start) x i32>` holding `start..end`.
    pub fn make_range(&mut self, start: i64, end: i64) -> Result<ValueId> {
        ensure!(start < end, EmptyRangeSnafu { start, end });
        let ty = ValueType::tensor(DType::Int32, &[(end - start) as usize]);
        Ok(self.push(Op::MakeRange { start, end }, ty))
    }

    pub fn splat(&mut self, src: ValueId, shape: &[usize]) -> Result<ValueId> {
        self.check(src)?;
        let src_ty = self.ty(src);
        ensure!(src_ty.is_scalar(), ExpectedScalarSnafu { kind: OpKind::Splat, shape: src_ty.shape.clone() });
        let ty = ValueType { dtype: src_ty.dtype.clone(), shape: validate_shape(shape)? };
        Ok(self.push(Op::Splat(src), ty))
    }

    pub fn broadcast(&mut self, src: ValueId, shape: &[usize]) -> Result<ValueId> {
        self.check(src)?;
        let src_ty = self.ty(src);
        validate_broadcast(&src_ty.shape, shape)?;
        let ty = ValueType { dtype: src_ty.dtype.clone(), shape: validate_shape(shape)? };
        Ok(self.push(Op::Broadcast(src), ty))
    }

    pub fn expand_dims(&mut self, src: ValueId, axis: usize) -> Result<ValueId> {
        self.check(src)?;
        let src_ty = self.ty(src);
        ensure!(axis <= src_ty.rank(), ExpandAxisInvalidSnafu { axis, rank: src_ty.rank() });
        let mut shape: Shape = src_ty.shape.clone();
        shape.insert(axis, 1);
        let ty = ValueType { dtype: src_ty.dtype.clone(), shape };
        Ok(self.push(Op::ExpandDims { src, axis }, ty))
    }

    pub fn reshape(&mut self, src: ValueId, shape: &[usize]) -> Result<ValueId> {
        self.check(src)?;
        let src_ty = self.ty(src);
        let shape = validate_shape(shape)?;
        let (input_size, output_size) = (src_ty.num_elements(), shape.iter().product::<usize>());
        ensure!(input_size == output_size, ReshapeSizeMismatchSnafu { input_size, output_size });
        let ty = ValueType { dtype: src_ty.dtype.clone(), shape };
        Ok(self.push(Op::Reshape(src), ty))
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    /// Merge value seeded with `init`. Further inputs (typically the loop
    /// back-edge) are attached with [`Graph::add_merge_input`].
    pub fn merge(&mut self, init: ValueId) -> Result<ValueId> {
        self.check(init)?;
        let ty = self.ty(init).clone();
        let mut inputs = SmallVec::new();
        inputs.push(init);
        Ok(self.push(Op::Merge { inputs }, ty))
    }

    pub fn add_merge_input(&mut self, merge: ValueId, input: ValueId) -> Result<()> {
        self.check(merge)?;
        self.check(input)?;
        self.expect_same_type(OpKind::Merge, merge, input)?;
        let Op::Merge { inputs } = &mut self.nodes[merge.index()].op else {
            return NotAMergeSnafu { value: merge }.fail();
        };
        inputs.push(input);
        Ok(())
    }

    // =========================================================================
    // Memory
    // =========================================================================

    pub fn atomic_rmw(&mut self, op: RmwOp, ptr: ValueId, value: ValueId, mask: Option<ValueId>) -> Result<ValueId> {
        self.check(ptr)?;
        self.check(value)?;
        let ptr_ty = self.ty(ptr);
        let value_ty = self.ty(value).clone();
        let pointee = ptr_ty
            .dtype
            .pointee()
            .context(ExpectedPointerSnafu { kind: OpKind::AtomicRmw, actual: ptr_ty.dtype.clone() })?;
        ensure!(
            *pointee == value_ty.dtype,
            DTypeMismatchSnafu { kind: OpKind::AtomicRmw, lhs: pointee.clone(), rhs: value_ty.dtype.clone() }
        );
        ensure!(
            ptr_ty.shape == value_ty.shape,
            ShapeMismatchSnafu { kind: OpKind::AtomicRmw, lhs: ptr_ty.shape.clone(), rhs: value_ty.shape.clone() }
        );
        if let Some(mask) = mask {
            self.check_mask(OpKind::AtomicRmw, mask, &value_ty.shape)?;
        }
        Ok(self.push(Op::AtomicRmw { op, ptr, value, mask }, value_ty))
    }

    pub fn gather_atomic_rmw(
        &mut self,
        kind: AtomicKind,
        base: ValueId,
        values: ValueId,
        indices: ValueId,
        mask: Option<ValueId>,
    ) -> Result<ValueId> {
        let op_kind = OpKind::GatherAtomicRmw;
        self.check(base)?;
        self.check(values)?;
        self.check(indices)?;
        let base_ty = self.ty(base);
        let values_ty = self.ty(values).clone();
        let indices_ty = self.ty(indices);
        ensure!(base_ty.dtype.is_ptr(), ExpectedPointerSnafu { kind: op_kind, actual: base_ty.dtype.clone() });
        ensure!(base_ty.is_scalar(), ExpectedScalarSnafu { kind: op_kind, shape: base_ty.shape.clone() });
        ensure!(indices_ty.dtype.is_int(), InvalidDTypeSnafu { kind: op_kind, dtype: indices_ty.dtype.clone() });
        ensure!(
            indices_ty.shape == values_ty.shape,
            ShapeMismatchSnafu { kind: op_kind, lhs: values_ty.shape.clone(), rhs: indices_ty.shape.clone() }
        );
        if let Some(mask) = mask {
            self.check(mask)?;
            let mask_ty = self.ty(mask);
            ensure!(mask_ty.dtype.is_int(), InvalidDTypeSnafu { kind: op_kind, dtype: mask_ty.dtype.clone() });
            ensure!(
                mask_ty.shape == values_ty.shape,
                ShapeMismatchSnafu { kind: op_kind, lhs: values_ty.shape.clone(), rhs: mask_ty.shape.clone() }
            );
        }
        Ok(self.push(Op::GatherAtomicRmw { kind, base, values, indices, mask }, values_ty))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn push(&mut self, op: Op, ty: ValueType) -> ValueId {
        let id = ValueId(self.nodes.len() as u32);
        tracing::trace!(value = %id, kind = ?op.kind(), ty = %ty, "created value");
        self.nodes.push(Node { op, ty });
        id
    }

    fn check(&self, value: ValueId) -> Result<()> {
        ensure!(self.contains(value), UnknownValueSnafu { value, len: self.nodes.len() });
        Ok(())
    }

    fn check_mask(&self, kind: OpKind, mask: ValueId, shape: &Shape) -> Result<()> {
        self.check(mask)?;
        let mask_ty = self.ty(mask);
        ensure!(mask_ty.dtype.is_bool(), ConditionNotBoolSnafu { actual: mask_ty.dtype.clone() });
        ensure!(mask_ty.shape == *shape, ShapeMismatchSnafu { kind, lhs: shape.clone(), rhs: mask_ty.shape.clone() });
        Ok(())
    }

    fn expect_same_type(&self, kind: OpKind, lhs: ValueId, rhs: ValueId) -> Result<()> {
        let (lhs, rhs) = (self.ty(lhs), self.ty(rhs));
        ensure!(lhs.dtype == rhs.dtype, DTypeMismatchSnafu { kind, lhs: lhs.dtype.clone(), rhs: rhs.dtype.clone() });
        ensure!(lhs.shape == rhs.shape, ShapeMismatchSnafu { kind, lhs: lhs.shape.clone(), rhs: rhs.shape.clone() });
        Ok(())
    }
}
