//! Operator-kind to transfer-function dispatch.
//!
//! # Architecture
//!
//! `AxisInfoRegistry` stores transfer functions in a `HashMap<OpKind, Arc<TransferFn>>`.
//! A family of kinds sharing one rule (every cast, signed and unsigned division,
//! ...) is registered with a single call and shares one closure.
//!
//! Kinds without a handler are not an error: [`AxisInfoRegistry::transfer`]
//! answers [`AxisInfo::top`] for them, so hosts can add new operations without
//! touching the registry.
//!
//! ```ignore
//! let mut registry = AxisInfoRegistry::with_defaults();
//! registry.register(&[OpKind::Reshape], |ctx, operands| operands[0].clone());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tilir_ir::{BinaryOp, CastOp, OpKind};

use crate::info::AxisInfo;
use crate::transfer::{self, OpContext};

/// Transfer function type.
///
/// Receives the value being analysed and the facts of its operands in operand
/// order; returns the fact of the result.
pub type TransferFn = dyn Fn(&OpContext<'_>, &[AxisInfo]) -> AxisInfo + Send + Sync;

/// Dispatch table from [`OpKind`] to its transfer function.
#[derive(Default)]
pub struct AxisInfoRegistry {
    handlers: HashMap<OpKind, Arc<TransferFn>>,
}

impl AxisInfoRegistry {
    /// Create an empty registry. Every kind answers top.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in rule.
    pub fn with_defaults() -> Self {
        use BinaryOp::*;

        let mut registry = Self::new();
        registry.register(&[OpKind::Const], transfer::constant::constant);
        registry.register(
            &[
                OpKind::Cast(CastOp::ExtS),
                OpKind::Cast(CastOp::ExtU),
                OpKind::Cast(CastOp::Trunc),
                OpKind::Cast(CastOp::IndexCast),
                OpKind::Cast(CastOp::Bitcast),
                OpKind::Cast(CastOp::IntToPtr),
                OpKind::Cast(CastOp::PtrToInt),
            ],
            transfer::constant::identity,
        );
        registry.register(&[OpKind::Binary(Add), OpKind::Binary(Sub), OpKind::AddPtr], transfer::arith::add_sub);
        registry.register(&[OpKind::Binary(Mul)], transfer::arith::mul);
        registry.register(&[OpKind::Binary(DivS), OpKind::Binary(DivU)], transfer::arith::div);
        registry.register(&[OpKind::Binary(RemS), OpKind::Binary(RemU)], transfer::arith::rem);
        registry.register(&[OpKind::Binary(Shl)], transfer::arith::shl);
        registry.register(&[OpKind::Binary(ShrS), OpKind::Binary(ShrU)], transfer::arith::shr);
        registry.register(
            &[
                OpKind::Binary(And),
                OpKind::Binary(Or),
                OpKind::Binary(Xor),
                OpKind::Binary(MaxS),
                OpKind::Binary(MaxU),
                OpKind::Binary(MinS),
                OpKind::Binary(MinU),
            ],
            transfer::logic::logic,
        );
        registry.register(&[OpKind::Cmp], transfer::compare::cmp);
        registry.register(&[OpKind::Select], transfer::select::select);
        registry.register(&[OpKind::MakeRange], transfer::shape::make_range);
        registry.register(&[OpKind::Broadcast], transfer::shape::broadcast);
        registry.register(&[OpKind::Splat], transfer::shape::splat);
        registry.register(&[OpKind::ExpandDims], transfer::shape::expand_dims);
        registry
    }

    /// Register `handler` for every kind in `kinds`, replacing earlier handlers.
    pub fn register<F>(&mut self, kinds: &[OpKind], handler: F)
    where
        F: Fn(&OpContext<'_>, &[AxisInfo]) -> AxisInfo + Send + Sync + 'static,
    {
        let shared: Arc<TransferFn> = Arc::new(handler);
        for &kind in kinds {
            if self.handlers.insert(kind, Arc::clone(&shared)).is_some() {
                tracing::trace!(op_kind = ?kind, "replaced axis info handler");
            }
        }
    }

    pub fn contains(&self, kind: OpKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Apply the handler for the value's kind, or answer top.
    pub fn transfer(&self, ctx: &OpContext<'_>, operands: &[AxisInfo]) -> AxisInfo {
        let kind = ctx.op().kind();
        let Some(handler) = self.handlers.get(&kind) else {
            tracing::trace!(value = %ctx.value(), op_kind = ?kind, "no axis info handler, using top");
            return AxisInfo::top(ctx.rank());
        };
        let info = handler(ctx, operands);
        assert_eq!(info.rank(), ctx.rank(), "{kind:?} handler produced a fact of the wrong rank");
        info
    }
}

impl std::fmt::Debug for AxisInfoRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxisInfoRegistry").field("kinds", &self.handlers.keys().collect::<Vec<_>>()).finish()
    }
}

static DEFAULT_REGISTRY: Lazy<AxisInfoRegistry> = Lazy::new(AxisInfoRegistry::with_defaults);

/// Process-wide registry holding the built-in rules.
pub fn default_registry() -> &'static AxisInfoRegistry {
    &DEFAULT_REGISTRY
}
