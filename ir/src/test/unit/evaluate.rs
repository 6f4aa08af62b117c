use test_case::test_case;

use crate::{BinaryOp, CmpPredicate};

#[test_case(BinaryOp::Add, 3, 4 => Some(7); "add")]
#[test_case(BinaryOp::Add, i64::MAX, 1 => Some(i64::MIN); "add wraps")]
#[test_case(BinaryOp::Sub, 3, 4 => Some(-1); "sub")]
#[test_case(BinaryOp::Mul, -3, 4 => Some(-12); "mul")]
#[test_case(BinaryOp::DivS, -7, 2 => Some(-3); "divs truncates")]
#[test_case(BinaryOp::DivS, 7, 0 => None; "divs by zero")]
#[test_case(BinaryOp::DivU, -1, 2 => Some(i64::MAX); "divu on bit pattern")]
#[test_case(BinaryOp::RemS, -7, 2 => Some(-1); "rems sign of dividend")]
#[test_case(BinaryOp::RemU, 7, 0 => None; "remu by zero")]
#[test_case(BinaryOp::Shl, 1, 4 => Some(16); "shl")]
#[test_case(BinaryOp::Shl, 1, 64 => None; "shl out of range")]
#[test_case(BinaryOp::ShrS, -16, 2 => Some(-4); "shrs")]
#[test_case(BinaryOp::ShrU, -1, 60 => Some(15); "shru")]
#[test_case(BinaryOp::ShrU, 8, -1 => None; "negative shift")]
#[test_case(BinaryOp::And, 0b1100, 0b1010 => Some(0b1000); "and")]
#[test_case(BinaryOp::Or, 0b1100, 0b1010 => Some(0b1110); "or")]
#[test_case(BinaryOp::Xor, 0b1100, 0b1010 => Some(0b0110); "xor")]
#[test_case(BinaryOp::MaxS, -1, 1 => Some(1); "maxs")]
#[test_case(BinaryOp::MaxU, -1, 1 => Some(-1); "maxu")]
#[test_case(BinaryOp::MinS, -1, 1 => Some(-1); "mins")]
#[test_case(BinaryOp::MinU, -1, 1 => Some(1); "minu")]
fn test_binary_evaluate(op: BinaryOp, lhs: i64, rhs: i64) -> Option<i64> {
    op.evaluate(lhs, rhs)
}

#[test_case(CmpPredicate::Slt, 3, 5 => true; "slt")]
#[test_case(CmpPredicate::Sge, 3, 5 => false; "sge")]
#[test_case(CmpPredicate::Eq, 4, 4 => true; "eq")]
#[test_case(CmpPredicate::Ne, 4, 4 => false; "ne")]
#[test_case(CmpPredicate::Ult, -1, 5 => false; "ult on bit pattern")]
#[test_case(CmpPredicate::Ugt, -1, 5 => true; "ugt on bit pattern")]
#[test_case(CmpPredicate::Sle, -1, -1 => true; "sle equal")]
fn test_cmp_evaluate(pred: CmpPredicate, lhs: i64, rhs: i64) -> bool {
    pred.evaluate(lhs, rhs)
}

#[test]
fn test_strict_ordering() {
    assert!(CmpPredicate::Slt.is_strict_ordering());
    assert!(CmpPredicate::Ugt.is_strict_ordering());
    assert!(!CmpPredicate::Sle.is_strict_ordering());
    assert!(!CmpPredicate::Eq.is_strict_ordering());
}

#[test]
fn test_commutativity_flags() {
    assert!(BinaryOp::Add.is_commutative());
    assert!(BinaryOp::MinU.is_commutative());
    assert!(!BinaryOp::Sub.is_commutative());
    assert!(!BinaryOp::Shl.is_commutative());
    assert!(BinaryOp::Shl.is_bitwise());
    assert!(!BinaryOp::Mul.is_bitwise());
}
