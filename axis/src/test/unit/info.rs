//! Lattice element: construction, predicates, join.

use crate::info::*;

use super::fixtures::fact;

#[test]
fn test_top() {
    let top = AxisInfo::top(2);
    assert_eq!(top.rank(), 2);
    assert_eq!(top.divisibilities(), &[INIT_VALUE, INIT_VALUE]);
    assert_eq!(top.strides(), &[INIT_VALUE, INIT_VALUE]);
    assert_eq!(top.stride_values(), &[UNKNOWN_STRIDE_VALUE, UNKNOWN_STRIDE_VALUE]);
    assert_eq!(top.constant_value(), None);
    assert!(top.is_top());
}

#[test]
fn test_constant_is_uniform() {
    let info = AxisInfo::constant(12, &[4, 8]);
    assert_eq!(info.divisibilities(), &[4, 4]);
    assert_eq!(info.strides(), &[4, 8]);
    assert_eq!(info.stride_values(), &[0, 0]);
    assert_eq!(info.constant_value(), Some(12));
    assert!(info.is_constant_dim(&[4, 8], 0));
    assert!(info.is_constant_dim(&[4, 8], 1));
}

#[test]
fn test_zero() {
    let zero = AxisInfo::zero(&[8]);
    assert_eq!(zero.divisibility(0), MAX_DIVISIBILITY);
    assert_eq!(zero.constant_value(), Some(0));
}

#[test]
#[should_panic(expected = "axis info rank mismatch")]
fn test_new_rank_mismatch_panics() {
    AxisInfo::new(&[1, 1], &[1], &[0], None);
}

#[test]
fn test_contiguity_and_constancy() {
    let unit = fact(16, 8, 1, None);
    assert_eq!(unit.contiguity(0), 8);
    assert_eq!(unit.constancy(0), INIT_VALUE);
    assert!(unit.is_unit_step(0));
    assert!(unit.is_contiguous_dim(&[8], 0));
    assert!(!unit.is_contiguous_dim(&[16], 0));

    let flat = fact(16, 4, 0, None);
    assert_eq!(flat.contiguity(0), INIT_VALUE);
    assert_eq!(flat.constancy(0), 4);
    assert!(!flat.is_constant_dim(&[8], 0));
}

#[test]
fn test_is_strided_dim() {
    assert!(fact(1, 4, 3, None).is_strided_dim(&[8], 0));
    assert!(fact(1, 8, 2, None).is_strided_dim(&[8], 0));
    assert!(!fact(1, 4, UNKNOWN_STRIDE_VALUE, None).is_strided_dim(&[8], 0));
}

#[test]
fn test_join_is_pointwise() {
    let a = fact(4, 8, 1, None);
    let b = fact(8, 4, 1, None);
    assert_eq!(a.join(&b), fact(4, 4, 1, None));

    let c = fact(8, 4, 2, None);
    assert_eq!(a.join(&c), fact(4, 4, UNKNOWN_STRIDE_VALUE, None));
}

#[test]
fn test_join_constants() {
    let three = AxisInfo::constant(3, &[1]);
    let five = AxisInfo::constant(5, &[1]);
    assert_eq!(three.join(&three), three);

    let joined = three.join(&five);
    assert_eq!(joined.constant_value(), None);
    assert_eq!(joined.stride_value(0), 0);
    assert_eq!(joined.divisibility(0), 1);
}

#[test]
fn test_join_with_top_is_top() {
    let top = AxisInfo::top(1);
    assert_eq!(fact(16, 8, 1, Some(4)).join(&top), top);
}

#[test]
#[should_panic(expected = "different ranks")]
fn test_join_rank_mismatch_panics() {
    AxisInfo::top(1).join(&AxisInfo::top(2));
}

#[test]
fn test_is_weaker_or_equal() {
    let precise = fact(16, 8, 1, None);
    let loose = fact(4, 4, UNKNOWN_STRIDE_VALUE, None);
    assert!(loose.is_weaker_or_equal(&precise));
    assert!(!precise.is_weaker_or_equal(&loose));
    assert!(AxisInfo::top(1).is_weaker_or_equal(&precise));
    assert!(!AxisInfo::top(1).is_weaker_or_equal(&AxisInfo::top(2)));
}

#[test]
fn test_display() {
    assert_eq!(AxisInfo::constant(3, &[1]).to_string(), "{div=[1], stride=[1], step=[0], const=3}");
    assert_eq!(AxisInfo::top(2).to_string(), "{div=[1, 1], stride=[1, 1], step=[-1, -1], const=none}");
}
