//! Fixpoint driver over whole graphs.

use tilir_dtype::DType;
use tilir_ir::{Graph, ValueId, ValueType};

use crate::analysis::AxisInfoAnalysis;
use crate::config::AnalysisConfig;
use crate::info::{AxisInfo, MAX_DIVISIBILITY};
use crate::registry::default_registry;

use super::fixtures::{fact, i32_ty};

fn run(graph: &Graph) -> AxisInfoAnalysis {
    AxisInfoAnalysis::run_with(graph, default_registry(), &AnalysisConfig::default())
}

/// `pid * 128 + range(0, 128)`
fn block_offsets(g: &mut Graph) -> ValueId {
    let pid = g.arg(0, i32_ty(&[])).unwrap();
    let block = g.const_of(128i32).unwrap();
    let start = g.try_mul(pid, block).unwrap();
    let start = g.splat(start, &[128]).unwrap();
    let lanes = g.make_range(0, 128).unwrap();
    g.try_add(start, lanes).unwrap()
}

#[test]
fn test_block_offsets_are_contiguous_and_aligned() {
    let mut g = Graph::new();
    let offsets = block_offsets(&mut g);
    let analysis = run(&g);

    let info = analysis.get(offsets);
    assert_eq!(info, fact(128, 128, 1, None));
    assert_eq!(info.contiguity(0), 128);
    assert!(analysis.iterations() >= g.len());
}

#[test]
fn test_arguments_are_top() {
    let mut g = Graph::new();
    let a = g.arg(0, i32_ty(&[4, 4])).unwrap();
    let analysis = run(&g);
    assert_eq!(analysis.lookup(a), Some(&AxisInfo::top(2)));
}

#[test]
fn test_scalar_loop_counter() {
    // i = merge(0, i + 4)
    let mut g = Graph::new();
    let zero = g.const_of(0i32).unwrap();
    let four = g.const_of(4i32).unwrap();
    let i = g.merge(zero).unwrap();
    let next = g.try_add(i, four).unwrap();
    g.add_merge_input(i, next).unwrap();

    let analysis = run(&g);
    assert_eq!(analysis.get(i), fact(4, 1, 0, None));
    assert_eq!(analysis.get(next), fact(4, 1, 0, None));
}

#[test]
fn test_tensor_loop_keeps_contiguity() {
    // offs = merge(range(0, 128), offs + 128)
    let mut g = Graph::new();
    let lanes = g.make_range(0, 128).unwrap();
    let step = g.constant(128, i32_ty(&[128])).unwrap();
    let offs = g.merge(lanes).unwrap();
    let next = g.try_add(offs, step).unwrap();
    g.add_merge_input(offs, next).unwrap();

    let analysis = run(&g);
    assert_eq!(analysis.get(lanes).divisibility(0), MAX_DIVISIBILITY);
    assert_eq!(analysis.get(offs), fact(128, 128, 1, None));
    assert_eq!(analysis.get(next), fact(128, 128, 1, None));
}

#[test]
fn test_merge_of_equal_constants_stays_constant() {
    let mut g = Graph::new();
    let a = g.const_of(8i64).unwrap();
    let b = g.const_of(8i64).unwrap();
    let m = g.merge(a).unwrap();
    g.add_merge_input(m, b).unwrap();

    assert_eq!(run(&g).get(m).constant_value(), Some(8));
}

#[test]
fn test_unanalysed_value_is_top() {
    // A cycle without a merge never gets operand facts.
    let mut g = Graph::new();
    let a = g.arg(0, ValueType::scalar(DType::Int32)).unwrap();
    let one = g.const_of(1i32).unwrap();
    let b = g.try_add(a, one).unwrap();
    let c = g.try_mul(b, one).unwrap();
    g.replace_all_uses(a, c).unwrap();

    let analysis = run(&g);
    assert_eq!(analysis.lookup(b), None);
    assert_eq!(analysis.lookup(c), None);
    assert_eq!(analysis.get(c), AxisInfo::top(1));
}

#[test]
#[tracing_test::traced_test]
fn test_visit_budget_pins_to_top() {
    let mut g = Graph::new();
    let zero = g.const_of(0i32).unwrap();
    let four = g.const_of(4i32).unwrap();
    let i = g.merge(zero).unwrap();
    let next = g.try_add(i, four).unwrap();
    g.add_merge_input(i, next).unwrap();

    let config = AnalysisConfig::builder().max_visits(1).build();
    let analysis = AxisInfoAnalysis::run_with(&g, default_registry(), &config);
    assert!(analysis.get(i).is_top());
    assert!(logs_contain("did not converge"));
}

#[test]
fn test_analysis_is_deterministic() {
    let mut g = Graph::new();
    let offsets = block_offsets(&mut g);
    let first = run(&g);
    let second = run(&g);
    for v in g.values() {
        assert_eq!(first.lookup(v), second.lookup(v));
    }
    assert_eq!(first.get(offsets), second.get(offsets));
}
