//! Worklist fixpoint driver and the per-value query API.
//!
//! # Algorithm
//!
//! Values are seeded in creation order. A value is evaluated once all of its
//! operands carry a fact; a changed fact re-enqueues every user. Merges are the
//! exception: they join whatever inputs are already known (optimistically
//! ignoring back-edges not reached yet) and then join the result with their
//! previous fact, so a merge only ever loses precision. Every cycle in the
//! graph passes through a merge and every fact component has finite descending
//! chains, hence the iteration terminates. The per-value visit budget from
//! [`AnalysisConfig`] is a backstop: a value exceeding it is pinned to top.

use std::collections::VecDeque;

use tilir_ir::{Graph, Op, ValueId};

use crate::config::AnalysisConfig;
use crate::info::AxisInfo;
use crate::registry::{AxisInfoRegistry, default_registry};
use crate::transfer::OpContext;

/// Converged axis facts of one graph.
#[derive(Debug, Clone)]
pub struct AxisInfoAnalysis {
    facts: Vec<Option<AxisInfo>>,
    ranks: Vec<usize>,
    iterations: usize,
}

impl AxisInfoAnalysis {
    /// Analyse `graph` with the built-in rules and configuration from the environment.
    pub fn run(graph: &Graph) -> Self {
        Self::run_with(graph, default_registry(), &AnalysisConfig::from_env())
    }

    #[tracing::instrument(skip_all, fields(values = graph.len()))]
    pub fn run_with(graph: &Graph, registry: &AxisInfoRegistry, config: &AnalysisConfig) -> Self {
        let len = graph.len();
        let users = graph.users();
        let mut facts: Vec<Option<AxisInfo>> = vec![None; len];
        let mut visits = vec![0usize; len];
        let mut pinned = vec![false; len];
        let mut queued = vec![true; len];
        let mut worklist: VecDeque<ValueId> = graph.values().collect();
        let mut iterations = 0;

        while let Some(value) = worklist.pop_front() {
            queued[value.index()] = false;
            if pinned[value.index()] {
                continue;
            }

            let Some(mut info) = evaluate(graph, registry, &facts, value) else {
                continue;
            };
            iterations += 1;
            visits[value.index()] += 1;

            if visits[value.index()] > config.max_visits {
                tracing::warn!(%value, visits = visits[value.index()], "axis info did not converge, pinning to top");
                pinned[value.index()] = true;
                info = AxisInfo::top(graph.ty(value).fact_rank());
            }

            if facts[value.index()].as_ref() == Some(&info) {
                continue;
            }
            tracing::trace!(%value, %info, "updated axis info");
            facts[value.index()] = Some(info);
            for &user in &users[value.index()] {
                if !queued[user.index()] {
                    queued[user.index()] = true;
                    worklist.push_back(user);
                }
            }
        }

        let analysed = facts.iter().filter(|f| f.is_some()).count();
        tracing::debug!(iterations, analysed, "axis info analysis converged");
        if config.dump_facts {
            for value in graph.values() {
                if let Some(info) = &facts[value.index()] {
                    tracing::debug!(%value, op_kind = ?graph.op(value).kind(), %info, "axis info");
                }
            }
        }

        let ranks = graph.values().map(|v| graph.ty(v).fact_rank()).collect();
        Self { facts, ranks, iterations }
    }

    /// Converged fact of `value`, or top if it was never analysed.
    #[track_caller]
    pub fn get(&self, value: ValueId) -> AxisInfo {
        match self.lookup(value) {
            Some(info) => info.clone(),
            None => AxisInfo::top(self.ranks[value.index()]),
        }
    }

    /// Converged fact of `value`, if it was analysed.
    pub fn lookup(&self, value: ValueId) -> Option<&AxisInfo> {
        self.facts.get(value.index())?.as_ref()
    }

    /// Number of transfer evaluations performed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

/// New fact for `value`, or `None` while its inputs are still unknown.
fn evaluate(graph: &Graph, registry: &AxisInfoRegistry, facts: &[Option<AxisInfo>], value: ValueId) -> Option<AxisInfo> {
    let fact = |v: ValueId| facts[v.index()].as_ref();

    if let Op::Merge { inputs } = graph.op(value) {
        let joined = inputs.iter().filter_map(|&input| fact(input)).fold(None, |acc: Option<AxisInfo>, info| {
            Some(match acc {
                Some(acc) => acc.join(info),
                None => info.clone(),
            })
        })?;
        return Some(match fact(value) {
            Some(previous) => previous.join(&joined),
            None => joined,
        });
    }

    let operands = graph.op(value).operands().iter().map(|&v| fact(v).cloned()).collect::<Option<Vec<_>>>()?;
    Some(registry.transfer(&OpContext::new(graph, value), &operands))
}
