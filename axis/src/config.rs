//! Analysis configuration.
//!
//! Provides typed configuration with a bon builder and an environment
//! variable fallback.

use bon::bon;

/// Default per-value revisit budget.
pub const DEFAULT_MAX_VISITS: usize = 64;

/// Knobs of the fixpoint driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Times a single value may be re-evaluated before it is pinned to top.
    pub max_visits: usize,
    /// Log every converged fact at debug level once the analysis finishes.
    pub dump_facts: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { max_visits: DEFAULT_MAX_VISITS, dump_facts: false }
    }
}

#[bon]
impl AnalysisConfig {
    /// Create a configuration with builder pattern (`AnalysisConfig::builder()`).
    #[builder]
    pub fn new(#[builder(default = DEFAULT_MAX_VISITS)] max_visits: usize, #[builder(default)] dump_facts: bool) -> Self {
        Self { max_visits: max_visits.max(1), dump_facts }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `TILIR_AXIS_MAX_VISITS` - Per-value revisit budget (default: 64)
    /// * `TILIR_AXIS_DUMP` - Log converged facts if set
    pub fn from_env() -> Self {
        let max_visits =
            std::env::var("TILIR_AXIS_MAX_VISITS").ok().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_MAX_VISITS);
        let dump_facts = std::env::var("TILIR_AXIS_DUMP").is_ok();

        Self { max_visits: max_visits.max(1), dump_facts }
    }
}
