use crate::config::{AnalysisConfig, DEFAULT_MAX_VISITS};

#[test]
fn test_default_config() {
    let config = AnalysisConfig::default();
    assert_eq!(config.max_visits, DEFAULT_MAX_VISITS);
    assert!(!config.dump_facts);
}

#[test]
fn test_builder() {
    let config = AnalysisConfig::builder().max_visits(8).dump_facts(true).build();
    assert_eq!(config.max_visits, 8);
    assert!(config.dump_facts);

    assert_eq!(AnalysisConfig::builder().build(), AnalysisConfig::default());
}

#[test]
fn test_builder_floors_budget() {
    assert_eq!(AnalysisConfig::builder().max_visits(0).build().max_visits, 1);
}
