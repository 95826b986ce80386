use parqlens::{AccessPlan, AppConfig, ParqError, PlanOverride, Session};

mod common;

#[test]
fn test_full_load_stats_are_exact() {
    let file = common::write_parquet(10);
    let mut session = Session::new(AppConfig::default());
    session.open_path(file.path(), PlanOverride::None).unwrap();

    let stats = session.stats("id").unwrap();
    assert!(!stats.is_sampled);
    assert_eq!(stats.count, 10);
    assert_eq!(stats.null_count, 0);
    assert_eq!(stats.unique_count, 10);

    let numeric = stats.numeric.unwrap();
    assert_eq!(numeric.min, 0.0);
    assert_eq!(numeric.max, 9.0);
    assert_eq!(numeric.mean, 4.5);
    assert_eq!(numeric.median, 4.5);
}

#[test]
fn test_string_column_has_no_numeric_summary() {
    let file = common::write_parquet(10);
    let mut session = Session::new(AppConfig::default());
    session.open_path(file.path(), PlanOverride::None).unwrap();

    let stats = session.stats("name").unwrap();
    assert!(stats.numeric.is_none());
    assert_eq!(stats.unique_count, 10);
}

#[test]
fn test_stats_unknown_column_errors() {
    let file = common::write_parquet(5);
    let mut session = Session::new(AppConfig::default());
    session.open_path(file.path(), PlanOverride::None).unwrap();

    let err = session.stats("nope").unwrap_err();
    assert!(matches!(err, ParqError::ColumnNotFound { .. }));
}

#[test]
fn test_all_stats_covers_every_column() {
    let file = common::write_parquet(8);
    let mut session = Session::new(AppConfig::default());
    session.open_path(file.path(), PlanOverride::None).unwrap();

    let all = session.all_stats().unwrap();
    let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "price"]);
}

#[test]
fn test_seeded_sample_stats_are_reproducible() {
    let file = common::write_parquet_grouped(200, Some(16));

    let stats_with_seed = |seed| {
        let mut config = AppConfig::default();
        config.file_loading.sample_size = 25;
        let mut session = Session::new(config);
        session
            .open_path(file.path(), PlanOverride::ForceSample)
            .unwrap();
        session.sample_page(Some(seed)).unwrap();
        session.stats("id").unwrap()
    };

    let a = stats_with_seed(11);
    let b = stats_with_seed(11);
    assert!(a.is_sampled);
    assert_eq!(a.count, 25);
    assert_eq!(a.numeric.unwrap(), b.numeric.unwrap());
}

#[test]
fn test_streaming_stats_use_capped_window() {
    let file = common::write_parquet_grouped(100, Some(10));

    let mut config = AppConfig::default();
    config.file_loading.full_load_threshold = 10;
    config.file_loading.sample_threshold = 1000;
    config.file_loading.stats_row_cap = 20;

    let mut session = Session::new(config);
    session.open_path(file.path(), PlanOverride::None).unwrap();
    assert_eq!(session.plan(), AccessPlan::RowGroupStream);

    let stats = session.stats("id").unwrap();
    assert!(stats.is_sampled);
    assert_eq!(stats.count, 20);
}
