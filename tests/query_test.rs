use parqlens::{
    AppConfig, FilterOperator, FilterStatement, PlanOverride, RowRange, Session, SortDirection,
    SortSpec, ViewSpec,
};

mod common;

fn open_session(rows: usize) -> (Session, tempfile::NamedTempFile) {
    let file = common::write_parquet(rows);
    let mut session = Session::new(AppConfig::default());
    session.open_path(file.path(), PlanOverride::None).unwrap();
    (session, file)
}

#[test]
fn test_empty_search_is_identity() {
    let (mut session, _file) = open_session(20);

    let searched = ViewSpec {
        search: Some(String::new()),
        ..Default::default()
    };
    let a = session
        .page(RowRange::new(0, 20), &ViewSpec::default())
        .unwrap();
    let b = session.page(RowRange::new(0, 20), &searched).unwrap();
    assert_eq!(common::ids_of(&a.df), common::ids_of(&b.df));
}

#[test]
fn test_search_matches_any_column_case_insensitive() {
    let (mut session, _file) = open_session(30);

    // "ROW_2" matches name values row_2 and row_2x via substring.
    let view = ViewSpec {
        search: Some("ROW_2".to_string()),
        ..Default::default()
    };
    let page = session.page(RowRange::new(0, 30), &view).unwrap();
    let ids = common::ids_of(&page.df);
    assert!(ids.contains(&2));
    assert!(ids.contains(&25));
    assert!(!ids.contains(&3));
}

#[test]
fn test_filter_then_sort() {
    let (mut session, _file) = open_session(10);

    let view = ViewSpec {
        filters: vec![FilterStatement {
            column: "id".to_string(),
            operator: FilterOperator::Gt,
            value: "5".to_string(),
        }],
        sort: SortSpec::by("id", SortDirection::Descending),
        ..Default::default()
    };
    let page = session.page(RowRange::new(0, 10), &view).unwrap();
    assert_eq!(common::ids_of(&page.df), vec![9, 8, 7, 6]);
    assert_eq!(page.total_rows, 4);
}

#[test]
fn test_clearing_sort_restores_file_order() {
    let (mut session, _file) = open_session(8);

    let sorted = ViewSpec {
        sort: SortSpec::by("id", SortDirection::Descending),
        ..Default::default()
    };
    let page = session.page(RowRange::new(0, 8), &sorted).unwrap();
    assert_eq!(common::ids_of(&page.df), vec![7, 6, 5, 4, 3, 2, 1, 0]);

    let page = session
        .page(RowRange::new(0, 8), &ViewSpec::default())
        .unwrap();
    assert_eq!(common::ids_of(&page.df), (0..8).collect::<Vec<i64>>());
}

#[test]
fn test_ordering_filter_on_boolean_column_errors() {
    use polars::prelude::*;
    use std::io::Write;

    let mut df = df!(
        "id" => [1i64, 2, 3],
        "flag" => [true, false, true]
    )
    .unwrap();
    let mut temp = tempfile::NamedTempFile::new().unwrap();
    ParquetWriter::new(temp.as_file_mut())
        .finish(&mut df)
        .unwrap();
    temp.flush().unwrap();

    let mut session = Session::new(AppConfig::default());
    session.open_path(temp.path(), PlanOverride::None).unwrap();

    let view = ViewSpec {
        filters: vec![FilterStatement {
            column: "flag".to_string(),
            operator: FilterOperator::Gt,
            value: "true".to_string(),
        }],
        ..Default::default()
    };
    assert!(session.page(RowRange::new(0, 3), &view).is_err());
}

#[test]
fn test_filter_against_unknown_column_errors() {
    let (mut session, _file) = open_session(5);

    let view = ViewSpec {
        filters: vec![FilterStatement {
            column: "nope".to_string(),
            operator: FilterOperator::Eq,
            value: "1".to_string(),
        }],
        ..Default::default()
    };
    assert!(session.page(RowRange::new(0, 5), &view).is_err());
}

fn write_parquet_with_binary_column() -> tempfile::NamedTempFile {
    use polars::prelude::*;
    use std::io::Write;

    let mut df = df!(
        "id" => [1i64, 2, 3],
        "name" => ["alpha", "beta", "gamma"]
    )
    .unwrap();
    let image = Series::new(
        "image".into(),
        &[
            b"\x89PNG\r\n\x1a\n\xff\xfe".as_slice(),
            b"\xff\xd8\xff\xe0\x00\x10".as_slice(),
            b"\x00\x01\x02\x03\x80\x81".as_slice(),
        ],
    );
    df.with_column(image).unwrap();

    let mut temp = tempfile::NamedTempFile::new().unwrap();
    ParquetWriter::new(temp.as_file_mut())
        .finish(&mut df)
        .unwrap();
    temp.flush().unwrap();
    temp
}

#[test]
fn test_search_skips_binary_columns() {
    let file = write_parquet_with_binary_column();
    let mut session = Session::new(AppConfig::default());
    session.open_path(file.path(), PlanOverride::None).unwrap();

    let view = ViewSpec {
        search: Some("beta".to_string()),
        ..Default::default()
    };
    let page = session.page(RowRange::new(0, 3), &view).unwrap();
    assert_eq!(page.total_rows, 1);
    assert_eq!(common::ids_of(&page.df), vec![2]);
}

#[test]
fn test_contains_filter_on_binary_column_errors() {
    let file = write_parquet_with_binary_column();
    let mut session = Session::new(AppConfig::default());
    session.open_path(file.path(), PlanOverride::None).unwrap();

    let view = ViewSpec {
        filters: vec![FilterStatement {
            column: "image".to_string(),
            operator: FilterOperator::Contains,
            value: "PNG".to_string(),
        }],
        ..Default::default()
    };
    let err = session.page(RowRange::new(0, 3), &view).unwrap_err();
    assert!(matches!(err, parqlens::ParqError::IncompatibleFilter { .. }));
}

#[test]
fn test_sampled_plan_pages_come_from_sample() {
    let file = common::write_parquet(100);
    let mut session = Session::new(AppConfig::default());
    session
        .open_path(file.path(), PlanOverride::ForceSample)
        .unwrap();

    let sample = session.sample_page(Some(3)).unwrap();
    let sample_ids = common::ids_of(&sample.df);

    let page = session
        .page(RowRange::new(0, 100), &ViewSpec::default())
        .unwrap();
    assert_eq!(common::ids_of(&page.df), sample_ids);
}
