use parqlens::sample;
use parqlens::FileHandle;
use std::collections::HashSet;

mod common;

#[test]
fn test_seeded_draws_are_deterministic() {
    let file = common::write_parquet_grouped(200, Some(16));
    let handle = FileHandle::open(file.path()).unwrap();

    let a = sample::draw(&handle, 40, Some(7)).unwrap();
    let b = sample::draw(&handle, 40, Some(7)).unwrap();
    assert_eq!(common::ids_of(&a.df), common::ids_of(&b.df));

    let c = sample::draw(&handle, 40, Some(8)).unwrap();
    assert_ne!(common::ids_of(&a.df), common::ids_of(&c.df));
}

#[test]
fn test_sample_has_no_duplicates() {
    let file = common::write_parquet_grouped(150, Some(11));
    let handle = FileHandle::open(file.path()).unwrap();

    let page = sample::draw(&handle, 60, Some(42)).unwrap();
    let ids = common::ids_of(&page.df);
    assert_eq!(ids.len(), 60);

    let unique: HashSet<i64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), 60);
    assert!(ids.iter().all(|&id| (0..150).contains(&id)));
}

#[test]
fn test_sample_size_clamped_to_row_count() {
    let file = common::write_parquet(12);
    let handle = FileHandle::open(file.path()).unwrap();

    let page = sample::draw(&handle, 500, Some(1)).unwrap();
    assert_eq!(page.total_rows, 12);
    assert_eq!(page.df.height(), 12);

    // Covering the whole file keeps every row exactly once.
    let ids: HashSet<i64> = common::ids_of(&page.df).into_iter().collect();
    assert_eq!(ids.len(), 12);
}

#[test]
fn test_sample_page_bounds() {
    let file = common::write_parquet(100);
    let handle = FileHandle::open(file.path()).unwrap();

    let page = sample::draw(&handle, 30, None).unwrap();
    assert_eq!(page.start, 0);
    assert_eq!(page.end, 30);
    assert_eq!(page.total_rows, 30);
}
