use polars::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// Write a small Parquet file with `rows` rows of (id, name, price).
pub fn write_parquet(rows: usize) -> NamedTempFile {
    write_parquet_grouped(rows, None)
}

/// Same, but split into row groups of `group_size` rows each.
pub fn write_parquet_grouped(rows: usize, group_size: Option<usize>) -> NamedTempFile {
    let mut df = df!(
        "id" => (0..rows as i64).collect::<Vec<i64>>(),
        "name" => (0..rows).map(|i| format!("row_{}", i)).collect::<Vec<String>>(),
        "price" => (0..rows).map(|i| i as f64 * 1.5).collect::<Vec<f64>>()
    )
    .unwrap();

    let mut temp = NamedTempFile::new().unwrap();
    ParquetWriter::new(temp.as_file_mut())
        .with_row_group_size(group_size)
        .finish(&mut df)
        .unwrap();
    temp.flush().unwrap();
    temp
}

/// Column `id` of a frame as a plain Vec, for order assertions.
pub fn ids_of(df: &DataFrame) -> Vec<i64> {
    df.column("id")
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}
