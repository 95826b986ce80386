//! Per-column descriptive statistics.

use polars::prelude::*;

use crate::error::{ParqError, Result};

/// Numeric summary over non-null values.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Midpoint of the sorted values; average of the middle two when the
    /// non-null count is even.
    pub median: f64,
}

/// Summary for one column of a view or sample.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub dtype: String,
    pub count: usize,
    pub null_count: usize,
    /// Distinct non-null values.
    pub unique_count: usize,
    /// Present for numeric columns only.
    pub numeric: Option<NumericStats>,
    /// True when computed over a sample or a capped window rather than the
    /// full dataset.
    pub is_sampled: bool,
}

/// Compute statistics for `column` of `df`. `is_sampled` records whether the
/// frame is a sample/capped window; it is carried through to the output so
/// callers cannot mistake sampled figures for exact ones.
pub fn column_stats(df: &DataFrame, column: &str, is_sampled: bool) -> Result<ColumnStats> {
    let col = df.column(column).map_err(|_| ParqError::ColumnNotFound {
        column: column.to_string(),
    })?;
    let series = col.as_materialized_series();
    let count = series.len();
    let null_count = series.null_count();
    let unique_count = series.drop_nulls().n_unique()?;

    let numeric = if series.dtype().is_numeric() {
        numeric_stats_of(series)
    } else {
        None
    };

    Ok(ColumnStats {
        name: column.to_string(),
        dtype: format!("{}", series.dtype()),
        count,
        null_count,
        unique_count,
        numeric,
        is_sampled,
    })
}

/// Numeric summary for `column`; errors on non-numeric columns so callers
/// cannot silently get nonsense for strings or binaries.
pub fn numeric_summary(df: &DataFrame, column: &str) -> Result<NumericStats> {
    let col = df.column(column).map_err(|_| ParqError::ColumnNotFound {
        column: column.to_string(),
    })?;
    let series = col.as_materialized_series();
    if !series.dtype().is_numeric() {
        return Err(ParqError::NotNumeric {
            column: column.to_string(),
            dtype: format!("{}", series.dtype()),
        });
    }
    numeric_stats_of(series).ok_or_else(|| ParqError::NotNumeric {
        column: column.to_string(),
        dtype: format!("{}", series.dtype()),
    })
}

/// Exact min/max/mean/median over the non-null values, via a sorted f64
/// buffer. `None` when there are no non-null values or the cast fails.
fn numeric_stats_of(series: &Series) -> Option<NumericStats> {
    let cast = series.cast(&DataType::Float64).ok()?;
    let mut values: Vec<f64> = cast.f64().ok()?.iter().flatten().collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    };
    Some(NumericStats {
        min: values[0],
        max: values[n - 1],
        mean,
        median,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_column_summary() {
        let df = df!("a" => [1i64, 2, 3], "b" => [Some("x"), None, Some("y")]).unwrap();
        let stats = column_stats(&df, "a", false).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.null_count, 0);
        assert_eq!(stats.unique_count, 3);
        let numeric = stats.numeric.unwrap();
        assert_eq!(numeric.min, 1.0);
        assert_eq!(numeric.max, 3.0);
        assert_eq!(numeric.mean, 2.0);
        assert_eq!(numeric.median, 2.0);
        assert!(!stats.is_sampled);
    }

    #[test]
    fn nulls_excluded_from_unique_and_numeric() {
        let df = df!("v" => [Some(1.0f64), None, Some(1.0), Some(4.0)]).unwrap();
        let stats = column_stats(&df, "v", false).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.null_count, 1);
        assert_eq!(stats.unique_count, 2);
        let numeric = stats.numeric.unwrap();
        assert_eq!(numeric.mean, 2.0);
        assert_eq!(numeric.median, 1.0);
    }

    #[test]
    fn even_count_median_averages_middle_pair() {
        let df = df!("v" => [1i64, 2, 3, 10]).unwrap();
        let numeric = numeric_summary(&df, "v").unwrap();
        assert_eq!(numeric.median, 2.5);
    }

    #[test]
    fn string_column_has_no_numeric_summary() {
        let df = df!("s" => ["a", "b", "a"]).unwrap();
        let stats = column_stats(&df, "s", false).unwrap();
        assert!(stats.numeric.is_none());
        assert_eq!(stats.unique_count, 2);

        let err = numeric_summary(&df, "s").unwrap_err();
        match err {
            ParqError::NotNumeric { column, .. } => assert_eq!(column, "s"),
            other => panic!("expected NotNumeric, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_errors() {
        let df = df!("a" => [1i64]).unwrap();
        assert!(matches!(
            column_stats(&df, "zzz", false),
            Err(ParqError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn sampled_flag_is_carried() {
        let df = df!("a" => [1i64, 2]).unwrap();
        assert!(column_stats(&df, "a", true).unwrap().is_sampled);
    }
}
