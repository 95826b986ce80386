//! Page fetching with plan-uniform semantics.
//!
//! A page is the slice `[start, end)` of the view obtained by applying the
//! [`ViewSpec`] to the dataset. Callers get identical row content whichever
//! [`AccessPlan`] is active; the plan only changes how much of the file is
//! touched to produce it.

use polars::prelude::*;

use crate::error::{ParqError, Result};
use crate::query::ViewSpec;
use crate::reader::{AccessPlan, FileHandle};
use crate::sample;

/// Half-open absolute row range of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A bounded window of a view: rows plus the absolute range they cover and
/// the total row count of the (filtered/sorted) view. Derived and disposable;
/// regenerated on every navigation.
#[derive(Debug, Clone)]
pub struct Page {
    pub df: DataFrame,
    pub start: usize,
    /// Exclusive; clamped to `total_rows`.
    pub end: usize,
    /// Rows in the whole view, not just this page.
    pub total_rows: usize,
    /// True when a streaming plan had to fall back to a full scan to honor
    /// the view (sort/filter under row-group streaming). The result is
    /// correct; the caller should warn that it was expensive.
    pub slow_path: bool,
}

impl Page {
    pub fn height(&self) -> usize {
        self.df.height()
    }
}

/// Fetches pages for one (handle, plan) pair, caching the materialized view
/// between navigations. Opening a different file means a fresh fetcher.
#[derive(Default)]
pub struct PageFetcher {
    /// Materialized view for the last ViewSpec (full-load and slow paths).
    view_cache: Option<(ViewSpec, DataFrame)>,
    /// Sample frame drawn on first use under a sampled plan.
    sample: Option<DataFrame>,
}

impl PageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all cached frames (e.g. when the handle is replaced).
    pub fn invalidate(&mut self) {
        self.view_cache = None;
        self.sample = None;
    }

    /// Install an externally drawn sample frame (e.g. a seeded one).
    pub fn set_sample(&mut self, df: DataFrame) {
        self.sample = Some(df);
        self.view_cache = None;
    }

    /// The rows at `[range.start, range.end)` of the view, under any plan.
    pub fn fetch(
        &mut self,
        handle: &FileHandle,
        plan: AccessPlan,
        range: RowRange,
        view: &ViewSpec,
    ) -> Result<Page> {
        match plan {
            AccessPlan::FullLoad => {
                let df = self.materialized_view(handle, view)?;
                page_of(&df, range, false)
            }
            AccessPlan::Sampled { size } => {
                let df = self.sampled_view(handle, size, view)?;
                page_of(&df, range, false)
            }
            AccessPlan::RowGroupStream => {
                if view.is_identity() {
                    self.fetch_streamed(handle, range)
                } else {
                    // Sort or predicates need the whole view; documented slow
                    // path, flagged so the caller can warn.
                    let df = self.materialized_view(handle, view)?;
                    page_of(&df, range, true)
                }
            }
        }
    }

    /// Identity view under streaming: read only the row groups that overlap
    /// the requested range, then slice locally.
    fn fetch_streamed(&self, handle: &FileHandle, range: RowRange) -> Result<Page> {
        let total = handle.row_count();
        let range = clamp_range(range, total)?;

        let groups = handle.row_groups().groups_overlapping(range.start..range.end);
        let df = match (groups.first(), groups.last()) {
            (Some(first), Some(last)) => {
                let span_start = first.start_row;
                let span_len = last.end_row - span_start;
                let span = handle
                    .scan()?
                    .slice(span_start as i64, span_len as IdxSize)
                    .collect()?;
                span.slice((range.start - span_start) as i64, range.len())
            }
            _ => handle.scan()?.slice(0, 0).collect()?,
        };

        Ok(Page {
            df,
            start: range.start,
            end: range.end,
            total_rows: total,
            slow_path: false,
        })
    }

    /// Full view over the whole file, materialized once per ViewSpec.
    fn materialized_view(&mut self, handle: &FileHandle, view: &ViewSpec) -> Result<DataFrame> {
        if let Some((cached_view, df)) = &self.view_cache {
            if cached_view == view {
                return Ok(df.clone());
            }
        }
        let schema = handle.info().polars_schema();
        let df = view.apply(handle.scan()?, &schema)?.collect()?;
        self.view_cache = Some((view.clone(), df.clone()));
        Ok(df)
    }

    /// View applied on top of the sample frame, drawing it on first use.
    fn sampled_view(
        &mut self,
        handle: &FileHandle,
        size: usize,
        view: &ViewSpec,
    ) -> Result<DataFrame> {
        if let Some((cached_view, df)) = &self.view_cache {
            if cached_view == view {
                return Ok(df.clone());
            }
        }
        let source = match &self.sample {
            Some(df) => df.clone(),
            None => {
                let df = sample::draw(handle, size, None)?.df;
                self.sample = Some(df.clone());
                df
            }
        };
        let schema = handle.info().polars_schema();
        let df = view.apply(source.lazy(), &schema)?.collect()?;
        self.view_cache = Some((view.clone(), df.clone()));
        Ok(df)
    }
}

/// Slice a fully materialized view into a page.
fn page_of(df: &DataFrame, range: RowRange, slow_path: bool) -> Result<Page> {
    let total = df.height();
    let range = clamp_range(range, total)?;
    let page = df.slice(range.start as i64, range.len());
    Ok(Page {
        df: page,
        start: range.start,
        end: range.end,
        total_rows: total,
        slow_path,
    })
}

/// Clamp `end` to the view total; error when `start` is past the end. A
/// request at position 0 of an empty view yields an empty page rather than an
/// error so an exhaustive filter still renders.
fn clamp_range(range: RowRange, total: usize) -> Result<RowRange> {
    if range.start >= total && !(range.start == 0 && total == 0) {
        return Err(ParqError::RangeOutOfBounds {
            start: range.start,
            total,
        });
    }
    Ok(RowRange {
        start: range.start,
        end: range.end.min(total),
    })
}
