//! Session: the single-user "currently open file" state, passed explicitly
//! to every operation so independent sessions (and tests) never interfere.

use polars::prelude::*;

use crate::config::AppConfig;
use crate::error::{ParqError, Result};
use crate::fetch::{Page, PageFetcher, RowRange};
use crate::query::ViewSpec;
use crate::reader::{choose_plan, AccessPlan, FileHandle, FileInfo, PlanOverride};
use crate::sample;
use crate::stats::{column_stats, ColumnStats};

pub struct Session {
    config: AppConfig,
    handle: Option<FileHandle>,
    plan: AccessPlan,
    fetcher: PageFetcher,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            handle: None,
            plan: AccessPlan::FullLoad,
            fetcher: PageFetcher::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Open a file from a local path, replacing and releasing any previously
    /// open handle (and its caches) immediately.
    pub fn open_path(&mut self, path: impl AsRef<std::path::Path>, overrides: PlanOverride) -> Result<&FileInfo> {
        let handle = FileHandle::open(path)?;
        self.install(handle, overrides)
    }

    /// Open from an uploaded byte stream (persisted to a temp file owned by
    /// the handle; removed when the handle is dropped).
    pub fn open_bytes(&mut self, bytes: &[u8], name: &str, overrides: PlanOverride) -> Result<&FileInfo> {
        let handle =
            FileHandle::open_bytes(bytes, name, self.config.file_loading.max_upload_bytes)?;
        self.install(handle, overrides)
    }

    fn install(&mut self, handle: FileHandle, overrides: PlanOverride) -> Result<&FileInfo> {
        // Drop the old handle first so its temp file (if any) and caches are
        // released before the new file is served.
        self.handle = None;
        self.fetcher.invalidate();
        self.plan = choose_plan(&handle, &self.config.file_loading, overrides);
        self.handle = Some(handle);
        self.info()
    }

    /// Re-pick the plan for the current file, e.g. when the user toggles
    /// between "load full data" and "load random sample".
    pub fn override_plan(&mut self, overrides: PlanOverride) -> Result<AccessPlan> {
        let handle = self.handle()?;
        let plan = choose_plan(handle, &self.config.file_loading, overrides);
        if plan != self.plan {
            self.plan = plan;
            self.fetcher.invalidate();
        }
        Ok(plan)
    }

    pub fn plan(&self) -> AccessPlan {
        self.plan
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Close the current file, releasing its resources immediately.
    pub fn close(&mut self) {
        self.handle = None;
        self.fetcher.invalidate();
        self.plan = AccessPlan::FullLoad;
    }

    fn handle(&self) -> Result<&FileHandle> {
        self.handle.as_ref().ok_or(ParqError::NoFileOpen)
    }

    pub fn info(&self) -> Result<&FileInfo> {
        Ok(self.handle()?.info())
    }

    /// One page of the view, under the active plan.
    pub fn page(&mut self, range: RowRange, view: &ViewSpec) -> Result<Page> {
        let plan = self.plan;
        let handle = self.handle.as_ref().ok_or(ParqError::NoFileOpen)?;
        self.fetcher.fetch(handle, plan, range, view)
    }

    /// Draw (or redraw) the sample frame for a sampled plan. Seeded draws are
    /// deterministic; the frame also becomes the paging source.
    pub fn sample_page(&mut self, seed: Option<u64>) -> Result<Page> {
        let size = match self.plan {
            AccessPlan::Sampled { size } => size,
            _ => self.config.file_loading.sample_size,
        };
        let page = sample::draw(self.handle()?, size, seed)?;
        self.fetcher.set_sample(page.df.clone());
        Ok(page)
    }

    /// Column statistics under the active plan. FullLoad computes exact
    /// figures over the whole table; a sampled plan computes over the sample;
    /// streaming computes over a capped window. Anything not exact-on-full is
    /// labeled `is_sampled`.
    pub fn stats(&mut self, column: &str) -> Result<ColumnStats> {
        let (df, is_sampled) = self.stats_frame()?;
        column_stats(&df, column, is_sampled)
    }

    /// Statistics for every column, e.g. for a schema-wide summary table.
    pub fn all_stats(&mut self) -> Result<Vec<ColumnStats>> {
        let (df, is_sampled) = self.stats_frame()?;
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        names
            .iter()
            .map(|name| column_stats(&df, name, is_sampled))
            .collect()
    }

    fn stats_frame(&mut self) -> Result<(DataFrame, bool)> {
        match self.plan {
            AccessPlan::FullLoad => {
                let df = self
                    .page(RowRange::new(0, usize::MAX), &ViewSpec::default())?
                    .df;
                Ok((df, false))
            }
            AccessPlan::Sampled { .. } => {
                let df = self
                    .page(RowRange::new(0, usize::MAX), &ViewSpec::default())?
                    .df;
                Ok((df, true))
            }
            AccessPlan::RowGroupStream => {
                // Capped window keeps stats cheap on big files; the flag on
                // the result says the figures are not exact-on-full.
                let cap = self.config.file_loading.stats_row_cap;
                let handle = self.handle()?;
                let exact = handle.row_count() <= cap;
                let len = if exact { handle.row_count() } else { cap };
                let df = handle.scan()?.slice(0, len as IdxSize).collect()?;
                Ok((df, !exact))
            }
        }
    }
}
