//! Parquet file opening: footer metadata, schema, row-group map, access plan.
//!
//! Opening a file reads only the footer (schema, row counts, compression); row
//! data is pulled later through `FileHandle::scan` by the fetcher and sampler.

use std::collections::HashMap;
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use polars::prelude::*;
use polars_parquet::parquet::metadata::FileMetadata;
use polars_parquet::parquet::read::read_metadata;
use tempfile::NamedTempFile;

use crate::config::FileLoadingConfig;
use crate::error::{ParqError, Result};

/// Codecs the reader accepts. Anything else fails the open.
const SUPPORTED_CODECS: &[&str] = &["uncompressed", "snappy", "gzip", "lz4", "lz4raw", "zstd"];

/// Column-name fragments that mark a column as image-like.
const IMAGE_NAME_HINTS: &[&str] = &["image", "img", "picture", "photo", "thumbnail"];

/// Schema entry for a single column.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub name: String,
    pub dtype: DataType,
    pub nullable: bool,
    /// Binary dtype, or a name containing an image keyword.
    pub is_image: bool,
}

impl ColumnSchema {
    /// Display name of the column dtype (e.g. "i64", "str", "binary").
    pub fn type_name(&self) -> String {
        format!("{}", self.dtype)
    }
}

/// Footer-derived file information, available without reading any row data.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub file_name: String,
    pub file_size: u64,
    pub row_count: usize,
    pub column_count: usize,
    pub schema: Vec<ColumnSchema>,
    /// Codec of the first column chunk, lowercased (e.g. "snappy").
    pub compression: String,
    /// File-level key/value metadata pairs from the footer.
    pub key_value_metadata: Vec<(String, String)>,
}

impl FileInfo {
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.schema.iter().find(|c| c.name == name)
    }

    /// Polars schema built from the column list.
    pub fn polars_schema(&self) -> Schema {
        Schema::from_iter(
            self.schema
                .iter()
                .map(|c| Field::new(c.name.as_str().into(), c.dtype.clone())),
        )
    }

    /// Names of columns classified as image-like.
    pub fn image_columns(&self) -> Vec<&str> {
        self.schema
            .iter()
            .filter(|c| c.is_image)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// One row group's absolute row span within the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowGroupSpan {
    pub index: usize,
    pub start_row: usize,
    /// Exclusive.
    pub end_row: usize,
}

impl RowGroupSpan {
    pub fn len(&self) -> usize {
        self.end_row - self.start_row
    }

    pub fn is_empty(&self) -> bool {
        self.start_row == self.end_row
    }

    pub fn contains(&self, row: usize) -> bool {
        row >= self.start_row && row < self.end_row
    }
}

/// Ordered row-group boundaries, built once at open time and shared by the
/// page fetcher and the sampler.
#[derive(Debug, Clone, Default)]
pub struct RowGroupMap {
    spans: Vec<RowGroupSpan>,
}

impl RowGroupMap {
    fn from_footer(meta: &FileMetadata) -> Self {
        let mut spans = Vec::with_capacity(meta.row_groups.len());
        let mut start = 0usize;
        for (index, rg) in meta.row_groups.iter().enumerate() {
            let end = start + rg.num_rows();
            spans.push(RowGroupSpan {
                index,
                start_row: start,
                end_row: end,
            });
            start = end;
        }
        Self { spans }
    }

    pub fn spans(&self) -> &[RowGroupSpan] {
        &self.spans
    }

    pub fn group_count(&self) -> usize {
        self.spans.len()
    }

    /// Total rows covered by all groups. Equals the footer row count.
    pub fn total_rows(&self) -> usize {
        self.spans.last().map(|s| s.end_row).unwrap_or(0)
    }

    /// Groups whose span intersects `rows` (half-open), in file order.
    pub fn groups_overlapping(&self, rows: Range<usize>) -> &[RowGroupSpan] {
        if rows.start >= rows.end {
            return &[];
        }
        let first = self.spans.partition_point(|s| s.end_row <= rows.start);
        let last = self.spans.partition_point(|s| s.start_row < rows.end);
        &self.spans[first..last]
    }

    /// The group owning an absolute row position.
    pub fn group_containing(&self, row: usize) -> Option<&RowGroupSpan> {
        let idx = self.spans.partition_point(|s| s.end_row <= row);
        self.spans.get(idx).filter(|s| s.contains(row))
    }
}

/// An opened Parquet source: path, footer info, and row-group boundaries.
///
/// When the source was an uploaded byte stream, the handle owns the backing
/// temp file; dropping the handle removes it.
#[derive(Debug)]
pub struct FileHandle {
    path: PathBuf,
    temp: Option<NamedTempFile>,
    info: FileInfo,
    row_groups: RowGroupMap,
}

impl FileHandle {
    /// Open a Parquet file from a local path, reading only the footer.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        Self::open_inner(path, None)
    }

    /// Open from an uploaded byte stream by persisting it to a temp file first
    /// (same approach as downloading a remote source before scanning). The
    /// temp file lives as long as the handle.
    pub fn open_bytes(bytes: &[u8], name: &str, max_upload_bytes: u64) -> Result<Self> {
        if bytes.len() as u64 > max_upload_bytes {
            return Err(ParqError::UploadTooLarge {
                size: bytes.len() as u64,
                limit: max_upload_bytes,
            });
        }
        let mut temp = NamedTempFile::new()?;
        temp.write_all(bytes)?;
        temp.flush()?;
        let path = temp.path().to_path_buf();
        let mut handle = Self::open_inner(path, Some(temp))?;
        handle.info.file_name = name.to_string();
        Ok(handle)
    }

    fn open_inner(path: PathBuf, temp: Option<NamedTempFile>) -> Result<Self> {
        let file_size = std::fs::metadata(&path)?.len();
        let mut file = std::fs::File::open(&path)?;
        let meta = read_metadata(&mut file).map_err(|e| ParqError::InvalidFile {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let compression = check_compression(&meta)?;
        let nullable = nullable_by_column(&meta);
        let schema = read_schema(&path, &nullable)?;
        let row_groups = RowGroupMap::from_footer(&meta);

        let key_value_metadata = meta
            .key_value_metadata
            .iter()
            .flatten()
            .map(|kv| (kv.key.clone(), kv.value.clone().unwrap_or_default()))
            .collect();

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let info = FileInfo {
            file_name,
            file_size,
            row_count: meta.num_rows,
            column_count: schema.len(),
            schema,
            compression,
            key_value_metadata,
        };

        Ok(Self {
            path,
            temp,
            info,
            row_groups,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    pub fn row_groups(&self) -> &RowGroupMap {
        &self.row_groups
    }

    pub fn row_count(&self) -> usize {
        self.info.row_count
    }

    /// True when the handle owns a temp file (byte-stream source).
    pub fn is_temp_backed(&self) -> bool {
        self.temp.is_some()
    }

    /// Fresh lazy scan over the file. Cheap; no row data is read until collect.
    pub fn scan(&self) -> Result<LazyFrame> {
        let pl_path = PlPath::Local(Arc::from(self.path.as_path()));
        let lf = LazyFrame::scan_parquet(pl_path, ScanArgsParquet::default())?;
        Ok(lf)
    }
}

/// Codec of the first column chunk; errors if any chunk uses an unsupported one.
fn check_compression(meta: &FileMetadata) -> Result<String> {
    let mut first: Option<String> = None;
    for rg in &meta.row_groups {
        for cc in rg.parquet_columns() {
            let codec = format!("{:?}", cc.compression()).to_lowercase();
            if !SUPPORTED_CODECS.contains(&codec.as_str()) {
                return Err(ParqError::UnsupportedCompression { codec });
            }
            if first.is_none() {
                first = Some(codec);
            }
        }
    }
    Ok(first.unwrap_or_else(|| "uncompressed".to_string()))
}

/// Nullability per top-level column, from the definition levels of the first
/// row group's chunks. Files without row groups report every column nullable.
fn nullable_by_column(meta: &FileMetadata) -> HashMap<String, bool> {
    let mut out: HashMap<String, bool> = HashMap::new();
    if let Some(rg) = meta.row_groups.first() {
        for cc in rg.parquet_columns() {
            let name = cc
                .descriptor()
                .path_in_schema
                .first()
                .map(|s| s.to_string())
                .unwrap_or_default();
            let optional = cc.descriptor().descriptor.max_def_level > 0;
            *out.entry(name).or_insert(false) |= optional;
        }
    }
    out
}

fn read_schema(path: &Path, nullable: &HashMap<String, bool>) -> Result<Vec<ColumnSchema>> {
    let pl_path = PlPath::Local(Arc::from(path));
    let mut lf = LazyFrame::scan_parquet(pl_path, ScanArgsParquet::default())?;
    let schema = lf.collect_schema()?;
    let mut columns = Vec::with_capacity(schema.len());
    for (name, dtype) in schema.iter() {
        let name = name.to_string();
        let is_image = is_image_column(&name, dtype);
        let nullable = nullable.get(&name).copied().unwrap_or(true);
        columns.push(ColumnSchema {
            name,
            dtype: dtype.clone(),
            nullable,
            is_image,
        });
    }
    Ok(columns)
}

/// Binary columns and columns with an image-ish name are treated as image-like.
pub fn is_image_column(name: &str, dtype: &DataType) -> bool {
    if matches!(dtype, DataType::Binary | DataType::BinaryOffset) {
        return true;
    }
    let lower = name.to_lowercase();
    IMAGE_NAME_HINTS.iter().any(|hint| lower.contains(hint))
}

/// How row data will be read for a handle. Chosen once per open, then consumed
/// uniformly by the fetcher; never re-derived mid-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPlan {
    /// Materialize the whole table eagerly.
    FullLoad,
    /// Read only the row groups a page needs.
    RowGroupStream,
    /// Work against a bounded random sample.
    Sampled { size: usize },
}

/// User override of the size-based plan choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanOverride {
    #[default]
    None,
    /// "Load full data" despite size.
    ForceFull,
    /// "Load random sample" despite size.
    ForceSample,
}

/// Pick the access plan for a handle from the configured thresholds.
pub fn choose_plan(
    handle: &FileHandle,
    config: &FileLoadingConfig,
    overrides: PlanOverride,
) -> AccessPlan {
    match overrides {
        PlanOverride::ForceFull => return AccessPlan::FullLoad,
        PlanOverride::ForceSample => {
            return AccessPlan::Sampled {
                size: config.sample_size,
            }
        }
        PlanOverride::None => {}
    }
    let rows = handle.row_count();
    if rows <= config.full_load_threshold {
        AccessPlan::FullLoad
    } else if rows > config.sample_threshold {
        AccessPlan::Sampled {
            size: config.sample_size,
        }
    } else {
        AccessPlan::RowGroupStream
    }
}
