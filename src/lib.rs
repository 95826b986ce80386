pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod image;
pub mod query;
pub mod reader;
pub mod sample;
pub mod session;
pub mod stats;

pub use cli::Args;
pub use config::{AppConfig, ConfigManager, DisplayConfig, FileLoadingConfig};
pub use error::{ParqError, Result};
pub use fetch::{Page, PageFetcher, RowRange};
pub use image::{ImageCell, ImageFormat};
pub use query::{FilterOperator, FilterStatement, SortDirection, SortSpec, ViewSpec};
pub use reader::{
    choose_plan, AccessPlan, ColumnSchema, FileHandle, FileInfo, PlanOverride, RowGroupMap,
    RowGroupSpan,
};
pub use session::Session;
pub use stats::{ColumnStats, NumericStats};

pub const APP_NAME: &str = "parqlens";
