//! # json-datasource
//!
//! Turns JSON HTTP responses into tabular query results for dashboards.
//!
//! ## Features
//!
//! - **Time-range macros**: `$__isoFrom()`, `$__unixEpochTo()` and friends
//! - **JSON paths**: members, wildcards, slices, recursive descent, filters
//! - **Field groups**: aligned columns from arrays of sub-documents
//! - **Typed frames**: string, number, time and boolean fields
//!
//! ## Modules
//!
//! - [`query`]: macros, paths, field extraction and frames
//! - [`datasource`]: request interpolation, fetching and query execution
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use json_datasource::config::DataSourceConfig;
//! use json_datasource::datasource::{HttpFetcher, JsonDataSource};
//! use json_datasource::query::{FieldSpec, JsonQuery, QueryRequest, TimeRange};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpFetcher::new(DataSourceConfig {
//!         url: "https://api.example.com".into(),
//!         ..Default::default()
//!     })?;
//!     let datasource = JsonDataSource::new(fetcher);
//!
//!     let query = JsonQuery::new("A")
//!         .path("/readings?since=$__isoFrom()")
//!         .field(FieldSpec::group(
//!             "$.readings[*]",
//!             vec![FieldSpec::leaf("$.time"), FieldSpec::leaf("$.value")],
//!         ));
//!
//!     let response = datasource
//!         .query(&QueryRequest::new(TimeRange::last_hours(6), vec![query]))
//!         .await?;
//!
//!     println!("Got {} frames", response.data.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod datasource;
pub mod query;

pub use config::{
    Config, ConfigError, ConfigSource, DataSourceConfig, LoadedConfig, LoggingConfig,
};

pub use datasource::{
    DataSourceError, DataSourceResult, FetchError, FetchRequest, HttpFetcher, JsonDataSource,
    JsonFetcher, MetricFindValue, QueryResponse,
};

pub use query::{
    Column, FieldExtractor, FieldSpec, FieldType, Frame, JsonPathEvaluator, JsonQuery,
    PathError, PathEvaluator, QueryError, QueryRequest, QueryResult, TimeRange,
};
