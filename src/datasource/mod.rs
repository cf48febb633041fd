//! JSON Data Source
//!
//! Runs [`JsonQuery`] targets end to end:
//!
//! ```text
//! JsonQuery → interpolate (vars, macros) → fetch → extract → Frame(s)
//! ```
//!
//! Fetching is delegated to a [`JsonFetcher`]; [`HttpFetcher`] is the
//! `reqwest` implementation.

mod client;
mod error;

pub use client::HttpFetcher;
pub use error::{DataSourceError, DataSourceResult, FetchError};

use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::query::{
    display_value, FieldExtractor, Frame, Interpolator, JsonPathEvaluator, JsonQuery, Method,
    PathEvaluator, QueryRequest, ScopedVars, TimeRange,
};

/// A fully interpolated request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchRequest {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Request body; only sent for POST
    pub body: Option<String>,
}

/// Source of JSON documents
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<Value, FetchError>;
}

/// Frames produced by one request
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResponse {
    pub data: Vec<Frame>,
}

/// A value offered for a dashboard variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricFindValue {
    pub text: String,
}

/// Executes JSON API queries
pub struct JsonDataSource<F, E = JsonPathEvaluator> {
    fetcher: F,
    extractor: FieldExtractor<E>,
}

impl<F: JsonFetcher> JsonDataSource<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            extractor: FieldExtractor::new(),
        }
    }
}

impl<F: JsonFetcher, E: PathEvaluator> JsonDataSource<F, E> {
    pub fn with_extractor(fetcher: F, extractor: FieldExtractor<E>) -> Self {
        Self { fetcher, extractor }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run every visible target of the request concurrently
    pub async fn query(&self, request: &QueryRequest) -> DataSourceResult<QueryResponse> {
        info!(
            request_id = %request.request_id,
            targets = request.targets.len(),
            "Running query"
        );

        let runs = request
            .targets
            .iter()
            .filter(|target| !target.hide)
            .map(|target| self.run_query(target, &request.range, &request.scoped_vars));

        let data = try_join_all(runs).await?.into_iter().flatten().collect();
        Ok(QueryResponse { data })
    }

    /// Run one target and build its frames
    pub async fn run_query(
        &self,
        query: &JsonQuery,
        range: &TimeRange,
        vars: &ScopedVars,
    ) -> DataSourceResult<Vec<Frame>> {
        let interpolator = Interpolator::new(range, vars);
        let document = self.request_json(query, &interpolator).await?;

        if document.is_null() {
            return Err(DataSourceError::EmptyResponse(query.ref_id.clone()));
        }

        let mut columns = self.extractor.extract(&document, &query.fields)?;
        for column in columns.iter_mut() {
            column.name = interpolator.apply(&column.name);
        }

        let frame = Frame::from_columns(query.ref_id.clone(), columns)?;
        debug!(ref_id = %query.ref_id, rows = frame.len(), "Built frame");

        match query.group_by_field.as_deref().filter(|f| !f.is_empty()) {
            Some(field) => Ok(frame.group_by(field)?),
            None => Ok(vec![frame]),
        }
    }

    /// Values of the query's first field, for dashboard variables
    pub async fn metric_find_query(
        &self,
        query: &JsonQuery,
        range: &TimeRange,
        vars: &ScopedVars,
    ) -> DataSourceResult<Vec<MetricFindValue>> {
        let frames = self.run_query(query, range, vars).await?;

        Ok(frames
            .first()
            .and_then(|frame| frame.fields.first())
            .map(|field| {
                field
                    .values
                    .iter()
                    .flatten()
                    .map(|v| MetricFindValue {
                        text: display_value(v),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn request_json(
        &self,
        query: &JsonQuery,
        interpolator: &Interpolator<'_>,
    ) -> Result<Value, FetchError> {
        let apply = |s: &str| interpolator.apply(s);
        let interpolate_pairs = |pairs: &[(String, String)]| -> Vec<(String, String)> {
            pairs.iter().map(|(k, v)| (apply(k), apply(v))).collect()
        };

        let body = match query.method {
            Method::Post if !query.body.is_empty() => Some(apply(&query.body)),
            _ => None,
        };

        let request = FetchRequest {
            method: query.method,
            path: apply(&query.url_path),
            params: interpolate_pairs(&query.params.query_pairs()),
            headers: interpolate_pairs(&query.headers),
            body,
        };

        self.fetcher.fetch(request).await
    }
}
