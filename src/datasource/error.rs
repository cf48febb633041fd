//! Data source error types

use thiserror::Error;

use crate::query::QueryError;

/// Errors raised while fetching a JSON document
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP client could not be built
    #[error("Client error: {0}")]
    Client(String),

    /// Base URL or path does not form a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request could not be sent or the connection failed
    #[error("Request failed: {0}")]
    Request(String),

    /// Server rejected the credentials
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Non-success status code
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body is not valid JSON
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Errors that can occur while running a query
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Query(#[from] QueryError),

    /// The response body was `null`
    #[error("Query {0} returned empty data")]
    EmptyResponse(String),
}

/// Result type for data source operations
pub type DataSourceResult<T> = Result<T, DataSourceError>;
