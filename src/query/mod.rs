//! Query Engine
//!
//! Everything needed to turn a saved [`JsonQuery`] and a JSON response into
//! result frames, independent of how the response is fetched:
//!
//! - **Macros**: time-range macros such as `$__isoFrom()`
//! - **Template**: dashboard variables, then macros
//! - **Path**: JSON path parsing and evaluation
//! - **Extract**: field specs to aligned columns
//! - **Frame**: typed, equal-length result tables
//!
//! # Example
//!
//! ```rust
//! use json_datasource::query::{FieldExtractor, FieldSpec, Frame};
//! use serde_json::json;
//!
//! let doc = json!([{ "foo": "bar", "abc": "def" }, { "foo": "baz" }]);
//! let fields = vec![FieldSpec::group(
//!     "$[*]",
//!     vec![FieldSpec::leaf("$.foo"), FieldSpec::leaf("$.abc")],
//! )];
//!
//! let columns = FieldExtractor::new().extract(&doc, &fields).unwrap();
//! assert_eq!(columns[1].values, vec![Some(json!("def")), None]);
//!
//! let frame = Frame::from_columns("A", columns).unwrap();
//! assert_eq!(frame.len(), 2);
//! ```

mod error;
mod extract;
mod frame;
pub mod macros;
mod model;
mod params;
pub mod path;
mod template;
mod time;

pub use error::{PathError, QueryError, QueryResult};
pub use extract::{Column, FieldExtractor};
pub use frame::{detect_field_type, display_value, Field, Frame};
pub use model::{
    FieldGroup, FieldSpec, FieldType, JsonQuery, LeafField, Method, QueryRequest,
};
pub use params::KeyValues;
pub use path::{JsonPathEvaluator, PathEvaluator};
pub use template::{interpolate, Interpolator, ScopedVars};
pub use time::{parse_time_bound, TimeRange};
