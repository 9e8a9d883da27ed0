//! Client core for the Logo Objects REST API.
//!
//! Two pieces carry the logic: the query compiler ([`build_search_query`],
//! [`build_query_string`]), which turns typed filters and list options into
//! the API's query string, and [`ApiClient`],
//! which dispatches requests with auth injection, timeouts and retries and
//! reports failures as [`ApiError`]. [`EntityClient`] layers CRUD calls on top
//! for any [`Entity`] descriptor.

mod auth;
mod client;
pub mod config;
pub mod entities;
mod entity;
mod errors;
mod query;
pub mod types;

pub use self::auth::AccessToken;
pub use self::client::{ApiClient, RequestDescriptor};
pub use self::config::{ApiClientConfig, ApiClientConfigBuilder, AuthConfig, ConfigError};
pub use self::entity::{Entity, EntityClient};
pub use self::errors::{classify, ApiError, FieldError, TransportFailure};
pub use self::query::{
    build_query, build_query_string, build_search_query, Column, FieldValue, Operator,
    Operators, Query, QueryOptions, Scalar, SearchCriteria, SortDirection, SortSpec,
};
pub use self::types::ListResponse;
pub use reqwest::Method;
