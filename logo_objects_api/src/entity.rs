//! Generic per-entity client: CRUD and list calls for any [`Entity`] descriptor.

use std::fmt::Display;
use std::marker::PhantomData;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{
    client::{ApiClient, RequestDescriptor},
    errors::ApiError,
    query::{Column, Operators, QueryOptions, SearchCriteria},
    types::ListResponse,
};

/// Describes one remote resource: where it lives and what its columns are.
pub trait Entity {
    /// Collection path, e.g. `/api/v1/items`.
    const ENDPOINT: &'static str;
    /// Physical column names usable in filters, field selection and sorting.
    type Field: Column;
    type Record: DeserializeOwned + Serialize;
}

/// Client for one entity endpoint, borrowed from an [`ApiClient`].
pub struct EntityClient<'a, E> {
    client: &'a ApiClient,
    entity: PhantomData<E>,
}

impl<'a, E: Entity> EntityClient<'a, E> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            entity: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        E::ENDPOINT
    }

    /// `{endpoint}[/{id}][/{subpath}]`, with the id percent-encoded as one
    /// segment and each `/`-separated part of the subpath encoded on its own.
    pub fn path(&self, id: Option<&str>, subpath: Option<&str>) -> Result<String, ApiError> {
        let mut path = E::ENDPOINT.trim_end_matches('/').to_string();
        if let Some(id) = id {
            push_segment(&mut path, id)?;
        }
        if let Some(subpath) = subpath {
            for part in subpath.trim_matches('/').split('/') {
                push_segment(&mut path, part)?;
            }
        }
        Ok(path)
    }

    pub async fn get_all(
        &self,
        options: &QueryOptions,
    ) -> Result<ListResponse<E::Record>, ApiError> {
        self.client.get(&self.path(None, None)?, Some(options)).await
    }

    /// Lists records matching `criteria`; any `q` already in `options` is replaced.
    pub async fn search(
        &self,
        criteria: &SearchCriteria<E::Field>,
        options: QueryOptions,
    ) -> Result<ListResponse<E::Record>, ApiError> {
        self.get_all(&options.with_criteria(criteria)).await
    }

    /// Lists records whose `field` starts with `prefix`.
    pub async fn find_by_prefix(
        &self,
        field: E::Field,
        prefix: &str,
        options: QueryOptions,
    ) -> Result<ListResponse<E::Record>, ApiError> {
        let criteria =
            SearchCriteria::new().with(field, Operators::new().like(format!("{}*", prefix)));
        self.search(&criteria, options).await
    }

    pub async fn get_by_id(
        &self,
        id: impl Display,
        options: Option<&QueryOptions>,
    ) -> Result<E::Record, ApiError> {
        let path = self.path(Some(&id.to_string()), None)?;
        self.client.get(&path, options).await
    }

    pub async fn create(&self, record: &E::Record) -> Result<E::Record, ApiError> {
        self.client.post(&self.path(None, None)?, record).await
    }

    pub async fn update(
        &self,
        id: impl Display,
        record: &E::Record,
    ) -> Result<E::Record, ApiError> {
        let path = self.path(Some(&id.to_string()), None)?;
        self.client.put(&path, record).await
    }

    pub async fn patch(&self, id: impl Display, changes: &Value) -> Result<Value, ApiError> {
        let path = self.path(Some(&id.to_string()), None)?;
        self.client.patch(&path, changes).await
    }

    pub async fn delete(&self, id: impl Display) -> Result<Value, ApiError> {
        let path = self.path(Some(&id.to_string()), None)?;
        self.client.delete(&path).await
    }

    /// Number of records matching `criteria` (all records when `None`).
    pub async fn get_count(
        &self,
        criteria: Option<&SearchCriteria<E::Field>>,
    ) -> Result<u64, ApiError> {
        let mut options = QueryOptions::default();
        if let Some(criteria) = criteria {
            options = options.with_criteria(criteria);
        }
        self.count_matching(options).await
    }

    /// Counts records for caller-built options, e.g. a `q` compiled from
    /// untyped columns.
    ///
    /// Asks for a single row with `withCount=true` and reads `totalCount`;
    /// a response without it counts as 0.
    pub async fn count_matching(&self, options: QueryOptions) -> Result<u64, ApiError> {
        let options = options.with_limit(1).with_total_count(true);
        let resp: ListResponse<Value> = self
            .client
            .get(&self.path(None, None)?, Some(&options))
            .await?;
        Ok(resp.count())
    }

    /// Calls a custom endpoint below this entity, e.g. `POST /api/v1/items/12/copy`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        id: Option<&str>,
        subpath: &str,
        options: Option<&QueryOptions>,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let path = self.path(id, Some(subpath))?;
        let mut descriptor = RequestDescriptor::new(method, path);
        if let Some(options) = options {
            descriptor = descriptor.with_query(options);
        }
        if let Some(body) = body {
            descriptor = descriptor.with_body(body);
        }
        self.client.request(descriptor).await
    }
}

fn push_segment(path: &mut String, segment: &str) -> Result<(), ApiError> {
    if matches!(segment, "" | "." | "..") {
        return Err(ApiError::other(
            format!("Invalid path segment {:?}", segment),
            "empty and dot segments cannot address a record",
        ));
    }
    path.push('/');
    path.push_str(&urlencoding::encode(segment));
    Ok(())
}
