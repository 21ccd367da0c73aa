//! HTTP client for the generic record-table API.
//!
//! Every endpoint answers with a JSON envelope carrying `success` and an
//! optional `message`. Reads put rows in `data`; mutations report one entry
//! per submitted record in `results`.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use taskflow_settings::RemoteSettings;
use tracing::{debug, warn};

use crate::errors::{FieldError, RecordFailure, Result, TaskError};

// ─────────────────────────────────────────────────────────────────────────────
// Request bodies
// ─────────────────────────────────────────────────────────────────────────────

/// Body of a `records/query` call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Columns to return.
    pub fields: Vec<FieldSpec>,
    /// Conditions, all of which must hold.
    #[serde(rename = "where", skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    /// Ordering.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    /// Page window.
    pub paging_info: PagingInfo,
}

impl QueryRequest {
    /// Query returning `fields` from the first page of `limit` rows.
    pub fn new(fields: &[&str], limit: u32) -> Self {
        Self {
            fields: fields.iter().map(|name| FieldSpec::new(name)).collect(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            paging_info: PagingInfo { limit, offset: 0 },
        }
    }

    /// Add an `EqualTo` condition.
    #[must_use]
    pub fn where_equal(mut self, field: &str, value: impl Into<serde_json::Value>) -> Self {
        self.conditions.push(Condition {
            field_name: field.to_owned(),
            operator: "EqualTo".to_owned(),
            values: vec![value.into()],
        });
        self
    }

    /// Order by `field`, newest first.
    #[must_use]
    pub fn order_desc(mut self, field: &str) -> Self {
        self.order_by.push(OrderBy {
            field_name: field.to_owned(),
            sort_type: "DESC".to_owned(),
        });
        self
    }
}

/// A requested column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Column reference.
    pub field: FieldName,
}

impl FieldSpec {
    fn new(name: &str) -> Self {
        Self {
            field: FieldName {
                name: name.to_owned(),
            },
        }
    }
}

/// `{"Name": "<column>"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldName {
    /// Column name.
    #[serde(rename = "Name")]
    pub name: String,
}

/// A filter condition.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Condition {
    /// Column name.
    pub field_name: String,
    /// Comparison operator, e.g. `EqualTo`.
    pub operator: String,
    /// Operand values.
    pub values: Vec<serde_json::Value>,
}

/// An ordering clause.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderBy {
    /// Column name.
    #[serde(rename = "fieldName")]
    pub field_name: String,
    /// `ASC` or `DESC`.
    #[serde(rename = "sorttype")]
    pub sort_type: String,
}

/// Page window. Only the first page is ever requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PagingInfo {
    /// Maximum rows.
    pub limit: u32,
    /// Rows to skip.
    pub offset: u32,
}

#[derive(Serialize)]
struct RecordsBody<'a, B> {
    records: &'a [B],
}

#[derive(Serialize)]
struct DeleteBody<'a> {
    #[serde(rename = "RecordIds")]
    record_ids: &'a [u64],
}

// ─────────────────────────────────────────────────────────────────────────────
// Response envelopes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ListEnvelope<R> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default = "Vec::new")]
    data: Vec<R>,
}

#[derive(Deserialize)]
struct GetEnvelope<R> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default = "Option::default")]
    data: Option<R>,
}

#[derive(Deserialize)]
struct MutationEnvelope<R> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default = "Vec::new")]
    results: Vec<RecordResult<R>>,
}

/// Per-record result of a create, update, or delete.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RecordResult<R> {
    /// Whether this record was applied.
    pub success: bool,
    /// The stored row, when the API returns it.
    #[serde(default = "Option::default")]
    pub data: Option<R>,
    /// Failure message.
    #[serde(default)]
    pub message: Option<String>,
    /// Field-level failures.
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

impl<R> RecordResult<R> {
    /// Failure details for a rejected record.
    pub fn failure(&self) -> RecordFailure {
        RecordFailure {
            message: self
                .message
                .clone()
                .unwrap_or_else(|| "record rejected".to_owned()),
            field_errors: self.errors.clone(),
        }
    }
}

fn envelope_failure(message: Option<String>) -> TaskError {
    TaskError::remote(message.unwrap_or_else(|| "request failed".to_owned()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Record-table API client.
pub struct RecordClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RecordClient {
    /// Build a client from remote settings.
    pub fn new(settings: &RemoteSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .user_agent(concat!("taskflow/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_owned(),
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    fn records_url(&self, table: &str) -> String {
        format!("{}/tables/{table}/records", self.base_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.api_key {
            Some(ref key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Send a request and decode the body, mapping non-2xx to
    /// [`TaskError::Remote`].
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "record API returned error status");
            return Err(TaskError::remote(format!("HTTP {}: {body}", status.as_u16())));
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Run a query and return the first page of rows.
    pub async fn query<R: DeserializeOwned>(
        &self,
        table: &str,
        query: &QueryRequest,
    ) -> Result<Vec<R>> {
        let url = format!("{}/query", self.records_url(table));
        debug!(table, limit = query.paging_info.limit, "querying records");
        let envelope: ListEnvelope<R> = self
            .send(self.request(Method::POST, &url).json(query))
            .await?;
        if !envelope.success {
            return Err(envelope_failure(envelope.message));
        }
        Ok(envelope.data)
    }

    /// Fetch one row. A 404 or a `null` payload both mean "no such record".
    pub async fn fetch<R: DeserializeOwned>(&self, table: &str, id: u64) -> Result<Option<R>> {
        let url = format!("{}/{id}", self.records_url(table));
        debug!(table, id, "fetching record");
        let response = self.request(Method::GET, &url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "record API returned error status");
            return Err(TaskError::remote(format!("HTTP {}: {body}", status.as_u16())));
        }
        let envelope: GetEnvelope<R> = serde_json::from_slice(&response.bytes().await?)?;
        if !envelope.success {
            return Err(envelope_failure(envelope.message));
        }
        Ok(envelope.data)
    }

    /// Create rows.
    pub async fn create<B, R>(&self, table: &str, records: &[B]) -> Result<Vec<RecordResult<R>>>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        debug!(table, count = records.len(), "creating records");
        self.mutate(Method::POST, table, &RecordsBody { records })
            .await
    }

    /// Update rows; each must carry its `Id`.
    pub async fn update<B, R>(&self, table: &str, records: &[B]) -> Result<Vec<RecordResult<R>>>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        debug!(table, count = records.len(), "updating records");
        self.mutate(Method::PATCH, table, &RecordsBody { records })
            .await
    }

    /// Delete rows by ID.
    pub async fn delete(
        &self,
        table: &str,
        ids: &[u64],
    ) -> Result<Vec<RecordResult<serde_json::Value>>> {
        debug!(table, ?ids, "deleting records");
        self.mutate(Method::DELETE, table, &DeleteBody { record_ids: ids })
            .await
    }

    async fn mutate<T, R>(
        &self,
        method: Method,
        table: &str,
        body: &T,
    ) -> Result<Vec<RecordResult<R>>>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.records_url(table);
        let envelope: MutationEnvelope<R> =
            self.send(self.request(method, &url).json(body)).await?;
        if !envelope.success {
            return Err(envelope_failure(envelope.message));
        }
        Ok(envelope.results)
    }
}

/// Expect exactly one result and return its row, or the record's failure as
/// [`TaskError::Remote`].
pub fn single<R>(results: Vec<RecordResult<R>>) -> Result<Option<R>> {
    let Some(result) = results.into_iter().next() else {
        return Err(TaskError::remote("record API returned no results"));
    };
    if result.success {
        Ok(result.data)
    } else {
        Err(TaskError::remote(result.failure().to_string()))
    }
}
