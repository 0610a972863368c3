//! Generic RPC-style access to the record backend.
//!
//! Every call is an envelope of `{packageName, className, methodName, args}` answered by
//! `{ok, data}`. [`Backend`] is the transport seam; [`BackendClient`] layers the typed
//! methods the forms rely on (and the schema cache) on top of it.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::schema::{ActionButton, Record, TableSchema, ID_COLUMN};

#[cfg(feature = "backend-http")]
pub mod http;
pub mod memory;

pub const SCHEMA_GET: &str = "schemaGet";
pub const RECORD_GET: &str = "recordGet";
pub const RECORD_CREATE: &str = "recordCreate";
pub const ROWS_GET: &str = "rowsGet";
pub const ACTIONS_GET: &str = "actionsGet";

pub const DEFAULT_SCHEMA_CACHE_CAPACITY: u64 = 256;
pub const DEFAULT_SCHEMA_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[cfg(feature = "backend-http")]
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend call {method} failed: {message}")]
    Rejected { method: String, message: String },

    #[error("Failed parsing backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Backend response to {method} is missing {field:?}")]
    MissingField { method: String, field: String },

    #[error("Unknown backend method {package}.{class}.{method}")]
    UnknownMethod {
        package: String,
        class: String,
        method: String,
    },

    #[error("{reason}")]
    Generic { reason: String },
}

pub type Result<T, E = BackendError> = std::result::Result<T, E>;

/// The RPC envelope sent to the backend
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackendRequest {
    pub package_name: String,
    pub class_name: String,
    pub method_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Value>,
    #[serde(default)]
    pub args: Value,
}

impl BackendRequest {
    pub fn new(db: &str, table: &str, method: &str) -> Self {
        Self {
            package_name: db.to_string(),
            class_name: table.to_string(),
            method_name: method.to_string(),
            record_id: None,
            args: json!({}),
        }
    }

    pub fn with_record_id(mut self, record_id: Value) -> Self {
        self.record_id = Some(record_id);
        self
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackendResponse {
    pub ok: bool,
    #[serde(default)]
    pub data: Value,
}

impl BackendResponse {
    pub fn ok(data: Value) -> Self {
        Self { ok: true, data }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            ok: false,
            data: json!({ "error": message }),
        }
    }

    /// Unwrap the payload, converting `ok: false` into an error for `method`
    pub fn into_data(self, method: &str) -> Result<Value> {
        if self.ok {
            return Ok(self.data);
        }

        let message = match &self.data {
            Value::String(s) => s.clone(),
            Value::Object(o) => o
                .get("error")
                .or_else(|| o.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("Server response was not ok")
                .to_string(),
            _ => "Server response was not ok".to_string(),
        };

        Err(BackendError::Rejected {
            method: method.to_string(),
            message,
        })
    }
}

#[async_trait]
pub trait Backend: Send + Sync + Debug {
    async fn call(&self, request: BackendRequest) -> Result<BackendResponse>;
}

#[derive(Debug, Deserialize)]
struct RowsResponse {
    #[serde(default)]
    rows: Vec<Record>,
}

/// Typed wrapper over a [`Backend`], caching table schemas by (db, table)
#[derive(Debug, Clone)]
pub struct BackendClient {
    inner: Arc<dyn Backend>,
    schemas: Cache<(String, String), Arc<TableSchema>>,
}

impl BackendClient {
    pub fn new(inner: Arc<dyn Backend>) -> Self {
        Self::new_with_cache(inner, DEFAULT_SCHEMA_CACHE_CAPACITY, DEFAULT_SCHEMA_CACHE_TTL)
    }

    pub fn new_with_cache(inner: Arc<dyn Backend>, capacity: u64, ttl: Duration) -> Self {
        let schemas = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self { inner, schemas }
    }

    /// Raw call, with `ok: false` turned into an error
    pub async fn call(&self, request: BackendRequest) -> Result<Value> {
        let method = request.method_name.clone();
        debug!(
            "Calling {}.{}.{}",
            request.package_name, request.class_name, request.method_name
        );
        self.inner.call(request).await?.into_data(&method)
    }

    pub async fn schema_get(&self, db: &str, table: &str) -> Result<Arc<TableSchema>> {
        let key = (db.to_string(), table.to_string());
        if let Some(schema) = self.schemas.get(&key).await {
            debug!("Schema for {db}.{table} served from cache");
            return Ok(schema);
        }

        let data = self.call(BackendRequest::new(db, table, SCHEMA_GET)).await?;
        let schema = Arc::new(serde_json::from_value::<TableSchema>(data)?);
        self.schemas.insert(key, schema.clone()).await;

        Ok(schema)
    }

    /// Drop a cached schema so the next `schema_get` hits the backend again
    pub async fn invalidate_schema(&self, db: &str, table: &str) {
        self.schemas
            .invalidate(&(db.to_string(), table.to_string()))
            .await;
    }

    pub async fn record_get(&self, db: &str, table: &str, id: &Value) -> Result<Record> {
        let data = self
            .call(BackendRequest::new(db, table, RECORD_GET).with_record_id(id.clone()))
            .await?;

        Ok(serde_json::from_value(data)?)
    }

    /// Create a record, returning the id the backend assigned to it
    pub async fn record_create(&self, db: &str, table: &str, data: Record) -> Result<Value> {
        let response = self
            .call(
                BackendRequest::new(db, table, RECORD_CREATE)
                    .with_args(json!({ "data": data })),
            )
            .await?;

        match response.get(ID_COLUMN) {
            Some(id) if !id.is_null() => Ok(id.clone()),
            _ => Err(BackendError::MissingField {
                method: RECORD_CREATE.to_string(),
                field: ID_COLUMN.to_string(),
            }),
        }
    }

    pub async fn rows_get(
        &self,
        db: &str,
        table: &str,
        columns: &[&str],
        query_modifier: Option<&Value>,
        query_modifier_args: Value,
    ) -> Result<Vec<Record>> {
        let data = self
            .call(BackendRequest::new(db, table, ROWS_GET).with_args(json!({
                "columns": columns,
                "queryModifier": query_modifier,
                "queryModifierArgs": query_modifier_args,
            })))
            .await?;

        Ok(serde_json::from_value::<RowsResponse>(data)?.rows)
    }

    pub async fn actions_get(&self, db: &str, table: &str) -> Result<Vec<ActionButton>> {
        let data = self.call(BackendRequest::new(db, table, ACTIONS_GET)).await?;
        if data.is_null() {
            return Ok(vec![]);
        }

        Ok(serde_json::from_value(data)?)
    }
}
