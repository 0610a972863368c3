//! In-process backend holding tables in memory.
//!
//! Used by the test suite and for running the terminal front-end without a server
//! (`[backend] type = "memory"`). It answers the same methods a real backend does, records
//! every request it receives, and can be told to fail or to hold back responses so that
//! callers can be tested against slow and out-of-order completions.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::oneshot;
use tracing::debug;

use super::{
    Backend, BackendError, BackendRequest, BackendResponse, Result, ACTIONS_GET,
    RECORD_CREATE, RECORD_GET, ROWS_GET, SCHEMA_GET,
};
use crate::schema::{value_key, Record, ID_COLUMN};

type TableKey = (String, String);

#[derive(Deserialize, Debug, Clone, Default)]
pub struct MemoryTable {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub schema: Map<String, Value>,
    #[serde(default)]
    pub rows: Vec<Record>,
    #[serde(default)]
    pub actions: Vec<Value>,
}

impl MemoryTable {
    pub fn new(name: &str, schema: Value) -> Self {
        Self {
            name: name.to_string(),
            schema: schema.as_object().cloned().unwrap_or_default(),
            rows: vec![],
            actions: vec![],
        }
    }

    pub fn with_rows(mut self, rows: Vec<Value>) -> Self {
        self.rows
            .extend(rows.into_iter().filter_map(|r| r.as_object().cloned()));
        self
    }

    pub fn with_actions(mut self, actions: Vec<Value>) -> Self {
        self.actions = actions;
        self
    }

    fn next_id(&self) -> i64 {
        self.rows
            .iter()
            .filter_map(|r| r.get(ID_COLUMN).and_then(Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1
    }

    fn find(&self, id: &Value) -> Option<&Record> {
        let key = value_key(id);
        self.rows
            .iter()
            .find(|r| r.get(ID_COLUMN).map(value_key).as_deref() == Some(key.as_str()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<TableKey, MemoryTable>>,
    requests: Mutex<Vec<BackendRequest>>,
    unreachable: Mutex<HashSet<TableKey>>,
    held: Mutex<HashMap<TableKey, VecDeque<oneshot::Receiver<()>>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load tables from a `{db: {table: {name, schema, rows, actions}}}` document
    pub fn from_fixture(fixture: Value) -> Result<Self> {
        let databases: HashMap<String, HashMap<String, MemoryTable>> =
            serde_json::from_value(fixture)?;

        let backend = Self::new();
        for (db, tables) in databases {
            for (table, contents) in tables {
                backend.add_table(&db, &table, contents);
            }
        }

        Ok(backend)
    }

    pub fn add_table(&self, db: &str, table: &str, contents: MemoryTable) {
        self.tables
            .lock()
            .insert((db.to_string(), table.to_string()), contents);
    }

    pub fn rows(&self, db: &str, table: &str) -> Vec<Record> {
        self.tables
            .lock()
            .get(&(db.to_string(), table.to_string()))
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().clone()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method_name == method)
            .count()
    }

    /// Make every call to this table fail as if the server couldn't be reached
    pub fn set_unreachable(&self, db: &str, table: &str, unreachable: bool) {
        let key = (db.to_string(), table.to_string());
        let mut tables = self.unreachable.lock();
        if unreachable {
            tables.insert(key);
        } else {
            tables.remove(&key);
        }
    }

    /// Hold back the response to the next call on this table until the returned sender fires
    /// (or is dropped). The response itself is computed when the call arrives.
    pub fn hold_next(&self, db: &str, table: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held
            .lock()
            .entry((db.to_string(), table.to_string()))
            .or_default()
            .push_back(rx);
        tx
    }

    fn respond(&self, request: &BackendRequest) -> Result<BackendResponse> {
        let key = (request.package_name.clone(), request.class_name.clone());
        if self.unreachable.lock().contains(&key) {
            return Err(BackendError::Generic {
                reason: format!("{}.{} is unreachable", key.0, key.1),
            });
        }

        let mut tables = self.tables.lock();
        let table = match tables.get_mut(&key) {
            Some(table) => table,
            None => {
                return Ok(BackendResponse::failed(&format!(
                    "Table {}.{} doesn't exist",
                    key.0, key.1
                )))
            }
        };

        let response = match request.method_name.as_str() {
            SCHEMA_GET => BackendResponse::ok(json!({
                "name": table.name,
                "schema": table.schema,
            })),
            ACTIONS_GET => BackendResponse::ok(Value::Array(table.actions.clone())),
            RECORD_GET => {
                let id = request.record_id.clone().unwrap_or(Value::Null);
                match table.find(&id) {
                    Some(record) => BackendResponse::ok(Value::Object(record.clone())),
                    None => BackendResponse::failed(&format!(
                        "Record {} doesn't exist",
                        value_key(&id)
                    )),
                }
            }
            RECORD_CREATE => {
                let mut record = request
                    .args
                    .get("data")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                let id = table.next_id();
                record.insert(ID_COLUMN.to_string(), json!(id));
                table.rows.push(record);
                BackendResponse::ok(json!({ "id": id }))
            }
            ROWS_GET => {
                let columns: Vec<String> = request
                    .args
                    .get("columns")
                    .and_then(|c| serde_json::from_value(c.clone()).ok())
                    .unwrap_or_default();
                BackendResponse::ok(json!({ "rows": project(&table.rows, &columns) }))
            }
            _ => {
                return Err(BackendError::UnknownMethod {
                    package: request.package_name.clone(),
                    class: request.class_name.clone(),
                    method: request.method_name.clone(),
                })
            }
        };

        Ok(response)
    }
}

// Keep the requested columns; the display column (the one after `id`) is also exposed as `name`
fn project(rows: &[Record], columns: &[String]) -> Vec<Record> {
    if columns.is_empty() {
        return rows.to_vec();
    }

    rows.iter()
        .map(|row| {
            let mut out = Map::new();
            for column in columns {
                out.insert(
                    column.clone(),
                    row.get(column).cloned().unwrap_or(Value::Null),
                );
            }
            if let Some(display) = columns.iter().find(|c| c.as_str() != ID_COLUMN) {
                out.insert(
                    "name".to_string(),
                    row.get(display).cloned().unwrap_or(Value::Null),
                );
            }
            out
        })
        .collect()
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn call(&self, request: BackendRequest) -> Result<BackendResponse> {
        self.requests.lock().push(request.clone());

        let response = self.respond(&request);

        let gate = self
            .held
            .lock()
            .get_mut(&(request.package_name.clone(), request.class_name.clone()))
            .and_then(VecDeque::pop_front);
        if let Some(gate) = gate {
            debug!(
                "Holding {} on {}.{}",
                request.method_name, request.package_name, request.class_name
            );
            // A dropped sender releases the call as well
            let _ = gate.await;
        }

        response
    }
}
