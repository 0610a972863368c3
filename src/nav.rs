use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::info;

use crate::schema::value_key;

/// Address of a record's detail view: `/{db}/{table}/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordPath {
    pub db: String,
    pub table: String,
    pub id: String,
}

impl RecordPath {
    pub fn new(db: &str, table: &str, id: &Value) -> Self {
        Self {
            db: db.to_string(),
            table: table.to_string(),
            id: value_key(id),
        }
    }
}

impl Display for RecordPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}/{}", self.db, self.table, self.id)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{0:?} is not a /db/table/id path")]
pub struct InvalidRecordPath(String);

impl FromStr for RecordPath {
    type Err = InvalidRecordPath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .strip_prefix('/')
            .map(|rest| rest.split('/').collect::<Vec<_>>())
            .unwrap_or_default();

        match parts.as_slice() {
            [db, table, id] if !db.is_empty() && !table.is_empty() && !id.is_empty() => {
                Ok(Self {
                    db: db.to_string(),
                    table: table.to_string(),
                    id: id.to_string(),
                })
            }
            _ => Err(InvalidRecordPath(s.to_string())),
        }
    }
}

pub trait Navigator: Send + Sync + Debug {
    fn navigate(&self, path: &RecordPath);
}

/// Keeps every navigation in order; the terminal front-end reports from it
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<RecordPath>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<RecordPath> {
        self.history.lock().clone()
    }

    pub fn last(&self) -> Option<RecordPath> {
        self.history.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &RecordPath) {
        info!("Navigating to {path}");
        self.history.lock().push(path.clone());
    }
}
