use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of a table, keyed by column id. `id` is the primary key once the record exists.
pub type Record = Map<String, Value>;

pub const ID_COLUMN: &str = "id";
pub const DATETIME_COLUMN_TYPE: &str = "datetime";

/// Label of the sentinel entry appended to every dropdown option set
pub const NONE_OPTION_LABEL: &str = "None";

/// Rendering/validation metadata for a single column, as declared by the backend.
///
/// Every field is optional on the wire. Flags are read with JavaScript-style truthiness
/// since backends commonly send `0`/`1` or `null` instead of proper booleans.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnSettings {
    pub field_type: Option<String>,
    pub friendly_name: Option<String>,
    pub friendly_column_name: Option<String>,
    pub column_type: Option<String>,
    pub join: Option<String>,
    pub join_db: Option<String>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub reference_create: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub read_only: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub hidden: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub hidden_record: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub hidden_create: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub hidden_update: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub primary_key: bool,
    pub default_value: Option<Value>,
    pub query_modifier: Option<Value>,
    pub table: Option<String>,
    pub help_text: Option<String>,

    // Anything else the backend declares, passed back verbatim in `queryModifierArgs`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ColumnSettings {
    pub fn is_datetime(&self) -> bool {
        self.column_type.as_deref() == Some(DATETIME_COLUMN_TYPE)
    }

    /// The joined (db, table) pair for reference columns
    pub fn join_target(&self) -> Option<(&str, &str)> {
        let table = self.join.as_deref().filter(|t| !t.is_empty())?;
        Some((self.join_db.as_deref().unwrap_or_default(), table))
    }

    pub fn is_join(&self) -> bool {
        self.join_target().is_some()
    }

    pub fn label<'a>(&'a self, column_id: &'a str) -> &'a str {
        match self.friendly_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => column_id,
        }
    }

    /// Column of the joined table shown in dropdowns
    pub fn display_column(&self) -> &str {
        self.friendly_column_name.as_deref().unwrap_or("name")
    }
}

/// A table's full column description, in the backend's declaration order
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct TableSchema {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "schema", default)]
    pub columns: IndexMap<String, ColumnSettings>,
}

impl TableSchema {
    pub fn column(&self, column_id: &str) -> Option<&ColumnSettings> {
        self.columns.get(column_id)
    }

    pub fn contains(&self, column_id: &str) -> bool {
        self.columns.contains_key(column_id)
    }

    pub fn datetime_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|(_, settings)| settings.is_datetime())
            .map(|(column_id, _)| column_id.as_str())
    }
}

/// One entry of a reference field's dropdown
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DropdownOption {
    pub id: Value,
    pub name: String,
}

impl DropdownOption {
    /// The `{id: null, name: "None"}` sentinel
    pub fn none() -> Self {
        Self {
            id: Value::Null,
            name: NONE_OPTION_LABEL.to_string(),
        }
    }

    /// Build an option out of a `rowsGet` row. Backends either alias the display column to
    /// `name` or return it under its own name; fall back to the id when neither is there.
    pub fn from_row(row: &Record, display_column: &str) -> Self {
        let id = row.get(ID_COLUMN).cloned().unwrap_or(Value::Null);
        let name = row
            .get("name")
            .or_else(|| row.get(display_column))
            .map(value_to_string)
            .unwrap_or_else(|| value_to_string(&id));

        Self { id, name }
    }

    /// Stable string key used by select controls (`null` for the sentinel)
    pub fn key(&self) -> String {
        value_key(&self.id)
    }
}

/// Backend-declared custom operation shown on an existing record
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ActionButton {
    pub id: Value,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Render a JSON value the way a text control would show it
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a JSON value as a select key
pub fn value_key(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JavaScript-style truthiness, with the string forms backends use for false flags
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !matches!(s.as_str(), "" | "0" | "false"),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a boolean-like flag")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> {
            Ok(v != 0.0)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            Ok(is_truthy(&Value::String(v.to_string())))
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_none<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<bool, D::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}
