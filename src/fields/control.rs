//! What the field widgets render to: plain values that a UI layer draws and feeds user
//! gestures back from.

use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::nav::RecordPath;
use crate::schema::DropdownOption;

/// Interactive (or static) control for one field of the record form
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Checkbox { checked: bool },
    TextInput { value: String },
    DateTimeInput { value: String },
    Select(Select),
    /// Non-interactive text
    Static(String),
    /// Placeholder shown while the data the control needs is being fetched
    Loading,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub options: Vec<DropdownOption>,
    /// Key (see [`DropdownOption::key`]) of the selected option
    pub selected: Option<String>,
    pub placeholder: String,
    /// Long option lists get a search box
    pub filterable: bool,
    pub view_related: Option<RecordPath>,
    pub create_related: Option<CreateRelated>,
}

/// Inline "create related record" action offered by reference fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRelated {
    pub db: String,
    pub table: String,
    pub header: String,
    pub close_on_create: bool,
}

/// A user gesture on a control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    Check(bool),
    Text(String),
    /// Pick an option by key
    Choose(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
pub enum FilterOperator {
    #[strum(serialize = "equals")]
    Equals,
    #[strum(serialize = "contains")]
    Contains,
    #[strum(serialize = "dateIs")]
    DateIs,
}

/// Emitted by a column filter: `(column_id, value, operator)`
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChange {
    pub column_id: String,
    pub value: Value,
    pub operator: FilterOperator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChoice {
    pub label: String,
    pub value: String,
}

impl FilterChoice {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// Control rendered in a list view's column header
#[derive(Debug, Clone, PartialEq)]
pub enum FilterControl {
    Dropdown {
        choices: Vec<FilterChoice>,
        selected: String,
    },
    TextInput {
        value: String,
    },
    DateInput {
        value: String,
    },
    Select {
        options: Vec<DropdownOption>,
        selected: Option<String>,
    },
}

/// Static flags a grid reads off a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterFlags {
    pub show_filter_menu: bool,
    pub show_clear_button: bool,
}

impl Default for FilterFlags {
    fn default() -> Self {
        Self {
            show_filter_menu: true,
            show_clear_button: true,
        }
    }
}
