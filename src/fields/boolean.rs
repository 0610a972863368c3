use serde_json::{json, Value};
use tracing::debug;

use super::{
    Control, FieldKind, FieldProps, FieldWidget, FilterChange, FilterChoice, FilterControl,
    FilterFlags, FilterOperator, UserInput,
};
use crate::schema::{is_truthy, value_to_string};

/// Checkbox. Any truthy stored value (`true`, `1`, `"1"`) reads as checked; edits are
/// always reported as `1`/`0`.
#[derive(Debug)]
pub struct BooleanField;

impl FieldWidget for BooleanField {
    fn kind(&self) -> FieldKind {
        FieldKind::Boolean
    }

    fn edit(&self, props: &FieldProps<'_>) -> Control {
        Control::Checkbox {
            checked: is_truthy(props.value),
        }
    }

    fn read(&self, props: &FieldProps<'_>) -> String {
        let answer = if is_truthy(props.value) { "Yes" } else { "No" };
        answer.to_string()
    }

    fn filter(&self, props: &FieldProps<'_>) -> FilterControl {
        FilterControl::Dropdown {
            choices: vec![
                FilterChoice::new("All", ""),
                FilterChoice::new("Yes", "1"),
                FilterChoice::new("No", "0"),
            ],
            selected: value_to_string(props.value),
        }
    }

    fn filter_flags(&self) -> FilterFlags {
        FilterFlags {
            show_filter_menu: false,
            show_clear_button: false,
        }
    }

    fn input(
        &self,
        props: &FieldProps<'_>,
        input: UserInput,
        handle_change: &mut dyn FnMut(&str, Value),
    ) {
        match input {
            UserInput::Check(checked) => {
                handle_change(props.column_id, json!(if checked { 1 } else { 0 }))
            }
            other => debug!("Checkbox {} ignores {other:?}", props.column_id),
        }
    }

    fn filter_input(
        &self,
        props: &FieldProps<'_>,
        input: UserInput,
        on_filter_change: &mut dyn FnMut(FilterChange),
    ) {
        let value = match input {
            UserInput::Choose(value) => value,
            UserInput::Check(true) => "1".to_string(),
            UserInput::Check(false) => "0".to_string(),
            UserInput::Text(_) => return,
        };

        on_filter_change(FilterChange {
            column_id: props.column_id.to_string(),
            value: Value::String(value),
            operator: FilterOperator::Equals,
        });
    }
}
