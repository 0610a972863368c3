use serde_json::Value;
use tracing::debug;

use super::{
    Control, FieldKind, FieldProps, FieldWidget, FilterChange, FilterControl, FilterOperator,
    UserInput,
};
use crate::schema::value_to_string;

/// Date/time text box. The form keeps these columns in display format; conversion to and
/// from storage format happens on load and submit (see [`crate::datetime`]).
#[derive(Debug)]
pub struct DateTimeField;

impl FieldWidget for DateTimeField {
    fn kind(&self) -> FieldKind {
        FieldKind::DateTime
    }

    fn edit(&self, props: &FieldProps<'_>) -> Control {
        Control::DateTimeInput {
            value: value_to_string(props.value),
        }
    }

    fn read(&self, props: &FieldProps<'_>) -> String {
        value_to_string(props.value)
    }

    fn filter(&self, props: &FieldProps<'_>) -> FilterControl {
        FilterControl::DateInput {
            value: value_to_string(props.value),
        }
    }

    fn input(
        &self,
        props: &FieldProps<'_>,
        input: UserInput,
        handle_change: &mut dyn FnMut(&str, Value),
    ) {
        match input {
            UserInput::Text(text) if text.trim().is_empty() => {
                handle_change(props.column_id, Value::Null)
            }
            UserInput::Text(text) => handle_change(props.column_id, Value::String(text)),
            other => debug!("Date/time field {} ignores {other:?}", props.column_id),
        }
    }

    fn filter_input(
        &self,
        props: &FieldProps<'_>,
        input: UserInput,
        on_filter_change: &mut dyn FnMut(FilterChange),
    ) {
        if let UserInput::Text(text) = input {
            on_filter_change(FilterChange {
                column_id: props.column_id.to_string(),
                value: Value::String(text),
                operator: FilterOperator::DateIs,
            });
        }
    }
}
