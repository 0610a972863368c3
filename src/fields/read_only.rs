use serde_json::Value;
use tracing::debug;

use super::{
    Control, FieldKind, FieldProps, FieldWidget, FilterChange, FilterControl, FilterOperator,
    UserInput,
};
use crate::schema::value_to_string;

/// Non-editable rendering used for any column flagged `readOnly`
#[derive(Debug)]
pub struct ReadOnlyField;

impl FieldWidget for ReadOnlyField {
    fn kind(&self) -> FieldKind {
        FieldKind::ReadOnly
    }

    fn edit(&self, props: &FieldProps<'_>) -> Control {
        Control::Static(value_to_string(props.value))
    }

    fn read(&self, props: &FieldProps<'_>) -> String {
        value_to_string(props.value)
    }

    fn filter(&self, props: &FieldProps<'_>) -> FilterControl {
        FilterControl::TextInput {
            value: value_to_string(props.value),
        }
    }

    fn input(
        &self,
        props: &FieldProps<'_>,
        input: UserInput,
        _handle_change: &mut dyn FnMut(&str, Value),
    ) {
        debug!("Read-only field {} ignores {input:?}", props.column_id);
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
                operator: FilterOperator::Contains,
            });
        }
    }
}
