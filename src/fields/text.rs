use serde_json::Value;
use tracing::debug;

use super::{
    Control, FieldKind, FieldProps, FieldWidget, FilterChange, FilterControl, FilterOperator,
    UserInput,
};
use crate::schema::value_to_string;

/// Plain text box, also the fallback for unknown field types
#[derive(Debug)]
pub struct InputTextField;

impl FieldWidget for InputTextField {
    fn kind(&self) -> FieldKind {
        FieldKind::InputText
    }

    fn edit(&self, props: &FieldProps<'_>) -> Control {
        Control::TextInput {
            value: value_to_string(props.value),
        }
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
        handle_change: &mut dyn FnMut(&str, Value),
    ) {
        match input {
            UserInput::Text(text) => handle_change(props.column_id, Value::String(text)),
            other => debug!("Text field {} ignores {other:?}", props.column_id),
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
                operator: FilterOperator::Contains,
            });
        }
    }
}
