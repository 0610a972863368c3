use serde_json::Value;
use tracing::debug;

use super::{
    Control, CreateRelated, FieldKind, FieldProps, FieldWidget, FilterChange, FilterControl,
    FilterOperator, OptionSlot, Select, UserInput,
};
use crate::nav::RecordPath;
use crate::schema::{is_truthy, value_key, value_to_string, DropdownOption};

pub const CREATE_RELATED_HEADER: &str = "Create Related Record";

/// Option lists longer than this get a search box
pub const FILTERABLE_THRESHOLD: usize = 10;

/// Foreign-key dropdown over the rows of the joined table
#[derive(Debug)]
pub struct ReferenceField;

fn selected_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(value_key(other)),
    }
}

fn find_option<'a>(options: &'a [DropdownOption], key: &str) -> Option<&'a DropdownOption> {
    options.iter().find(|o| o.key() == key)
}

impl FieldWidget for ReferenceField {
    fn kind(&self) -> FieldKind {
        FieldKind::Reference
    }

    fn edit(&self, props: &FieldProps<'_>) -> Control {
        let options = match props.options {
            None | Some(OptionSlot::Pending) => return Control::Loading,
            Some(slot) => slot.options().to_vec(),
        };

        let settings = props.settings;
        let join = settings.join_target();

        let view_related = match (join, props.value) {
            (Some((db, table)), value) if is_truthy(value) => {
                Some(RecordPath::new(db, table, value))
            }
            _ => None,
        };

        let create_related = match join {
            Some((db, table)) if settings.reference_create => Some(CreateRelated {
                db: db.to_string(),
                table: table.to_string(),
                header: CREATE_RELATED_HEADER.to_string(),
                close_on_create: true,
            }),
            _ => None,
        };

        Control::Select(Select {
            filterable: options.len() > FILTERABLE_THRESHOLD,
            options,
            selected: selected_key(props.value),
            placeholder: settings.display_column().to_string(),
            view_related,
            create_related,
        })
    }

    fn read(&self, props: &FieldProps<'_>) -> String {
        let options = props.options.map(OptionSlot::options).unwrap_or_default();
        selected_key(props.value)
            .and_then(|key| find_option(options, &key))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| value_to_string(props.value))
    }

    fn filter(&self, props: &FieldProps<'_>) -> FilterControl {
        FilterControl::Select {
            options: props
                .options
                .map(|slot| slot.options().to_vec())
                .unwrap_or_default(),
            selected: selected_key(props.value),
        }
    }

    fn input(
        &self,
        props: &FieldProps<'_>,
        input: UserInput,
        handle_change: &mut dyn FnMut(&str, Value),
    ) {
        let key = match input {
            UserInput::Choose(key) => key,
            other => {
                debug!("Reference field {} ignores {other:?}", props.column_id);
                return;
            }
        };

        let options = props.options.map(OptionSlot::options).unwrap_or_default();
        match find_option(options, &key) {
            Some(option) => handle_change(props.column_id, option.id.clone()),
            None => debug!("{key:?} is not an option of {}", props.column_id),
        }
    }

    fn filter_input(
        &self,
        props: &FieldProps<'_>,
        input: UserInput,
        on_filter_change: &mut dyn FnMut(FilterChange),
    ) {
        let UserInput::Choose(key) = input else {
            return;
        };

        let options = props.options.map(OptionSlot::options).unwrap_or_default();
        if let Some(option) = find_option(options, &key) {
            on_filter_change(FilterChange {
                column_id: props.column_id.to_string(),
                value: option.id.clone(),
                operator: FilterOperator::Equals,
            });
        }
    }
}
