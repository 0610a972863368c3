//! Field widgets and the registry the record form dispatches through.
//!
//! Every column renders through exactly one [`FieldWidget`], picked by [`FieldRegistry::resolve`]
//! from the column's settings:
//!
//! 1. the declared `fieldType` tag, parsed into a [`FieldKind`] (a datetime column without a
//!    tag gets [`FieldKind::DateTime`])
//! 2. a joined column is always [`FieldKind::Reference`]
//! 3. a kind with no registered widget falls back to [`FieldKind::InputText`]
//! 4. a read-only column is always [`FieldKind::ReadOnly`]

use std::collections::HashMap;
use std::fmt::Debug;

use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::schema::ColumnSettings;

pub mod boolean;
pub mod control;
pub mod datetime;
pub mod options;
pub mod read_only;
pub mod reference;
pub mod text;

pub use control::{
    Control, CreateRelated, FilterChange, FilterChoice, FilterControl, FilterFlags,
    FilterOperator, Select, UserInput,
};
pub use options::{OptionSlot, OptionStore};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
pub enum FieldKind {
    #[strum(serialize = "boolean")]
    Boolean,
    #[strum(serialize = "reference")]
    Reference,
    #[strum(serialize = "inputtext")]
    InputText,
    #[strum(serialize = "readOnly")]
    ReadOnly,
    #[strum(serialize = "datetime")]
    DateTime,
}

/// Everything a widget gets to render one column
#[derive(Debug, Clone, Copy)]
pub struct FieldProps<'a> {
    pub column_id: &'a str,
    pub settings: &'a ColumnSettings,
    /// `Null` when the form has no value for the column
    pub value: &'a Value,
    /// Option set of reference columns, `None` until a fetch has been started
    pub options: Option<&'a OptionSlot>,
}

impl<'a> FieldProps<'a> {
    pub fn new(column_id: &'a str, settings: &'a ColumnSettings, value: &'a Value) -> Self {
        Self {
            column_id,
            settings,
            value,
            options: None,
        }
    }

    pub fn with_options(mut self, options: Option<&'a OptionSlot>) -> Self {
        self.options = options;
        self
    }
}

/// Rendering capabilities shared by every field kind.
///
/// `edit`, `read` and `filter` are pure functions of their props. User gestures come back in
/// through `input`/`filter_input`, which report the resulting value through the callback and
/// keep no state of their own.
pub trait FieldWidget: Send + Sync + Debug {
    fn kind(&self) -> FieldKind;

    fn edit(&self, props: &FieldProps<'_>) -> Control;

    fn read(&self, props: &FieldProps<'_>) -> String;

    fn filter(&self, props: &FieldProps<'_>) -> FilterControl;

    fn filter_flags(&self) -> FilterFlags {
        FilterFlags::default()
    }

    /// Translate a gesture on the `edit` control into `handle_change(column_id, value)`
    fn input(
        &self,
        props: &FieldProps<'_>,
        input: UserInput,
        handle_change: &mut dyn FnMut(&str, Value),
    );

    /// Translate a gesture on the `filter` control into a filter change
    fn filter_input(
        &self,
        props: &FieldProps<'_>,
        input: UserInput,
        on_filter_change: &mut dyn FnMut(FilterChange),
    );
}

#[derive(Debug, Default)]
pub struct FieldRegistry {
    widgets: HashMap<FieldKind, Box<dyn FieldWidget>>,
}

impl FieldRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with a widget for every [`FieldKind`]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(boolean::BooleanField));
        registry.register(Box::new(reference::ReferenceField));
        registry.register(Box::new(text::InputTextField));
        registry.register(Box::new(read_only::ReadOnlyField));
        registry.register(Box::new(datetime::DateTimeField));
        registry
    }

    pub fn register(&mut self, widget: Box<dyn FieldWidget>) {
        self.widgets.insert(widget.kind(), widget);
    }

    pub fn contains(&self, kind: FieldKind) -> bool {
        self.widgets.contains_key(&kind)
    }

    pub fn resolve(&self, settings: &ColumnSettings) -> FieldKind {
        let declared = match settings.field_type.as_deref() {
            Some(tag) => tag.parse::<FieldKind>().ok(),
            None if settings.is_datetime() => Some(FieldKind::DateTime),
            None => None,
        };

        let kind = if settings.is_join() {
            FieldKind::Reference
        } else {
            declared
                .filter(|kind| self.contains(*kind))
                .unwrap_or(FieldKind::InputText)
        };

        if settings.read_only {
            FieldKind::ReadOnly
        } else {
            kind
        }
    }

    /// The widget for `kind`. A registry missing one of the fallback kinds is a bug in
    /// whoever built it, so this panics rather than returning an error.
    pub fn widget(&self, kind: FieldKind) -> &dyn FieldWidget {
        self.widgets
            .get(&kind)
            .map(|w| w.as_ref())
            .unwrap_or_else(|| panic!("No widget registered for field kind {kind}"))
    }

    pub fn widget_for(&self, settings: &ColumnSettings) -> &dyn FieldWidget {
        self.widget(self.resolve(settings))
    }
}
