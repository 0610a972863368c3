use crate::fields::{Control, FieldKind};
use crate::schema::ActionButton;

#[derive(Debug, Clone, PartialEq)]
pub enum FormView {
    Loading,
    Ready(FormLayout),
    /// Submitted or cancelled
    Closed,
}

impl FormView {
    pub fn layout(&self) -> Option<&FormLayout> {
        match self {
            FormView::Loading | FormView::Closed => None,
            FormView::Ready(layout) => Some(layout),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormLayout {
    pub header: Option<String>,
    pub fields: Vec<FieldView>,
    pub footer: Footer,
    /// Inline banner for the last failed submit
    pub error: Option<String>,
}

impl FormLayout {
    pub fn field(&self, column_id: &str) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.column_id == column_id)
    }

    pub fn column_ids(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.column_id.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub column_id: String,
    pub label: String,
    pub help_text: Option<String>,
    pub kind: FieldKind,
    pub control: Control,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Footer {
    /// "Create" and "Cancel" buttons of a new record
    CreateCancel,
    /// Backend-declared action buttons of an existing record
    Actions(Vec<ActionButton>),
}
