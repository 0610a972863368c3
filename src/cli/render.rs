//! Plain-text drawing of a [`FormView`] for the terminal.

use itertools::Itertools;

use crate::fields::{Control, Select};
use crate::form::view::{FieldView, Footer, FormLayout, FormView};

const LABEL_WIDTH: usize = 20;

fn render_select(select: &Select) -> String {
    let selected = select
        .selected
        .as_ref()
        .and_then(|key| select.options.iter().find(|o| &o.key() == key))
        .map(|o| o.name.clone())
        .unwrap_or_else(|| format!("<{}>", select.placeholder));

    let mut out = vec![format!("[{selected}]")];
    if select.filterable {
        out.push("(searchable)".to_string());
    }
    if let Some(ref path) = select.view_related {
        out.push(format!("-> {path}"));
    }
    if select.create_related.is_some() {
        out.push("(+ \\related)".to_string());
    }

    let options = select
        .options
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{i}) {}", o.name))
        .join("  ");
    if !options.is_empty() {
        out.push(format!("\n{:LABEL_WIDTH$}  {options}", ""));
    }

    out.join(" ")
}

pub fn render_control(control: &Control) -> String {
    match control {
        Control::Checkbox { checked: true } => "[x]".to_string(),
        Control::Checkbox { checked: false } => "[ ]".to_string(),
        Control::TextInput { value } => format!("[{value}]"),
        Control::DateTimeInput { value } => format!("[{value}] (date/time)"),
        Control::Select(select) => render_select(select),
        Control::Static(text) => text.clone(),
        Control::Loading => "Loading...".to_string(),
    }
}

fn render_field(field: &FieldView) -> String {
    let mut line = format!(
        "{:LABEL_WIDTH$}  {}",
        field.label,
        render_control(&field.control)
    );
    if let Some(ref help) = field.help_text {
        line.push_str(&format!("  ({help})"));
    }
    line
}

fn render_footer(footer: &Footer) -> String {
    match footer {
        Footer::CreateCancel => "[Create] [Cancel]".to_string(),
        Footer::Actions(actions) => actions
            .iter()
            .map(|a| {
                format!(
                    "[{}]",
                    a.label
                        .clone()
                        .unwrap_or_else(|| crate::schema::value_to_string(&a.id))
                )
            })
            .join(" "),
    }
}

fn render_layout(layout: &FormLayout) -> String {
    let mut lines = vec![];
    if let Some(ref header) = layout.header {
        lines.push(header.clone());
        lines.push("=".repeat(header.len()));
    }
    lines.extend(layout.fields.iter().map(render_field));
    lines.push(render_footer(&layout.footer));
    if let Some(ref error) = layout.error {
        lines.push(format!("Error: {error}"));
    }
    lines.join("\n")
}

pub fn render_view(view: &FormView) -> String {
    match view {
        FormView::Loading => "Loading...".to_string(),
        FormView::Ready(layout) => render_layout(layout),
        FormView::Closed => "Closed, \\q to quit".to_string(),
    }
}
