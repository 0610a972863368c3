//! Which schema columns get a field on the record form.
//!
//! The rules are evaluated in [`RULES`] order and the first one that applies hides the column.

use strum_macros::Display;

use crate::schema::{ColumnSettings, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum HiddenReason {
    /// Declared for a different table than the one being edited (joined-in columns)
    OtherTable,
    PrimaryKey,
    Hidden,
    HiddenRecord,
    HiddenOnCreate,
    HiddenOnUpdate,
    /// Create mode, and the caller already fixed the value through a `where` prefill
    SuppliedByWhere,
}

#[derive(Debug, Clone, Copy)]
pub struct VisibilityContext<'a> {
    pub table: &'a str,
    pub creating: bool,
    pub where_: &'a [Record],
}

type Rule = fn(&str, &ColumnSettings, &VisibilityContext<'_>) -> bool;

fn other_table(_: &str, settings: &ColumnSettings, ctx: &VisibilityContext<'_>) -> bool {
    // Columns without a declared table belong to the edited one
    matches!(settings.table.as_deref(), Some(table) if table != ctx.table)
}

fn primary_key(_: &str, settings: &ColumnSettings, _: &VisibilityContext<'_>) -> bool {
    settings.primary_key
}

fn hidden(_: &str, settings: &ColumnSettings, _: &VisibilityContext<'_>) -> bool {
    settings.hidden
}

fn hidden_record(_: &str, settings: &ColumnSettings, _: &VisibilityContext<'_>) -> bool {
    settings.hidden_record
}

fn hidden_on_create(_: &str, settings: &ColumnSettings, ctx: &VisibilityContext<'_>) -> bool {
    settings.hidden_create && ctx.creating
}

fn hidden_on_update(_: &str, settings: &ColumnSettings, ctx: &VisibilityContext<'_>) -> bool {
    settings.hidden_update && !ctx.creating
}

fn supplied_by_where(column_id: &str, _: &ColumnSettings, ctx: &VisibilityContext<'_>) -> bool {
    ctx.creating && supplied_by(ctx.where_, column_id)
}

pub const RULES: &[(HiddenReason, Rule)] = &[
    (HiddenReason::OtherTable, other_table),
    (HiddenReason::PrimaryKey, primary_key),
    (HiddenReason::Hidden, hidden),
    (HiddenReason::HiddenRecord, hidden_record),
    (HiddenReason::HiddenOnCreate, hidden_on_create),
    (HiddenReason::HiddenOnUpdate, hidden_on_update),
    (HiddenReason::SuppliedByWhere, supplied_by_where),
];

/// Whether any of the `where` prefills sets `column_id`
pub fn supplied_by(where_: &[Record], column_id: &str) -> bool {
    where_.iter().any(|clause| clause.contains_key(column_id))
}

pub fn hidden_reason(
    column_id: &str,
    settings: &ColumnSettings,
    ctx: &VisibilityContext<'_>,
) -> Option<HiddenReason> {
    RULES
        .iter()
        .find(|(_, applies)| applies(column_id, settings, ctx))
        .map(|(reason, _)| *reason)
}

pub fn is_visible(column_id: &str, settings: &ColumnSettings, ctx: &VisibilityContext<'_>) -> bool {
    hidden_reason(column_id, settings, ctx).is_none()
}
