//! Dropdown option sets for reference columns.
//!
//! Options are fetched from the joined table with `rowsGet`. Fetches for the same column can
//! overlap (the column's value changes, or a related record gets created, while an earlier
//! fetch is still in flight), so every fetch is stamped with a [`Ticket`] and only the latest
//! one may store its result.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::backend::{BackendClient, BackendError, Result};
use crate::fetch::{Generation, Ticket};
use crate::schema::{ColumnSettings, DropdownOption, ID_COLUMN};

#[derive(Debug, Clone, PartialEq)]
pub enum OptionSlot {
    Pending,
    Loaded(Vec<DropdownOption>),
    /// The fetch failed; renders as an empty dropdown
    Failed,
}

impl OptionSlot {
    pub fn options(&self) -> &[DropdownOption] {
        match self {
            OptionSlot::Loaded(options) => options,
            OptionSlot::Pending | OptionSlot::Failed => &[],
        }
    }
}

#[derive(Debug)]
struct Entry {
    generation: Generation,
    slot: OptionSlot,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            generation: Generation::new(),
            slot: OptionSlot::Pending,
        }
    }
}

/// Option slots of one form, keyed by column id. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct OptionStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

/// Fetch the option set for a reference column, with the "None" sentinel appended
pub async fn load_options(
    client: &BackendClient,
    settings: &ColumnSettings,
    value: &Value,
) -> Result<Vec<DropdownOption>> {
    let (db, table) = settings.join_target().ok_or_else(|| BackendError::Generic {
        reason: "Column has no joined table to fetch options from".to_string(),
    })?;
    let display_column = settings.display_column();

    let rows = client
        .rows_get(
            db,
            table,
            &[ID_COLUMN, display_column],
            settings.query_modifier.as_ref(),
            json!({ "settings": settings, "value": value }),
        )
        .await?;

    let mut options: Vec<DropdownOption> = rows
        .iter()
        .map(|row| DropdownOption::from_row(row, display_column))
        .collect();
    options.push(DropdownOption::none());

    Ok(options)
}

impl OptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, column_id: &str) -> Option<OptionSlot> {
        self.entries.lock().get(column_id).map(|e| e.slot.clone())
    }

    /// Current slots of every column a fetch was started for
    pub fn snapshot(&self) -> HashMap<String, OptionSlot> {
        self.entries
            .lock()
            .iter()
            .map(|(column_id, entry)| (column_id.clone(), entry.slot.clone()))
            .collect()
    }

    /// Start a fetch for `column_id`. Options loaded by an earlier fetch stay visible until
    /// this one completes.
    pub fn begin(&self, column_id: &str) -> Ticket {
        let mut entries = self.entries.lock();
        let entry = entries.entry(column_id.to_string()).or_default();
        if entry.slot == OptionSlot::Failed {
            entry.slot = OptionSlot::Pending;
        }
        entry.generation.begin()
    }

    /// Store the outcome of the fetch holding `ticket`, unless a newer fetch has started since.
    /// Returns whether the result was kept.
    pub fn complete(
        &self,
        column_id: &str,
        ticket: Ticket,
        result: Result<Vec<DropdownOption>>,
    ) -> bool {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(column_id) else {
            return false;
        };

        if !entry.generation.is_current(ticket) {
            debug!(
                "Discarding stale options for {column_id} (fetch {})",
                ticket.value()
            );
            return false;
        }

        entry.slot = match result {
            Ok(options) => OptionSlot::Loaded(options),
            Err(e) => {
                warn!("Error fetching dropdown options for {column_id}: {e}");
                OptionSlot::Failed
            }
        };
        true
    }

    /// Fetch and store the options for a reference column
    pub async fn refresh(
        &self,
        client: &BackendClient,
        column_id: &str,
        settings: &ColumnSettings,
        value: &Value,
    ) -> bool {
        let ticket = self.begin(column_id);
        let result = load_options(client, settings, value).await;
        self.complete(column_id, ticket, result)
    }
}
