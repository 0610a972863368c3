//! The record form: one screen for creating a new record or viewing an existing one.
//!
//! A [`RecordForm`] is mounted in a fixed [`FormMode`]. [`RecordForm::load`] fetches the table
//! schema (plus, for an existing record, the record and its action buttons) and the option
//! sets of its reference fields. After that the form is driven by user input
//! ([`RecordForm::input`]/[`RecordForm::handle_change`]) and drawn with [`RecordForm::render`].

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::backend::BackendError;
use crate::context::FormContext;
use crate::datetime::DateTimeError;
use crate::fetch::{Generation, Reload, Ticket};
use crate::fields::{FieldProps, OptionStore, UserInput};
use crate::nav::RecordPath;
use crate::schema::{ActionButton, ColumnSettings, Record, TableSchema};

pub mod view;
pub mod visibility;

use view::{FieldView, Footer, FormLayout, FormView};
use visibility::{is_visible, supplied_by, VisibilityContext};

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("{column}: {source}")]
    InvalidDateTime {
        column: String,
        #[source]
        source: DateTimeError,
    },

    #[error("The form hasn't finished loading")]
    NotLoaded,

    #[error("Only new records can be submitted")]
    NotCreateMode,

    #[error("Unknown column {column:?}")]
    UnknownColumn { column: String },

    #[error("The backend didn't return the id of the created record")]
    MissingCreatedId,

    #[error("The form was closed")]
    Closed,
}

pub type Result<T, E = FormError> = std::result::Result<T, E>;

/// Called with the created id after a successful submit, or `None` on cancel
pub type OnClose = Box<dyn FnMut(Option<Value>) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordFormProps {
    pub db: String,
    pub table: String,
    pub record_id: Option<Value>,
    /// Close instead of navigating to the new record after a create
    pub close_on_create: bool,
    /// Prefilled values of a new record; their columns get no field
    pub where_: Vec<Record>,
    pub reload: Reload,
}

impl RecordFormProps {
    pub fn create(db: &str, table: &str) -> Self {
        Self {
            db: db.to_string(),
            table: table.to_string(),
            record_id: None,
            close_on_create: false,
            where_: vec![],
            reload: Reload::default(),
        }
    }

    pub fn edit(db: &str, table: &str, record_id: Value) -> Self {
        Self {
            record_id: Some(record_id),
            ..Self::create(db, table)
        }
    }

    pub fn with_where(mut self, where_: Vec<Record>) -> Self {
        self.where_ = where_;
        self
    }

    pub fn close_on_create(mut self, close_on_create: bool) -> Self {
        self.close_on_create = close_on_create;
        self
    }

    pub fn mode(&self) -> FormMode {
        match self.record_id {
            Some(ref id) if !id.is_null() => FormMode::Edit,
            _ => FormMode::Create,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The caller asked to close on create; `on_close` got the id
    Closed(Value),
    Navigated(RecordPath),
}

/// Result of a record fetch started by [`RecordForm::begin_record_fetch`]
#[derive(Debug)]
pub struct RecordFetch {
    ticket: Ticket,
    result: Result<Record, BackendError>,
}

pub struct RecordForm {
    ctx: FormContext,
    props: RecordFormProps,
    mode: FormMode,
    on_close: Option<OnClose>,
    schema: Option<Arc<TableSchema>>,
    actions: Vec<ActionButton>,
    form_data: Record,
    options: OptionStore,
    record_generation: Generation,
    record_loaded: bool,
    error: Option<String>,
    // Set by a successful submit or a cancel; the form state is gone after that
    closed: bool,
}

impl Debug for RecordForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordForm")
            .field("props", &self.props)
            .field("mode", &self.mode)
            .field("loaded", &self.is_loaded())
            .field("form_data", &self.form_data)
            .field("error", &self.error)
            .field("closed", &self.closed)
            .finish()
    }
}

impl RecordForm {
    pub fn new(ctx: FormContext, props: RecordFormProps) -> Self {
        let mode = props.mode();

        let mut form_data = Record::new();
        if mode == FormMode::Create {
            for clause in &props.where_ {
                form_data.extend(clause.clone());
            }
        }

        Self {
            ctx,
            props,
            mode,
            on_close: None,
            schema: None,
            actions: vec![],
            form_data,
            options: OptionStore::new(),
            record_generation: Generation::new(),
            record_loaded: false,
            error: None,
            closed: false,
        }
    }

    pub fn with_on_close(mut self, on_close: OnClose) -> Self {
        self.on_close = Some(on_close);
        self
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn props(&self) -> &RecordFormProps {
        &self.props
    }

    pub fn schema(&self) -> Option<&Arc<TableSchema>> {
        self.schema.as_ref()
    }

    pub fn form_data(&self) -> &Record {
        &self.form_data
    }

    /// Current value of a column, `Null` if the form has none
    pub fn value(&self, column_id: &str) -> Value {
        self.form_data.get(column_id).cloned().unwrap_or(Value::Null)
    }

    pub fn actions(&self) -> &[ActionButton] {
        &self.actions
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn options(&self) -> &OptionStore {
        &self.options
    }

    pub fn is_loaded(&self) -> bool {
        self.schema.is_some() && (self.mode == FormMode::Create || self.record_loaded)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn loaded_schema(&self) -> Result<Arc<TableSchema>> {
        self.schema.clone().ok_or(FormError::NotLoaded)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(FormError::Closed);
        }
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
        self.form_data.clear();
        self.error = None;
    }

    /// Fetch everything the form needs to render. On failure the form stays in `Loading`.
    pub async fn load(&mut self) -> Result<()> {
        let (db, table) = (self.props.db.clone(), self.props.table.clone());

        let schema = self.ctx.client.schema_get(&db, &table).await.map_err(|e| {
            warn!("Error loading the schema of {db}.{table}: {e}");
            e
        })?;
        self.schema = Some(schema.clone());

        match self.mode {
            FormMode::Create => self.apply_defaults(&schema),
            FormMode::Edit => {
                self.actions = match self.ctx.client.actions_get(&db, &table).await {
                    Ok(actions) => actions,
                    Err(e) => {
                        warn!("Error loading the actions of {db}.{table}: {e}");
                        vec![]
                    }
                };

                if let Some(fetch) = self.begin_record_fetch() {
                    let fetch = fetch.await;
                    self.apply_record(fetch)?;
                }
            }
        }

        self.retain_schema_columns(&schema);
        self.refresh_options().await;

        Ok(())
    }

    // Defaults never override a `where` prefill
    fn apply_defaults(&mut self, schema: &TableSchema) {
        for (column_id, settings) in &schema.columns {
            let Some(default) = settings.default_value.as_ref().filter(|v| !v.is_null()) else {
                continue;
            };
            if supplied_by(&self.props.where_, column_id) {
                continue;
            }
            self.form_data.insert(column_id.clone(), default.clone());
        }
    }

    fn retain_schema_columns(&mut self, schema: &TableSchema) {
        self.form_data.retain(|column_id, _| {
            let known = schema.contains(column_id);
            if !known {
                debug!("Dropping {column_id:?}, which isn't a column of {}", schema.name);
            }
            known
        });
    }

    /// Start fetching the edited record. Only the most recently started fetch can be applied.
    /// `None` for a new record.
    pub fn begin_record_fetch(&self) -> Option<BoxFuture<'static, RecordFetch>> {
        let id = self.props.record_id.clone().filter(|id| !id.is_null())?;
        let ticket = self.record_generation.begin();
        let client = self.ctx.client.clone();
        let (db, table) = (self.props.db.clone(), self.props.table.clone());

        Some(
            async move {
                let result = client.record_get(&db, &table, &id).await;
                RecordFetch { ticket, result }
            }
            .boxed(),
        )
    }

    /// Store a fetched record as the form state, with datetime columns in display format.
    /// Returns `false` if a newer fetch was started in the meantime.
    pub fn apply_record(&mut self, fetch: RecordFetch) -> Result<bool> {
        if !self.record_generation.is_current(fetch.ticket) {
            debug!(
                "Discarding stale record of {}.{} (fetch {})",
                self.props.db,
                self.props.table,
                fetch.ticket.value()
            );
            return Ok(false);
        }

        let schema = self.loaded_schema()?;
        let mut record = fetch.result.map_err(|e| {
            warn!(
                "Error loading record {:?} of {}.{}: {e}",
                self.props.record_id, self.props.db, self.props.table
            );
            e
        })?;

        for column_id in schema.datetime_columns() {
            if let Some(value) = record.get_mut(column_id) {
                *value = self.ctx.datetime.format(value);
            }
        }

        self.form_data = record;
        self.retain_schema_columns(&schema);
        self.record_loaded = true;
        Ok(true)
    }

    /// Take a new reload counter from the caller. An existing record is fetched again when
    /// the counter moved. Returns whether fresh data was applied.
    pub async fn set_reload(&mut self, reload: Reload) -> Result<bool> {
        if reload == self.props.reload || self.closed {
            return Ok(false);
        }
        self.props.reload = reload;

        if self.schema.is_none() {
            return Ok(false);
        }
        let Some(fetch) = self.begin_record_fetch() else {
            return Ok(false);
        };

        let applied = self.apply_record(fetch.await)?;
        if applied {
            self.refresh_options().await;
        }
        Ok(applied)
    }

    /// Columns that get a field, in schema order
    pub fn visible_columns(&self) -> Vec<(&str, &ColumnSettings)> {
        let Some(schema) = self.schema.as_deref() else {
            return vec![];
        };

        let ctx = VisibilityContext {
            table: &self.props.table,
            creating: self.mode == FormMode::Create,
            where_: &self.props.where_,
        };

        schema
            .columns
            .iter()
            .map(|(column_id, settings)| (column_id.as_str(), settings))
            .filter(|(column_id, settings)| is_visible(column_id, settings, &ctx))
            .collect()
    }

    // Fetch the option sets of every visible reference field at once
    async fn refresh_options(&self) {
        let client = &self.ctx.client;
        let fetches = self
            .visible_columns()
            .into_iter()
            .filter(|(_, settings)| settings.is_join())
            .map(|(column_id, settings)| {
                let value = self.value(column_id);
                async move {
                    self.options
                        .refresh(client, column_id, settings, &value)
                        .await
                }
            });

        join_all(fetches).await;
    }

    /// Set a column's value in the form state
    pub fn handle_change(&mut self, column_id: &str, value: Value) -> Result<()> {
        self.ensure_open()?;
        let schema = self.loaded_schema()?;
        if !schema.contains(column_id) {
            return Err(FormError::UnknownColumn {
                column: column_id.to_string(),
            });
        }

        debug!("{column_id} = {value}");
        self.form_data.insert(column_id.to_string(), value);
        Ok(())
    }

    /// Feed a gesture on a field's control through its widget
    pub async fn input(&mut self, column_id: &str, input: UserInput) -> Result<()> {
        self.ensure_open()?;
        let schema = self.loaded_schema()?;
        let settings = schema
            .column(column_id)
            .ok_or_else(|| FormError::UnknownColumn {
                column: column_id.to_string(),
            })?;

        let registry = self.ctx.registry.clone();
        let slot = self.options.slot(column_id);
        let value = self.value(column_id);
        let props = FieldProps::new(column_id, settings, &value).with_options(slot.as_ref());

        let mut changes = vec![];
        registry
            .widget_for(settings)
            .input(&props, input, &mut |column, value| {
                changes.push((column.to_string(), value))
            });

        let changed = !changes.is_empty();
        for (column, value) in changes {
            self.handle_change(&column, value)?;
        }

        // The option query gets the current value as an argument
        if changed && settings.is_join() {
            let value = self.value(column_id);
            self.options
                .refresh(&self.ctx.client, column_id, settings, &value)
                .await;
        }

        Ok(())
    }

    pub fn render(&self) -> FormView {
        if self.closed {
            return FormView::Closed;
        }
        let Some(schema) = self.schema.as_deref().filter(|_| self.is_loaded()) else {
            return FormView::Loading;
        };

        let slots = self.options.snapshot();
        let fields = self
            .visible_columns()
            .into_iter()
            .map(|(column_id, settings)| {
                let value = self.value(column_id);
                let props = FieldProps::new(column_id, settings, &value)
                    .with_options(slots.get(column_id));
                let kind = self.ctx.registry.resolve(settings);

                FieldView {
                    column_id: column_id.to_string(),
                    label: settings.label(column_id).to_string(),
                    help_text: settings.help_text.clone(),
                    kind,
                    control: self.ctx.registry.widget(kind).edit(&props),
                }
            })
            .collect();

        let (header, footer) = match self.mode {
            FormMode::Create => (None, Footer::CreateCancel),
            FormMode::Edit => (
                Some(format!("Update {}", schema.name)),
                Footer::Actions(self.actions.clone()),
            ),
        };

        FormView::Ready(FormLayout {
            header,
            fields,
            footer,
            error: self.error.clone(),
        })
    }

    /// Create the record from the form state. The form is closed once the record exists.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        self.ensure_open()?;
        if self.mode != FormMode::Create {
            return Err(FormError::NotCreateMode);
        }
        let schema = self.loaded_schema()?;
        self.error = None;

        let id = match self.create_record(&schema).await {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    "Error creating a record in {}.{}: {e}",
                    self.props.db, self.props.table
                );
                self.error = Some(e.to_string());
                return Err(e);
            }
        };
        info!("Created record {id} in {}.{}", self.props.db, self.props.table);
        self.close();

        if let Some(on_close) = self.on_close.as_mut() {
            on_close(Some(id.clone()));
        }

        if self.props.close_on_create {
            return Ok(SubmitOutcome::Closed(id));
        }

        let path = RecordPath::new(&self.props.db, &self.props.table, &id);
        self.ctx.navigator.navigate(&path);
        Ok(SubmitOutcome::Navigated(path))
    }

    async fn create_record(&self, schema: &TableSchema) -> Result<Value> {
        let mut payload = self.form_data.clone();
        for column_id in schema.datetime_columns() {
            if let Some(value) = payload.get_mut(column_id) {
                *value = self.ctx.datetime.unformat(value).map_err(|source| {
                    FormError::InvalidDateTime {
                        column: column_id.to_string(),
                        source,
                    }
                })?;
            }
        }

        self.ctx
            .client
            .record_create(&self.props.db, &self.props.table, payload)
            .await
            .map_err(|e| match e {
                BackendError::MissingField { .. } => FormError::MissingCreatedId,
                e => e.into(),
            })
    }

    /// Discard the form state and tell the caller nothing was created. No-op once closed.
    pub fn cancel(&mut self) {
        if self.closed {
            return;
        }
        self.close();
        if let Some(on_close) = self.on_close.as_mut() {
            on_close(None);
        }
    }

    /// A record was created through a reference field's inline create: reload that
    /// field's options and select the new record
    pub async fn related_record_created(
        &mut self,
        column_id: &str,
        id: Option<Value>,
    ) -> Result<()> {
        self.ensure_open()?;
        let schema = self.loaded_schema()?;
        let settings = schema
            .column(column_id)
            .ok_or_else(|| FormError::UnknownColumn {
                column: column_id.to_string(),
            })?;

        let value = id.clone().unwrap_or_else(|| self.value(column_id));
        self.options
            .refresh(&self.ctx.client, column_id, settings, &value)
            .await;

        match id {
            Some(id) => self.handle_change(column_id, id),
            None => Ok(()),
        }
    }
}
