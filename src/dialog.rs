//! The "create record" dialog: a create-mode [`RecordForm`] mounted on demand, typically to
//! create the target of a reference field without leaving the current form.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info};

use crate::context::FormContext;
use crate::form::{FormError, OnClose, RecordForm, RecordFormProps, Result, SubmitOutcome};
use crate::schema::Record;

pub const DEFAULT_HEADER: &str = "Create Record";

#[derive(Debug, Clone, PartialEq)]
pub struct CreateRecordProps {
    pub db: String,
    pub table: String,
    pub where_: Vec<Record>,
    pub close_on_create: bool,
    pub header: String,
    pub disabled: bool,
}

impl CreateRecordProps {
    pub fn new(db: &str, table: &str) -> Self {
        Self {
            db: db.to_string(),
            table: table.to_string(),
            where_: vec![],
            close_on_create: false,
            header: DEFAULT_HEADER.to_string(),
            disabled: false,
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

    pub fn with_header(mut self, header: &str) -> Self {
        self.header = header.to_string();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

pub struct CreateRecordDialog {
    ctx: FormContext,
    props: CreateRecordProps,
    on_close: Arc<Mutex<Option<OnClose>>>,
    form: Option<RecordForm>,
}

impl std::fmt::Debug for CreateRecordDialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateRecordDialog")
            .field("props", &self.props)
            .field("form", &self.form)
            .finish()
    }
}

impl CreateRecordDialog {
    pub fn new(ctx: FormContext, props: CreateRecordProps) -> Self {
        Self {
            ctx,
            props,
            on_close: Arc::new(Mutex::new(None)),
            form: None,
        }
    }

    /// Receives the created id once a submit succeeds, or `None` when the dialog is cancelled
    pub fn with_on_close(self, on_close: OnClose) -> Self {
        *self.on_close.lock() = Some(on_close);
        self
    }

    pub fn props(&self) -> &CreateRecordProps {
        &self.props
    }

    pub fn header(&self) -> &str {
        &self.props.header
    }

    pub fn is_open(&self) -> bool {
        self.form.is_some()
    }

    pub fn form(&self) -> Option<&RecordForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut RecordForm> {
        self.form.as_mut()
    }

    /// Mount and load a fresh form. Returns `false` without doing anything when the dialog
    /// is disabled or already open. A form that fails to load is not mounted, so `open` can
    /// simply be retried.
    pub async fn open(&mut self) -> Result<bool> {
        if self.props.disabled || self.form.is_some() {
            debug!(
                "Not opening the {}.{} dialog (disabled: {}, open: {})",
                self.props.db,
                self.props.table,
                self.props.disabled,
                self.is_open()
            );
            return Ok(false);
        }

        let relay = self.on_close.clone();
        let props = RecordFormProps::create(&self.props.db, &self.props.table)
            .with_where(self.props.where_.clone())
            .close_on_create(self.props.close_on_create);
        let mut form = RecordForm::new(self.ctx.clone(), props).with_on_close(Box::new(
            move |id: Option<Value>| {
                if let Some(on_close) = relay.lock().as_mut() {
                    on_close(id);
                }
            },
        ));

        form.load().await?;
        self.form = Some(form);
        Ok(true)
    }

    /// Submit the mounted form. The dialog closes once the record exists; on failure it
    /// stays open with the error shown in the form.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        let form = self.form.as_mut().ok_or(FormError::NotLoaded)?;
        let outcome = form.submit().await?;

        info!("Closing the {} dialog after {outcome:?}", self.props.header);
        self.form = None;
        Ok(outcome)
    }

    pub fn cancel(&mut self) {
        if let Some(mut form) = self.form.take() {
            form.cancel();
        }
    }
}
