use std::sync::Arc;

use crate::backend::BackendClient;
use crate::datetime::DateTimeFormat;
use crate::fields::FieldRegistry;
use crate::nav::Navigator;

/// Collaborators every form and dialog needs, handed down explicitly at construction
#[derive(Debug, Clone)]
pub struct FormContext {
    pub client: BackendClient,
    pub registry: Arc<FieldRegistry>,
    pub navigator: Arc<dyn Navigator>,
    pub datetime: DateTimeFormat,
}

impl FormContext {
    pub fn new(client: BackendClient, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client,
            registry: Arc::new(FieldRegistry::standard()),
            navigator,
            datetime: DateTimeFormat::default(),
        }
    }

    pub fn with_registry(mut self, registry: FieldRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_datetime(mut self, datetime: DateTimeFormat) -> Self {
        self.datetime = datetime;
        self
    }
}
