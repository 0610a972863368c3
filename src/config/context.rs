use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::backend::memory::MemoryBackend;
use crate::backend::{Backend, BackendClient, BackendError, Result};
use crate::context::FormContext;
use crate::nav::Navigator;

#[cfg(feature = "backend-http")]
use crate::backend::http::HttpBackend;

use super::schema;

fn build_memory_backend(cfg: &schema::Memory) -> Result<MemoryBackend> {
    let Some(ref path) = cfg.fixture else {
        return Ok(MemoryBackend::new());
    };

    info!("Loading the in-memory backend from {path}");
    let contents = std::fs::read_to_string(path).map_err(|e| BackendError::Generic {
        reason: format!("Error reading fixture {path:?}: {e}"),
    })?;
    MemoryBackend::from_fixture(serde_json::from_str(&contents)?)
}

pub fn build_backend(cfg: &schema::RecordformConfig) -> Result<Arc<dyn Backend>> {
    let backend: Arc<dyn Backend> = match &cfg.backend {
        #[cfg(feature = "backend-http")]
        schema::Backend::Http(schema::Http { url, user_agent }) => {
            info!("Using the HTTP backend at {url}");
            Arc::new(HttpBackend::try_new(url, user_agent.clone())?)
        }
        schema::Backend::Memory(memory) => Arc::new(build_memory_backend(memory)?),
    };

    Ok(backend)
}

pub fn build_context(
    cfg: &schema::RecordformConfig,
    navigator: Arc<dyn Navigator>,
) -> Result<FormContext> {
    let client = BackendClient::new_with_cache(
        build_backend(cfg)?,
        cfg.cache.schema_capacity,
        Duration::from_secs(cfg.cache.schema_ttl_secs),
    );

    Ok(FormContext::new(client, navigator).with_datetime(cfg.datetime.format()))
}
