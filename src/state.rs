use std::sync::Arc;

use crate::backend::{Backend, HttpBackend};
use crate::config::{ClientConfig, PageContext};
use crate::error::GateError;
use crate::handlers::{ChatFlow, ExecutionFlow};
use crate::rate_limit::RateLimiter;
use crate::surface::OutputSurface;
use crate::validator::CodeValidator;

// One "page load": owns the backend, the rate limit ledger and the flows.
// Lives until the process exits, nothing to tear down.
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub page: PageContext,
    pub execution: ExecutionFlow,
    pub chat: ChatFlow,
}

impl AppState {
    pub fn new(config: &ClientConfig) -> Result<Self, GateError> {
        let backend = HttpBackend::new(&config.base_url, &config.page)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    pub fn with_backend(config: &ClientConfig, backend: Arc<dyn Backend>) -> Self {
        let execution = ExecutionFlow::new(
            Arc::clone(&backend),
            CodeValidator::with_max_len(config.max_code_len),
            RateLimiter::new(config.rate_limit, config.rate_window),
            config.exec_timeout,
        );
        let chat = ChatFlow::new(Arc::clone(&backend));

        Self {
            backend,
            page: config.page.clone(),
            execution,
            chat,
        }
    }

    pub fn identifier(&self) -> &str {
        self.page.identifier()
    }

    pub async fn run_code(
        &self,
        code: &str,
        surface: &mut dyn OutputSurface,
    ) -> Result<String, GateError> {
        self.execution
            .submit(self.page.identifier(), code, surface)
            .await
    }
}
