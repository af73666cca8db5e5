use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::GateError;
use crate::metrics::{
    BLOCKED_INVALID, BLOCKED_RATE_LIMITED, EXEC_FAILURES, EXEC_LATENCY, EXEC_TIMEOUTS,
    SUBMISSIONS_TOTAL,
};
use crate::rate_limit::RateLimiter;
use crate::sanitize::sanitize;
use crate::surface::{OutputSurface, Phase};
use crate::validator::CodeValidator;

pub const RUNNING: &str = "Running...";
pub const NO_OUTPUT: &str = "No output returned.";

// Validator and sanitizer are convenience filters, not a security boundary.
pub struct ExecutionFlow {
    backend: Arc<dyn Backend>,
    validator: CodeValidator,
    limiter: RateLimiter,
    timeout: Duration,
}

impl ExecutionFlow {
    pub fn new(
        backend: Arc<dyn Backend>,
        validator: CodeValidator,
        limiter: RateLimiter,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            validator,
            limiter,
            timeout,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Run one submission to completion and leave its result on `surface`.
    ///
    /// Every error is also written to the surface as `Error: <message>`, and
    /// the surface returns to `Idle` either way.
    pub async fn submit(
        &self,
        identifier: &str,
        code: &str,
        surface: &mut dyn OutputSurface,
    ) -> Result<String, GateError> {
        SUBMISSIONS_TOTAL.inc();
        let result = self.execute(identifier, code, surface).await;

        match &result {
            Ok(text) => {
                surface.write(text);
                surface.enter(Phase::Success);
            }
            Err(e) => {
                surface.write(&format!("Error: {}", e));
                surface.enter(Phase::Failure);
            }
        }
        surface.enter(Phase::Idle);
        result
    }

    async fn execute(
        &self,
        identifier: &str,
        code: &str,
        surface: &mut dyn OutputSurface,
    ) -> Result<String, GateError> {
        surface.enter(Phase::Validating);
        if let Err(e) = self.validator.validate(code) {
            BLOCKED_INVALID.inc();
            warn!(identifier, reason = %e, "submission rejected");
            return Err(e.into());
        }

        surface.enter(Phase::RateChecking);
        if let Err(e) = self.limiter.check(identifier) {
            BLOCKED_RATE_LIMITED.inc();
            return Err(e.into());
        }

        surface.enter(Phase::Busy);
        surface.write(RUNNING);

        let response = self.call_with_timeout(code).await?;
        let text = match response.display_text() {
            Some(raw) => sanitize(raw).into_owned(),
            None => NO_OUTPUT.to_string(),
        };
        Ok(text)
    }

    async fn call_with_timeout(
        &self,
        code: &str,
    ) -> Result<crate::models::RunCodeResponse, GateError> {
        let start = Instant::now();
        let cancel = CancellationToken::new();
        let call = self.backend.run_code(code, cancel.child_token());

        let result = tokio::select! {
            result = call => result,
            _ = tokio::time::sleep(self.timeout) => {
                // release the in-flight request instead of orphaning it
                cancel.cancel();
                EXEC_TIMEOUTS.inc();
                warn!(timeout_ms = self.timeout.as_millis() as u64, "execution timed out");
                Err(GateError::Timeout)
            }
        };

        let elapsed = start.elapsed();
        EXEC_LATENCY.observe(elapsed.as_secs_f64());
        match &result {
            Ok(_) => info!(elapsed_ms = elapsed.as_millis() as u64, "execution finished"),
            Err(GateError::Timeout) => {}
            Err(e) => {
                EXEC_FAILURES.inc();
                debug!(error = %e, "execution failed");
            }
        }
        result
    }
}
