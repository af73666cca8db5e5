use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use crate::backend::Backend;
use crate::error::GateError;
use crate::metrics::{CHAT_FAILURES, CHAT_REQUESTS};
use crate::surface::{ChatMessage, ChatView, Role};

pub const GREETING: &str = "Hello! How can I assist you with Python today?";
pub const THINKING: &str = "AI is thinking...";
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    Replied,
    Failed,
    // blank input, or a send while one is in flight
    Ignored,
}

pub struct ChatFlow {
    backend: Arc<dyn Backend>,
    in_flight: AtomicBool,
}

// Disables input on creation; re-enables it and hides the indicator on drop,
// whichever way `send` returns.
struct Busy<'a> {
    view: &'a mut dyn ChatView,
    flag: &'a AtomicBool,
}

impl<'a> Busy<'a> {
    fn start(view: &'a mut dyn ChatView, flag: &'a AtomicBool) -> Self {
        view.set_input_enabled(false);
        view.show_thinking();
        Self { view, flag }
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.view.hide_thinking();
        self.view.set_input_enabled(true);
        self.flag.store(false, Ordering::Release);
    }
}

impl ChatFlow {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn open(&self, view: &mut dyn ChatView) {
        view.append(ChatMessage::text(Role::Greeting, GREETING));
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn send(&self, input: &str, view: &mut dyn ChatView) -> ChatOutcome {
        let message = input.trim();
        if message.is_empty() {
            return ChatOutcome::Ignored;
        }
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return ChatOutcome::Ignored;
        }

        CHAT_REQUESTS.inc();
        view.append(ChatMessage::text(Role::User, format!("You: {}", message)));

        let busy = Busy::start(view, &self.in_flight);
        match self.exchange(message).await {
            Ok(reply) => {
                info!(reply_len = reply.len(), "chat reply received");
                busy.view.append(ChatMessage::html(Role::Assistant, reply));
                ChatOutcome::Replied
            }
            Err(e) => {
                CHAT_FAILURES.inc();
                warn!(error = %e, "chat request failed");
                busy.view
                    .append(ChatMessage::text(Role::Error, format!("Error: {}", e)));
                ChatOutcome::Failed
            }
        }
    }

    async fn exchange(&self, message: &str) -> Result<String, GateError> {
        let body = self.backend.chat(message).await?;
        if body.status == "success" {
            Ok(body.reply.unwrap_or_default())
        } else {
            let reason = body
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            Err(GateError::Backend(reason))
        }
    }
}
