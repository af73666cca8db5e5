#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use pylearn_client::backend::Backend;
use pylearn_client::error::GateError;
use pylearn_client::models::{
    ChatResponse, LoginRequest, ProfileResponse, RegisterRequest, Reply, RunCodeResponse,
    StatusResponse,
};

pub enum RunScript {
    Respond(RunCodeResponse),
    ServerError(&'static str),
    // never answers on its own, only gives up on cancellation
    Hang,
    Delay(Duration, RunCodeResponse),
}

pub enum ChatScript {
    Respond(ChatResponse),
    Fail(fn() -> GateError),
    Delay(Duration, ChatResponse),
}

/// In-memory backend that counts calls and replays canned answers.
pub struct ScriptedBackend {
    pub run: RunScript,
    pub chat: ChatScript,
    pub auth: Reply<StatusResponse>,
    pub profile: Option<ProfileResponse>,
    pub run_calls: AtomicUsize,
    pub chat_calls: AtomicUsize,
    pub auth_calls: AtomicUsize,
    pub sent_code: Mutex<Vec<String>>,
    pub tokens: Mutex<Vec<CancellationToken>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self {
            run: RunScript::Respond(RunCodeResponse {
                output: Some("ok".into()),
                error: None,
            }),
            chat: ChatScript::Respond(ChatResponse {
                status: "success".into(),
                reply: Some("<p>hi</p>".into()),
                message: None,
            }),
            auth: Reply {
                ok: true,
                body: StatusResponse {
                    status: "success".into(),
                    message: "ok".into(),
                },
            },
            profile: None,
            run_calls: AtomicUsize::new(0),
            chat_calls: AtomicUsize::new(0),
            auth_calls: AtomicUsize::new(0),
            sent_code: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedBackend {
    pub fn output(text: &str) -> Self {
        Self {
            run: RunScript::Respond(RunCodeResponse {
                output: Some(text.into()),
                error: None,
            }),
            ..Self::default()
        }
    }

    pub fn run_calls(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn run_code(
        &self,
        code: &str,
        cancel: CancellationToken,
    ) -> Result<RunCodeResponse, GateError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        self.sent_code.lock().unwrap().push(code.to_string());
        self.tokens.lock().unwrap().push(cancel.clone());

        match &self.run {
            RunScript::Respond(body) => Ok(body.clone()),
            RunScript::ServerError(text) => Err(GateError::Server(text.to_string())),
            RunScript::Hang => {
                cancel.cancelled().await;
                Err(GateError::Cancelled)
            }
            RunScript::Delay(delay, body) => {
                tokio::time::sleep(*delay).await;
                Ok(body.clone())
            }
        }
    }

    async fn chat(&self, _message: &str) -> Result<ChatResponse, GateError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        match &self.chat {
            ChatScript::Respond(body) => Ok(body.clone()),
            ChatScript::Fail(make) => Err(make()),
            ChatScript::Delay(delay, body) => {
                tokio::time::sleep(*delay).await;
                Ok(body.clone())
            }
        }
    }

    async fn login(&self, _request: &LoginRequest) -> Result<Reply<StatusResponse>, GateError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.auth.clone())
    }

    async fn register(
        &self,
        _request: &RegisterRequest,
    ) -> Result<Reply<StatusResponse>, GateError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.auth.clone())
    }

    async fn user_profile(&self) -> Result<ProfileResponse, GateError> {
        self.profile
            .clone()
            .ok_or_else(|| GateError::Backend("connection refused".into()))
    }
}
