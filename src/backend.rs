use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::PageContext;
use crate::error::GateError;
use crate::models::{
    ChatRequest, ChatResponse, LoginRequest, ProfileResponse, RegisterRequest, Reply,
    RunCodeRequest, RunCodeResponse, StatusResponse,
};

pub const CSRF_HEADER: &str = "X-CSRF-Token";

#[async_trait]
pub trait Backend: Send + Sync {
    // must give up with Cancelled once `cancel` fires
    async fn run_code(
        &self,
        code: &str,
        cancel: CancellationToken,
    ) -> Result<RunCodeResponse, GateError>;

    async fn chat(&self, message: &str) -> Result<ChatResponse, GateError>;

    async fn login(&self, request: &LoginRequest) -> Result<Reply<StatusResponse>, GateError>;

    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<Reply<StatusResponse>, GateError>;

    async fn user_profile(&self) -> Result<ProfileResponse, GateError>;
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
    csrf_token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, page: &PageContext) -> Result<Self, GateError> {
        // cookie store keeps the login session for later calls
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self::with_client(client, base_url, page))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, page: &PageContext) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            csrf_token: page.csrf_token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let builder = self.client.post(self.url(path));
        match &self.csrf_token {
            Some(token) => builder.header(CSRF_HEADER, token),
            None => builder,
        }
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GateError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn run_code(
        &self,
        code: &str,
        cancel: CancellationToken,
    ) -> Result<RunCodeResponse, GateError> {
        let start = Instant::now();
        let request = self.post("/run_code").json(&RunCodeRequest { code });

        let call = async {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let reason = status.canonical_reason().unwrap_or("").to_string();
                return Err(GateError::Server(reason));
            }
            decode::<RunCodeResponse>(response).await
        };

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(GateError::Cancelled),
            result = call => result,
        };

        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "run_code finished"
        );
        result
    }

    async fn chat(&self, message: &str) -> Result<ChatResponse, GateError> {
        let response = self
            .post("/chatgpt")
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GateError::QuotaExceeded);
        }
        if !status.is_success() {
            return Err(GateError::HttpStatus(status.as_u16()));
        }
        decode(response).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<Reply<StatusResponse>, GateError> {
        let response = self.post("/login").json(request).send().await?;
        let ok = response.status().is_success();
        let body: StatusResponse = decode(response).await?;
        info!(ok, status = %body.status, "login response");
        Ok(Reply { ok, body })
    }

    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<Reply<StatusResponse>, GateError> {
        let response = self.post("/register").json(request).send().await?;
        let ok = response.status().is_success();
        let body: StatusResponse = decode(response).await?;
        info!(ok, status = %body.status, "register response");
        Ok(Reply { ok, body })
    }

    async fn user_profile(&self) -> Result<ProfileResponse, GateError> {
        let response = self.client.get(self.url("/get_user_profile")).send().await?;
        // 404 still carries {"success": false}
        decode(response).await
    }
}
