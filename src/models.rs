use serde::{Deserialize, Serialize};

// POST /run_code request body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunCodeRequest<'a> {
    pub code: &'a str,
}

// POST /run_code response body, either field may be missing
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RunCodeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunCodeResponse {
    // empty strings count as missing
    pub fn display_text(&self) -> Option<&str> {
        self.output
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.error.as_deref().filter(|s| !s.is_empty()))
    }
}

// POST /chatgpt request body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

// POST /chatgpt response body
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// POST /login request body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// POST /register request body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

// Login / register response body
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// GET /get_user_profile response body
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ProfileResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub tier_name: String,
    #[serde(default)]
    pub query_count: u32,
}

#[derive(Debug, Clone)]
pub struct Reply<T> {
    pub ok: bool,
    pub body: T,
}
