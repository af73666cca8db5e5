use thiserror::Error;
use tracing::{error, info};

use crate::backend::Backend;
use crate::models::{LoginRequest, RegisterRequest, UserProfile};

pub const DAILY_QUERY_LIMIT: u32 = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please fill in all fields.")]
    MissingFields,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Login failed: {0}")]
    LoginRejected(String),

    #[error("Registration failed: {0}")]
    RegistrationRejected(String),

    #[error("An error occurred during login. Please try again.")]
    LoginUnavailable,

    #[error("An error occurred during registration. Please try again.")]
    RegistrationUnavailable,

    #[error("Failed to load user profile.")]
    ProfileUnavailable,

    #[error("An error occurred while fetching user profile.")]
    ProfileFetch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect(pub &'static str);

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn register(backend: &dyn Backend, form: &RegisterForm) -> Result<Redirect, AuthError> {
    let email = form.email.trim();
    let username = form.username.trim();
    let password = form.password.trim();
    let confirm = form.confirm_password.trim();

    if [email, username, password, confirm].iter().any(|f| f.is_empty()) {
        return Err(AuthError::MissingFields);
    }
    if password != confirm {
        return Err(AuthError::PasswordMismatch);
    }

    let request = RegisterRequest {
        email: email.to_string(),
        username: username.to_string(),
        password: password.to_string(),
    };
    match backend.register(&request).await {
        Ok(reply) if reply.ok && reply.body.is_success() => {
            info!(username, "registered");
            Ok(Redirect("/login"))
        }
        Ok(reply) => {
            error!(message = %reply.body.message, "registration failed");
            Err(AuthError::RegistrationRejected(reply.body.message))
        }
        Err(e) => {
            error!(error = %e, "error during registration");
            Err(AuthError::RegistrationUnavailable)
        }
    }
}

pub async fn login(backend: &dyn Backend, form: &LoginForm) -> Result<Redirect, AuthError> {
    let email = form.email.trim();
    let password = form.password.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }

    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    match backend.login(&request).await {
        Ok(reply) if reply.ok && reply.body.is_success() => {
            info!(email, "logged in");
            Ok(Redirect("/unlock"))
        }
        Ok(reply) => {
            error!(message = %reply.body.message, "login failed");
            Err(AuthError::LoginRejected(reply.body.message))
        }
        Err(e) => {
            error!(error = %e, "error during login");
            Err(AuthError::LoginUnavailable)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCard {
    pub username: String,
    pub email: String,
    pub tier: String,
    pub remaining_queries: u32,
}

impl From<UserProfile> for ProfileCard {
    fn from(user: UserProfile) -> Self {
        Self {
            remaining_queries: DAILY_QUERY_LIMIT.saturating_sub(user.query_count),
            username: user.username,
            email: user.email,
            tier: user.tier_name,
        }
    }
}

pub async fn profile(backend: &dyn Backend) -> Result<ProfileCard, AuthError> {
    match backend.user_profile().await {
        Ok(body) => match body.user {
            Some(user) if body.success => Ok(user.into()),
            _ => Err(AuthError::ProfileUnavailable),
        },
        Err(e) => {
            error!(error = %e, "error fetching profile");
            Err(AuthError::ProfileFetch)
        }
    }
}
