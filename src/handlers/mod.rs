mod auth;
mod chat;
mod run_code;

pub use auth::{
    AuthError, DAILY_QUERY_LIMIT, LoginForm, ProfileCard, Redirect, RegisterForm, login, profile,
    register,
};
pub use chat::{ChatFlow, ChatOutcome, GREETING, THINKING, UNKNOWN_ERROR};
pub use run_code::{ExecutionFlow, NO_OUTPUT, RUNNING};
