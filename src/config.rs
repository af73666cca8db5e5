use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

pub const ANONYMOUS_ID: &str = "anonymous";

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "pylearn")]
#[command(about = "Terminal client for the Python learning service")]
pub struct Args {
    // Base URL of the learning service
    #[arg(long, env = "PYLEARN_BASE_URL", default_value = "http://localhost:5000")]
    pub base_url: String,

    // CSRF token issued by the server-rendered page
    #[arg(long, env = "PYLEARN_CSRF_TOKEN")]
    pub csrf_token: Option<String>,

    // User id used to key the local rate limiter
    #[arg(long, env = "PYLEARN_USER_ID")]
    pub user_id: Option<String>,

    // Max code submissions per window
    #[arg(long, default_value_t = 10)]
    pub rate_limit: usize,

    // Rate limit window in milliseconds
    #[arg(long, default_value_t = 60_000)]
    pub rate_window_ms: u64,

    // How long to wait for /run_code before giving up
    #[arg(long, default_value_t = 5_000)]
    pub exec_timeout_ms: u64,

    // Longest accepted submission, in characters
    #[arg(long, default_value_t = 5_000)]
    pub max_code_len: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Submit a Python file to /run_code
    Run { file: PathBuf },
    /// Ask the assistant a question
    Chat { message: Vec<String> },
    /// Log in; the session cookie lives for this process only
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PYLEARN_PASSWORD")]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Show the logged-in user's profile card
    Profile,
    /// Report missing colons in a Python file
    Lint { file: PathBuf },
    /// Print a Python file with syntax colours
    Highlight { file: PathBuf },
    /// List editor completions, optionally filtered by prefix
    Complete { prefix: Option<String> },
    /// Interactive session sharing one rate limiter and cookie jar
    Repl,
}

/// Values the page layer would have rendered into meta tags.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub csrf_token: Option<String>,
    pub user_id: Option<String>,
}

impl PageContext {
    /// Rate-limit key: the user id, or `anonymous` when absent or blank.
    pub fn identifier(&self) -> &str {
        self.user_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(ANONYMOUS_ID)
    }
}

/// Resolved settings for one client session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub page: PageContext,
    pub rate_limit: usize,
    pub rate_window: Duration,
    pub exec_timeout: Duration,
    pub max_code_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            page: PageContext::default(),
            rate_limit: crate::rate_limit::DEFAULT_MAX_REQUESTS,
            rate_window: crate::rate_limit::DEFAULT_WINDOW,
            exec_timeout: Duration::from_millis(5_000),
            max_code_len: crate::validator::MAX_CODE_LEN,
        }
    }
}

impl From<&Args> for ClientConfig {
    fn from(args: &Args) -> Self {
        Self {
            base_url: args.base_url.trim_end_matches('/').to_string(),
            page: PageContext {
                csrf_token: args.csrf_token.clone(),
                user_id: args.user_id.clone(),
            },
            rate_limit: args.rate_limit,
            rate_window: Duration::from_millis(args.rate_window_ms),
            exec_timeout: Duration::from_millis(args.exec_timeout_ms),
            max_code_len: args.max_code_len,
        }
    }
}
