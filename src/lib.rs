pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;
pub mod highlight;
pub mod layout;
pub mod lint;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod sanitize;
pub mod state;
pub mod surface;
pub mod validator;

pub use backend::{Backend, HttpBackend};
pub use config::{ClientConfig, PageContext};
pub use error::GateError;
pub use state::AppState;
