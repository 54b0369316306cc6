//! Question Gateway
//!
//! Accepts `.docx` and `.pages` uploads, extracts their text, hands it to a
//! question parser and stores parsed question lists under a topic.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use app::{router, AppState};
pub use config::Config;
pub use error::{AppError, AppResult};
