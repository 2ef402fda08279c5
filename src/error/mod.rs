mod agent;
mod app;
mod config;
mod metrics;
mod sink;
mod storage;
mod template;

pub use agent::AgentError;
pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use metrics::MetricsError;
pub use sink::SinkError;
pub use storage::StorageError;
pub use template::TemplateError;
