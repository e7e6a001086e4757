pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod infrastructure;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use events::{EventBus, SystemEvent};
pub use infrastructure::persistence::Database;
pub use services::{LogNotifier, NullAssigneeDirectory, SlaMonitor, SlaService};
