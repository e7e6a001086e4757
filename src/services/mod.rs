pub mod calendar;
pub mod matcher;
pub mod monitor;
pub mod notification_service;
pub mod sla_service;

pub use monitor::SlaMonitor;
pub use notification_service::{LogNotifier, NullAssigneeDirectory};
pub use sla_service::SlaService;
