pub mod assignee_directory;
pub mod notifier;
pub mod sla_repository;

pub use assignee_directory::*;
pub use notifier::*;
pub use sla_repository::*;
