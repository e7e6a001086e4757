#![allow(unused_imports, dead_code)]
pub mod notifiers;
pub mod sla_helpers;
pub mod test_db;

pub use notifiers::*;
pub use sla_helpers::*;
pub use test_db::*;
