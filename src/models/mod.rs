pub mod business_hours;
pub mod definition;
pub mod event;
pub mod instance;

pub use business_hours::*;
pub use definition::*;
pub use event::*;
pub use instance::*;
