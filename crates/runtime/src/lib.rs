pub mod advisory;
pub mod event_bus;

pub use advisory::*;
pub use event_bus::*;
