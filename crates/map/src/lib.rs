pub mod engine;
pub mod recording;
pub mod session;
pub mod spec;

pub use engine::*;
pub use recording::*;
pub use session::*;
pub use spec::*;
