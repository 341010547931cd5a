pub mod engine;
pub mod feature;
pub mod mode;
pub mod render;
pub mod session;

pub use engine::*;
pub use feature::*;
pub use mode::*;
pub use session::*;
