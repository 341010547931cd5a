pub mod inspector;
pub mod sample;
pub mod sampler;

pub use inspector::*;
pub use sample::*;
pub use sampler::*;
