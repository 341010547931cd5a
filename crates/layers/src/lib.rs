pub mod anchor;
pub mod layer;
pub mod processing;
pub mod raster;
pub mod stack;
pub mod symbology;
pub mod tiles;

pub use anchor::*;
pub use layer::*;
pub use processing::*;
pub use stack::*;
