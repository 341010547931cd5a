pub mod geodesy;
pub mod lonlat;
pub mod precision;

pub use geodesy::*;
pub use lonlat::*;
pub use precision::*;
