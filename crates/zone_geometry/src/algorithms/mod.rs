pub mod extraction;
pub mod rasterization;
#[cfg(feature = "polygon")]
pub mod repair;

pub use extraction::*;
pub use rasterization::*;
#[cfg(feature = "polygon")]
pub use repair::*;
