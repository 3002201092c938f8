pub mod geometry;
pub mod keypoint;
pub mod robust;

pub use geometry::*;
pub use keypoint::*;
pub use robust::*;
