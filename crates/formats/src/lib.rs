pub mod centroid;
pub mod geometry;
pub mod lenient;

pub use centroid::*;
pub use geometry::*;
pub use lenient::*;
