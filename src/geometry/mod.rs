pub mod curve;
pub mod surface;

pub use curve::{Circle, Curve, Line};
pub use surface::{Cylinder, Plane, Surface};
