mod boundary_wire;
mod bounding_box;
mod classify;
mod volume;

pub use boundary_wire::BoundaryWire;
pub use bounding_box::{Aabb, BoundingBox};
pub use classify::{classify_point_in_mesh, classify_point_in_solid, PointClassification};
pub use volume::{signed_mesh_volume, Volume};
