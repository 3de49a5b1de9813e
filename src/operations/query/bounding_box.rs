use crate::error::{OperationError, Result};
use crate::math::{Point3, Vector3};
use crate::tessellation::{TessellateSolid, TessellationParams};
use crate::topology::{SolidId, TopologyStore};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Smallest box containing all `points`, or `None` for an empty set.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |acc, p| Self {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        }))
    }

    /// Returns `true` if the boxes overlap, allowing a gap of up to `tol`.
    #[must_use]
    pub fn intersects(&self, other: &Aabb, tol: f64) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] + tol && other.min[i] <= self.max[i] + tol)
    }

    /// Returns `true` if `point` lies inside the box grown by `tol`.
    #[must_use]
    pub fn contains(&self, point: &Point3, tol: f64) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] - tol && point[i] <= self.max[i] + tol)
    }

    /// Edge lengths of the box.
    #[must_use]
    pub fn extent(&self) -> Vector3 {
        self.max - self.min
    }

    /// Length of the box diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.extent().norm()
    }

    /// Centre of the box.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Computes the axis-aligned bounding box of a solid.
///
/// Curved faces are bounded through their tessellation, so the box is exact
/// for planar solids and within the chord tolerance otherwise.
pub struct BoundingBox {
    solid: SolidId,
    params: TessellationParams,
}

impl BoundingBox {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self {
            solid,
            params: TessellationParams::default(),
        }
    }

    /// Executes the query, returning the AABB.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid cannot be tessellated or has no faces.
    pub fn execute(&self, store: &TopologyStore) -> Result<Aabb> {
        let mesh = TessellateSolid::new(self.solid, self.params).execute(store)?;
        Aabb::from_points(&mesh.vertices)
            .ok_or_else(|| OperationError::Failed("solid has no geometry".into()).into())
    }
}
