use nalgebra::SymmetricEigen;

use crate::error::LidError;
use crate::geometry::surface::Plane;
use crate::math::polygon_3d::vertex_average;
use crate::math::{Matrix3, Point3, Vector3};
use crate::topology::{FaceId, FaceSurface, TopologyStore};

/// Where a lid plane came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaneSource {
    /// The face's own supporting plane.
    Exact,
    /// Least-squares fit through the boundary samples.
    BestFit {
        /// Root-mean-square distance of the samples from the plane.
        rms: f64,
    },
}

/// A plane chosen for a lid, with its provenance.
#[derive(Debug, Clone)]
pub struct FittedPlane {
    pub plane: Plane,
    pub source: PlaneSource,
}

/// Determines the plane a face's lid is built on.
///
/// Planar faces use their supporting plane exactly. Any other face gets the
/// least-squares plane through its boundary samples, see [`fit_plane`].
pub struct DeterminePlane<'a> {
    face: FaceId,
    samples: &'a [Point3],
    tolerance: f64,
}

impl<'a> DeterminePlane<'a> {
    /// Creates a new `DeterminePlane` operation over the face's boundary
    /// samples.
    #[must_use]
    pub fn new(face: FaceId, samples: &'a [Point3]) -> Self {
        Self {
            face,
            samples,
            tolerance: 1e-6,
        }
    }

    /// Sets the relative tolerance below which the samples count as
    /// collinear.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns [`LidError::PlaneFit`] when a non-planar face's samples do not
    /// span a plane, or [`LidError::Kernel`] if the face is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<FittedPlane, LidError> {
        match &store.face(self.face)?.surface {
            FaceSurface::Plane(plane) => Ok(FittedPlane {
                plane: plane.clone(),
                source: PlaneSource::Exact,
            }),
            FaceSurface::Cylinder(_) => fit_plane(self.samples, self.tolerance),
        }
    }
}

/// Least-squares plane through `points`.
///
/// The plane passes through the centroid; its normal is the eigenvector of
/// the smallest eigenvalue of the sample covariance, signed so that its
/// largest component is positive. The result does not depend on the order
/// of the points.
///
/// # Errors
///
/// Returns [`LidError::PlaneFit`] for fewer than three points, coincident
/// points, or points whose second-largest spread is within `tolerance` of
/// their extent (a line).
pub fn fit_plane(points: &[Point3], tolerance: f64) -> Result<FittedPlane, LidError> {
    if points.len() < 3 {
        return Err(LidError::PlaneFit(format!(
            "need at least 3 points, got {}",
            points.len()
        )));
    }

    let centroid = vertex_average(points);
    let mut covariance = Matrix3::zeros();
    for p in points {
        let d = p - centroid;
        covariance += d * d.transpose();
    }
    #[allow(clippy::cast_precision_loss)]
    let count = points.len() as f64;
    covariance /= count;

    let eigen = SymmetricEigen::new(covariance);
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let largest = eigen.eigenvalues[order[2]];
    let middle = eigen.eigenvalues[order[1]];
    if largest <= 0.0 || middle <= tolerance * tolerance * largest {
        return Err(LidError::PlaneFit(format!(
            "boundary samples are collinear (spread {middle:e} vs {largest:e})"
        )));
    }

    let normal = canonical(eigen.eigenvectors.column(order[0]).into_owned());
    let plane = Plane::from_normal(centroid, normal).map_err(|e| LidError::PlaneFit(e.to_string()))?;

    let sum_sq: f64 = points
        .iter()
        .map(|p| plane.signed_distance(p).powi(2))
        .sum();
    Ok(FittedPlane {
        plane,
        source: PlaneSource::BestFit {
            rms: (sum_sq / count).sqrt(),
        },
    })
}

/// Unit vector with its largest-magnitude component made positive.
fn canonical(v: Vector3) -> Vector3 {
    let v = v.normalize();
    if v[v.iamax()] < 0.0 {
        -v
    } else {
        v
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeBox;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn tilted_samples() -> Vec<Point3> {
        // z = 0.5x + 0.25y + 1 with alternating noise.
        let mut points = Vec::new();
        for i in 0..6 {
            for j in 0..4 {
                let (x, y) = (f64::from(i), f64::from(j));
                let noise = if (i + j) % 2 == 0 { 0.01 } else { -0.01 };
                points.push(p(x, y, 0.5 * x + 0.25 * y + 1.0 + noise));
            }
        }
        points
    }

    #[test]
    fn planar_face_uses_exact_plane() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), p(1.0, 2.0, 3.0))
            .execute(&mut store)
            .unwrap();
        for face in store.solid_faces(solid).unwrap() {
            let fitted = DeterminePlane::new(face, &[]).execute(&store).unwrap();
            assert_eq!(fitted.source, PlaneSource::Exact);
            let FaceSurface::Plane(surface) = &store.face(face).unwrap().surface else {
                panic!("box faces are planar");
            };
            assert!((fitted.plane.plane_normal() - surface.plane_normal()).norm() < 1e-15);
            assert!(fitted.plane.signed_distance(surface.origin()).abs() < 1e-15);
        }
    }

    #[test]
    fn best_fit_recovers_tilted_plane() {
        let fitted = fit_plane(&tilted_samples(), 1e-6).unwrap();
        let expected = Vector3::new(-0.5, -0.25, 1.0).normalize();
        assert!((fitted.plane.plane_normal() - expected).norm() < 1e-2);
        let PlaneSource::BestFit { rms } = fitted.source else {
            panic!("expected a best fit");
        };
        assert!(rms < 0.011);
    }

    #[test]
    fn best_fit_is_order_independent() {
        let points = tilted_samples();
        let a = fit_plane(&points, 1e-6).unwrap();
        let mut reversed = points.clone();
        reversed.reverse();
        let mut rotated = points;
        rotated.rotate_left(7);
        for other in [reversed, rotated] {
            let b = fit_plane(&other, 1e-6).unwrap();
            assert!((a.plane.plane_normal() - b.plane.plane_normal()).norm() < 1e-12);
            assert!(a.plane.signed_distance(b.plane.origin()).abs() < 1e-12);
        }
    }

    #[test]
    fn best_fit_minimizes_squared_distance() {
        let points = tilted_samples();
        let fitted = fit_plane(&points, 1e-6).unwrap();
        let cost = |plane: &Plane| -> f64 { points.iter().map(|q| plane.signed_distance(q).powi(2)).sum() };
        let best = cost(&fitted.plane);
        let normal = *fitted.plane.plane_normal();
        let origin = *fitted.plane.origin();
        for tweak in [Vector3::x(), Vector3::y(), Vector3::z()] {
            let nudged = Plane::from_normal(origin, normal + tweak * 1e-3).unwrap();
            assert!(cost(&nudged) >= best);
            let shifted = Plane::from_normal(origin + normal * 1e-3, normal).unwrap();
            assert!(cost(&shifted) >= best);
        }
    }

    #[test]
    fn collinear_points_fail() {
        let points = vec![p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(2.0, 2.0, 2.0), p(3.0, 3.0, 3.0)];
        assert!(matches!(fit_plane(&points, 1e-6), Err(LidError::PlaneFit(_))));
    }

    #[test]
    fn too_few_points_fail() {
        let points = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)];
        assert!(matches!(fit_plane(&points, 1e-6), Err(LidError::PlaneFit(_))));
    }

    #[test]
    fn normal_sign_is_canonical() {
        let square = vec![p(0.0, 0.0, 2.0), p(0.0, 1.0, 2.0), p(1.0, 1.0, 2.0), p(1.0, 0.0, 2.0)];
        let fitted = fit_plane(&square, 1e-6).unwrap();
        assert!((fitted.plane.plane_normal() - Vector3::z()).norm() < 1e-12);
    }
}
