use crate::error::LidError;
use crate::geometry::surface::Plane;
use crate::math::Point3;
use crate::tessellation::Polyline;

/// Projects a face boundary onto a plane as one closed polygon.
///
/// The boundary comes as one polyline per edge in traversal order. Every
/// sample is projected orthogonally; consecutive edges are stitched where
/// they meet, snapping gaps up to the tolerance to their midpoint. Runs of
/// coincident points collapse to one.
pub struct ProjectWire<'a> {
    edges: &'a [Polyline],
    plane: &'a Plane,
    tolerance: f64,
}

impl<'a> ProjectWire<'a> {
    /// Creates a new `ProjectWire` operation.
    #[must_use]
    pub fn new(edges: &'a [Polyline], plane: &'a Plane) -> Self {
        Self {
            edges,
            plane,
            tolerance: 1e-6,
        }
    }

    /// Sets the largest gap between consecutive edges that is healed.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the projection, returning the polygon (first point not
    /// repeated).
    ///
    /// # Errors
    ///
    /// Returns [`LidError::Projection`] when consecutive edges are further
    /// apart than the tolerance after projection, or
    /// [`LidError::InvalidWire`] when fewer than three distinct points
    /// remain.
    pub fn execute(&self) -> Result<Vec<Point3>, LidError> {
        let mut points: Vec<Point3> = Vec::new();
        for edge in self.edges {
            let mut projected = edge.points.iter().map(|p| self.plane.project_point(p));
            let Some(first) = projected.next() else {
                continue;
            };
            match points.last_mut() {
                Some(last) => {
                    *last = self.heal(last, &first)?;
                }
                None => points.push(first),
            }
            points.extend(projected);
        }

        // Close the loop.
        if points.len() > 1 {
            let last = points[points.len() - 1];
            points[0] = self.heal(&last, &points[0])?;
            points.pop();
        }

        let mut polygon: Vec<Point3> = Vec::with_capacity(points.len());
        for p in points {
            if polygon
                .last()
                .is_none_or(|last| (p - last).norm() > self.tolerance)
            {
                polygon.push(p);
            }
        }
        while polygon.len() > 1
            && polygon
                .first()
                .zip(polygon.last())
                .is_some_and(|(a, b)| (a - b).norm() <= self.tolerance)
        {
            polygon.pop();
        }

        if polygon.len() < 3 {
            return Err(LidError::InvalidWire(format!(
                "projected boundary has {} distinct points",
                polygon.len()
            )));
        }
        Ok(polygon)
    }

    /// The stitched point where `end` meets `start`.
    fn heal(&self, end: &Point3, start: &Point3) -> Result<Point3, LidError> {
        let gap = (start - end).norm();
        if gap > self.tolerance {
            return Err(LidError::Projection {
                gap,
                tolerance: self.tolerance,
            });
        }
        Ok(nalgebra::center(end, start))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn chain(loop_points: &[Point3]) -> Vec<Polyline> {
        let n = loop_points.len();
        (0..n)
            .map(|i| Polyline {
                points: vec![loop_points[i], loop_points[(i + 1) % n]],
            })
            .collect()
    }

    fn xy_plane() -> Plane {
        Plane::from_normal(Point3::origin(), Vector3::z()).unwrap()
    }

    #[test]
    fn warped_square_flattens() {
        let edges = chain(&[p(0.0, 0.0, 0.1), p(1.0, 0.0, -0.1), p(1.0, 1.0, 0.1), p(0.0, 1.0, -0.1)]);
        let plane = xy_plane();
        let polygon = ProjectWire::new(&edges, &plane).execute().unwrap();
        assert_eq!(polygon.len(), 4);
        for q in &polygon {
            assert!(q.z.abs() < 1e-15);
        }
        assert!((polygon[2] - p(1.0, 1.0, 0.0)).norm() < 1e-15);
    }

    #[test]
    fn projection_is_idempotent() {
        let edges = chain(&[p(0.0, 0.0, 0.3), p(2.0, 0.0, 0.2), p(2.0, 1.0, -0.4), p(0.0, 1.0, 0.0)]);
        let plane = Plane::from_normal(p(0.0, 0.0, 0.5), Vector3::new(0.1, 0.2, 1.0)).unwrap();
        let once = ProjectWire::new(&edges, &plane).execute().unwrap();
        let twice = ProjectWire::new(&chain(&once), &plane).execute().unwrap();
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(&twice) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn small_gap_is_healed_to_midpoint() {
        let mut edges = chain(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)]);
        edges[1].points[0] = p(1.0, 2e-7, 0.0);
        let plane = xy_plane();
        let polygon = ProjectWire::new(&edges, &plane).execute().unwrap();
        assert_eq!(polygon.len(), 3);
        assert!((polygon[1] - p(1.0, 1e-7, 0.0)).norm() < 1e-15);
    }

    #[test]
    fn large_gap_is_rejected() {
        let mut edges = chain(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)]);
        edges[1].points[0] = p(1.0, 0.5, 0.0);
        let plane = xy_plane();
        let err = ProjectWire::new(&edges, &plane).execute().unwrap_err();
        assert!(matches!(err, LidError::Projection { gap, .. } if (gap - 0.5).abs() < 1e-12));
    }

    #[test]
    fn edge_on_projection_collapses() {
        // A loop in the xz plane projects onto a line in the xy plane.
        let edges = chain(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(0.0, 0.0, 1.0)]);
        let plane = xy_plane();
        let err = ProjectWire::new(&edges, &plane).execute().unwrap_err();
        assert!(matches!(err, LidError::InvalidWire(_)));
    }
}
