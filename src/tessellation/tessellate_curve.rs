use crate::error::{Result, TopologyError};
use crate::math::Point3;
use crate::topology::{EdgeCurve, EdgeId, OrientedEdge, TopologyStore, WireId};

use super::{Polyline, TessellationParams};

/// Tessellates a curve (edge) into a polyline.
///
/// The polyline runs from the start vertex to the end vertex and includes
/// both endpoints.
pub struct TessellateCurve {
    edge: EdgeId,
    params: TessellationParams,
}

impl TessellateCurve {
    /// Creates a new `TessellateCurve` operation.
    #[must_use]
    pub fn new(edge: EdgeId, params: TessellationParams) -> Self {
        Self { edge, params }
    }

    /// Executes the tessellation, returning a polyline.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or its vertices are missing, or the curve
    /// cannot be evaluated.
    pub fn execute(&self, store: &TopologyStore) -> Result<Polyline> {
        let mut points = sample_oriented_edge(store, OrientedEdge::new(self.edge, true), &self.params)?;
        let edge = store.edge(self.edge)?;
        points.push(store.vertex(edge.end)?.point);
        Ok(Polyline { points })
    }
}

/// Samples an edge in traversal order, excluding the final point so that
/// consecutive edges of a wire chain without duplicates.
///
/// Line edges contribute their start vertex only; circular edges are sampled
/// with the chord tolerance of `params`.
pub(crate) fn sample_oriented_edge(
    store: &TopologyStore,
    oe: OrientedEdge,
    params: &TessellationParams,
) -> Result<Vec<Point3>> {
    let edge = store.edge(oe.edge)?;
    let start_vertex = if oe.forward { edge.start } else { edge.end };
    let start_point = store.vertex(start_vertex)?.point;

    match &edge.curve {
        EdgeCurve::Line(_) => Ok(vec![start_point]),
        EdgeCurve::Circle(circle) => {
            let (t_start, t_end) = if oe.forward {
                (edge.t_start, edge.t_end)
            } else {
                (edge.t_end, edge.t_start)
            };
            let n = params.arc_segments(circle.radius(), t_end - t_start);
            let mut points = Vec::with_capacity(n);
            // Vertex positions are authoritative at the ends.
            points.push(start_point);
            for i in 1..n {
                #[allow(clippy::cast_precision_loss)]
                let frac = i as f64 / n as f64;
                points.push(edge.curve.as_curve().point_at(t_start + frac * (t_end - t_start)));
            }
            Ok(points)
        }
    }
}

/// Samples a closed wire into a polygon (first point not repeated).
///
/// # Errors
///
/// Returns [`TopologyError::WireNotClosed`] for an open wire, or an error if
/// any referenced entity is missing.
pub fn wire_polyline(
    store: &TopologyStore,
    wire_id: WireId,
    params: &TessellationParams,
) -> Result<Vec<Point3>> {
    let wire = store.wire(wire_id)?;
    if !wire.is_closed {
        return Err(TopologyError::WireNotClosed.into());
    }
    let mut points = Vec::new();
    for &oe in &wire.edges {
        points.extend(sample_oriented_edge(store, oe, params)?);
    }
    Ok(points)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::Circle;
    use crate::math::Vector3;
    use crate::operations::creation::MakeWire;
    use crate::topology::{EdgeData, VertexData, WireData};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn line_edge_has_two_points() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(vec![p(0.0, 0.0, 0.0), p(3.0, 0.0, 0.0)], false)
            .execute(&mut store)
            .unwrap();
        let edge = store.wire(wire).unwrap().edges[0].edge;
        let polyline = TessellateCurve::new(edge, TessellationParams::default())
            .execute(&store)
            .unwrap();
        assert_eq!(polyline.points.len(), 2);
        assert!((polyline.points[1] - p(3.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn full_circle_wire_samples_stay_on_radius() {
        let mut store = TopologyStore::new();
        let v = store.add_vertex(VertexData::new(p(2.0, 0.0, 0.0)));
        let circle = Circle::new(Point3::origin(), 2.0, Vector3::z(), Vector3::x()).unwrap();
        let edge = store.add_edge(EdgeData {
            start: v,
            end: v,
            curve: EdgeCurve::Circle(circle),
            t_start: 0.0,
            t_end: std::f64::consts::TAU,
        });
        let wire = store.add_wire(WireData::closed(vec![OrientedEdge::new(edge, true)]));

        let params = TessellationParams::default();
        let points = wire_polyline(&store, wire, &params).unwrap();
        assert_eq!(points.len(), params.arc_segments(2.0, std::f64::consts::TAU));
        for q in &points {
            assert!(((q - Point3::origin()).norm() - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn open_wire_has_no_polygon() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)], false)
            .execute(&mut store)
            .unwrap();
        assert!(wire_polyline(&store, wire, &TessellationParams::default()).is_err());
    }
}
