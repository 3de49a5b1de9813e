use crate::error::Result;
use crate::geometry::curve::{Circle, Curve, Line};
use crate::math::Point3;

use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the topology store.
    pub struct EdgeId;
}

/// The geometric curve associated with an edge.
#[derive(Debug, Clone)]
pub enum EdgeCurve {
    /// A line segment.
    Line(Line),
    /// A circular arc (or a full circle when the edge is closed).
    Circle(Circle),
}

impl EdgeCurve {
    /// The underlying parametric curve.
    #[must_use]
    pub fn as_curve(&self) -> &dyn Curve {
        match self {
            Self::Line(line) => line,
            Self::Circle(circle) => circle,
        }
    }
}

/// Data associated with a topological edge.
///
/// An edge connects two vertices and carries a geometric curve
/// that defines the shape of the edge between them.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Start vertex of the edge.
    pub start: VertexId,
    /// End vertex of the edge.
    pub end: VertexId,
    /// The geometric curve defining this edge's shape.
    pub curve: EdgeCurve,
    /// Parameter on the curve corresponding to the start vertex.
    pub t_start: f64,
    /// Parameter on the curve corresponding to the end vertex.
    pub t_end: f64,
}

impl EdgeData {
    /// Creates a straight edge between two vertices at the given positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the positions coincide.
    pub fn line(start: VertexId, end: VertexId, from: Point3, to: Point3) -> Result<Self> {
        let line = Line::through(from, to)?;
        let t_end = line.parameter_of(&to);
        Ok(Self {
            start,
            end,
            curve: EdgeCurve::Line(line),
            t_start: 0.0,
            t_end,
        })
    }
}
