use super::bsp::{self, Polygon};

/// The type of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Subtract,
    Intersect,
}

impl BooleanOp {
    /// Combines two closed polygon soups with BSP clipping.
    pub(super) fn apply(self, a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
        match self {
            Self::Union => bsp::union(a, b),
            Self::Subtract => bsp::subtract(a, b),
            Self::Intersect => bsp::intersect(a, b),
        }
    }

    /// The result when the operands' bounding boxes do not overlap.
    pub(super) fn disjoint(self, mut a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
        match self {
            Self::Union => {
                a.extend(b);
                a
            }
            Self::Subtract => a,
            Self::Intersect => Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;

    fn triangle(z: f64) -> Polygon {
        Polygon::new(vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
        ])
        .unwrap()
    }

    #[test]
    fn disjoint_union_keeps_both() {
        let out = BooleanOp::Union.disjoint(vec![triangle(0.0)], vec![triangle(5.0)]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn disjoint_subtract_keeps_minuend() {
        let out = BooleanOp::Subtract.disjoint(vec![triangle(0.0)], vec![triangle(5.0)]);
        assert_eq!(out.len(), 1);
        assert!(out[0].vertices.iter().all(|v| v.z.abs() < 1e-12));
    }

    #[test]
    fn disjoint_intersect_is_empty() {
        assert!(BooleanOp::Intersect
            .disjoint(vec![triangle(0.0)], vec![triangle(5.0)])
            .is_empty());
    }
}
