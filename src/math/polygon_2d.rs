use super::intersect_2d::{segment_segment_relation_2d, SegmentRelation};
use super::{Point2, TOLERANCE};

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Finds the first pair of boundary edges of a closed polygon that touch
/// where they should not.
///
/// Edges `i` and `i + 1` may share their common vertex but must not fold
/// back onto each other; all other pairs must be fully disjoint. Returns the
/// offending edge indices, or `None` for a simple polygon.
#[must_use]
pub fn find_self_intersection(points: &[Point2], tol: f64) -> Option<(usize, usize)> {
    let n = points.len();
    if n < 3 {
        return None;
    }
    for i in 0..n {
        let a0 = points[i];
        let a1 = points[(i + 1) % n];
        for j in (i + 1)..n {
            let b0 = points[j];
            let b1 = points[(j + 1) % n];
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match segment_segment_relation_2d(&a0, &a1, &b0, &b1, tol) {
                SegmentRelation::Disjoint => {}
                SegmentRelation::Overlap => return Some((i, j)),
                SegmentRelation::Point { t, u, .. } => {
                    if !adjacent {
                        return Some((i, j));
                    }
                    // Adjacent edges may only meet at their shared vertex.
                    let eps = TOLERANCE.max(tol);
                    let at_shared = if j == i + 1 {
                        t > 1.0 - eps && u < eps
                    } else {
                        t < eps && u > 1.0 - eps
                    };
                    if !at_shared {
                        return Some((i, j));
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn square() -> Vec<Point2> {
        vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]
    }

    #[test]
    fn ccw_square_has_positive_area() {
        assert!((signed_area_2d(&square()) - 1.0).abs() < 1e-12);
        let mut cw = square();
        cw.reverse();
        assert!((signed_area_2d(&cw) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn simple_square_has_no_self_intersection() {
        assert_eq!(find_self_intersection(&square(), 1e-9), None);
    }

    #[test]
    fn bowtie_is_self_intersecting() {
        let bowtie = vec![p(0.0, 0.0), p(1.0, 1.0), p(1.0, 0.0), p(0.0, 1.0)];
        assert!(find_self_intersection(&bowtie, 1e-9).is_some());
    }

    #[test]
    fn folded_back_edge_is_self_intersecting() {
        let spike = vec![p(0.0, 0.0), p(2.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)];
        assert!(find_self_intersection(&spike, 1e-9).is_some());
    }

    #[test]
    fn concave_polygon_is_simple() {
        let l_shape = vec![
            p(0.0, 0.0),
            p(2.0, 0.0),
            p(2.0, 1.0),
            p(1.0, 1.0),
            p(1.0, 2.0),
            p(0.0, 2.0),
        ];
        assert_eq!(find_self_intersection(&l_shape, 1e-9), None);
    }
}
