use super::{Point2, TOLERANCE};

/// How two bounded segments meet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentRelation {
    /// The segments do not touch.
    Disjoint,
    /// The segments cross or touch at a single point; `t`, `u` are the
    /// parameters on the first and second segment in `[0, 1]`.
    Point { point: Point2, t: f64, u: f64 },
    /// The segments are collinear and share a stretch of positive length.
    Overlap,
}

/// Bounded segment-segment intersection in 2D.
///
/// `tol` is a distance; points closer than `tol` to the other segment count
/// as touching.
#[must_use]
pub fn segment_segment_relation_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
    tol: f64,
) -> SegmentRelation {
    let da = a1 - a0;
    let db = b1 - b0;
    let len_a = da.norm();
    let len_b = db.norm();
    if len_a < TOLERANCE || len_b < TOLERANCE {
        return SegmentRelation::Disjoint;
    }

    let cross = da.x * db.y - da.y * db.x;
    let d = b0 - a0;

    if cross.abs() < TOLERANCE * len_a * len_b {
        // Parallel: only collinear segments can meet.
        let offset = (d.x * da.y - d.y * da.x).abs() / len_a;
        if offset > tol {
            return SegmentRelation::Disjoint;
        }
        let dir = da / len_a;
        let s0 = d.dot(&dir);
        let s1 = (b1 - a0).dot(&dir);
        let (lo, hi) = if s0 <= s1 { (s0, s1) } else { (s1, s0) };
        let start = lo.max(0.0);
        let end = hi.min(len_a);
        if end - start > tol {
            return SegmentRelation::Overlap;
        }
        if end - start >= -tol {
            let s = start.clamp(0.0, len_a);
            let point = a0 + dir * s;
            let u = ((point - b0).dot(&db) / (len_b * len_b)).clamp(0.0, 1.0);
            return SegmentRelation::Point {
                point,
                t: s / len_a,
                u,
            };
        }
        return SegmentRelation::Disjoint;
    }

    let t = (d.x * db.y - d.y * db.x) / cross;
    let u = (d.x * da.y - d.y * da.x) / cross;

    let eps_t = tol / len_a;
    let eps_u = tol / len_b;
    if t >= -eps_t && t <= 1.0 + eps_t && u >= -eps_u && u <= 1.0 + eps_u {
        let t = t.clamp(0.0, 1.0);
        SegmentRelation::Point {
            point: a0 + da * t,
            t,
            u: u.clamp(0.0, 1.0),
        }
    } else {
        SegmentRelation::Disjoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn crossing_segments_meet_in_the_middle() {
        let rel = segment_segment_relation_2d(
            &p(0.0, 0.0),
            &p(2.0, 2.0),
            &p(0.0, 2.0),
            &p(2.0, 0.0),
            1e-9,
        );
        match rel {
            SegmentRelation::Point { point, t, u } => {
                assert!((point - p(1.0, 1.0)).norm() < 1e-9);
                assert!((t - 0.5).abs() < 1e-9);
                assert!((u - 0.5).abs() < 1e-9);
            }
            other => panic!("expected a crossing, got {other:?}"),
        }
    }

    #[test]
    fn separated_segments_are_disjoint() {
        let rel = segment_segment_relation_2d(
            &p(0.0, 0.0),
            &p(1.0, 0.0),
            &p(0.0, 1.0),
            &p(1.0, 1.0),
            1e-9,
        );
        assert_eq!(rel, SegmentRelation::Disjoint);
    }

    #[test]
    fn collinear_overlap_is_detected() {
        let rel = segment_segment_relation_2d(
            &p(0.0, 0.0),
            &p(2.0, 0.0),
            &p(1.0, 0.0),
            &p(3.0, 0.0),
            1e-9,
        );
        assert_eq!(rel, SegmentRelation::Overlap);
    }

    #[test]
    fn shared_endpoint_is_a_point() {
        let rel = segment_segment_relation_2d(
            &p(0.0, 0.0),
            &p(1.0, 0.0),
            &p(1.0, 0.0),
            &p(1.0, 1.0),
            1e-9,
        );
        assert!(matches!(rel, SegmentRelation::Point { t, .. } if (t - 1.0).abs() < 1e-9));
    }
}
