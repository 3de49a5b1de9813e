use crate::math::polygon_3d::newell_normal;
use crate::math::{Point3, Vector3};

/// Distance below which a vertex counts as lying on a splitting plane.
pub(crate) const PLANE_EPSILON: f64 = 1e-6;

/// An oriented plane `normal · p = w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SplitPlane {
    pub normal: Vector3,
    pub w: f64,
}

impl SplitPlane {
    fn through(normal: Vector3, point: &Point3) -> Self {
        Self {
            normal,
            w: normal.dot(&point.coords),
        }
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    fn distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&point.coords) - self.w
    }
}

/// A convex planar polygon, counter-clockwise seen from the front of its plane.
#[derive(Debug, Clone)]
pub(crate) struct Polygon {
    pub vertices: Vec<Point3>,
    pub plane: SplitPlane,
}

impl Polygon {
    /// Builds a polygon, or `None` when the vertices enclose no area.
    pub fn new(vertices: Vec<Point3>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let normal = newell_normal(&vertices)?;
        let plane = SplitPlane::through(normal, &vertices[0]);
        Some(Self { vertices, plane })
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// Output buckets of [`split_polygon`].
#[derive(Default)]
struct SplitResult {
    coplanar_front: Vec<Polygon>,
    coplanar_back: Vec<Polygon>,
    front: Vec<Polygon>,
    back: Vec<Polygon>,
}

/// Splits `polygon` by `plane`. Coplanar polygons go to the front bucket
/// when they face the same way as the plane, otherwise to the back bucket.
fn split_polygon(plane: &SplitPlane, polygon: Polygon, out: &mut SplitResult) {
    let mut polygon_type = COPLANAR;
    let types: Vec<u8> = polygon
        .vertices
        .iter()
        .map(|v| {
            let t = plane.distance(v);
            let ty = if t < -PLANE_EPSILON {
                BACK
            } else if t > PLANE_EPSILON {
                FRONT
            } else {
                COPLANAR
            };
            polygon_type |= ty;
            ty
        })
        .collect();

    match polygon_type {
        COPLANAR => {
            if plane.normal.dot(&polygon.plane.normal) > 0.0 {
                out.coplanar_front.push(polygon);
            } else {
                out.coplanar_back.push(polygon);
            }
        }
        FRONT => out.front.push(polygon),
        BACK => out.back.push(polygon),
        _ => {
            let n = polygon.vertices.len();
            let mut f = Vec::with_capacity(n + 1);
            let mut b = Vec::with_capacity(n + 1);
            for i in 0..n {
                let j = (i + 1) % n;
                let (ti, tj) = (types[i], types[j]);
                let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                if ti != BACK {
                    f.push(vi);
                }
                if ti != FRONT {
                    b.push(vi);
                }
                if (ti | tj) == SPANNING {
                    let di = plane.distance(&vi);
                    let t = di / (di - plane.distance(&vj));
                    let v = vi + (vj - vi) * t;
                    f.push(v);
                    b.push(v);
                }
            }
            // Fragments keep the parent plane so slivers cannot drift.
            if f.len() >= 3 {
                out.front.push(Polygon {
                    vertices: f,
                    plane: polygon.plane,
                });
            }
            if b.len() >= 3 {
                out.back.push(Polygon {
                    vertices: b,
                    plane: polygon.plane,
                });
            }
        }
    }
}

/// A node of a solid BSP tree.
///
/// The polygons of a closed, outward-oriented surface build a tree whose
/// back half-spaces are the solid's interior.
#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    plane: Option<SplitPlane>,
    front: Option<Box<Node>>,
    back: Option<Box<Node>>,
    polygons: Vec<Polygon>,
}

impl Node {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let mut node = Self::default();
        node.build(polygons);
        node
    }

    /// Swaps solid space and empty space.
    pub fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Removes the parts of `polygons` that lie inside this tree's solid.
    fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = &self.plane else {
            return polygons;
        };
        let mut split = SplitResult::default();
        for polygon in polygons {
            split_polygon(plane, polygon, &mut split);
        }
        let mut front = split.front;
        front.append(&mut split.coplanar_front);
        let mut back = split.back;
        back.append(&mut split.coplanar_back);

        let mut result = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        if let Some(node) = &self.back {
            result.extend(node.clip_polygons(back));
        }
        result
    }

    /// Removes every polygon of this tree that lies inside `other`.
    pub fn clip_to(&mut self, other: &Node) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    /// All polygons of the tree.
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut Vec<Polygon>) {
        out.extend(self.polygons.iter().cloned());
        if let Some(front) = &self.front {
            front.collect_into(out);
        }
        if let Some(back) = &self.back {
            back.collect_into(out);
        }
    }

    /// Inserts polygons, extending the tree where needed.
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        if polygons.is_empty() {
            return;
        }
        let plane = *self.plane.get_or_insert(polygons[0].plane);
        let mut split = SplitResult::default();
        for polygon in polygons {
            split_polygon(&plane, polygon, &mut split);
        }
        self.polygons.append(&mut split.coplanar_front);
        self.polygons.append(&mut split.coplanar_back);
        if !split.front.is_empty() {
            self.front
                .get_or_insert_with(Box::default)
                .build(split.front);
        }
        if !split.back.is_empty() {
            self.back.get_or_insert_with(Box::default).build(split.back);
        }
    }
}

/// `a ∪ b` on polygon soups.
pub(crate) fn union(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.all_polygons());
    a.all_polygons()
}

/// `a − b` on polygon soups.
pub(crate) fn subtract(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}

/// `a ∩ b` on polygon soups.
pub(crate) fn intersect(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.invert();
    b.clip_to(&a);
    b.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}
