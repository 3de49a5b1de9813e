use tracing::{debug, info, warn};

use crate::error::{LidError, Result};
use crate::math::polygon_3d::polygon_centroid_3d;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::operations::query::{classify_point_in_mesh, Aabb, BoundaryWire, PointClassification};
use crate::operations::shaping::Extrude;
use crate::tessellation::{TessellateSolid, TriangleMesh};
use crate::topology::{FaceId, SolidId, TopologyStore};

use super::{DeterminePlane, FittedPlane, LidDirection, LidParams, MakeLidFace, ProjectWire};

/// Fraction of the solid's bounding-box diagonal used as probe offset.
const PROBE_FRACTION: f64 = 1e-3;

/// How the extrusion side of a lid was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignEvidence {
    /// Exactly one of the two probe points lies inside the solid.
    Probe,
    /// The probes were inconclusive; the side opposite the face's outward
    /// normal was taken.
    FaceOrientation,
}

/// A thin solid closing one selected face.
#[derive(Debug, Clone)]
pub struct Lid {
    /// The selected face of the root solid.
    pub face: FaceId,
    /// Position of `face` in the selection.
    pub selection_index: usize,
    /// The extruded lid.
    pub solid: SolidId,
    /// The planar face the lid was extruded from.
    pub lid_face: FaceId,
    pub plane: FittedPlane,
    /// Unit extrusion direction.
    pub direction: Vector3,
    pub evidence: SignEvidence,
}

/// A selected face for which no lid could be built.
#[derive(Debug, Clone, PartialEq)]
pub struct LidFailure {
    pub index: usize,
    pub face: FaceId,
    pub error: LidError,
}

/// Outcome of lid synthesis: one entry per selected face, in either list.
#[derive(Debug, Clone, Default)]
pub struct LidSynthesis {
    pub lids: Vec<Lid>,
    pub failures: Vec<LidFailure>,
}

/// Synthesizes one lid per selected face of a solid.
///
/// Faces are processed in selection order. A face that fails is recorded as
/// a [`LidFailure`] and never stops the remaining faces.
pub struct SynthesizeLid<'a> {
    solid: SolidId,
    faces: &'a [FaceId],
    params: LidParams,
}

impl<'a> SynthesizeLid<'a> {
    /// Creates a new `SynthesizeLid` operation.
    #[must_use]
    pub fn new(solid: SolidId, faces: &'a [FaceId]) -> Self {
        Self {
            solid,
            faces,
            params: LidParams::default(),
        }
    }

    /// Sets the lid parameters.
    #[must_use]
    pub fn with_params(mut self, params: LidParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the synthesis.
    ///
    /// # Errors
    ///
    /// Returns an error only for invalid parameters or a root solid that
    /// cannot be read; per-face problems end up in
    /// [`LidSynthesis::failures`].
    pub fn execute(&self, store: &mut TopologyStore) -> Result<LidSynthesis> {
        self.params.validate()?;
        let mesh = TessellateSolid::new(self.solid, self.params.tessellation).execute(store)?;
        let diagonal = Aabb::from_points(&mesh.vertices).map_or(0.0, |aabb| aabb.diagonal());
        let probe_offset = (diagonal * PROBE_FRACTION)
            .min(0.5 * self.params.distance)
            .max(self.params.heal_tolerance);
        let probe = Probe {
            mesh: &mesh,
            offset: probe_offset,
        };

        let mut synthesis = LidSynthesis::default();
        for (index, &face) in self.faces.iter().enumerate() {
            match self.build_lid(store, &probe, index, face) {
                Ok(lid) => {
                    debug!(index, ?face, evidence = ?lid.evidence, "lid built");
                    synthesis.lids.push(lid);
                }
                Err(error) => {
                    warn!(index, ?face, %error, "lid synthesis failed");
                    synthesis.failures.push(LidFailure { index, face, error });
                }
            }
        }

        info!(
            lids = synthesis.lids.len(),
            failures = synthesis.failures.len(),
            "lid synthesis finished"
        );
        Ok(synthesis)
    }

    fn build_lid(
        &self,
        store: &mut TopologyStore,
        probe: &Probe<'_>,
        index: usize,
        face: FaceId,
    ) -> std::result::Result<Lid, LidError> {
        let params = &self.params;
        let chain = BoundaryWire::new(face, params.tessellation)
            .execute(store)
            .map_err(|e| LidError::DegenerateFace(e.to_string()))?;
        let samples: Vec<Point3> = chain.iter().flat_map(|edge| edge.points.iter().copied()).collect();

        let fitted = DeterminePlane::new(face, &samples)
            .with_tolerance(params.plane_fit_tolerance)
            .execute(store)?;
        let polygon = ProjectWire::new(&chain, &fitted.plane)
            .with_tolerance(params.heal_tolerance)
            .execute()?;
        let lid_face = MakeLidFace::new(&polygon, &fitted.plane)
            .with_tolerance(params.heal_tolerance)
            .execute(store)?;

        let centroid = polygon_centroid_3d(&polygon, &fitted.plane);
        let normal = *fitted.plane.plane_normal();
        let resolved = match probe.inward(&centroid, &normal) {
            Some(direction) => Ok((direction, SignEvidence::Probe)),
            None => against_outward_normal(store, face, &centroid, &normal)
                .map(|direction| (direction, SignEvidence::FaceOrientation)),
        };
        let (inward, evidence) = match resolved {
            Ok(resolved) => resolved,
            Err(error) => {
                store.remove_face(lid_face)?;
                return Err(error);
            }
        };
        let direction = match params.direction {
            LidDirection::Inward => inward,
            LidDirection::Outward => -inward,
        };

        let solid = match Extrude::new(lid_face, direction * params.distance)
            .with_params(params.tessellation)
            .execute(store)
        {
            Ok(solid) => solid,
            Err(error) => {
                store.remove_face(lid_face)?;
                return Err(error.into());
            }
        };

        Ok(Lid {
            face,
            selection_index: index,
            solid,
            lid_face,
            plane: fitted,
            direction,
            evidence,
        })
    }
}

/// Point-in-solid probes on both sides of a lid plane.
struct Probe<'a> {
    mesh: &'a TriangleMesh,
    offset: f64,
}

impl Probe<'_> {
    /// `±normal`, whichever side of `centroid` lies inside the solid, or
    /// `None` when both or neither do.
    fn inward(&self, centroid: &Point3, normal: &Vector3) -> Option<Vector3> {
        let inside = |p: Point3| {
            classify_point_in_mesh(&p, self.mesh, TOLERANCE * 1e3) == PointClassification::Inside
        };
        let front = inside(centroid + normal * self.offset);
        let back = inside(centroid - normal * self.offset);
        match (front, back) {
            (true, false) => Some(*normal),
            (false, true) => Some(-normal),
            _ => None,
        }
    }
}

/// `±normal`, pointing against the face's outward normal near `point`.
fn against_outward_normal(
    store: &TopologyStore,
    face: FaceId,
    point: &Point3,
    normal: &Vector3,
) -> std::result::Result<Vector3, LidError> {
    let outward = store.face(face)?.normal_at(point);
    Ok(if outward.dot(normal) > 0.0 { -normal } else { *normal })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::surface::Plane;
    use crate::operations::creation::{MakeBox, MakeWire};
    use crate::operations::query::Volume;
    use crate::topology::{FaceData, FaceSurface};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn cube(store: &mut TopologyStore) -> (SolidId, Vec<FaceId>) {
        let solid = MakeBox::new(Point3::origin(), p(10.0, 10.0, 10.0))
            .execute(store)
            .unwrap();
        let faces = store.solid_faces(solid).unwrap();
        (solid, faces)
    }

    fn face_with_normal(store: &TopologyStore, faces: &[FaceId], n: Vector3) -> FaceId {
        *faces
            .iter()
            .find(|&&f| (store.face(f).unwrap().planar_normal().unwrap() - n).norm() < 1e-9)
            .unwrap()
    }

    // ── sign resolution ──

    #[test]
    fn top_lid_extrudes_inward() {
        let mut store = TopologyStore::new();
        let (solid, faces) = cube(&mut store);
        let top = face_with_normal(&store, &faces, Vector3::z());
        let synthesis = SynthesizeLid::new(solid, &[top]).execute(&mut store).unwrap();
        assert!(synthesis.failures.is_empty());
        let lid = &synthesis.lids[0];
        assert_eq!(lid.evidence, SignEvidence::Probe);
        assert!((lid.direction + Vector3::z()).norm() < 1e-12);
        let volume = Volume::new(lid.solid).execute(&store).unwrap();
        approx::assert_relative_eq!(volume, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn every_cube_face_points_inward() {
        let mut store = TopologyStore::new();
        let (solid, faces) = cube(&mut store);
        let synthesis = SynthesizeLid::new(solid, &faces).execute(&mut store).unwrap();
        assert_eq!(synthesis.lids.len(), 6);
        for lid in &synthesis.lids {
            let outward = store.face(lid.face).unwrap().planar_normal().unwrap();
            assert!((lid.direction + outward).norm() < 1e-12);
        }
    }

    #[test]
    fn outward_direction_flips_the_lid() {
        let mut store = TopologyStore::new();
        let (solid, faces) = cube(&mut store);
        let top = face_with_normal(&store, &faces, Vector3::z());
        let params = LidParams::default().with_direction(LidDirection::Outward);
        let synthesis = SynthesizeLid::new(solid, &[top])
            .with_params(params)
            .execute(&mut store)
            .unwrap();
        assert!((synthesis.lids[0].direction - Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn inconclusive_probe_falls_back_to_face_orientation() {
        let mut store = TopologyStore::new();
        let (_, faces) = cube(&mut store);
        let top = face_with_normal(&store, &faces, Vector3::z());
        let empty = TriangleMesh::default();
        let probe = Probe {
            mesh: &empty,
            offset: 0.01,
        };
        let centroid = p(5.0, 5.0, 10.0);
        assert!(probe.inward(&centroid, &Vector3::z()).is_none());
        let direction = against_outward_normal(&store, top, &centroid, &Vector3::z()).unwrap();
        assert!((direction + Vector3::z()).norm() < 1e-12);
        let direction = against_outward_normal(&store, top, &centroid, &-Vector3::z()).unwrap();
        assert!((direction + Vector3::z()).norm() < 1e-12);
    }

    // ── failures ──

    #[test]
    fn open_boundary_fails_alone() {
        let mut store = TopologyStore::new();
        let (solid, faces) = cube(&mut store);
        let top = face_with_normal(&store, &faces, Vector3::z());
        let open = MakeWire::new(vec![p(0.0, 0.0, 20.0), p(1.0, 0.0, 20.0), p(1.0, 1.0, 20.0)], false)
            .execute(&mut store)
            .unwrap();
        let loose = store.add_face(FaceData {
            surface: FaceSurface::Plane(Plane::from_normal(p(0.0, 0.0, 20.0), Vector3::z()).unwrap()),
            outer_wire: open,
            inner_wires: vec![],
            same_sense: true,
        });

        let synthesis = SynthesizeLid::new(solid, &[loose, top]).execute(&mut store).unwrap();
        assert_eq!(synthesis.lids.len(), 1);
        assert_eq!(synthesis.lids[0].selection_index, 1);
        assert_eq!(synthesis.failures.len(), 1);
        assert_eq!(synthesis.failures[0].index, 0);
        assert!(matches!(synthesis.failures[0].error, LidError::DegenerateFace(_)));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let mut store = TopologyStore::new();
        let (solid, faces) = cube(&mut store);
        let params = LidParams::default().with_distance(0.0);
        assert!(SynthesizeLid::new(solid, &faces)
            .with_params(params)
            .execute(&mut store)
            .is_err());
    }
}
