//! Typed views of the STEP entities the importer understands.
//!
//! Each `parse_*` function checks the entity type and extracts its
//! arguments; geometry is converted to kernel types here, topology is left
//! as entity ids for the reader to resolve.

use crate::error::ImportError;
use crate::geometry::curve::Circle;
use crate::geometry::surface::{Cylinder, Plane};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::parser::{StepEntity, StepFile, StepValue};

/// Argument accessors that report the entity on failure.
pub trait EntityArgs {
    /// A required real argument.
    ///
    /// # Errors
    ///
    /// Returns a parser error if the argument is missing or not numeric.
    fn real(&self, idx: usize) -> Result<f64, ImportError>;

    /// A required boolean (`.T.`/`.F.`) argument.
    ///
    /// # Errors
    ///
    /// Returns a parser error if the argument is missing or not a logical.
    fn logical(&self, idx: usize) -> Result<bool, ImportError>;

    /// A required entity reference.
    ///
    /// # Errors
    ///
    /// Returns a parser error if the argument is missing or not a reference.
    fn entity_ref(&self, idx: usize) -> Result<u64, ImportError>;

    /// A list of reals.
    ///
    /// # Errors
    ///
    /// Returns a parser error if the argument is not a list of numbers.
    fn real_list(&self, idx: usize) -> Result<Vec<f64>, ImportError>;

    /// A list of entity references.
    ///
    /// # Errors
    ///
    /// Returns a parser error if the argument is not a list of references.
    fn entity_ref_list(&self, idx: usize) -> Result<Vec<u64>, ImportError>;

    /// `true` if the argument is `$` or absent.
    fn is_null(&self, idx: usize) -> bool;
}

impl StepEntity {
    fn arg_error(&self, idx: usize, expected: &str) -> ImportError {
        ImportError::parser(
            Some(self.id),
            format!("expected {expected} at argument {idx} of {}", self.type_name),
        )
    }

    fn list(&self, idx: usize) -> Result<&[StepValue], ImportError> {
        self.args
            .get(idx)
            .and_then(StepValue::as_list)
            .ok_or_else(|| self.arg_error(idx, "list"))
    }
}

impl EntityArgs for StepEntity {
    fn real(&self, idx: usize) -> Result<f64, ImportError> {
        self.args
            .get(idx)
            .and_then(StepValue::as_real)
            .ok_or_else(|| self.arg_error(idx, "real"))
    }

    fn logical(&self, idx: usize) -> Result<bool, ImportError> {
        match self.args.get(idx).and_then(StepValue::as_enum) {
            Some("T") => Ok(true),
            Some("F") => Ok(false),
            _ => Err(self.arg_error(idx, "logical")),
        }
    }

    fn entity_ref(&self, idx: usize) -> Result<u64, ImportError> {
        self.args
            .get(idx)
            .and_then(StepValue::as_entity_ref)
            .ok_or_else(|| self.arg_error(idx, "entity reference"))
    }

    fn real_list(&self, idx: usize) -> Result<Vec<f64>, ImportError> {
        self.list(idx)?
            .iter()
            .map(|v| v.as_real().ok_or_else(|| self.arg_error(idx, "list of reals")))
            .collect()
    }

    fn entity_ref_list(&self, idx: usize) -> Result<Vec<u64>, ImportError> {
        self.list(idx)?
            .iter()
            .map(|v| {
                v.as_entity_ref()
                    .ok_or_else(|| self.arg_error(idx, "list of references"))
            })
            .collect()
    }

    fn is_null(&self, idx: usize) -> bool {
        self.args.get(idx).is_none_or(StepValue::is_null)
    }
}

/// Fetches an entity and checks its type against `expected`.
fn require_typed<'a>(
    file: &'a StepFile,
    id: u64,
    expected: &[&str],
) -> Result<&'a StepEntity, ImportError> {
    let entity = file.require(id)?;
    if expected.contains(&entity.type_name.as_str()) {
        Ok(entity)
    } else {
        Err(ImportError::type_mismatch(expected.join(" | "), &entity.type_name))
    }
}

fn invalid_geometry(id: u64, err: impl std::fmt::Display) -> ImportError {
    ImportError::InvalidGeometry(format!("#{id}: {err}"))
}

// ── geometry ──

/// `CARTESIAN_POINT(name, (x, y, z))`.
///
/// # Errors
///
/// Returns an error for a wrong entity type or fewer than three coordinates.
pub fn parse_cartesian_point(file: &StepFile, id: u64) -> Result<Point3, ImportError> {
    let entity = require_typed(file, id, &["CARTESIAN_POINT"])?;
    match entity.real_list(1)?.as_slice() {
        [x, y, z, ..] => Ok(Point3::new(*x, *y, *z)),
        coords => Err(ImportError::parser(
            Some(id),
            format!("CARTESIAN_POINT needs 3 coordinates, got {}", coords.len()),
        )),
    }
}

/// `DIRECTION(name, (x, y, z))`, normalized.
///
/// # Errors
///
/// Returns an error for a wrong entity type, missing components or a
/// zero-length direction.
pub fn parse_direction(file: &StepFile, id: u64) -> Result<Vector3, ImportError> {
    let entity = require_typed(file, id, &["DIRECTION"])?;
    let v = match entity.real_list(1)?.as_slice() {
        [x, y, z, ..] => Vector3::new(*x, *y, *z),
        coords => {
            return Err(ImportError::parser(
                Some(id),
                format!("DIRECTION needs 3 components, got {}", coords.len()),
            ));
        }
    };
    let len = v.norm();
    if len < TOLERANCE {
        return Err(invalid_geometry(id, "zero-length direction"));
    }
    Ok(v / len)
}

/// `VECTOR(name, direction, magnitude)`.
///
/// # Errors
///
/// Returns an error for a wrong entity type or a zero vector.
pub fn parse_vector(file: &StepFile, id: u64) -> Result<Vector3, ImportError> {
    let entity = require_typed(file, id, &["VECTOR"])?;
    let direction = parse_direction(file, entity.entity_ref(1)?)?;
    let magnitude = entity.real(2)?;
    if magnitude.abs() < TOLERANCE {
        return Err(invalid_geometry(id, "zero-length vector"));
    }
    Ok(direction * magnitude)
}

/// A right-handed placement: location, `z` axis and reference `x` axis.
#[derive(Debug, Clone)]
pub struct Placement {
    pub location: Point3,
    pub axis: Vector3,
    pub ref_direction: Vector3,
}

/// `AXIS2_PLACEMENT_3D(name, location, axis, ref_direction)`.
///
/// Missing directions default to `+z` and an arbitrary perpendicular; the
/// reference direction is made perpendicular to the axis.
///
/// # Errors
///
/// Returns an error for a wrong entity type or a reference direction
/// parallel to the axis.
pub fn parse_axis2_placement_3d(file: &StepFile, id: u64) -> Result<Placement, ImportError> {
    let entity = require_typed(file, id, &["AXIS2_PLACEMENT_3D"])?;
    let location = parse_cartesian_point(file, entity.entity_ref(1)?)?;
    let axis = if entity.is_null(2) {
        Vector3::z()
    } else {
        parse_direction(file, entity.entity_ref(2)?)?
    };
    let reference = if entity.is_null(3) {
        if axis.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        }
    } else {
        parse_direction(file, entity.entity_ref(3)?)?
    };
    let ref_direction = reference - axis * reference.dot(&axis);
    let len = ref_direction.norm();
    if len < TOLERANCE {
        return Err(invalid_geometry(id, "reference direction is parallel to the axis"));
    }
    Ok(Placement {
        location,
        axis,
        ref_direction: ref_direction / len,
    })
}

/// Curve geometry of an edge.
#[derive(Debug, Clone)]
pub enum StepCurve {
    /// Straight line; edge geometry follows from its vertices.
    Line,
    Circle(Circle),
}

/// `LINE(name, point, vector)` or `CIRCLE(name, placement, radius)`.
///
/// # Errors
///
/// Returns [`ImportError::UnsupportedEntity`] for any other curve type, or an
/// error for malformed geometry.
pub fn parse_curve(file: &StepFile, id: u64) -> Result<StepCurve, ImportError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "LINE" => {
            parse_cartesian_point(file, entity.entity_ref(1)?)?;
            parse_vector(file, entity.entity_ref(2)?)?;
            Ok(StepCurve::Line)
        }
        "CIRCLE" => {
            let placement = parse_axis2_placement_3d(file, entity.entity_ref(1)?)?;
            let radius = entity.real(2)?;
            Circle::new(placement.location, radius, placement.axis, placement.ref_direction)
                .map(StepCurve::Circle)
                .map_err(|e| invalid_geometry(id, e))
        }
        other => Err(ImportError::UnsupportedEntity(other.to_owned())),
    }
}

/// Surface geometry of a face.
#[derive(Debug, Clone)]
pub enum StepSurface {
    Plane(Plane),
    Cylinder(Cylinder),
}

/// `PLANE(name, placement)` or `CYLINDRICAL_SURFACE(name, placement, radius)`.
///
/// # Errors
///
/// Returns [`ImportError::UnsupportedEntity`] for any other surface type, or
/// an error for malformed geometry.
pub fn parse_surface(file: &StepFile, id: u64) -> Result<StepSurface, ImportError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "PLANE" => {
            let placement = parse_axis2_placement_3d(file, entity.entity_ref(1)?)?;
            Plane::from_normal_and_ref(placement.location, placement.axis, placement.ref_direction)
                .map(StepSurface::Plane)
                .map_err(|e| invalid_geometry(id, e))
        }
        "CYLINDRICAL_SURFACE" => {
            let placement = parse_axis2_placement_3d(file, entity.entity_ref(1)?)?;
            let radius = entity.real(2)?;
            Cylinder::new(placement.location, radius, placement.axis, placement.ref_direction)
                .map(StepSurface::Cylinder)
                .map_err(|e| invalid_geometry(id, e))
        }
        other => Err(ImportError::UnsupportedEntity(other.to_owned())),
    }
}

// ── topology ──

/// `VERTEX_POINT(name, point)`.
///
/// # Errors
///
/// Returns an error for a wrong entity type or a malformed point.
pub fn parse_vertex_point(file: &StepFile, id: u64) -> Result<Point3, ImportError> {
    let entity = require_typed(file, id, &["VERTEX_POINT"])?;
    parse_cartesian_point(file, entity.entity_ref(1)?)
}

/// `EDGE_CURVE(name, start, end, curve, same_sense)`.
#[derive(Debug, Clone)]
pub struct StepEdge {
    pub start_vertex: u64,
    pub end_vertex: u64,
    pub curve: u64,
    /// Whether the curve runs from `start_vertex` to `end_vertex`.
    pub same_sense: bool,
}

/// Parses an `EDGE_CURVE`.
///
/// # Errors
///
/// Returns an error for a wrong entity type or malformed arguments.
pub fn parse_edge_curve(file: &StepFile, id: u64) -> Result<StepEdge, ImportError> {
    let entity = require_typed(file, id, &["EDGE_CURVE"])?;
    Ok(StepEdge {
        start_vertex: entity.entity_ref(1)?,
        end_vertex: entity.entity_ref(2)?,
        curve: entity.entity_ref(3)?,
        same_sense: entity.logical(4)?,
    })
}

/// `ORIENTED_EDGE(name, *, *, edge, orientation)` as `(edge, orientation)`.
///
/// # Errors
///
/// Returns an error for a wrong entity type or malformed arguments.
pub fn parse_oriented_edge(file: &StepFile, id: u64) -> Result<(u64, bool), ImportError> {
    let entity = require_typed(file, id, &["ORIENTED_EDGE"])?;
    Ok((entity.entity_ref(3)?, entity.logical(4)?))
}

/// `EDGE_LOOP(name, (oriented_edges))`.
///
/// # Errors
///
/// Returns an error for a wrong entity type or malformed arguments.
pub fn parse_edge_loop(file: &StepFile, id: u64) -> Result<Vec<u64>, ImportError> {
    let entity = require_typed(file, id, &["EDGE_LOOP"])?;
    entity.entity_ref_list(1)
}

/// `FACE_BOUND` / `FACE_OUTER_BOUND(name, loop, orientation)`.
#[derive(Debug, Clone)]
pub struct StepFaceBound {
    pub edge_loop: u64,
    /// `false` when the loop must be traversed in reverse.
    pub orientation: bool,
    pub is_outer: bool,
}

/// Parses a face bound.
///
/// # Errors
///
/// Returns an error for a wrong entity type or malformed arguments.
pub fn parse_face_bound(file: &StepFile, id: u64) -> Result<StepFaceBound, ImportError> {
    let entity = require_typed(file, id, &["FACE_BOUND", "FACE_OUTER_BOUND"])?;
    Ok(StepFaceBound {
        edge_loop: entity.entity_ref(1)?,
        orientation: entity.logical(2)?,
        is_outer: entity.type_name == "FACE_OUTER_BOUND",
    })
}

/// `ADVANCED_FACE` / `FACE_SURFACE(name, (bounds), surface, same_sense)`.
#[derive(Debug, Clone)]
pub struct StepFace {
    pub bounds: Vec<StepFaceBound>,
    pub surface: u64,
    pub same_sense: bool,
}

/// Parses a face.
///
/// # Errors
///
/// Returns an error for a wrong entity type or malformed arguments.
pub fn parse_face(file: &StepFile, id: u64) -> Result<StepFace, ImportError> {
    let entity = require_typed(file, id, &["ADVANCED_FACE", "FACE_SURFACE"])?;
    let bounds = entity
        .entity_ref_list(1)?
        .into_iter()
        .map(|bound| parse_face_bound(file, bound))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(StepFace {
        bounds,
        surface: entity.entity_ref(2)?,
        same_sense: entity.logical(3)?,
    })
}

/// `CLOSED_SHELL(name, (faces))`.
///
/// # Errors
///
/// Returns [`ImportError::InvalidTopology`] for an `OPEN_SHELL`, or an error
/// for any other entity type.
pub fn parse_closed_shell(file: &StepFile, id: u64) -> Result<Vec<u64>, ImportError> {
    let entity = require_typed(file, id, &["CLOSED_SHELL", "OPEN_SHELL"])?;
    if entity.type_name == "OPEN_SHELL" {
        return Err(ImportError::InvalidTopology(format!(
            "#{id}: an open shell does not bound a solid"
        )));
    }
    entity.entity_ref_list(1)
}

/// `MANIFOLD_SOLID_BREP(name, outer_shell)`, returning the shell id.
///
/// # Errors
///
/// Returns an error for a wrong entity type or malformed arguments.
pub fn parse_manifold_solid_brep(file: &StepFile, id: u64) -> Result<u64, ImportError> {
    let entity = require_typed(file, id, &["MANIFOLD_SOLID_BREP"])?;
    entity.entity_ref(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::io::step::parser::Parser;

    fn file(data: &str) -> StepFile {
        let text = format!("ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n{data}\nENDSEC;\nEND-ISO-10303-21;\n");
        Parser::parse(text.as_bytes()).unwrap()
    }

    #[test]
    fn direction_is_normalized() {
        let f = file("#1 = DIRECTION('', (0.0, 3.0, 4.0));");
        let d = parse_direction(&f, 1).unwrap();
        approx::assert_relative_eq!(d, Vector3::new(0.0, 0.6, 0.8), epsilon = 1e-12);
    }

    #[test]
    fn zero_direction_is_invalid_geometry() {
        let f = file("#1 = DIRECTION('', (0.0, 0.0, 0.0));");
        assert!(matches!(parse_direction(&f, 1), Err(ImportError::InvalidGeometry(_))));
    }

    #[test]
    fn placement_orthogonalizes_reference() {
        let f = file(
            "#1 = CARTESIAN_POINT('', (1.0, 2.0, 3.0));\n\
             #2 = DIRECTION('', (0.0, 0.0, 1.0));\n\
             #3 = DIRECTION('', (1.0, 0.0, 0.1));\n\
             #4 = AXIS2_PLACEMENT_3D('', #1, #2, #3);",
        );
        let placement = parse_axis2_placement_3d(&f, 4).unwrap();
        assert!(placement.ref_direction.dot(&placement.axis).abs() < 1e-12);
        approx::assert_relative_eq!(placement.ref_direction, Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn placement_defaults_missing_directions() {
        let f = file(
            "#1 = CARTESIAN_POINT('', (0.0, 0.0, 0.0));\n#4 = AXIS2_PLACEMENT_3D('', #1, $, $);",
        );
        let placement = parse_axis2_placement_3d(&f, 4).unwrap();
        approx::assert_relative_eq!(placement.axis, Vector3::z());
        approx::assert_relative_eq!(placement.ref_direction, Vector3::x());
    }

    #[test]
    fn type_mismatch_names_both_types() {
        let f = file("#1 = DIRECTION('', (1.0, 0.0, 0.0));");
        let err = parse_cartesian_point(&f, 1).unwrap_err();
        assert!(
            matches!(&err, ImportError::TypeMismatch { expected, actual }
                if expected == "CARTESIAN_POINT" && actual == "DIRECTION"),
            "{err:?}"
        );
    }

    #[test]
    fn unsupported_surface_is_reported() {
        let f = file(
            "#1 = CARTESIAN_POINT('', (0.0, 0.0, 0.0));\n\
             #2 = AXIS2_PLACEMENT_3D('', #1, $, $);\n\
             #3 = SPHERICAL_SURFACE('', #2, 5.0);",
        );
        assert!(matches!(
            parse_surface(&f, 3),
            Err(ImportError::UnsupportedEntity(name)) if name == "SPHERICAL_SURFACE"
        ));
    }

    #[test]
    fn open_shell_is_not_a_solid() {
        let f = file("#1 = OPEN_SHELL('', (#2));");
        assert!(matches!(parse_closed_shell(&f, 1), Err(ImportError::InvalidTopology(_))));
    }

    #[test]
    fn missing_reference_is_reported() {
        let f = file("#1 = VERTEX_POINT('', #99);");
        assert!(matches!(parse_vertex_point(&f, 1), Err(ImportError::MissingEntity(99))));
    }
}
