use thiserror::Error;

/// Top-level error type for the cfdprep kernel and pipeline.
#[derive(Debug, Error)]
pub enum CfdPrepError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Lid(#[from] LidError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to topological operations.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("wire is not closed")]
    WireNotClosed,

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to CAD operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),

    /// A boolean operation left no material behind.
    #[error("boolean operation produced an empty result")]
    EmptyResult,
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("invalid tessellation parameters: {0}")]
    InvalidParameters(String),

    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Errors raised while importing a STEP exchange file.
///
/// An import either yields exactly one root solid or one of these errors;
/// nothing is left behind in the topology store on failure.
#[derive(Debug, Error)]
pub enum ImportError {
    /// I/O error while reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected character or malformed token.
    #[error("lexer error at line {line}, column {col}: {message}")]
    Lexer {
        line: usize,
        col: usize,
        message: String,
    },

    /// Unexpected token or malformed entity structure.
    #[error("parser error{}: {message}", .entity_id.map(|id| format!(" at entity #{id}")).unwrap_or_default())]
    Parser {
        entity_id: Option<u64>,
        message: String,
    },

    #[error("missing entity reference: #{0}")]
    MissingEntity(u64),

    #[error("unsupported entity type: {0}")]
    UnsupportedEntity(String),

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// The file contains no solid body.
    #[error("no solids found in STEP data")]
    NoSolids,

    /// The input is empty.
    #[error("empty STEP input")]
    Empty,
}

impl ImportError {
    /// Creates a lexer error.
    pub fn lexer(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self::Lexer {
            line,
            col,
            message: message.into(),
        }
    }

    /// Creates a parser error.
    pub fn parser(entity_id: Option<u64>, message: impl Into<String>) -> Self {
        Self::Parser {
            entity_id,
            message: message.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Per-face failures of lid synthesis.
///
/// These never abort sibling faces; they are collected and handed back to
/// the caller alongside the lids that did succeed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LidError {
    /// The face has no usable boundary (missing, empty or open outer wire).
    #[error("degenerate face: {0}")]
    DegenerateFace(String),

    /// The boundary points do not define a plane (near-collinear).
    #[error("plane fit failed: {0}")]
    PlaneFit(String),

    /// The projected boundary does not close within tolerance.
    #[error("projected wire has a gap of {gap:e}, tolerance is {tolerance:e}")]
    Projection { gap: f64, tolerance: f64 },

    /// The projected boundary self-intersects or encloses no area.
    #[error("invalid wire: {0}")]
    InvalidWire(String),

    /// Any other kernel failure while building the lid.
    #[error("kernel failure: {0}")]
    Kernel(String),
}

impl From<CfdPrepError> for LidError {
    fn from(err: CfdPrepError) -> Self {
        match err {
            CfdPrepError::Lid(lid) => lid,
            other => Self::Kernel(other.to_string()),
        }
    }
}

impl From<TopologyError> for LidError {
    fn from(err: TopologyError) -> Self {
        Self::Kernel(err.to_string())
    }
}

/// Pipeline-level failures. Each of these aborts the current run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("import failed: {0}")]
    Import(#[from] ImportError),

    /// Nothing was selected, so there is nothing to close.
    #[error("no faces selected")]
    NoSelection,

    /// Faces were selected but every lid failed to build.
    #[error("all {failed} selected faces failed lid synthesis")]
    NoLids { failed: usize },

    /// The lids do not overlap the solid: the selection encloses nothing.
    #[error("lids enclose no volume (contact volume {contact_volume:e})")]
    EmptyVolume { contact_volume: f64 },

    /// A pipeline step was invoked out of order.
    #[error("invalid pipeline stage: expected {expected}, currently {actual}")]
    InvalidStage {
        expected: &'static str,
        actual: &'static str,
    },

    /// The face does not belong to the imported root solid.
    #[error("face does not belong to the imported solid")]
    ForeignFace,

    #[error("kernel failure: {0}")]
    Kernel(Box<CfdPrepError>),
}

impl From<CfdPrepError> for PipelineError {
    fn from(err: CfdPrepError) -> Self {
        match err {
            CfdPrepError::Pipeline(pipeline) => pipeline,
            CfdPrepError::Import(import) => Self::Import(import),
            other => Self::Kernel(Box::new(other)),
        }
    }
}

impl From<TopologyError> for PipelineError {
    fn from(err: TopologyError) -> Self {
        Self::Kernel(Box::new(err.into()))
    }
}

impl From<OperationError> for PipelineError {
    fn from(err: OperationError) -> Self {
        Self::Kernel(Box::new(err.into()))
    }
}

/// Convenience type alias for results using [`CfdPrepError`].
pub type Result<T> = std::result::Result<T, CfdPrepError>;
