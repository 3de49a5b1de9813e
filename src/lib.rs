pub mod error;
pub mod geometry;
pub mod io;
pub mod math;
pub mod operations;
pub mod pipeline;
pub mod tessellation;
pub mod topology;

pub use error::{CfdPrepError, ImportError, LidError, PipelineError, Result};
pub use pipeline::{PipelineConfig, PipelineRun};
