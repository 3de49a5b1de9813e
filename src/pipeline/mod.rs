//! The CFD preprocessing pipeline: import a solid, select the faces that
//! close its openings, build lids and extract the enclosed volume.

mod config;
mod extract;
mod run;
mod scene;
mod selection;

pub use config::{ExtractionMode, PipelineConfig};
pub use extract::{extract_volume, fold_union, InternalVolume};
pub use run::PipelineRun;
pub use scene::{NullSink, RecordingSink, Scene, SceneSink, Stage};
pub use selection::{FacePicker, Ray, RayPicker, Selection};
