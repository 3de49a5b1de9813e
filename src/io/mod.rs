pub mod step;

pub use step::{import_step, import_step_file, ImportStep};
