//! STEP (ISO 10303-21) import.
//!
//! Supports the B-rep subset needed for analytic solids: planar and
//! cylindrical faces bounded by lines and circles.

pub mod entities;
pub mod lexer;
pub mod parser;
mod reader;

pub use reader::{import_step, import_step_file, ImportStep};
