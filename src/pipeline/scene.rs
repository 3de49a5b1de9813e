//! Publishing the authoritative shape list to a renderer.

use std::fmt;

use crate::topology::Shape;

/// Where a pipeline run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing imported yet.
    Empty,
    Imported,
    /// Between `begin_selection` and `end_selection`.
    Selecting,
    Selected,
    LidsBuilt,
    Extracted,
}

impl Stage {
    /// Lower-case name used in errors and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Imported => "imported",
            Self::Selecting => "selecting",
            Self::Selected => "selected",
            Self::LidsBuilt => "lids built",
            Self::Extracted => "extracted",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shapes a renderer should show after a stage completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub stage: Stage,
    pub shapes: Vec<Shape>,
}

/// Receives a new scene after import, lid synthesis and extraction.
pub trait SceneSink {
    fn publish(&mut self, scene: &Scene);
}

/// Discards every scene.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SceneSink for NullSink {
    fn publish(&mut self, _scene: &Scene) {}
}

/// Keeps every published scene, oldest first.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub scenes: Vec<Scene>,
}

impl RecordingSink {
    /// The most recently published scene.
    #[must_use]
    pub fn last(&self) -> Option<&Scene> {
        self.scenes.last()
    }
}

impl SceneSink for RecordingSink {
    fn publish(&mut self, scene: &Scene) {
        self.scenes.push(scene.clone());
    }
}

impl<S: SceneSink + ?Sized> SceneSink for &mut S {
    fn publish(&mut self, scene: &Scene) {
        (**self).publish(scene);
    }
}
