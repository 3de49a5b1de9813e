use std::path::Path;

use tracing::{debug, info};

use crate::error::PipelineError;
use crate::io::step::{import_step, import_step_file};
use crate::operations::lid::{LidSynthesis, SynthesizeLid};
use crate::topology::{FaceId, Shape, SolidId, TopologyStore};

use super::config::PipelineConfig;
use super::extract::{extract_volume, InternalVolume};
use super::scene::{NullSink, Scene, SceneSink, Stage};
use super::selection::{FacePicker, Ray, Selection};

/// One run of the preprocessing pipeline.
///
/// The run owns its topology store exclusively. Stages advance strictly in
/// order: import, selection, lid synthesis, extraction. Selection may be
/// reopened and lids rebuilt until a volume has been extracted.
pub struct PipelineRun<S: SceneSink = NullSink> {
    config: PipelineConfig,
    store: TopologyStore,
    sink: S,
    stage: Stage,
    root: Option<SolidId>,
    selection: Selection,
    lids: LidSynthesis,
    result: Option<InternalVolume>,
}

impl PipelineRun<NullSink> {
    /// Creates a run that publishes nowhere.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Kernel`] if the configuration is invalid.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::with_sink(config, NullSink)
    }
}

impl<S: SceneSink> PipelineRun<S> {
    /// Creates a run that publishes scenes to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Kernel`] if the configuration is invalid.
    pub fn with_sink(config: PipelineConfig, sink: S) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            config,
            store: TopologyStore::new(),
            sink,
            stage: Stage::Empty,
            root: None,
            selection: Selection::default(),
            lids: LidSynthesis::default(),
            result: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &TopologyStore {
        &self.store
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The imported solid, once there is one.
    #[must_use]
    pub fn root(&self) -> Option<SolidId> {
        self.root
    }

    #[must_use]
    pub fn selection(&self) -> &[FaceId] {
        self.selection.faces()
    }

    /// Lids and per-face failures of the last lid synthesis.
    #[must_use]
    pub fn lids(&self) -> &LidSynthesis {
        &self.lids
    }

    #[must_use]
    pub fn result(&self) -> Option<&InternalVolume> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    // --- Import ---

    /// Imports the root solid from STEP data.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidStage`] if a solid was already
    /// imported, or [`PipelineError::Import`] if the data is rejected.
    pub fn import_step(&mut self, data: &[u8]) -> Result<SolidId, PipelineError> {
        self.expect_stage(&[Stage::Empty], "empty")?;
        let root = import_step(data, &mut self.store)?;
        self.imported(root)
    }

    /// Imports the root solid from a STEP file.
    ///
    /// # Errors
    ///
    /// See [`PipelineRun::import_step`].
    pub fn import_step_file(&mut self, path: impl AsRef<Path>) -> Result<SolidId, PipelineError> {
        self.expect_stage(&[Stage::Empty], "empty")?;
        let root = import_step_file(path, &mut self.store)?;
        self.imported(root)
    }

    fn imported(&mut self, root: SolidId) -> Result<SolidId, PipelineError> {
        self.root = Some(root);
        self.stage = Stage::Imported;
        let faces = self.store.solid_faces(root)?.len();
        info!(faces, "root solid imported");
        self.publish(vec![Shape::Solid(root)]);
        Ok(root)
    }

    // --- Selection ---

    /// Opens the selection. A previous selection is kept and can be edited.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidStage`] before import, while already
    /// selecting, or after extraction.
    pub fn begin_selection(&mut self) -> Result<(), PipelineError> {
        self.expect_stage(
            &[Stage::Imported, Stage::Selected, Stage::LidsBuilt],
            "imported",
        )?;
        self.stage = Stage::Selecting;
        debug!(selected = self.selection.len(), "selection opened");
        Ok(())
    }

    /// Selects the face hit by `ray`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidStage`] outside selection, or
    /// [`PipelineError::Kernel`] if picking fails.
    pub fn pick(&mut self, picker: &impl FacePicker, ray: &Ray) -> Result<Option<FaceId>, PipelineError> {
        self.expect_stage(&[Stage::Selecting], "selecting")?;
        let root = self.require_root()?;
        let Some(face) = picker.pick_face(&self.store, root, ray)? else {
            debug!(?ray, "pick missed");
            return Ok(None);
        };
        self.select_face(face)?;
        Ok(Some(face))
    }

    /// Adds a face of the root solid to the selection. Selecting a face
    /// twice has no further effect; returns whether the face was new.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidStage`] outside selection, or
    /// [`PipelineError::ForeignFace`] for a face not on the root solid.
    pub fn select_face(&mut self, face: FaceId) -> Result<bool, PipelineError> {
        self.expect_stage(&[Stage::Selecting], "selecting")?;
        let root = self.require_root()?;
        if !self.store.solid_has_face(root, face)? {
            return Err(PipelineError::ForeignFace);
        }
        let added = self.selection.insert(face);
        debug!(?face, added, "face selected");
        Ok(added)
    }

    /// Removes a face from the selection; returns whether it was selected.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidStage`] outside selection.
    pub fn deselect_face(&mut self, face: FaceId) -> Result<bool, PipelineError> {
        self.expect_stage(&[Stage::Selecting], "selecting")?;
        Ok(self.selection.remove(face))
    }

    /// Closes the selection and returns it in selection order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidStage`] outside selection.
    pub fn end_selection(&mut self) -> Result<&[FaceId], PipelineError> {
        self.expect_stage(&[Stage::Selecting], "selecting")?;
        self.stage = Stage::Selected;
        info!(selected = self.selection.len(), "selection closed");
        Ok(self.selection.faces())
    }

    // --- Lids ---

    /// Builds one lid per selected face, replacing lids of an earlier call.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidStage`] before the selection is
    /// closed, [`PipelineError::NoSelection`] for an empty selection,
    /// [`PipelineError::NoLids`] when every face failed, or
    /// [`PipelineError::Kernel`] for a kernel failure outside any one face.
    pub fn synthesize_lids(&mut self) -> Result<&LidSynthesis, PipelineError> {
        self.expect_stage(&[Stage::Selected, Stage::LidsBuilt], "selected")?;
        let root = self.require_root()?;
        if self.selection.is_empty() {
            return Err(PipelineError::NoSelection);
        }

        self.release_lids()?;
        self.stage = Stage::Selected;

        let synthesis = SynthesizeLid::new(root, self.selection.faces())
            .with_params(self.config.lid_params())
            .execute(&mut self.store)?;
        if synthesis.lids.is_empty() {
            let failed = synthesis.failures.len();
            self.lids = synthesis;
            return Err(PipelineError::NoLids { failed });
        }

        let mut shapes = vec![Shape::Solid(root)];
        shapes.extend(synthesis.lids.iter().map(|lid| Shape::Solid(lid.solid)));
        self.lids = synthesis;
        self.stage = Stage::LidsBuilt;
        self.publish(shapes);
        Ok(&self.lids)
    }

    /// Removes the lid solids and lid faces of the last synthesis.
    fn release_lids(&mut self) -> Result<(), PipelineError> {
        let previous = std::mem::take(&mut self.lids);
        for lid in &previous.lids {
            self.store.remove_solid(lid.solid)?;
            self.store.remove_face(lid.lid_face)?;
        }
        if !previous.lids.is_empty() {
            debug!(removed = previous.lids.len(), "previous lids released");
        }
        Ok(())
    }

    // --- Extraction ---

    /// Extracts the internal volume closed by the lids.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidStage`] before lids exist,
    /// [`PipelineError::EmptyVolume`] when the lids enclose nothing, or
    /// [`PipelineError::Kernel`] for a failed boolean.
    pub fn extract_volume(&mut self) -> Result<&InternalVolume, PipelineError> {
        self.expect_stage(&[Stage::LidsBuilt], "lids built")?;
        let root = self.require_root()?;
        let lid_solids: Vec<SolidId> = self.lids.lids.iter().map(|lid| lid.solid).collect();

        let volume = extract_volume(&mut self.store, root, &lid_solids, &self.config)?;
        self.stage = Stage::Extracted;
        self.publish(vec![Shape::Solid(volume.solid)]);
        Ok(self.result.insert(volume))
    }

    /// Runs every stage: import, select the faces hit by `rays`, build lids
    /// and extract the volume.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage.
    pub fn run(
        &mut self,
        data: &[u8],
        picker: &impl FacePicker,
        rays: &[Ray],
    ) -> Result<&InternalVolume, PipelineError> {
        self.import_step(data)?;
        self.begin_selection()?;
        for ray in rays {
            self.pick(picker, ray)?;
        }
        self.end_selection()?;
        self.synthesize_lids()?;
        self.extract_volume()
    }

    /// Ends the run, releasing every shape it created.
    pub fn discard(self) {
        debug!(stage = %self.stage, "pipeline run discarded");
    }

    fn require_root(&self) -> Result<SolidId, PipelineError> {
        self.root.ok_or(PipelineError::InvalidStage {
            expected: "imported",
            actual: self.stage.as_str(),
        })
    }

    fn expect_stage(&self, allowed: &[Stage], expected: &'static str) -> Result<(), PipelineError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(PipelineError::InvalidStage {
                expected,
                actual: self.stage.as_str(),
            })
        }
    }

    fn publish(&mut self, shapes: Vec<Shape>) {
        self.sink.publish(&Scene {
            stage: self.stage,
            shapes,
        });
    }
}
