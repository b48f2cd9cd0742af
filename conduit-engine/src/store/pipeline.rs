//! Pipeline collection

use conduit_core::domain::pipeline::{Pipeline, PipelineStatus};
use conduit_core::dto::pipeline::{NewPipeline, PipelineUpdate};
use tracing::debug;

use super::{Store, lock, next_id};

impl Store {
    /// Adds a pipeline at the front of the collection and returns it
    pub fn add_pipeline(&self, new: NewPipeline) -> Pipeline {
        let mut pipelines = lock(&self.pipelines);
        let id = next_id(pipelines.iter().map(|p| p.id));
        let pipeline = new.into_pipeline(id);
        pipelines.insert(0, pipeline.clone());

        debug!("Pipeline added: {} ({})", pipeline.name, pipeline.id);

        pipeline
    }

    /// Merges `update` into the pipeline with this id
    ///
    /// Returns the updated pipeline, or `None` (and changes nothing) when
    /// the id is not present.
    pub fn update_pipeline(&self, id: u64, update: &PipelineUpdate) -> Option<Pipeline> {
        let mut pipelines = lock(&self.pipelines);
        let pipeline = pipelines.iter_mut().find(|p| p.id == id)?;
        update.apply_to(pipeline);

        debug!("Pipeline updated: {} ({})", pipeline.name, pipeline.id);

        Some(pipeline.clone())
    }

    /// Merges `update` only while the pipeline is still in `status`
    ///
    /// `None` when the id is not present, `Some(Err(current))` when the
    /// pipeline has moved to another status and was left untouched.
    pub fn update_pipeline_in_status(
        &self,
        id: u64,
        status: PipelineStatus,
        update: &PipelineUpdate,
    ) -> Option<std::result::Result<Pipeline, PipelineStatus>> {
        let mut pipelines = lock(&self.pipelines);
        let pipeline = pipelines.iter_mut().find(|p| p.id == id)?;
        if pipeline.status != status {
            return Some(Err(pipeline.status));
        }
        update.apply_to(pipeline);

        debug!("Pipeline updated: {} ({})", pipeline.name, pipeline.id);

        Some(Ok(pipeline.clone()))
    }

    /// Removes the pipeline with this id, returning it if it existed
    pub fn delete_pipeline(&self, id: u64) -> Option<Pipeline> {
        let mut pipelines = lock(&self.pipelines);
        let index = pipelines.iter().position(|p| p.id == id)?;
        let removed = pipelines.remove(index);

        debug!("Pipeline deleted: {} ({})", removed.name, removed.id);

        Some(removed)
    }

    pub fn get_pipeline(&self, id: u64) -> Option<Pipeline> {
        lock(&self.pipelines).iter().find(|p| p.id == id).cloned()
    }

    /// First pipeline (newest first) matching the predicate
    pub fn find_pipeline(&self, predicate: impl Fn(&Pipeline) -> bool) -> Option<Pipeline> {
        lock(&self.pipelines).iter().find(|p| predicate(p)).cloned()
    }

    /// Snapshot of all pipelines, newest first
    pub fn list_pipelines(&self) -> Vec<Pipeline> {
        lock(&self.pipelines).clone()
    }

    pub fn list_pipelines_by_status(&self, status: PipelineStatus) -> Vec<Pipeline> {
        lock(&self.pipelines)
            .iter()
            .filter(|p| p.status == status)
            .cloned()
            .collect()
    }

    /// Applies `update` to every pipeline currently in `status`
    ///
    /// Selection and update happen under one lock, so a completion firing
    /// concurrently cannot slip in between.
    pub fn update_pipelines_with_status(
        &self,
        status: PipelineStatus,
        update: &PipelineUpdate,
    ) -> Vec<Pipeline> {
        let mut pipelines = lock(&self.pipelines);
        pipelines
            .iter_mut()
            .filter(|p| p.status == status)
            .map(|p| {
                update.apply_to(p);
                p.clone()
            })
            .collect()
    }
}
