use std::sync::Arc;

use crate::datastore::Datastore;
use crate::pipeline::image::ImageStage;
use crate::pipeline::styles::StyleCatalog;

/// Everything the orchestrator needs, injected explicitly so tests can
/// substitute any collaborator. No ambient singletons.
pub struct PipelineDeps {
    pub store: Arc<dyn Datastore>,
    pub image_stage: ImageStage,
    /// `None` when the catalog file could not be loaded at startup; the
    /// composer then runs in minimal-prompt mode.
    pub catalog: Option<StyleCatalog>,
}
