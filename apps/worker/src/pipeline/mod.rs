// The per-entry processing pipeline:
// profile → synthesizer → (styles → composer → image) → persist,
// driven by the orchestrator. All external calls go through the injected
// trait objects in `PipelineDeps`.

pub mod composer;
pub mod image;
pub mod orchestrator;
pub mod persist;
pub mod profile;
pub mod prompts;
pub mod styles;
pub mod synthesizer;
