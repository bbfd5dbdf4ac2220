//! Orchestration layer: Phase 1 selection, Phase 2 placement.

pub mod placer;
pub mod selection;

pub use placer::{determine_bucket, PlacerOrchestrator};
pub use selection::SelectionOrchestrator;
