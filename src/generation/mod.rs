//! Generation pipeline - turns configurations into generated SDK directories
//!
//! The orchestrator drives each configuration through fetch, normalization,
//! output reconciliation and finally an [`EmissionEngine`].

pub mod orchestrator;
pub mod traits;

pub use orchestrator::{GenerationOrchestrator, GenerationReport};
pub use traits::EmissionEngine;
