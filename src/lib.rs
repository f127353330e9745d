//! Generate TypeScript client SDKs from Swagger 2.0 and OpenAPI 3.x documents.
//!
//! [`generation::GenerationOrchestrator`] is the entry point: it resolves
//! configurations, fetches and normalizes each document, clears stale output
//! and hands the result to an [`generation::EmissionEngine`].
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod generation;
pub mod generator;
pub mod openapi;
pub mod output;

pub use config::{CliConfig, ConfigSource};
pub use crate::core::{Error, Result};
pub use generation::{EmissionEngine, GenerationOrchestrator, GenerationReport};
pub use generator::ServiceGenerator;
