//! Specification acquisition and normalization
//!
//! - [`fetcher`] retrieves raw documents over HTTP or from disk
//! - [`repair`] patches known malformations in place
//! - [`convert`] turns Swagger 2.0 into OpenAPI 3.0
//! - [`normalizer`] sequences the above and validates the result

pub mod convert;
pub mod fetcher;
pub mod normalizer;
pub mod repair;

pub use convert::{BuiltinConverter, SwaggerConverter};
pub use fetcher::{CompositeSpecFetcher, FileSpecFetcher, HttpSpecFetcher, SpecFetcher};
pub use normalizer::{SchemaNormalizer, validate_openapi, validate_raw};
pub use repair::{DefaultRepairs, SpecRepair};
