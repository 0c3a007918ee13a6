//! Fingerprint construction: converts one preprocessed mono stream into the
//! compact triple of matrices described in the data model.

pub mod builder;
pub mod params;
pub mod types;

pub use builder::build_fingerprint;
pub use types::Fingerprint;
