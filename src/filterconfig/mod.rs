//! Runtime-configuration document construction. `spec.md` §4.6.

mod builder;
mod cel;
mod checksum;
mod document;
mod error;

pub use builder::FilterConfigBuilder;
pub use checksum::digest;
pub use document::{
    AuthLiteral, BackendEntry, FilterConfigDocument, HeaderMatchEntry, RuleBackendRef, RuleEntry,
    SchemaField,
};
pub use error::FilterConfigError;
