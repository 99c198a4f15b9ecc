//! JSON Schema → Hive table definitions for `org.openx.data.jsonserde.JsonSerDe`.
//!
//! Schemas are loaded once into a [`schema::SchemaStore`], then each top-level
//! document is lowered by [`generator::Generator`] into a `CREATE TABLE` statement.
pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod generator;
pub mod hql;
pub mod pipeline;
pub mod schema;

pub use config::GenerationConfig;
pub use error::{Error, Result};
pub use generator::Generator;
