//! JSON Schema side: field classification, document locations and the store.
pub mod kind;
pub mod location;
pub mod store;

pub use kind::{classify, FieldKind};
pub use location::Location;
pub use store::{Field, PropertySet, SchemaDocument, SchemaStore, MAX_REFERENCE_HOPS};
