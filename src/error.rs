//! Fatal engine faults.
//!
//! Everything here is a construction-time error: a corrupt schema
//! resource, an unresolvable `$ref`, a null root schema. Validation
//! findings and schema-authoring inconsistencies are never represented
//! as `EngineError` — those become [`crate::result::ValidationResult`]
//! entries instead, so `ValidationEngine` should never be constructible
//! in an invalid state but `validate()` itself is infallible once
//! construction has succeeded.
use thiserror::Error;

/// Errors that can occur while building a [`crate::schema::SchemaTree`]
/// or assembling a [`crate::engine::ValidationEngine`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// The schema resource handed to the engine is not valid JSON.
    #[error("schema resource '{name}' is not valid JSON: {source}")]
    MalformedSchema {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    /// The root schema passed to the tree builder was `null` or absent
    /// entirely; an engine cannot be built without a root node.
    #[error("root schema must not be null")]
    NullRootSchema,
    /// A `$ref` could not be resolved against the supplied schema
    /// resources.
    #[error("unresolved $ref '{reference}' in schema '{schema_name}'")]
    UnresolvedReference {
        schema_name: String,
        reference: String,
    },
    /// A named schema resource was referenced but never supplied to
    /// the engine.
    #[error("unknown schema resource '{0}'")]
    UnknownSchemaResource(String),
}
