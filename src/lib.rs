//! # rdap-conformance-core
//!
//! Validates RDAP (Registration Data Access Protocol) responses
//! against ICANN's RDAP Technical Implementation Guide and Response
//! Profile, plus generic JSON Schema conformance, producing
//! ICANN-numbered [`result::ValidationResult`]s.
//!
//! This crate is the validation engine only: fetching RDAP responses
//! over HTTP, refreshing reference datasets, a CLI, and report
//! serialization all live outside it — callers hand in already-loaded
//! schema text, an already-fetched document body, and dataset
//! predicates, then get back a [`result::ResultsAccumulator`] of
//! coded findings.
//!
//! ## Example
//!
//! ```rust
//! use rdap_conformance_core::config::QueryConfig;
//! use rdap_conformance_core::dataset::FrozenDatasetService;
//! use rdap_conformance_core::engine::{EngineOptions, ValidationEngine};
//! use serde_json::json;
//! use std::collections::BTreeMap;
//! use url::Url;
//!
//! let mut resources = BTreeMap::new();
//! resources.insert(
//!     "domain.json".to_string(),
//!     json!({
//!         "type": "object",
//!         "required": ["ldhName"],
//!         "properties": {
//!             "ldhName": {"type": "string", "errorCode": -10405}
//!         }
//!     }),
//! );
//! // Profile checks (rdapConformance, links, ...) consult a fuller RDAP
//! // object than this illustration builds; disable them to show just
//! // the schema layer's "document satisfies the schema" outcome.
//! let engine = ValidationEngine::new(resources, "domain.json")
//!     .unwrap()
//!     .with_options(EngineOptions { run_profile_checks: false });
//! let config = QueryConfig::new(Url::parse("https://rdap.example/domain/example.com").unwrap()).unwrap();
//! let datasets = FrozenDatasetService::new();
//! let (ok, results) = engine.validate(r#"{"ldhName": "example.com"}"#, &config, &datasets, None);
//! assert!(ok);
//! assert!(results.is_empty());
//! ```
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod exception;
pub mod formats;
pub mod http;
pub mod parsers;
pub mod pointer;
pub mod profile;
pub mod result;
pub mod schema;
pub mod validate;

pub use engine::ValidationEngine;
pub use error::EngineError;
pub use result::{ResultsAccumulator, ValidationResult};
