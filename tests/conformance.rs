//! End-to-end scenarios against [`ValidationEngine`], one per seed
//! scenario laid out for the test suite (`spec.md` §8 "Concrete
//! scenarios").
use rdap_conformance_core::config::QueryConfig;
use rdap_conformance_core::dataset::{names, FrozenDatasetService, SetDataset};
use rdap_conformance_core::engine::{STRUCTURE_INVALID_CODE, ValidationEngine};
use rdap_conformance_core::http::{HttpContext, HttpResponseSnapshot};
use rdap_conformance_core::profile::checks::cors::{CorsCheck, CORS_MISSING_WILDCARD_CODE};
use rdap_conformance_core::profile::checks::handle::{HandleCheck, HANDLE_FORMAT_CODE};
use rdap_conformance_core::profile::checks::label_consistency::{
    LabelConsistencyCheck, LABEL_CONSISTENCY_CODE,
};
use rdap_conformance_core::profile::registry::CheckRegistry;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use url::Url;

fn domain_schema() -> BTreeMap<String, Value> {
    let mut resources = BTreeMap::new();
    resources.insert(
        "domain.json".to_string(),
        json!({
            "type": "object",
            "required": ["ldhName"],
            "properties": {
                "ldhName": {"type": "string", "errorCode": -10405, "duplicateKeys": -13100}
            }
        }),
    );
    resources
}

fn permissive_schema() -> BTreeMap<String, Value> {
    let mut resources = BTreeMap::new();
    resources.insert(
        "domain.json".to_string(),
        json!({
            "type": "object",
            "properties": {
                "ldhName": {"type": "string"},
                "unicodeName": {"type": "string"},
                "handle": {"type": "string"}
            }
        }),
    );
    resources
}

fn domain_config(uri: &str) -> QueryConfig {
    QueryConfig::new(Url::parse(uri).unwrap()).unwrap()
}

/// Scenario 1: duplicate `ldhName` key yields one result coded by the
/// `duplicateKeys` annotation on `ldhName`, value `ldhName:a.example`.
#[test]
fn duplicate_key_scenario() {
    let engine = ValidationEngine::new(domain_schema(), "domain.json").unwrap();
    let config = domain_config("https://rdap.example/domain/example.com");
    let datasets = FrozenDatasetService::new();
    let (ok, results) = engine.validate(
        r#"{"ldhName":"a.example","ldhName":"b.example"}"#,
        &config,
        &datasets,
        None,
    );
    assert!(!ok);
    assert_eq!(results.len(), 1);
    let result = results.iter().next().unwrap();
    assert_eq!(result.code, -13100);
    assert_eq!(result.value, "ldhName:a.example");
}

/// Scenario 2: malformed JSON (no duplicate key) yields the
/// `structureInvalid` code with a message ending in the fixed phrase.
#[test]
fn malformed_json_scenario() {
    let engine = ValidationEngine::new(domain_schema(), "domain.json").unwrap();
    let config = domain_config("https://rdap.example/domain/example.com");
    let datasets = FrozenDatasetService::new();
    let (ok, results) = engine.validate("{not json", &config, &datasets, None);
    assert!(!ok);
    assert_eq!(results.len(), 1);
    let result = results.iter().next().unwrap();
    assert_eq!(result.code, STRUCTURE_INVALID_CODE);
    assert!(result.message.ends_with("structure is not syntactically valid."));
}

/// Scenario 3: an A-label query URI whose document has no `ldhName`
/// yields the label-consistency code with the profile's exact wording.
#[test]
fn missing_ldh_name_with_a_label_uri_scenario() {
    let engine = ValidationEngine::new(permissive_schema(), "domain.json")
        .unwrap()
        .with_checks(CheckRegistry::new(vec![Box::new(LabelConsistencyCheck)]));
    let config = domain_config("http://example/test.xn--viagnie-eya.example");
    let datasets = FrozenDatasetService::new();
    let (ok, results) = engine.validate("{}", &config, &datasets, None);
    assert!(!ok);
    assert_eq!(results.len(), 1);
    let result = results.iter().next().unwrap();
    assert_eq!(result.code, LABEL_CONSISTENCY_CODE);
    assert!(result
        .message
        .contains("The RDAP Query URI contains only A-label or NR-LDH labels"));
}

/// Scenario 4: a redirect chain whose first hop allows any origin but
/// whose second drops the header yields exactly one CORS result keyed
/// to the second response's header dump.
#[test]
fn missing_cors_header_on_redirect_chain_scenario() {
    let engine = ValidationEngine::new(permissive_schema(), "domain.json")
        .unwrap()
        .with_checks(CheckRegistry::new(vec![Box::new(CorsCheck)]));
    let config = domain_config("https://rdap.example/domain/example.com");
    let datasets = FrozenDatasetService::new();

    let mut first_headers = BTreeMap::new();
    first_headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
    let first = HttpResponseSnapshot {
        url: "https://rdap.example/1".to_string(),
        status: 301,
        headers: first_headers,
    };
    let second = HttpResponseSnapshot {
        url: "https://rdap.example/2".to_string(),
        status: 200,
        headers: BTreeMap::new(),
    };
    let http = HttpContext {
        chain: vec![first, second.clone()],
    };

    let (ok, results) = engine.validate("{}", &config, &datasets, Some(&http));
    assert!(!ok);
    assert_eq!(results.len(), 1);
    let result = results.iter().next().unwrap();
    assert_eq!(result.code, CORS_MISSING_WILDCARD_CODE);
    assert_eq!(result.value, second.to_string());
}

/// Scenario 5: a handle with no hyphen fails the format check; the
/// ROID lookup is never attempted, so only one result is produced.
#[test]
fn bad_handle_scenario() {
    let engine = ValidationEngine::new(permissive_schema(), "domain.json")
        .unwrap()
        .with_checks(CheckRegistry::new(vec![Box::new(HandleCheck)]));
    let config = domain_config("https://rdap.example/domain/example.com");
    let datasets =
        FrozenDatasetService::new().with_dataset(names::EPP_ROID, SetDataset::new(["BADROID"]));
    let (ok, results) = engine.validate(r#"{"handle":"ABCDEF"}"#, &config, &datasets, None);
    assert!(!ok);
    assert_eq!(results.len(), 1);
    assert_eq!(results.iter().next().unwrap().code, HANDLE_FORMAT_CODE);
}

/// Scenario 6: a well-formed handle whose ROID is flagged invalid by
/// the dataset yields exactly one result at `code - 1`.
#[test]
fn unknown_roid_scenario() {
    let engine = ValidationEngine::new(permissive_schema(), "domain.json")
        .unwrap()
        .with_checks(CheckRegistry::new(vec![Box::new(HandleCheck)]));
    let config = domain_config("https://rdap.example/domain/example.com");
    let datasets =
        FrozenDatasetService::new().with_dataset(names::EPP_ROID, SetDataset::new(["BADROID"]));
    let (ok, results) = engine.validate(r#"{"handle":"ABC-BADROID"}"#, &config, &datasets, None);
    assert!(!ok);
    assert_eq!(results.len(), 1);
    assert_eq!(results.iter().next().unwrap().code, HANDLE_FORMAT_CODE - 1);
}
