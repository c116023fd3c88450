//! `ValidationEngine`: the driver that ties the schema tree, the
//! structural validator, the exception parsers, and the profile check
//! registry together (`spec.md` §4.4's single entry point plus the
//! component wiring of §2).
//!
//! Construction is the engine's only fallible surface (`EngineError`,
//! §7 category 3); `validate()` itself cannot fail once the engine
//! exists, matching "must not be constructible in an invalid state."
use crate::config::QueryConfig;
use crate::dataset::DatasetService;
use crate::error::EngineError;
use crate::http::HttpContext;
use crate::parsers::{ParserContext, ParserRegistry};
use crate::profile::registry::CheckRegistry;
use crate::profile::CheckContext;
use crate::result::{ResultsAccumulator, ValidationResult};
use crate::schema::query::search_bottom_most_error_code;
use crate::schema::SchemaTree;
use crate::validate::validate as validate_structurally;
use serde_json::Value;
use std::collections::BTreeMap;

/// Fallback code when a document is not well-formed JSON at all (no
/// duplicate key detected) — `spec.md` §4.4's "`structureInvalid`
/// code"; this crate does not vendor the full ICANN code list, so the
/// numeric value here is representative (see `DESIGN.md`).
pub const STRUCTURE_INVALID_CODE: i32 = -13001;

/// Toggles in the same spirit as the teacher's `CompilationOptions`:
/// which ambient layers of one `validate()` call actually run.
#[derive(Clone, Debug)]
pub struct EngineOptions {
    pub run_profile_checks: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            run_profile_checks: true,
        }
    }
}

pub struct ValidationEngine {
    tree: SchemaTree,
    resources: BTreeMap<String, Value>,
    root_resource: String,
    parsers: ParserRegistry,
    checks: CheckRegistry,
    options: EngineOptions,
}

impl ValidationEngine {
    pub fn new(
        resources: BTreeMap<String, Value>,
        root_resource: impl Into<String>,
    ) -> Result<Self, EngineError> {
        let root_resource = root_resource.into();
        let tree = SchemaTree::build(&resources, &root_resource)?;
        Ok(ValidationEngine {
            tree,
            resources,
            root_resource,
            parsers: ParserRegistry::default(),
            checks: CheckRegistry::default(),
            options: EngineOptions::default(),
        })
    }

    pub fn with_parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = parsers;
        self
    }

    pub fn with_checks(mut self, checks: CheckRegistry) -> Self {
        self.checks = checks;
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn tree(&self) -> &SchemaTree {
        &self.tree
    }

    /// `validate(documentText) -> bool` (§4.4), generalized to also
    /// return the accumulated results rather than just the pass/fail
    /// bit — callers that only want the boolean can ignore the
    /// accumulator.
    pub fn validate(
        &self,
        document_text: &str,
        config: &QueryConfig,
        datasets: &dyn DatasetService,
        http: Option<&HttpContext>,
    ) -> (bool, ResultsAccumulator) {
        let mut results = ResultsAccumulator::new();

        if let Some(duplicate) = find_duplicate_key(document_text) {
            let code = search_bottom_most_error_code(
                &self.tree,
                self.tree.root(),
                &duplicate.key,
                "duplicateKeys",
            )
            .map(|code| code as i32)
            .unwrap_or(ValidationResult::SCHEMA_BUG_CODE);
            results.push(ValidationResult::new(
                code,
                format!("{}:{}", duplicate.key, duplicate.value_excerpt),
                "document contains a duplicate object key",
            ));
            return (false, results);
        }

        let document: Value = match serde_json::from_str(document_text) {
            Ok(document) => document,
            Err(_) => {
                results.push(ValidationResult::new(
                    STRUCTURE_INVALID_CODE,
                    document_text,
                    "The RDAP response structure is not syntactically valid.",
                ));
                return (false, results);
            }
        };

        let exceptions = validate_structurally(&self.resources, &self.root_resource, &document);
        let structurally_valid = exceptions.is_empty();
        let parser_ctx = ParserContext {
            tree: &self.tree,
            instance: &document,
        };
        for exception in &exceptions {
            self.parsers.run(&parser_ctx, exception, &mut results);
        }

        if self.options.run_profile_checks {
            let check_ctx = CheckContext {
                document: &document,
                config,
                datasets,
                http,
            };
            self.checks.run(&check_ctx, &mut results);
        }

        (structurally_valid && results.is_empty(), results)
    }
}

pub struct DuplicateKey {
    pub key: String,
    pub value_excerpt: String,
}

enum Frame {
    Object(std::collections::HashMap<String, String>),
    Array,
}

/// A single forward scan for a repeated key within the same JSON
/// object, ahead of `serde_json` parsing (which silently keeps the
/// last occurrence and drops the rest). This is a small hand-rolled
/// scanner, not a parser replacement — object/array nesting and string
/// escaping are tracked just precisely enough to tell "is this
/// quoted token in key position" from "is this inside a string value
/// or a nested array", per §4.4's duplicate-key detection note.
///
/// The reported value is the *first* occurrence's value (`spec.md` §8
/// scenario 1: `ldhName:a.example`, not the second occurrence's
/// `b.example`), so each key's excerpt is captured the moment it is
/// first seen and only surfaced once a later occurrence collides.
pub fn find_duplicate_key(text: &str) -> Option<DuplicateKey> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    let mut stack: Vec<Frame> = Vec::new();
    let mut awaiting_key = false;

    while i < chars.len() {
        match chars[i] {
            '{' => {
                stack.push(Frame::Object(std::collections::HashMap::new()));
                awaiting_key = true;
                i += 1;
            }
            '}' => {
                stack.pop();
                awaiting_key = false;
                i += 1;
            }
            '[' => {
                stack.push(Frame::Array);
                awaiting_key = false;
                i += 1;
            }
            ']' => {
                stack.pop();
                awaiting_key = false;
                i += 1;
            }
            ',' => {
                awaiting_key = matches!(stack.last(), Some(Frame::Object(_)));
                i += 1;
            }
            '"' if awaiting_key => {
                let (key, next) = read_json_string(&chars, i);
                i = next;
                skip_whitespace(&chars, &mut i);
                if i < chars.len() && chars[i] == ':' {
                    i += 1;
                }
                awaiting_key = false;
                skip_whitespace(&chars, &mut i);
                let value_excerpt = read_value_excerpt(&chars, i, 40);
                if let Some(Frame::Object(seen)) = stack.last_mut() {
                    if let Some(first_excerpt) = seen.get(&key) {
                        return Some(DuplicateKey {
                            key,
                            value_excerpt: first_excerpt.clone(),
                        });
                    }
                    seen.insert(key, value_excerpt);
                }
            }
            '"' => {
                let (_, next) = read_json_string(&chars, i);
                i = next;
            }
            _ => {
                i += 1;
            }
        }
    }
    None
}

fn skip_whitespace(chars: &[char], i: &mut usize) {
    while *i < chars.len() && chars[*i].is_whitespace() {
        *i += 1;
    }
}

/// Read a JSON string literal starting at `chars[start] == '"'`,
/// returning its (minimally unescaped) content and the index just
/// past the closing quote.
fn read_json_string(chars: &[char], start: usize) -> (String, usize) {
    let mut i = start + 1;
    let mut out = String::new();
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                match chars[i + 1] {
                    '"' => out.push('"'),
                    '\\' => out.push('\\'),
                    other => out.push(other),
                }
                i += 2;
            }
            '"' => {
                i += 1;
                break;
            }
            ch => {
                out.push(ch);
                i += 1;
            }
        }
    }
    (out, i)
}

/// Capture a truncated excerpt of the value following a detected
/// duplicate key, for the diagnostic's `key:truncatedValue` shape. A
/// string value is unescaped and reported without its surrounding
/// quotes (`spec.md` §8 scenario 1: `ldhName:a.example`, not
/// `ldhName:"a.example"`); any other value shape is copied verbatim.
fn read_value_excerpt(chars: &[char], start: usize, max_len: usize) -> String {
    if chars.get(start) == Some(&'"') {
        let (text, _) = read_json_string(chars, start);
        return truncate(&text, max_len);
    }
    let mut i = start;
    let mut depth = 0i32;
    let mut out = String::new();
    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' if depth > 0 => depth -= 1,
            '}' | ']' => break,
            ',' if depth == 0 => break,
            _ => {}
        }
        out.push(ch);
        i += 1;
        if out.chars().count() >= max_len {
            out.push_str("...");
            return out;
        }
    }
    truncate(out.trim(), max_len)
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(max_len).collect();
        truncated.push_str("...");
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resources() -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        map.insert(
            "root.json".to_string(),
            json!({
                "type": "object",
                "required": ["ldhName"],
                "properties": {
                    "ldhName": {"type": "string", "errorCode": -10405, "duplicateKeys": -13100}
                }
            }),
        );
        map
    }

    #[test]
    fn duplicate_top_level_key_is_detected() {
        let text = r#"{"handle": "A-1", "handle": "B-2"}"#;
        let duplicate = find_duplicate_key(text).unwrap();
        assert_eq!(duplicate.key, "handle");
        assert!(duplicate.value_excerpt.contains("A-1"));
    }

    #[test]
    fn no_duplicate_in_well_formed_document() {
        let text = r#"{"a": 1, "b": {"a": 2}}"#;
        assert!(find_duplicate_key(text).is_none());
    }

    #[test]
    fn malformed_json_yields_structure_invalid() {
        use crate::dataset::FrozenDatasetService;
        use url::Url;

        let engine = ValidationEngine::new(resources(), "root.json").unwrap();
        let config =
            QueryConfig::new(Url::parse("https://rdap.example/domain/example.com").unwrap())
                .unwrap();
        let datasets = FrozenDatasetService::new();
        let (ok, results) = engine.validate("{not json", &config, &datasets, None);
        assert!(!ok);
        assert_eq!(results.iter().next().unwrap().code, STRUCTURE_INVALID_CODE);
    }

    #[test]
    fn duplicate_key_document_is_reported_without_structural_validation() {
        use crate::dataset::FrozenDatasetService;
        use url::Url;

        let engine = ValidationEngine::new(resources(), "root.json").unwrap();
        let config =
            QueryConfig::new(Url::parse("https://rdap.example/domain/example.com").unwrap())
                .unwrap();
        let datasets = FrozenDatasetService::new();
        let (ok, results) = engine.validate(
            r#"{"ldhName": "a", "ldhName": "b"}"#,
            &config,
            &datasets,
            None,
        );
        assert!(!ok);
        assert_eq!(results.len(), 1);
        assert_eq!(results.iter().next().unwrap().code, -13100);
    }

    #[test]
    fn valid_document_with_profile_checks_disabled_passes_on_structure_alone() {
        use crate::dataset::FrozenDatasetService;
        use url::Url;

        let engine = ValidationEngine::new(resources(), "root.json")
            .unwrap()
            .with_options(EngineOptions {
                run_profile_checks: false,
            });
        let config =
            QueryConfig::new(Url::parse("https://rdap.example/domain/example.com").unwrap())
                .unwrap();
        let datasets = FrozenDatasetService::new();
        let (ok, results) = engine.validate(r#"{"ldhName": "example.com"}"#, &config, &datasets, None);
        assert!(ok);
        assert!(results.is_empty());
    }
}
