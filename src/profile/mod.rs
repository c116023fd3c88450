//! The Profile Check Framework and Registry.
//!
//! Each check is a small value object consulted with the document, the
//! query configuration, the dataset service, and (when relevant) the
//! HTTP redirect chain — never with each other's results, so checks
//! run independently in registration order.
pub mod checks;
pub mod registry;

use crate::config::QueryConfig;
use crate::dataset::DatasetService;
use crate::http::HttpContext;
use crate::pointer::JsonPointer;
use crate::result::ResultsAccumulator;
use serde_json::Value;

/// Everything a [`ProfileCheck`] may consult. Borrowed for the
/// duration of one run; nothing here is mutated by a check.
pub struct CheckContext<'a> {
    pub document: &'a Value,
    pub config: &'a QueryConfig,
    pub datasets: &'a dyn DatasetService,
    pub http: Option<&'a HttpContext>,
}

/// One TIG / Response Profile rule.
pub trait ProfileCheck: Send + Sync {
    /// Identifier for logging and test aggregation.
    fn group_name(&self) -> &str;

    /// Gate: does this check apply to the current query type? Default
    /// is always-true.
    fn do_launch(&self, _ctx: &CheckContext<'_>) -> bool {
        true
    }

    /// Run the check, appending any findings to `results`. Returns
    /// `true` iff no new result was produced by this invocation.
    fn do_validate(&self, ctx: &CheckContext<'_>, results: &mut ResultsAccumulator) -> bool;
}

/// Recursively collect every `(pointer, value)` pair whose object key
/// is `key`, depth-first, skipping the `vcardArray` property — the
/// same hard-coded exclusion the schema tree walk uses, since a vCard
/// array can itself contain nested arrays/objects that are not RDAP
/// object members and would otherwise be walked pointlessly.
pub fn find_all_instances_of<'a>(document: &'a Value, key: &str) -> Vec<(JsonPointer, &'a Value)> {
    let mut out = Vec::new();
    collect_instances(document, key, &JsonPointer::root(), &mut out);
    out
}

fn collect_instances<'a>(
    value: &'a Value,
    key: &str,
    pointer: &JsonPointer,
    out: &mut Vec<(JsonPointer, &'a Value)>,
) {
    match value {
        Value::Object(map) => {
            for (member_key, member_value) in map {
                if member_key == crate::schema::VCARD_ARRAY_PROPERTY {
                    continue;
                }
                let member_pointer = pointer.child(member_key.as_str());
                if member_key == key {
                    out.push((member_pointer.clone(), member_value));
                }
                collect_instances(member_value, key, &member_pointer, out);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_instances(item, key, &pointer.child(index), out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_every_nested_handle() {
        let document = json!({
            "handle": "TOP-1",
            "entities": [{"handle": "ENT-2"}]
        });
        let found = find_all_instances_of(&document, "handle");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn does_not_descend_into_vcard_array() {
        let document = json!({
            "vcardArray": ["vcard", [["handle", {}, "text", "should-not-be-found"]]]
        });
        let found = find_all_instances_of(&document, "handle");
        assert!(found.is_empty());
    }
}
