//! Notices/remarks description shape: each `notices[]`/`remarks[]`
//! entry's `description` must be a non-empty array of strings.
use crate::profile::{CheckContext, ProfileCheck};
use crate::result::{ResultsAccumulator, ValidationResult};
use serde_json::Value;

pub const NOTICE_DESCRIPTION_SHAPE_CODE: i32 = -10600;

pub struct NoticesCheck;

impl ProfileCheck for NoticesCheck {
    fn group_name(&self) -> &str {
        "responseProfileNoticesDescription"
    }

    fn do_validate(&self, ctx: &CheckContext<'_>, results: &mut ResultsAccumulator) -> bool {
        let before = results.len();
        for key in ["notices", "remarks"] {
            if let Some(Value::Array(entries)) = ctx.document.get(key) {
                for (index, entry) in entries.iter().enumerate() {
                    let shape_ok = match entry.get("description") {
                        Some(Value::Array(lines)) => {
                            !lines.is_empty() && lines.iter().all(Value::is_string)
                        }
                        _ => false,
                    };
                    if !shape_ok {
                        results.push(ValidationResult::new(
                            NOTICE_DESCRIPTION_SHAPE_CODE,
                            format!("/{}/{}/description", key, index),
                            format!(
                                "{}[{}].description must be a non-empty array of strings",
                                key, index
                            ),
                        ));
                    }
                }
            }
        }
        results.len() == before
    }
}
