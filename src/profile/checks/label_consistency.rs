//! Query-URI label consistency.
use crate::profile::{CheckContext, ProfileCheck};
use crate::result::{ResultsAccumulator, ValidationResult};

pub const LABEL_CONSISTENCY_CODE: i32 = -10400;

pub struct LabelConsistencyCheck;

impl ProfileCheck for LabelConsistencyCheck {
    fn group_name(&self) -> &str {
        "responseProfileLabelConsistency"
    }

    fn do_validate(&self, ctx: &CheckContext<'_>, results: &mut ResultsAccumulator) -> bool {
        let before = results.len();
        let Some(label) = ctx.config.query_label() else {
            return true;
        };
        let has_ldh_name = ctx
            .document
            .get("ldhName")
            .and_then(|v| v.as_str())
            .is_some();
        let has_unicode_name = ctx
            .document
            .get("unicodeName")
            .and_then(|v| v.as_str())
            .is_some();

        if is_a_label(label) && !has_ldh_name {
            results.push(ValidationResult::new(
                LABEL_CONSISTENCY_CODE,
                label,
                "The RDAP Query URI contains only A-label or NR-LDH labels, but the topmost object has no ldhName".to_string(),
            ));
        }
        if is_u_label(label) && !has_unicode_name {
            results.push(ValidationResult::new(
                LABEL_CONSISTENCY_CODE - 1,
                label,
                "The RDAP Query URI contains a U-label, but the topmost object has no unicodeName".to_string(),
            ));
        }
        results.len() == before
    }
}

fn is_a_label(label: &str) -> bool {
    label
        .split('.')
        .any(|part| part.starts_with("xn--"))
}

fn is_u_label(label: &str) -> bool {
    !label.is_ascii()
}
