//! `rdapConformance` presence/placement: the root object must carry
//! `rdapConformance`; the same key on a non-root object is a
//! misplacement.
use crate::profile::{find_all_instances_of, CheckContext, ProfileCheck};
use crate::result::{ResultsAccumulator, ValidationResult};

pub const RDAP_CONFORMANCE_MISSING_CODE: i32 = -10100;
pub const RDAP_CONFORMANCE_MISPLACED_CODE: i32 = -10101;

pub struct RdapConformanceCheck;

impl ProfileCheck for RdapConformanceCheck {
    fn group_name(&self) -> &str {
        "tigRdapConformance"
    }

    fn do_validate(&self, ctx: &CheckContext<'_>, results: &mut ResultsAccumulator) -> bool {
        let before = results.len();
        if ctx.document.get("rdapConformance").is_none() {
            results.push(ValidationResult::new(
                RDAP_CONFORMANCE_MISSING_CODE,
                "null",
                "the top-most object does not contain an rdapConformance member".to_string(),
            ));
        }
        for (pointer, _) in find_all_instances_of(ctx.document, "rdapConformance") {
            if pointer.chunks().len() != 1 {
                results.push(ValidationResult::new(
                    RDAP_CONFORMANCE_MISPLACED_CODE,
                    pointer.to_string(),
                    format!("rdapConformance at {} must only appear on the topmost object", pointer),
                ));
            }
        }
        results.len() == before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;
    use crate::dataset::FrozenDatasetService;
    use serde_json::json;
    use url::Url;

    fn config() -> QueryConfig {
        QueryConfig::new(Url::parse("https://rdap.example/domain/example.com").unwrap()).unwrap()
    }

    #[test]
    fn missing_on_root_is_reported() {
        let document = json!({});
        let datasets = FrozenDatasetService::new();
        let cfg = config();
        let ctx = CheckContext {
            document: &document,
            config: &cfg,
            datasets: &datasets,
            http: None,
        };
        let mut results = ResultsAccumulator::new();
        RdapConformanceCheck.do_validate(&ctx, &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results.iter().next().unwrap().code, RDAP_CONFORMANCE_MISSING_CODE);
    }

    #[test]
    fn misplaced_on_nested_object_is_reported() {
        let document = json!({
            "rdapConformance": ["rdap_level_0"],
            "entities": [{"rdapConformance": ["rdap_level_0"]}]
        });
        let datasets = FrozenDatasetService::new();
        let cfg = config();
        let ctx = CheckContext {
            document: &document,
            config: &cfg,
            datasets: &datasets,
            http: None,
        };
        let mut results = ResultsAccumulator::new();
        RdapConformanceCheck.do_validate(&ctx, &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results.iter().next().unwrap().code, RDAP_CONFORMANCE_MISPLACED_CODE);
    }
}
