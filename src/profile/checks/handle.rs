//! Handle format.
//!
//! Only gated on for `DOMAIN` queries — entity and nameserver handles
//! are governed by a different check family.
use crate::config::QueryType;
use crate::dataset::names;
use crate::profile::{find_all_instances_of, CheckContext, ProfileCheck};
use crate::result::{ResultsAccumulator, ValidationResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HANDLE_RE: Regex = Regex::new(r"^(\w|_){1,80}-\w{1,8}$").unwrap();
}

/// ICANN code for a malformed handle; `code - 1` covers an
/// unregistered EPP ROID suffix.
pub const HANDLE_FORMAT_CODE: i32 = -10200;

pub struct HandleCheck;

impl ProfileCheck for HandleCheck {
    fn group_name(&self) -> &str {
        "tigHandleFormat"
    }

    fn do_launch(&self, ctx: &CheckContext<'_>) -> bool {
        ctx.config.query_type == QueryType::Domain
    }

    fn do_validate(&self, ctx: &CheckContext<'_>, results: &mut ResultsAccumulator) -> bool {
        let before = results.len();
        for (pointer, value) in find_all_instances_of(ctx.document, "handle") {
            let Some(handle) = value.as_str() else {
                continue;
            };
            if !HANDLE_RE.is_match(handle) {
                results.push(ValidationResult::new(
                    HANDLE_FORMAT_CODE,
                    handle,
                    format!("handle at {} does not match the required format", pointer),
                ));
                continue;
            }
            let Some((_, roid)) = handle.split_once('-') else {
                continue;
            };
            if ctx
                .datasets
                .get(names::EPP_ROID)
                .map(|dataset| dataset.is_invalid(roid))
                .unwrap_or(false)
            {
                results.push(ValidationResult::new(
                    HANDLE_FORMAT_CODE - 1,
                    handle,
                    format!("EPP ROID \"{}\" is not a registered repository identifier", roid),
                ));
            }
        }
        results.len() == before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QueryConfig, QueryType};
    use crate::dataset::{names, FrozenDatasetService, SetDataset};
    use serde_json::json;
    use url::Url;

    fn config() -> QueryConfig {
        QueryConfig::new(Url::parse("https://rdap.example/domain/example.com").unwrap()).unwrap()
    }

    #[test]
    fn malformed_handle_is_reported_without_roid_lookup() {
        let document = json!({"handle": "ABCDEF"});
        let datasets = FrozenDatasetService::new();
        let cfg = config();
        let ctx = CheckContext {
            document: &document,
            config: &cfg,
            datasets: &datasets,
            http: None,
        };
        let mut results = ResultsAccumulator::new();
        let check = HandleCheck;
        assert!(check.do_launch(&ctx));
        check.do_validate(&ctx, &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results.iter().next().unwrap().code, HANDLE_FORMAT_CODE);
    }

    #[test]
    fn unknown_roid_is_reported_at_code_minus_one() {
        let document = json!({"handle": "ABC-BADROID"});
        let datasets = FrozenDatasetService::new()
            .with_dataset(names::EPP_ROID, SetDataset::new(["BADROID"]));
        let cfg = config();
        let ctx = CheckContext {
            document: &document,
            config: &cfg,
            datasets: &datasets,
            http: None,
        };
        let mut results = ResultsAccumulator::new();
        HandleCheck.do_validate(&ctx, &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results.iter().next().unwrap().code, HANDLE_FORMAT_CODE - 1);
    }

    #[test]
    fn check_does_not_launch_outside_domain_queries() {
        let document = json!({});
        let datasets = FrozenDatasetService::new();
        let mut cfg = config();
        cfg.query_type = QueryType::Entity;
        let ctx = CheckContext {
            document: &document,
            config: &cfg,
            datasets: &datasets,
            http: None,
        };
        assert!(!HandleCheck.do_launch(&ctx));
    }
}
