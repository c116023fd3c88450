//! Links self-link (RFC 9083 guidance cited by the Response Profile):
//! an object class missing a `rel: "self"` link is informational; a
//! `self` link whose `type` is not `application/rdap+json` is a
//! warning.
use crate::profile::{CheckContext, ProfileCheck};
use crate::result::{ResultsAccumulator, ValidationResult};
use serde_json::Value;

pub const LINKS_MISSING_SELF_CODE: i32 = -10700;
pub const LINKS_SELF_WRONG_TYPE_CODE: i32 = -10701;

pub struct LinksCheck;

impl ProfileCheck for LinksCheck {
    fn group_name(&self) -> &str {
        "responseProfileLinksSelf"
    }

    fn do_validate(&self, ctx: &CheckContext<'_>, results: &mut ResultsAccumulator) -> bool {
        let before = results.len();
        let Some(Value::Array(links)) = ctx.document.get("links") else {
            results.push(ValidationResult::new(
                LINKS_MISSING_SELF_CODE,
                "null",
                "object class has no links member and therefore no self link".to_string(),
            ));
            return results.len() == before;
        };

        let self_link = links
            .iter()
            .find(|link| link.get("rel").and_then(Value::as_str) == Some("self"));

        match self_link {
            None => {
                results.push(ValidationResult::new(
                    LINKS_MISSING_SELF_CODE,
                    "links",
                    "object class does not carry a rel: \"self\" link".to_string(),
                ));
            }
            Some(link) => {
                let link_type = link.get("type").and_then(Value::as_str);
                if link_type != Some("application/rdap+json") {
                    results.push(ValidationResult::new(
                        LINKS_SELF_WRONG_TYPE_CODE,
                        link.to_string(),
                        "self link does not declare type: application/rdap+json".to_string(),
                    ));
                }
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
    fn missing_links_member_is_reported() {
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
        LinksCheck.do_validate(&ctx, &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results.iter().next().unwrap().code, LINKS_MISSING_SELF_CODE);
    }

    #[test]
    fn self_link_with_wrong_type_is_reported() {
        let document = json!({"links": [{"rel": "self", "href": "https://x", "type": "text/html"}]});
        let datasets = FrozenDatasetService::new();
        let cfg = config();
        let ctx = CheckContext {
            document: &document,
            config: &cfg,
            datasets: &datasets,
            http: None,
        };
        let mut results = ResultsAccumulator::new();
        LinksCheck.do_validate(&ctx, &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results.iter().next().unwrap().code, LINKS_SELF_WRONG_TYPE_CODE);
    }

    #[test]
    fn well_formed_self_link_passes() {
        let document = json!({"links": [{"rel": "self", "type": "application/rdap+json"}]});
        let datasets = FrozenDatasetService::new();
        let cfg = config();
        let ctx = CheckContext {
            document: &document,
            config: &cfg,
            datasets: &datasets,
            http: None,
        };
        let mut results = ResultsAccumulator::new();
        assert!(LinksCheck.do_validate(&ctx, &mut results));
    }
}
