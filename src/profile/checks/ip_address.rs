//! IP address format.
use crate::dataset::names;
use crate::profile::{find_all_instances_of, CheckContext, ProfileCheck};
use crate::result::{ResultsAccumulator, ValidationResult};
use std::net::IpAddr;
use std::str::FromStr;

pub const IP_ADDRESS_UNPARSEABLE_CODE: i32 = -10300;
pub const IP_ADDRESS_SPECIAL_PURPOSE_CODE: i32 = -10301;

pub struct IpAddressCheck;

impl ProfileCheck for IpAddressCheck {
    fn group_name(&self) -> &str {
        "responseProfileIpAddress"
    }

    fn do_validate(&self, ctx: &CheckContext<'_>, results: &mut ResultsAccumulator) -> bool {
        let before = results.len();
        for key in ["v4", "v6"] {
            for (pointer, value) in find_all_instances_of(ctx.document, key) {
                let Some(text) = value.as_str() else {
                    continue;
                };
                let parsed = match IpAddr::from_str(text) {
                    Ok(parsed) => parsed,
                    Err(_) => {
                        results.push(ValidationResult::new(
                            IP_ADDRESS_UNPARSEABLE_CODE,
                            text,
                            format!("value at {} is not a parseable IP address", pointer),
                        ));
                        continue;
                    }
                };
                let dataset_name = match parsed {
                    IpAddr::V4(_) => names::IPV4_SPECIAL_PURPOSE,
                    IpAddr::V6(_) => names::IPV6_SPECIAL_PURPOSE,
                };
                if ctx
                    .datasets
                    .get(dataset_name)
                    .map(|dataset| dataset.is_invalid(text))
                    .unwrap_or(false)
                {
                    results.push(ValidationResult::new(
                        IP_ADDRESS_SPECIAL_PURPOSE_CODE,
                        text,
                        format!("{} is a special-purpose address and may not appear here", text),
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
    use crate::dataset::{FrozenDatasetService, SetDataset};
    use serde_json::json;
    use url::Url;

    fn config() -> QueryConfig {
        QueryConfig::new(Url::parse("https://rdap.example/domain/example.com").unwrap()).unwrap()
    }

    #[test]
    fn unparseable_ip_is_reported() {
        let document = json!({"v4": "not-an-ip"});
        let datasets = FrozenDatasetService::new();
        let cfg = config();
        let ctx = CheckContext {
            document: &document,
            config: &cfg,
            datasets: &datasets,
            http: None,
        };
        let mut results = ResultsAccumulator::new();
        IpAddressCheck.do_validate(&ctx, &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results.iter().next().unwrap().code, IP_ADDRESS_UNPARSEABLE_CODE);
    }

    #[test]
    fn special_purpose_address_is_flagged() {
        let document = json!({"v4": "192.0.2.1"});
        let datasets = FrozenDatasetService::new()
            .with_dataset(names::IPV4_SPECIAL_PURPOSE, SetDataset::new(["192.0.2.1"]));
        let cfg = config();
        let ctx = CheckContext {
            document: &document,
            config: &cfg,
            datasets: &datasets,
            http: None,
        };
        let mut results = ResultsAccumulator::new();
        IpAddressCheck.do_validate(&ctx, &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results.iter().next().unwrap().code, IP_ADDRESS_SPECIAL_PURPOSE_CODE);
    }
}
