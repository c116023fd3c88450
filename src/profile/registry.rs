//! The driver that runs every registered [`super::ProfileCheck`] in
//! registration order. Checks do not depend on each other's results.
use super::checks::{
    cors::CorsCheck, events::EventsCheck, handle::HandleCheck, ip_address::IpAddressCheck,
    label_consistency::LabelConsistencyCheck, links::LinksCheck, notices::NoticesCheck,
    rdap_conformance::RdapConformanceCheck,
};
use super::{CheckContext, ProfileCheck};
use crate::result::ResultsAccumulator;

pub struct CheckRegistry {
    checks: Vec<Box<dyn ProfileCheck>>,
}

impl Default for CheckRegistry {
    fn default() -> Self {
        CheckRegistry {
            checks: vec![
                Box::new(RdapConformanceCheck),
                Box::new(HandleCheck),
                Box::new(CorsCheck),
                Box::new(LabelConsistencyCheck),
                Box::new(IpAddressCheck),
                Box::new(NoticesCheck),
                Box::new(LinksCheck),
                Box::new(EventsCheck),
            ],
        }
    }
}

impl CheckRegistry {
    pub fn new(checks: Vec<Box<dyn ProfileCheck>>) -> Self {
        CheckRegistry { checks }
    }

    pub fn run(&self, ctx: &CheckContext<'_>, results: &mut ResultsAccumulator) {
        for check in &self.checks {
            if !check.do_launch(ctx) {
                tracing::debug!(group = check.group_name(), "profile check skipped by doLaunch");
                continue;
            }
            let clean = check.do_validate(ctx, results);
            tracing::debug!(group = check.group_name(), clean, "profile check ran");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;
    use crate::dataset::FrozenDatasetService;
    use serde_json::json;
    use url::Url;

    #[test]
    fn default_registry_runs_every_launched_check() {
        let document = json!({
            "rdapConformance": ["rdap_level_0"],
            "handle": "ABCDEF",
            "ldhName": "example.com"
        });
        let datasets = FrozenDatasetService::new();
        let config =
            QueryConfig::new(Url::parse("https://rdap.example/domain/example.com").unwrap())
                .unwrap();
        let ctx = CheckContext {
            document: &document,
            config: &config,
            datasets: &datasets,
            http: None,
        };
        let mut results = ResultsAccumulator::new();
        CheckRegistry::default().run(&ctx, &mut results);
        assert!(!results.is_empty());
    }
}
