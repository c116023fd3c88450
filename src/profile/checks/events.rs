//! Event date RFC 3339: each `events[].eventDate` must parse as
//! RFC 3339; `events[].eventAction` must be present.
use crate::formats;
use crate::profile::{CheckContext, ProfileCheck};
use crate::result::{ResultsAccumulator, ValidationResult};
use serde_json::Value;

pub const EVENT_DATE_INVALID_CODE: i32 = -10800;
pub const EVENT_ACTION_MISSING_CODE: i32 = -10801;

pub struct EventsCheck;

impl ProfileCheck for EventsCheck {
    fn group_name(&self) -> &str {
        "responseProfileEvents"
    }

    fn do_validate(&self, ctx: &CheckContext<'_>, results: &mut ResultsAccumulator) -> bool {
        let before = results.len();
        if let Some(Value::Array(events)) = ctx.document.get("events") {
            for (index, event) in events.iter().enumerate() {
                match event.get("eventDate").and_then(Value::as_str) {
                    Some(date) if formats::datetime(date) => {}
                    Some(date) => {
                        results.push(ValidationResult::new(
                            EVENT_DATE_INVALID_CODE,
                            date,
                            format!("events[{}].eventDate is not RFC 3339", index),
                        ));
                    }
                    None => {
                        results.push(ValidationResult::new(
                            EVENT_DATE_INVALID_CODE,
                            "null",
                            format!("events[{}].eventDate is missing", index),
                        ));
                    }
                }
                if event.get("eventAction").and_then(Value::as_str).is_none() {
                    results.push(ValidationResult::new(
                        EVENT_ACTION_MISSING_CODE,
                        "null",
                        format!("events[{}].eventAction is missing", index),
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
    fn non_rfc3339_event_date_is_reported() {
        let document = json!({"events": [{"eventAction": "registration", "eventDate": "not-a-date"}]});
        let datasets = FrozenDatasetService::new();
        let cfg = config();
        let ctx = CheckContext {
            document: &document,
            config: &cfg,
            datasets: &datasets,
            http: None,
        };
        let mut results = ResultsAccumulator::new();
        EventsCheck.do_validate(&ctx, &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results.iter().next().unwrap().code, EVENT_DATE_INVALID_CODE);
    }

    #[test]
    fn missing_event_action_is_reported() {
        let document = json!({"events": [{"eventDate": "2024-01-01T00:00:00Z"}]});
        let datasets = FrozenDatasetService::new();
        let cfg = config();
        let ctx = CheckContext {
            document: &document,
            config: &cfg,
            datasets: &datasets,
            http: None,
        };
        let mut results = ResultsAccumulator::new();
        EventsCheck.do_validate(&ctx, &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results.iter().next().unwrap().code, EVENT_ACTION_MISSING_CODE);
    }
}
