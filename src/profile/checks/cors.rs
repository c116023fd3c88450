//! CORS header, TIG 1.13.
use crate::profile::{CheckContext, ProfileCheck};
use crate::result::{ResultsAccumulator, ValidationResult};

pub const CORS_MISSING_WILDCARD_CODE: i32 = -20500;

pub struct CorsCheck;

impl ProfileCheck for CorsCheck {
    fn group_name(&self) -> &str {
        "tig113Cors"
    }

    fn do_validate(&self, ctx: &CheckContext<'_>, results: &mut ResultsAccumulator) -> bool {
        let before = results.len();
        let Some(http) = ctx.http else {
            return true;
        };
        for response in &http.chain {
            let allows_any_origin = response
                .header("Access-Control-Allow-Origin")
                .map(|value| value.contains('*'))
                .unwrap_or(false);
            if !allows_any_origin {
                results.push(ValidationResult::new(
                    CORS_MISSING_WILDCARD_CODE,
                    response.to_string(),
                    format!(
                        "response from {} does not allow cross-origin access via Access-Control-Allow-Origin: *",
                        response.url
                    ),
                ));
            }
        }
        results.len() == before
    }
}
