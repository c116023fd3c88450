//! Validation results and the append-only accumulator that collects
//! them (`spec.md` §3 `ValidationResult`, §4.7 Results Accumulator).
use std::fmt;

/// One ICANN-coded finding.
///
/// Value-equal by `(code, value, message)` per §3 — two results that
/// carry the same code, offending value, and diagnostic are considered
/// the same finding and collapse under deduplication, even if they
/// were produced by different parsers or checks.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize)]
pub struct ValidationResult {
    pub code: i32,
    pub value: String,
    pub message: String,
}

impl ValidationResult {
    pub fn new(code: i32, value: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationResult {
            code,
            value: value.into(),
            message: message.into(),
        }
    }

    /// The sentinel code for schema-authoring inconsistencies
    /// (`spec.md` §7 category 2, §9 Open Question (b)).
    pub const SCHEMA_BUG_CODE: i32 = -999;

    pub fn schema_bug(pointer_and_key: impl Into<String>, annotation: &str) -> Self {
        ValidationResult::new(
            Self::SCHEMA_BUG_CODE,
            pointer_and_key,
            format!(
                "no '{}' annotation found on the schema tree; the schema set is out of sync \
                 with the check code",
                annotation
            ),
        )
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.code, self.message, self.value)
    }
}

/// Append-only, deduplicating sink of [`ValidationResult`]s.
///
/// Iteration order is insertion order after deduplication (§4.7);
/// running the same check twice must not grow the accumulator
/// (§8 invariant 4), which the `HashSet` membership check guarantees.
#[derive(Debug, Default)]
pub struct ResultsAccumulator {
    order: Vec<ValidationResult>,
    seen: std::collections::HashSet<ValidationResult>,
}

impl ResultsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result. Returns `true` if it was newly added, `false`
    /// if an equal result was already present.
    pub fn push(&mut self, result: ValidationResult) -> bool {
        if self.seen.insert(result.clone()) {
            self.order.push(result);
            true
        } else {
            false
        }
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = ValidationResult>) {
        for result in results {
            self.push(result);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationResult> {
        self.order.iter()
    }

    pub fn into_vec(self) -> Vec<ValidationResult> {
        self.order
    }
}

impl<'a> IntoIterator for &'a ResultsAccumulator {
    type Item = &'a ValidationResult;
    type IntoIter = std::slice::Iter<'a, ValidationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_results_collapse() {
        let mut acc = ResultsAccumulator::new();
        assert!(acc.push(ValidationResult::new(-10405, "/ldhName", "bad name")));
        assert!(!acc.push(ValidationResult::new(-10405, "/ldhName", "bad name")));
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn distinct_values_are_kept_separately() {
        let mut acc = ResultsAccumulator::new();
        acc.push(ValidationResult::new(-10405, "/a", "bad name"));
        acc.push(ValidationResult::new(-10405, "/b", "bad name"));
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn iteration_order_is_insertion_order() {
        let mut acc = ResultsAccumulator::new();
        acc.push(ValidationResult::new(1, "a", "m"));
        acc.push(ValidationResult::new(2, "b", "m"));
        acc.push(ValidationResult::new(1, "a", "m"));
        let codes: Vec<i32> = acc.iter().map(|r| r.code).collect();
        assert_eq!(codes, vec![1, 2]);
    }

    #[test]
    fn running_the_same_check_twice_does_not_grow_the_accumulator() {
        let mut acc = ResultsAccumulator::new();
        let push_check = |acc: &mut ResultsAccumulator| {
            acc.push(ValidationResult::new(-20500, "header-dump", "CORS missing"));
        };
        push_check(&mut acc);
        let len_after_first = acc.len();
        push_check(&mut acc);
        assert_eq!(acc.len(), len_after_first);
    }
}
