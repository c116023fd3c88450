//! Exception Parsers: translate a generic [`ValidationExceptionNode`]
//! leaf into an ICANN-numbered [`ValidationResult`], by walking the
//! schema tree's annotations.
//!
//! Every parser shares one mechanism — locate the schema node the
//! failing instance pointer corresponds to, then walk its annotations
//! (falling back to ancestors via [`search_bottom_most_error_code`])
//! to find the `errorCode` the schema author attached to that
//! location. What differs between parsers is only which
//! [`ExceptionCategory`] they claim and how they render the result's
//! `value`/`message`, so one generic parser type is registered once
//! per category rather than hand-duplicating the lookup thirteen
//! times. Parsers run independently — the registry never
//! short-circuits after the first match, so multiple parsers may emit
//! for the same leaf.
use crate::exception::{ExceptionCategory, ValidationExceptionNode};
use crate::pointer::PointerChunk;
use crate::result::{ResultsAccumulator, ValidationResult};
use crate::schema::query::{find_associated_schema, search_bottom_most_error_code};
use crate::schema::SchemaTree;
use serde_json::Value;

/// Everything a parser needs besides the exception itself.
pub struct ParserContext<'a> {
    pub tree: &'a SchemaTree,
    pub instance: &'a Value,
}

pub trait ExceptionParser: Send + Sync {
    /// Does this parser claim the exception's category?
    fn matches(&self, exception: &ValidationExceptionNode) -> bool;

    /// Produce the numbered result for a claimed exception. Returning
    /// `None` means the schema tree had no annotation for this
    /// location — the registry treats that as a schema-authoring bug,
    /// not a validation finding.
    fn parse(&self, ctx: &ParserContext<'_>, exception: &ValidationExceptionNode) -> Option<ValidationResult>;
}

fn instance_value_at(ctx: &ParserContext<'_>, exception: &ValidationExceptionNode) -> String {
    // A `MissingKey` leaf's `instance_pointer` names the absent key, so
    // resolving it against the document can never find anything
    // (§4.2: "key name in value") — report the key itself rather than
    // the resolved-to-`null` placeholder every other category gets.
    if exception.category == ExceptionCategory::MissingKey {
        if let Some(PointerChunk::Property(key)) = exception.instance_pointer.chunks().last() {
            return key.clone();
        }
    }
    exception
        .instance_pointer
        .resolve(ctx.instance)
        .map(|value| value.to_string())
        .unwrap_or_else(|| "null".to_string())
}

/// The shared "validation-wrapper pass" (`spec.md` §4.3): after a
/// leaf's domain-specific parser(s) run, walk upward from the schema
/// node the leaf's instance pointer resolves to (inclusive of that
/// node itself, mirroring [`search_bottom_most_error_code`]'s own
/// "check here, then walk up" shape) and, for every node carrying both
/// a `validationName` and a `parentValidationCode` annotation, emit a
/// generic "value does not pass *X* validation" result. This is why a
/// single leaf failure can surface both a specific code and one or
/// more "profile group" codes.
fn validation_wrapper_results(
    ctx: &ParserContext<'_>,
    exception: &ValidationExceptionNode,
) -> Vec<ValidationResult> {
    let mut out = Vec::new();
    let Some(start) = find_associated_schema(ctx.tree, ctx.tree.root(), &exception.instance_pointer) else {
        return out;
    };
    let mut current = Some(start);
    while let Some(id) = current {
        let node = ctx.tree.node(id);
        if let (Some(name), Some(code)) = (
            node.annotation("validationName").and_then(Value::as_str),
            node.annotation("parentValidationCode").and_then(Value::as_i64),
        ) {
            out.push(ValidationResult::new(
                code as i32,
                instance_value_at(ctx, exception),
                format!("value does not pass {} validation", name),
            ));
        }
        current = node.parent();
    }
    out
}

fn error_code_for(ctx: &ParserContext<'_>, exception: &ValidationExceptionNode) -> Option<i64> {
    let node = find_associated_schema(ctx.tree, ctx.tree.root(), &exception.instance_pointer)?;
    if let Some(code) = ctx.tree.node(node).annotation("errorCode").and_then(Value::as_i64) {
        return Some(code);
    }
    // Fall back to walking upward from the parent, mirroring
    // `searchBottomMostErrorCode`'s "closest enclosing annotation"
    // semantics for nodes that inherit their code from a container.
    let parent = ctx.tree.node(node).parent()?;
    search_bottom_most_error_code(
        ctx.tree,
        parent,
        ctx.tree.node(node).property_name_in_parent(),
        "errorCode",
    )
}

/// One parser per leaf [`ExceptionCategory`], sharing the lookup above.
pub struct GenericCodeParser {
    category: ExceptionCategory,
}

impl GenericCodeParser {
    pub fn for_category(category: ExceptionCategory) -> Self {
        GenericCodeParser { category }
    }
}

impl ExceptionParser for GenericCodeParser {
    fn matches(&self, exception: &ValidationExceptionNode) -> bool {
        exception.category == self.category
    }

    fn parse(&self, ctx: &ParserContext<'_>, exception: &ValidationExceptionNode) -> Option<ValidationResult> {
        let code = error_code_for(ctx, exception)?;
        Some(ValidationResult::new(
            code as i32,
            instance_value_at(ctx, exception),
            exception.message.clone(),
        ))
    }
}

/// Ordered registry of parsers consulted for every leaf exception. The
/// registration order is stable but does not imply precedence — every
/// matching parser runs.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn ExceptionParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        let categories = [
            ExceptionCategory::UnknownKey,
            ExceptionCategory::MissingKey,
            ExceptionCategory::BasicType,
            ExceptionCategory::Enum,
            ExceptionCategory::Const,
            ExceptionCategory::ContainsConst,
            ExceptionCategory::Regex,
            ExceptionCategory::Datetime,
            ExceptionCategory::Ipv4,
            ExceptionCategory::Ipv6,
            ExceptionCategory::IdnHostname,
            ExceptionCategory::HostnameInUri,
            ExceptionCategory::UniqueItems,
            ExceptionCategory::Numeric,
            ExceptionCategory::Dependencies,
        ];
        ParserRegistry {
            parsers: categories
                .into_iter()
                .map(|category| Box::new(GenericCodeParser::for_category(category)) as Box<dyn ExceptionParser>)
                .collect(),
        }
    }
}

impl ParserRegistry {
    pub fn new(parsers: Vec<Box<dyn ExceptionParser>>) -> Self {
        ParserRegistry { parsers }
    }

    /// Run every registered parser over every leaf of `root`,
    /// accumulating results. A leaf no parser claims is logged and
    /// recorded under the schema-bug sentinel code rather than
    /// silently dropped.
    pub fn run(&self, ctx: &ParserContext<'_>, root: &ValidationExceptionNode, results: &mut ResultsAccumulator) {
        for leaf in root.leaves() {
            let mut claimed = false;
            for parser in &self.parsers {
                if parser.matches(leaf) {
                    claimed = true;
                    match parser.parse(ctx, leaf) {
                        Some(result) => {
                            results.push(result);
                        }
                        None => {
                            tracing::warn!(
                                category = ?leaf.category,
                                instance_pointer = %leaf.instance_pointer,
                                "exception parser matched but found no errorCode annotation"
                            );
                            results.push(ValidationResult::schema_bug(
                                &leaf.schema_pointer.to_string(),
                                "missing errorCode annotation",
                            ));
                        }
                    }
                }
            }
            if !claimed {
                tracing::warn!(
                    category = ?leaf.category,
                    instance_pointer = %leaf.instance_pointer,
                    "no exception parser registered for this category"
                );
                results.push(ValidationResult::schema_bug(
                    &leaf.schema_pointer.to_string(),
                    "unrecognized exception category",
                ));
            }
            for wrapper in validation_wrapper_results(ctx, leaf) {
                results.push(wrapper);
            }
        }
    }
}
