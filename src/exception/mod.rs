//! A closed set of leaf failure categories, plus the
//! `ValidationExceptionNode` tree the structural validator
//! (`crate::validate`) produces.
//!
//! A `Complex` node exists only to hold the sub-failures of a
//! `oneOf`/`anyOf`/`allOf` branch; every other category is a leaf.
//! Parsers (`crate::parsers`) only ever match against leaves —
//! [`ValidationExceptionNode::leaves`] flattens the tree for them.
use crate::pointer::JsonPointer;

/// One entry in the Exception Taxonomy table.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ExceptionCategory {
    UnknownKey,
    MissingKey,
    BasicType,
    Enum,
    Const,
    ContainsConst,
    Regex,
    Datetime,
    Ipv4,
    Ipv6,
    IdnHostname,
    HostnameInUri,
    UniqueItems,
    Numeric,
    Dependencies,
    /// Not a leaf category: wraps the sub-failures of a combined
    /// (`oneOf`/`anyOf`/`allOf`) schema so the tree shape mirrors the
    /// schema shape that produced it.
    Complex,
}

impl ExceptionCategory {
    pub fn is_leaf(self) -> bool {
        !matches!(self, ExceptionCategory::Complex)
    }
}

/// One structural failure, located by both the instance pointer that
/// failed and the schema pointer of the keyword that rejected it.
#[derive(Clone, Debug)]
pub struct ValidationExceptionNode {
    pub category: ExceptionCategory,
    pub instance_pointer: JsonPointer,
    pub schema_pointer: JsonPointer,
    pub message: String,
    pub causes: Vec<ValidationExceptionNode>,
}

impl ValidationExceptionNode {
    pub fn leaf(
        category: ExceptionCategory,
        instance_pointer: JsonPointer,
        schema_pointer: JsonPointer,
        message: impl Into<String>,
    ) -> Self {
        ValidationExceptionNode {
            category,
            instance_pointer,
            schema_pointer,
            message: message.into(),
            causes: Vec::new(),
        }
    }

    pub fn complex(
        instance_pointer: JsonPointer,
        schema_pointer: JsonPointer,
        message: impl Into<String>,
        causes: Vec<ValidationExceptionNode>,
    ) -> Self {
        ValidationExceptionNode {
            category: ExceptionCategory::Complex,
            instance_pointer,
            schema_pointer,
            message: message.into(),
            causes,
        }
    }

    /// Flatten this node (and, recursively, every `Complex` descendant)
    /// into the leaf failures parsers actually match against.
    pub fn leaves(&self) -> Vec<&ValidationExceptionNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ValidationExceptionNode>) {
        if self.category.is_leaf() {
            out.push(self);
        }
        for cause in &self.causes {
            cause.collect_leaves(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_flattens_nested_complex_nodes() {
        let inner = ValidationExceptionNode::leaf(
            ExceptionCategory::BasicType,
            JsonPointer::parse("/a"),
            JsonPointer::parse("/properties/a"),
            "expected string",
        );
        let complex = ValidationExceptionNode::complex(
            JsonPointer::parse("/a"),
            JsonPointer::parse("/anyOf"),
            "no alternative matched",
            vec![inner],
        );
        let leaves = complex.leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].category, ExceptionCategory::BasicType);
    }

    #[test]
    fn a_leaf_node_flattens_to_itself() {
        let leaf = ValidationExceptionNode::leaf(
            ExceptionCategory::Enum,
            JsonPointer::root(),
            JsonPointer::root(),
            "not one of the enumerated values",
        );
        assert_eq!(leaf.leaves().len(), 1);
    }
}
