//! The Schema Tree (`spec.md` §3 `SchemaNode`, §4.1).
//!
//! Parses a JSON Schema bundle once into a navigable, arena-indexed
//! tree: each node exposes its children, its annotation map
//! (unprocessed keywords such as `errorCode`, `validationName`), and a
//! pointer to its parent. Built once at engine construction and
//! immutable thereafter (§3 Lifecycle).
//!
//! Rust has no tracing garbage collector, so the "weak parent
//! back-reference" of §3 is a plain index into an arena rather than an
//! actual weak pointer, per Design Notes §9 ("represent nodes by
//! stable indices into an arena and store parent indices").
pub mod build;
pub mod query;

use serde_json::Value;
use std::collections::BTreeMap;

/// A stable index into a [`SchemaTree`]'s arena.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// The schema-authoring annotations the engine reads but never
/// processes as validation keywords (§3 "annotation map").
pub type Annotations = BTreeMap<String, Value>;

/// The shape-specific payload of a [`SchemaNode`] (§3 `SchemaNode`
/// variants).
#[derive(Debug)]
pub enum SchemaNodeKind {
    /// Has a named mapping of child schemas.
    Object { properties: BTreeMap<String, NodeId> },
    /// Has one child schema (items); arrays have a single items schema
    /// regardless of how many elements the instance array has.
    Array { items: Option<NodeId> },
    /// Forwards to a resolved target child; never its own terminal.
    /// The reference node itself remains in the tree (so parent chains
    /// through a `$ref` stay intact) but `getChild()` returns the
    /// resolved target.
    Reference { target: NodeId },
    /// A union/intersection (`anyOf`/`oneOf`/`allOf`) with a list of
    /// alternatives.
    Combined {
        operator: CombinedOperator,
        alternatives: Vec<NodeId>,
    },
    /// Terminal; no children.
    Simple,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CombinedOperator {
    AnyOf,
    OneOf,
    AllOf,
}

/// A node in the validated schema tree (§3 `SchemaNode`).
#[derive(Debug)]
pub struct SchemaNode {
    pub(crate) parent: Option<NodeId>,
    pub(crate) property_name_in_parent: String,
    pub(crate) schema_id: Option<String>,
    pub(crate) annotations: Annotations,
    pub(crate) kind: SchemaNodeKind,
}

impl SchemaNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn property_name_in_parent(&self) -> &str {
        &self.property_name_in_parent
    }

    pub fn schema_id(&self) -> Option<&str> {
        self.schema_id.as_deref()
    }

    pub fn annotation(&self, key: &str) -> Option<&Value> {
        self.annotations.get(key)
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn kind(&self) -> &SchemaNodeKind {
        &self.kind
    }

    pub fn is_combined(&self) -> bool {
        matches!(self.kind, SchemaNodeKind::Combined { .. })
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, SchemaNodeKind::Reference { .. })
    }
}

/// The schema bundle, built once at engine construction.
///
/// `[SchemaTree::vcard_array_property]` hard-codes the one known
/// genuinely self-referential production schema property name
/// (`vcardArray`) so that recursion-by-id can skip it, per Design
/// Notes §9: "The latter is a known-ugly workaround; an implementer
/// may widen it to *any property whose schema has no id and whose item
/// schema transitively references itself* if that proves equally
/// safe." We keep the narrower, observed-safe exclusion.
#[derive(Debug)]
pub struct SchemaTree {
    pub(crate) nodes: Vec<SchemaNode>,
    pub(crate) root: NodeId,
}

pub const VCARD_ARRAY_PROPERTY: &str = "vcardArray";

impl SchemaTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dereference one hop through a `Reference` node, returning the
    /// node itself if it is not a reference. `getChild()` in the spec
    /// always returns the resolved target, never the reference node.
    pub fn resolve(&self, id: NodeId) -> NodeId {
        match self.node(id).kind() {
            SchemaNodeKind::Reference { target } => *target,
            _ => id,
        }
    }
}
