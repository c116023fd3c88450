//! Compiles a JSON Schema bundle into a [`super::SchemaTree`].
//!
//! The tree built here only tracks *structure* (Object/Array/Reference/
//! Combined/Simple) and *annotations* — the keywords the structural
//! validator in [`crate::validate`] actually checks (`type`, `pattern`,
//! `minimum`, ...) are read straight from the raw `serde_json::Value`
//! schema documents during validation, not duplicated onto
//! [`super::SchemaNode`]. This mirrors how the teacher's
//! `compile_validators` (`compilation/mod.rs`) walks the raw
//! `serde_json::Value` once per keyword rather than building a second
//! intermediate representation for it.
use super::{
    Annotations, CombinedOperator, NodeId, SchemaNode, SchemaNodeKind, SchemaTree,
};
use crate::error::EngineError;
use crate::pointer::JsonPointer;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Keywords that hold sub-schemas keyed by a property/definition name —
/// their members become named children of the enclosing node exactly
/// like the JSON Schema `properties` keyword.
const CONTAINER_KEYWORDS: &[&str] = &["properties", "definitions", "$defs"];

/// Keywords processed directly by the structural validator against the
/// raw schema text; never stored as annotations.
const LEAF_KEYWORDS: &[&str] = &[
    "type",
    "enum",
    "const",
    "pattern",
    "format",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "minItems",
    "maxItems",
    "minProperties",
    "maxProperties",
    "multipleOf",
    "required",
    "additionalProperties",
    "uniqueItems",
    "dependencies",
    "dependentRequired",
    "contains",
    "$schema",
    "title",
    "description",
    "default",
    "examples",
];

fn is_annotation_key(key: &str) -> bool {
    !CONTAINER_KEYWORDS.contains(&key)
        && !LEAF_KEYWORDS.contains(&key)
        && key != "$ref"
        && key != "$id"
        && key != "items"
        && key != "anyOf"
        && key != "oneOf"
        && key != "allOf"
}

fn collect_annotations(map: &Map<String, Value>) -> Annotations {
    map.iter()
        .filter(|(key, _)| is_annotation_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn combined_operator(map: &Map<String, Value>) -> Option<(CombinedOperator, &Vec<Value>)> {
    if let Some(Value::Array(items)) = map.get("anyOf") {
        Some((CombinedOperator::AnyOf, items))
    } else if let Some(Value::Array(items)) = map.get("oneOf") {
        Some((CombinedOperator::OneOf, items))
    } else if let Some(Value::Array(items)) = map.get("allOf") {
        Some((CombinedOperator::AllOf, items))
    } else {
        None
    }
}

fn operator_keyword(operator: CombinedOperator) -> &'static str {
    match operator {
        CombinedOperator::AnyOf => "anyOf",
        CombinedOperator::OneOf => "oneOf",
        CombinedOperator::AllOf => "allOf",
    }
}

struct Builder<'a> {
    resources: &'a BTreeMap<String, Value>,
    nodes: Vec<SchemaNode>,
    cache: HashMap<(String, String), NodeId>,
}

impl<'a> Builder<'a> {
    fn resource(&self, name: &str) -> Result<&'a Value, EngineError> {
        self.resources
            .get(name)
            .ok_or_else(|| EngineError::UnknownSchemaResource(name.to_string()))
    }

    fn reserve(&mut self, parent: Option<NodeId>, property_name: String) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SchemaNode {
            parent,
            property_name_in_parent: property_name,
            schema_id: None,
            annotations: Annotations::new(),
            kind: SchemaNodeKind::Simple,
        });
        id
    }

    fn fill(&mut self, id: NodeId, node: SchemaNode) {
        self.nodes[id.0] = node;
    }

    /// Resolve a `$ref` string relative to `current_resource` into a
    /// `(resource, pointer)` pair. A bare fragment (`#/...`) stays
    /// within the current resource; `name.json#/...` switches to the
    /// named resource — the "classpath-style relative resolution" of
    /// `spec.md` §6, simplified to resource-name lookups since this
    /// engine receives already-loaded schema text, never file paths.
    fn split_reference(current_resource: &str, reference: &str) -> (String, String) {
        match reference.find('#') {
            Some(idx) => {
                let (resource_part, pointer_part) = reference.split_at(idx);
                let resource = if resource_part.is_empty() {
                    current_resource.to_string()
                } else {
                    resource_part.to_string()
                };
                (resource, pointer_part[1..].to_string())
            }
            None => (reference.to_string(), String::new()),
        }
    }

    /// Resolve a `$ref` target, compiling its owning resource's root
    /// (which eagerly compiles every node reachable by structural
    /// descent, including the target) if it has not been visited yet.
    fn obtain(&mut self, resource: &str, pointer: &str) -> Result<NodeId, EngineError> {
        let key = (resource.to_string(), pointer.to_string());
        if let Some(id) = self.cache.get(&key) {
            return Ok(*id);
        }
        let doc = self.resource(resource)?.clone();
        self.build_node(resource, "", &doc, None, String::new())?;
        self.cache
            .get(&key)
            .copied()
            .ok_or_else(|| EngineError::UnresolvedReference {
                schema_name: resource.to_string(),
                reference: pointer.to_string(),
            })
    }

    /// Compile the schema located at `pointer` within `resource`,
    /// reusing any node already compiled for that exact location.
    ///
    /// The cache entry is inserted *before* recursing into children,
    /// which is what makes a genuinely self-referential schema (the
    /// one known production case is `vcardArray`, per Design Notes §9)
    /// terminate during compilation instead of recursing forever: by
    /// the time the self-reference is reached, its own `(resource,
    /// pointer)` key already maps back to the node currently being
    /// built.
    fn build_node(
        &mut self,
        resource: &str,
        pointer: &str,
        value: &Value,
        parent: Option<NodeId>,
        property_name: String,
    ) -> Result<NodeId, EngineError> {
        let key = (resource.to_string(), pointer.to_string());
        if let Some(id) = self.cache.get(&key) {
            return Ok(*id);
        }
        let id = self.reserve(parent, property_name.clone());
        self.cache.insert(key, id);

        match value {
            Value::Bool(_) => {
                self.fill(
                    id,
                    SchemaNode {
                        parent,
                        property_name_in_parent: property_name,
                        schema_id: None,
                        annotations: Annotations::new(),
                        kind: SchemaNodeKind::Simple,
                    },
                );
            }
            Value::Object(map) => {
                let schema_id = map.get("$id").and_then(Value::as_str).map(String::from);
                let annotations = collect_annotations(map);
                if let Some(Value::String(reference)) = map.get("$ref") {
                    let (target_resource, target_pointer) =
                        Self::split_reference(resource, reference);
                    let target = self.obtain(&target_resource, &target_pointer)?;
                    self.fill(
                        id,
                        SchemaNode {
                            parent,
                            property_name_in_parent: property_name,
                            schema_id,
                            annotations,
                            kind: SchemaNodeKind::Reference { target },
                        },
                    );
                } else if let Some((operator, alternatives_values)) = combined_operator(map) {
                    let keyword = operator_keyword(operator);
                    let mut alternatives = Vec::with_capacity(alternatives_values.len());
                    for (index, alt_value) in alternatives_values.iter().enumerate() {
                        let alt_pointer = format!("{}/{}/{}", pointer, keyword, index);
                        alternatives.push(self.build_node(
                            resource,
                            &alt_pointer,
                            alt_value,
                            Some(id),
                            index.to_string(),
                        )?);
                    }
                    self.fill(
                        id,
                        SchemaNode {
                            parent,
                            property_name_in_parent: property_name,
                            schema_id,
                            annotations,
                            kind: SchemaNodeKind::Combined {
                                operator,
                                alternatives,
                            },
                        },
                    );
                } else if let Some(items_value) = map.get("items").filter(|v| !v.is_array()) {
                    let items_pointer = format!("{}/items", pointer);
                    let items_id = self.build_node(
                        resource,
                        &items_pointer,
                        items_value,
                        Some(id),
                        "items".to_string(),
                    )?;
                    self.fill(
                        id,
                        SchemaNode {
                            parent,
                            property_name_in_parent: property_name,
                            schema_id,
                            annotations,
                            kind: SchemaNodeKind::Array {
                                items: Some(items_id),
                            },
                        },
                    );
                } else if CONTAINER_KEYWORDS
                    .iter()
                    .any(|kw| matches!(map.get(*kw), Some(Value::Object(_))))
                {
                    let mut properties = BTreeMap::new();
                    for container_kw in CONTAINER_KEYWORDS {
                        if let Some(Value::Object(members)) = map.get(*container_kw) {
                            for (member_name, member_value) in members {
                                let member_pointer =
                                    format!("{}/{}/{}", pointer, container_kw, member_name);
                                let member_id = self.build_node(
                                    resource,
                                    &member_pointer,
                                    member_value,
                                    Some(id),
                                    member_name.clone(),
                                )?;
                                properties.insert(member_name.clone(), member_id);
                            }
                        }
                    }
                    self.fill(
                        id,
                        SchemaNode {
                            parent,
                            property_name_in_parent: property_name,
                            schema_id,
                            annotations,
                            kind: SchemaNodeKind::Object { properties },
                        },
                    );
                } else {
                    self.fill(
                        id,
                        SchemaNode {
                            parent,
                            property_name_in_parent: property_name,
                            schema_id,
                            annotations,
                            kind: SchemaNodeKind::Simple,
                        },
                    );
                }
            }
            Value::Null => return Err(EngineError::NullRootSchema),
            _ => {
                self.fill(
                    id,
                    SchemaNode {
                        parent,
                        property_name_in_parent: property_name,
                        schema_id: None,
                        annotations: Annotations::new(),
                        kind: SchemaNodeKind::Simple,
                    },
                );
            }
        }
        Ok(id)
    }
}

impl SchemaTree {
    /// Build the tree once, from a named bundle of schema resources.
    /// `root_resource` names the entry point (e.g. the RDAP domain
    /// object's top-level schema); every other resource is compiled
    /// lazily, the first time a `$ref` reaches into it.
    pub fn build(
        resources: &BTreeMap<String, Value>,
        root_resource: &str,
    ) -> Result<SchemaTree, EngineError> {
        let root_doc = resources
            .get(root_resource)
            .ok_or_else(|| EngineError::UnknownSchemaResource(root_resource.to_string()))?;
        if root_doc.is_null() {
            return Err(EngineError::NullRootSchema);
        }
        let mut builder = Builder {
            resources,
            nodes: Vec::new(),
            cache: HashMap::new(),
        };
        let root = builder.build_node(root_resource, "", root_doc, None, String::new())?;
        Ok(SchemaTree {
            nodes: builder.nodes,
            root,
        })
    }
}

/// Split a JSON Pointer into its parent pointer and final segment,
/// used by [`super::query`] when walking down from the root.
pub(crate) fn split_pointer(pointer: &str) -> (String, String) {
    match pointer.rfind('/') {
        Some(idx) => (pointer[..idx].to_string(), pointer[idx + 1..].to_string()),
        None => (String::new(), String::new()),
    }
}

#[allow(dead_code)]
pub(crate) fn pointer_points_into(document: &Value, pointer: &str) -> bool {
    JsonPointer::parse(pointer).resolve(document).is_some()
}
