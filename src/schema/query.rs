//! Read-only tree operations (`spec.md` §4.1): `findChild`,
//! `searchBottomMostErrorCode`, `findAssociatedSchema`,
//! `findValidationNodes`, `findJsonPointersBySchemaId`,
//! `findAllValuesOf`.
//!
//! All traversals here are structural, depth-first, and guard against
//! cycles with a visited-node set — the same guard the tree-building
//! pass (`build.rs`) needs for compilation, needed again here because
//! these walks run repeatedly over an already-built (and potentially
//! self-referential) tree.
use super::{CombinedOperator, NodeId, SchemaNodeKind, SchemaTree, VCARD_ARRAY_PROPERTY};
use crate::pointer::{JsonPointer, PointerChunk};
use serde_json::Value;
use std::collections::HashSet;

/// Look up a named child of `node`, one-hop dereferencing through a
/// `Reference` before returning it (`getChild()` never returns a bare
/// reference node per §3).
pub fn find_child(tree: &SchemaTree, node: NodeId, key: &str) -> Option<NodeId> {
    match tree.node(node).kind() {
        SchemaNodeKind::Object { properties } => {
            properties.get(key).map(|&child| tree.resolve(child))
        }
        SchemaNodeKind::Reference { target } => find_child(tree, *target, key),
        SchemaNodeKind::Combined { alternatives, .. } => alternatives
            .iter()
            .find_map(|&alt| find_child(tree, alt, key)),
        _ => None,
    }
}

/// Resolve the schema node associated with an instance JSON Pointer,
/// descending from `start` one chunk at a time: object property
/// lookups use [`find_child`]; array indices fall through to the
/// node's single `items` schema, since "arrays have a single items
/// schema" regardless of which index failed (§4.1).
pub fn find_associated_schema(
    tree: &SchemaTree,
    start: NodeId,
    pointer: &JsonPointer,
) -> Option<NodeId> {
    let mut current = tree.resolve(start);
    for chunk in pointer.chunks() {
        current = match chunk {
            PointerChunk::Property(name) => find_child(tree, current, name)?,
            PointerChunk::Index(_) => match tree.node(current).kind() {
                SchemaNodeKind::Array { items: Some(items) } => tree.resolve(*items),
                SchemaNodeKind::Reference { target } => {
                    match tree.node(tree.resolve(*target)).kind() {
                        SchemaNodeKind::Array { items: Some(items) } => tree.resolve(*items),
                        _ => return None,
                    }
                }
                _ => return None,
            },
        };
    }
    Some(current)
}

/// Walk parent links upward from the node located at `search_key`
/// (found via [`find_child`] starting at `start`), returning the first
/// `annotation_key` annotation encountered on the way up. Nodes closer
/// to the root must not shadow intervening ones — the walk stops at
/// the first hit, nearest ancestor wins (`spec.md` §8 boundary law).
pub fn search_bottom_most_error_code(
    tree: &SchemaTree,
    start: NodeId,
    search_key: &str,
    annotation_key: &str,
) -> Option<i64> {
    let located = find_child(tree, start, search_key)?;
    let mut current = Some(located);
    while let Some(id) = current {
        if let Some(code) = tree.node(id).annotation(annotation_key).and_then(Value::as_i64) {
            return Some(code);
        }
        current = tree.node(id).parent();
    }
    None
}

/// Flatten a node into the set of concrete schema nodes it could mean:
/// a `Combined` node (`anyOf`/`oneOf`/`allOf`) expands, recursively, to
/// every alternative; anything else is its own single candidate. Used
/// by parsers that must check a failing instance against every
/// alternative of a union, not just the one a naive first-match lookup
/// would land on.
pub fn find_validation_nodes(tree: &SchemaTree, start: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    collect_validation_nodes(tree, tree.resolve(start), &mut out, &mut HashSet::new());
    out
}

fn collect_validation_nodes(
    tree: &SchemaTree,
    node: NodeId,
    out: &mut Vec<NodeId>,
    visited: &mut HashSet<NodeId>,
) {
    if !visited.insert(node) {
        return;
    }
    match tree.node(node).kind() {
        SchemaNodeKind::Combined { alternatives, .. } => {
            for &alt in alternatives {
                collect_validation_nodes(tree, tree.resolve(alt), out, visited);
            }
        }
        _ => out.push(node),
    }
}

/// Is this combined node a union (`anyOf`/`oneOf`) as opposed to an
/// intersection (`allOf`)? Parsers treat the two differently when
/// deciding whether a failure under one alternative is reportable.
pub fn is_union(operator: CombinedOperator) -> bool {
    matches!(operator, CombinedOperator::AnyOf | CombinedOperator::OneOf)
}

/// One step of the symbolic schema path to a node, before it is
/// concretized against a document instance.
#[derive(Clone)]
enum PathSegment {
    Property(String),
    Item,
}

/// Depth-first collection of every JSON Pointer into `document` whose
/// schema node carries the given `$id` (`spec.md` §4.1
/// `findJsonPointersBySchemaId(id, document)`). Recursion over the
/// schema is guarded against cycles by a visited-node set and
/// hard-skips the `vcardArray` property (§9 Design Notes), the one
/// property known to recurse into itself without ever terminating a
/// naive walk.
///
/// A reusable schema (an array's `items`, say) corresponds to exactly
/// one schema node but may be realized at several *instance* array
/// indices, so the schema walk first records the symbolic chain of
/// property names and array markers leading to each hit, then
/// `concretize_chain` replays that chain against `document`,
/// enumerating the indices actually present at every array marker.
pub fn find_json_pointers_by_schema_id(
    tree: &SchemaTree,
    schema_id: &str,
    document: &Value,
) -> Vec<JsonPointer> {
    let mut chains = Vec::new();
    let mut visited = HashSet::new();
    let mut chain = Vec::new();
    collect_schema_id_chains(tree, tree.root(), &mut chain, &mut visited, schema_id, &mut chains);

    let mut out = Vec::new();
    for chain in &chains {
        concretize_chain(document, chain, JsonPointer::root(), &mut out);
    }
    out
}

fn collect_schema_id_chains(
    tree: &SchemaTree,
    node: NodeId,
    chain: &mut Vec<PathSegment>,
    visited: &mut HashSet<NodeId>,
    schema_id: &str,
    out: &mut Vec<Vec<PathSegment>>,
) {
    if !visited.insert(node) {
        return;
    }
    if tree.node(node).schema_id() == Some(schema_id) {
        out.push(chain.clone());
    }
    match tree.node(node).kind() {
        SchemaNodeKind::Object { properties } => {
            for (name, &child) in properties {
                if name == VCARD_ARRAY_PROPERTY {
                    continue;
                }
                chain.push(PathSegment::Property(name.clone()));
                collect_schema_id_chains(tree, tree.resolve(child), chain, visited, schema_id, out);
                chain.pop();
            }
        }
        SchemaNodeKind::Array { items: Some(items) } => {
            chain.push(PathSegment::Item);
            collect_schema_id_chains(tree, tree.resolve(*items), chain, visited, schema_id, out);
            chain.pop();
        }
        SchemaNodeKind::Combined { alternatives, .. } => {
            for &alt in alternatives {
                collect_schema_id_chains(tree, tree.resolve(alt), chain, visited, schema_id, out);
            }
        }
        SchemaNodeKind::Array { items: None } | SchemaNodeKind::Reference { .. } | SchemaNodeKind::Simple => {}
    }
}

/// Replay a symbolic schema chain against a concrete `document`,
/// branching at every [`PathSegment::Item`] over whichever array
/// indices are actually present at that position. A chain that does
/// not resolve against this particular document (a property absent,
/// or a position that is not an array) yields no pointer rather than
/// a guessed one.
fn concretize_chain(document: &Value, chain: &[PathSegment], pointer: JsonPointer, out: &mut Vec<JsonPointer>) {
    match chain.split_first() {
        None => out.push(pointer),
        Some((PathSegment::Property(name), rest)) => {
            if let Some(child) = document.get(name) {
                concretize_chain(child, rest, pointer.child(name.as_str()), out);
            }
        }
        Some((PathSegment::Item, rest)) => {
            if let Some(items) = document.as_array() {
                for (index, element) in items.iter().enumerate() {
                    concretize_chain(element, rest, pointer.child(index), out);
                }
            }
        }
    }
}

/// Depth-first collection of every value stored under annotation `key`
/// across the whole tree, same traversal guards as
/// [`find_json_pointers_by_schema_id`].
pub fn find_all_values_of(tree: &SchemaTree, key: &str) -> Vec<Value> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    walk_collecting(
        tree,
        tree.root(),
        &JsonPointer::root(),
        &mut visited,
        &mut |node, _pointer| {
            if let Some(value) = tree.node(node).annotation(key) {
                out.push(value.clone());
            }
        },
    );
    out
}

fn walk_collecting(
    tree: &SchemaTree,
    node: NodeId,
    pointer: &JsonPointer,
    visited: &mut HashSet<NodeId>,
    visit: &mut impl FnMut(NodeId, &JsonPointer),
) {
    if !visited.insert(node) {
        return;
    }
    visit(node, pointer);
    match tree.node(node).kind() {
        SchemaNodeKind::Object { properties } => {
            for (name, &child) in properties {
                if name == VCARD_ARRAY_PROPERTY {
                    continue;
                }
                walk_collecting(tree, tree.resolve(child), &pointer.child(name.as_str()), visited, visit);
            }
        }
        SchemaNodeKind::Array { items: Some(items) } => {
            walk_collecting(tree, tree.resolve(*items), &pointer.child(0usize), visited, visit);
        }
        SchemaNodeKind::Combined { alternatives, .. } => {
            for &alt in alternatives {
                walk_collecting(tree, tree.resolve(alt), pointer, visited, visit);
            }
        }
        SchemaNodeKind::Array { items: None } | SchemaNodeKind::Reference { .. } | SchemaNodeKind::Simple => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaTree;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn build(schema: Value) -> SchemaTree {
        let mut resources = BTreeMap::new();
        resources.insert("root.json".to_string(), schema);
        SchemaTree::build(&resources, "root.json").unwrap()
    }

    #[test]
    fn find_child_looks_up_object_property() {
        let tree = build(json!({
            "type": "object",
            "properties": {"ldhName": {"type": "string"}}
        }));
        assert!(find_child(&tree, tree.root(), "ldhName").is_some());
        assert!(find_child(&tree, tree.root(), "missing").is_none());
    }

    #[test]
    fn search_bottom_most_error_code_walks_upward() {
        let tree = build(json!({
            "type": "object",
            "errorCode": -10400,
            "properties": {"ldhName": {"type": "string"}}
        }));
        assert_eq!(
            search_bottom_most_error_code(&tree, tree.root(), "ldhName", "errorCode"),
            Some(-10400)
        );
    }

    #[test]
    fn find_associated_schema_descends_through_items() {
        let tree = build(json!({
            "type": "object",
            "properties": {
                "nameservers": {
                    "type": "array",
                    "items": {"type": "object", "properties": {"ldhName": {"type": "string"}}}
                }
            }
        }));
        let pointer = JsonPointer::parse("/nameservers/0/ldhName");
        assert!(find_associated_schema(&tree, tree.root(), &pointer).is_some());
    }

    #[test]
    fn find_validation_nodes_flattens_combined() {
        let tree = build(json!({
            "anyOf": [{"type": "string"}, {"type": "number"}]
        }));
        assert_eq!(find_validation_nodes(&tree, tree.root()).len(), 2);
    }

    #[test]
    fn find_all_values_of_skips_vcard_array() {
        let tree = build(json!({
            "type": "object",
            "properties": {
                "vcardArray": {"type": "array", "errorCode": -1, "items": {"$ref": "#/properties/vcardArray"}},
                "handle": {"type": "string", "errorCode": -10200}
            }
        }));
        let values = find_all_values_of(&tree, "errorCode");
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn find_json_pointers_by_schema_id_enumerates_every_array_index_present() {
        let tree = build(json!({
            "type": "object",
            "properties": {
                "entities": {
                    "type": "array",
                    "items": {"$id": "entity.json", "type": "object"}
                }
            }
        }));
        let document = json!({"entities": [{}, {}, {}]});
        let mut pointers = find_json_pointers_by_schema_id(&tree, "entity.json", &document);
        pointers.sort_by_key(|p| p.to_string());
        let rendered: Vec<String> = pointers.iter().map(|p| p.to_string()).collect();
        assert_eq!(rendered, vec!["/entities/0", "/entities/1", "/entities/2"]);
    }

    #[test]
    fn find_json_pointers_by_schema_id_yields_nothing_for_an_absent_property() {
        let tree = build(json!({
            "type": "object",
            "properties": {
                "entities": {
                    "type": "array",
                    "items": {"$id": "entity.json", "type": "object"}
                }
            }
        }));
        let document = json!({});
        let pointers = find_json_pointers_by_schema_id(&tree, "entity.json", &document);
        assert!(pointers.is_empty());
    }
}
