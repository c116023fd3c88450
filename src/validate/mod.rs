//! The structural JSON Schema validator.
//!
//! Walks a raw schema document and a `serde_json::Value` instance
//! together and produces [`ValidationExceptionNode`]s. This operates
//! directly on the schema text rather than on [`crate::schema::SchemaTree`]
//! — the tree exists to answer annotation questions *after* a failure
//! is known, not to drive the walk itself.
use crate::exception::{ExceptionCategory, ValidationExceptionNode};
use crate::formats;
use crate::pointer::JsonPointer;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Resolves `$ref` the same way `schema::build` does, so the validator
/// and the annotation tree agree on what a reference points to.
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

struct Validator<'a> {
    resources: &'a BTreeMap<String, Value>,
}

impl<'a> Validator<'a> {
    fn resource(&self, name: &str) -> Option<&'a Value> {
        self.resources.get(name)
    }

    fn resolve_ref<'b>(&self, resource: &str, reference: &str) -> Option<(&'a Value, String)> {
        let (target_resource, target_pointer) = split_reference(resource, reference);
        let doc = self.resource(&target_resource)?;
        if target_pointer.is_empty() {
            Some((doc, target_resource))
        } else {
            JsonPointer::parse(&target_pointer)
                .resolve(doc)
                .map(|value| (value, target_resource))
        }
    }

    fn validate_node(
        &self,
        resource: &str,
        schema: &'a Value,
        instance: &Value,
        instance_pointer: &JsonPointer,
        schema_pointer: &JsonPointer,
        out: &mut Vec<ValidationExceptionNode>,
    ) {
        let map = match schema {
            Value::Bool(true) => return,
            Value::Bool(false) => {
                out.push(ValidationExceptionNode::leaf(
                    ExceptionCategory::BasicType,
                    instance_pointer.clone(),
                    schema_pointer.clone(),
                    "schema is `false`; no instance satisfies it",
                ));
                return;
            }
            Value::Object(map) => map,
            _ => return,
        };

        if let Some(Value::String(reference)) = map.get("$ref") {
            if let Some((target_schema, _target_resource)) = self.resolve_ref(resource, reference) {
                self.validate_node(
                    resource,
                    target_schema,
                    instance,
                    instance_pointer,
                    schema_pointer,
                    out,
                );
            }
            return;
        }

        self.check_type(map, instance, instance_pointer, schema_pointer, out);
        self.check_enum(map, instance, instance_pointer, schema_pointer, out);
        self.check_const(map, instance, instance_pointer, schema_pointer, out);
        self.check_format(map, instance, instance_pointer, schema_pointer, out);
        self.check_numeric_bounds(map, instance, instance_pointer, schema_pointer, out);

        if let Value::Object(instance_map) = instance {
            self.check_required(map, instance_map, instance_pointer, schema_pointer, out);
            self.check_additional_properties(map, instance_map, instance_pointer, schema_pointer, out);
            self.check_dependencies(map, instance_map, instance_pointer, schema_pointer, out);
            if let Some(Value::Object(properties)) = map.get("properties") {
                for (key, sub_schema) in properties {
                    if let Some(sub_instance) = instance_map.get(key) {
                        self.validate_node(
                            resource,
                            sub_schema,
                            sub_instance,
                            &instance_pointer.child(key.as_str()),
                            &schema_pointer.child("properties").child(key.as_str()),
                            out,
                        );
                    }
                }
            }
        }

        if let Value::Array(items_instance) = instance {
            self.check_unique_items(map, items_instance, instance_pointer, schema_pointer, out);
            self.check_contains(map, items_instance, instance_pointer, schema_pointer, out);
            if let Some(item_schema) = map.get("items").filter(|v| !v.is_array()) {
                for (index, element) in items_instance.iter().enumerate() {
                    self.validate_node(
                        resource,
                        item_schema,
                        element,
                        &instance_pointer.child(index),
                        &schema_pointer.child("items"),
                        out,
                    );
                }
            }
        }

        self.check_combined(resource, map, instance, instance_pointer, schema_pointer, out);
    }

    fn check_type(
        &self,
        map: &Map<String, Value>,
        instance: &Value,
        instance_pointer: &JsonPointer,
        schema_pointer: &JsonPointer,
        out: &mut Vec<ValidationExceptionNode>,
    ) {
        let Some(expected) = map.get("type") else {
            return;
        };
        let matches = match expected {
            Value::String(type_name) => instance_matches_type(instance, type_name),
            Value::Array(type_names) => type_names
                .iter()
                .filter_map(Value::as_str)
                .any(|type_name| instance_matches_type(instance, type_name)),
            _ => true,
        };
        if !matches {
            out.push(ValidationExceptionNode::leaf(
                ExceptionCategory::BasicType,
                instance_pointer.clone(),
                schema_pointer.child("type"),
                format!("instance does not match declared type {}", expected),
            ));
        }
    }

    fn check_enum(
        &self,
        map: &Map<String, Value>,
        instance: &Value,
        instance_pointer: &JsonPointer,
        schema_pointer: &JsonPointer,
        out: &mut Vec<ValidationExceptionNode>,
    ) {
        if let Some(Value::Array(values)) = map.get("enum") {
            if !values.contains(instance) {
                out.push(ValidationExceptionNode::leaf(
                    ExceptionCategory::Enum,
                    instance_pointer.clone(),
                    schema_pointer.child("enum"),
                    "instance is not one of the enumerated values",
                ));
            }
        }
    }

    fn check_const(
        &self,
        map: &Map<String, Value>,
        instance: &Value,
        instance_pointer: &JsonPointer,
        schema_pointer: &JsonPointer,
        out: &mut Vec<ValidationExceptionNode>,
    ) {
        if let Some(expected) = map.get("const") {
            if instance != expected {
                out.push(ValidationExceptionNode::leaf(
                    ExceptionCategory::Const,
                    instance_pointer.clone(),
                    schema_pointer.child("const"),
                    format!("instance does not equal required constant {}", expected),
                ));
            }
        }
    }

    fn check_format(
        &self,
        map: &Map<String, Value>,
        instance: &Value,
        instance_pointer: &JsonPointer,
        schema_pointer: &JsonPointer,
        out: &mut Vec<ValidationExceptionNode>,
    ) {
        let Some(Value::String(format_name)) = map.get("format") else {
            return;
        };
        let Value::String(text) = instance else {
            return;
        };
        let (category, valid) = match format_name.as_str() {
            "date-time" => (ExceptionCategory::Datetime, formats::datetime(text)),
            "ipv4" => (ExceptionCategory::Ipv4, formats::ipv4(text)),
            "ipv6" => (ExceptionCategory::Ipv6, formats::ipv6(text)),
            "idn-hostname" => (ExceptionCategory::IdnHostname, formats::idn_hostname(text)),
            "hostname-in-uri" => (
                ExceptionCategory::HostnameInUri,
                formats::hostname_in_uri(text),
            ),
            "hostname" => (ExceptionCategory::IdnHostname, formats::hostname(text)),
            _ => return,
        };
        if !valid {
            out.push(ValidationExceptionNode::leaf(
                category,
                instance_pointer.clone(),
                schema_pointer.child("format"),
                format!("instance does not satisfy format \"{}\"", format_name),
            ));
        }
    }

    fn check_numeric_bounds(
        &self,
        map: &Map<String, Value>,
        instance: &Value,
        instance_pointer: &JsonPointer,
        schema_pointer: &JsonPointer,
        out: &mut Vec<ValidationExceptionNode>,
    ) {
        if let Value::String(text) = instance {
            let length = text.chars().count() as u64;
            if let Some(min) = map.get("minLength").and_then(Value::as_u64) {
                if length < min {
                    out.push(bound_failure(instance_pointer, schema_pointer, "minLength"));
                }
            }
            if let Some(max) = map.get("maxLength").and_then(Value::as_u64) {
                if length > max {
                    out.push(bound_failure(instance_pointer, schema_pointer, "maxLength"));
                }
            }
            if let Some(pattern) = map.get("pattern").and_then(Value::as_str) {
                if let Ok(re) = regex::Regex::new(pattern) {
                    if !re.is_match(text) {
                        out.push(ValidationExceptionNode::leaf(
                            ExceptionCategory::Regex,
                            instance_pointer.clone(),
                            schema_pointer.child("pattern"),
                            format!("instance does not match pattern /{}/", pattern),
                        ));
                    }
                }
            }
        }

        if let Some(number) = instance.as_f64() {
            if let Some(min) = map.get("minimum").and_then(Value::as_f64) {
                if number < min {
                    out.push(bound_failure(instance_pointer, schema_pointer, "minimum"));
                }
            }
            if let Some(max) = map.get("maximum").and_then(Value::as_f64) {
                if number > max {
                    out.push(bound_failure(instance_pointer, schema_pointer, "maximum"));
                }
            }
            if let Some(multiple_of) = map.get("multipleOf").and_then(Value::as_f64) {
                if multiple_of > 0.0 && (number / multiple_of).fract().abs() > f64::EPSILON {
                    out.push(bound_failure(instance_pointer, schema_pointer, "multipleOf"));
                }
            }
        }

        if let Value::Array(items) = instance {
            let length = items.len() as u64;
            if let Some(min) = map.get("minItems").and_then(Value::as_u64) {
                if length < min {
                    out.push(bound_failure(instance_pointer, schema_pointer, "minItems"));
                }
            }
            if let Some(max) = map.get("maxItems").and_then(Value::as_u64) {
                if length > max {
                    out.push(bound_failure(instance_pointer, schema_pointer, "maxItems"));
                }
            }
        }
    }

    fn check_required(
        &self,
        map: &Map<String, Value>,
        instance_map: &Map<String, Value>,
        instance_pointer: &JsonPointer,
        schema_pointer: &JsonPointer,
        out: &mut Vec<ValidationExceptionNode>,
    ) {
        if let Some(Value::Array(required)) = map.get("required") {
            for key in required.iter().filter_map(Value::as_str) {
                if !instance_map.contains_key(key) {
                    out.push(ValidationExceptionNode::leaf(
                        ExceptionCategory::MissingKey,
                        instance_pointer.child(key),
                        schema_pointer.child("required"),
                        format!("required key \"{}\" is missing", key),
                    ));
                }
            }
        }
    }

    fn check_additional_properties(
        &self,
        map: &Map<String, Value>,
        instance_map: &Map<String, Value>,
        instance_pointer: &JsonPointer,
        schema_pointer: &JsonPointer,
        out: &mut Vec<ValidationExceptionNode>,
    ) {
        if let Some(Value::Bool(false)) = map.get("additionalProperties") {
            let known: Vec<&str> = map
                .get("properties")
                .and_then(Value::as_object)
                .map(|properties| properties.keys().map(String::as_str).collect())
                .unwrap_or_default();
            for key in instance_map.keys() {
                if !known.contains(&key.as_str()) {
                    out.push(ValidationExceptionNode::leaf(
                        ExceptionCategory::UnknownKey,
                        instance_pointer.child(key.as_str()),
                        schema_pointer.child("additionalProperties"),
                        format!("key \"{}\" is not permitted by this schema", key),
                    ));
                }
            }
        }
    }

    fn check_dependencies(
        &self,
        map: &Map<String, Value>,
        instance_map: &Map<String, Value>,
        instance_pointer: &JsonPointer,
        schema_pointer: &JsonPointer,
        out: &mut Vec<ValidationExceptionNode>,
    ) {
        let dependency_keyword = if map.contains_key("dependentRequired") {
            "dependentRequired"
        } else if map.contains_key("dependencies") {
            "dependencies"
        } else {
            return;
        };
        let Some(Value::Object(dependencies)) = map.get(dependency_keyword) else {
            return;
        };
        for (trigger, required) in dependencies {
            if !instance_map.contains_key(trigger) {
                continue;
            }
            if let Value::Array(required_keys) = required {
                for key in required_keys.iter().filter_map(Value::as_str) {
                    if !instance_map.contains_key(key) {
                        out.push(ValidationExceptionNode::leaf(
                            ExceptionCategory::Dependencies,
                            instance_pointer.child(key),
                            schema_pointer.child(dependency_keyword),
                            format!(
                                "\"{}\" requires \"{}\" to also be present",
                                trigger, key
                            ),
                        ));
                    }
                }
            }
        }
    }

    fn check_unique_items(
        &self,
        map: &Map<String, Value>,
        items: &[Value],
        instance_pointer: &JsonPointer,
        schema_pointer: &JsonPointer,
        out: &mut Vec<ValidationExceptionNode>,
    ) {
        if map.get("uniqueItems") == Some(&Value::Bool(true)) {
            for i in 0..items.len() {
                for j in (i + 1)..items.len() {
                    if items[i] == items[j] {
                        out.push(ValidationExceptionNode::leaf(
                            ExceptionCategory::UniqueItems,
                            instance_pointer.clone(),
                            schema_pointer.child("uniqueItems"),
                            "array elements are not unique",
                        ));
                        return;
                    }
                }
            }
        }
    }

    fn check_contains(
        &self,
        map: &Map<String, Value>,
        items: &[Value],
        instance_pointer: &JsonPointer,
        schema_pointer: &JsonPointer,
        out: &mut Vec<ValidationExceptionNode>,
    ) {
        if let Some(Value::Object(contains)) = map.get("contains") {
            if let Some(expected) = contains.get("const") {
                if !items.contains(expected) {
                    out.push(ValidationExceptionNode::leaf(
                        ExceptionCategory::ContainsConst,
                        instance_pointer.clone(),
                        schema_pointer.child("contains"),
                        format!("array does not contain required value {}", expected),
                    ));
                }
            }
        }
    }

    fn check_combined(
        &self,
        resource: &str,
        map: &Map<String, Value>,
        instance: &Value,
        instance_pointer: &JsonPointer,
        schema_pointer: &JsonPointer,
        out: &mut Vec<ValidationExceptionNode>,
    ) {
        if let Some(Value::Array(alternatives)) = map.get("anyOf") {
            let mut causes = Vec::new();
            let matched = alternatives.iter().enumerate().any(|(index, alt)| {
                let mut branch = Vec::new();
                self.validate_node(
                    resource,
                    alt,
                    instance,
                    instance_pointer,
                    &schema_pointer.child("anyOf").child(index),
                    &mut branch,
                );
                let ok = branch.is_empty();
                causes.extend(branch);
                ok
            });
            if !matched {
                out.push(ValidationExceptionNode::complex(
                    instance_pointer.clone(),
                    schema_pointer.child("anyOf"),
                    "instance did not match any alternative of anyOf",
                    causes,
                ));
            }
        }

        if let Some(Value::Array(alternatives)) = map.get("oneOf") {
            let mut matches = 0;
            let mut causes = Vec::new();
            for (index, alt) in alternatives.iter().enumerate() {
                let mut branch = Vec::new();
                self.validate_node(
                    resource,
                    alt,
                    instance,
                    instance_pointer,
                    &schema_pointer.child("oneOf").child(index),
                    &mut branch,
                );
                if branch.is_empty() {
                    matches += 1;
                } else {
                    causes.extend(branch);
                }
            }
            if matches != 1 {
                out.push(ValidationExceptionNode::complex(
                    instance_pointer.clone(),
                    schema_pointer.child("oneOf"),
                    format!("instance matched {} alternatives of oneOf, expected exactly 1", matches),
                    causes,
                ));
            }
        }

        if let Some(Value::Array(members)) = map.get("allOf") {
            let mut causes = Vec::new();
            for (index, member) in members.iter().enumerate() {
                self.validate_node(
                    resource,
                    member,
                    instance,
                    instance_pointer,
                    &schema_pointer.child("allOf").child(index),
                    &mut causes,
                );
            }
            if !causes.is_empty() {
                out.push(ValidationExceptionNode::complex(
                    instance_pointer.clone(),
                    schema_pointer.child("allOf"),
                    "instance failed one or more allOf members",
                    causes,
                ));
            }
        }
    }
}

fn bound_failure(
    instance_pointer: &JsonPointer,
    schema_pointer: &JsonPointer,
    keyword: &str,
) -> ValidationExceptionNode {
    ValidationExceptionNode::leaf(
        ExceptionCategory::Numeric,
        instance_pointer.clone(),
        schema_pointer.child(keyword),
        format!("instance violates the \"{}\" bound", keyword),
    )
}

fn instance_matches_type(instance: &Value, type_name: &str) -> bool {
    match type_name {
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "string" => instance.is_string(),
        "integer" => instance.is_i64() || instance.is_u64(),
        "number" => instance.is_number(),
        "boolean" => instance.is_boolean(),
        "null" => instance.is_null(),
        _ => true,
    }
}

/// Validate `instance` against the named root resource, returning the
/// top-level exceptions found (each a leaf or a `Complex` node wrapping
/// its own causes). An empty vector means the instance is valid.
pub fn validate(
    resources: &BTreeMap<String, Value>,
    root_resource: &str,
    instance: &Value,
) -> Vec<ValidationExceptionNode> {
    let mut out = Vec::new();
    if let Some(schema) = resources.get(root_resource) {
        let validator = Validator { resources };
        validator.validate_node(
            root_resource,
            schema,
            instance,
            &JsonPointer::root(),
            &JsonPointer::root(),
            &mut out,
        );
    }
    out
}
