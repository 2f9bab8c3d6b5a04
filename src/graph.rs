//! Whole-graph views of target expressions.
//!
//! [`walk`] flattens the graph below a set of roots into its distinct
//! targets, producers first. [`to_blueprint_json`] writes that list in the
//! blueprint format, using target ids as labels, so a composed flow can be
//! inspected, edited and fed back to `hwforge blueprint`.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::json;

use crate::target::{Target, TargetId};
use crate::value::Value;

/// Distinct targets reachable from `roots`, each listed after everything it
/// depends on.
#[must_use]
pub fn walk(roots: &[Arc<Target>]) -> Vec<Arc<Target>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for root in roots {
        visit(root, &mut seen, &mut out);
    }
    out
}

fn visit(target: &Arc<Target>, seen: &mut HashSet<TargetId>, out: &mut Vec<Arc<Target>>) {
    if !seen.insert(target.id().clone()) {
        return;
    }
    for dep in target.dependencies() {
        visit(dep, seen, out);
    }
    out.push(Arc::clone(target));
}

/// Serialise a parameter value, naming producers by id.
struct ParamView<'a>(&'a Value);

impl Serialize for ParamView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Str(text) => serializer.serialize_str(text),
            Value::Int(number) => serializer.serialize_i64(*number),
            Value::Bool(flag) => serializer.serialize_bool(*flag),
            Value::Path(path) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("path", path)?;
                map.end()
            }
            Value::List(items) => serializer.collect_seq(items.iter().map(ParamView)),
            Value::Map(entries) => {
                serializer.collect_map(entries.iter().map(|(key, value)| (key, ParamView(value))))
            }
            Value::Target(target) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("target", target.id())?;
                map.end()
            }
            Value::Field(field) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("field", field.field())?;
                map.serialize_entry("of", field.target().id())?;
                map.end()
            }
        }
    }
}

/// The graph below `roots` as a blueprint document.
#[must_use]
pub fn to_blueprint_json(roots: &[Arc<Target>]) -> serde_json::Value {
    let targets: serde_json::Map<String, serde_json::Value> = walk(roots)
        .iter()
        .map(|target| {
            let params: serde_json::Map<String, serde_json::Value> = target
                .params()
                .iter()
                .map(|(key, value)| (key.clone(), json!(ParamView(value))))
                .collect();
            let mut spec = json!({ "kind": target.name(), "params": params });
            if let (Some(dir), Some(object)) = (target.output_dir(), spec.as_object_mut()) {
                object.insert("output_dir".to_owned(), json!(dir));
            }
            (target.id().to_string(), spec)
        })
        .collect();
    let labels: Vec<String> = roots.iter().map(|root| root.id().to_string()).collect();
    json!({ "targets": targets, "roots": labels })
}
