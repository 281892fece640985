use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::engine::geometry::point;
use crate::engine::model::{Edge, GraphSnapshot, MetadataValue, NodeKind, NodeSpec};

const RESERVED_NODE_KEYS: [&str; 9] = [
    "id",
    "name",
    "displayName",
    "label",
    "type",
    "kind",
    "description",
    "x",
    "y",
];
const DEFAULT_EDGE_KIND: &str = "related";

/// Parses a graph snapshot document: `nodes` plus `edges` (or `links`).
pub(super) fn parse_snapshot(raw: &str) -> Result<GraphSnapshot> {
    let parsed: Value = serde_json::from_str(raw).context("invalid graph JSON")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("graph JSON must be an object with a `nodes` array"))?;

    let raw_nodes = object
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("graph JSON has no `nodes` array"))?;
    let nodes = raw_nodes
        .iter()
        .enumerate()
        .map(|(index, value)| parse_node(value).with_context(|| format!("invalid node #{index}")))
        .collect::<Result<Vec<_>>>()?;

    let edges = match object.get("edges").or_else(|| object.get("links")) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(raw_edges)) => raw_edges
            .iter()
            .enumerate()
            .map(|(index, value)| {
                parse_edge(value).with_context(|| format!("invalid edge #{index}"))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => bail!("`edges` must be an array"),
    };

    Ok(GraphSnapshot { nodes, edges })
}

fn parse_node(value: &Value) -> Result<NodeSpec> {
    let object = value
        .as_object()
        .ok_or_else(|| anyhow!("node is not an object"))?;

    let id = object
        .get("id")
        .and_then(id_string)
        .ok_or_else(|| anyhow!("node has no `id`"))?;

    let kind_value = first_present(object, &["type", "kind"])
        .ok_or_else(|| anyhow!("node `{id}` has no `type`"))?;
    let kind = NodeKind::deserialize(kind_value)
        .with_context(|| format!("node `{id}` has unknown type {kind_value}"))?;

    let display_name = first_present(object, &["displayName", "name", "label"])
        .and_then(Value::as_str)
        .unwrap_or(&id)
        .to_string();

    let mut spec = NodeSpec::new(id, display_name, kind);
    if let Some(description) = object.get("description").and_then(Value::as_str) {
        spec = spec.with_description(description);
    }

    let x = object.get("x").and_then(Value::as_f64);
    let y = object.get("y").and_then(Value::as_f64);
    if let (Some(x), Some(y)) = (x, y) {
        spec = spec.with_position(point(x, y));
    }

    for (key, value) in object {
        if RESERVED_NODE_KEYS.contains(&key.as_str()) {
            continue;
        }
        if let Some(value) = metadata_value(value) {
            spec = spec.with_metadata(key.clone(), value);
        }
    }

    Ok(spec)
}

fn parse_edge(value: &Value) -> Result<Edge> {
    let object = value
        .as_object()
        .ok_or_else(|| anyhow!("edge is not an object"))?;

    let source = object
        .get("source")
        .and_then(endpoint_id)
        .ok_or_else(|| anyhow!("edge has no `source`"))?;
    let target = object
        .get("target")
        .and_then(endpoint_id)
        .ok_or_else(|| anyhow!("edge has no `target`"))?;
    let kind = first_present(object, &["type", "kind"])
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_EDGE_KIND);
    let label = object
        .get("label")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Ok(Edge::new(source, target, kind, label))
}

fn first_present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Edge endpoints may be bare ids or embedded node objects.
fn endpoint_id(value: &Value) -> Option<String> {
    id_string(value).or_else(|| value.get("id").and_then(id_string))
}

fn metadata_value(value: &Value) -> Option<MetadataValue> {
    match value {
        Value::Bool(flag) => Some(MetadataValue::Bool(*flag)),
        Value::Number(number) => number.as_f64().map(MetadataValue::Number),
        Value::String(text) => Some(MetadataValue::Text(text.clone())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nodes_edges_and_metadata() {
        let raw = r#"{
            "nodes": [
                {"id": "s1", "displayName": "Ada", "type": "Student", "gpa": 3.9, "active": true},
                {"id": "intj", "name": "INTJ", "kind": "personality_type", "description": "Architect"},
                {"id": 7, "type": "career", "x": 10, "y": -4, "tags": ["a"]}
            ],
            "edges": [
                {"source": "s1", "target": "intj", "type": "has_type", "label": "is"},
                {"source": "intj", "target": 7}
            ]
        }"#;

        let snapshot = parse_snapshot(raw).expect("valid snapshot");
        assert_eq!(snapshot.nodes.len(), 3);

        let student = &snapshot.nodes[0];
        assert_eq!(student.display_name, "Ada");
        assert_eq!(student.kind, NodeKind::Student);
        assert_eq!(student.metadata.get("gpa"), Some(&MetadataValue::Number(3.9)));
        assert_eq!(student.metadata.get("active"), Some(&MetadataValue::Bool(true)));

        let personality = &snapshot.nodes[1];
        assert_eq!(personality.kind, NodeKind::PersonalityType);
        assert_eq!(personality.description.as_deref(), Some("Architect"));

        let career = &snapshot.nodes[2];
        assert_eq!(career.id, "7");
        assert_eq!(career.display_name, "7");
        assert_eq!(career.position, Some(point(10.0, -4.0)));
        assert!(career.metadata.is_empty());

        assert_eq!(snapshot.edges[0], Edge::new("s1", "intj", "has_type", "is"));
        assert_eq!(snapshot.edges[1], Edge::new("intj", "7", DEFAULT_EDGE_KIND, ""));
    }

    #[test]
    fn accepts_links_with_embedded_endpoints() {
        let raw = r#"{
            "nodes": [{"id": "a", "type": "skill"}, {"id": "b", "type": "course"}],
            "links": [{"source": {"id": "a"}, "target": {"id": "b"}, "kind": "teaches"}]
        }"#;
        let snapshot = parse_snapshot(raw).expect("valid snapshot");
        assert_eq!(snapshot.edges, vec![Edge::new("a", "b", "teaches", "")]);
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse_snapshot("not json").is_err());
        assert!(parse_snapshot(r#"{"edges": []}"#).is_err());
        assert!(parse_snapshot(r#"{"nodes": [{"type": "skill"}]}"#).is_err());
        assert!(parse_snapshot(r#"{"nodes": [{"id": "a", "type": "planet"}]}"#).is_err());
        assert!(parse_snapshot(r#"{"nodes": [], "edges": {}}"#).is_err());

        let error = parse_snapshot(r#"{"nodes": [{"id": "a"}]}"#).expect_err("missing type");
        assert!(format!("{error:#}").contains("node #0"));
    }
}
