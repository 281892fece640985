use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use super::geometry::Point;
use crate::util::stable_key;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[serde(alias = "Student")]
    Student,
    #[serde(alias = "PersonalityType", alias = "personality", alias = "mbti")]
    PersonalityType,
    #[serde(alias = "Career")]
    Career,
    #[serde(alias = "Skill")]
    Skill,
    #[serde(alias = "Course")]
    Course,
    #[serde(alias = "LearningPath", alias = "path")]
    LearningPath,
}

impl NodeKind {
    pub const ALL: [Self; 6] = [
        Self::Student,
        Self::PersonalityType,
        Self::Career,
        Self::Skill,
        Self::Course,
        Self::LearningPath,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::PersonalityType => "Personality type",
            Self::Career => "Career",
            Self::Skill => "Skill",
            Self::Course => "Course",
            Self::LearningPath => "Learning path",
        }
    }

    /// World-space radius for nodes of this kind.
    pub fn radius(self) -> f64 {
        match self {
            Self::Student => 10.0,
            Self::PersonalityType => 14.0,
            Self::Career => 12.0,
            Self::Skill => 8.0,
            Self::Course => 9.0,
            Self::LearningPath => 11.0,
        }
    }

    pub fn color(self) -> Color32 {
        match self {
            Self::Student => Color32::from_rgb(103, 196, 255),
            Self::PersonalityType => Color32::from_rgb(196, 132, 252),
            Self::Career => Color32::from_rgb(246, 194, 111),
            Self::Skill => Color32::from_rgb(120, 214, 150),
            Self::Course => Color32::from_rgb(241, 146, 94),
            Self::LearningPath => Color32::from_rgb(240, 110, 150),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

pub type Metadata = BTreeMap<String, MetadataValue>;

/// A node as supplied by a data source, before the engine adds layout state.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSpec {
    pub id: String,
    pub display_name: String,
    pub kind: NodeKind,
    pub description: Option<String>,
    /// Optional layout hint used when the id has no position yet.
    pub position: Option<Point>,
    pub metadata: Metadata,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind,
            description: None,
            position: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    pub kind: String,
    pub label: String,
}

impl Edge {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        kind: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            kind: kind.into(),
            label: label.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }
}

/// A complete graph as handed over by a data source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub display_name: String,
    pub kind: NodeKind,
    pub radius: f64,
    pub color: Color32,
    pub position: Point,
    pub velocity: Point,
    pub pinned: Option<Point>,
    pub description: Option<String>,
    pub metadata: Metadata,
    pub(crate) key: u64,
}

impl Node {
    fn from_spec(spec: NodeSpec, position: Point) -> Self {
        let key = stable_key(&spec.id);
        Self {
            radius: spec.kind.radius(),
            color: spec.kind.color(),
            id: spec.id,
            display_name: spec.display_name,
            kind: spec.kind,
            position,
            velocity: Point::ZERO,
            pinned: None,
            description: spec.description,
            metadata: spec.metadata,
            key,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaceReport {
    pub nodes: usize,
    pub edges: usize,
    pub duplicate_nodes: usize,
    pub dropped_edges: usize,
    pub carried_positions: usize,
}

/// Nodes in snapshot order plus validated edges. Identity only changes
/// through [`GraphModel::replace`].
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    index_by_id: HashMap<String, usize>,
    edges: Vec<Edge>,
    links: Vec<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
    revision: u64,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let mut model = Self::new();
        model.replace(snapshot);
        model
    }

    /// Swaps in a new snapshot atomically. Positions of ids present in the
    /// previous snapshot are kept; pins and velocities are not.
    pub fn replace(&mut self, snapshot: GraphSnapshot) -> ReplaceReport {
        let mut report = ReplaceReport::default();

        let mut prior_positions = self
            .nodes
            .drain(..)
            .filter(|node| node.position.is_finite())
            .map(|node| (node.id, node.position))
            .collect::<HashMap<_, _>>();

        let mut nodes = Vec::with_capacity(snapshot.nodes.len());
        let mut index_by_id = HashMap::with_capacity(snapshot.nodes.len());
        for spec in snapshot.nodes {
            match index_by_id.entry(spec.id.clone()) {
                Entry::Occupied(_) => {
                    tracing::warn!(node_id = %spec.id, "dropping duplicate node id from snapshot");
                    report.duplicate_nodes += 1;
                }
                Entry::Vacant(slot) => {
                    slot.insert(nodes.len());
                    let position = match prior_positions.remove(&spec.id) {
                        Some(position) => {
                            report.carried_positions += 1;
                            position
                        }
                        None => spec
                            .position
                            .filter(|position| position.is_finite())
                            .unwrap_or(Point::UNPLACED),
                    };
                    nodes.push(Node::from_spec(spec, position));
                }
            }
        }

        let mut edges = Vec::with_capacity(snapshot.edges.len());
        let mut links = Vec::with_capacity(snapshot.edges.len());
        let mut adjacency_sets = vec![HashSet::new(); nodes.len()];
        for edge in snapshot.edges {
            let source = index_by_id.get(&edge.source_id).copied();
            let target = index_by_id.get(&edge.target_id).copied();
            let (Some(source), Some(target)) = (source, target) else {
                tracing::warn!(
                    source = %edge.source_id,
                    target = %edge.target_id,
                    kind = %edge.kind,
                    "dropping edge with an endpoint missing from the snapshot"
                );
                report.dropped_edges += 1;
                continue;
            };

            if source != target {
                adjacency_sets[source].insert(target);
                adjacency_sets[target].insert(source);
            }
            links.push((source, target));
            edges.push(edge);
        }

        let adjacency = adjacency_sets
            .into_iter()
            .map(|set| {
                let mut neighbors = set.into_iter().collect::<Vec<_>>();
                neighbors.sort_unstable();
                neighbors
            })
            .collect();

        report.nodes = nodes.len();
        report.edges = edges.len();

        self.nodes = nodes;
        self.index_by_id = index_by_id;
        self.edges = edges;
        self.links = links;
        self.adjacency = adjacency;
        self.revision = self.revision.wrapping_add(1);

        report
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn neighbors_of(&self, id: &str) -> Vec<&Node> {
        let Some(index) = self.index_of(id) else {
            return Vec::new();
        };
        self.adjacency[index]
            .iter()
            .map(|&neighbor| &self.nodes[neighbor])
            .collect()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Pins a node in place (or releases it with `None`). Pinning snaps the
    /// position immediately so the pin holds even while the layout is settled.
    pub fn set_pin(&mut self, id: &str, pin: Option<Point>) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let node = &mut self.nodes[index];
        node.pinned = pin;
        node.velocity = Point::ZERO;
        if let Some(pin) = pin {
            node.position = pin;
        }
        true
    }

    pub fn set_position(&mut self, id: &str, position: Point) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let node = &mut self.nodes[index];
        node.position = position;
        node.velocity = Point::ZERO;
        true
    }

    pub(crate) fn links(&self) -> &[(usize, usize)] {
        &self.links
    }

    pub(crate) fn neighbor_indices(&self, index: usize) -> &[usize] {
        self.adjacency.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geometry::point;

    fn sample() -> GraphSnapshot {
        GraphSnapshot {
            nodes: vec![
                NodeSpec::new("s1", "Ada", NodeKind::Student),
                NodeSpec::new("intj", "INTJ", NodeKind::PersonalityType),
                NodeSpec::new("c1", "Data Scientist", NodeKind::Career),
            ],
            edges: vec![
                Edge::new("s1", "intj", "has_type", "is"),
                Edge::new("intj", "c1", "suits", "suits"),
            ],
        }
    }

    #[test]
    fn lookup_and_neighbors() {
        let model = GraphModel::from_snapshot(sample());
        assert_eq!(model.node_count(), 3);
        assert_eq!(
            model.get_node("c1").map(|node| node.kind),
            Some(NodeKind::Career)
        );
        assert!(model.get_node("missing").is_none());

        let mut neighbors = model
            .neighbors_of("intj")
            .into_iter()
            .map(|node| node.id.as_str())
            .collect::<Vec<_>>();
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec!["c1", "s1"]);
        assert!(model.neighbors_of("missing").is_empty());
    }

    #[test]
    fn radius_and_color_follow_kind() {
        let model = GraphModel::from_snapshot(sample());
        for node in model.nodes() {
            assert!(node.radius > 0.0);
            assert_eq!(node.radius, node.kind.radius());
            assert_eq!(node.color, node.kind.color());
        }
    }

    #[test]
    fn edges_with_missing_endpoints_are_dropped() {
        let mut snapshot = sample();
        snapshot
            .edges
            .push(Edge::new("s1", "ghost", "enrolled", "enrolled"));
        snapshot
            .edges
            .push(Edge::new("ghost", "c1", "enrolled", "enrolled"));

        let mut model = GraphModel::new();
        let report = model.replace(snapshot);
        assert_eq!(report.dropped_edges, 2);
        assert_eq!(report.edges, 2);
        assert_eq!(model.edge_count(), 2);
    }

    #[test]
    fn duplicate_ids_keep_the_first_node() {
        let mut snapshot = sample();
        snapshot
            .nodes
            .push(NodeSpec::new("s1", "Impostor", NodeKind::Skill));

        let mut model = GraphModel::new();
        let report = model.replace(snapshot);
        assert_eq!(report.duplicate_nodes, 1);
        assert_eq!(model.get_node("s1").map(|node| node.display_name.as_str()), Some("Ada"));
    }

    #[test]
    fn self_loops_are_kept_but_not_neighbors() {
        let mut snapshot = sample();
        snapshot.edges.push(Edge::new("c1", "c1", "related", "self"));

        let model = GraphModel::from_snapshot(snapshot);
        assert_eq!(model.edge_count(), 3);
        assert!(
            model
                .neighbors_of("c1")
                .iter()
                .all(|node| node.id != "c1")
        );
    }

    #[test]
    fn replace_carries_positions_and_clears_pins() {
        let mut model = GraphModel::from_snapshot(sample());
        assert!(model.set_position("s1", point(10.0, 20.0)));
        assert!(model.set_pin("intj", Some(point(-5.0, 5.0))));

        let mut next = sample();
        next.nodes.push(NodeSpec::new("skill", "Statistics", NodeKind::Skill));
        let report = model.replace(next);

        assert_eq!(report.carried_positions, 2);
        assert_eq!(model.revision(), 2);
        assert_eq!(
            model.get_node("s1").map(|node| node.position),
            Some(point(10.0, 20.0))
        );
        let intj = model.get_node("intj").expect("intj survives");
        assert_eq!(intj.pinned, None);
        assert_eq!(intj.position, point(-5.0, 5.0));
        assert!(
            !model
                .get_node("skill")
                .expect("new node exists")
                .position
                .is_finite()
        );
    }

    #[test]
    fn position_hint_seeds_new_nodes() {
        let snapshot = GraphSnapshot {
            nodes: vec![NodeSpec::new("a", "A", NodeKind::Course).with_position(point(3.0, 4.0))],
            edges: Vec::new(),
        };
        let model = GraphModel::from_snapshot(snapshot);
        assert_eq!(model.nodes()[0].position, point(3.0, 4.0));
    }

    #[test]
    fn pinning_snaps_position() {
        let mut model = GraphModel::from_snapshot(sample());
        assert!(model.set_pin("c1", Some(point(1.0, 2.0))));
        let node = model.get_node("c1").expect("node exists");
        assert_eq!(node.position, point(1.0, 2.0));
        assert_eq!(node.pinned, Some(point(1.0, 2.0)));
        assert!(!model.set_pin("ghost", None));
    }

    #[test]
    fn metadata_values_display_plainly() {
        assert_eq!(MetadataValue::Number(3.5).to_string(), "3.5");
        assert_eq!(MetadataValue::Bool(true).to_string(), "true");
        assert_eq!(MetadataValue::Text("INTJ".into()).to_string(), "INTJ");
    }
}
