//! Where snapshots come from. The engine never fetches anything itself; the
//! host asks a [`GraphSource`] and hands the result to the engine.

mod demo;
mod parse;

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;

use crate::engine::model::{GraphSnapshot, NodeKind};

pub use demo::{default_demo_graph, generate_demo_graph};

const FOCUS_HOPS: usize = 2;
const MODE_HOPS: usize = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum GraphMode {
    #[default]
    Overview,
    Student,
    PersonalityType,
    Career,
    LearningPath,
}

impl GraphMode {
    pub const ALL: [Self; 5] = [
        Self::Overview,
        Self::Student,
        Self::PersonalityType,
        Self::Career,
        Self::LearningPath,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Student => "Students",
            Self::PersonalityType => "Personality types",
            Self::Career => "Careers",
            Self::LearningPath => "Learning paths",
        }
    }

    /// Node kind this mode centers on; `None` shows the whole graph.
    pub fn kind(self) -> Option<NodeKind> {
        match self {
            Self::Overview => None,
            Self::Student => Some(NodeKind::Student),
            Self::PersonalityType => Some(NodeKind::PersonalityType),
            Self::Career => Some(NodeKind::Career),
            Self::LearningPath => Some(NodeKind::LearningPath),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub mode: GraphMode,
    pub focus_id: Option<String>,
}

impl SnapshotRequest {
    pub fn new(mode: GraphMode, focus_id: Option<String>) -> Self {
        let focus_id = focus_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Self { mode, focus_id }
    }
}

pub trait GraphSource: Send + Sync {
    fn describe(&self) -> String;
    fn fetch(&self, request: &SnapshotRequest) -> Result<GraphSnapshot>;
}

/// Reads a JSON snapshot from disk on every fetch.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GraphSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self, request: &SnapshotRequest) -> Result<GraphSnapshot> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read graph file {}", self.path.display()))?;
        let snapshot = parse::parse_snapshot(&raw)
            .with_context(|| format!("failed to parse graph file {}", self.path.display()))?;
        scope_snapshot(snapshot, request)
    }
}

/// Built-in synthetic graph, scoped like any other source.
pub struct DemoSource {
    seed: u64,
    students: usize,
}

impl DemoSource {
    pub fn new(seed: u64, students: usize) -> Self {
        Self { seed, students }
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new(0, 24)
    }
}

impl GraphSource for DemoSource {
    fn describe(&self) -> String {
        format!("demo graph (seed {}, {} students)", self.seed, self.students)
    }

    fn fetch(&self, request: &SnapshotRequest) -> Result<GraphSnapshot> {
        scope_snapshot(generate_demo_graph(self.seed, self.students), request)
    }
}

/// Cuts a full snapshot down to what `request` asks for: a focus node's
/// two-hop neighborhood, a mode's nodes plus direct neighbors, or everything.
pub fn scope_snapshot(snapshot: GraphSnapshot, request: &SnapshotRequest) -> Result<GraphSnapshot> {
    let keep = {
        let (seeds, hops) = if let Some(focus) = &request.focus_id {
            if !snapshot.nodes.iter().any(|node| &node.id == focus) {
                bail!("focus node `{focus}` is not in the graph");
            }
            (vec![focus.as_str()], FOCUS_HOPS)
        } else if let Some(kind) = request.mode.kind() {
            let seeds = snapshot
                .nodes
                .iter()
                .filter(|node| node.kind == kind)
                .map(|node| node.id.as_str())
                .collect::<Vec<_>>();
            (seeds, MODE_HOPS)
        } else {
            return Ok(snapshot);
        };

        neighborhood(&snapshot, &seeds, hops)
    };

    let GraphSnapshot { nodes, edges } = snapshot;
    Ok(GraphSnapshot {
        nodes: nodes
            .into_iter()
            .filter(|node| keep.contains(&node.id))
            .collect(),
        edges: edges
            .into_iter()
            .filter(|edge| keep.contains(&edge.source_id) && keep.contains(&edge.target_id))
            .collect(),
    })
}

fn neighborhood(snapshot: &GraphSnapshot, seeds: &[&str], hops: usize) -> HashSet<String> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &snapshot.edges {
        adjacency
            .entry(edge.source_id.as_str())
            .or_default()
            .push(edge.target_id.as_str());
        adjacency
            .entry(edge.target_id.as_str())
            .or_default()
            .push(edge.source_id.as_str());
    }

    let mut seen = seeds.iter().copied().collect::<HashSet<_>>();
    let mut queue = seeds
        .iter()
        .map(|seed| (*seed, 0))
        .collect::<VecDeque<_>>();
    while let Some((id, depth)) = queue.pop_front() {
        if depth == hops {
            continue;
        }
        for &next in adjacency.get(id).into_iter().flatten() {
            if seen.insert(next) {
                queue.push_back((next, depth + 1));
            }
        }
    }

    seen.into_iter().map(str::to_owned).collect()
}
