use std::collections::HashMap;

use eframe::egui::Vec2;
use serde::Deserialize;

mod build;

pub use build::{GraphBuild, SYNTHETIC_TITLE_PLACEHOLDER, build_graph};

/// A document the host knows about.
#[derive(Clone, Debug, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Recency key in epoch milliseconds.
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<i64>,
}

/// A directed link between two documents, as fetched by the host.
#[derive(Clone, Debug, Deserialize)]
pub struct LinkRecord {
    pub id: String,
    #[serde(default, rename = "fromId")]
    pub from_id: Option<String>,
    #[serde(default, rename = "toId")]
    pub to_id: Option<String>,
    #[serde(default, rename = "linkText")]
    pub link_text: Option<String>,
    #[serde(default, rename = "targetTitle")]
    pub target_title: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub title: String,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Fixed coordinates held while the node is dragged.
    pub pin: Option<Vec2>,
    pub degree: usize,
    pub synthetic: bool,
}

impl GraphNode {
    pub fn new(id: String, title: String, synthetic: bool) -> Self {
        Self {
            id,
            title,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            pin: None,
            degree: 0,
            synthetic,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    pub id: String,
    /// Index of the source node.
    pub source: usize,
    /// Index of the target node.
    pub target: usize,
    pub label: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct DocGraph {
    pub(crate) nodes: Vec<GraphNode>,
    pub(crate) edges: Vec<GraphEdge>,
    index_by_id: HashMap<String, usize>,
    neighbors: Vec<Vec<usize>>,
}

impl DocGraph {
    pub(crate) fn from_parts(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            index_by_id.insert(node.id.clone(), index);
        }

        let mut neighbors = vec![Vec::new(); nodes.len()];
        for edge in &edges {
            neighbors[edge.source].push(edge.target);
            neighbors[edge.target].push(edge.source);
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            nodes,
            edges,
            index_by_id,
            neighbors,
        }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
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

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, index: usize) -> Option<&GraphNode> {
        self.nodes.get(index)
    }

    pub fn node_by_id(&self, id: &str) -> Option<&GraphNode> {
        self.index_of(id).and_then(|index| self.nodes.get(index))
    }

    /// Ids of both endpoints of an edge.
    pub fn endpoint_ids(&self, edge: &GraphEdge) -> (&str, &str) {
        (
            self.nodes[edge.source].id.as_str(),
            self.nodes[edge.target].id.as_str(),
        )
    }

    pub fn edge_by_id(&self, id: &str) -> Option<(usize, &GraphEdge)> {
        self.edges.iter().enumerate().find(|(_, edge)| edge.id == id)
    }

    /// Nodes sharing an edge with `index`, in either direction.
    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.neighbors.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn max_degree(&self) -> usize {
        self.nodes.iter().map(|node| node.degree).max().unwrap_or(0)
    }

    pub fn synthetic_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.synthetic).count()
    }
}
