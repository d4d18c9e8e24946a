use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::{DocGraph, DocumentRecord, GraphEdge, GraphNode, LinkRecord};

pub const SYNTHETIC_TITLE_PLACEHOLDER: &str = "Untitled document";

#[derive(Clone, Debug, Default)]
pub struct GraphBuild {
    pub graph: DocGraph,
    /// The document list was larger than the cap and has been truncated.
    pub was_capped: bool,
    pub dropped_links: usize,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn most_recent(documents: &[DocumentRecord], cap: Option<usize>) -> (Vec<&DocumentRecord>, bool) {
    let mut kept = documents.iter().collect::<Vec<_>>();
    let Some(cap) = cap.filter(|&cap| documents.len() > cap) else {
        return (kept, false);
    };

    // `None` sorts before any timestamp, so reversed it lands last.
    kept.sort_by_key(|document| Reverse(document.updated_at));
    kept.truncate(cap);
    (kept, true)
}

pub fn build_graph(
    documents: &[DocumentRecord],
    links: &[LinkRecord],
    cap: Option<usize>,
) -> GraphBuild {
    let (documents, was_capped) = most_recent(documents, cap);

    let mut nodes = Vec::with_capacity(documents.len());
    let mut index_by_id: HashMap<&str, usize> = HashMap::with_capacity(documents.len());
    for document in documents {
        if index_by_id.contains_key(document.id.as_str()) {
            continue;
        }
        index_by_id.insert(document.id.as_str(), nodes.len());
        nodes.push(GraphNode::new(
            document.id.clone(),
            document.title.clone(),
            false,
        ));
    }

    let mut edges = Vec::new();
    let mut seen_edges = HashSet::new();
    let mut dropped_links = 0usize;

    for link in links {
        let (Some(from_id), Some(to_id)) = (
            non_empty(link.from_id.as_deref()),
            non_empty(link.to_id.as_deref()),
        ) else {
            debug!(link = %link.id, "dropping link without both endpoints");
            dropped_links += 1;
            continue;
        };

        if link.id.is_empty() || from_id == to_id {
            dropped_links += 1;
            continue;
        }

        let Some(&source) = index_by_id.get(from_id) else {
            debug!(link = %link.id, from = from_id, "dropping link from unknown document");
            dropped_links += 1;
            continue;
        };

        if !seen_edges.insert(link.id.as_str()) {
            continue;
        }

        let hint = non_empty(link.target_title.as_deref());
        let existing = index_by_id.get(to_id).copied();
        let target = match existing {
            Some(target) => {
                let node = &mut nodes[target];
                if node.synthetic
                    && node.title == SYNTHETIC_TITLE_PLACEHOLDER
                    && let Some(hint) = hint
                {
                    node.title = hint.to_owned();
                }
                target
            }
            None => {
                let target = nodes.len();
                let title = hint.unwrap_or(SYNTHETIC_TITLE_PLACEHOLDER).to_owned();
                nodes.push(GraphNode::new(to_id.to_owned(), title, true));
                index_by_id.insert(to_id, target);
                target
            }
        };

        nodes[source].degree += 1;
        nodes[target].degree += 1;
        edges.push(GraphEdge {
            id: link.id.clone(),
            source,
            target,
            label: non_empty(link.link_text.as_deref()).map(str::to_owned),
        });
    }

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        dropped_links,
        was_capped,
        "built document graph"
    );

    GraphBuild {
        graph: DocGraph::from_parts(nodes, edges),
        was_capped,
        dropped_links,
    }
}
