use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::graph::DocGraph;

use super::GraphEngine;

/// Read-time filters; they never touch the simulation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub min_degree: usize,
    pub focus_query: String,
}

#[derive(Clone, Debug, Default)]
pub(super) struct Visibility {
    pub(super) nodes: Vec<bool>,
    pub(super) edges: Vec<bool>,
    pub(super) focus_matches: Vec<usize>,
    pub(super) best_match: Option<usize>,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

fn compute_visibility(graph: &DocGraph, filter: &ViewFilter) -> Visibility {
    let query = filter.focus_query.trim();
    let mut nodes = graph
        .nodes()
        .iter()
        .map(|node| node.degree >= filter.min_degree)
        .collect::<Vec<_>>();

    let mut focus_matches = Vec::new();
    let mut best_match = None;
    if !query.is_empty() {
        let matcher = SkimMatcherV2::default();
        let scores = graph
            .nodes()
            .iter()
            .map(|node| {
                fuzzy_match_score(&matcher, &node.title, query)
                    .max(fuzzy_match_score(&matcher, &node.id, query))
            })
            .collect::<Vec<_>>();

        let mut in_focus = vec![false; nodes.len()];
        for (index, score) in scores.iter().enumerate() {
            if score.is_some() {
                focus_matches.push(index);
                in_focus[index] = true;
                for &neighbor in graph.neighbors(index) {
                    in_focus[neighbor] = true;
                }
            }
        }

        for (visible, focused) in nodes.iter_mut().zip(&in_focus) {
            *visible &= *focused;
        }

        let mut best_score = i64::MIN;
        for &index in &focus_matches {
            if let Some(score) = scores[index]
                && nodes[index]
                && score > best_score
            {
                best_score = score;
                best_match = Some(index);
            }
        }
    }

    let edges = graph
        .edges()
        .iter()
        .map(|edge| nodes[edge.source] && nodes[edge.target])
        .collect();

    Visibility {
        nodes,
        edges,
        focus_matches,
        best_match,
    }
}

impl GraphEngine {
    pub(super) fn refresh_visibility(&mut self) {
        self.visibility = compute_visibility(self.layout.graph(), &self.filter);
        if self
            .selected_edge
            .is_some_and(|edge| !self.is_edge_visible(edge))
        {
            self.selected_edge = None;
        }
    }

    pub fn set_min_degree(&mut self, min_degree: usize) {
        if self.filter.min_degree == min_degree {
            return;
        }
        self.filter.min_degree = min_degree;
        self.refresh_visibility();
    }

    /// Filters to nodes matching `query` and their neighbours, then centers
    /// the view on the best visible match.
    pub fn set_focus_query(&mut self, query: &str) {
        if self.filter.focus_query == query {
            return;
        }
        self.filter.focus_query = query.to_owned();
        self.refresh_visibility();

        if let Some(best) = self.visibility.best_match
            && let Some(&position) = self.published_positions().get(best)
        {
            let transform = self.transform.centered_on(position, self.viewport_size);
            self.set_transform(transform);
        }
    }

    pub fn filter(&self) -> &ViewFilter {
        &self.filter
    }

    pub fn is_node_visible(&self, index: usize) -> bool {
        self.visibility.nodes.get(index).copied().unwrap_or(false)
    }

    pub fn is_edge_visible(&self, index: usize) -> bool {
        self.visibility.edges.get(index).copied().unwrap_or(false)
    }

    pub fn visible_node_count(&self) -> usize {
        self.visibility.nodes.iter().filter(|visible| **visible).count()
    }

    pub fn visible_edge_count(&self) -> usize {
        self.visibility.edges.iter().filter(|visible| **visible).count()
    }

    /// Nodes matching the focus query, whether or not the degree filter hides them.
    pub fn focus_matches(&self) -> &[usize] {
        &self.visibility.focus_matches
    }

    pub fn best_focus_match(&self) -> Option<usize> {
        self.visibility.best_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DocumentRecord, LinkRecord, build_graph};

    fn graph() -> DocGraph {
        let documents = [
            ("a", "Quarterly roadmap"),
            ("b", "Hiring plan"),
            ("c", "Office snacks"),
            ("d", "Roadmap appendix"),
        ]
        .map(|(id, title)| DocumentRecord {
            id: id.to_owned(),
            title: title.to_owned(),
            updated_at: None,
        });
        let links = [("e1", "a", "b"), ("e2", "b", "c")].map(|(id, from, to)| LinkRecord {
            id: id.to_owned(),
            from_id: Some(from.to_owned()),
            to_id: Some(to.to_owned()),
            link_text: None,
            target_title: None,
        });
        build_graph(&documents, &links, None).graph
    }

    #[test]
    fn min_degree_hides_isolated_nodes_and_their_edges() {
        let graph = graph();
        let visibility = compute_visibility(
            &graph,
            &ViewFilter {
                min_degree: 2,
                focus_query: String::new(),
            },
        );
        assert_eq!(visibility.nodes, [false, true, false, false]);
        assert_eq!(visibility.edges, [false, false]);
    }

    #[test]
    fn focus_keeps_matches_and_neighbours() {
        let graph = graph();
        let visibility = compute_visibility(
            &graph,
            &ViewFilter {
                min_degree: 0,
                focus_query: "hiring".to_owned(),
            },
        );
        assert_eq!(visibility.focus_matches, [1]);
        assert_eq!(visibility.best_match, Some(1));
        assert_eq!(visibility.nodes, [true, true, true, false]);
        assert_eq!(visibility.edges, [true, true]);
    }

    #[test]
    fn best_match_skips_nodes_hidden_by_degree() {
        let graph = graph();
        let visibility = compute_visibility(
            &graph,
            &ViewFilter {
                min_degree: 1,
                focus_query: "roadmap".to_owned(),
            },
        );
        assert_eq!(visibility.focus_matches, [0, 3]);
        assert_eq!(visibility.best_match, Some(0));
        assert!(!visibility.nodes[3]);
    }

    #[test]
    fn unmatched_query_hides_everything() {
        let graph = graph();
        let visibility = compute_visibility(
            &graph,
            &ViewFilter {
                min_degree: 0,
                focus_query: "zzzz".to_owned(),
            },
        );
        assert!(visibility.nodes.iter().all(|visible| !visible));
        assert_eq!(visibility.best_match, None);
    }
}
