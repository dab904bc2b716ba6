use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::warn;

/// A prerequisite relation for the report: `successor` cannot start before
/// `prerequisite` ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub successor: String,
    pub prerequisite: String,
}

/// Prerequisite edges between tasks, keyed by successor.
///
/// Construction drops edges that reference ids outside the known task set
/// (with a warning); self-edges are rejected earlier, at config load. Cycle
/// diagnosis is total: every task on any cycle is reported, sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    prerequisites: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from the configured successor -> prerequisites
    /// mapping, keeping only edges with both endpoints in `known`.
    pub fn resolve(
        edges: &BTreeMap<String, Vec<String>>,
        known: &BTreeSet<String>,
    ) -> Self {
        let mut prerequisites: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (successor, prereqs) in edges {
            if !known.contains(successor) {
                warn!(task = %successor, "dependency successor not in sprint, edges dropped");
                continue;
            }
            for prerequisite in prereqs {
                if !known.contains(prerequisite) {
                    warn!(
                        task = %successor,
                        prerequisite = %prerequisite,
                        "dangling prerequisite reference dropped"
                    );
                    continue;
                }
                prerequisites
                    .entry(successor.clone())
                    .or_default()
                    .insert(prerequisite.clone());
            }
        }
        Self { prerequisites }
    }

    /// Prerequisite ids of `task`, in sorted order.
    pub fn prerequisites_of<'g>(&'g self, task: &str) -> impl Iterator<Item = &'g str> + 'g {
        self.prerequisites
            .get(task)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn has_prerequisites(&self, task: &str) -> bool {
        self.prerequisites
            .get(task)
            .is_some_and(|set| !set.is_empty())
    }

    /// All edges, sorted by (successor, prerequisite).
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.prerequisites
            .iter()
            .flat_map(|(successor, prereqs)| {
                prereqs.iter().map(|prerequisite| DependencyEdge {
                    successor: successor.clone(),
                    prerequisite: prerequisite.clone(),
                })
            })
            .collect()
    }

    /// Ids of every task participating in a cycle, sorted.
    ///
    /// A task is a cycle member when it sits in a strongly connected
    /// component of size greater than one, or carries a self-loop.
    pub fn cycle_members(&self) -> Vec<String> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();

        for (successor, prereqs) in &self.prerequisites {
            if !index.contains_key(successor.as_str()) {
                index.insert(successor.as_str(), graph.add_node(successor.as_str()));
            }
            for prerequisite in prereqs {
                if !index.contains_key(prerequisite.as_str()) {
                    index.insert(
                        prerequisite.as_str(),
                        graph.add_node(prerequisite.as_str()),
                    );
                }
                let from = index[prerequisite.as_str()];
                let to = index[successor.as_str()];
                graph.add_edge(from, to, ());
            }
        }

        let mut members: Vec<String> = Vec::new();
        for scc in tarjan_scc(&graph) {
            let is_cycle = scc.len() > 1
                || (scc.len() == 1 && graph.find_edge(scc[0], scc[0]).is_some());
            if is_cycle {
                members.extend(scc.iter().map(|ix| graph[*ix].to_string()));
            }
        }
        members.sort();
        members
    }
}
