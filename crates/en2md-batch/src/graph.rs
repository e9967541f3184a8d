//! Root detection over the internal-link graph
//!
//! Each converted note is a node and each internal link between two
//! converted notes is an edge. Notes are grouped into weakly connected
//! islands, and the notes of an island that nothing links to are its
//! candidate roots. The result is advisory and never changes any output.

use std::collections::BTreeMap;

use serde::Serialize;

/// Converted note name -> names of the converted notes it links to
pub type LinkMap = BTreeMap<String, Vec<String>>;

/// A group of notes connected by links (direction ignored)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Island {
    /// Sorted member names
    pub members: Vec<String>,
    /// Members without incoming links
    pub roots: Vec<String>,
}

impl Island {
    /// One-line summary in the run report
    pub fn label(&self) -> String {
        match self.roots.as_slice() {
            [] => format!(
                "{} (no root)",
                self.members.first().map(String::as_str).unwrap_or_default()
            ),
            [root] => root.clone(),
            roots => format!("{} (multiple roots)", roots.join(" ")),
        }
    }
}

/// Outcome of the root analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "islands", rename_all = "kebab-case")]
pub enum RootAnalysis {
    /// Not requested for this run
    #[default]
    Skipped,
    /// No graph implementation compiled in
    Unavailable,
    /// Islands with more than one note
    Islands(Vec<Island>),
}

/// Finds islands and candidate roots in a link map
pub trait LinkGraphAnalyzer: Send + Sync {
    fn analyze(&self, links: &LinkMap) -> RootAnalysis;
}

/// Analyzer used when no graph implementation is available
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableAnalyzer;

impl LinkGraphAnalyzer for UnavailableAnalyzer {
    fn analyze(&self, _links: &LinkMap) -> RootAnalysis {
        log::warn!("Link graph analysis not available, skipping root detection");
        RootAnalysis::Unavailable
    }
}

/// Analyzer backed by petgraph
#[cfg(feature = "graph")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PetgraphAnalyzer;

#[cfg(feature = "graph")]
impl LinkGraphAnalyzer for PetgraphAnalyzer {
    fn analyze(&self, links: &LinkMap) -> RootAnalysis {
        use petgraph::Direction;
        use petgraph::graph::{DiGraph, NodeIndex};
        use petgraph::unionfind::UnionFind;
        use std::collections::HashMap;

        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let index: HashMap<&str, NodeIndex> = links
            .keys()
            .map(|name| (name.as_str(), graph.add_node(name.as_str())))
            .collect();

        let mut components = UnionFind::new(index.len());
        for (from, targets) in links {
            let a = index[from.as_str()];
            // Links to notes outside the run are ignored
            for b in targets.iter().filter_map(|t| index.get(t.as_str())) {
                graph.add_edge(a, *b, ());
                components.union(a.index(), b.index());
            }
        }

        // Node indices follow the sorted key order, so members come out sorted
        let mut groups: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
        for ix in graph.node_indices() {
            groups.entry(components.find(ix.index())).or_default().push(ix);
        }

        let mut islands: Vec<Island> = groups
            .into_values()
            .filter(|nodes| nodes.len() > 1)
            .map(|nodes| Island {
                members: nodes.iter().map(|&ix| graph[ix].to_string()).collect(),
                roots: nodes
                    .iter()
                    .filter(|&&ix| {
                        graph
                            .neighbors_directed(ix, Direction::Incoming)
                            .next()
                            .is_none()
                    })
                    .map(|&ix| graph[ix].to_string())
                    .collect(),
            })
            .collect();
        islands.sort_by(|a, b| a.members.cmp(&b.members));

        RootAnalysis::Islands(islands)
    }
}

/// The best analyzer compiled into this build
pub fn default_analyzer() -> Box<dyn LinkGraphAnalyzer> {
    #[cfg(feature = "graph")]
    {
        Box::new(PetgraphAnalyzer)
    }

    #[cfg(not(feature = "graph"))]
    {
        Box::new(UnavailableAnalyzer)
    }
}
