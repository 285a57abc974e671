//! Frame graphs built per scope
//!
//! - `FrameAttachedToGraph`: which body each frame moves with
//! - `PoseRelativeToGraph`: declared poses chained up to the scope frame
//! - `KinematicGraph`: link/joint connectivity
//!
//! All three store vertices in a flat petgraph arena, with a name index on
//! the side for lookups and diagnostics.

mod attached_to;
mod kinematic;
mod pose_relative_to;

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::constants::is_reserved_name;
use crate::entity::EntityKind;
use crate::error::GraphError;

pub use attached_to::FrameAttachedToGraph;
pub use kinematic::{KinematicEdge, KinematicGraph, StructuralWarning};
pub use pose_relative_to::PoseRelativeToGraph;

/// Graph vertex: one named entity of a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    pub name: String,
    pub kind: EntityKind,
}

/// Name-indexed arena graph for a single scope
#[derive(Debug, Clone)]
pub struct ScopeGraph<E> {
    scope: String,
    graph: DiGraph<Vertex, E>,
    /// Name to vertex index (O(1) lookup)
    index: HashMap<String, NodeIndex>,
}

impl<E> ScopeGraph<E> {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Add an implicit vertex (`__model__`, `world`), bypassing the reserved-name check
    pub(crate) fn add_implicit(&mut self, name: &str, kind: EntityKind) -> NodeIndex {
        let id = self.graph.add_node(Vertex {
            name: name.to_string(),
            kind,
        });
        self.index.insert(name.to_string(), id);
        id
    }

    /// Add a vertex for an authored entity
    pub(crate) fn add_entity(
        &mut self,
        name: &str,
        kind: EntityKind,
    ) -> Result<NodeIndex, GraphError> {
        if is_reserved_name(name) {
            return Err(GraphError::ReservedName {
                scope: self.scope.clone(),
                name: name.to_string(),
            });
        }
        if self.index.contains_key(name) {
            return Err(GraphError::DuplicateName {
                scope: self.scope.clone(),
                name: name.to_string(),
            });
        }
        Ok(self.add_implicit(name, kind))
    }

    pub(crate) fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, weight: E) {
        self.graph.add_edge(from, to, weight);
    }

    pub fn vertex_id(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    pub fn vertex(&self, id: NodeIndex) -> &Vertex {
        &self.graph[id]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.graph.node_weights()
    }

    pub(crate) fn inner(&self) -> &DiGraph<Vertex, E> {
        &self.graph
    }

    /// Look up a vertex by name for a query
    pub(crate) fn lookup(&self, name: &str) -> Result<NodeIndex, GraphError> {
        self.vertex_id(name).ok_or_else(|| GraphError::UnknownFrame {
            scope: self.scope.clone(),
            name: name.to_string(),
        })
    }

    fn names(&self, ids: &[NodeIndex]) -> Vec<String> {
        ids.iter().map(|id| self.graph[*id].name.clone()).collect()
    }

    // ============== Chain graphs (at most one outgoing edge per vertex) ==============

    /// The single outgoing edge of a vertex
    pub(crate) fn next(&self, id: NodeIndex) -> Option<(NodeIndex, &E)> {
        self.graph
            .edges(id)
            .next()
            .map(|edge| (edge.target(), edge.weight()))
    }

    /// Follow outgoing edges from `start` until a vertex without one
    ///
    /// The walk is bounded by the vertex count; running past it means the
    /// chain loops back on itself.
    pub(crate) fn chain_to_sink(&self, start: NodeIndex) -> Result<Vec<NodeIndex>, GraphError> {
        let mut chain = vec![start];
        let mut current = start;
        while let Some((next, _)) = self.next(current) {
            if chain.len() > self.vertex_count() {
                return Err(GraphError::CyclicReference {
                    scope: self.scope.clone(),
                    chain: self.names(&chain),
                });
            }
            chain.push(next);
            current = next;
        }
        Ok(chain)
    }

    /// Every cycle in the graph, each as a closed chain of names
    ///
    /// Each chain starts at the earliest-added vertex of its cycle and
    /// repeats it at the end (`a -> b -> a`). A self-reference is `a -> a`.
    pub(crate) fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<(NodeIndex, Vec<String>)> = tarjan_scc(&self.graph)
            .into_iter()
            .filter_map(|component| {
                let start = component.iter().min().copied()?;
                if component.len() == 1 && self.graph.find_edge(start, start).is_none() {
                    return None;
                }
                let mut chain = vec![start];
                let mut current = start;
                while let Some((next, _)) = self.next(current) {
                    chain.push(next);
                    if next == start || chain.len() > component.len() {
                        break;
                    }
                    current = next;
                }
                Some((start, self.names(&chain)))
            })
            .collect();
        cycles.sort_by_key(|(start, _)| *start);
        cycles.into_iter().map(|(_, chain)| chain).collect()
    }

    /// Report every cycle as a `CyclicReference` error
    pub(crate) fn cycle_errors(&self) -> Vec<GraphError> {
        self.find_cycles()
            .into_iter()
            .map(|chain| GraphError::CyclicReference {
                scope: self.scope.clone(),
                chain,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_graph(edges: &[(&str, &str)], names: &[&str]) -> ScopeGraph<()> {
        let mut graph = ScopeGraph::new("test");
        for name in names {
            graph.add_entity(name, EntityKind::Frame).unwrap();
        }
        for (from, to) in edges {
            let from = graph.vertex_id(from).unwrap();
            let to = graph.vertex_id(to).unwrap();
            graph.add_edge(from, to, ());
        }
        graph
    }

    #[test]
    fn test_add_entity_rejects_duplicates_and_reserved() {
        let mut graph: ScopeGraph<()> = ScopeGraph::new("m");
        assert!(graph.add_entity("base", EntityKind::Link).is_ok());
        assert!(matches!(
            graph.add_entity("base", EntityKind::Frame),
            Err(GraphError::DuplicateName { name, .. }) if name == "base"
        ));
        assert!(matches!(
            graph.add_entity("__model__", EntityKind::Frame),
            Err(GraphError::ReservedName { .. })
        ));
        // Names are case-sensitive
        assert!(graph.add_entity("Base", EntityKind::Link).is_ok());
        assert_eq!(graph.vertex_count(), 2);
    }

    #[test]
    fn test_chain_to_sink() {
        let graph = chain_graph(&[("a", "b"), ("b", "c")], &["a", "b", "c"]);
        let chain = graph.chain_to_sink(graph.vertex_id("a").unwrap()).unwrap();
        assert_eq!(graph.names(&chain), vec!["a", "b", "c"]);
        assert!(graph.find_cycles().is_empty());
    }

    #[test]
    fn test_chain_to_sink_terminates_on_cycle() {
        let graph = chain_graph(&[("a", "b"), ("b", "a"), ("c", "a")], &["a", "b", "c"]);
        let result = graph.chain_to_sink(graph.vertex_id("c").unwrap());
        assert!(matches!(result, Err(GraphError::CyclicReference { .. })));
    }

    #[test]
    fn test_find_cycles_reports_each_cycle_once() {
        let graph = chain_graph(
            &[("a", "a"), ("b", "c"), ("c", "d"), ("d", "b"), ("e", "b")],
            &["a", "b", "c", "d", "e"],
        );
        let cycles = graph.find_cycles();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0], vec!["a", "a"]);
        assert_eq!(cycles[1], vec!["b", "c", "d", "b"]);
    }

    #[test]
    fn test_find_cycles_ignores_single_vertices() {
        assert!(ScopeGraph::<()>::new("empty").find_cycles().is_empty());
        let graph = chain_graph(&[("a", "b"), ("c", "b")], &["a", "b", "c", "d"]);
        assert!(graph.find_cycles().is_empty());
    }
}
