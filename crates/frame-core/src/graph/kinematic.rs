//! Kinematic graph: link connectivity through joints

use std::collections::HashSet;

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use petgraph::visit::{Bfs, EdgeRef};
use tracing::debug;

use crate::constants::WORLD_FRAME;
use crate::entity::{EntityKind, JointType};
use crate::error::{Built, GraphError};
use crate::model::Model;
use crate::options::{BuildOptions, KinematicLoopPolicy};

use super::ScopeGraph;

/// Joint edge: parent link -> child link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KinematicEdge {
    pub joint: String,
    pub joint_type: JointType,
}

/// Structural findings that do not invalidate the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralWarning {
    /// Every link is the child of some joint
    MissingRoot,
    /// More than one link has no parent link
    AmbiguousRoot { candidates: Vec<String> },
    /// Link not reachable from the root
    Disconnected { link: String },
    /// Joint that closes a kinematic loop
    KinematicLoop { joint: String },
}

/// Link/joint connectivity of a model
#[derive(Debug, Clone)]
pub struct KinematicGraph {
    graph: ScopeGraph<KinematicEdge>,
    root: Option<NodeIndex>,
    warnings: Vec<StructuralWarning>,
}

impl KinematicGraph {
    /// Build the graph for a model
    ///
    /// Unresolved joint endpoints are errors. Root problems are recoverable
    /// errors, and are skipped entirely for static models. Loops follow
    /// `options.kinematic_loops`.
    pub fn build(model: &Model, options: &BuildOptions) -> Built<Self> {
        let scope = model.name().to_string();
        let mut graph = ScopeGraph::new(model.name());
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for link in model.links() {
            if let Err(e) = graph.add_entity(&link.name, EntityKind::Link) {
                errors.push(e);
            }
        }

        let mut edges = Vec::new();
        for joint in model.joints() {
            let parent = if joint.parent == WORLD_FRAME {
                Some(
                    graph
                        .vertex_id(WORLD_FRAME)
                        .unwrap_or_else(|| graph.add_implicit(WORLD_FRAME, EntityKind::World)),
                )
            } else {
                graph.vertex_id(&joint.parent)
            };
            let child = graph
                .vertex_id(&joint.child)
                .filter(|id| graph.vertex(*id).kind == EntityKind::Link);

            for (endpoint, id) in [(&joint.parent, parent), (&joint.child, child)] {
                if id.is_none() {
                    errors.push(GraphError::UnresolvedReference {
                        scope: scope.clone(),
                        entity: joint.name.clone(),
                        target: endpoint.clone(),
                    });
                }
            }
            if let (Some(parent), Some(child)) = (parent, child) {
                edges.push((parent, child, joint));
            }
        }

        // Union-find over joints: an edge inside one component closes a loop
        let mut components = UnionFind::new(graph.vertex_count());
        for (parent, child, joint) in edges {
            if !components.union(parent.index(), child.index()) {
                match options.kinematic_loops {
                    KinematicLoopPolicy::Warn => warnings.push(StructuralWarning::KinematicLoop {
                        joint: joint.name.clone(),
                    }),
                    KinematicLoopPolicy::Reject => errors.push(GraphError::KinematicLoop {
                        scope: scope.clone(),
                        joint: joint.name.clone(),
                    }),
                }
            }
            graph.add_edge(
                parent,
                child,
                KinematicEdge {
                    joint: joint.name.clone(),
                    joint_type: joint.joint_type,
                },
            );
        }

        let mut kinematic = Self {
            graph,
            root: None,
            warnings,
        };
        if !model.is_static() {
            kinematic.check_root(&mut errors);
        }
        debug!(
            "Kinematic graph for '{}': {} links, {} joints, {} warnings, {} errors",
            scope,
            model.link_count(),
            kinematic.graph.edge_count(),
            kinematic.warnings.len(),
            errors.len()
        );
        Built::new(kinematic, errors)
    }

    /// Find the unique link without a parent link and check everything hangs off it
    fn check_root(&mut self, errors: &mut Vec<GraphError>) {
        let inner = self.graph.inner();
        let candidates: Vec<NodeIndex> = inner
            .node_indices()
            .filter(|id| inner[*id].kind == EntityKind::Link)
            .filter(|id| {
                inner
                    .edges_directed(*id, Direction::Incoming)
                    .all(|edge| inner[edge.source()].kind == EntityKind::World)
            })
            .collect();

        match candidates.as_slice() {
            [] => {
                self.warnings.push(StructuralWarning::MissingRoot);
                errors.push(GraphError::MissingRoot {
                    scope: self.scope().to_string(),
                });
            }
            [root] => {
                self.root = Some(*root);
                let mut reached = HashSet::new();
                let mut bfs = Bfs::new(inner, *root);
                while let Some(id) = bfs.next(inner) {
                    reached.insert(id);
                }
                let disconnected: Vec<_> = inner
                    .node_indices()
                    .filter(|id| inner[*id].kind == EntityKind::Link && !reached.contains(id))
                    .map(|id| StructuralWarning::Disconnected {
                        link: inner[id].name.clone(),
                    })
                    .collect();
                self.warnings.extend(disconnected);
            }
            several => {
                let candidates: Vec<String> =
                    several.iter().map(|id| inner[*id].name.clone()).collect();
                self.warnings.push(StructuralWarning::AmbiguousRoot {
                    candidates: candidates.clone(),
                });
                errors.push(GraphError::AmbiguousRoot {
                    scope: self.scope().to_string(),
                    candidates,
                });
            }
        }
    }

    pub fn scope(&self) -> &str {
        self.graph.scope()
    }

    /// The root link, if exactly one was found
    pub fn root(&self) -> Option<&str> {
        self.root.map(|id| self.graph.vertex(id).name.as_str())
    }

    pub fn warnings(&self) -> &[StructuralWarning] {
        &self.warnings
    }

    /// True when the links form a single tree
    pub fn is_tree(&self) -> bool {
        self.root.is_some() && self.warnings.is_empty()
    }

    pub fn link_count(&self) -> usize {
        self.graph
            .vertices()
            .filter(|v| v.kind == EntityKind::Link)
            .count()
    }

    pub fn joint_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// (joint, parent) pairs of a link
    pub fn parents_of(&self, link: &str) -> Vec<(&str, &str)> {
        self.neighbors(link, Direction::Incoming)
    }

    /// (joint, child) pairs of a link
    pub fn children_of(&self, link: &str) -> Vec<(&str, &str)> {
        self.neighbors(link, Direction::Outgoing)
    }

    fn neighbors(&self, link: &str, direction: Direction) -> Vec<(&str, &str)> {
        let Some(id) = self.graph.vertex_id(link) else {
            return Vec::new();
        };
        let inner = self.graph.inner();
        let mut result: Vec<_> = inner
            .edges_directed(id, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (edge.weight().joint.as_str(), inner[other].name.as_str())
            })
            .collect();
        // petgraph yields edges newest first
        result.reverse();
        result
    }

    /// Links in breadth-first order from the root (parents before children)
    pub fn links_breadth_first(&self) -> Vec<&str> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        let inner = self.graph.inner();
        let mut order = Vec::new();
        let mut bfs = Bfs::new(inner, root);
        while let Some(id) = bfs.next(inner) {
            order.push(inner[id].name.as_str());
        }
        order
    }
}
