//! Frame attached-to graph: which rigid body each frame moves with

use tracing::debug;

use crate::constants::{MODEL_FRAME, WORLD_FRAME};
use crate::entity::EntityKind;
use crate::error::{Built, GraphError};
use crate::model::Model;
use crate::world::World;

use super::ScopeGraph;

/// Attachment relations of one scope
///
/// Edges carry no payload: attachment is topological. Bodies (links in a
/// model scope, models and `world` in a world scope) have no outgoing edge.
#[derive(Debug, Clone)]
pub struct FrameAttachedToGraph {
    graph: ScopeGraph<()>,
}

impl FrameAttachedToGraph {
    /// Build the graph for a model scope
    ///
    /// `__model__` is attached to the canonical link, joints to their child
    /// link and frames to `attached_to` (or `__model__`).
    pub fn for_model(model: &Model) -> Built<Self> {
        let mut graph = ScopeGraph::new(model.name());
        let mut errors = Vec::new();
        let model_frame = graph.add_implicit(MODEL_FRAME, EntityKind::ModelFrame);

        for link in model.links() {
            if let Err(e) = graph.add_entity(&link.name, EntityKind::Link) {
                errors.push(e);
            }
        }
        let joints: Vec<_> = model
            .joints()
            .iter()
            .filter_map(|joint| match graph.add_entity(&joint.name, EntityKind::Joint) {
                Ok(id) => Some((id, joint)),
                Err(e) => {
                    errors.push(e);
                    None
                }
            })
            .collect();
        let frames: Vec<_> = model
            .frames()
            .iter()
            .filter_map(|frame| match graph.add_entity(&frame.name, EntityKind::Frame) {
                Ok(id) => Some((id, frame)),
                Err(e) => {
                    errors.push(e);
                    None
                }
            })
            .collect();

        match model.canonical_link() {
            Some(link) => {
                if let Some(target) = graph.vertex_id(&link.name) {
                    graph.add_edge(model_frame, target, ());
                }
            }
            None if model.links().is_empty() => errors.push(GraphError::ModelWithoutLink {
                model: model.name().to_string(),
            }),
            None => errors.push(GraphError::UnresolvedReference {
                scope: model.name().to_string(),
                entity: MODEL_FRAME.to_string(),
                target: model.canonical_link_name().to_string(),
            }),
        }

        for (id, joint) in joints {
            match graph.vertex_id(&joint.child) {
                Some(target) if graph.vertex(target).kind == EntityKind::Link => {
                    graph.add_edge(id, target, ());
                }
                _ => errors.push(GraphError::UnresolvedReference {
                    scope: model.name().to_string(),
                    entity: joint.name.clone(),
                    target: joint.child.clone(),
                }),
            }
        }

        for (id, frame) in frames {
            let target_name = frame.resolved_attached_to(MODEL_FRAME);
            match graph.vertex_id(target_name) {
                Some(target) => graph.add_edge(id, target, ()),
                None => errors.push(GraphError::UnresolvedReference {
                    scope: model.name().to_string(),
                    entity: frame.name.clone(),
                    target: target_name.to_string(),
                }),
            }
        }

        errors.extend(graph.cycle_errors());
        debug!(
            "Attached-to graph for '{}': {} vertices, {} errors",
            model.name(),
            graph.vertex_count(),
            errors.len()
        );
        Built::new(Self { graph }, errors)
    }

    /// Build the graph for a world scope
    ///
    /// Models and `world` are bodies; frames attach to `attached_to` (or `world`).
    pub fn for_world(world: &World) -> Built<Self> {
        let mut graph = ScopeGraph::new(world.name());
        let mut errors = Vec::new();
        graph.add_implicit(WORLD_FRAME, EntityKind::World);

        for model in world.models() {
            if let Err(e) = graph.add_entity(model.name(), EntityKind::Model) {
                errors.push(e);
            }
        }
        let frames: Vec<_> = world
            .frames()
            .iter()
            .filter_map(|frame| match graph.add_entity(&frame.name, EntityKind::Frame) {
                Ok(id) => Some((id, frame)),
                Err(e) => {
                    errors.push(e);
                    None
                }
            })
            .collect();

        for (id, frame) in frames {
            let target_name = frame.resolved_attached_to(WORLD_FRAME);
            match graph.vertex_id(target_name) {
                Some(target) => graph.add_edge(id, target, ()),
                None => errors.push(GraphError::UnresolvedReference {
                    scope: world.name().to_string(),
                    entity: frame.name.clone(),
                    target: target_name.to_string(),
                }),
            }
        }

        errors.extend(graph.cycle_errors());
        debug!(
            "Attached-to graph for world '{}': {} vertices, {} errors",
            world.name(),
            graph.vertex_count(),
            errors.len()
        );
        Built::new(Self { graph }, errors)
    }

    pub fn scope(&self) -> &str {
        self.graph.scope()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.graph.contains(name)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    /// Name of the body `name` is ultimately attached to
    ///
    /// A body resolves to itself.
    pub fn resolve_attached_body(&self, name: &str) -> Result<String, GraphError> {
        let start = self.graph.lookup(name)?;
        let chain = self.graph.chain_to_sink(start)?;
        let sink = self.graph.vertex(chain[chain.len() - 1]);
        if sink.kind.is_body() {
            Ok(sink.name.clone())
        } else {
            Err(GraphError::PathUnreachable {
                scope: self.scope().to_string(),
                from: name.to_string(),
                to: sink.name.clone(),
            })
        }
    }
}
