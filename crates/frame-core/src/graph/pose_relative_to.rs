//! Pose relative-to graph: declared poses chained up to the scope frame

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::constants::{MODEL_FRAME, WORLD_FRAME};
use crate::entity::EntityKind;
use crate::error::{Built, GraphError};
use crate::model::Model;
use crate::pose::Pose;
use crate::world::World;

use super::ScopeGraph;

/// Relative-pose graph of one scope
///
/// Each entity has one outgoing edge to the frame its pose is expressed in,
/// weighted by the declared pose. The implicit scope frame is the sink.
#[derive(Debug, Clone)]
pub struct PoseRelativeToGraph {
    graph: ScopeGraph<Pose>,
    root: NodeIndex,
}

/// Pending edge, added once every vertex exists
struct Declared<'a> {
    id: NodeIndex,
    name: &'a str,
    target: &'a str,
    pose: Pose,
}

impl PoseRelativeToGraph {
    /// Build the graph for a model scope
    ///
    /// Links default to `__model__`, joints to their child link and frames to
    /// `attached_to` (then `__model__`).
    pub fn for_model(model: &Model) -> Built<Self> {
        let mut graph = ScopeGraph::new(model.name());
        let mut errors = Vec::new();
        let root = graph.add_implicit(MODEL_FRAME, EntityKind::ModelFrame);
        let mut declared = Vec::new();

        for link in model.links() {
            match graph.add_entity(&link.name, EntityKind::Link) {
                Ok(id) => declared.push(Declared {
                    id,
                    name: &link.name,
                    target: link.resolved_relative_to(),
                    pose: link.pose,
                }),
                Err(e) => errors.push(e),
            }
        }
        for joint in model.joints() {
            match graph.add_entity(&joint.name, EntityKind::Joint) {
                Ok(id) => declared.push(Declared {
                    id,
                    name: &joint.name,
                    target: joint.resolved_relative_to(),
                    pose: joint.pose,
                }),
                Err(e) => errors.push(e),
            }
        }
        for frame in model.frames() {
            match graph.add_entity(&frame.name, EntityKind::Frame) {
                Ok(id) => declared.push(Declared {
                    id,
                    name: &frame.name,
                    target: frame.resolved_relative_to(MODEL_FRAME),
                    pose: frame.pose,
                }),
                Err(e) => errors.push(e),
            }
        }

        Self::connect(&mut graph, declared, &mut errors);
        debug!(
            "Pose relative-to graph for '{}': {} vertices, {} errors",
            model.name(),
            graph.vertex_count(),
            errors.len()
        );
        Built::new(Self { graph, root }, errors)
    }

    /// Build the graph for a world scope
    ///
    /// Models default to `world`, frames to `attached_to` (then `world`).
    pub fn for_world(world: &World) -> Built<Self> {
        let mut graph = ScopeGraph::new(world.name());
        let mut errors = Vec::new();
        let root = graph.add_implicit(WORLD_FRAME, EntityKind::World);
        let mut declared = Vec::new();

        for model in world.models() {
            match graph.add_entity(model.name(), EntityKind::Model) {
                Ok(id) => declared.push(Declared {
                    id,
                    name: model.name(),
                    target: model.resolved_relative_to(),
                    pose: *model.pose(),
                }),
                Err(e) => errors.push(e),
            }
        }
        for frame in world.frames() {
            match graph.add_entity(&frame.name, EntityKind::Frame) {
                Ok(id) => declared.push(Declared {
                    id,
                    name: &frame.name,
                    target: frame.resolved_relative_to(WORLD_FRAME),
                    pose: frame.pose,
                }),
                Err(e) => errors.push(e),
            }
        }

        Self::connect(&mut graph, declared, &mut errors);
        debug!(
            "Pose relative-to graph for world '{}': {} vertices, {} errors",
            world.name(),
            graph.vertex_count(),
            errors.len()
        );
        Built::new(Self { graph, root }, errors)
    }

    fn connect(graph: &mut ScopeGraph<Pose>, declared: Vec<Declared<'_>>, errors: &mut Vec<GraphError>) {
        for entry in declared {
            match graph.vertex_id(entry.target) {
                Some(target) => graph.add_edge(entry.id, target, entry.pose),
                None => errors.push(GraphError::UnresolvedReference {
                    scope: graph.scope().to_string(),
                    entity: entry.name.to_string(),
                    target: entry.target.to_string(),
                }),
            }
        }
        errors.extend(graph.cycle_errors());
    }

    pub fn scope(&self) -> &str {
        self.graph.scope()
    }

    /// Name of the implicit scope frame (`__model__` or `world`)
    pub fn root_name(&self) -> &str {
        &self.graph.vertex(self.root).name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.graph.contains(name)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    /// Pose of `frame` expressed in `relative_to` (empty = the scope frame)
    pub fn resolve(&self, frame: &str, relative_to: &str) -> Result<Pose, GraphError> {
        let from = self.graph.lookup(frame)?;
        if relative_to.is_empty() {
            return self.resolve_to_root(from);
        }
        let to = self.graph.lookup(relative_to)?;
        if from == to {
            return Ok(Pose::IDENTITY);
        }

        let from_chain = self.graph.chain_to_sink(from)?;
        let to_chain = self.graph.chain_to_sink(to)?;

        // Meet at the first vertex of the target's chain that the frame's chain also visits
        let depth_in_from: HashMap<NodeIndex, usize> = from_chain
            .iter()
            .enumerate()
            .map(|(depth, id)| (*id, depth))
            .collect();
        let (to_depth, from_depth) = to_chain
            .iter()
            .enumerate()
            .find_map(|(depth, id)| depth_in_from.get(id).map(|&d| (depth, d)))
            .ok_or_else(|| self.unreachable(frame, relative_to))?;

        let frame_in_ancestor = self.accumulate(&from_chain[..=from_depth]);
        if to_depth == 0 {
            // `relative_to` is an ancestor of `frame`: no inversion needed
            return Ok(frame_in_ancestor);
        }
        let target_in_ancestor = self.accumulate(&to_chain[..=to_depth]);
        Ok(target_in_ancestor.inverse() * frame_in_ancestor)
    }

    fn resolve_to_root(&self, from: NodeIndex) -> Result<Pose, GraphError> {
        let chain = self.graph.chain_to_sink(from)?;
        if chain[chain.len() - 1] != self.root {
            return Err(self.unreachable(&self.graph.vertex(from).name, self.root_name()));
        }
        Ok(self.accumulate(&chain))
    }

    /// Pose of `chain[0]` in the frame of the last vertex of `chain`
    fn accumulate(&self, chain: &[NodeIndex]) -> Pose {
        chain[..chain.len() - 1]
            .iter()
            .filter_map(|id| self.graph.next(*id))
            .fold(Pose::IDENTITY, |acc, (_, pose)| *pose * acc)
    }

    fn unreachable(&self, from: &str, to: &str) -> GraphError {
        GraphError::PathUnreachable {
            scope: self.scope().to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use glam::DVec3;

    use super::*;
    use crate::constants::POSE_TOLERANCE;
    use crate::entity::{Frame, Joint, Link};

    fn arm() -> Model {
        Model::new("arm")
            .with_link(Link::new("base"))
            .with_link(
                Link::new("upper").with_pose(Pose::from_xyz_rpy([0.0, 0.0, 1.0], [0.0, 0.0, FRAC_PI_2])),
            )
            .with_link(Link::new("lower").with_pose(Pose::from_position([1.0, 0.0, 0.0])).relative_to("upper"))
            .with_joint(Joint::builder("shoulder", "base", "upper").revolute().build())
            .with_joint(
                Joint::builder("elbow", "upper", "lower")
                    .revolute()
                    .xyz(0.0, 0.0, 0.5)
                    .build(),
            )
            .with_frame(Frame::new("tool").attached_to("lower").with_pose(Pose::from_position([0.0, 0.0, 0.2])))
    }

    fn graph() -> PoseRelativeToGraph {
        let built = PoseRelativeToGraph::for_model(&arm());
        assert!(built.errors.is_empty(), "{:?}", built.errors);
        built.graph
    }

    #[test]
    fn test_resolve_to_scope_frame() {
        let graph = graph();
        let lower = graph.resolve("lower", "").unwrap();
        // upper is yawed 90 degrees, so lower's +X offset lands on +Y
        assert!(lower.position.abs_diff_eq(DVec3::new(0.0, 1.0, 1.0), 1e-12));
        assert_eq!(graph.root_name(), "__model__");
        assert!(graph.resolve("__model__", "").unwrap().is_identity());
    }

    #[test]
    fn test_identity_for_self() {
        let graph = graph();
        for name in ["__model__", "base", "upper", "lower", "shoulder", "elbow", "tool"] {
            assert!(graph.resolve(name, name).unwrap().is_identity(), "{name}");
        }
    }

    #[test]
    fn test_declared_pose_comes_back_exactly() {
        let graph = graph();
        let declared = Pose::from_position([1.0, 0.0, 0.0]);
        assert_eq!(graph.resolve("lower", "upper").unwrap(), declared);
    }

    #[test]
    fn test_joint_defaults_to_child_link() {
        let graph = graph();
        let elbow = graph.resolve("elbow", "lower").unwrap();
        assert_eq!(elbow.position, DVec3::new(0.0, 0.0, 0.5));
        let elbow_in_model = graph.resolve("elbow", "").unwrap();
        assert!(elbow_in_model.position.abs_diff_eq(DVec3::new(0.0, 1.0, 1.5), 1e-12));
    }

    #[test]
    fn test_round_trip_law() {
        let graph = graph();
        let names = ["__model__", "base", "upper", "lower", "shoulder", "elbow", "tool"];
        for a in names {
            for b in names {
                let a_in_b = graph.resolve(a, b).unwrap();
                let b_in_a = graph.resolve(b, a).unwrap();
                assert!(
                    (a_in_b * b_in_a).approx_eq(&Pose::IDENTITY, POSE_TOLERANCE),
                    "{a} / {b}"
                );
            }
        }
    }

    #[test]
    fn test_across_branches() {
        let graph = graph();
        // tool sits 0.2 above lower, lower is 1.0 along upper's X
        let tool_in_upper = graph.resolve("tool", "upper").unwrap();
        assert!(tool_in_upper.position.abs_diff_eq(DVec3::new(1.0, 0.0, 0.2), 1e-12));
        let tool_in_base = graph.resolve("tool", "base").unwrap();
        assert!(tool_in_base.position.abs_diff_eq(DVec3::new(0.0, 1.0, 1.2), 1e-12));
    }

    #[test]
    fn test_unknown_names() {
        let graph = graph();
        assert!(matches!(
            graph.resolve("tool", "ghost"),
            Err(GraphError::UnknownFrame { name, .. }) if name == "ghost"
        ));
        assert!(matches!(
            graph.resolve("ghost", ""),
            Err(GraphError::UnknownFrame { .. })
        ));
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let model = arm().with_frame(Frame::new("loop").relative_to("loop"));
        let built = PoseRelativeToGraph::for_model(&model);
        assert!(matches!(
            &built.errors[..],
            [GraphError::CyclicReference { chain, .. }] if chain == &["loop", "loop"]
        ));
        assert!(matches!(
            built.graph.resolve("loop", ""),
            Err(GraphError::CyclicReference { .. })
        ));
        // Unrelated entities still resolve on the partial graph
        assert!(built.graph.resolve("tool", "base").is_ok());
    }

    #[test]
    fn test_three_node_cycle() {
        let model = arm()
            .with_frame(Frame::new("a").relative_to("b"))
            .with_frame(Frame::new("b").relative_to("c"))
            .with_frame(Frame::new("c").relative_to("a"));
        let built = PoseRelativeToGraph::for_model(&model);
        assert!(matches!(
            &built.errors[..],
            [GraphError::CyclicReference { chain, .. }] if chain == &["a", "b", "c", "a"]
        ));
        assert!(matches!(
            built.graph.resolve("a", "tool"),
            Err(GraphError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_unresolved_relative_to() {
        let model = arm().with_frame(Frame::new("cam").relative_to("mast"));
        let built = PoseRelativeToGraph::for_model(&model);
        assert!(matches!(
            &built.errors[..],
            [GraphError::UnresolvedReference { entity, target, .. }]
                if entity == "cam" && target == "mast"
        ));
        // The dangling frame never yields a best-effort pose
        assert!(matches!(
            built.graph.resolve("cam", ""),
            Err(GraphError::PathUnreachable { .. })
        ));
        assert!(matches!(
            built.graph.resolve("cam", "base"),
            Err(GraphError::PathUnreachable { .. })
        ));
    }
}
