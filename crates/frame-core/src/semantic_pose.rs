//! Poses that know which frame they are expressed in

use std::sync::Arc;

use crate::error::GraphError;
use crate::graph::PoseRelativeToGraph;
use crate::pose::Pose;

/// A declared pose bundled with the graph needed to re-express it
///
/// Holds its own reference to the relative-pose graph, so it stays usable
/// after the owning model is rebuilt or dropped.
#[derive(Debug, Clone)]
pub struct SemanticPose {
    /// Scope the entity belongs to
    scope: String,
    name: String,
    raw_pose: Pose,
    relative_to: String,
    graph: Option<Arc<PoseRelativeToGraph>>,
}

impl SemanticPose {
    pub(crate) fn new(
        scope: &str,
        name: &str,
        raw_pose: Pose,
        relative_to: &str,
        graph: Option<Arc<PoseRelativeToGraph>>,
    ) -> Self {
        Self {
            scope: scope.to_string(),
            name: name.to_string(),
            raw_pose,
            relative_to: relative_to.to_string(),
            graph,
        }
    }

    /// Name of the model or world that owns the entity
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Name of the entity this pose belongs to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pose as authored
    pub fn raw_pose(&self) -> &Pose {
        &self.raw_pose
    }

    /// Frame the raw pose is expressed in, defaults applied
    pub fn relative_to(&self) -> &str {
        &self.relative_to
    }

    /// Express the pose in `resolve_to` (empty = the declared relative-to frame)
    pub fn resolve(&self, resolve_to: &str) -> Result<Pose, GraphError> {
        let graph = self
            .graph
            .as_ref()
            .ok_or_else(|| GraphError::GraphUnavailable {
                scope: self.scope.clone(),
                graph: "pose relative-to",
            })?;
        let target = if resolve_to.is_empty() {
            self.relative_to.as_str()
        } else {
            resolve_to
        };
        graph.resolve(&self.name, target)
    }
}
