//! Link (rigid body) record

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::MODEL_FRAME;
use crate::graph::PoseRelativeToGraph;
use crate::pose::Pose;
use crate::semantic_pose::SemanticPose;

/// A rigid body in a model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    /// Pose as authored, relative to `pose_relative_to`
    #[serde(default)]
    pub pose: Pose,
    /// Frame the pose is expressed in (empty = the model frame)
    #[serde(default)]
    pub pose_relative_to: String,
    /// Name of the owning model (set when added to one)
    #[serde(skip)]
    scope: String,
    /// Relative-pose graph shared with the owning model (set on build)
    #[serde(skip)]
    pose_graph: Option<Arc<PoseRelativeToGraph>>,
}

impl Link {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pose: Pose::IDENTITY,
            pose_relative_to: String::new(),
            scope: String::new(),
            pose_graph: None,
        }
    }

    /// Set the declared pose
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Set the frame the declared pose is relative to
    pub fn relative_to(mut self, frame: impl Into<String>) -> Self {
        self.pose_relative_to = frame.into();
        self
    }

    /// Frame the pose is expressed in, after applying defaults
    pub fn resolved_relative_to(&self) -> &str {
        if self.pose_relative_to.is_empty() {
            MODEL_FRAME
        } else {
            &self.pose_relative_to
        }
    }

    pub(crate) fn set_pose_graph(&mut self, scope: &str, graph: Option<Arc<PoseRelativeToGraph>>) {
        if self.scope != scope {
            self.scope = scope.to_string();
        }
        self.pose_graph = graph;
    }

    /// Pose of this link that can be resolved against any frame of its model
    pub fn semantic_pose(&self) -> SemanticPose {
        SemanticPose::new(
            &self.scope,
            &self.name,
            self.pose,
            self.resolved_relative_to(),
            self.pose_graph.clone(),
        )
    }
}
