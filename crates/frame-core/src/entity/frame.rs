//! Explicit frame record

use serde::{Deserialize, Serialize};

use crate::pose::Pose;

/// A named coordinate frame rigidly attached to a body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub name: String,
    /// Entity this frame moves with (empty = the scope's implicit frame)
    #[serde(default)]
    pub attached_to: String,
    #[serde(default)]
    pub pose: Pose,
    /// Frame the pose is expressed in (empty = `attached_to`, then the scope frame)
    #[serde(default)]
    pub pose_relative_to: String,
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attached_to(mut self, target: impl Into<String>) -> Self {
        self.attached_to = target.into();
        self
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    pub fn relative_to(mut self, frame: impl Into<String>) -> Self {
        self.pose_relative_to = frame.into();
        self
    }

    /// Attachment target, falling back to the scope frame
    pub fn resolved_attached_to<'a>(&'a self, scope_frame: &'a str) -> &'a str {
        if self.attached_to.is_empty() {
            scope_frame
        } else {
            &self.attached_to
        }
    }

    /// Frame the pose is expressed in, after applying defaults
    pub fn resolved_relative_to<'a>(&'a self, scope_frame: &'a str) -> &'a str {
        if self.pose_relative_to.is_empty() {
            self.resolved_attached_to(scope_frame)
        } else {
            &self.pose_relative_to
        }
    }
}
