//! Joint types and builder

use serde::{Deserialize, Serialize};

use crate::pose::Pose;

/// Joint type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointType {
    #[default]
    Fixed,
    Revolute,
    Continuous,
    Prismatic,
    Floating,
    Planar,
    Ball,
    Screw,
    Universal,
    Revolute2,
    Gearbox,
}

impl JointType {
    /// Check if this joint type has an axis
    pub fn has_axis(&self) -> bool {
        matches!(
            self,
            JointType::Revolute
                | JointType::Continuous
                | JointType::Prismatic
                | JointType::Screw
                | JointType::Universal
                | JointType::Revolute2
                | JointType::Gearbox
        )
    }

    /// Number of degrees of freedom the joint allows
    pub fn dof(&self) -> usize {
        match self {
            JointType::Fixed => 0,
            JointType::Revolute
            | JointType::Continuous
            | JointType::Prismatic
            | JointType::Screw
            | JointType::Gearbox => 1,
            JointType::Universal | JointType::Revolute2 => 2,
            JointType::Planar | JointType::Ball => 3,
            JointType::Floating => 6,
        }
    }
}

/// A joint connecting two links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub name: String,
    #[serde(default)]
    pub joint_type: JointType,
    /// Parent link name (`world` for a joint fixed to the world)
    pub parent: String,
    /// Child link name
    pub child: String,
    /// Pose as authored, relative to `pose_relative_to`
    #[serde(default)]
    pub pose: Pose,
    /// Frame the pose is expressed in (empty = the child link)
    #[serde(default)]
    pub pose_relative_to: String,
}

impl Joint {
    /// Create a new fixed joint
    pub fn fixed(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::builder(name, parent, child).build()
    }

    /// Create a builder for constructing joints with fluent API
    pub fn builder(
        name: impl Into<String>,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> JointBuilder {
        JointBuilder::new(name, parent, child)
    }

    /// Frame the pose is expressed in, after applying defaults
    pub fn resolved_relative_to(&self) -> &str {
        if self.pose_relative_to.is_empty() {
            &self.child
        } else {
            &self.pose_relative_to
        }
    }
}

/// Builder for creating joints with fluent API
#[derive(Debug, Clone)]
pub struct JointBuilder {
    name: String,
    joint_type: JointType,
    parent: String,
    child: String,
    pose: Pose,
    pose_relative_to: String,
}

impl JointBuilder {
    /// Create a new joint builder
    pub fn new(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            joint_type: JointType::Fixed,
            parent: parent.into(),
            child: child.into(),
            pose: Pose::IDENTITY,
            pose_relative_to: String::new(),
        }
    }

    /// Set the joint type
    pub fn joint_type(mut self, joint_type: JointType) -> Self {
        self.joint_type = joint_type;
        self
    }

    /// Set as a revolute joint
    pub fn revolute(mut self) -> Self {
        self.joint_type = JointType::Revolute;
        self
    }

    /// Set as a continuous joint
    pub fn continuous(mut self) -> Self {
        self.joint_type = JointType::Continuous;
        self
    }

    /// Set as a prismatic joint
    pub fn prismatic(mut self) -> Self {
        self.joint_type = JointType::Prismatic;
        self
    }

    /// Set the joint pose
    pub fn pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Set the joint position
    pub fn xyz(mut self, x: f64, y: f64, z: f64) -> Self {
        self.pose.position = glam::DVec3::new(x, y, z);
        self
    }

    /// Set the frame the joint pose is relative to
    pub fn relative_to(mut self, frame: impl Into<String>) -> Self {
        self.pose_relative_to = frame.into();
        self
    }

    /// Build the joint
    pub fn build(self) -> Joint {
        Joint {
            name: self.name,
            joint_type: self.joint_type,
            parent: self.parent,
            child: self.child,
            pose: self.pose,
            pose_relative_to: self.pose_relative_to,
        }
    }
}
