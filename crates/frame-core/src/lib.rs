//! Frame semantics for articulated models
//!
//! This crate resolves named coordinate frames inside a model or world:
//! - Entities: links, joints, explicit frames and the models that own them
//! - Attached-to graph: which body a frame is rigidly fixed to
//! - Pose relative-to graph: poses of frames expressed in other frames
//! - Kinematic graph: links joined by joints, with tree validation
//! - World: models and world-level frames in their own scope

pub mod constants;
pub mod entity;
pub mod error;
pub mod graph;
pub mod model;
pub mod options;
pub mod pose;
pub mod semantic_pose;
pub mod world;

pub use constants::*;
pub use entity::{EntityKind, Frame, Joint, JointBuilder, JointType, Link};
pub use error::{Built, ErrorCode, GraphError};
pub use graph::{
    FrameAttachedToGraph, KinematicEdge, KinematicGraph, PoseRelativeToGraph, StructuralWarning,
};
pub use model::{Model, ModelGraphs};
pub use options::{BuildOptions, KinematicLoopPolicy};
pub use pose::Pose;
pub use semantic_pose::SemanticPose;
pub use world::{World, WorldGraphs};
