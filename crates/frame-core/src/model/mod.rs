//! Model scope: entities plus the graphs built from them

mod queries;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{MODEL_FRAME, WORLD_FRAME};
use crate::entity::{Frame, Joint, Link};
use crate::error::{Built, GraphError};
use crate::graph::{FrameAttachedToGraph, KinematicGraph, PoseRelativeToGraph, StructuralWarning};
use crate::options::BuildOptions;
use crate::pose::Pose;
use crate::semantic_pose::SemanticPose;

/// Raw model data for deserialization (used internally)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelData {
    name: String,
    #[serde(default, rename = "static")]
    is_static: bool,
    #[serde(default)]
    self_collide: bool,
    #[serde(default = "default_true")]
    allow_auto_disable: bool,
    #[serde(default)]
    enable_wind: bool,
    #[serde(default)]
    canonical_link: String,
    #[serde(default)]
    pose: Pose,
    #[serde(default)]
    pose_relative_to: String,
    #[serde(default)]
    links: Vec<Link>,
    #[serde(default)]
    joints: Vec<Joint>,
    #[serde(default)]
    frames: Vec<Frame>,
}

fn default_true() -> bool {
    true
}

/// Graphs published by the last successful build
///
/// A graph is `None` when it was never built or its build failed.
#[derive(Debug, Clone, Default)]
pub struct ModelGraphs {
    pub attached_to: Option<FrameAttachedToGraph>,
    pub pose_relative_to: Option<Arc<PoseRelativeToGraph>>,
    pub kinematic: Option<KinematicGraph>,
}

/// A model: a naming scope of links, joints and frames
#[derive(Debug, Clone, Serialize)]
#[serde(into = "ModelData")]
pub struct Model {
    name: String,
    is_static: bool,
    self_collide: bool,
    allow_auto_disable: bool,
    enable_wind: bool,
    /// Explicit canonical link (empty = first link)
    canonical_link: String,
    /// Pose of the model frame in the enclosing scope
    pose: Pose,
    pose_relative_to: String,
    links: Vec<Link>,
    joints: Vec<Joint>,
    frames: Vec<Frame>,
    /// All three graphs, replaced together on every build
    graphs: Arc<ModelGraphs>,
    build_errors: Vec<GraphError>,
}

impl From<Model> for ModelData {
    fn from(model: Model) -> Self {
        Self {
            name: model.name,
            is_static: model.is_static,
            self_collide: model.self_collide,
            allow_auto_disable: model.allow_auto_disable,
            enable_wind: model.enable_wind,
            canonical_link: model.canonical_link,
            pose: model.pose,
            pose_relative_to: model.pose_relative_to,
            links: model.links,
            joints: model.joints,
            frames: model.frames,
        }
    }
}

impl From<ModelData> for Model {
    fn from(data: ModelData) -> Self {
        let mut model = Self {
            name: data.name,
            is_static: data.is_static,
            self_collide: data.self_collide,
            allow_auto_disable: data.allow_auto_disable,
            enable_wind: data.enable_wind,
            canonical_link: data.canonical_link,
            pose: data.pose,
            pose_relative_to: data.pose_relative_to,
            links: data.links,
            joints: data.joints,
            frames: data.frames,
            graphs: Arc::new(ModelGraphs::default()),
            build_errors: Vec::new(),
        };
        model.build();
        model
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = ModelData::deserialize(deserializer)?;
        Ok(Model::from(data))
    }
}

impl Model {
    /// Create a new empty model
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            self_collide: false,
            allow_auto_disable: true,
            enable_wind: false,
            canonical_link: String::new(),
            pose: Pose::IDENTITY,
            pose_relative_to: String::new(),
            links: Vec::new(),
            joints: Vec::new(),
            frames: Vec::new(),
            graphs: Arc::new(ModelGraphs::default()),
            build_errors: Vec::new(),
        }
    }

    // ============== Builder-style construction ==============

    pub fn with_link(mut self, link: Link) -> Self {
        self.add_link(link);
        self
    }

    pub fn with_joint(mut self, joint: Joint) -> Self {
        self.add_joint(joint);
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.add_frame(frame);
        self
    }

    // ============== Programmatic mutation ==============
    //
    // Every structural change drops the published graphs; call `build` again.

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
        self.invalidate_graphs();
    }

    pub fn add_joint(&mut self, joint: Joint) {
        self.joints.push(joint);
        self.invalidate_graphs();
    }

    pub fn add_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
        self.invalidate_graphs();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.invalidate_graphs();
    }

    pub fn set_static(&mut self, is_static: bool) {
        self.is_static = is_static;
        self.invalidate_graphs();
    }

    pub fn set_canonical_link_name(&mut self, name: impl Into<String>) {
        self.canonical_link = name.into();
        self.invalidate_graphs();
    }

    pub fn set_self_collide(&mut self, self_collide: bool) {
        self.self_collide = self_collide;
    }

    pub fn set_allow_auto_disable(&mut self, allow: bool) {
        self.allow_auto_disable = allow;
    }

    pub fn set_enable_wind(&mut self, enable_wind: bool) {
        self.enable_wind = enable_wind;
    }

    /// Set the model pose (lives in the enclosing scope, model graphs are unaffected)
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub fn set_pose_relative_to(&mut self, frame: impl Into<String>) {
        self.pose_relative_to = frame.into();
    }

    fn invalidate_graphs(&mut self) {
        self.graphs = Arc::new(ModelGraphs::default());
        self.build_errors.clear();
        for link in &mut self.links {
            link.set_pose_graph(&self.name, None);
        }
    }

    // ============== Graph construction ==============

    /// Build all graphs with default options
    pub fn build(&mut self) -> Vec<GraphError> {
        self.build_with(&BuildOptions::default())
    }

    /// Build all graphs and publish the valid ones
    ///
    /// Returns every error found, in order and without repeats. A graph whose
    /// build raised an unrecoverable error is not published, unless
    /// `options.publish_partial_graphs` is set.
    pub fn build_with(&mut self, options: &BuildOptions) -> Vec<GraphError> {
        let mut errors = Vec::new();

        let attached_to = FrameAttachedToGraph::for_model(self);
        let pose_relative_to = PoseRelativeToGraph::for_model(self);
        let kinematic = KinematicGraph::build(self, options);

        let graphs = ModelGraphs {
            attached_to: publish(attached_to, options, &mut errors),
            pose_relative_to: publish(pose_relative_to, options, &mut errors).map(Arc::new),
            kinematic: publish(kinematic, options, &mut errors),
        };

        for error in &errors {
            warn!("Model '{}': {}", self.name, error);
        }
        debug!(
            "Built graphs for model '{}' ({} errors)",
            self.name,
            errors.len()
        );

        let graphs = Arc::new(graphs);
        for link in &mut self.links {
            link.set_pose_graph(&self.name, graphs.pose_relative_to.clone());
        }
        self.graphs = graphs;
        self.build_errors = errors.clone();
        errors
    }

    /// Snapshot of the published graphs
    ///
    /// The snapshot stays consistent if the model is rebuilt afterwards.
    pub fn graphs(&self) -> Arc<ModelGraphs> {
        Arc::clone(&self.graphs)
    }

    /// Errors from the last build
    pub fn build_errors(&self) -> &[GraphError] {
        &self.build_errors
    }

    // ============== Resolution queries ==============

    /// Link that `name` (frame, joint, link or `__model__`) is rigidly attached to
    pub fn resolve_attached_link(&self, name: &str) -> Result<String, GraphError> {
        self.graphs
            .attached_to
            .as_ref()
            .ok_or_else(|| self.unavailable("attached-to"))?
            .resolve_attached_body(name)
    }

    /// Pose of `frame` relative to `relative_to` (empty = the model frame)
    pub fn resolve_pose(&self, frame: &str, relative_to: &str) -> Result<Pose, GraphError> {
        self.graphs
            .pose_relative_to
            .as_ref()
            .ok_or_else(|| self.unavailable("pose relative-to"))?
            .resolve(frame, relative_to)
    }

    /// Structural findings of the kinematic graph
    pub fn validate_kinematics(&self) -> Result<Vec<StructuralWarning>, GraphError> {
        self.graphs
            .kinematic
            .as_ref()
            .map(|graph| graph.warnings().to_vec())
            .ok_or_else(|| self.unavailable("kinematic"))
    }

    /// Semantic pose of any link, joint or frame of this model
    ///
    /// The implicit `__model__` frame has an identity pose relative to itself.
    pub fn semantic_pose_of(&self, name: &str) -> Result<SemanticPose, GraphError> {
        let (pose, relative_to) = if name == MODEL_FRAME {
            (Pose::IDENTITY, MODEL_FRAME)
        } else if let Some(link) = self.link_by_name(name) {
            (link.pose, link.resolved_relative_to())
        } else if let Some(joint) = self.joint_by_name(name) {
            (joint.pose, joint.resolved_relative_to())
        } else if let Some(frame) = self.frame_by_name(name) {
            (frame.pose, frame.resolved_relative_to(MODEL_FRAME))
        } else {
            return Err(GraphError::UnknownFrame {
                scope: self.name.clone(),
                name: name.to_string(),
            });
        };
        Ok(SemanticPose::new(
            &self.name,
            name,
            pose,
            relative_to,
            self.graphs.pose_relative_to.clone(),
        ))
    }

    /// True if the model is static or its kinematics could not be validated
    pub fn treats_as_static(&self) -> bool {
        self.is_static || self.graphs.kinematic.is_none()
    }

    fn unavailable(&self, graph: &'static str) -> GraphError {
        GraphError::GraphUnavailable {
            scope: self.name.clone(),
            graph,
        }
    }

    // ============== Attributes ==============

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn self_collide(&self) -> bool {
        self.self_collide
    }

    pub fn allow_auto_disable(&self) -> bool {
        self.allow_auto_disable
    }

    pub fn enable_wind(&self) -> bool {
        self.enable_wind
    }

    /// Explicit canonical link name (empty if unset)
    pub fn canonical_link_name(&self) -> &str {
        &self.canonical_link
    }

    /// The canonical link: the explicit one, else the first link
    pub fn canonical_link(&self) -> Option<&Link> {
        if self.canonical_link.is_empty() {
            self.links.first()
        } else {
            self.link_by_name(&self.canonical_link)
        }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn pose_relative_to(&self) -> &str {
        &self.pose_relative_to
    }

    /// Frame the model pose is expressed in, after applying defaults
    pub fn resolved_relative_to(&self) -> &str {
        if self.pose_relative_to.is_empty() {
            WORLD_FRAME
        } else {
            &self.pose_relative_to
        }
    }
}

/// Collect a builder's errors and decide whether its graph is published
pub(crate) fn publish<G>(built: Built<G>, options: &BuildOptions, errors: &mut Vec<GraphError>) -> Option<G> {
    let valid = built.is_valid();
    for error in built.errors {
        if !errors.contains(&error) {
            errors.push(error);
        }
    }
    (valid || options.publish_partial_graphs).then_some(built.graph)
}
