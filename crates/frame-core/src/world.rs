//! World scope: models and world-level frames

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::WORLD_FRAME;
use crate::entity::Frame;
use crate::error::GraphError;
use crate::graph::{FrameAttachedToGraph, PoseRelativeToGraph};
use crate::model::{Model, publish};
use crate::options::BuildOptions;
use crate::pose::Pose;
use crate::semantic_pose::SemanticPose;

/// Raw world data for deserialization (used internally)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorldData {
    name: String,
    #[serde(default)]
    models: Vec<Model>,
    #[serde(default)]
    frames: Vec<Frame>,
}

/// Graphs of the world scope (each model keeps its own)
#[derive(Debug, Clone, Default)]
pub struct WorldGraphs {
    pub attached_to: Option<FrameAttachedToGraph>,
    pub pose_relative_to: Option<Arc<PoseRelativeToGraph>>,
}

/// The outermost scope
///
/// Model names and world frame names share one namespace, distinct from the
/// namespace inside each model.
#[derive(Debug, Clone, Serialize)]
#[serde(into = "WorldData")]
pub struct World {
    name: String,
    models: Vec<Model>,
    frames: Vec<Frame>,
    graphs: Arc<WorldGraphs>,
    build_errors: Vec<GraphError>,
}

impl From<World> for WorldData {
    fn from(world: World) -> Self {
        Self {
            name: world.name,
            models: world.models,
            frames: world.frames,
        }
    }
}

impl From<WorldData> for World {
    fn from(data: WorldData) -> Self {
        let mut world = Self {
            name: data.name,
            models: data.models,
            frames: data.frames,
            graphs: Arc::new(WorldGraphs::default()),
            build_errors: Vec::new(),
        };
        world.build();
        world
    }
}

impl<'de> Deserialize<'de> for World {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = WorldData::deserialize(deserializer)?;
        Ok(World::from(data))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new("default")
    }
}

impl World {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            models: Vec::new(),
            frames: Vec::new(),
            graphs: Arc::new(WorldGraphs::default()),
            build_errors: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.add_model(model);
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.add_frame(frame);
        self
    }

    pub fn add_model(&mut self, model: Model) {
        self.models.push(model);
        self.invalidate_graphs();
    }

    pub fn add_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
        self.invalidate_graphs();
    }

    fn invalidate_graphs(&mut self) {
        self.graphs = Arc::new(WorldGraphs::default());
        self.build_errors.clear();
    }

    /// Build every model, then the world graphs
    pub fn build(&mut self) -> Vec<GraphError> {
        self.build_with(&BuildOptions::default())
    }

    /// Build every model, then the world graphs
    ///
    /// A broken model does not stop the others or the world graphs from
    /// being built; its errors are part of the returned list.
    pub fn build_with(&mut self, options: &BuildOptions) -> Vec<GraphError> {
        let mut errors = Vec::new();
        for model in &mut self.models {
            errors.extend(model.build_with(options));
        }

        let attached_to = FrameAttachedToGraph::for_world(self);
        let pose_relative_to = PoseRelativeToGraph::for_world(self);
        let mut scope_errors = Vec::new();
        let graphs = WorldGraphs {
            attached_to: publish(attached_to, options, &mut scope_errors),
            pose_relative_to: publish(pose_relative_to, options, &mut scope_errors).map(Arc::new),
        };
        for error in scope_errors {
            warn!("World '{}': {}", self.name, error);
            errors.push(error);
        }
        debug!(
            "Built graphs for world '{}' ({} models, {} errors)",
            self.name,
            self.models.len(),
            errors.len()
        );

        self.graphs = Arc::new(graphs);
        self.build_errors = errors.clone();
        errors
    }

    pub fn graphs(&self) -> Arc<WorldGraphs> {
        Arc::clone(&self.graphs)
    }

    pub fn build_errors(&self) -> &[GraphError] {
        &self.build_errors
    }

    /// Body (model or `world`) that `name` is attached to
    pub fn resolve_attached_body(&self, name: &str) -> Result<String, GraphError> {
        self.graphs
            .attached_to
            .as_ref()
            .ok_or_else(|| self.unavailable("attached-to"))?
            .resolve_attached_body(name)
    }

    /// Pose of `frame` relative to `relative_to` (empty = `world`)
    pub fn resolve_pose(&self, frame: &str, relative_to: &str) -> Result<Pose, GraphError> {
        self.graphs
            .pose_relative_to
            .as_ref()
            .ok_or_else(|| self.unavailable("pose relative-to"))?
            .resolve(frame, relative_to)
    }

    /// Semantic pose of a model or world frame
    ///
    /// The implicit `world` frame has an identity pose relative to itself.
    pub fn semantic_pose_of(&self, name: &str) -> Result<SemanticPose, GraphError> {
        let (pose, relative_to) = if name == WORLD_FRAME {
            (Pose::IDENTITY, WORLD_FRAME)
        } else if let Some(model) = self.model_by_name(name) {
            (*model.pose(), model.resolved_relative_to())
        } else if let Some(frame) = self.frame_by_name(name) {
            (frame.pose, frame.resolved_relative_to(WORLD_FRAME))
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

    fn unavailable(&self, graph: &'static str) -> GraphError {
        GraphError::GraphUnavailable {
            scope: self.name.clone(),
            graph,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn model_by_index(&self, index: usize) -> Option<&Model> {
        self.models.get(index)
    }

    pub fn frame_by_index(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn model_by_name(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name() == name)
    }

    pub fn frame_by_name(&self, name: &str) -> Option<&Frame> {
        self.frames.iter().find(|f| f.name == name)
    }

    pub fn model_name_exists(&self, name: &str) -> bool {
        self.model_by_name(name).is_some()
    }

    pub fn frame_name_exists(&self, name: &str) -> bool {
        self.frame_by_name(name).is_some()
    }
}
