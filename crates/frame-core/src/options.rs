//! Options controlling graph construction

/// How closed kinematic chains are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KinematicLoopPolicy {
    /// Report loops as warnings and keep the graph
    #[default]
    Warn,
    /// Report loops as errors and refuse to publish the graph
    Reject,
}

/// Build options for model and world graphs
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Treatment of closed kinematic chains
    pub kinematic_loops: KinematicLoopPolicy,
    /// Publish graphs that were built with errors (invalid entities are left
    /// disconnected, so only unrelated queries succeed)
    pub publish_partial_graphs: bool,
}

impl BuildOptions {
    /// Options that reject closed kinematic chains
    pub fn strict() -> Self {
        Self {
            kinematic_loops: KinematicLoopPolicy::Reject,
            ..Self::default()
        }
    }
}
