//! Error types shared by the graph builders and resolvers

/// Broad error classes, independent of the data carried by [`GraphError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnresolvedReference,
    DuplicateName,
    ReservedName,
    CyclicReference,
    AmbiguousRoot,
    MissingRoot,
    PathUnreachable,
    ModelWithoutLink,
    KinematicLoop,
    GraphUnavailable,
}

/// Errors raised while building or querying frame graphs
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("Unresolved reference in '{scope}': '{entity}' refers to '{target}', which does not exist")]
    UnresolvedReference {
        scope: String,
        entity: String,
        target: String,
    },
    #[error("Unknown frame in '{scope}': '{name}'")]
    UnknownFrame { scope: String, name: String },
    #[error("Duplicate name in '{scope}': '{name}'")]
    DuplicateName { scope: String, name: String },
    #[error("Reserved name used in '{scope}': '{name}'")]
    ReservedName { scope: String, name: String },
    #[error("Cyclic reference in '{scope}': {}", .chain.join(" -> "))]
    CyclicReference { scope: String, chain: Vec<String> },
    #[error("Ambiguous kinematic root in '{scope}': candidates {candidates:?}")]
    AmbiguousRoot {
        scope: String,
        candidates: Vec<String>,
    },
    #[error("No kinematic root in '{scope}'")]
    MissingRoot { scope: String },
    #[error("No path between '{from}' and '{to}' in '{scope}'")]
    PathUnreachable {
        scope: String,
        from: String,
        to: String,
    },
    #[error("Model '{model}' has no links")]
    ModelWithoutLink { model: String },
    #[error("Kinematic loop in '{scope}' closed by joint '{joint}'")]
    KinematicLoop { scope: String, joint: String },
    #[error("The {graph} graph of '{scope}' is not available")]
    GraphUnavailable { scope: String, graph: &'static str },
}

impl GraphError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GraphError::UnresolvedReference { .. } | GraphError::UnknownFrame { .. } => {
                ErrorCode::UnresolvedReference
            }
            GraphError::DuplicateName { .. } => ErrorCode::DuplicateName,
            GraphError::ReservedName { .. } => ErrorCode::ReservedName,
            GraphError::CyclicReference { .. } => ErrorCode::CyclicReference,
            GraphError::AmbiguousRoot { .. } => ErrorCode::AmbiguousRoot,
            GraphError::MissingRoot { .. } => ErrorCode::MissingRoot,
            GraphError::PathUnreachable { .. } => ErrorCode::PathUnreachable,
            GraphError::ModelWithoutLink { .. } => ErrorCode::ModelWithoutLink,
            GraphError::KinematicLoop { .. } => ErrorCode::KinematicLoop,
            GraphError::GraphUnavailable { .. } => ErrorCode::GraphUnavailable,
        }
    }

    /// Scope the error was raised in
    pub fn scope(&self) -> &str {
        match self {
            GraphError::UnresolvedReference { scope, .. }
            | GraphError::UnknownFrame { scope, .. }
            | GraphError::DuplicateName { scope, .. }
            | GraphError::ReservedName { scope, .. }
            | GraphError::CyclicReference { scope, .. }
            | GraphError::AmbiguousRoot { scope, .. }
            | GraphError::MissingRoot { scope }
            | GraphError::PathUnreachable { scope, .. }
            | GraphError::KinematicLoop { scope, .. }
            | GraphError::GraphUnavailable { scope, .. } => scope,
            GraphError::ModelWithoutLink { model } => model,
        }
    }

    /// Structural errors that still leave a usable graph behind
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::AmbiguousRoot | ErrorCode::MissingRoot
        )
    }
}

/// A graph together with the errors raised while building it
///
/// The graph holds everything that could be built; entities with invalid
/// references are left without outgoing edges.
#[derive(Debug, Clone)]
pub struct Built<G> {
    pub graph: G,
    pub errors: Vec<GraphError>,
}

impl<G> Built<G> {
    pub fn new(graph: G, errors: Vec<GraphError>) -> Self {
        Self { graph, errors }
    }

    /// True if no error prevents the graph from being published
    pub fn is_valid(&self) -> bool {
        self.errors.iter().all(GraphError::is_recoverable)
    }

    /// The graph if it is valid, otherwise every error
    pub fn into_result(self) -> Result<G, Vec<GraphError>> {
        if self.is_valid() {
            Ok(self.graph)
        } else {
            Err(self.errors)
        }
    }
}
