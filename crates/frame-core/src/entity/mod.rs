//! Entity records handed over by the document loader

mod frame;
mod joint;
mod link;

pub use frame::Frame;
pub use joint::{Joint, JointBuilder, JointType};
pub use link::Link;

use serde::{Deserialize, Serialize};

/// Kind tag carried by every graph vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Link,
    Joint,
    Frame,
    Model,
    /// The implicit `__model__` frame of a model scope
    ModelFrame,
    /// The implicit `world` frame of a world scope
    World,
}

impl EntityKind {
    /// Kinds that act as rigid bodies for attachment purposes
    pub fn is_body(&self) -> bool {
        matches!(self, EntityKind::Link | EntityKind::Model | EntityKind::World)
    }
}
