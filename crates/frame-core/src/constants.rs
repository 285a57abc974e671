//! Global constants for frame-core

/// Name of the implicit frame every model scope carries
pub const MODEL_FRAME: &str = "__model__";

/// Name of the implicit world frame (also the literal parent of fixed-to-world joints)
pub const WORLD_FRAME: &str = "world";

/// Default tolerance used when comparing resolved poses
pub const POSE_TOLERANCE: f64 = 1e-9;

/// Check whether a name is reserved for implicit frames
pub fn is_reserved_name(name: &str) -> bool {
    name == WORLD_FRAME || (name.len() >= 4 && name.starts_with("__") && name.ends_with("__"))
}
