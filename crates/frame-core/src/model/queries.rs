//! Lookup methods for Model

use crate::constants::MODEL_FRAME;
use crate::entity::{Frame, Joint, Link};

use super::Model;

impl Model {
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Count total number of links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Count total number of joints
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Count total number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn link_by_index(&self, index: usize) -> Option<&Link> {
        self.links.get(index)
    }

    pub fn joint_by_index(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn frame_by_index(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Find a link by name (first match)
    pub fn link_by_name(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Find a joint by name (first match)
    pub fn joint_by_name(&self, name: &str) -> Option<&Joint> {
        self.joints.iter().find(|j| j.name == name)
    }

    /// Find a frame by name (first match)
    pub fn frame_by_name(&self, name: &str) -> Option<&Frame> {
        self.frames.iter().find(|f| f.name == name)
    }

    pub fn link_name_exists(&self, name: &str) -> bool {
        self.link_by_name(name).is_some()
    }

    pub fn joint_name_exists(&self, name: &str) -> bool {
        self.joint_by_name(name).is_some()
    }

    pub fn frame_name_exists(&self, name: &str) -> bool {
        self.frame_by_name(name).is_some()
    }

    /// Check if a name refers to anything in this scope, `__model__` included
    pub fn name_exists(&self, name: &str) -> bool {
        name == MODEL_FRAME
            || self.link_name_exists(name)
            || self.joint_name_exists(name)
            || self.frame_name_exists(name)
    }

    /// Joints whose child is `link`
    pub fn joints_into(&self, link: &str) -> Vec<&Joint> {
        self.joints.iter().filter(|j| j.child == link).collect()
    }

    /// Frames declared as attached to `name`
    pub fn frames_attached_to(&self, name: &str) -> Vec<&Frame> {
        self.frames
            .iter()
            .filter(|f| f.resolved_attached_to(MODEL_FRAME) == name)
            .collect()
    }

    /// Check if the model has no entities
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.joints.is_empty() && self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        let model = Model::new("m")
            .with_link(Link::new("base"))
            .with_link(Link::new("arm"))
            .with_joint(Joint::fixed("j", "base", "arm"))
            .with_frame(Frame::new("f").attached_to("arm"))
            .with_frame(Frame::new("g"));

        assert_eq!(model.link_count(), 2);
        assert_eq!(model.joint_count(), 1);
        assert_eq!(model.frame_count(), 2);
        assert_eq!(model.link_by_index(1).unwrap().name, "arm");
        assert!(model.link_by_index(2).is_none());
        assert_eq!(model.joint_by_index(0).unwrap().name, "j");
        assert_eq!(model.frame_by_index(1).unwrap().name, "g");

        assert!(model.link_name_exists("base"));
        assert!(!model.link_name_exists("j"));
        assert!(model.joint_name_exists("j"));
        assert!(model.frame_name_exists("f"));
        assert!(model.name_exists("__model__"));
        assert!(!model.name_exists("Base"));

        assert_eq!(model.joints_into("arm").len(), 1);
        assert_eq!(model.frames_attached_to("arm").len(), 1);
        assert_eq!(model.frames_attached_to("__model__")[0].name, "g");
        assert!(!model.is_empty());
        assert!(Model::new("empty").is_empty());
    }
}
