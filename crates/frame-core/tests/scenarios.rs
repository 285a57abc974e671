//! End-to-end resolution through the public API

use std::thread;

use frame_core::{
    BuildOptions, Frame, GraphError, Joint, Link, Model, ModelGraphs, Pose, SemanticPose,
    StructuralWarning, World, WorldGraphs, POSE_TOLERANCE,
};

fn sensor_pose() -> Pose {
    Pose::from_xyz_rpy([0.3, -0.1, 0.25], [0.1, -0.4, 1.2])
}

fn cart(wheel_joint_child: &str) -> Model {
    Model::new("cart")
        .with_link(Link::new("chassis"))
        .with_link(Link::new("wheel").with_pose(Pose::from_xyz_rpy([0.5, 0.2, 0.0], [0.0, 0.0, 0.7])))
        .with_joint(Joint::builder("axle", "chassis", wheel_joint_child).continuous().build())
        .with_frame(
            Frame::new("sensor_mount")
                .attached_to("wheel")
                .with_pose(sensor_pose())
                .relative_to("chassis"),
        )
}

#[test]
fn test_cart_resolves() {
    let mut model = cart("wheel");
    assert!(model.build().is_empty());

    assert_eq!(model.resolve_attached_link("sensor_mount").unwrap(), "wheel");
    assert_eq!(model.resolve_pose("sensor_mount", "chassis").unwrap(), sensor_pose());
    assert!(model.validate_kinematics().unwrap().is_empty());
    assert!(!model.treats_as_static());
}

#[test]
fn test_cart_with_missing_child() {
    let mut model = cart("ghost");
    let errors = model.build();

    assert!(errors.iter().any(|e| matches!(
        e,
        GraphError::UnresolvedReference { entity, target, .. } if entity == "axle" && target == "ghost"
    )));
    assert!(model.graphs().kinematic.is_none());
    assert!(matches!(
        model.validate_kinematics(),
        Err(GraphError::GraphUnavailable { .. })
    ));
    assert!(model.treats_as_static());
}

#[test]
fn test_duplicate_link_names() {
    let model = || {
        Model::new("twins")
            .with_link(Link::new("base"))
            .with_link(Link::new("base"))
            .with_link(Link::new("arm").with_pose(Pose::from_position([0.0, 0.0, 1.0])))
            .with_joint(Joint::fixed("mount", "base", "arm"))
            .with_frame(Frame::new("tip").attached_to("arm").with_pose(Pose::from_position([0.0, 0.0, 0.5])))
    };

    let mut strict = model();
    let errors = strict.build();
    assert!(errors.contains(&GraphError::DuplicateName {
        scope: "twins".to_string(),
        name: "base".to_string(),
    }));
    assert!(strict.resolve_pose("tip", "").is_err());

    let mut partial = model();
    partial.build_with(&BuildOptions {
        publish_partial_graphs: true,
        ..BuildOptions::default()
    });
    assert!(!partial.build_errors().is_empty());
    let tip = partial.resolve_pose("tip", "").unwrap();
    assert!(tip.approx_eq(&Pose::from_position([0.0, 0.0, 1.5]), POSE_TOLERANCE));
    assert_eq!(partial.resolve_attached_link("tip").unwrap(), "arm");
}

#[test]
fn test_pose_laws() {
    let mut model = cart("wheel");
    model.build();
    let names = ["__model__", "chassis", "wheel", "axle", "sensor_mount"];

    for a in names {
        assert!(model.resolve_pose(a, a).unwrap().is_identity());
        for b in names {
            let a_in_b = model.resolve_pose(a, b).unwrap();
            let b_in_a = model.resolve_pose(b, a).unwrap();
            assert!(
                (a_in_b * b_in_a).approx_eq(&Pose::IDENTITY, POSE_TOLERANCE),
                "{a} / {b}"
            );
        }
    }
}

#[test]
fn test_attachment_cycles() {
    let mut single = Model::new("loop")
        .with_link(Link::new("base"))
        .with_frame(Frame::new("self_ref").attached_to("self_ref"));
    let errors = single.build();
    assert!(errors.iter().any(|e| matches!(
        e,
        GraphError::CyclicReference { chain, .. } if chain == &["self_ref", "self_ref"]
    )));

    let mut triple = Model::new("loop")
        .with_link(Link::new("base"))
        .with_frame(Frame::new("a").attached_to("b"))
        .with_frame(Frame::new("b").attached_to("c"))
        .with_frame(Frame::new("c").attached_to("a"));
    let errors = triple.build();
    assert!(errors.iter().any(|e| matches!(
        e,
        GraphError::CyclicReference { chain, .. } if chain.len() == 4
    )));
    assert!(triple.graphs().attached_to.is_none());
}

#[test]
fn test_unresolved_attachment() {
    let mut model = Model::new("lonely")
        .with_link(Link::new("base"))
        .with_frame(Frame::new("camera").attached_to("mast"));
    let errors = model.build();
    assert_eq!(
        errors,
        vec![GraphError::UnresolvedReference {
            scope: "lonely".to_string(),
            entity: "camera".to_string(),
            target: "mast".to_string(),
        }]
    );
}

#[test]
fn test_kinematic_loop_policy() {
    let model = || {
        Model::new("linkage")
            .with_link(Link::new("ground"))
            .with_link(Link::new("crank"))
            .with_link(Link::new("rocker"))
            .with_joint(Joint::builder("j1", "ground", "crank").revolute().build())
            .with_joint(Joint::builder("j2", "crank", "rocker").revolute().build())
            .with_joint(Joint::builder("j3", "ground", "rocker").revolute().build())
    };

    let mut lenient = model();
    assert!(lenient.build().is_empty());
    assert_eq!(
        lenient.validate_kinematics().unwrap(),
        vec![StructuralWarning::KinematicLoop {
            joint: "j3".to_string()
        }]
    );

    let mut strict = model();
    let errors = strict.build_with(&BuildOptions::strict());
    assert!(matches!(&errors[..], [GraphError::KinematicLoop { joint, .. }] if joint == "j3"));
    assert!(strict.treats_as_static());
}

#[test]
fn test_model_from_ron() {
    let source = r#"(
        name: "cart",
        canonical_link: "chassis",
        links: [
            (name: "chassis"),
            (name: "wheel", pose: (xyz: (0.5, 0.0, 0.0))),
        ],
        joints: [
            (name: "axle", joint_type: continuous, parent: "chassis", child: "wheel"),
        ],
        frames: [
            (name: "hub", attached_to: "wheel", pose: (xyz: (0.0, 0.1, 0.0))),
        ],
    )"#;

    let model: Model = ron::from_str(source).unwrap();
    assert!(model.build_errors().is_empty());
    assert!(model.allow_auto_disable());
    assert_eq!(model.resolve_attached_link("__model__").unwrap(), "chassis");
    let hub = model.resolve_pose("hub", "chassis").unwrap();
    assert!(hub.approx_eq(&Pose::from_position([0.5, 0.1, 0.0]), POSE_TOLERANCE));
    // Links loaded from a file share the model's graph
    let wheel = model.link_by_name("wheel").unwrap().semantic_pose();
    assert!(wheel.resolve("").unwrap().approx_eq(&Pose::from_position([0.5, 0.0, 0.0]), POSE_TOLERANCE));
}

#[test]
fn test_world_with_models() {
    let mut placed = cart("wheel");
    placed.set_pose(Pose::from_position([2.0, 0.0, 0.0]));
    let mut world = World::new("yard")
        .with_model(placed)
        .with_frame(Frame::new("gate").with_pose(Pose::from_position([0.0, 5.0, 0.0])));
    assert!(world.build().is_empty());

    let cart_in_gate = world.resolve_pose("cart", "gate").unwrap();
    assert!(cart_in_gate.approx_eq(&Pose::from_position([2.0, -5.0, 0.0]), POSE_TOLERANCE));
    assert_eq!(world.resolve_attached_body("gate").unwrap(), "world");

    let cart = world.model_by_name("cart").unwrap();
    assert_eq!(cart.resolve_attached_link("sensor_mount").unwrap(), "wheel");
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_built_scopes_are_thread_safe() {
    assert_send_sync::<Model>();
    assert_send_sync::<World>();
    assert_send_sync::<ModelGraphs>();
    assert_send_sync::<WorldGraphs>();
    assert_send_sync::<SemanticPose>();
}

#[test]
fn test_concurrent_queries() {
    let mut model = cart("wheel");
    assert!(model.build().is_empty());
    let model = &model;

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(move || {
                for _ in 0..1000 {
                    assert_eq!(model.resolve_attached_link("sensor_mount").unwrap(), "wheel");
                    assert_eq!(model.resolve_pose("sensor_mount", "chassis").unwrap(), sensor_pose());
                    assert!(model.validate_kinematics().unwrap().is_empty());
                }
            });
        }
    });
}
