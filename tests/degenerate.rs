use physics_solver::{
    DistanceJointDef, JointError, MouseJointDef, PhysicsWorld, RigidBody, SolverSettings, Vec2, WorldError,
};

const DT: f64 = 1.0 / 60.0;

#[test]
fn zero_stiffness_mouse_joint_stays_finite() {
    let mut world = PhysicsWorld::new();
    let body = world.add_body(RigidBody::new_dynamic(1.0, 1.0));
    let drag = world
        .create_joint(
            MouseJointDef::new(body, Vec2::new(3.0, 0.0))
                .with_frequency(0.0)
                .with_damping_ratio(0.0)
                .with_max_force(100.0),
        )
        .unwrap();

    for _ in 0..120 {
        world.step(DT).unwrap();
        let mouse = world.joint(drag).unwrap().as_mouse().unwrap();
        assert_eq!(mouse.gamma(), 0.0);
        assert_eq!(mouse.beta(), 0.0);
        assert!(mouse.impulse().is_valid());
        assert!(world.bodies[body].position.is_valid());
        assert!(world.bodies[body].linear_velocity.is_valid());
    }

    // Without stiffness the joint only holds velocity: gravity is cancelled
    // and the body never drifts toward the target.
    assert!(world.bodies[body].position.length() < 1e-9);
}

#[test]
fn zero_force_limit_leaves_body_free() {
    let mut world = PhysicsWorld::new().with_gravity(Vec2::new(0.0, -10.0));
    let body = world.add_body(RigidBody::new_dynamic(1.0, 1.0));
    let drag = world.create_joint(MouseJointDef::new(body, Vec2::new(0.0, 5.0))).unwrap();

    for _ in 0..30 {
        world.step(DT).unwrap();
    }

    assert_eq!(world.joint(drag).unwrap().as_mouse().unwrap().impulse(), Vec2::ZERO);
    assert!((world.bodies[body].linear_velocity.y - -10.0 * 30.0 * DT).abs() < 1e-9);
}

#[test]
fn body_without_rotational_inertia_is_dragged_off_center() {
    let mut world = PhysicsWorld::new().with_gravity(Vec2::ZERO);
    let body = world.add_body(RigidBody::new_dynamic(1.0, 0.0));
    assert_eq!(world.bodies[body].inv_inertia, 0.0);
    world
        .create_joint(
            MouseJointDef::new(body, Vec2::new(1.0, 1.0))
                .with_local_anchor(Vec2::new(0.5, 0.0))
                .with_max_force(500.0),
        )
        .unwrap();

    for _ in 0..240 {
        world.step(DT).unwrap();
    }

    let b = &world.bodies[body];
    assert_eq!(b.rotation, 0.0);
    assert!((b.position - Vec2::new(0.5, 1.0)).length() < 1e-3);
}

#[test]
fn large_epsilon_falls_back_to_rigid() {
    let settings = SolverSettings::default().with_epsilon(1.0);
    let mut world = PhysicsWorld::new().with_gravity(Vec2::ZERO).with_settings(settings);
    let body = world.add_body(RigidBody::new_dynamic(1.0e-6, 1.0e-6));
    let drag = world
        .create_joint(
            MouseJointDef::new(body, Vec2::new(1.0, 0.0))
                .with_frequency(1.0)
                .with_max_force(1.0),
        )
        .unwrap();

    world.step(DT).unwrap();

    // h * (d + h * k) is far below the overridden epsilon.
    let mouse = world.joint(drag).unwrap().as_mouse().unwrap();
    assert_eq!(mouse.gamma(), 0.0);
    assert_eq!(mouse.beta(), 0.0);
    assert!(world.bodies[body].position.is_valid());
}

#[test]
fn rigid_distance_joint_needs_length() {
    let mut world = PhysicsWorld::new();
    let a = world.add_body(RigidBody::new_dynamic(1.0, 1.0));
    let b = world.add_body(RigidBody::new_dynamic(1.0, 1.0));

    assert_eq!(
        world.create_joint(DistanceJointDef::new(a, b, Vec2::ZERO, Vec2::ZERO, 0.0)),
        Err(WorldError::Joint(JointError::DegenerateLength))
    );
    // A soft joint may pull its anchors together.
    assert!(world
        .create_joint(DistanceJointDef::new(a, b, Vec2::ZERO, Vec2::ZERO, 0.0).with_frequency(2.0))
        .is_ok());
}
