use physics_solver::{
    ContactConstraint, IslandSolver, Joint, JointDef, MouseJointDef, PhysicsWorld, PinJointDef, RigidBody,
    SolverSettings, TimeStep, Vec2,
};

const DT: f64 = 1.0 / 60.0;
const GRAVITY: Vec2 = Vec2 { x: 0.0, y: -9.81 };

/// Two unconnected islands: a dragged body (0) and a pendulum (1, 2).
fn bodies() -> Vec<RigidBody> {
    vec![
        RigidBody::new_dynamic(1.0, 1.0),
        RigidBody::new_static(Vec2::new(5.0, 3.0), 0.0),
        RigidBody::new_dynamic(2.0, 0.3).with_position(Vec2::new(6.0, 3.0)),
    ]
}

fn drag_joints() -> Vec<Joint> {
    vec![JointDef::from(MouseJointDef::new(0, Vec2::new(2.0, 1.0)).with_max_force(200.0))
        .build()
        .unwrap()]
}

fn pendulum_joints() -> Vec<Joint> {
    vec![JointDef::from(PinJointDef::new(1, 2, Vec2::ZERO, Vec2::new(-1.0, 0.0)))
        .build()
        .unwrap()]
}

fn solve(solver: &mut IslandSolver, bodies: &[RigidBody], members: &[usize], joints: &mut [Joint]) {
    let settings = SolverSettings::default();
    let mut contacts: Vec<ContactConstraint> = Vec::new();
    solver.load(bodies, members);
    solver.solve(&TimeStep::new(DT, &settings), &settings, GRAVITY, joints, &mut contacts);
}

fn bits(bodies: &[RigidBody]) -> Vec<[u64; 6]> {
    bodies
        .iter()
        .map(|b| {
            [
                b.position.x.to_bits(),
                b.position.y.to_bits(),
                b.rotation.to_bits(),
                b.linear_velocity.x.to_bits(),
                b.linear_velocity.y.to_bits(),
                b.angular_velocity.to_bits(),
            ]
        })
        .collect()
}

#[test]
fn island_order_does_not_matter() {
    let mut forward = bodies();
    let mut backward = bodies();
    let (mut drag_f, mut pend_f) = (drag_joints(), pendulum_joints());
    let (mut drag_b, mut pend_b) = (drag_joints(), pendulum_joints());
    let mut first = IslandSolver::new();
    let mut second = IslandSolver::new();

    for _ in 0..60 {
        solve(&mut first, &forward, &[0], &mut drag_f);
        solve(&mut second, &forward, &[2, 1], &mut pend_f);
        first.write_back(&mut forward);
        second.write_back(&mut forward);

        solve(&mut second, &backward, &[2, 1], &mut pend_b);
        solve(&mut first, &backward, &[0], &mut drag_b);
        first.write_back(&mut backward);
        second.write_back(&mut backward);
    }

    assert_eq!(bits(&forward), bits(&backward));
}

#[test]
fn islands_solved_on_threads_match_sequential() {
    let mut sequential = bodies();
    let mut threaded = bodies();
    let (mut drag_s, mut pend_s) = (drag_joints(), pendulum_joints());
    let (mut drag_t, mut pend_t) = (drag_joints(), pendulum_joints());
    let mut solvers_s = [IslandSolver::new(), IslandSolver::new()];
    let mut solvers_t = [IslandSolver::new(), IslandSolver::new()];

    for _ in 0..60 {
        solve(&mut solvers_s[0], &sequential, &[0], &mut drag_s);
        solve(&mut solvers_s[1], &sequential, &[2, 1], &mut pend_s);
        for solver in &solvers_s {
            solver.write_back(&mut sequential);
        }

        let shared = &threaded;
        let [left, right] = &mut solvers_t;
        let (drag, pend) = (&mut drag_t, &mut pend_t);
        std::thread::scope(|scope| {
            scope.spawn(|| solve(left, shared, &[0], drag));
            scope.spawn(|| solve(right, shared, &[2, 1], pend));
        });
        for solver in &solvers_t {
            solver.write_back(&mut threaded);
        }
    }

    assert_eq!(bits(&sequential), bits(&threaded));
}

#[test]
fn world_with_two_islands_matches_each_alone() {
    let drag_world = |world: &mut PhysicsWorld, offset: usize| {
        let body = world.add_body(RigidBody::new_dynamic(1.0, 1.0));
        world
            .create_joint(MouseJointDef::new(body, Vec2::new(2.0, 1.0)).with_max_force(200.0))
            .unwrap();
        assert_eq!(body, offset);
    };
    let pendulum_world = |world: &mut PhysicsWorld, offset: usize| {
        let pivot = world.add_static_body(Vec2::new(5.0, 3.0), 0.0);
        let bob = world.add_body(RigidBody::new_dynamic(2.0, 0.3).with_position(Vec2::new(6.0, 3.0)));
        world
            .create_joint(PinJointDef::new(pivot, bob, Vec2::ZERO, Vec2::new(-1.0, 0.0)))
            .unwrap();
        assert_eq!(pivot, offset);
    };

    let mut both = PhysicsWorld::new();
    drag_world(&mut both, 0);
    pendulum_world(&mut both, 1);
    let mut drag_only = PhysicsWorld::new();
    drag_world(&mut drag_only, 0);
    let mut pendulum_only = PhysicsWorld::new();
    pendulum_world(&mut pendulum_only, 0);

    for _ in 0..90 {
        let report = both.step(DT).unwrap();
        assert_eq!(report.island_count(), 2);
        drag_only.step(DT).unwrap();
        pendulum_only.step(DT).unwrap();
    }

    assert_eq!(bits(&both.bodies[..1]), bits(&drag_only.bodies));
    assert_eq!(bits(&both.bodies[1..]), bits(&pendulum_only.bodies));
}
