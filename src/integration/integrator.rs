use crate::common::SolverSettings;
use crate::constraints::{BodySnapshot, Position, Velocity};
use crate::math::Vec2;
use crate::objects::BodyType;

/// Integrates external loads into the velocity (semi-implicit Euler).
///
/// Gravity, force and torque accelerate dynamic bodies only; damping is applied
/// after, as the implicit factor `1 / (1 + h * damping)`. Kinematic and static
/// bodies keep their velocity.
pub fn integrate_velocity(body: &BodySnapshot, velocity: &mut Velocity, gravity: Vec2, dt: f64) {
    if body.body_type != BodyType::Dynamic {
        return;
    }

    // v += h * (g + F / m)
    velocity.v += (gravity * body.gravity_scale + body.force * body.inv_mass) * dt;
    // w += h * T / I
    velocity.w += body.torque * body.inv_inertia * dt;

    velocity.v *= 1.0 / (1.0 + dt * body.linear_damping);
    velocity.w *= 1.0 / (1.0 + dt * body.angular_damping);
}

/// Advances the position with the solved velocity.
///
/// Motion per step is capped at `max_translation` and `max_rotation`; when a
/// cap applies the velocity is scaled down with it, so the stored velocity
/// matches the motion that happened.
pub fn integrate_position(position: &mut Position, velocity: &mut Velocity, dt: f64, settings: &SolverSettings) {
    let translation = velocity.v * dt;
    if translation.length_squared() > settings.max_translation * settings.max_translation {
        velocity.v *= settings.max_translation / translation.length();
    }

    let rotation = velocity.w * dt;
    if rotation * rotation > settings.max_rotation * settings.max_rotation {
        velocity.w *= settings.max_rotation / rotation.abs();
    }

    position.c += velocity.v * dt;
    position.a += velocity.w * dt;
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    fn dynamic(mass: f64, inertia: f64) -> BodySnapshot {
        BodySnapshot {
            body_type: BodyType::Dynamic,
            mass,
            inv_mass: 1.0 / mass,
            inv_inertia: 1.0 / inertia,
            gravity_scale: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_integrate_linear_motion_no_force() {
        let body = dynamic(1.0, 1.0);
        let mut velocity = Velocity {
            v: Vec2::new(10.0, -5.0),
            w: 0.0,
        };
        let mut position = Position::default();
        let dt = 0.1;

        integrate_velocity(&body, &mut velocity, Vec2::ZERO, dt);
        integrate_position(&mut position, &mut velocity, dt, &SolverSettings::default());

        assert!((position.c.x - 1.0).abs() < EPSILON);
        assert!((position.c.y - -0.5).abs() < EPSILON);
        assert_eq!(velocity.v, Vec2::new(10.0, -5.0)); // Velocity unchanged
    }

    #[test]
    fn test_integrate_linear_motion_constant_force() {
        let mut body = dynamic(2.0, 1.0);
        body.force = Vec2::new(10.0, 0.0);
        // a = F/m = (5, 0)
        let mut velocity = Velocity::default();
        let dt = 0.1;

        integrate_velocity(&body, &mut velocity, Vec2::ZERO, dt);

        assert!((velocity.v.x - 0.5).abs() < EPSILON);
        assert!(velocity.v.y.abs() < EPSILON);
    }

    #[test]
    fn test_gravity_scale_and_torque() {
        let mut body = dynamic(1.0, 0.5);
        body.gravity_scale = 0.5;
        body.torque = 1.0;
        let mut velocity = Velocity::default();

        integrate_velocity(&body, &mut velocity, Vec2::new(0.0, -10.0), 0.1);

        assert!((velocity.v.y - -0.5).abs() < EPSILON);
        assert!((velocity.w - 0.2).abs() < EPSILON);
    }

    #[test]
    fn test_damping_is_implicit() {
        let mut body = dynamic(1.0, 1.0);
        body.linear_damping = 1.0;
        body.angular_damping = 4.0;
        let mut velocity = Velocity {
            v: Vec2::new(2.0, 0.0),
            w: 1.0,
        };

        integrate_velocity(&body, &mut velocity, Vec2::ZERO, 0.25);

        // 1 / (1 + 0.25 * 1) = 0.8, 1 / (1 + 0.25 * 4) = 0.5
        assert!((velocity.v.x - 1.6).abs() < EPSILON);
        assert!((velocity.w - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_non_dynamic_bodies_keep_velocity() {
        let body = BodySnapshot {
            body_type: BodyType::Kinematic,
            ..Default::default()
        };
        let mut velocity = Velocity {
            v: Vec2::new(1.0, 0.0),
            w: 0.0,
        };
        integrate_velocity(&body, &mut velocity, Vec2::new(0.0, -10.0), 0.1);
        assert_eq!(velocity.v, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_position_step_is_capped() {
        let settings = SolverSettings::default();
        let mut position = Position::default();
        let mut velocity = Velocity {
            v: Vec2::new(1000.0, 0.0),
            w: 1000.0,
        };
        let dt = 0.1;

        integrate_position(&mut position, &mut velocity, dt, &settings);

        assert!((position.c.x - settings.max_translation).abs() < EPSILON);
        assert!((position.a - settings.max_rotation).abs() < EPSILON);
        assert!((velocity.v.x - settings.max_translation / dt).abs() < EPSILON);
    }
}
