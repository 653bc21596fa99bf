use bevy::prelude::*;
use common::math::truncate_vec2;
use movement::prelude::*;

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
pub struct PhysicsParams {
    /// Determines how fast an object can move. This value is multiplied by delta time, so it
    /// probably should be higher than 100 for noticeable velocity.
    /// Defaults to `250.0`.
    pub max_velocity: f32,
    /// Stores the maximum impulse of a steering force applied to an object per tick.
    /// Defaults to `150.0`.
    pub max_force: f32,
    /// Determines how much inertia an object will have.
    /// Defaults to `1.0`.
    pub mass: f32,
    /// Determines how fast an object will decelerate. Lower values mean faster deceleration.
    /// Should be in range [0, 1] where 0 - instant stop, 1 - no deceleration at all.
    /// Defaults to `0.98`.
    pub friction: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            max_velocity: 250.0,
            max_force: 150.0,
            mass: 1.0,
            friction: 0.98,
        }
    }
}

/// Applies the steering accumulated by the behaviors to each host.
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PhysicsParams>().add_systems(
            Update,
            (steer, update_positions, apply_friction)
                .chain()
                .after(SteeringSet),
        );
    }
}

fn steer(mut hosts: Query<(&mut SteeringHost, &PhysicsParams)>) {
    for (mut host, params) in &mut hosts {
        let steering = truncate_vec2(host.steering, params.max_force) / params.mass;
        host.steering = Vec2::ZERO;

        host.velocity = truncate_vec2(host.velocity + steering, params.max_velocity);
    }
}

fn update_positions(
    time: Res<Time>,
    mut hosts: Query<(&mut Transform, &SteeringHost), With<PhysicsParams>>,
) {
    for (mut transform, host) in &mut hosts {
        let movement = host.velocity * time.delta_seconds();
        transform.translation += movement.extend(0.0);
    }
}

fn apply_friction(mut hosts: Query<(&mut SteeringHost, &PhysicsParams)>) {
    for (mut host, params) in &mut hosts {
        host.velocity *= params.friction;
    }
}
