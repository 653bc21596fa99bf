use std::collections::HashMap;

use bevy::prelude::*;

use crate::{
    behaviors::{ChaseMode, SteeringCore},
    orbit::OrbitController,
    paths::PathFollower,
    TargetState,
};

/// Represents a `Component` which collects the steering forces of a host.
/// The forces are only accumulated here; applying them to the velocity is
/// left to the game.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component, Default, PartialEq)]
pub struct SteeringHost {
    /// Current velocity.
    pub velocity: Vec2,
    /// Sum of all steering forces produced since it was last cleared.
    pub steering: Vec2,
}

impl SteeringHost {
    /// Applies a steering vector to the host.
    pub fn steer(&mut self, steering_vec: Vec2) {
        self.steering += steering_vec;
    }
}

/// Orbits the `Transform` of the stored entity. Requires an [`OrbitController`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrbitTarget(pub Entity);

/// Runs one of the steering primitives against another entity.
/// The target's velocity is taken from its `SteeringHost`, if it has one.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Chase {
    pub core: SteeringCore,
    pub target: Entity,
    pub mode: ChaseMode,
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SteeringSet;

pub struct SteeringPlugin;

impl Plugin for SteeringPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SteeringHost>()
            .register_type::<PathFollower>()
            .register_type::<OrbitController>()
            .add_systems(
                Update,
                (steer_path_followers, steer_orbiters, steer_chasers).in_set(SteeringSet),
            );
    }
}

fn steer_path_followers(
    time: Res<Time>,
    mut hosts: Query<(Entity, &Transform, &mut SteeringHost, &mut PathFollower)>,
) {
    let dt = time.delta_seconds();
    for (entity, transform, mut host, mut follower) in &mut hosts {
        match follower.update(transform.translation.xy(), host.velocity, dt) {
            Ok(force) => host.steer(force),
            Err(err) => error!("Path following failed for {:?}: {}", entity, err),
        }
    }
}

fn steer_orbiters(
    time: Res<Time>,
    targets: Query<&Transform>,
    mut hosts: Query<(
        Entity,
        &Transform,
        &mut SteeringHost,
        &mut OrbitController,
        &OrbitTarget,
    )>,
) {
    let dt = time.delta_seconds();
    for (entity, transform, mut host, mut orbit, target) in &mut hosts {
        let Ok(target) = targets.get(target.0) else {
            warn!("Orbit target {:?} of {:?} not found", target.0, entity);
            continue;
        };

        let result = orbit.update(
            transform.translation.xy(),
            host.velocity,
            target.translation.xy(),
            dt,
        );
        match result {
            Ok(force) => host.steer(force),
            Err(err) => error!("Orbiting failed for {:?}: {}", entity, err),
        }
    }
}

fn steer_chasers(
    time: Res<Time>,
    mut set: ParamSet<(
        Query<(&Transform, Option<&SteeringHost>)>,
        Query<(Entity, &Transform, &mut SteeringHost, &mut Chase)>,
    )>,
) {
    let dt = time.delta_seconds();

    let wanted: Vec<Entity> = set.p1().iter().map(|(.., chase)| chase.target).collect();
    let targets: HashMap<Entity, TargetState> = {
        let query = set.p0();
        wanted
            .into_iter()
            .filter_map(|target| {
                let (transform, host) = query.get(target).ok()?;
                let state = TargetState {
                    position: transform.translation.xy(),
                    velocity: host.map(|h| h.velocity).unwrap_or_default(),
                };
                Some((target, state))
            })
            .collect()
    };

    for (entity, transform, mut host, mut chase) in &mut set.p1() {
        let Some(target) = targets.get(&chase.target) else {
            warn!("Chase target {:?} of {:?} not found", chase.target, entity);
            continue;
        };

        let mode = chase.mode;
        let force = mode.steer(
            &mut chase.core,
            transform.translation.xy(),
            host.velocity,
            target,
        );
        host.steer(force * dt);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use approx::assert_abs_diff_eq;

    fn app(dt: f32) -> App {
        let mut app = App::new();
        app.add_plugins(SteeringPlugin);

        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_secs_f32(dt));
        app.insert_resource(time);
        app
    }

    fn steering_of(app: &App, entity: Entity) -> Vec2 {
        app.world().get::<SteeringHost>(entity).unwrap().steering
    }

    #[test]
    fn path_followers_accumulate_scaled_force() {
        let mut app = app(0.5);
        let follower = PathFollower::new(
            SteeringCore::new(5.0, 10.0),
            [Vec2::new(100.0, 0.0), Vec2::new(200.0, 0.0)],
        )
        .unwrap();
        let host = app
            .world_mut()
            .spawn((Transform::default(), SteeringHost::default(), follower))
            .id();

        app.update();
        assert_abs_diff_eq!(steering_of(&app, host).x, 2.5, epsilon = 1e-5);

        app.update();
        assert_abs_diff_eq!(steering_of(&app, host).x, 5.0, epsilon = 1e-5);
    }

    #[test]
    fn failing_path_keeps_its_state() {
        let mut app = app(1.0);
        let follower = PathFollower::new(SteeringCore::default(), [Vec2::ZERO]).unwrap();
        let host = app
            .world_mut()
            .spawn((Transform::default(), SteeringHost::default(), follower))
            .id();

        app.update();
        let before = app.world().get::<PathFollower>(host).unwrap().clone();
        app.update();

        assert_eq!(app.world().get::<PathFollower>(host), Some(&before));
        assert_eq!(steering_of(&app, host), Vec2::ZERO);
    }

    #[test]
    fn orbiters_follow_target_transform() {
        let mut app = app(0.5);
        let target = app
            .world_mut()
            .spawn(Transform::from_xyz(0.0, 0.0, 0.0))
            .id();
        let orbit = OrbitController::new(SteeringCore::new(5.0, 10.0), 10.0, 4).unwrap();
        let host = app
            .world_mut()
            .spawn((
                Transform::from_xyz(100.0, 1.0, 0.0),
                SteeringHost::default(),
                orbit,
                OrbitTarget(target),
            ))
            .id();

        app.update();
        assert_abs_diff_eq!(steering_of(&app, host).length(), 2.5, epsilon = 1e-4);

        app.world_mut()
            .get_mut::<Transform>(target)
            .unwrap()
            .translation = Vec3::new(50.0, 50.0, 0.0);
        app.update();

        let orbit = app.world().get::<OrbitController>(host).unwrap();
        assert_abs_diff_eq!(orbit.waypoints()[0].x, 60.0, epsilon = 1e-4);
        assert_abs_diff_eq!(orbit.waypoints()[0].y, 50.0, epsilon = 1e-4);
    }

    #[test]
    fn evading_mirrors_pursuing() {
        let mut app = app(1.0);
        let target = app
            .world_mut()
            .spawn((
                Transform::from_xyz(40.0, 20.0, 0.0),
                SteeringHost {
                    velocity: Vec2::new(0.0, 15.0),
                    ..default()
                },
            ))
            .id();

        let core = SteeringCore::new(5.0, 100.0);
        let mut spawn_chaser = |mode| {
            app.world_mut()
                .spawn((
                    Transform::default(),
                    SteeringHost::default(),
                    Chase { core, target, mode },
                ))
                .id()
        };
        let pursuer = spawn_chaser(ChaseMode::Pursue);
        let evader = spawn_chaser(ChaseMode::Evade);

        app.update();

        let pursuit = steering_of(&app, pursuer);
        assert_ne!(pursuit, Vec2::ZERO);
        assert_eq!(steering_of(&app, evader), -pursuit);
        assert_eq!(steering_of(&app, target), Vec2::ZERO);
    }

    #[test]
    fn missing_target_is_skipped() {
        let mut app = app(1.0);
        let target = app.world_mut().spawn(Transform::default()).id();
        let host = app
            .world_mut()
            .spawn((
                Transform::default(),
                SteeringHost::default(),
                Chase {
                    core: SteeringCore::default(),
                    target,
                    mode: ChaseMode::Seek,
                },
                OrbitController::new(SteeringCore::default(), 10.0, 4).unwrap(),
                OrbitTarget(target),
            ))
            .id();
        app.world_mut().despawn(target);

        app.update();

        assert_eq!(steering_of(&app, host), Vec2::ZERO);
    }
}
