use std::time::Duration;

use bevy::{asset::LoadState, prelude::*};
use common::math::rng_f32;
use movement::prelude::*;

use crate::physics::PhysicsParams;

const SPAWN_JITTER: f32 = 25.0;
const REPORT_INTERVAL_SEC: u64 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, States)]
pub enum AgentsState {
    #[default]
    LoadConfig,
    Running,
}

/// Loads the steering profiles through the asset server and, once they are
/// in, spawns one agent per profile around a wandering target.
/// Needs `AssetPlugin` and `StatesPlugin`.
pub struct AgentsPlugin {
    /// Asset path, relative to the asset folder.
    pub config_path: String,
}

impl Plugin for AgentsPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<SteeringConfig>()
            .init_asset_loader::<SteeringConfigLoader>()
            .init_state::<AgentsState>()
            .insert_resource(ConfigPath(self.config_path.clone()))
            .insert_resource(Configs::default())
            .insert_resource(ReportTimer(Timer::new(
                Duration::from_secs(REPORT_INTERVAL_SEC),
                TimerMode::Repeating,
            )))
            .add_systems(Startup, (spawn_target, start_loading))
            .add_systems(
                Update,
                check_config.run_if(in_state(AgentsState::LoadConfig)),
            )
            .add_systems(OnEnter(AgentsState::Running), spawn_agents)
            .add_systems(Update, (wander.before(SteeringSet), report));
    }
}

#[derive(Resource)]
struct ConfigPath(String);

#[derive(Default, Resource)]
pub struct Configs {
    pub steering_config: Handle<SteeringConfig>,
}

#[derive(Resource)]
struct ReportTimer(Timer);

/// The entity every agent orbits, chases or flees from.
#[derive(Component, Debug)]
pub struct Wanderer {
    pub radius: f32,
    pub angular_speed: f32,
}

impl Default for Wanderer {
    fn default() -> Self {
        Self {
            radius: 200.0,
            angular_speed: 0.3,
        }
    }
}

fn spawn_target(mut commands: Commands) {
    commands.spawn((
        Name::new("target"),
        Wanderer::default(),
        Transform::from_xyz(200.0, 0.0, 0.0),
        SteeringHost::default(),
    ));
}

fn start_loading(
    asset_server: Res<AssetServer>,
    config_path: Res<ConfigPath>,
    mut configs: ResMut<Configs>,
) {
    info!("Loading steering config: {}", config_path.0);
    configs.steering_config = asset_server.load(config_path.0.clone());
}

fn check_config(
    asset_server: Res<AssetServer>,
    configs: Res<Configs>,
    mut events: EventReader<AssetEvent<SteeringConfig>>,
    mut next_state: ResMut<NextState<AgentsState>>,
    mut exit: EventWriter<AppExit>,
) {
    for event in events.read() {
        if event.is_loaded_with_dependencies(&configs.steering_config) {
            next_state.set(AgentsState::Running);
            return;
        }
    }

    if let LoadState::Failed(err) = asset_server.load_state(&configs.steering_config) {
        error!("{}", err);
        exit.send(AppExit::error());
    }
}

fn spawn_agents(
    mut commands: Commands,
    configs: Res<Configs>,
    steering_configs: Res<Assets<SteeringConfig>>,
    target: Query<Entity, With<Wanderer>>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(config) = steering_configs.get(&configs.steering_config) else {
        error!("Steering config is gone before spawning");
        exit.send(AppExit::error());
        return;
    };

    let Ok(target) = target.get_single() else {
        error!("No wandering target to steer around");
        exit.send(AppExit::error());
        return;
    };

    for (name, profile) in &config.profiles {
        let jitter = Vec2::new(
            rng_f32(-SPAWN_JITTER, SPAWN_JITTER),
            rng_f32(-SPAWN_JITTER, SPAWN_JITTER),
        );
        let base = (
            Name::new(name.clone()),
            SteeringHost::default(),
            PhysicsParams::default(),
        );

        match profile {
            BehaviorProfile::PathFollowing(params) => match PathFollower::try_from(params) {
                Ok(follower) => {
                    let start = follower.current_trajectory() + jitter;
                    commands.spawn((
                        base,
                        Transform::from_translation(start.extend(0.0)),
                        follower,
                    ));
                }
                Err(err) => error!("Skipping '{}': {}", name, err),
            },
            BehaviorProfile::Orbiting(params) => match OrbitController::try_from(params) {
                Ok(orbit) => {
                    commands.spawn((
                        base,
                        Transform::from_translation(jitter.extend(0.0)),
                        orbit,
                        OrbitTarget(target),
                    ));
                }
                Err(err) => error!("Skipping '{}': {}", name, err),
            },
            BehaviorProfile::Chase(params) => {
                commands.spawn((
                    base,
                    Transform::from_translation(jitter.extend(0.0)),
                    Chase {
                        core: params.steering.into(),
                        target,
                        mode: params.mode,
                    },
                ));
            }
        }

        info!("Spawned '{}'", name);
    }
}

fn wander(time: Res<Time>, mut query: Query<(&mut Transform, &mut SteeringHost, &Wanderer)>) {
    let t = time.elapsed_seconds();
    for (mut transform, mut host, wanderer) in &mut query {
        let angle = t * wanderer.angular_speed;
        let position = Vec2::new(angle.cos(), angle.sin()) * wanderer.radius;

        host.velocity =
            Vec2::new(-angle.sin(), angle.cos()) * wanderer.radius * wanderer.angular_speed;
        transform.translation = position.extend(0.0);
    }
}

fn report(
    time: Res<Time>,
    mut timer: ResMut<ReportTimer>,
    query: Query<(&Name, &Transform, &SteeringHost)>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }

    for (name, transform, host) in &query {
        info!(
            "{:>10}: position {:>7.1} {:>7.1}, speed {:>6.1}",
            name.as_str(),
            transform.translation.x,
            transform.translation.y,
            host.velocity.length()
        );
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use bevy::state::app::StatesPlugin;

    use super::*;
    use crate::DEFAULT_CONFIG_PATH;

    const MAX_FRAMES: usize = 500;

    fn app(config_path: &str) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default(), StatesPlugin))
            .add_plugins(AgentsPlugin {
                config_path: config_path.to_string(),
            });
        app
    }

    /// Updates until `done` holds, giving the IO task pool time to read the file.
    fn run_until(app: &mut App, mut done: impl FnMut(&mut App) -> bool) -> bool {
        for _ in 0..MAX_FRAMES {
            app.update();
            if done(app) {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn exit_requested(app: &mut App) -> bool {
        !app.world().resource::<Events<AppExit>>().is_empty()
    }

    #[test]
    fn bundled_profiles_are_valid() {
        let json_str = include_str!("../assets/steering.json");
        let config = SteeringConfig::from_json_str(json_str).unwrap();

        assert_eq!(config.profiles.len(), 6);
        assert!(matches!(
            config.get("guard"),
            Some(BehaviorProfile::Orbiting(_))
        ));
    }

    #[test]
    fn spawns_one_agent_per_profile_once_loaded() {
        let mut app = app(DEFAULT_CONFIG_PATH);

        let spawned = run_until(&mut app, |app| {
            let world = app.world_mut();
            world.query::<&Chase>().iter(world).count() > 0
        });
        assert!(spawned, "agents were never spawned");

        let world = app.world_mut();
        assert_eq!(world.query::<&PathFollower>().iter(world).count(), 2);
        assert_eq!(world.query::<&OrbitTarget>().iter(world).count(), 1);
        assert_eq!(world.query::<&Chase>().iter(world).count(), 3);
        assert_eq!(world.query::<&Wanderer>().iter(world).count(), 1);
        assert_eq!(
            *world.resource::<State<AgentsState>>().get(),
            AgentsState::Running
        );
    }

    #[test]
    fn missing_config_exits_with_error() {
        let mut app = app("does/not/exist.json");

        assert!(run_until(&mut app, exit_requested));

        let world = app.world_mut();
        assert_eq!(world.query::<&SteeringHost>().iter(world).count(), 1);
        assert_eq!(
            *world.resource::<State<AgentsState>>().get(),
            AgentsState::LoadConfig
        );
    }
}
