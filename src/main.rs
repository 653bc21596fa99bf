use std::time::Duration;

use bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*, state::app::StatesPlugin};
use movement::plugin::SteeringPlugin;

mod agents;
mod physics;

use agents::AgentsPlugin;
use physics::PhysicsPlugin;

pub const FRAMERATE: f64 = 60.0;
pub const FIXED_TIMESTEP: f64 = 1.0 / FRAMERATE;
pub const RUN_DURATION_SEC: f32 = 30.0;
pub const DEFAULT_CONFIG_PATH: &str = "steering.json";

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
        Duration::from_secs_f64(FIXED_TIMESTEP),
    )))
    .add_plugins(LogPlugin::default())
    .add_plugins(AssetPlugin::default())
    .add_plugins(StatesPlugin)
    .add_plugins(SteeringPlugin)
    .add_plugins(PhysicsPlugin)
    .add_plugins(AgentsPlugin { config_path })
    .add_systems(Update, stop_after_duration);

    app.run();
}

fn stop_after_duration(time: Res<Time>, mut exit: EventWriter<AppExit>) {
    if time.elapsed_seconds() >= RUN_DURATION_SEC {
        info!("Finished after {:.1}s", time.elapsed_seconds());
        exit.send(AppExit::Success);
    }
}
