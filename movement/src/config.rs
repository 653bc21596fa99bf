use std::collections::BTreeMap;

use bevy::{
    asset::{io::Reader, Asset, AssetLoader, AsyncReadExt, LoadContext},
    prelude::*,
    reflect::TypePath,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    behaviors::{ChaseMode, SteeringCore},
    error::SteeringError,
    orbit::{OrbitController, DEFAULT_ORBIT_LEEWAY},
    paths::{PathFollower, DEFAULT_PATH_LEEWAY},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringParams {
    pub steering_force: f32,
    pub max_velocity: f32,
    #[serde(default)]
    pub approach_distance: f32,
    #[serde(default)]
    pub halt_distance: f32,
}

impl From<SteeringParams> for SteeringCore {
    fn from(params: SteeringParams) -> Self {
        SteeringCore::new(params.steering_force, params.max_velocity)
            .with_approach_distance(params.approach_distance)
            .with_halt_distance(params.halt_distance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathFollowingParams {
    pub steering: SteeringParams,
    /// Kept as plain lists so that malformed entries surface as a
    /// configuration error rather than a parse error.
    pub waypoints: Vec<Vec<f32>>,
    #[serde(default)]
    pub backtrack: bool,
    #[serde(default)]
    pub rest: bool,
    #[serde(default = "default_path_leeway")]
    pub leeway_distance: f32,
}

impl TryFrom<&PathFollowingParams> for PathFollower {
    type Error = SteeringError;

    fn try_from(params: &PathFollowingParams) -> Result<Self, Self::Error> {
        Ok(PathFollower::from_coords(params.steering.into(), params.waypoints.as_slice())?
            .with_backtrack(params.backtrack)
            .with_rest(params.rest)
            .with_leeway_distance(params.leeway_distance))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitingParams {
    pub steering: SteeringParams,
    #[serde(default)]
    pub orbital_radius: f32,
    #[serde(default)]
    pub orbital_node_num: u32,
    #[serde(default)]
    pub node_rotation_degree: f32,
    #[serde(default = "default_orbit_leeway")]
    pub leeway_distance: f32,
}

impl TryFrom<&OrbitingParams> for OrbitController {
    type Error = SteeringError;

    fn try_from(params: &OrbitingParams) -> Result<Self, Self::Error> {
        Ok(OrbitController::new(
            params.steering.into(),
            params.orbital_radius,
            params.orbital_node_num,
        )?
        .with_node_rotation_degree(params.node_rotation_degree)
        .with_leeway_distance(params.leeway_distance))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChaseParams {
    pub steering: SteeringParams,
    #[serde(default)]
    pub mode: ChaseMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "behavior", rename_all = "snake_case")]
pub enum BehaviorProfile {
    PathFollowing(PathFollowingParams),
    Orbiting(OrbitingParams),
    Chase(ChaseParams),
}

impl BehaviorProfile {
    /// Checks that the profile builds a behavior without keeping it.
    pub fn validate(&self) -> Result<(), SteeringError> {
        match self {
            BehaviorProfile::PathFollowing(params) => PathFollower::try_from(params).map(|_| ()),
            BehaviorProfile::Orbiting(params) => OrbitController::try_from(params).map(|_| ()),
            BehaviorProfile::Chase(_) => Ok(()),
        }
    }
}

/// Named behavior profiles, usually read from a JSON file.
#[derive(Debug, Asset, TypePath, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SteeringConfig {
    pub profiles: BTreeMap<String, BehaviorProfile>,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigLoaderError {
    #[error("Could not load config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid profile '{name}': {source}")]
    Steering {
        name: String,
        #[source]
        source: SteeringError,
    },
}

impl SteeringConfig {
    /// Parses and validates every profile.
    pub fn from_json_str(json_str: &str) -> Result<Self, ConfigLoaderError> {
        let config = serde_json::from_str::<SteeringConfig>(json_str)?;

        for (name, profile) in &config.profiles {
            profile
                .validate()
                .map_err(|source| ConfigLoaderError::Steering {
                    name: name.clone(),
                    source,
                })?;
        }

        Ok(config)
    }

    pub fn get(&self, name: &str) -> Option<&BehaviorProfile> {
        self.profiles.get(name)
    }
}

/// Reads `.json` steering configs through the asset server. Every profile is
/// validated before the asset becomes available.
#[derive(Default)]
pub struct SteeringConfigLoader;

impl AssetLoader for SteeringConfigLoader {
    type Asset = SteeringConfig;
    type Settings = ();
    type Error = ConfigLoaderError;

    async fn load<'a>(
        &'a self,
        reader: &'a mut Reader<'_>,
        _settings: &'a Self::Settings,
        load_context: &'a mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut json_str = String::new();

        reader.read_to_string(&mut json_str).await?;

        let config = SteeringConfig::from_json_str(&json_str)?;
        info!(
            "Loaded {} steering profiles from {:?}",
            config.profiles.len(),
            load_context.path()
        );

        Ok(config)
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }
}

fn default_path_leeway() -> f32 {
    DEFAULT_PATH_LEEWAY
}

fn default_orbit_leeway() -> f32 {
    DEFAULT_ORBIT_LEEWAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;

    const PROFILES: &str = r#"{
        "profiles": {
            "patrol": {
                "behavior": "path_following",
                "steering": { "steering_force": 4.0, "max_velocity": 120.0 },
                "waypoints": [[0, 0], [100, 0], [100, 100]],
                "backtrack": true
            },
            "guard": {
                "behavior": "orbiting",
                "steering": { "steering_force": 6.0, "max_velocity": 150.0 },
                "orbital_radius": 80.0,
                "orbital_node_num": 12
            },
            "hunter": {
                "behavior": "chase",
                "steering": {
                    "steering_force": 8.0,
                    "max_velocity": 200.0,
                    "approach_distance": 50.0,
                    "halt_distance": 5.0
                },
                "mode": "pursue"
            }
        }
    }"#;

    #[test]
    fn parses_all_profiles() {
        let config = SteeringConfig::from_json_str(PROFILES).unwrap();

        assert_eq!(config.profiles.len(), 3);

        let Some(BehaviorProfile::PathFollowing(patrol)) = config.get("patrol") else {
            panic!("patrol is not a path following profile");
        };
        let follower = PathFollower::try_from(patrol).unwrap();
        assert!(follower.backtrack);
        assert!(!follower.rest);
        assert_eq!(follower.leeway_distance, DEFAULT_PATH_LEEWAY);
        assert_eq!(follower.waypoints()[2], Vec2::new(100.0, 100.0));

        let Some(BehaviorProfile::Orbiting(guard)) = config.get("guard") else {
            panic!("guard is not an orbiting profile");
        };
        let orbit = OrbitController::try_from(guard).unwrap();
        assert_eq!(orbit.angle_segment(), 30);
        assert_eq!(orbit.leeway_distance, DEFAULT_ORBIT_LEEWAY);
        assert_eq!(orbit.node_rotation_degree, 0.0);

        let Some(BehaviorProfile::Chase(hunter)) = config.get("hunter") else {
            panic!("hunter is not a chase profile");
        };
        assert_eq!(hunter.mode, ChaseMode::Pursue);
        let core = SteeringCore::from(hunter.steering);
        assert_eq!(core.approach_distance, 50.0);
        assert_eq!(core.halt_distance, 5.0);
    }

    #[test]
    fn rejects_malformed_waypoint() {
        let json = r#"{ "profiles": { "bad": {
            "behavior": "path_following",
            "steering": { "steering_force": 1.0, "max_velocity": 1.0 },
            "waypoints": [[0, 0], [1, 2, 3]]
        } } }"#;

        let err = SteeringConfig::from_json_str(json).unwrap_err();

        match err {
            ConfigLoaderError::Steering { name, source } => {
                assert_eq!(name, "bad");
                assert_eq!(
                    source,
                    SteeringError::Configuration(ConfigurationError::MalformedWaypoint {
                        index: 1,
                        arity: 3
                    })
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_radius_without_nodes() {
        let json = r#"{ "profiles": { "bad": {
            "behavior": "orbiting",
            "steering": { "steering_force": 1.0, "max_velocity": 1.0 },
            "orbital_radius": 10.0
        } } }"#;

        let err = SteeringConfig::from_json_str(json).unwrap_err();

        assert!(matches!(err, ConfigLoaderError::Steering { .. }));
    }

    #[test]
    fn rejects_unknown_behavior() {
        let json = r#"{ "profiles": { "bad": { "behavior": "wander" } } }"#;

        let err = SteeringConfig::from_json_str(json).unwrap_err();

        assert!(matches!(err, ConfigLoaderError::JsonError(_)));
    }
}
