use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SteeringError {
    #[error("invalid steering configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("steering state cannot advance: {0}")]
    DegenerateState(#[from] DegenerateStateError),
}

/// Raised at construction time, before any state is created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("expecting both orbital_radius and orbital_node_num, got {radius} and {node_num}")]
    MissingOrbitParameter { radius: f32, node_num: u32 },
    #[error("orbit cannot have more than 360 nodes, got {0}")]
    TooManyOrbitNodes(u32),
    #[error("waypoint {index} must be an (x, y) pair, got {arity} values")]
    MalformedWaypoint { index: usize, arity: usize },
    #[error("path requires at least one waypoint")]
    NoWaypoints,
}

/// Raised by `update` when the stored trajectory has nowhere to go.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DegenerateStateError {
    #[error("at least two waypoints required to advance a path, have {len}")]
    TooFewWaypoints { len: usize },
    #[error("no orbit configured, orbital_node_num is 0")]
    NoOrbitNodes,
}
