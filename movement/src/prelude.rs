pub use crate::behaviors::{ChaseMode, Steering, SteeringCore};
pub use crate::config::{
    BehaviorProfile, ChaseParams, ConfigLoaderError, OrbitingParams, PathFollowingParams,
    SteeringConfig, SteeringConfigLoader, SteeringParams,
};
pub use crate::error::{ConfigurationError, DegenerateStateError, SteeringError};
pub use crate::orbit::{OrbitController, RecalcReason};
pub use crate::paths::{PathFollower, PathState};
pub use crate::plugin::{Chase, OrbitTarget, SteeringHost, SteeringPlugin, SteeringSet};
pub use crate::{SteeringTarget, TargetState};
