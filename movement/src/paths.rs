use bevy::prelude::*;

use crate::{
    behaviors::{Steering, SteeringCore},
    error::{ConfigurationError, DegenerateStateError, SteeringError},
};

pub const DEFAULT_PATH_LEEWAY: f32 = 80.0;

/// Whether a [`PathFollower`] still advances through its waypoints.
/// `Resting` is terminal: nothing moves the follower back to `Travelling`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum PathState {
    #[default]
    Travelling,
    Resting,
}

/// Walks a host through an ordered list of waypoints.
///
/// On arrival (closer than `leeway_distance`) the follower advances to the next
/// node. The advance is taken modulo `len - 1`, so the last waypoint is never
/// picked by the wrap around and paths need at least two nodes to move.
/// With `backtrack` the waypoint order is reversed every time the index wraps
/// back to 0. With `rest` the follower switches to `approach` on the node it
/// is heading to after the first full pass and stays there.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
pub struct PathFollower {
    core: SteeringCore,
    pub leeway_distance: f32,
    pub backtrack: bool,
    pub rest: bool,
    waypoints: Vec<Vec2>,
    current_node_index: usize,
    current_trajectory: Vec2,
    state: PathState,
}

impl PathFollower {
    pub fn new(
        core: SteeringCore,
        waypoints: impl IntoIterator<Item = Vec2>,
    ) -> Result<Self, SteeringError> {
        let waypoints: Vec<Vec2> = waypoints.into_iter().collect();
        let Some(&first) = waypoints.first() else {
            return Err(ConfigurationError::NoWaypoints.into());
        };

        Ok(Self {
            core,
            leeway_distance: DEFAULT_PATH_LEEWAY,
            backtrack: false,
            rest: false,
            waypoints,
            current_node_index: 0,
            current_trajectory: first,
            state: PathState::Travelling,
        })
    }

    /// Builds a follower from raw coordinate lists, rejecting any entry that
    /// is not exactly an `(x, y)` pair.
    pub fn from_coords<C: AsRef<[f32]>>(
        core: SteeringCore,
        coords: &[C],
    ) -> Result<Self, SteeringError> {
        let waypoints = coords_to_waypoints(coords)?;
        Self::new(core, waypoints)
    }

    pub fn with_leeway_distance(mut self, leeway_distance: f32) -> Self {
        self.leeway_distance = leeway_distance;
        self
    }

    pub fn with_backtrack(mut self, backtrack: bool) -> Self {
        self.backtrack = backtrack;
        self
    }

    pub fn with_rest(mut self, rest: bool) -> Self {
        self.rest = rest;
        self
    }

    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    pub fn state(&self) -> PathState {
        self.state
    }

    pub fn resting(&self) -> bool {
        self.state == PathState::Resting
    }

    pub fn current_node_index(&self) -> usize {
        self.current_node_index
    }

    pub fn current_trajectory(&self) -> Vec2 {
        self.current_trajectory
    }

    /// Appends nodes to the end of the path.
    pub fn add_node(&mut self, nodes: impl IntoIterator<Item = Vec2>) {
        self.waypoints.extend(nodes);
    }

    /// Returns the steering force for this tick, already scaled by `dt`.
    pub fn update(
        &mut self,
        origin_pos: Vec2,
        origin_vel: Vec2,
        dt: f32,
    ) -> Result<Vec2, SteeringError> {
        match self.state {
            PathState::Travelling => {
                self.check_trajectory()?;
                self.core
                    .calculate_desired_vector(origin_pos, self.current_trajectory);
                Ok(self.core.calculate_turning_force(origin_vel) * dt)
            }
            PathState::Resting => {
                Ok(self
                    .core
                    .approach(origin_pos, origin_vel, self.current_trajectory)
                    * dt)
            }
        }
    }

    /// Advances to the next node if the host arrived at the current one.
    /// Arrival is judged on the distance measured by the previous tick.
    pub fn check_trajectory(&mut self) -> Result<(), SteeringError> {
        if self.core.desired_distance() >= self.leeway_distance {
            return Ok(());
        }

        let len = self.waypoints.len();
        if len < 2 {
            return Err(DegenerateStateError::TooFewWaypoints { len }.into());
        }

        self.current_node_index = (self.current_node_index + 1) % (len - 1);
        self.current_trajectory = self.waypoints[self.current_node_index];
        debug!(
            "Path advanced to node {} at {}",
            self.current_node_index, self.current_trajectory
        );

        if self.current_node_index == 0 {
            if self.backtrack {
                self.waypoints.reverse();
                debug!("Path reversed, {} nodes", len);
            }

            if self.rest {
                self.state = PathState::Resting;
                debug!("Path finished, resting at {}", self.current_trajectory);
            }
        }

        Ok(())
    }
}

impl Steering for PathFollower {
    fn core(&self) -> &SteeringCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SteeringCore {
        &mut self.core
    }
}

pub(crate) fn coords_to_waypoints<C: AsRef<[f32]>>(
    coords: &[C],
) -> Result<Vec<Vec2>, ConfigurationError> {
    coords
        .iter()
        .enumerate()
        .map(|(index, c)| match c.as_ref() {
            &[x, y] => Ok(Vec2::new(x, y)),
            other => Err(ConfigurationError::MalformedWaypoint {
                index,
                arity: other.len(),
            }),
        })
        .collect()
}
