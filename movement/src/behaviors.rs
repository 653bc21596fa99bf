use bevy::prelude::*;
use common::math::truncate_vec2;
use serde::{Deserialize, Serialize};

use crate::SteeringTarget;

/// Base steering math shared by every behavior.
///
/// Keeps the direction and distance to the most recent target so that
/// stateful behaviors can inspect them on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct SteeringCore {
    /// Maximum magnitude of a single turning force. Lower values make the
    /// movement smoother but slower to react.
    pub steering_force: f32,
    /// Cruising speed the host is steered towards.
    pub max_velocity: f32,
    /// Below this distance the desired velocity is zeroed.
    pub halt_distance: f32,
    /// Below this distance the desired velocity shrinks linearly with the
    /// distance left. Should not be smaller than `halt_distance`.
    pub approach_distance: f32,
    desired_distance: f32,
    desired: Vec2,
}

impl Default for SteeringCore {
    fn default() -> Self {
        Self::new(150.0, 250.0)
    }
}

impl SteeringCore {
    pub fn new(steering_force: f32, max_velocity: f32) -> Self {
        Self {
            steering_force,
            max_velocity,
            halt_distance: 0.0,
            approach_distance: 0.0,
            desired_distance: f32::INFINITY,
            desired: Vec2::ZERO,
        }
    }

    pub fn with_halt_distance(mut self, halt_distance: f32) -> Self {
        self.halt_distance = halt_distance;
        self
    }

    pub fn with_approach_distance(mut self, approach_distance: f32) -> Self {
        self.approach_distance = approach_distance;
        self
    }

    /// Distance to the last target. `f32::INFINITY` until the first call to
    /// [`SteeringCore::calculate_desired_vector`].
    pub fn desired_distance(&self) -> f32 {
        self.desired_distance
    }

    /// Direction to the last target, possibly scaled down by `seek` or `approach`.
    pub fn desired(&self) -> Vec2 {
        self.desired
    }

    /// Stores the unit direction and the distance from `origin_pos` to `target_pos`.
    /// The direction is zero when both points coincide.
    pub fn calculate_desired_vector(&mut self, origin_pos: Vec2, target_pos: Vec2) {
        let dv = target_pos - origin_pos;
        self.desired_distance = dv.length();
        self.desired = dv.normalize_or_zero();
    }

    /// Difference between the desired velocity and `origin_vel`, clamped to
    /// `steering_force`. Zero once the host already moves as desired.
    pub fn calculate_turning_force(&self, origin_vel: Vec2) -> Vec2 {
        let difference = self.desired * self.max_velocity - origin_vel;
        truncate_vec2(difference, self.steering_force)
    }

    /// Moves directly towards the target, stopping inside `halt_distance`.
    pub fn seek(&mut self, origin_pos: Vec2, origin_vel: Vec2, target_pos: Vec2) -> Vec2 {
        self.calculate_desired_vector(origin_pos, target_pos);
        if self.desired_distance < self.halt_distance {
            self.desired = Vec2::ZERO;
        }

        self.calculate_turning_force(origin_vel)
    }

    /// Moves towards the target, slowing down linearly once inside
    /// `approach_distance` and stopping inside `halt_distance`.
    pub fn approach(&mut self, origin_pos: Vec2, origin_vel: Vec2, target_pos: Vec2) -> Vec2 {
        self.calculate_desired_vector(origin_pos, target_pos);
        if self.desired_distance < self.approach_distance {
            if self.desired_distance > self.halt_distance {
                self.desired *= self.desired_distance / self.approach_distance;
            } else {
                self.desired = Vec2::ZERO;
            }
        }

        self.calculate_turning_force(origin_vel)
    }

    /// Seeks the position the target will have one tick ahead.
    pub fn pursue(
        &mut self,
        origin_pos: Vec2,
        origin_vel: Vec2,
        target_pos: Vec2,
        target_vel: Vec2,
    ) -> Vec2 {
        self.seek(origin_pos, origin_vel, target_pos + target_vel)
    }

    /// Flees from the position the target will have one tick ahead.
    /// Works the same way as `pursue` but the result vector is inverted.
    pub fn evade(
        &mut self,
        origin_pos: Vec2,
        origin_vel: Vec2,
        target_pos: Vec2,
        target_vel: Vec2,
    ) -> Vec2 {
        -self.pursue(origin_pos, origin_vel, target_pos, target_vel)
    }
}

/// Shared contract of every steering behavior. Implementors own a
/// [`SteeringCore`] and get the four primitives by delegation.
pub trait Steering {
    fn core(&self) -> &SteeringCore;
    fn core_mut(&mut self) -> &mut SteeringCore;

    fn seek(&mut self, origin_pos: Vec2, origin_vel: Vec2, target_pos: Vec2) -> Vec2 {
        self.core_mut().seek(origin_pos, origin_vel, target_pos)
    }

    fn approach(&mut self, origin_pos: Vec2, origin_vel: Vec2, target_pos: Vec2) -> Vec2 {
        self.core_mut().approach(origin_pos, origin_vel, target_pos)
    }

    fn pursue(
        &mut self,
        origin_pos: Vec2,
        origin_vel: Vec2,
        target_pos: Vec2,
        target_vel: Vec2,
    ) -> Vec2 {
        self.core_mut()
            .pursue(origin_pos, origin_vel, target_pos, target_vel)
    }

    fn evade(
        &mut self,
        origin_pos: Vec2,
        origin_vel: Vec2,
        target_pos: Vec2,
        target_vel: Vec2,
    ) -> Vec2 {
        self.core_mut()
            .evade(origin_pos, origin_vel, target_pos, target_vel)
    }
}

impl Steering for SteeringCore {
    fn core(&self) -> &SteeringCore {
        self
    }

    fn core_mut(&mut self) -> &mut SteeringCore {
        self
    }
}

/// Selects which primitive is run against a [`SteeringTarget`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChaseMode {
    #[default]
    Seek,
    Approach,
    Pursue,
    Evade,
}

impl ChaseMode {
    pub fn steer(
        &self,
        steering: &mut impl Steering,
        origin_pos: Vec2,
        origin_vel: Vec2,
        target: &impl SteeringTarget,
    ) -> Vec2 {
        match self {
            ChaseMode::Seek => steering.seek(origin_pos, origin_vel, target.position()),
            ChaseMode::Approach => steering.approach(origin_pos, origin_vel, target.position()),
            ChaseMode::Pursue => {
                steering.pursue(origin_pos, origin_vel, target.position(), target.velocity())
            }
            ChaseMode::Evade => {
                steering.evade(origin_pos, origin_vel, target.position(), target.velocity())
            }
        }
    }
}
