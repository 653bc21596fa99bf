use bevy::prelude::*;
use common::math::nearest_index;

use crate::{
    behaviors::{Steering, SteeringCore},
    error::{ConfigurationError, DegenerateStateError, SteeringError},
};

pub const DEFAULT_ORBIT_LEEWAY: f32 = 100.0;

/// Why the orbit nodes were (or are about to be) regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum RecalcReason {
    /// No nodes were generated yet.
    Initial,
    /// The orbited target is not where the nodes were built around.
    TargetMoved,
    /// `orbital_node_num` or `orbital_radius` was changed.
    ConfigChanged,
}

/// Circles a (possibly moving) target by cycling through nodes placed evenly
/// on a circle around it.
///
/// Nodes are rebuilt whenever the target moves. A host drifting further than
/// `leeway_distance + orbital_radius` from its node re-enters the orbit at the
/// node following the one nearest to it.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
pub struct OrbitController {
    core: SteeringCore,
    orbital_radius: f32,
    orbital_node_num: u32,
    /// Added to both coordinates of every node.
    pub node_rotation_degree: f32,
    pub leeway_distance: f32,
    waypoints: Vec<Vec2>,
    angle_segment: u32,
    previous_target_position: Option<Vec2>,
    current_node_index: usize,
    current_trajectory: Option<Vec2>,
    config_changed: bool,
    last_recalc: Option<RecalcReason>,
}

impl OrbitController {
    /// Both `orbital_radius` and `orbital_node_num` must be set, or both be
    /// zero for a controller without an orbit.
    pub fn new(
        core: SteeringCore,
        orbital_radius: f32,
        orbital_node_num: u32,
    ) -> Result<Self, SteeringError> {
        validate_orbit(orbital_radius, orbital_node_num)?;

        Ok(Self {
            core,
            orbital_radius,
            orbital_node_num,
            node_rotation_degree: 0.0,
            leeway_distance: DEFAULT_ORBIT_LEEWAY,
            waypoints: Vec::with_capacity(orbital_node_num as usize),
            angle_segment: angle_segment(orbital_node_num),
            previous_target_position: None,
            current_node_index: 0,
            current_trajectory: None,
            config_changed: false,
            last_recalc: None,
        })
    }

    pub fn with_node_rotation_degree(mut self, node_rotation_degree: f32) -> Self {
        self.node_rotation_degree = node_rotation_degree;
        self
    }

    pub fn with_leeway_distance(mut self, leeway_distance: f32) -> Self {
        self.leeway_distance = leeway_distance;
        self
    }

    pub fn orbital_radius(&self) -> f32 {
        self.orbital_radius
    }

    pub fn orbital_node_num(&self) -> u32 {
        self.orbital_node_num
    }

    /// Degrees between two consecutive nodes, `360 / orbital_node_num` rounded down.
    pub fn angle_segment(&self) -> u32 {
        self.angle_segment
    }

    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    pub fn current_node_index(&self) -> usize {
        self.current_node_index
    }

    pub fn current_trajectory(&self) -> Option<Vec2> {
        self.current_trajectory
    }

    pub fn last_recalc(&self) -> Option<RecalcReason> {
        self.last_recalc
    }

    pub fn set_orbital_node_num(&mut self, orbital_node_num: u32) -> Result<(), SteeringError> {
        self.set_orbit(self.orbital_radius, orbital_node_num)
    }

    pub fn set_orbital_radius(&mut self, orbital_radius: f32) -> Result<(), SteeringError> {
        self.set_orbit(orbital_radius, self.orbital_node_num)
    }

    /// Replaces radius and node count together. The only way in or out of
    /// an empty orbit, since either half alone is rejected.
    pub fn set_orbit(
        &mut self,
        orbital_radius: f32,
        orbital_node_num: u32,
    ) -> Result<(), SteeringError> {
        validate_orbit(orbital_radius, orbital_node_num)?;

        self.orbital_radius = orbital_radius;
        self.orbital_node_num = orbital_node_num;
        self.angle_segment = angle_segment(orbital_node_num);
        self.config_changed = true;
        Ok(())
    }

    /// Reports whether the next `update` around `target_pos` rebuilds the nodes.
    pub fn pending_recalc(&self, target_pos: Vec2) -> Option<RecalcReason> {
        if self.config_changed {
            return Some(RecalcReason::ConfigChanged);
        }

        match self.previous_target_position {
            None => Some(RecalcReason::Initial),
            Some(previous) if previous != target_pos => Some(RecalcReason::TargetMoved),
            Some(_) => None,
        }
    }

    /// Returns the steering force for this tick, already scaled by `dt`.
    pub fn update(
        &mut self,
        origin_pos: Vec2,
        origin_vel: Vec2,
        target_pos: Vec2,
        dt: f32,
    ) -> Result<Vec2, SteeringError> {
        if self.orbital_node_num == 0 {
            return Err(DegenerateStateError::NoOrbitNodes.into());
        }

        if let Some(reason) = self.pending_recalc(target_pos) {
            self.previous_target_position = Some(target_pos);
            self.recalculate_trajectory(target_pos);
            self.config_changed = false;
            self.last_recalc = Some(reason);
            debug!(
                "Orbit around {} recalculated ({:?}), {} nodes",
                target_pos,
                reason,
                self.waypoints.len()
            );
        }

        self.check_trajectory(origin_pos)?;

        let trajectory = self.waypoints[self.current_node_index];
        self.core.calculate_desired_vector(origin_pos, trajectory);
        Ok(self.core.calculate_turning_force(origin_vel) * dt)
    }

    /// Rebuilds the nodes around `target_pos`, one every `angle_segment` degrees.
    pub fn recalculate_trajectory(&mut self, target_pos: Vec2) {
        self.waypoints.clear();
        if self.angle_segment == 0 {
            return;
        }

        let radius = self.orbital_radius;
        let offset = self.node_rotation_degree;
        let nodes = (0..360).step_by(self.angle_segment as usize).map(|angle| {
            let radian = (angle as f32).to_radians();
            let x = radian.cos() * radius + offset;
            let y = radian.sin() * radius + offset;
            target_pos + Vec2::new(x, y)
        });

        self.waypoints.extend(nodes);
    }

    /// Picks the node to head to, based on the distance measured by the previous tick.
    pub fn check_trajectory(&mut self, origin_pos: Vec2) -> Result<(), SteeringError> {
        let len = self.waypoints.len();
        if len == 0 {
            return Err(DegenerateStateError::NoOrbitNodes.into());
        }

        let distance = self.core.desired_distance();
        if distance < self.leeway_distance {
            self.current_node_index = (self.current_node_index + 1) % len;
        } else if distance > self.leeway_distance + self.orbital_radius {
            let nearest = nearest_index(&self.waypoints, origin_pos).unwrap_or_default();
            self.current_node_index = (nearest + 1) % len;
        } else {
            self.current_node_index %= len;
        }

        self.current_trajectory = Some(self.waypoints[self.current_node_index]);
        Ok(())
    }
}

impl Steering for OrbitController {
    fn core(&self) -> &SteeringCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SteeringCore {
        &mut self.core
    }
}

fn validate_orbit(orbital_radius: f32, orbital_node_num: u32) -> Result<(), ConfigurationError> {
    if (orbital_radius != 0.0) != (orbital_node_num != 0) {
        return Err(ConfigurationError::MissingOrbitParameter {
            radius: orbital_radius,
            node_num: orbital_node_num,
        });
    }

    if orbital_node_num > 360 {
        return Err(ConfigurationError::TooManyOrbitNodes(orbital_node_num));
    }

    Ok(())
}

fn angle_segment(orbital_node_num: u32) -> u32 {
    if orbital_node_num == 0 {
        0
    } else {
        360 / orbital_node_num
    }
}
