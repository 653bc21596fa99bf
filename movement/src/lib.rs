use bevy::prelude::*;

pub mod behaviors;
pub mod config;
pub mod error;
pub mod orbit;
pub mod paths;
pub mod plugin;
pub mod prelude;

pub trait SteeringTarget {
    fn position(&self) -> Vec2;
    fn velocity(&self) -> Vec2 {
        Vec2::ZERO
    }
}

impl SteeringTarget for Vec2 {
    fn position(&self) -> Vec2 {
        *self
    }
}

impl SteeringTarget for Transform {
    fn position(&self) -> Vec2 {
        self.translation.xy()
    }
}

/// A snapshot of both `position` and `velocity` of a moving target.
#[derive(Debug, Default, Clone, Copy, PartialEq, Reflect)]
pub struct TargetState {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl SteeringTarget for TargetState {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transforms_and_points_are_still_targets() {
        let transform = Transform::from_xyz(3.0, -4.0, 7.0);
        let point = Vec2::new(3.0, -4.0);

        assert_eq!(transform.position(), point);
        assert_eq!(point.position(), point);
        assert_eq!(transform.velocity(), Vec2::ZERO);
    }

    #[test]
    fn target_state_reports_velocity() {
        let state = TargetState {
            position: Vec2::ONE,
            velocity: Vec2::new(0.0, 2.0),
        };

        assert_eq!(state.velocity(), Vec2::new(0.0, 2.0));
    }
}
