use bevy::prelude::*;
use rand::Rng;

/// Clamps `vec2` to a length of at most `max`, keeping its direction.
pub fn truncate_vec2(vec2: Vec2, max: f32) -> Vec2 {
    if vec2.length() > max {
        let vec2 = vec2.normalize_or_zero();
        return vec2 * max;
    }

    vec2
}

/// Returns the index of the point closest to `position`.
/// On ties the first point in iteration order wins.
pub fn nearest_index<'a, I>(points: I, position: Vec2) -> Option<usize>
where
    I: IntoIterator<Item = &'a Vec2>,
{
    let mut closest = None;
    let mut distance = f32::MAX;

    for (i, point) in points.into_iter().enumerate() {
        let d = (*point - position).length();
        if closest.is_none() || d < distance {
            distance = d;
            closest = Some(i);
        }
    }

    closest
}

pub fn rng_f32(min: f32, max: f32) -> f32 {
    rand::thread_rng().gen_range(min..max)
}
