//! Collision detection and response on the rectangular pitch
//!
//! Ball against the walls of the total rectangle (goal mouths stay open),
//! and agent bodies against each other.

use glam::Vec2;

use super::field::{Boundary, FieldState};

/// A wall the ball has passed through this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    pub boundary: Boundary,
    /// Wall normal pointing back into the field
    pub normal: Vec2,
    /// Position clamped onto the wall
    pub clamped: Vec2,
}

/// Reflect velocity off a surface with the given normal
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Walls crossed by a ball at `pos`: at most one per axis.
///
/// The left and right walls are open within a goal mouth's y range.
pub fn ball_wall_contacts(pos: Vec2, field: &FieldState) -> [Option<WallContact>; 2] {
    let x_contact = if pos.x < 0.0 && !field.left_goal.contains_y(pos.y) {
        Some(WallContact {
            boundary: Boundary::Left,
            normal: Vec2::X,
            clamped: Vec2::new(0.0, pos.y),
        })
    } else if pos.x > field.total_width && !field.right_goal.contains_y(pos.y) {
        Some(WallContact {
            boundary: Boundary::Right,
            normal: Vec2::NEG_X,
            clamped: Vec2::new(field.total_width, pos.y),
        })
    } else {
        None
    };

    let y_contact = if pos.y < 0.0 {
        Some(WallContact {
            boundary: Boundary::Top,
            normal: Vec2::Y,
            clamped: Vec2::new(pos.x, 0.0),
        })
    } else if pos.y > field.total_height {
        Some(WallContact {
            boundary: Boundary::Bottom,
            normal: Vec2::NEG_Y,
            clamped: Vec2::new(pos.x, field.total_height),
        })
    } else {
        None
    };

    [x_contact, y_contact]
}

/// Push `pos` out of a body at `other` so centers are at least `min_dist` apart.
///
/// Returns `None` when there is no overlap, or when the centers coincide and
/// no separation direction exists.
pub fn separate_bodies(pos: Vec2, other: Vec2, min_dist: f32) -> Option<Vec2> {
    let offset = pos - other;
    let dist = offset.length();
    if dist >= min_dist {
        return None;
    }
    if dist < f32::EPSILON {
        log::trace!("coincident bodies at ({}, {}); skipping separation", pos.x, pos.y);
        return None;
    }
    Some(other + offset / dist * min_dist)
}
