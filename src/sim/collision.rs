//! Collision detection
//!
//! Everything here is axis-aligned boxes. Overlap tests are strict, so
//! touching edges do not count as a hit.

use glam::Vec2;

use super::state::{Avatar, Obstacle};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square box from its top-left corner
    pub fn from_corner(corner: Vec2, size: f32) -> Self {
        Self::new(corner, corner + Vec2::splat(size))
    }

    /// Square box from its center
    pub fn from_center(center: Vec2, size: f32) -> Self {
        let half = Vec2::splat(size / 2.0);
        Self::new(center - half, center + half)
    }

    /// Inset every edge by `margin`
    pub fn shrink(&self, margin: f32) -> Self {
        Self::new(self.min + Vec2::splat(margin), self.max - Vec2::splat(margin))
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Which edge of the playfield was left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryHit {
    Ground,
    Ceiling,
}

pub fn avatar_box(avatar: &Avatar) -> Aabb {
    Aabb::from_corner(avatar.pos, avatar.hitbox_size())
}

/// Avatar against a square pickup centered at `center`
pub fn avatar_hits_pickup(avatar: &Avatar, center: Vec2, size: f32) -> bool {
    avatar_box(avatar).overlaps(&Aabb::from_center(center, size))
}

/// Top and bottom segments of an obstacle
///
/// The segments extend without bound vertically so an avatar above the
/// ceiling or below the floor inside the obstacle's column still hits.
pub fn obstacle_boxes(obstacle: &Obstacle) -> [Aabb; 2] {
    let left = obstacle.x;
    let right = obstacle.trailing_edge();
    [
        Aabb::new(
            Vec2::new(left, f32::NEG_INFINITY),
            Vec2::new(right, obstacle.top_height),
        ),
        Aabb::new(
            Vec2::new(left, obstacle.bottom_y),
            Vec2::new(right, f32::INFINITY),
        ),
    ]
}

/// Avatar against both segments, with the avatar box inset by `margin`
pub fn avatar_hits_obstacle(avatar: &Avatar, obstacle: &Obstacle, margin: f32) -> bool {
    let body = avatar_box(avatar).shrink(margin);
    obstacle_boxes(obstacle).iter().any(|segment| body.overlaps(segment))
}

/// Whether the avatar is clearly outside the playfield
///
/// Touching the floor or ceiling is fine; the avatar must be more than
/// `slack` pixels past it.
pub fn boundary_violation(avatar: &Avatar, canvas_height: f32, slack: f32) -> Option<BoundaryHit> {
    let ground = canvas_height - avatar.hitbox_size();
    if avatar.pos.y > ground + slack {
        Some(BoundaryHit::Ground)
    } else if avatar.pos.y < -slack {
        Some(BoundaryHit::Ceiling)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BOUNDARY_SLACK, COLLISION_MARGIN};

    fn avatar_at(x: f32, y: f32) -> Avatar {
        Avatar {
            pos: Vec2::new(x, y),
            ..Default::default()
        }
    }

    fn obstacle_at(x: f32) -> Obstacle {
        Obstacle {
            id: 1,
            x,
            top_height: 200.0,
            bottom_y: 400.0,
            width: 50.0,
            gap: 200.0,
            passed: false,
        }
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let a = Aabb::from_corner(Vec2::ZERO, 10.0);
        let b = Aabb::from_corner(Vec2::new(10.0, 0.0), 10.0);
        assert!(!a.overlaps(&b));
        let c = Aabb::from_corner(Vec2::new(9.9, 0.0), 10.0);
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_pickup_hit_uses_center() {
        let avatar = avatar_at(100.0, 100.0);
        // Pickup half-size 12 reaches back to x = 108
        assert!(avatar_hits_pickup(&avatar, Vec2::new(130.0, 110.0), 24.0));
        assert!(!avatar_hits_pickup(&avatar, Vec2::new(132.0, 110.0), 24.0));
    }

    #[test]
    fn test_inside_gap_is_safe() {
        let avatar = avatar_at(120.0, 290.0);
        assert!(!avatar_hits_obstacle(&avatar, &obstacle_at(100.0), COLLISION_MARGIN));
    }

    #[test]
    fn test_margin_forgives_grazing_top_segment() {
        // Top of avatar 1px into the top segment
        let avatar = avatar_at(120.0, 199.0);
        assert!(!avatar_hits_obstacle(&avatar, &obstacle_at(100.0), COLLISION_MARGIN));
        assert!(avatar_hits_obstacle(&avatar, &obstacle_at(100.0), 0.0));
        let deeper = avatar_at(120.0, 197.0);
        assert!(avatar_hits_obstacle(&deeper, &obstacle_at(100.0), COLLISION_MARGIN));
    }

    #[test]
    fn test_bottom_segment_hit() {
        let avatar = avatar_at(120.0, 390.0);
        assert!(avatar_hits_obstacle(&avatar, &obstacle_at(100.0), COLLISION_MARGIN));
    }

    #[test]
    fn test_above_canvas_in_column_hits() {
        let avatar = avatar_at(120.0, -40.0);
        assert!(avatar_hits_obstacle(&avatar, &obstacle_at(100.0), COLLISION_MARGIN));
    }

    #[test]
    fn test_boundary_needs_slack() {
        // Ground limit: 600 - 20 + 20 = 600
        assert_eq!(boundary_violation(&avatar_at(100.0, 590.0), 600.0, BOUNDARY_SLACK), None);
        assert_eq!(boundary_violation(&avatar_at(100.0, 600.0), 600.0, BOUNDARY_SLACK), None);
        assert_eq!(
            boundary_violation(&avatar_at(100.0, 600.5), 600.0, BOUNDARY_SLACK),
            Some(BoundaryHit::Ground)
        );
        assert_eq!(boundary_violation(&avatar_at(100.0, -20.0), 600.0, BOUNDARY_SLACK), None);
        assert_eq!(
            boundary_violation(&avatar_at(100.0, -20.5), 600.0, BOUNDARY_SLACK),
            Some(BoundaryHit::Ceiling)
        );
    }
}
