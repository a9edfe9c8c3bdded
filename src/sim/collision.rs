//! Collision detection and response against axis-aligned walls
//!
//! Walls are rectangles in screen space. The struck face is estimated from
//! the two rectangle corners closest to the projectile: the edge between them
//! is taken as the face. Faces shared with a neighbouring wall cell cannot be
//! struck, so when the estimate lands on one the shallowest open face among
//! all overlapped walls is used instead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, `min` inclusive and `max` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Square of half-extent `half` around `center`
    pub fn around(center: Vec2, half: f32) -> Self {
        Self {
            min: center - Vec2::splat(half),
            max: center + Vec2::splat(half),
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Point test (left/top edges inside, right/bottom edges outside)
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Strict overlap; rectangles that only share an edge do not intersect
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Corners in order: top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }
}

/// One side of a wall rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Top,
    Right,
    Bottom,
    Left,
}

impl Face {
    pub const ALL: [Face; 4] = [Face::Top, Face::Right, Face::Bottom, Face::Left];

    /// Outward unit normal (y points down)
    pub fn normal(self) -> Vec2 {
        match self {
            Face::Top => Vec2::new(0.0, -1.0),
            Face::Right => Vec2::new(1.0, 0.0),
            Face::Bottom => Vec2::new(0.0, 1.0),
            Face::Left => Vec2::new(-1.0, 0.0),
        }
    }

    /// Neighbouring cell offset as (column, row)
    pub fn offset(self) -> (isize, isize) {
        match self {
            Face::Top => (0, -1),
            Face::Right => (1, 0),
            Face::Bottom => (0, 1),
            Face::Left => (-1, 0),
        }
    }

    /// How far `bounds` reaches into `wall` through this face
    pub fn depth(self, wall: &Rect, bounds: &Rect) -> f32 {
        match self {
            Face::Top => bounds.max.y - wall.min.y,
            Face::Right => wall.max.x - bounds.min.x,
            Face::Bottom => wall.max.y - bounds.min.y,
            Face::Left => bounds.max.x - wall.min.x,
        }
    }
}

/// Where a projectile touches the walls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Index of the struck wall
    pub wall: usize,
    pub face: Face,
    /// Distance to move along the face normal to clear the wall
    pub depth: f32,
}

impl Contact {
    pub fn normal(&self) -> Vec2 {
        self.face.normal()
    }
}

/// Index of the first wall overlapping `bounds`
pub fn first_hit(walls: &[Rect], bounds: &Rect) -> Option<usize> {
    walls.iter().position(|w| w.intersects(bounds))
}

/// The two corners of `rect` nearest to `p`, nearest first
///
/// Ties keep corner order (top-left, top-right, bottom-right, bottom-left).
pub fn closest_corners(rect: &Rect, p: Vec2) -> (Vec2, Vec2) {
    let mut corners = rect.corners();
    corners.sort_by(|a, b| a.distance_squared(p).total_cmp(&b.distance_squared(p)));
    (corners[0], corners[1])
}

/// The face spanned by the two corners closest to `p`
///
/// When the two corners are diagonal (only on exact ties) the face is picked
/// from the side of the centre `p` lies on.
pub fn corner_face(rect: &Rect, p: Vec2) -> Face {
    let (a, b) = closest_corners(rect, p);
    if a.y == b.y {
        if a.y == rect.min.y { Face::Top } else { Face::Bottom }
    } else if a.x == b.x {
        if a.x == rect.min.x { Face::Left } else { Face::Right }
    } else {
        let d = p - rect.center();
        match (d.x.abs() >= d.y.abs(), d.x >= 0.0, d.y >= 0.0) {
            (true, true, _) => Face::Right,
            (true, false, _) => Face::Left,
            (false, _, true) => Face::Bottom,
            (false, _, false) => Face::Top,
        }
    }
}

/// Pick the struck wall and face for a projectile at `pos` with `bounds`
///
/// `open(wall, face)` tells whether a face borders free space. The corner
/// estimate on the first overlapped wall wins when its face is open;
/// otherwise the open face with the smallest depth across every overlapped
/// wall is used. With no open face at all the corner estimate stands.
pub fn find_contact<F>(walls: &[Rect], bounds: &Rect, pos: Vec2, open: F) -> Option<Contact>
where
    F: Fn(usize, Face) -> bool,
{
    let first = first_hit(walls, bounds)?;
    let estimate = corner_face(&walls[first], pos);
    let contact = |wall: usize, face: Face| Contact {
        wall,
        face,
        depth: face.depth(&walls[wall], bounds),
    };
    if open(first, estimate) {
        return Some(contact(first, estimate));
    }

    let shallowest = walls
        .iter()
        .enumerate()
        .skip(first)
        .filter(|(_, w)| w.intersects(bounds))
        .flat_map(|(i, _)| Face::ALL.into_iter().map(move |f| (i, f)))
        .filter(|&(i, f)| open(i, f))
        .map(|(i, f)| contact(i, f))
        .min_by(|a, b| a.depth.total_cmp(&b.depth));

    Some(shallowest.unwrap_or_else(|| contact(first, estimate)))
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Reflect and damp by the coefficient of restitution
#[inline]
pub fn bounce(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    reflect_velocity(velocity, normal) * restitution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> Rect {
        Rect::new(Vec2::new(100.0, 100.0), Vec2::new(20.0, 20.0))
    }

    #[test]
    fn test_contains_point_half_open() {
        let r = Rect::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert!(r.contains_point(Vec2::new(0.0, 0.0)));
        assert!(r.contains_point(Vec2::new(9.99, 9.99)));
        assert!(!r.contains_point(Vec2::new(10.0, 5.0)));
        assert!(!r.contains_point(Vec2::new(5.0, -0.1)));
    }

    #[test]
    fn test_intersects() {
        let r = wall();
        assert!(r.intersects(&Rect::around(Vec2::new(101.0, 101.0), 3.0)));
        assert!(!r.intersects(&Rect::around(Vec2::new(90.0, 90.0), 3.0)));
        // Touching edges only
        assert!(!r.intersects(&Rect::new(Vec2::new(120.0, 100.0), Vec2::splat(5.0))));
    }

    #[test]
    fn test_first_hit() {
        let walls = [wall(), Rect::new(Vec2::ZERO, Vec2::splat(10.0))];
        assert_eq!(first_hit(&walls, &Rect::around(Vec2::new(5.0, 5.0), 1.0)), Some(1));
        assert_eq!(first_hit(&walls, &Rect::around(Vec2::new(50.0, 50.0), 1.0)), None);
    }

    #[test]
    fn test_top_face_normal() {
        // Just inside the top edge, near the middle
        let face = corner_face(&wall(), Vec2::new(108.0, 101.0));
        assert_eq!(face, Face::Top);
        assert_eq!(face.normal(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_side_face_normals() {
        assert_eq!(corner_face(&wall(), Vec2::new(101.0, 112.0)), Face::Left);
        assert_eq!(corner_face(&wall(), Vec2::new(119.0, 108.0)), Face::Right);
        assert_eq!(corner_face(&wall(), Vec2::new(110.0, 119.5)), Face::Bottom);
    }

    #[test]
    fn test_face_depth() {
        let bounds = Rect::around(Vec2::new(101.0, 110.0), 3.0);
        assert_eq!(Face::Left.depth(&wall(), &bounds), 4.0);
        assert_eq!(Face::Right.depth(&wall(), &bounds), 22.0);
    }

    #[test]
    fn test_contact_skips_shared_face() {
        // Two stacked cells of a vertical wall, hit from the left right at
        // the seam: the corner estimate lands on the shared edge
        let walls = [
            Rect::new(Vec2::new(100.0, 80.0), Vec2::splat(20.0)),
            Rect::new(Vec2::new(100.0, 100.0), Vec2::splat(20.0)),
        ];
        let pos = Vec2::new(102.0, 99.0);
        let bounds = Rect::around(pos, 3.0);
        assert_eq!(corner_face(&walls[0], pos), Face::Bottom);

        let open = |i: usize, f: Face| match (i, f) {
            (0, Face::Bottom) | (1, Face::Top) => false,
            (_, Face::Left) => true,
            _ => false,
        };
        let contact = find_contact(&walls, &bounds, pos, open).unwrap();
        assert_eq!(contact.face, Face::Left);
        assert_eq!(contact.normal(), Vec2::new(-1.0, 0.0));
        assert_eq!(contact.depth, 5.0);
    }

    #[test]
    fn test_contact_prefers_open_corner_estimate() {
        let walls = [wall()];
        let pos = Vec2::new(108.0, 101.0);
        let contact = find_contact(&walls, &Rect::around(pos, 3.0), pos, |_, _| true).unwrap();
        assert_eq!(contact.wall, 0);
        assert_eq!(contact.face, Face::Top);
        assert_eq!(contact.depth, 4.0);

        let far = Vec2::new(50.0, 50.0);
        assert_eq!(find_contact(&walls, &Rect::around(far, 3.0), far, |_, _| true), None);
    }

    #[test]
    fn test_reflect_velocity() {
        // Moving right, hits vertical wall (normal pointing left)
        let reflected = reflect_velocity(Vec2::new(100.0, 0.0), Vec2::new(-1.0, 0.0));
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_bounce_on_floor_with_restitution() {
        let out = bounce(Vec2::new(3.0, 4.0), Vec2::new(0.0, -1.0), 0.45);
        assert!((out.y - (-1.8)).abs() < 1e-5);
        assert!((out.x - 1.35).abs() < 1e-5);
    }
}
