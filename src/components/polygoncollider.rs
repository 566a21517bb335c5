//! Convex polygon collider.
//!
//! A [`PolygonCollider`] is a set of convex shapes attached to one body, in
//! body-local coordinates. Every shape is stored as the counter-clockwise
//! convex hull of the vertices it was built from, so arbitrary vertex lists can
//! be fed in.
//!
//! Narrow-phase tests use the separating axis theorem and report the smallest
//! projected overlap as the penetration depth. Before any narrow-phase work the
//! detector places the collider in world space once ([`PlacedCollider`]) and
//! rejects pairs whose bounding boxes do not intersect.

use bevy_ecs::prelude::Component;
use glam::Vec2;
use smallvec::SmallVec;
use std::f32::consts::TAU;

/// Vertex storage for a single convex shape.
pub type Vertices = SmallVec<[Vec2; 8]>;

/// A convex polygon in body-local coordinates, wound counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexShape {
    vertices: Vertices,
}

impl ConvexShape {
    /// Build a shape from the convex hull of `points`.
    ///
    /// Returns `None` when the points do not span an area (fewer than three
    /// non-collinear points).
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let hull = convex_hull(points);
        if hull.len() < 3 {
            return None;
        }
        Some(Self { vertices: hull })
    }

    /// Regular polygon centred on the body origin with the given area.
    pub fn regular(sides: usize, area: f32) -> Self {
        let sides = sides.max(3);
        let n = sides as f32;
        let radius = (2.0 * area.max(0.0) / (n * (TAU / n).sin())).sqrt();
        let vertices = (0..sides)
            .map(|k| Vec2::from_angle(TAU * k as f32 / n) * radius)
            .collect();
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Shoelace area.
    pub fn area(&self) -> f32 {
        let n = self.vertices.len();
        let twice: f32 = (0..n)
            .map(|i| self.vertices[i].perp_dot(self.vertices[(i + 1) % n]))
            .sum();
        (twice * 0.5).abs()
    }

    /// Vertices transformed by a body at `position` rotated by `angle` radians.
    pub fn world_vertices(&self, position: Vec2, angle: f32) -> Vertices {
        let rot = Vec2::from_angle(angle);
        self.vertices
            .iter()
            .map(|v| position + rot.rotate(*v))
            .collect()
    }
}

/// Collision geometry for one structure: one or more convex shapes.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PolygonCollider {
    shapes: Vec<ConvexShape>,
}

impl PolygonCollider {
    pub fn new(shapes: Vec<ConvexShape>) -> Self {
        Self { shapes }
    }

    /// Collider made of a single axis-aligned rectangle centred on the body.
    pub fn rectangle(width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let corners = [
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ];
        Self {
            shapes: ConvexShape::from_points(&corners).into_iter().collect(),
        }
    }

    pub fn shapes(&self) -> &[ConvexShape] {
        &self.shapes
    }

    /// Total area of all shapes.
    pub fn area(&self) -> f32 {
        self.shapes.iter().map(ConvexShape::area).sum()
    }

    /// Place the collider in world space for a body pose.
    pub fn place(&self, position: Vec2, angle: f32) -> PlacedCollider {
        let shapes: Vec<Vertices> = self
            .shapes
            .iter()
            .map(|s| s.world_vertices(position, angle))
            .collect();
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for v in shapes.iter().flatten() {
            min = min.min(*v);
            max = max.max(*v);
        }
        PlacedCollider { min, max, shapes }
    }
}

/// A collider transformed into world space, with its bounding box.
#[derive(Debug, Clone)]
pub struct PlacedCollider {
    pub min: Vec2,
    pub max: Vec2,
    pub shapes: Vec<Vertices>,
}

impl PlacedCollider {
    /// AABB vs AABB overlap test.
    pub fn aabb_overlaps(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Contact distances for every pair of intersecting shapes.
    ///
    /// Distances follow the contact convention of the backend: negative values
    /// are penetrations, zero is touching.
    pub fn contacts(&self, other: &Self) -> SmallVec<[f32; 4]> {
        let mut out = SmallVec::new();
        if !self.aabb_overlaps(other) {
            return out;
        }
        for a in &self.shapes {
            for b in &other.shapes {
                if let Some(depth) = penetration_depth(a, b) {
                    out.push(-depth);
                }
            }
        }
        out
    }
}

/// Separating axis test between two convex polygons.
///
/// Returns the minimum overlap over all edge normals of both polygons, or
/// `None` when a separating axis exists.
pub fn penetration_depth(a: &[Vec2], b: &[Vec2]) -> Option<f32> {
    let mut depth = f32::INFINITY;
    for poly in [a, b] {
        let n = poly.len();
        for i in 0..n {
            let axis = (poly[(i + 1) % n] - poly[i]).perp().normalize_or_zero();
            if axis == Vec2::ZERO {
                continue;
            }
            let (min_a, max_a) = project(a, axis);
            let (min_b, max_b) = project(b, axis);
            let overlap = max_a.min(max_b) - min_a.max(min_b);
            if overlap < 0.0 {
                return None;
            }
            depth = depth.min(overlap);
        }
    }
    depth.is_finite().then_some(depth)
}

fn project(poly: &[Vec2], axis: Vec2) -> (f32, f32) {
    poly.iter()
        .map(|v| v.dot(axis))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        })
}

// Andrew's monotone chain, counter-clockwise, collinear points dropped.
fn convex_hull(points: &[Vec2]) -> Vertices {
    let mut pts: Vec<Vec2> = points.iter().copied().filter(|p| p.is_finite()).collect();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts.into_iter().collect();
    }

    let cross = |o: Vec2, a: Vec2, b: Vec2| (a - o).perp_dot(b - o);
    let mut hull: Vertices = SmallVec::new();
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_hull_drops_interior_and_collinear_points() {
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(1.0, 1.0),
        ];
        let shape = ConvexShape::from_points(&points).unwrap();
        assert_eq!(shape.vertices().len(), 4);
        assert!(approx_eq(shape.area(), 4.0));
    }

    #[test]
    fn test_degenerate_points_have_no_shape() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)];
        assert!(ConvexShape::from_points(&points).is_none());
    }

    #[test]
    fn test_regular_polygon_matches_requested_area() {
        let shape = ConvexShape::regular(8, 100.0);
        assert_eq!(shape.vertices().len(), 8);
        assert!(approx_eq(shape.area(), 100.0));
    }

    #[test]
    fn test_rectangle_area() {
        let collider = PolygonCollider::rectangle(10.0, 4.0);
        assert!(approx_eq(collider.area(), 40.0));
    }

    #[test]
    fn test_world_vertices_rotate_about_body() {
        let shape = ConvexShape::from_points(&[
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(-1.0, 0.0),
        ])
        .unwrap();
        let moved = shape.world_vertices(Vec2::new(5.0, 5.0), std::f32::consts::FRAC_PI_2);
        assert!(moved.iter().any(|v| approx_eq(v.x, 5.0) && approx_eq(v.y, 6.0)));
        assert!(moved.iter().any(|v| approx_eq(v.x, 4.0) && approx_eq(v.y, 5.0)));
    }

    #[test]
    fn test_overlapping_squares_report_penetration() {
        let a = PolygonCollider::rectangle(10.0, 10.0).place(Vec2::ZERO, 0.0);
        let b = PolygonCollider::rectangle(10.0, 10.0).place(Vec2::new(8.0, 0.0), 0.0);
        let contacts = a.contacts(&b);
        assert_eq!(contacts.len(), 1);
        assert!(approx_eq(contacts[0], -2.0));
    }

    #[test]
    fn test_separated_squares_report_nothing() {
        let a = PolygonCollider::rectangle(10.0, 10.0).place(Vec2::ZERO, 0.0);
        let b = PolygonCollider::rectangle(10.0, 10.0).place(Vec2::new(11.0, 0.0), 0.0);
        assert!(!a.aabb_overlaps(&b));
        assert!(a.contacts(&b).is_empty());
    }

    #[test]
    fn test_sat_rejects_diagonal_gap_inside_aabbs() {
        // Boxes intersect, diamonds do not.
        let diamond = ConvexShape::regular(4, 2.0);
        let a = diamond.world_vertices(Vec2::ZERO, 0.0);
        let b = diamond.world_vertices(Vec2::new(1.5, 1.5), 0.0);
        assert!(penetration_depth(&a, &b).is_none());
    }

    #[test]
    fn test_placed_bounds_cover_all_shapes() {
        let collider = PolygonCollider::new(vec![
            ConvexShape::regular(4, 2.0),
            ConvexShape::from_points(&[
                Vec2::new(3.0, 0.0),
                Vec2::new(4.0, 0.0),
                Vec2::new(4.0, 1.0),
            ])
            .unwrap(),
        ]);
        let placed = collider.place(Vec2::new(1.0, 1.0), 0.0);
        assert!(approx_eq(placed.min.x, 0.0));
        assert!(approx_eq(placed.max.x, 5.0));
        assert!(approx_eq(placed.max.y, 2.0));
    }
}
