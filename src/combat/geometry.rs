//! Polygon helpers for melee hit detection.
//!
//! Polygons are ordered point lists in display space. They may be convex or
//! not; the intersection test only assumes simple (non self-crossing) shapes.

use bevy::prelude::*;

/// Rotate every point of `local` by `rotation` radians, then translate.
pub fn transform_polygon(local: &[Vec2], rotation: f32, translation: Vec2) -> Vec<Vec2> {
    let rot = Vec2::from_angle(rotation);
    local.iter().map(|p| rot.rotate(*p) + translation).collect()
}

/// The four corners of a rectangle, clockwise from the top-left.
pub fn rect_polygon(rect: Rect) -> [Vec2; 4] {
    [
        rect.min,
        Vec2::new(rect.max.x, rect.min.y),
        rect.max,
        Vec2::new(rect.min.x, rect.max.y),
    ]
}

fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a - o).perp_dot(b - o)
}

fn on_segment(p: Vec2, a: Vec2, b: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Closed segment intersection, touching endpoints included.
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(a1, b1, b2))
        || (d2 == 0.0 && on_segment(a2, b1, b2))
        || (d3 == 0.0 && on_segment(b1, a1, a2))
        || (d4 == 0.0 && on_segment(b2, a1, a2))
}

/// Even-odd ray cast.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn edges(polygon: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(a, b)| (*a, *b))
}

/// True if the two polygons overlap or touch.
pub fn polygons_intersect(a: &[Vec2], b: &[Vec2]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }

    for (a1, a2) in edges(a) {
        for (b1, b2) in edges(b) {
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }

    // No crossing edges: either one contains the other or they are apart.
    point_in_polygon(a[0], b) || point_in_polygon(b[0], a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn square(min: Vec2, size: f32) -> [Vec2; 4] {
        rect_polygon(Rect::from_corners(min, min + Vec2::splat(size)))
    }

    #[test]
    fn rotation_then_translation() {
        let points = transform_polygon(&[Vec2::new(10.0, 0.0)], FRAC_PI_2, Vec2::new(5.0, 5.0));
        approx::assert_abs_diff_eq!(points[0].x, 5.0, epsilon = 1e-4);
        approx::assert_abs_diff_eq!(points[0].y, 15.0, epsilon = 1e-4);
    }

    #[test]
    fn overlapping_squares_intersect() {
        assert!(polygons_intersect(&square(Vec2::ZERO, 10.0), &square(Vec2::splat(5.0), 10.0)));
    }

    #[test]
    fn separated_squares_do_not() {
        assert!(!polygons_intersect(&square(Vec2::ZERO, 10.0), &square(Vec2::splat(20.0), 5.0)));
    }

    #[test]
    fn containment_counts() {
        let outer = square(Vec2::ZERO, 100.0);
        let inner = square(Vec2::splat(40.0), 5.0);
        assert!(polygons_intersect(&outer, &inner));
        assert!(polygons_intersect(&inner, &outer));
    }

    #[test]
    fn thin_blade_across_box() {
        let blade = [
            Vec2::new(-50.0, -1.0),
            Vec2::new(50.0, -1.0),
            Vec2::new(50.0, 1.0),
            Vec2::new(-50.0, 1.0),
        ];
        let target = square(Vec2::new(-5.0, -5.0), 10.0);
        assert!(polygons_intersect(&blade, &target));
    }

    #[test]
    fn empty_polygon_never_hits() {
        assert!(!polygons_intersect(&[], &square(Vec2::ZERO, 1.0)));
    }
}
