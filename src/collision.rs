// Copyright 2017 Matthew Plant. This file is part of Kine2D.
//
// Kine2D is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Kine2D is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with Kine2D. If not, see <http://www.gnu.org/licenses/>.

//! Pure geometric tests used by the resolver and by sensors.
//!
//! Polygons are passed around as slices of global vertices. Every polygon is
//! assumed to be convex with a consistent winding; the direction of the
//! winding does not matter since responses are signed along each axis.

use std::f32;

use cgmath::{InnerSpace, Vector2, Zero};

use crate::geom::*;

/// A type that can overlap another.
///
/// Overlaps is the most simple form of discrete collision detection. Touching
/// objects do not overlap.
pub trait Overlaps<RHS: ?Sized> {
    /// Returns true if the two objects overlap and false otherwise.
    fn overlaps(&self, rhs: &RHS) -> bool;
}

impl Overlaps<Rect> for Rect {
    fn overlaps(&self, rhs: &Rect) -> bool {
        rects_collide(self, rhs, false)
    }
}

impl Overlaps<[Vector2<f32>]> for [Vector2<f32>] {
    fn overlaps(&self, rhs: &[Vector2<f32>]) -> bool {
        convex_polys_collide(self, rhs)
    }
}

/// Tests two axis aligned rectangles for overlap on both axes.
///
/// When include_grazing is false rectangles that share an edge do not collide.
/// When it is true touching rectangles are reported as colliding, which is how
/// "resting exactly on a surface" is detected.
pub fn rects_collide(r1: &Rect, r2: &Rect, include_grazing: bool) -> bool {
    if include_grazing {
        r1.left() <= r2.right()
            && r1.right() >= r2.left()
            && r1.top() <= r2.bottom()
            && r1.bottom() >= r2.top()
    } else {
        r1.left() < r2.right()
            && r1.right() > r2.left()
            && r1.top() < r2.bottom()
            && r1.bottom() > r2.top()
    }
}

/// The interval a set of points covers when projected onto an axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    pub start: f32,
    pub end: f32,
}

impl Projection {
    pub fn new(start: f32, end: f32) -> Self {
        Projection { start, end }
    }
}

impl Overlaps<Projection> for Projection {
    /// Intervals must overlap by more than COLLISION_EPSILON.
    fn overlaps(&self, rhs: &Projection) -> bool {
        self.start < rhs.end - COLLISION_EPSILON && rhs.start < self.end - COLLISION_EPSILON
    }
}

/// Projects every point onto the axis and returns the covered interval.
pub fn project(points: &[Vector2<f32>], axis: Vector2<f32>) -> Projection {
    points.iter().fold(
        Projection::new(f32::INFINITY, f32::NEG_INFINITY),
        |proj, p| {
            let d = p.dot(axis);
            Projection::new(proj.start.min(d), proj.end.max(d))
        },
    )
}

/// Returns the unit normal of the edge starting at vertex i, or None if the
/// edge has no length.
fn edge_normal(vertices: &[Vector2<f32>], i: usize) -> Option<Vector2<f32>> {
    let a = vertices[i];
    let b = vertices[(i + 1) % vertices.len()];
    let n = Vector2::new(b.y - a.y, a.x - b.x);
    let len2 = n.magnitude2();
    if len2 <= COLLISION_EPSILON * COLLISION_EPSILON {
        None
    } else {
        Some(n / len2.sqrt())
    }
}

/// True if one of the edges of a separates a from b.
fn separated_by_edges_of(a: &[Vector2<f32>], b: &[Vector2<f32>]) -> bool {
    (0..a.len())
        .filter_map(|i| edge_normal(a, i))
        .any(|n| !project(a, n).overlaps(&project(b, n)))
}

/// Tests two convex polygons for overlap with the separating axis theorem.
///
/// The edges of both polygons are tried as candidate axes. Degenerate edges
/// are skipped.
pub fn convex_polys_collide(a: &[Vector2<f32>], b: &[Vector2<f32>]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    !separated_by_edges_of(a, b) && !separated_by_edges_of(b, a)
}

/// The signed distance the mover's interval must travel along an axis to
/// leave the collider's interval.
///
/// A mover that starts before the collider and ends inside it is pushed back
/// (negative result). A mover that ends past the collider and starts inside it
/// is pushed forward. When one interval contains the other the shorter of the
/// two pushes is used, preferring the backwards one on a tie.
pub fn response_across_line(mover: Projection, collider: Projection) -> f32 {
    let back = collider.start - mover.end;
    let forward = collider.end - mover.start;
    if mover.start < collider.start && mover.end <= collider.end {
        back
    } else if mover.end > collider.end && mover.start >= collider.start {
        forward
    } else if back.abs() <= forward.abs() {
        back
    } else {
        forward
    }
}

/// The minimum translation that pushes mover out of collider, searched over
/// the collider's edge normals only.
///
/// The first axis wins when several produce the same magnitude. Returns the
/// zero vector if the collider has no usable edge.
pub fn mtv_between(mover: &[Vector2<f32>], collider: &[Vector2<f32>]) -> Vector2<f32> {
    let mut best: Option<(f32, Vector2<f32>)> = None;
    for i in 0..collider.len() {
        let n = match edge_normal(collider, i) {
            Some(n) => n,
            None => continue,
        };
        let response = response_across_line(project(mover, n), project(collider, n));
        match best {
            Some((r, _)) if r.abs() <= response.abs() => {}
            _ => best = Some((response, n)),
        }
    }
    best.map(|(r, n)| n * r).unwrap_or_else(Vector2::zero)
}

/// The displacement that separates an overlapping mover from a collider, or
/// None if they do not overlap.
///
/// Both polygons' edge sets are searched and the smaller correction wins; on a
/// tie the collider's edges are preferred.
pub fn resolution_for(mover: &[Vector2<f32>], collider: &[Vector2<f32>]) -> Option<Vector2<f32>> {
    if !convex_polys_collide(mover, collider) {
        return None;
    }
    let forward = mtv_between(mover, collider);
    let reverse = -mtv_between(collider, mover);
    if reverse.magnitude2() < forward.magnitude2() {
        Some(reverse)
    } else {
        Some(forward)
    }
}

/// One dimensional signed penetration used between axis aligned boxes.
///
/// The result is the distance the mover's span must travel to leave the
/// collider's span, divided by scale so it can be applied directly to a
/// position expressed in a parent space of that scale.
pub fn difference_window(
    mover_start: f32,
    mover_end: f32,
    collider_start: f32,
    collider_end: f32,
    scale: f32,
) -> f32 {
    response_across_line(
        Projection::new(mover_start, mover_end),
        Projection::new(collider_start, collider_end),
    ) / scale
}

#[cfg(test)]
mod tests {
    mod rects {
        use proptest::prelude::*;

        use crate::collision::*;
        use crate::geom::{Rect, RESOLUTION_EPSILON};

        #[test]
        fn test_grazing_flag() {
            let a = Rect::new(0.0, 0.0, 10.0, 10.0);
            let b = Rect::new(10.0, 0.0, 10.0, 10.0);
            assert!(!rects_collide(&a, &b, false));
            assert!(rects_collide(&a, &b, true));
            assert!(!a.overlaps(&b));
        }

        #[test]
        fn test_rect_overlap() {
            let a = Rect::new(0.0, 0.0, 10.0, 10.0);
            let inside = Rect::new(2.0, 2.0, 2.0, 2.0);
            let apart = Rect::new(10.5, 0.0, 10.0, 10.0);
            let below = Rect::new(0.0, 9.0, 10.0, 10.0);
            assert!(rects_collide(&a, &inside, false));
            assert!(rects_collide(&inside, &a, false));
            assert!(!rects_collide(&a, &apart, true));
            assert!(rects_collide(&a, &below, false));
        }

        #[test]
        fn test_thin_rect_overlaps_after_inset() {
            let floor = Rect::new(-50.0, 92.0, 100.0, 16.0);
            // Centre line sits just below the floor's top edge.
            let thin = Rect::new(-8.0, 91.9996, 16.0, 0.001);
            let inset = thin.inset(RESOLUTION_EPSILON);
            assert!(inset.h >= 0.0);
            assert!(rects_collide(&inset, &floor, false));

            let above = Rect::new(-8.0, 91.9, 16.0, 0.001);
            assert!(!rects_collide(&above.inset(RESOLUTION_EPSILON), &floor, false));
        }

        fn rect() -> impl Strategy<Value = Rect> {
            (-50.0f32..50.0, -50.0f32..50.0, 0.0f32..40.0, 0.0f32..40.0)
                .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
        }

        proptest! {
            #[test]
            fn test_rects_collide_symmetric(a in rect(), b in rect(), grazing in any::<bool>()) {
                prop_assert_eq!(rects_collide(&a, &b, grazing), rects_collide(&b, &a, grazing));
            }
        }
    }

    mod sat {
        use cgmath::{InnerSpace, Vector2};
        use proptest::prelude::*;

        use crate::collision::*;
        use crate::geom::Transform;
        use crate::shape::{box_vertices, regular_shape};

        fn square(x: f32, y: f32, size: f32) -> Vec<Vector2<f32>> {
            vec![
                Vector2::new(x, y),
                Vector2::new(x + size, y),
                Vector2::new(x + size, y + size),
                Vector2::new(x, y + size),
            ]
        }

        fn moved(vertices: &[Vector2<f32>], d: Vector2<f32>) -> Vec<Vector2<f32>> {
            vertices.iter().map(|v| v + d).collect()
        }

        #[test]
        fn test_projection() {
            let p = project(&square(0.0, 0.0, 10.0), Vector2::new(1.0, 0.0));
            assert_eq!(p, Projection::new(0.0, 10.0));
            assert!(p.overlaps(&Projection::new(9.0, 12.0)));
            assert!(!p.overlaps(&Projection::new(10.0, 12.0)));
            assert!(!Projection::new(9.0, 12.0).overlaps(&Projection::new(0.0, 9.0)));
        }

        #[test]
        fn test_convex_polys_collide() {
            let a = square(0.0, 0.0, 10.0);
            assert!(convex_polys_collide(&a, &square(5.0, 5.0, 10.0)));
            assert!(convex_polys_collide(&a, &square(2.0, 2.0, 1.0)));
            assert!(!convex_polys_collide(&a, &square(10.0, 0.0, 10.0)));
            assert!(!convex_polys_collide(&a, &square(30.0, 30.0, 1.0)));
            assert!(!convex_polys_collide(&a, &[]));
        }

        #[test]
        fn test_separated_only_by_diagonal() {
            // The bounding boxes overlap, only the hypotenuse separates them.
            let a = square(0.0, 0.0, 10.0);
            let tri = vec![
                Vector2::new(9.0, 13.0),
                Vector2::new(13.0, 9.0),
                Vector2::new(13.0, 13.0),
            ];
            assert!(!convex_polys_collide(&a, &tri));
            assert!(!convex_polys_collide(&tri, &a));

            let tri = moved(&tri, Vector2::new(-3.0, -3.0));
            assert!(convex_polys_collide(&a, &tri));
            assert!(convex_polys_collide(&tri, &a));
        }

        #[test]
        fn test_degenerate_edges_are_skipped() {
            let doubled = vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(0.0, 0.0),
                Vector2::new(10.0, 0.0),
                Vector2::new(10.0, 10.0),
                Vector2::new(0.0, 10.0),
            ];
            assert!(convex_polys_collide(&doubled, &square(5.0, 5.0, 10.0)));
            assert!(!convex_polys_collide(&doubled, &square(20.0, 0.0, 10.0)));
            let r = resolution_for(&doubled, &square(8.0, 2.0, 10.0)).unwrap();
            assert!(r.x.is_finite() && r.y.is_finite());
        }

        #[test]
        fn test_response_across_line() {
            let c = Projection::new(0.0, 10.0);
            assert_eq!(response_across_line(Projection::new(-5.0, 2.0), c), -2.0);
            assert_eq!(response_across_line(Projection::new(7.0, 12.0), c), 3.0);
            assert_eq!(response_across_line(Projection::new(1.0, 4.0), c), -4.0);
            assert_eq!(response_across_line(Projection::new(7.0, 9.0), c), 3.0);
            assert_eq!(response_across_line(Projection::new(-1.0, 12.0), c), 11.0);
        }

        #[test]
        fn test_difference_window() {
            assert_eq!(difference_window(0.0, 10.0, 8.0, 18.0, 1.0), -2.0);
            assert_eq!(difference_window(10.0, 20.0, 0.0, 12.0, 1.0), 2.0);
            assert_eq!(difference_window(10.0, 20.0, 0.0, 12.0, 2.0), 1.0);
            assert_eq!(difference_window(2.0, 4.0, 0.0, 10.0, 1.0), -4.0);
        }

        #[test]
        fn test_mtv() {
            let mover = square(0.0, 0.0, 10.0);
            let collider = square(8.0, 2.0, 10.0);
            assert_eq!(mtv_between(&mover, &collider), Vector2::new(-2.0, 0.0));
            assert_eq!(mtv_between(&collider, &mover), Vector2::new(2.0, 0.0));
            assert_eq!(resolution_for(&mover, &collider), Some(Vector2::new(-2.0, 0.0)));
            assert_eq!(resolution_for(&mover, &square(10.0, 0.0, 10.0)), None);
        }

        #[test]
        fn test_resolution_converges() {
            let cases = [
                (square(0.0, 0.0, 10.0), square(8.0, 2.0, 10.0)),
                (square(0.0, 0.0, 10.0), square(-4.0, 7.0, 10.0)),
                (square(0.0, 0.0, 16.0), square(-42.0, 12.0, 100.0)),
                (square(3.0, 3.0, 2.0), square(0.0, 0.0, 10.0)),
            ];
            for (mover, collider) in cases.iter() {
                let r = resolution_for(mover, collider).unwrap();
                let resolved = moved(mover, r);
                assert!(!convex_polys_collide(&resolved, collider));
            }
        }

        #[test]
        fn test_resolution_prefers_tighter_edge_set() {
            // A thin sliver pushed into a triangle's slanted face.
            let tri = vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(20.0, 20.0),
                Vector2::new(0.0, 20.0),
            ];
            let mover = square(8.0, 9.0, 2.0);
            let forward = mtv_between(&mover, &tri);
            let reverse = -mtv_between(&tri, &mover);
            let r = resolution_for(&mover, &tri).unwrap();
            assert!(r.magnitude2() <= forward.magnitude2() + 1.0e-6);
            assert!(r.magnitude2() <= reverse.magnitude2() + 1.0e-6);
            assert!(!convex_polys_collide(&moved(&mover, r * 1.001), &tri));
        }

        fn polygon() -> impl Strategy<Value = Vec<Vector2<f32>>> {
            (3usize..9, 1.0f32..50.0, -60.0f32..60.0, -60.0f32..60.0, 0.0f32..6.28)
                .prop_map(|(n, size, x, y, angle)| {
                    let t = Transform::from_position(Vector2::new(x, y)).with_angle(angle);
                    regular_shape(n, size).into_iter().map(|v| t.apply(v)).collect()
                })
        }

        fn aligned_box() -> impl Strategy<Value = Vec<Vector2<f32>>> {
            (1.0f32..30.0, 1.0f32..30.0, -50.0f32..50.0, -50.0f32..50.0)
                .prop_map(|(w, h, x, y)| {
                    let t = Transform::from_position(Vector2::new(x, y));
                    box_vertices(Vector2::new(w, h)).into_iter().map(|v| t.apply(v)).collect()
                })
        }

        proptest! {
            #[test]
            fn test_sat_symmetry(a in polygon(), b in polygon()) {
                prop_assert_eq!(convex_polys_collide(&a, &b), convex_polys_collide(&b, &a));
            }

            #[test]
            fn test_box_resolution_separates(mover in aligned_box(), collider in aligned_box()) {
                if let Some(r) = resolution_for(&mover, &collider) {
                    prop_assert!(!convex_polys_collide(&moved(&mover, r), &collider));
                }
            }
        }
    }
}
