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

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::CollisionError;
use crate::geom::*;
use crate::pool::BodyHandle;

/// Vertex storage for shapes transformed into global space.
pub type Vertices = SmallVec<[Vector2<f32>; 8]>;

/// Builds a vertex list from coordinate pairs.
pub fn points(list: &[(f32, f32)]) -> Vec<Vector2<f32>> {
    list.iter().map(|&(x, y)| Vector2::new(x, y)).collect()
}

/// Builds the vertices of a regular polygon with n points inscribed in a
/// circle of diameter scale. The first vertex points along +y.
pub fn regular_shape(n: usize, scale: f32) -> Vec<Vector2<f32>> {
    regular_shape_scaled(n, Vector2::new(scale, scale))
}

/// Builds a regular polygon stretched independently along each axis.
pub fn regular_shape_scaled(n: usize, scale: Vector2<f32>) -> Vec<Vector2<f32>> {
    let increment = 2.0 * PI / n as f32;
    (0..n)
        .map(|i| {
            let (sin, cos) = (i as f32 * increment).sin_cos();
            Vector2::new(sin * scale.x * 0.5, cos * scale.y * 0.5)
        })
        .collect()
}

/// The four corners of a box centered on the origin, starting at the top left
/// and winding through the top right, bottom right and bottom left corners.
pub fn box_vertices(half_extent: Vector2<f32>) -> Vec<Vector2<f32>> {
    let h = half_extent;
    vec![
        Vector2::new(-h.x, -h.y),
        Vector2::new(h.x, -h.y),
        Vector2::new(h.x, h.y),
        Vector2::new(-h.x, h.y),
    ]
}

/// The geometry of a collision shape in its own local space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// A convex polygon. Vertices must be wound consistently.
    Polygon(Vec<Vector2<f32>>),
    /// A box described by its half extent. Boxes always stay aligned to the
    /// axes, whatever the rotation of their owner.
    Box(Vector2<f32>),
}

impl ShapeKind {
    pub fn local_vertices(&self) -> Vertices {
        match self {
            ShapeKind::Polygon(points) => points.iter().cloned().collect(),
            ShapeKind::Box(half_extent) => box_vertices(*half_extent).into_iter().collect(),
        }
    }
}

/// A convex region attached to a body.
///
/// A shape is owned by at most one body at a time. Shapes without an owner
/// are not part of any simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionShape {
    pub kind: ShapeKind,
    /// Placement of the shape relative to its owning body.
    pub offset: Transform,
    pub(crate) owner: Option<BodyHandle>,
}

impl CollisionShape {
    pub fn new(kind: ShapeKind) -> Self {
        CollisionShape {
            kind,
            offset: Transform::identity(),
            owner: None,
        }
    }

    /// A polygon from an explicit list of points.
    pub fn polygon(points: Vec<Vector2<f32>>) -> Self {
        CollisionShape::new(ShapeKind::Polygon(points))
    }

    /// A regular polygon, see `regular_shape`.
    pub fn regular(n: usize, scale: f32) -> Self {
        CollisionShape::polygon(regular_shape(n, scale))
    }

    /// An axis aligned box of the given full width and height.
    pub fn hitbox(size: Vector2<f32>) -> Self {
        CollisionShape::new(ShapeKind::Box(size * 0.5))
    }

    pub fn with_offset(self, offset: Transform) -> Self {
        CollisionShape { offset, ..self }
    }

    /// The body this shape is attached to, if any.
    pub fn owner(&self) -> Option<BodyHandle> {
        self.owner
    }

    pub fn is_box(&self) -> bool {
        match self.kind {
            ShapeKind::Box(_) => true,
            ShapeKind::Polygon(_) => false,
        }
    }

    /// The transform of the shape in global space given its owner's global
    /// transform. Boxes report a zero angle.
    pub fn global_transform(&self, owner: &Transform) -> Transform {
        let global = owner.then(&self.offset);
        match self.kind {
            ShapeKind::Box(_) => Transform { angle: 0.0, ..global },
            ShapeKind::Polygon(_) => global,
        }
    }

    /// Local vertices scaled, rotated and displaced into global space.
    pub fn global_vertices(&self, owner: &Transform) -> Vertices {
        let t = self.global_transform(owner);
        let mut vertices = self.kind.local_vertices();
        for v in vertices.iter_mut() {
            *v = t.apply(*v);
        }
        vertices
    }

    /// The axis aligned rectangle enclosing the global vertices.
    pub fn bounding_box(&self, owner: &Transform) -> Rect {
        Rect::enclosing(&self.global_vertices(owner))
    }

    /// Checks that the shape has vertices and no zero length edge.
    pub fn validate(&self) -> Result<(), CollisionError> {
        let vertices = self.kind.local_vertices();
        if vertices.is_empty() {
            return Err(CollisionError::EmptyShape);
        }
        for i in 0..vertices.len() {
            let edge = vertices[(i + 1) % vertices.len()] - vertices[i];
            if edge.magnitude2() <= COLLISION_EPSILON * COLLISION_EPSILON {
                return Err(CollisionError::DegenerateEdge { index: i });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    mod construction {
        use std::f32::consts::PI;

        use approx::assert_relative_eq;
        use cgmath::{InnerSpace, Vector2};

        use crate::shape::*;

        #[test]
        fn test_regular_shape() {
            let hexagon = regular_shape(6, 10.0);
            assert_eq!(hexagon.len(), 6);
            for v in hexagon.iter() {
                assert_relative_eq!(v.magnitude(), 5.0, epsilon = 1.0e-5);
            }
            for i in 0..6 {
                let a = hexagon[i];
                let b = hexagon[(i + 1) % 6];
                let between = (a.dot(b) / (a.magnitude() * b.magnitude())).acos();
                assert_relative_eq!(between, 2.0 * PI / 6.0, epsilon = 1.0e-4);
            }
            assert_relative_eq!(hexagon[0].x, 0.0);
            assert_relative_eq!(hexagon[0].y, 5.0);
        }

        #[test]
        fn test_points() {
            let tri = points(&[(0.0, 0.0), (4.0, 0.0), (0.0, 3.0)]);
            assert_eq!(tri[1], Vector2::new(4.0, 0.0));
            assert_eq!(CollisionShape::polygon(tri).validate(), Ok(()));
        }

        #[test]
        fn test_regular_shape_scaled() {
            let diamond = regular_shape_scaled(4, Vector2::new(4.0, 8.0));
            assert_relative_eq!(diamond[0].y, 4.0);
            assert_relative_eq!(diamond[1].x, 2.0);
            assert_relative_eq!(diamond[2].y, -4.0, epsilon = 1.0e-5);
            assert_relative_eq!(diamond[3].x, -2.0, epsilon = 1.0e-5);
        }

        #[test]
        fn test_box_vertices() {
            let corners = box_vertices(Vector2::new(8.0, 4.0));
            assert_eq!(
                corners,
                vec![
                    Vector2::new(-8.0, -4.0),
                    Vector2::new(8.0, -4.0),
                    Vector2::new(8.0, 4.0),
                    Vector2::new(-8.0, 4.0),
                ]
            );
            let hitbox = CollisionShape::hitbox(Vector2::new(16.0, 8.0));
            assert_eq!(hitbox.kind, ShapeKind::Box(Vector2::new(8.0, 4.0)));
            assert_eq!(hitbox.kind.local_vertices().into_vec(), corners);
        }
    }

    mod transforms {
        use std::f32::consts::FRAC_PI_2;

        use approx::assert_relative_eq;
        use cgmath::Vector2;

        use crate::geom::{Rect, Transform};
        use crate::shape::*;

        #[test]
        fn test_global_vertices() {
            let owner = Transform::from_position(Vector2::new(10.0, 20.0))
                .with_scale(Vector2::new(2.0, 2.0));
            let shape = CollisionShape::polygon(vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 0.0),
                Vector2::new(0.0, 1.0),
            ])
            .with_offset(Transform::from_position(Vector2::new(1.0, 0.0)));
            let global = shape.global_vertices(&owner);
            assert_eq!(global[0], Vector2::new(12.0, 20.0));
            assert_eq!(global[1], Vector2::new(14.0, 20.0));
            assert_eq!(global[2], Vector2::new(12.0, 22.0));
            assert_eq!(shape.bounding_box(&owner), Rect::new(12.0, 20.0, 2.0, 2.0));
        }

        #[test]
        fn test_hitbox_ignores_rotation() {
            let owner = Transform::from_position(Vector2::new(5.0, 5.0)).with_angle(FRAC_PI_2);
            let hitbox = CollisionShape::hitbox(Vector2::new(4.0, 2.0));
            assert_eq!(hitbox.global_transform(&owner).angle, 0.0);
            assert_eq!(hitbox.bounding_box(&owner), Rect::new(3.0, 4.0, 4.0, 2.0));

            let polygon = CollisionShape::polygon(box_vertices(Vector2::new(2.0, 1.0)));
            let rotated = polygon.bounding_box(&owner);
            assert_relative_eq!(rotated.w, 2.0, epsilon = 1.0e-5);
            assert_relative_eq!(rotated.h, 4.0, epsilon = 1.0e-5);
        }
    }

    mod validation {
        use cgmath::Vector2;

        use crate::error::CollisionError;
        use crate::shape::*;

        #[test]
        fn test_validate() {
            assert_eq!(CollisionShape::regular(5, 3.0).validate(), Ok(()));
            assert_eq!(CollisionShape::hitbox(Vector2::new(1.0, 1.0)).validate(), Ok(()));
            assert_eq!(
                CollisionShape::polygon(Vec::new()).validate(),
                Err(CollisionError::EmptyShape)
            );
            assert_eq!(CollisionShape::regular(0, 3.0).validate(), Err(CollisionError::EmptyShape));
            let repeated = CollisionShape::polygon(vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(4.0, 0.0),
                Vector2::new(4.0, 0.0),
                Vector2::new(0.0, 4.0),
            ]);
            assert_eq!(repeated.validate(), Err(CollisionError::DegenerateEdge { index: 1 }));
            assert_eq!(
                CollisionShape::hitbox(Vector2::new(0.0, 2.0)).validate(),
                Err(CollisionError::DegenerateEdge { index: 0 })
            );
        }
    }
}
