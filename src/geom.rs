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

use std::f32;

use cgmath::{ElementWise, Vector2};
use serde::{Deserialize, Serialize};

/// Tolerance used when deciding whether two projected intervals overlap.
/// Intervals that overlap by less than this are considered to be touching.
pub const COLLISION_EPSILON: f32 = 0.0001;

/// Amount a rectangle is shrunk by on every side when re-testing overlap after
/// a positional correction.
pub const RESOLUTION_EPSILON: f32 = 0.001;

/// Rotates a vector counter-clockwise by angle radians.
pub fn rotate(v: Vector2<f32>, angle: f32) -> Vector2<f32> {
    if angle == 0.0 {
        return v;
    }
    let (sa, ca) = angle.sin_cos();
    Vector2::new(v.x * ca - v.y * sa, v.y * ca + v.x * sa)
}

/// Rounds n to a fixed number of decimal places.
pub fn round_to(n: f32, decimals: i32) -> f32 {
    let m = 10.0f32.powi(decimals);
    (n * m).round() / m
}

/// Position, scale and rotation of an object relative to its parent.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vector2<f32>,
    pub scale: Vector2<f32>,
    pub angle: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Transform {
            position: Vector2::new(0.0, 0.0),
            scale: Vector2::new(1.0, 1.0),
            angle: 0.0,
        }
    }

    pub fn from_position(position: Vector2<f32>) -> Self {
        Transform {
            position,
            ..Transform::identity()
        }
    }

    pub fn with_scale(self, scale: Vector2<f32>) -> Self {
        Transform { scale, ..self }
    }

    pub fn with_angle(self, angle: f32) -> Self {
        Transform { angle, ..self }
    }

    /// Composes a child transform onto this one, producing the child's
    /// transform in this transform's parent space.
    ///
    /// The child's offset is scaled and rotated by the parent before being
    /// displaced, scales multiply and angles add.
    pub fn then(&self, child: &Transform) -> Transform {
        Transform {
            position: self.position
                + rotate(child.position.mul_element_wise(self.scale), self.angle),
            scale: child.scale.mul_element_wise(self.scale),
            angle: child.angle + self.angle,
        }
    }

    /// Maps a point in local space to the space this transform lives in.
    pub fn apply(&self, p: Vector2<f32>) -> Vector2<f32> {
        rotate(p.mul_element_wise(self.scale), self.angle) + self.position
    }
}

/// An axis aligned rectangle described by its top left corner and its size.
///
/// Coordinates follow screen conventions: y grows downwards, so the top edge
/// has the smaller y value.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// Rectangle of the given full size centered on c.
    pub fn from_center(c: Vector2<f32>, size: Vector2<f32>) -> Self {
        Rect {
            x: c.x - size.x * 0.5,
            y: c.y - size.y * 0.5,
            w: size.x,
            h: size.y,
        }
    }

    /// Smallest rectangle containing every point. An empty slice produces a
    /// degenerate rectangle at the origin.
    pub fn enclosing(points: &[Vector2<f32>]) -> Self {
        if points.is_empty() {
            return Rect::new(0.0, 0.0, 0.0, 0.0);
        }
        let mut min = Vector2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Vector2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vector2<f32> {
        Vector2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn size(&self) -> Vector2<f32> {
        Vector2::new(self.w, self.h)
    }

    /// Shrinks the rectangle by d on every side. The shrink is capped so the
    /// rectangle collapses onto its centre line rather than inverting.
    pub fn inset(&self, d: f32) -> Self {
        let d = d.min(self.w.min(self.h) * 0.5);
        Rect {
            x: self.x + d,
            y: self.y + d,
            w: self.w - 2.0 * d,
            h: self.h - 2.0 * d,
        }
    }
}
