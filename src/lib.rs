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

//! A low-level 2D collision and kinematic resolution library intended for
//! platformer style video games.
//!
//! # Overview
//!
//! A `World` owns bodies and the convex shapes attached to them. Bodies come
//! in three kinds:
//!
//! - Static bodies never move, but kinematic bodies collide against them.
//! - Kinematic bodies move under an explicit velocity. Each tick their motion
//!   is split into sub-steps and they are pushed out of any static or
//!   kinematic body they overlap, after which their floor, ceiling and wall
//!   contacts can be read.
//! - Sensors only answer overlap queries and are never collided against.
//!
//! Shapes are either convex polygons, tested with the separating axis theorem,
//! or axis aligned boxes that ignore rotation and take a cheaper per-axis
//! path when both sides of a pair are boxes.
//!
//! Coordinates follow screen conventions: y grows downwards, so a floor is
//! below a body and its top edge has the smaller y value.
//!
//! The world never reaches into a scene graph. The transform a body inherits
//! from its parents is pushed in with `World::set_parent_transform`, and shape
//! registration follows explicit `attach` and `detach` calls.

pub use cgmath;

mod collision;
pub use collision::*;

mod error;
pub use error::*;

mod geom;
pub use geom::*;

mod physics;
pub use physics::*;

mod pool;
pub use pool::{BodyHandle, ShapeHandle};

mod registry;
pub use registry::*;

mod shape;
pub use shape::*;

mod world;
pub use world::*;
