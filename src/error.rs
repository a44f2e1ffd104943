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

use crate::pool::{BodyHandle, ShapeHandle};

/// Invariant violations detected by the collision core.
///
/// None of these are environmental: every variant is a misuse of the API by
/// the embedding engine. They are only reported when the world runs with
/// `Validation::Strict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CollisionError {
    /// A polygon was built without any vertices.
    #[error("shape has no vertices")]
    EmptyShape,
    /// Two consecutive vertices of a shape coincide.
    #[error("edge {index} of shape has zero length")]
    DegenerateEdge { index: usize },
    #[error("shape {0:?} is already registered")]
    AlreadyRegistered(ShapeHandle),
    #[error("shape {0:?} is not registered")]
    NotRegistered(ShapeHandle),
    #[error("no body with handle {0:?}")]
    UnknownBody(BodyHandle),
    #[error("body {0:?} is not attached to the world")]
    NotAttached(BodyHandle),
    #[error("no shape with handle {0:?}")]
    UnknownShape(ShapeHandle),
}
