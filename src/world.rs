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

use cgmath::Vector2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::collision::convex_polys_collide;
use crate::error::CollisionError;
use crate::geom::*;
use crate::physics::*;
use crate::pool::*;
use crate::registry::Registry;
use crate::shape::{CollisionShape, Vertices};

/// How strictly a world checks the way it is used.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validation {
    /// Invalid shapes and registry misuse are reported as errors.
    Strict,
    /// Checks are skipped and misuse is tolerated where possible.
    Trusting,
}

impl Validation {
    pub fn is_strict(self) -> bool {
        self == Validation::Strict
    }
}

impl Default for Validation {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Validation::Strict
        } else {
            Validation::Trusting
        }
    }
}

/// Runtime settings of a world.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSettings {
    #[serde(default)]
    pub validation: Validation,
}

/// Owner of every body and shape in a simulated scene.
///
/// Bodies and shapes are created detached. A body's shapes are registered for
/// collision only while the body is attached, and kinematic bodies are only
/// advanced by `update` while attached.
#[derive(Clone, Debug, Default)]
pub struct World {
    settings: WorldSettings,
    bodies: Pool<Body>,
    shapes: Pool<CollisionShape>,
    registry: Registry,
}

impl World {
    pub fn new() -> Self {
        World::default()
    }

    pub fn with_settings(settings: WorldSettings) -> Self {
        World {
            settings,
            ..World::default()
        }
    }

    pub fn settings(&self) -> WorldSettings {
        self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn validation(&self) -> Validation {
        self.settings.validation
    }

    /// Adds a detached body to the world.
    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        let handle = BodyHandle(self.bodies.push(body));
        debug!(body = ?handle, "added body");
        handle
    }

    pub fn body(&self, body: BodyHandle) -> Option<&Body> {
        self.bodies.get(body.0)
    }

    pub fn body_mut(&mut self, body: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(body.0)
    }

    /// Every body in the world, attached or not, in handle order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies.indexed().map(|(i, b)| (BodyHandle(i), b))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    fn get_body(&self, body: BodyHandle) -> Result<&Body, CollisionError> {
        self.bodies.get(body.0).ok_or(CollisionError::UnknownBody(body))
    }

    fn get_body_mut(&mut self, body: BodyHandle) -> Result<&mut Body, CollisionError> {
        self.bodies
            .get_mut(body.0)
            .ok_or(CollisionError::UnknownBody(body))
    }

    /// Velocity of a kinematic body. Other bodies report None.
    pub fn velocity(&self, body: BodyHandle) -> Option<Vector2<f32>> {
        self.body(body)?.kinematic().map(|k| k.velocity)
    }

    /// Sets the velocity of a kinematic body. Does nothing for other bodies.
    pub fn set_velocity(
        &mut self,
        body: BodyHandle,
        velocity: Vector2<f32>,
    ) -> Result<(), CollisionError> {
        if let Some(k) = self.get_body_mut(body)?.kinematic_mut() {
            k.velocity = velocity;
        }
        Ok(())
    }

    /// Contact flags derived during the last tick of a kinematic body.
    pub fn contacts(&self, body: BodyHandle) -> Option<Contacts> {
        self.body(body)?.kinematic().map(|k| k.contacts)
    }

    /// Supplies the transform a body inherits from the scene graph.
    pub fn set_parent_transform(
        &mut self,
        body: BodyHandle,
        parent: Transform,
    ) -> Result<(), CollisionError> {
        self.get_body_mut(body)?.parent = parent;
        Ok(())
    }

    /// Makes a body part of the simulation, registering all of its shapes.
    /// Attaching an attached body does nothing.
    pub fn attach_body(&mut self, body: BodyHandle) -> Result<(), CollisionError> {
        let validation = self.validation();
        let b = self.get_body_mut(body)?;
        if b.attached {
            return Ok(());
        }
        b.attached = true;
        let shapes = b.shapes.clone();
        debug!(?body, shapes = shapes.len(), "attaching body");
        for shape in shapes {
            self.registry.register(shape, validation)?;
        }
        Ok(())
    }

    /// Removes a body from the simulation, unregistering all of its shapes.
    /// The body and its shapes stay in the world.
    pub fn detach_body(&mut self, body: BodyHandle) -> Result<(), CollisionError> {
        let validation = self.validation();
        let b = self.get_body_mut(body)?;
        if !b.attached {
            return Ok(());
        }
        b.attached = false;
        let shapes = b.shapes.clone();
        debug!(?body, shapes = shapes.len(), "detaching body");
        for shape in shapes {
            self.registry.unregister(shape, validation)?;
        }
        Ok(())
    }

    /// Destroys a body along with every shape it owns.
    pub fn remove_body(&mut self, body: BodyHandle) -> Result<Body, CollisionError> {
        self.detach_body(body)?;
        let mut removed = self
            .bodies
            .take(body.0)
            .ok_or(CollisionError::UnknownBody(body))?;
        for shape in removed.shapes.iter() {
            self.shapes.take(shape.0);
        }
        removed.shapes.clear();
        debug!(?body, "removed body");
        Ok(removed)
    }

    /// Adds an unowned shape to the world. Strict worlds reject empty
    /// shapes and shapes with zero length edges.
    pub fn add_shape(&mut self, shape: CollisionShape) -> Result<ShapeHandle, CollisionError> {
        if self.validation().is_strict() {
            shape.validate()?;
        }
        let mut shape = shape;
        shape.owner = None;
        Ok(ShapeHandle(self.shapes.push(shape)))
    }

    pub fn shape(&self, shape: ShapeHandle) -> Option<&CollisionShape> {
        self.shapes.get(shape.0)
    }

    /// Shapes owned by a body, in attachment order.
    pub fn shapes_of(&self, body: BodyHandle) -> Option<&[ShapeHandle]> {
        self.body(body).map(Body::shapes)
    }

    /// Gives a shape to a body. A shape owned by another body is detached from
    /// it first, so reparenting moves its registration along with it.
    pub fn attach_shape(
        &mut self,
        shape: ShapeHandle,
        body: BodyHandle,
    ) -> Result<(), CollisionError> {
        let previous = self
            .shapes
            .get(shape.0)
            .ok_or(CollisionError::UnknownShape(shape))?
            .owner;
        if previous == Some(body) {
            return Ok(());
        }
        let attached = self.get_body(body)?.attached;
        if previous.is_some() {
            self.detach_shape(shape)?;
        }
        debug!(?shape, ?body, ?previous, "attaching shape");
        self.bodies[body.0].shapes.push(shape);
        self.shapes[shape.0].owner = Some(body);
        if attached {
            self.registry.register(shape, self.settings.validation)?;
        }
        Ok(())
    }

    /// Takes a shape away from its owner, unregistering it if the owner was
    /// attached. Unowned shapes are left alone.
    pub fn detach_shape(&mut self, shape: ShapeHandle) -> Result<(), CollisionError> {
        let validation = self.validation();
        let owner = match self.shapes.get_mut(shape.0) {
            Some(s) => s.owner.take(),
            None => return Err(CollisionError::UnknownShape(shape)),
        };
        let owner = match owner {
            Some(owner) => owner,
            None => return Ok(()),
        };
        debug!(?shape, body = ?owner, "detaching shape");
        if let Some(b) = self.bodies.get_mut(owner.0) {
            b.shapes.retain(|s| *s != shape);
            if b.attached {
                self.registry.unregister(shape, validation)?;
            }
        }
        Ok(())
    }

    /// Destroys a shape, detaching it from its owner first.
    pub fn remove_shape(&mut self, shape: ShapeHandle) -> Result<CollisionShape, CollisionError> {
        self.detach_shape(shape)?;
        self.shapes
            .take(shape.0)
            .ok_or(CollisionError::UnknownShape(shape))
    }

    fn owner_transform(&self, shape: &CollisionShape) -> Transform {
        shape
            .owner
            .and_then(|owner| self.bodies.get(owner.0))
            .map(Body::global_transform)
            .unwrap_or_else(Transform::identity)
    }

    /// Vertices of a shape in global space. Unowned shapes are placed at the
    /// origin.
    pub fn global_vertices(&self, shape: ShapeHandle) -> Option<Vertices> {
        let s = self.shape(shape)?;
        Some(s.global_vertices(&self.owner_transform(s)))
    }

    /// Global axis aligned bounding box of a shape.
    pub fn bounding_box(&self, shape: ShapeHandle) -> Option<Rect> {
        let s = self.shape(shape)?;
        Some(s.bounding_box(&self.owner_transform(s)))
    }

    fn body_vertices(&self, body: &Body) -> SmallVec<[Vertices; 4]> {
        let t = body.global_transform();
        body.shapes
            .iter()
            .filter_map(|s| self.shapes.get(s.0))
            .map(|s| s.global_vertices(&t))
            .collect()
    }

    /// Whether any shape of sensor overlaps any shape of other. Nothing is
    /// moved.
    pub fn collides_with(&self, sensor: BodyHandle, other: BodyHandle) -> bool {
        let (a, b) = match (self.body(sensor), self.body(other)) {
            (Some(a), Some(b)) => (a, b),
            _ => return false,
        };
        let mine = self.body_vertices(a);
        let theirs = self.body_vertices(b);
        mine.iter()
            .any(|m| theirs.iter().any(|t| convex_polys_collide(m, t)))
    }

    /// Every body owning a registered shape that overlaps one of sensor's
    /// shapes, in registry order and without duplicates.
    pub fn colliding_bodies(&self, sensor: BodyHandle) -> Vec<BodyHandle> {
        let mut found = Vec::new();
        let mine = match self.body(sensor) {
            Some(body) => self.body_vertices(body),
            None => return found,
        };
        for &handle in &self.registry {
            let shape = match self.shapes.get(handle.0) {
                Some(shape) => shape,
                None => continue,
            };
            let owner = match shape.owner {
                Some(owner) if owner != sensor && !found.contains(&owner) => owner,
                _ => continue,
            };
            let theirs = shape.global_vertices(&self.owner_transform(shape));
            if mine.iter().any(|m| convex_polys_collide(m, &theirs)) {
                found.push(owner);
            }
        }
        found
    }

    /// Advances every attached kinematic body by one tick, in handle order.
    pub fn update<C: KinematicConfig>(&mut self) {
        let movers: Vec<BodyHandle> = self
            .bodies()
            .filter(|(_, b)| b.attached && b.kinematic().is_some())
            .map(|(h, _)| h)
            .collect();
        for body in movers {
            resolve_body::<C>(&mut self.bodies, &self.shapes, &self.registry, body);
        }
    }

    /// Advances a single kinematic body by one tick.
    pub fn step_body<C: KinematicConfig>(&mut self, body: BodyHandle) -> Result<(), CollisionError> {
        let b = self.get_body(body)?;
        if !b.attached {
            if self.validation().is_strict() {
                return Err(CollisionError::NotAttached(body));
            }
            warn!(?body, "stepping a detached body");
            return Ok(());
        }
        resolve_body::<C>(&mut self.bodies, &self.shapes, &self.registry, body);
        Ok(())
    }
}
