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

use cgmath::{ElementWise, Vector2, Zero};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use crate::collision::*;
use crate::geom::*;
use crate::pool::{BodyHandle, Pool, ShapeHandle};
use crate::registry::Registry;
use crate::shape::CollisionShape;

/// A type that describes parameters used when resolving kinematic bodies.
pub trait KinematicConfig {
    /// Number of fractional advances a body's velocity is split into per tick.
    const SUB_STEPS: usize;
    /// Decimal places velocity is rounded to at the end of a tick.
    const VELOCITY_PRECISION: i32;
    /// Decimal places edges are rounded to when deriving contact flags.
    const CONTACT_PRECISION: i32;
}

/// The suggested set of parameters to use when resolving kinematic bodies.
pub struct DefaultKinematicConfig {}

impl KinematicConfig for DefaultKinematicConfig {
    const SUB_STEPS: usize = 8;
    const VELOCITY_PRECISION: i32 = 4;
    const CONTACT_PRECISION: i32 = 3;
}

/// Which sides of a kinematic body touched something during the last tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contacts {
    pub on_floor: bool,
    pub on_ceiling: bool,
    pub on_left_wall: bool,
    pub on_right_wall: bool,
}

impl Contacts {
    pub fn on_wall(&self) -> bool {
        self.on_left_wall || self.on_right_wall
    }

    pub fn any(&self) -> bool {
        self.on_floor || self.on_ceiling || self.on_wall()
    }

    /// Sets the flag for every edge of mover that coincides with the opposite
    /// edge of collider and shares a segment with it. Rectangles meeting only
    /// at a corner set nothing. Flags are only ever set, never cleared.
    pub(crate) fn record(&mut self, mover: &Rect, collider: &Rect, decimals: i32) {
        let r = |n: f32| round_to(n, decimals);
        let (ml, mr, mt, mb) = (
            r(mover.left()),
            r(mover.right()),
            r(mover.top()),
            r(mover.bottom()),
        );
        let (cl, cr, ct, cb) = (
            r(collider.left()),
            r(collider.right()),
            r(collider.top()),
            r(collider.bottom()),
        );
        let across_x = ml < cr && mr > cl;
        let across_y = mt < cb && mb > ct;
        self.on_floor |= across_x && mb == ct;
        self.on_ceiling |= across_x && mt == cb;
        self.on_left_wall |= across_y && ml == cr;
        self.on_right_wall |= across_y && mr == cl;
    }
}

/// Motion state of a kinematic body.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Kinematic {
    /// Displacement per tick in the body's parent space.
    pub velocity: Vector2<f32>,
    /// Per axis coefficient applied to a velocity component that is
    /// resolved. Zero stops the body, one reflects it entirely.
    pub bounceback: Vector2<f32>,
    pub contacts: Contacts,
}

impl Kinematic {
    pub fn new(velocity: Vector2<f32>) -> Self {
        Kinematic {
            velocity,
            bounceback: Vector2::zero(),
            contacts: Contacts::default(),
        }
    }

    fn bounce_x(&mut self) {
        self.velocity.x = -self.velocity.x * self.bounceback.x;
    }

    fn bounce_y(&mut self) {
        self.velocity.y = -self.velocity.y * self.bounceback.y;
    }
}

impl Default for Kinematic {
    fn default() -> Self {
        Kinematic::new(Vector2::zero())
    }
}

/// The role a body plays in the simulation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BodyKind {
    /// Collides with kinematic bodies but is never moved.
    Static,
    /// Moves under its velocity and is pushed out of static and kinematic
    /// bodies.
    Kinematic(Kinematic),
    /// Reports overlaps without being collided against.
    Sensor,
}

/// An object in the world that owns collision shapes.
#[derive(Clone, Debug)]
pub struct Body {
    pub kind: BodyKind,
    /// Local transform of the body relative to its parent.
    pub transform: Transform,
    pub(crate) parent: Transform,
    pub(crate) attached: bool,
    pub(crate) shapes: SmallVec<[ShapeHandle; 4]>,
}

impl Body {
    pub fn new(kind: BodyKind, transform: Transform) -> Self {
        Body {
            kind,
            transform,
            parent: Transform::identity(),
            attached: false,
            shapes: SmallVec::new(),
        }
    }

    pub fn new_static(position: Vector2<f32>) -> Self {
        Body::new(BodyKind::Static, Transform::from_position(position))
    }

    pub fn new_kinematic(position: Vector2<f32>, velocity: Vector2<f32>) -> Self {
        Body::new(
            BodyKind::Kinematic(Kinematic::new(velocity)),
            Transform::from_position(position),
        )
    }

    pub fn new_sensor(position: Vector2<f32>) -> Self {
        Body::new(BodyKind::Sensor, Transform::from_position(position))
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_sensor(&self) -> bool {
        self.kind == BodyKind::Sensor
    }

    pub fn kinematic(&self) -> Option<&Kinematic> {
        match self.kind {
            BodyKind::Kinematic(ref k) => Some(k),
            _ => None,
        }
    }

    pub fn kinematic_mut(&mut self) -> Option<&mut Kinematic> {
        match self.kind {
            BodyKind::Kinematic(ref mut k) => Some(k),
            _ => None,
        }
    }

    /// Shapes currently owned by this body, in attachment order.
    pub fn shapes(&self) -> &[ShapeHandle] {
        &self.shapes
    }

    /// The transform inherited from the scene graph.
    pub fn parent_transform(&self) -> Transform {
        self.parent
    }

    pub fn global_transform(&self) -> Transform {
        self.parent.then(&self.transform)
    }
}

/// Advances a single kinematic body through one tick.
///
/// The body's velocity is split into `C::SUB_STEPS` advances. After every
/// advance each of the body's shapes is tested against every registered shape
/// belonging to another non-sensor body and pushed out of any overlap.
pub(crate) fn resolve_body<C: KinematicConfig>(
    bodies: &mut Pool<Body>,
    shapes: &Pool<CollisionShape>,
    registry: &Registry,
    handle: BodyHandle,
) {
    let (mut transform, parent, mut kinematic, own_shapes) = match bodies.get(handle.0) {
        Some(body) => match body.kind {
            BodyKind::Kinematic(k) => (body.transform, body.parent, k, body.shapes.clone()),
            _ => return,
        },
        None => return,
    };

    kinematic.contacts = Contacts::default();

    if !kinematic.velocity.is_zero() {
        let movers: SmallVec<[&CollisionShape; 4]> =
            own_shapes.iter().filter_map(|s| shapes.get(s.0)).collect();
        let steps = C::SUB_STEPS.max(1);
        for _ in 0..steps {
            transform.position +=
                kinematic.velocity.div_element_wise(parent.scale) / steps as f32;

            for (collider, collider_transform) in colliders(bodies, shapes, registry, handle) {
                for &mover in movers.iter() {
                    let mut pair = Pair {
                        mover,
                        collider,
                        collider_transform: &collider_transform,
                        parent: &parent,
                        transform: &mut transform,
                        kinematic: &mut kinematic,
                    };
                    if mover.is_box() && collider.is_box() {
                        pair.resolve_boxes();
                    } else {
                        pair.resolve_polygons();
                    }
                }
            }

            // Contacts are read once every pair has been resolved.
            let global = parent.then(&transform);
            for (collider, collider_transform) in colliders(bodies, shapes, registry, handle) {
                let c = collider.bounding_box(&collider_transform);
                for &mover in movers.iter() {
                    let m = mover.bounding_box(&global);
                    if rects_collide(&m, &c, true) {
                        kinematic.contacts.record(&m, &c, C::CONTACT_PRECISION);
                    }
                }
            }

            if kinematic.velocity.is_zero() {
                break;
            }
        }
    }

    kinematic.velocity.x = round_to(kinematic.velocity.x, C::VELOCITY_PRECISION);
    kinematic.velocity.y = round_to(kinematic.velocity.y, C::VELOCITY_PRECISION);

    if let Some(body) = bodies.get_mut(handle.0) {
        body.transform = transform;
        body.kind = BodyKind::Kinematic(kinematic);
    }
}

/// Registered shapes a body collides against along with their owners' global
/// transforms. Shapes of the body itself and of sensors are skipped.
fn colliders<'a>(
    bodies: &'a Pool<Body>,
    shapes: &'a Pool<CollisionShape>,
    registry: &'a Registry,
    handle: BodyHandle,
) -> impl Iterator<Item = (&'a CollisionShape, Transform)> + 'a {
    registry.iter().filter_map(move |s| {
        let collider = shapes.get(s.0)?;
        let owner = collider.owner.filter(|&owner| owner != handle)?;
        let body = bodies.get(owner.0).filter(|body| !body.is_sensor())?;
        Some((collider, body.global_transform()))
    })
}

/// A mover shape being resolved against a single collider shape.
struct Pair<'a> {
    mover: &'a CollisionShape,
    collider: &'a CollisionShape,
    collider_transform: &'a Transform,
    parent: &'a Transform,
    transform: &'a mut Transform,
    kinematic: &'a mut Kinematic,
}

impl<'a> Pair<'a> {
    fn mover_global(&self) -> Transform {
        self.parent.then(&*self.transform)
    }

    fn mover_rect(&self) -> Rect {
        self.mover.bounding_box(&self.mover_global())
    }

    fn collider_rect(&self) -> Rect {
        self.collider.bounding_box(self.collider_transform)
    }

    fn window_x(&self, m: &Rect, c: &Rect) -> f32 {
        difference_window(m.left(), m.right(), c.left(), c.right(), self.parent.scale.x)
    }

    fn window_y(&self, m: &Rect, c: &Rect) -> f32 {
        difference_window(m.top(), m.bottom(), c.top(), c.bottom(), self.parent.scale.y)
    }

    fn still_overlapping(&self, c: &Rect) -> bool {
        rects_collide(&self.mover_rect().inset(RESOLUTION_EPSILON), c, false)
    }

    fn resolve_x(&mut self, c: &Rect) {
        let window = self.window_x(&self.mover_rect(), c);
        self.transform.position.x += window;
        self.kinematic.bounce_x();
        trace!(axis = "x", offset = window, "resolved box contact");
    }

    fn resolve_y(&mut self, c: &Rect) {
        let window = self.window_y(&self.mover_rect(), c);
        self.transform.position.y += window;
        self.kinematic.bounce_y();
        trace!(axis = "y", offset = window, "resolved box contact");
    }

    /// Axis aligned path: the axis with the smaller penetration is resolved
    /// first, the other only if the boxes still overlap afterwards. Equal
    /// penetrations resolve along x.
    fn resolve_boxes(&mut self) {
        let c = self.collider_rect();
        if self.still_overlapping(&c) {
            let m = self.mover_rect();
            let (wx, wy) = (self.window_x(&m, &c), self.window_y(&m, &c));
            if wy.abs() < wx.abs() {
                self.resolve_y(&c);
                if self.still_overlapping(&c) {
                    self.resolve_x(&c);
                }
            } else {
                self.resolve_x(&c);
                if self.still_overlapping(&c) {
                    self.resolve_y(&c);
                }
            }
        }
    }

    /// General path through the separating axis test. The velocity component
    /// matching the dominant axis of the correction is resolved.
    fn resolve_polygons(&mut self) {
        let mover = self.mover.global_vertices(&self.mover_global());
        let collider = self.collider.global_vertices(self.collider_transform);
        if let Some(resolution) = resolution_for(&mover, &collider) {
            let offset = resolution.div_element_wise(self.parent.scale);
            self.transform.position += offset;
            if resolution.x.abs() > resolution.y.abs() {
                self.kinematic.bounce_x();
            } else {
                self.kinematic.bounce_y();
            }
            trace!(x = offset.x, y = offset.y, "resolved polygon contact");
        }
    }
}
