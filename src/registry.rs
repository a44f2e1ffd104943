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

use std::slice;

use tracing::{debug, warn};

use crate::error::CollisionError;
use crate::pool::ShapeHandle;
use crate::world::Validation;

/// The ordered set of shapes taking part in a world's simulation.
///
/// A shape is present exactly when the body owning it is attached to the
/// world. Membership only changes through the world's attach and detach calls.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    shapes: Vec<ShapeHandle>,
}

impl Registry {
    pub fn new() -> Self {
        Registry { shapes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn contains(&self, shape: ShapeHandle) -> bool {
        self.shapes.contains(&shape)
    }

    /// Iterates over registered shapes in registration order.
    pub fn iter(&self) -> slice::Iter<ShapeHandle> {
        self.shapes.iter()
    }

    pub(crate) fn register(
        &mut self,
        shape: ShapeHandle,
        validation: Validation,
    ) -> Result<(), CollisionError> {
        if validation.is_strict() && self.contains(shape) {
            return Err(CollisionError::AlreadyRegistered(shape));
        }
        debug!(?shape, "registering shape");
        self.shapes.push(shape);
        Ok(())
    }

    pub(crate) fn unregister(
        &mut self,
        shape: ShapeHandle,
        validation: Validation,
    ) -> Result<(), CollisionError> {
        match self.shapes.iter().position(|&s| s == shape) {
            Some(i) => {
                debug!(?shape, "unregistering shape");
                self.shapes.remove(i);
                Ok(())
            }
            None if validation.is_strict() => Err(CollisionError::NotRegistered(shape)),
            None => {
                warn!(?shape, "unregistering a shape that is not registered");
                Ok(())
            }
        }
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a ShapeHandle;
    type IntoIter = slice::Iter<'a, ShapeHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.shapes.iter()
    }
}

#[cfg(test)]
mod tests {
    mod registry {
        use crate::error::CollisionError;
        use crate::pool::ShapeHandle;
        use crate::registry::*;
        use crate::world::Validation;

        #[test]
        fn test_membership() {
            let mut registry = Registry::new();
            for i in 0..4 {
                registry.register(ShapeHandle(i), Validation::Strict).unwrap();
            }
            assert_eq!(registry.len(), 4);
            registry.unregister(ShapeHandle(1), Validation::Strict).unwrap();
            assert!(!registry.contains(ShapeHandle(1)));
            let order: Vec<usize> = registry.iter().map(|s| s.index()).collect();
            assert_eq!(order, vec![0, 2, 3]);
        }

        #[test]
        fn test_strict_rejects_misuse() {
            let mut registry = Registry::new();
            let shape = ShapeHandle(7);
            registry.register(shape, Validation::Strict).unwrap();
            assert_eq!(
                registry.register(shape, Validation::Strict),
                Err(CollisionError::AlreadyRegistered(shape))
            );
            assert_eq!(registry.len(), 1);
            registry.unregister(shape, Validation::Strict).unwrap();
            assert_eq!(
                registry.unregister(shape, Validation::Strict),
                Err(CollisionError::NotRegistered(shape))
            );
            assert!(registry.is_empty());
        }

        #[test]
        fn test_trusting_tolerates_misuse() {
            let mut registry = Registry::new();
            let shape = ShapeHandle(3);
            assert_eq!(registry.unregister(shape, Validation::Trusting), Ok(()));
            registry.register(shape, Validation::Trusting).unwrap();
            assert_eq!(registry.register(shape, Validation::Trusting), Ok(()));
            assert_eq!(registry.len(), 2);
        }
    }
}
