// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node positions and their placement on backend drawables.

use kurbo::{Affine, Point};

use crate::backend::Backend;

/// Where a node sits relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position(pub Point);

impl Position {
    /// The parent's origin.
    pub const ZERO: Self = Self(Point::ZERO);

    /// Creates a position at `(x, y)`.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self(Point::new(x, y))
    }

    /// Returns the horizontal offset.
    #[inline]
    #[must_use]
    pub const fn x(self) -> f64 {
        self.0.x
    }

    /// Returns the vertical offset.
    #[inline]
    #[must_use]
    pub const fn y(self) -> f64 {
        self.0.y
    }

    /// Returns the local transform that places a drawable at this position.
    #[must_use]
    pub fn to_affine(self) -> Affine {
        Affine::translate(self.0.to_vec2())
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Self(point)
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Places `drawable` at `position` using the backend's native transform.
pub fn assign_position<B: Backend>(backend: &mut B, drawable: &B::Drawable, position: Position) {
    backend.set_transform(drawable, position.to_affine());
}
