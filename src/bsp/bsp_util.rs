// src/bsp/bsp_util.rs
// Geometry and other helper functions specific to BSP.

use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bsp::{ASPECT_LIMIT, EPSILON};
use crate::config::RoomConfig;
use crate::error::RoomError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Point2D { x, y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Direction of the cut made by [`Rect2D::split_along`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitAxis {
    /// Cut parallel to the width: bottom and top halves sharing the full width.
    Horizontal,
    /// Cut parallel to the height: left and right halves sharing the full height.
    Vertical,
}

/// An axis-aligned rectangle stored as origin plus extent.
///
/// `origin` is the minimum corner. Width and height are never negative;
/// [`Rect2D::from_edges`] normalizes swapped edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect2D {
    pub origin: Point2D,
    pub width: f64,
    pub height: f64,
}

impl Rect2D {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        debug_assert!(width >= 0.0 && height >= 0.0, "negative extent {width}x{height}");
        Rect2D {
            origin: Point2D::new(x, y),
            width,
            height,
        }
    }

    /// Build a rectangle from two x edges and two y edges given in any order.
    pub fn from_edges(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Rect2D::new(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs())
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.width
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.height
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(
            self.origin.x + self.width / 2.0,
            self.origin.y + self.height / 2.0,
        )
    }

    /// Closed-interval contact test with a passable join: shared edges count,
    /// but the rectangles must overlap by more than `EPSILON` on at least one
    /// axis, so a lone shared corner does not.
    pub fn touches(&self, other: &Rect2D) -> bool {
        let overlap_x = self.max_x().min(other.max_x()) - self.min_x().max(other.min_x());
        let overlap_y = self.max_y().min(other.max_y()) - self.min_y().max(other.min_y());
        overlap_x >= -EPSILON
            && overlap_y >= -EPSILON
            && (overlap_x > EPSILON || overlap_y > EPSILON)
    }

    pub fn contains_rect(&self, other: &Rect2D) -> bool {
        other.min_x() >= self.min_x() - EPSILON
            && other.max_x() <= self.max_x() + EPSILON
            && other.min_y() >= self.min_y() - EPSILON
            && other.max_y() <= self.max_y() + EPSILON
    }

    /// Smallest distance between `inner` and any of the four walls of `self`.
    pub fn clearance_to(&self, inner: &Rect2D) -> f64 {
        let left = inner.min_x() - self.min_x();
        let right = self.max_x() - inner.max_x();
        let bottom = inner.min_y() - self.min_y();
        let top = self.max_y() - inner.max_y();
        left.min(right).min(bottom).min(top)
    }

    /// Pick the cut direction. Very wide or very tall rectangles are always
    /// cut across their long side; anything else is a coin flip.
    pub fn split_axis<R: Rng + ?Sized>(&self, rng: &mut R) -> SplitAxis {
        if self.width > ASPECT_LIMIT * self.height {
            SplitAxis::Vertical
        } else if self.height > ASPECT_LIMIT * self.width {
            SplitAxis::Horizontal
        } else if rng.random_bool(0.5) {
            SplitAxis::Horizontal
        } else {
            SplitAxis::Vertical
        }
    }

    /// Halve the rectangle in a randomly chosen (aspect-constrained) direction.
    pub fn split<R: Rng + ?Sized>(&self, rng: &mut R) -> (Rect2D, Rect2D) {
        self.split_along(self.split_axis(rng))
    }

    pub fn split_along(&self, axis: SplitAxis) -> (Rect2D, Rect2D) {
        let Point2D { x, y } = self.origin;
        match axis {
            SplitAxis::Horizontal => {
                let half = self.height / 2.0;
                (
                    Rect2D::new(x, y, self.width, half),
                    Rect2D::new(x, y + half, self.width, half),
                )
            }
            SplitAxis::Vertical => {
                let half = self.width / 2.0;
                (
                    Rect2D::new(x, y, half, self.height),
                    Rect2D::new(x + half, y, half, self.height),
                )
            }
        }
    }

    fn accepts_room(&self, room: &Rect2D, rules: &RoomConfig) -> bool {
        room.area() >= rules.min_area_fraction * self.area()
            && room.width >= rules.min_width
            && room.height >= rules.min_height
            && self.clearance_to(room) >= rules.wall_clearance
    }

    /// Whether some integer-cornered rectangle inside `self` satisfies `rules`.
    ///
    /// The sampler only produces lattice rectangles, so the largest candidate
    /// is the one spanning the innermost lattice lines that still respect
    /// the wall clearance.
    pub fn can_hold_room(&self, rules: &RoomConfig) -> bool {
        let left = (self.min_x() + rules.wall_clearance).ceil();
        let right = (self.max_x() - rules.wall_clearance).floor();
        let bottom = (self.min_y() + rules.wall_clearance).ceil();
        let top = (self.max_y() - rules.wall_clearance).floor();
        let width = right - left;
        let height = top - bottom;
        width >= rules.min_width
            && height >= rules.min_height
            && width * height >= rules.min_area_fraction * self.area()
    }

    /// Sample a room: a random lattice rectangle inside `self` that covers at
    /// least `min_area_fraction` of the cell, meets the minimum extents and
    /// keeps `wall_clearance` away from every wall.
    ///
    /// Candidates are drawn by picking a random corner inside the cell and a
    /// random extent up to the far walls; rejected candidates are redrawn
    /// up to `rules.max_attempts` times.
    pub fn random_sub_area<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        rules: &RoomConfig,
    ) -> Result<Rect2D, RoomError> {
        if !self.can_hold_room(rules) {
            return Err(RoomError::CellTooSmall { cell: *self });
        }

        let x_lo = self.min_x().floor() as i64;
        let x_hi = self.max_x().floor() as i64;
        let y_lo = self.min_y().floor() as i64;
        let y_hi = self.max_y().floor() as i64;

        for attempt in 1..=rules.max_attempts {
            let x = rng.random_range(x_lo..=x_hi);
            let y = rng.random_range(y_lo..=y_hi);
            let w_hi = ((self.max_x() - x as f64).floor() as i64).max(0);
            let h_hi = ((self.max_y() - y as f64).floor() as i64).max(0);
            let w = rng.random_range(0..=w_hi);
            let h = rng.random_range(0..=h_hi);

            let candidate = Rect2D::new(x as f64, y as f64, w as f64, h as f64);
            if self.accepts_room(&candidate, rules) {
                trace!("room {:?} accepted after {} samples", candidate, attempt);
                return Ok(candidate);
            }
        }

        Err(RoomError::AttemptsExhausted {
            cell: *self,
            attempts: rules.max_attempts,
        })
    }
}
