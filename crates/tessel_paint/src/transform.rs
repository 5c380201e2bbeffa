//! World and clip-space transforms
//!
//! A context keeps its world transform together with a clip-space matrix
//! that tracks the inverse of everything applied since the clip was last
//! reset. Clip shapes are stored in clip space, so a later transform change
//! does not move a clip that was set before it.
//!
//! Every mutator re-projects the device bounds through the clip-space
//! matrix once both matrices are updated.

use tessel_core::{Affine2D, GraphicsError, MatrixOrder, Point, Rect, Result};

/// Effective world transform, its clip-space inverse and the container
/// baseline
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformPair {
    effective: Affine2D,
    clip_space: Affine2D,
    baseline: Affine2D,
}

impl TransformPair {
    pub fn new() -> Self {
        Self::default()
    }

    /// The composed world transform applied to drawing
    pub fn effective(&self) -> &Affine2D {
        &self.effective
    }

    /// Inverse of everything applied since the last clip reset
    pub fn clip_space(&self) -> &Affine2D {
        &self.clip_space
    }

    /// Transform recorded when the current container was entered
    pub fn baseline(&self) -> &Affine2D {
        &self.baseline
    }

    /// World transform as callers see it: relative to the innermost
    /// container's baseline
    pub fn world(&self) -> Affine2D {
        if self.baseline.is_identity() {
            return self.effective;
        }
        match self.baseline.invert() {
            Some(inverse) => self.effective.multiply(&inverse, MatrixOrder::Append),
            None => self.effective,
        }
    }

    /// Replace the world transform. The identity resets.
    pub fn set(&mut self, matrix: &Affine2D, bounds: &mut Rect) -> Result<()> {
        if matrix.is_identity() {
            self.reset(bounds);
            return Ok(());
        }
        let inverse = matrix
            .invert()
            .ok_or(GraphicsError::InvalidParameter("world transform is not invertible"))?;
        self.commit(*matrix, inverse, bounds)
    }

    pub fn multiply(&mut self, matrix: &Affine2D, order: MatrixOrder, bounds: &mut Rect) -> Result<()> {
        let inverse = matrix
            .invert()
            .ok_or(GraphicsError::InvalidParameter("matrix is not invertible"))?;

        self.commit(
            self.effective.multiply(matrix, order),
            self.clip_space.multiply(&inverse, order.reversed()),
            bounds,
        )
    }

    /// Rotate by `angle` degrees
    pub fn rotate(&mut self, angle: f32, order: MatrixOrder, bounds: &mut Rect) -> Result<()> {
        self.commit(
            self.effective.rotate(angle, order),
            self.clip_space.rotate(-angle, order.reversed()),
            bounds,
        )
    }

    pub fn scale(&mut self, sx: f32, sy: f32, order: MatrixOrder, bounds: &mut Rect) -> Result<()> {
        if sx == 0.0 || sy == 0.0 {
            return Err(GraphicsError::InvalidParameter("scale factors must be non-zero"));
        }
        self.commit(
            self.effective.scale(sx, sy, order),
            self.clip_space.scale(1.0 / sx, 1.0 / sy, order.reversed()),
            bounds,
        )
    }

    pub fn translate(&mut self, dx: f32, dy: f32, order: MatrixOrder, bounds: &mut Rect) -> Result<()> {
        self.commit(
            self.effective.translate(dx, dy, order),
            self.clip_space.translate(-dx, -dy, order.reversed()),
            bounds,
        )
    }

    /// Install both candidates, or neither when either is singular or
    /// not finite
    fn commit(&mut self, effective: Affine2D, clip_space: Affine2D, bounds: &mut Rect) -> Result<()> {
        if !is_usable(&effective) || !is_usable(&clip_space) {
            return Err(GraphicsError::InvalidParameter("transform is not invertible"));
        }
        self.effective = effective;
        self.clip_space = clip_space;
        *bounds = reproject(bounds, &self.clip_space);
        Ok(())
    }

    /// Undo every world change: bounds go back through the inverted clip
    /// space, then both matrices become the identity.
    pub fn reset(&mut self, bounds: &mut Rect) {
        if let Some(inverse) = self.clip_space.invert() {
            *bounds = reproject(bounds, &inverse);
        }
        self.effective = Affine2D::IDENTITY;
        self.clip_space = Affine2D::IDENTITY;
    }

    /// Clip-space matrix back to identity, leaving the world transform
    pub fn reset_clip_space(&mut self) {
        self.clip_space = Affine2D::IDENTITY;
    }

    /// Start a container: the current transform becomes the baseline
    pub fn enter_container(&mut self) {
        self.baseline = self.effective;
    }
}

/// Invertible with every element finite
fn is_usable(matrix: &Affine2D) -> bool {
    matrix.is_invertible() && matrix.elements.iter().all(|e| e.is_finite())
}

/// Map the two opposite corners of `bounds` through `matrix` and take the
/// min/max. Width and height are rounded to whole units.
fn reproject(bounds: &Rect, matrix: &Affine2D) -> Rect {
    let a = matrix.transform_point(bounds.origin);
    let b = matrix.transform_point(Point::new(bounds.right(), bounds.bottom()));
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    let width = (a.x.max(b.x) - x).round();
    let height = (a.y.max(b.y) - y).round();
    Rect::new(x, y, width, height)
}
