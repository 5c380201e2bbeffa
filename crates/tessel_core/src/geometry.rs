//! Geometry primitives
//!
//! Points, sizes, rectangles and the 2×3 affine matrix used for world,
//! page and clip-space transforms. Matrices follow the row-vector
//! convention: a point maps to `(m11·x + m21·y + dx, m12·x + m22·y + dy)`.

use crate::error::{GraphicsError, Result};

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Rect of this size at the origin
    pub const fn to_rect(self) -> Rect {
        Rect {
            origin: Point::ZERO,
            size: self,
        }
    }
}

impl From<Size> for Rect {
    fn from(size: Size) -> Self {
        size.to_rect()
    }
}

/// 2D rectangle
///
/// Extents may be negative; callers that need a normalized rect go through
/// [`Rect::from_points`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Create a normalized rect spanning two corner points
    pub fn from_points(p1: Point, p2: Point) -> Self {
        let min_x = p1.x.min(p2.x);
        let min_y = p1.y.min(p2.y);
        let max_x = p1.x.max(p2.x);
        let max_y = p1.y.max(p2.y);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    /// True when the rect covers no area
    pub fn is_empty(&self) -> bool {
        self.size.width <= 0.0 || self.size.height <= 0.0
    }

    /// Inclusive point test (edges count as inside)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.x <= self.right()
            && point.y >= self.origin.y
            && point.y <= self.bottom()
    }

    /// Offset the rect by a delta
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Rect {
            origin: Point::new(self.origin.x + dx, self.origin.y + dy),
            size: self.size,
        }
    }

    /// Overlap of two rects; width and height are clamped to zero when disjoint
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x().max(other.x());
        let y = self.y().max(other.y());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect::new(x, y, (right - x).max(0.0), (bottom - y).max(0.0))
    }

    /// Smallest rect covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x().min(other.x());
        let y = self.y().min(other.y());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// The four corners, clockwise from the origin
    pub fn corners(&self) -> [Point; 4] {
        [
            self.origin,
            Point::new(self.right(), self.y()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x(), self.bottom()),
        ]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Affine Transform
// ─────────────────────────────────────────────────────────────────────────────

/// Where a new operation lands relative to an existing transform
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum MatrixOrder {
    /// The new operation is applied before the existing transform
    #[default]
    Prepend = 0,
    /// The new operation is applied after the existing transform
    Append = 1,
}

impl MatrixOrder {
    /// The opposite order
    pub fn reversed(self) -> Self {
        match self {
            MatrixOrder::Prepend => MatrixOrder::Append,
            MatrixOrder::Append => MatrixOrder::Prepend,
        }
    }
}

impl TryFrom<i32> for MatrixOrder {
    type Error = GraphicsError;

    fn try_from(raw: i32) -> Result<Self> {
        match raw {
            0 => Ok(MatrixOrder::Prepend),
            1 => Ok(MatrixOrder::Append),
            _ => Err(GraphicsError::InvalidParameter("unknown matrix order")),
        }
    }
}

/// 2D affine transform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine2D {
    /// Matrix elements [m11, m12, m21, m22, dx, dy]
    /// | m11  m21  dx |
    /// | m12  m22  dy |
    /// |  0    0    1 |
    pub elements: [f32; 6],
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2D {
    pub const IDENTITY: Affine2D = Affine2D {
        elements: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub const fn new(m11: f32, m12: f32, m21: f32, m22: f32, dx: f32, dy: f32) -> Self {
        Self {
            elements: [m11, m12, m21, m22, dx, dy],
        }
    }

    pub fn translation(x: f32, y: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `degrees`, clockwise in a y-down space
    pub fn rotation(degrees: f32) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    pub fn transform_point(&self, point: Point) -> Point {
        let [a, b, c, d, tx, ty] = self.elements;
        Point::new(
            a * point.x + c * point.y + tx,
            b * point.x + d * point.y + ty,
        )
    }

    /// Transform a direction, ignoring translation
    pub fn transform_vector(&self, vector: Point) -> Point {
        let [a, b, c, d, _, _] = self.elements;
        Point::new(a * vector.x + c * vector.y, b * vector.x + d * vector.y)
    }

    /// Concatenate this transform with another (self * other)
    /// The resulting transform first applies `other`, then `self`.
    pub fn then(&self, other: &Affine2D) -> Affine2D {
        let [a1, b1, c1, d1, tx1, ty1] = self.elements;
        let [a2, b2, c2, d2, tx2, ty2] = other.elements;

        Affine2D {
            elements: [
                a1 * a2 + c1 * b2,
                b1 * a2 + d1 * b2,
                a1 * c2 + c1 * d2,
                b1 * c2 + d1 * d2,
                a1 * tx2 + c1 * ty2 + tx1,
                b1 * tx2 + d1 * ty2 + ty1,
            ],
        }
    }

    /// Combine `op` into this transform.
    ///
    /// With [`MatrixOrder::Prepend`] `op` acts on points before `self` does;
    /// with [`MatrixOrder::Append`] it acts after.
    pub fn multiply(&self, op: &Affine2D, order: MatrixOrder) -> Affine2D {
        match order {
            MatrixOrder::Prepend => self.then(op),
            MatrixOrder::Append => op.then(self),
        }
    }

    pub fn translate(&self, dx: f32, dy: f32, order: MatrixOrder) -> Affine2D {
        self.multiply(&Affine2D::translation(dx, dy), order)
    }

    pub fn scale(&self, sx: f32, sy: f32, order: MatrixOrder) -> Affine2D {
        self.multiply(&Affine2D::scaling(sx, sy), order)
    }

    pub fn rotate(&self, degrees: f32, order: MatrixOrder) -> Affine2D {
        self.multiply(&Affine2D::rotation(degrees), order)
    }

    pub fn determinant(&self) -> f32 {
        let [a, b, c, d, _, _] = self.elements;
        a * d - b * c
    }

    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det != 0.0 && det.is_finite()
    }

    /// Inverse transform, `None` when singular
    pub fn invert(&self) -> Option<Affine2D> {
        if !self.is_invertible() {
            return None;
        }
        let [a, b, c, d, tx, ty] = self.elements;
        let inv = 1.0 / self.determinant();
        Some(Affine2D::new(
            d * inv,
            -b * inv,
            -c * inv,
            a * inv,
            (c * ty - d * tx) * inv,
            (b * tx - a * ty) * inv,
        ))
    }

    /// Exact comparison against the identity
    pub fn is_identity(&self) -> bool {
        self.elements == Self::IDENTITY.elements
    }

    /// True when the transform keeps axis-aligned rects axis-aligned
    pub fn preserves_axes(&self) -> bool {
        let [_, b, c, _, _, _] = self.elements;
        b == 0.0 && c == 0.0
    }

    /// Axis-aligned bounds of a transformed rect
    pub fn transform_rect_bounds(&self, rect: &Rect) -> Rect {
        let corners = rect.corners().map(|p| self.transform_point(p));
        let mut min = corners[0];
        let mut max = corners[0];
        for p in &corners[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Rect::from_points(min, max)
    }
}
