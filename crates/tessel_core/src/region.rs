//! Regions
//!
//! A [`Region`] is an area built from rectangles and paths combined with set
//! operations. Combinations are kept as a tree; simple cases (two rectangles
//! intersected, anything combined with an empty or infinite region) are
//! folded as they are built.

use crate::error::{GraphicsError, Result};
use crate::geometry::{Affine2D, Point, Rect};
use crate::path::Path;

/// Extent of the infinite region
pub const INFINITE_BOUNDS: Rect = Rect::new(-4194304.0, -4194304.0, 8388608.0, 8388608.0);

/// Set operation used when combining two regions.
///
/// Described as `current <op> operand`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CombineMode {
    /// The operand replaces the current area
    #[default]
    Replace = 0,
    Intersect = 1,
    Union = 2,
    Xor = 3,
    /// Current minus operand
    Exclude = 4,
    /// Operand minus current
    Complement = 5,
}

impl TryFrom<i32> for CombineMode {
    type Error = GraphicsError;

    fn try_from(raw: i32) -> Result<Self> {
        Ok(match raw {
            0 => CombineMode::Replace,
            1 => CombineMode::Intersect,
            2 => CombineMode::Union,
            3 => CombineMode::Xor,
            4 => CombineMode::Exclude,
            5 => CombineMode::Complement,
            _ => return Err(GraphicsError::InvalidParameter("unknown combine mode")),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Node {
    Empty,
    Infinite,
    Rect(Rect),
    Path(Path),
    Combined {
        mode: CombineMode,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// An area of the plane
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    node: Node,
}

impl Default for Region {
    fn default() -> Self {
        Self::infinite()
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

impl From<Path> for Region {
    fn from(path: Path) -> Self {
        Self::from_path(path)
    }
}

impl Region {
    /// The whole plane
    pub fn infinite() -> Self {
        Self { node: Node::Infinite }
    }

    pub fn empty() -> Self {
        Self { node: Node::Empty }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self {
            node: Node::Rect(rect),
        }
    }

    pub fn from_path(path: Path) -> Self {
        Self {
            node: Node::Path(path),
        }
    }

    pub fn set_infinite(&mut self) {
        self.node = Node::Infinite;
    }

    pub fn set_empty(&mut self) {
        self.node = Node::Empty;
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.node, Node::Infinite)
    }

    /// True when the region covers no area
    pub fn is_empty(&self) -> bool {
        match &self.node {
            Node::Empty => true,
            Node::Infinite => false,
            _ => self.bounds().is_empty(),
        }
    }

    /// Rectangle this region is made of, if it is a single one
    pub fn as_rect(&self) -> Option<Rect> {
        match self.node {
            Node::Rect(rect) => Some(rect),
            Node::Infinite => Some(INFINITE_BOUNDS),
            _ => None,
        }
    }

    /// Combine `other` into this region
    pub fn combine(&mut self, other: &Region, mode: CombineMode) {
        let current = std::mem::replace(&mut self.node, Node::Empty);
        self.node = combine_nodes(current, other.node.clone(), mode);
    }

    pub fn combine_rect(&mut self, rect: Rect, mode: CombineMode) {
        self.combine(&Region::from_rect(rect), mode);
    }

    pub fn combine_path(&mut self, path: &Path, mode: CombineMode) {
        self.combine(&Region::from_path(path.clone()), mode);
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        translate_node(&mut self.node, dx, dy);
    }

    /// Map the region through `transform`. Rectangles stay rectangles while
    /// the transform keeps axes aligned; otherwise they become paths.
    pub fn transform(&mut self, transform: &Affine2D) {
        if transform.is_identity() {
            return;
        }
        transform_node(&mut self.node, transform);
    }

    /// Copy of this region mapped through `transform`
    pub fn transformed(&self, transform: &Affine2D) -> Region {
        let mut region = self.clone();
        region.transform(transform);
        region
    }

    /// Bounding rectangle. Infinite regions report [`INFINITE_BOUNDS`].
    pub fn bounds(&self) -> Rect {
        node_bounds(&self.node)
    }

    pub fn contains(&self, point: Point) -> bool {
        node_contains(&self.node, point)
    }
}

fn combine_nodes(current: Node, operand: Node, mode: CombineMode) -> Node {
    use CombineMode::*;

    match (mode, current, operand) {
        (Replace, _, operand) => operand,

        (Intersect, Node::Empty, _) | (Intersect, _, Node::Empty) => Node::Empty,
        (Intersect, Node::Infinite, other) | (Intersect, other, Node::Infinite) => other,
        (Intersect, Node::Rect(a), Node::Rect(b)) => {
            let overlap = normalized(a).intersect(&normalized(b));
            if overlap.is_empty() {
                Node::Empty
            } else {
                Node::Rect(overlap)
            }
        }

        (Union, Node::Infinite, _) | (Union, _, Node::Infinite) => Node::Infinite,
        (Union | Xor, Node::Empty, other) | (Union | Xor, other, Node::Empty) => other,

        (Exclude, Node::Empty, _) | (Exclude, _, Node::Infinite) => Node::Empty,
        (Exclude, current, Node::Empty) => current,

        (Complement, _, Node::Empty) | (Complement, Node::Infinite, _) => Node::Empty,
        (Complement, Node::Empty, operand) => operand,

        (mode, left, right) => Node::Combined {
            mode,
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}

fn normalized(rect: Rect) -> Rect {
    Rect::from_points(
        rect.origin,
        Point::new(rect.right(), rect.bottom()),
    )
}

fn translate_node(node: &mut Node, dx: f32, dy: f32) {
    match node {
        Node::Empty | Node::Infinite => {}
        Node::Rect(rect) => *rect = rect.offset(dx, dy),
        Node::Path(path) => *path = path.transformed(&Affine2D::translation(dx, dy)),
        Node::Combined { left, right, .. } => {
            translate_node(left, dx, dy);
            translate_node(right, dx, dy);
        }
    }
}

fn transform_node(node: &mut Node, transform: &Affine2D) {
    match node {
        Node::Empty | Node::Infinite => {}
        Node::Rect(rect) => {
            if transform.preserves_axes() {
                *rect = transform.transform_rect_bounds(rect);
            } else {
                *node = Node::Path(Path::rect(*rect).transformed(transform));
            }
        }
        Node::Path(path) => *path = path.transformed(transform),
        Node::Combined { left, right, .. } => {
            transform_node(left, transform);
            transform_node(right, transform);
        }
    }
}

fn node_bounds(node: &Node) -> Rect {
    match node {
        Node::Empty => Rect::ZERO,
        Node::Infinite => INFINITE_BOUNDS,
        Node::Rect(rect) => normalized(*rect),
        Node::Path(path) => path.bounds(),
        Node::Combined { mode, left, right } => {
            let (l, r) = (node_bounds(left), node_bounds(right));
            match mode {
                CombineMode::Intersect => l.intersect(&r),
                CombineMode::Union | CombineMode::Xor => l.union(&r),
                CombineMode::Exclude => l,
                CombineMode::Complement | CombineMode::Replace => r,
            }
        }
    }
}

fn node_contains(node: &Node, point: Point) -> bool {
    match node {
        Node::Empty => false,
        Node::Infinite => true,
        Node::Rect(rect) => {
            let r = normalized(*rect);
            point.x >= r.x() && point.x < r.right() && point.y >= r.y() && point.y < r.bottom()
        }
        Node::Path(path) => path.contains(point),
        Node::Combined { mode, left, right } => {
            let (l, r) = (node_contains(left, point), node_contains(right, point));
            match mode {
                CombineMode::Intersect => l && r,
                CombineMode::Union => l || r,
                CombineMode::Xor => l != r,
                CombineMode::Exclude => l && !r,
                CombineMode::Complement => r && !l,
                CombineMode::Replace => r,
            }
        }
    }
}
