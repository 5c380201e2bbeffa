//! Validated drawing commands
//!
//! Drawing operations are reduced to a [`DrawCommand`] once their arguments
//! pass validation. An immediate surface turns the shape into a path and
//! strokes or fills it; a recording stores the command as is.

use smallvec::SmallVec;
use tessel_core::{Brush, Color, FillMode, Path, Pen, Point, Rect, Region};

/// Geometry of a drawing command
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Connected line segments
    Lines(Vec<Point>),
    Arc {
        rect: Rect,
        start_angle: f32,
        sweep_angle: f32,
    },
    /// Start point followed by groups of three
    Beziers(Vec<Point>),
    Ellipse(Rect),
    Pie {
        rect: Rect,
        start_angle: f32,
        sweep_angle: f32,
    },
    Polygon {
        points: Vec<Point>,
        fill_mode: FillMode,
    },
    Rectangles(SmallVec<[Rect; 4]>),
    /// Open cardinal spline over `segments` segments from `offset`
    Curve {
        points: Vec<Point>,
        offset: usize,
        segments: usize,
        tension: f32,
    },
    ClosedCurve {
        points: Vec<Point>,
        tension: f32,
        fill_mode: FillMode,
    },
    Path(Path),
}

impl Shape {
    /// Path outlining this shape
    pub fn to_path(&self) -> Path {
        match self {
            Shape::Lines(points) => Path::polyline(points),
            Shape::Arc {
                rect,
                start_angle,
                sweep_angle,
            } => Path::arc(*rect, *start_angle, *sweep_angle),
            Shape::Beziers(points) => Path::beziers(points),
            Shape::Ellipse(rect) => Path::ellipse(*rect),
            Shape::Pie {
                rect,
                start_angle,
                sweep_angle,
            } => Path::pie(*rect, *start_angle, *sweep_angle),
            Shape::Polygon { points, fill_mode } => {
                Path::polygon(points).with_fill_mode(*fill_mode)
            }
            Shape::Rectangles(rects) => Path::rects(rects),
            Shape::Curve {
                points,
                offset,
                segments,
                tension,
            } => Path::curve(points, *offset, *segments, *tension),
            Shape::ClosedCurve {
                points,
                tension,
                fill_mode,
            } => Path::closed_curve(points, *tension).with_fill_mode(*fill_mode),
            Shape::Path(path) => path.clone(),
        }
    }
}

/// A drawing instruction
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Outline a shape
    Stroke { pen: Pen, shape: Shape },
    /// Fill a shape's interior
    Fill { brush: Brush, shape: Shape },
    FillRegion { brush: Brush, region: Region },
    /// Clear the whole surface
    Clear(Color),
}
