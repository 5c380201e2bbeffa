//! Vector paths
//!
//! A [`Path`] is a list of move/line/curve commands plus the fill rule used
//! when it is filled or used as a clip. Arcs, ellipses, pies and cardinal
//! splines are converted to cubic Béziers as they are appended.

use std::f32::consts::PI;

use smallvec::SmallVec;

use crate::error::{GraphicsError, Result};
use crate::geometry::{Affine2D, Point, Rect};

/// Line segments per curve when flattening
const FLATTEN_STEPS: usize = 16;

/// Tension used by curve operations that take none
pub const DEFAULT_TENSION: f32 = 0.5;

/// A flattened subpath
pub type Polyline = SmallVec<[Point; 16]>;

/// Rule deciding which points are inside a self-intersecting path
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum FillMode {
    /// Even-odd rule
    #[default]
    Alternate = 0,
    /// Non-zero winding rule
    Winding = 1,
}

impl TryFrom<i32> for FillMode {
    type Error = GraphicsError;

    fn try_from(raw: i32) -> Result<Self> {
        match raw {
            0 => Ok(FillMode::Alternate),
            1 => Ok(FillMode::Winding),
            _ => Err(GraphicsError::InvalidParameter("unknown fill mode")),
        }
    }
}

/// Path command for vector drawing
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo {
        control: Point,
        end: Point,
    },
    CubicTo {
        control1: Point,
        control2: Point,
        end: Point,
    },
    Close,
}

/// A vector path
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
    fill_mode: FillMode,
}

impl Path {
    /// Create a new empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a path from a vector of commands
    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        Self {
            commands,
            fill_mode: FillMode::default(),
        }
    }

    pub fn with_fill_mode(mut self, fill_mode: FillMode) -> Self {
        self.fill_mode = fill_mode;
        self
    }

    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }

    /// Move to a point
    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        self.commands.push(PathCommand::MoveTo(Point::new(x, y)));
        self
    }

    /// Line to a point
    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        self.commands.push(PathCommand::LineTo(Point::new(x, y)));
        self
    }

    /// Quadratic Bézier curve
    pub fn quad_to(mut self, cx: f32, cy: f32, x: f32, y: f32) -> Self {
        self.commands.push(PathCommand::QuadTo {
            control: Point::new(cx, cy),
            end: Point::new(x, y),
        });
        self
    }

    /// Cubic Bézier curve
    pub fn cubic_to(mut self, cx1: f32, cy1: f32, cx2: f32, cy2: f32, x: f32, y: f32) -> Self {
        self.commands.push(PathCommand::CubicTo {
            control1: Point::new(cx1, cy1),
            control2: Point::new(cx2, cy2),
            end: Point::new(x, y),
        });
        self
    }

    /// Close the current figure
    pub fn close(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// Create a rectangle path
    pub fn rect(rect: Rect) -> Self {
        Self::new()
            .move_to(rect.x(), rect.y())
            .line_to(rect.right(), rect.y())
            .line_to(rect.right(), rect.bottom())
            .line_to(rect.x(), rect.bottom())
            .close()
    }

    /// Create a path with one closed rectangle figure per rect
    pub fn rects(rects: &[Rect]) -> Self {
        let mut path = Self::new();
        for rect in rects {
            path.commands.extend_from_slice(Self::rect(*rect).commands());
        }
        path
    }

    /// Open polyline through `points`
    pub fn polyline(points: &[Point]) -> Self {
        let mut path = Self::new();
        for (i, p) in points.iter().enumerate() {
            path.commands.push(if i == 0 {
                PathCommand::MoveTo(*p)
            } else {
                PathCommand::LineTo(*p)
            });
        }
        path
    }

    /// Closed polygon through `points`
    pub fn polygon(points: &[Point]) -> Self {
        let path = Self::polyline(points);
        if path.is_empty() {
            path
        } else {
            path.close()
        }
    }

    /// Ellipse inscribed in `rect`
    pub fn ellipse(rect: Rect) -> Self {
        let mut path = Self::new();
        path.push_arc(rect, 0.0, 360.0, false);
        path.close()
    }

    /// Open elliptical arc. Angles are in degrees, clockwise from the x axis.
    pub fn arc(rect: Rect, start_angle: f32, sweep_angle: f32) -> Self {
        let mut path = Self::new();
        path.push_arc(rect, start_angle, sweep_angle, false);
        path
    }

    /// Closed wedge from the ellipse center along an arc
    pub fn pie(rect: Rect, start_angle: f32, sweep_angle: f32) -> Self {
        let center_x = rect.x() + rect.width() / 2.0;
        let center_y = rect.y() + rect.height() / 2.0;
        let mut path = Self::new().move_to(center_x, center_y);
        path.push_arc(rect, start_angle, sweep_angle, true);
        path.close()
    }

    /// Chain of cubic Béziers: a start point followed by groups of three.
    /// A trailing partial group is ignored.
    pub fn beziers(points: &[Point]) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return Self::new();
        };
        let mut path = Self::new().move_to(first.x, first.y);
        for group in rest.chunks_exact(3) {
            path = path.cubic_to(
                group[0].x, group[0].y, group[1].x, group[1].y, group[2].x, group[2].y,
            );
        }
        path
    }

    /// Open cardinal spline through `points`, drawing `segments` segments
    /// starting at `offset`.
    pub fn curve(points: &[Point], offset: usize, segments: usize, tension: f32) -> Self {
        let count = points.len();
        if count == 0 || offset >= count {
            return Self::new();
        }
        let tangents = curve_tangents(points, tension, false);
        let end = (offset + segments).min(count - 1);

        let start = points[offset];
        let mut path = Self::new().move_to(start.x, start.y);
        for i in offset..end {
            path = path.spline_segment(points, &tangents, i, i + 1);
        }
        path
    }

    /// Closed cardinal spline through `points`
    pub fn closed_curve(points: &[Point], tension: f32) -> Self {
        let count = points.len();
        if count == 0 {
            return Self::new();
        }
        let tangents = curve_tangents(points, tension, true);

        let start = points[0];
        let mut path = Self::new().move_to(start.x, start.y);
        for i in 0..count {
            path = path.spline_segment(points, &tangents, i, (i + 1) % count);
        }
        path.close()
    }

    /// Get the path commands
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Check if the path is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Bounding rectangle of every point and control point
    pub fn bounds(&self) -> Rect {
        let mut points = self.commands.iter().flat_map(command_points);
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        let (min, max) = points.fold((first, first), |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        });
        Rect::from_points(min, max)
    }

    /// Copy of this path with every point mapped through `transform`
    pub fn transformed(&self, transform: &Affine2D) -> Path {
        let map = |p: Point| transform.transform_point(p);
        let commands = self
            .commands
            .iter()
            .map(|cmd| match *cmd {
                PathCommand::MoveTo(p) => PathCommand::MoveTo(map(p)),
                PathCommand::LineTo(p) => PathCommand::LineTo(map(p)),
                PathCommand::QuadTo { control, end } => PathCommand::QuadTo {
                    control: map(control),
                    end: map(end),
                },
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => PathCommand::CubicTo {
                    control1: map(control1),
                    control2: map(control2),
                    end: map(end),
                },
                PathCommand::Close => PathCommand::Close,
            })
            .collect();
        Path {
            commands,
            fill_mode: self.fill_mode,
        }
    }

    /// Approximate every figure with line segments
    pub fn flatten(&self) -> Vec<Polyline> {
        let mut figures = Vec::new();
        let mut current = Polyline::new();
        let mut start = Point::ZERO;
        let mut last = Point::ZERO;

        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) => {
                    if current.len() > 1 {
                        figures.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(p);
                    start = p;
                    last = p;
                }
                PathCommand::LineTo(p) => {
                    if current.is_empty() {
                        current.push(last);
                    }
                    current.push(p);
                    last = p;
                }
                PathCommand::QuadTo { control, end } => {
                    if current.is_empty() {
                        current.push(last);
                    }
                    for step in 1..=FLATTEN_STEPS {
                        let t = step as f32 / FLATTEN_STEPS as f32;
                        let u = 1.0 - t;
                        current.push(Point::new(
                            u * u * last.x + 2.0 * u * t * control.x + t * t * end.x,
                            u * u * last.y + 2.0 * u * t * control.y + t * t * end.y,
                        ));
                    }
                    last = end;
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => {
                    if current.is_empty() {
                        current.push(last);
                    }
                    for step in 1..=FLATTEN_STEPS {
                        let t = step as f32 / FLATTEN_STEPS as f32;
                        let u = 1.0 - t;
                        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
                        current.push(Point::new(
                            a * last.x + b * control1.x + c * control2.x + d * end.x,
                            a * last.y + b * control1.y + c * control2.y + d * end.y,
                        ));
                    }
                    last = end;
                }
                PathCommand::Close => {
                    if current.len() > 1 {
                        figures.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    last = start;
                }
            }
        }
        if current.len() > 1 {
            figures.push(current);
        }
        figures
    }

    /// Point-in-path test using the path's fill mode; open figures are
    /// treated as closed.
    pub fn contains(&self, point: Point) -> bool {
        let mut crossings = 0u32;
        let mut winding = 0i32;

        for figure in self.flatten() {
            let n = figure.len();
            for i in 0..n {
                let a = figure[i];
                let b = figure[(i + 1) % n];
                if (a.y <= point.y) == (b.y <= point.y) {
                    continue;
                }
                let t = (point.y - a.y) / (b.y - a.y);
                if point.x < a.x + t * (b.x - a.x) {
                    crossings += 1;
                    winding += if b.y > a.y { 1 } else { -1 };
                }
            }
        }

        match self.fill_mode {
            FillMode::Alternate => crossings % 2 == 1,
            FillMode::Winding => winding != 0,
        }
    }

    fn spline_segment(self, points: &[Point], tangents: &[Point], i: usize, j: usize) -> Self {
        let (p0, p1) = (points[i], points[j]);
        let (t0, t1) = (tangents[i], tangents[j]);
        self.cubic_to(
            p0.x + t0.x,
            p0.y + t0.y,
            p1.x - t1.x,
            p1.y - t1.y,
            p1.x,
            p1.y,
        )
    }

    /// Append an arc as cubic segments of at most 90 degrees. With `connect`
    /// the arc is joined to the current point by a line instead of starting
    /// a new figure.
    fn push_arc(&mut self, rect: Rect, start_angle: f32, sweep_angle: f32, connect: bool) {
        let sweep = sweep_angle.clamp(-360.0, 360.0);
        let segments = ((sweep.abs() / 90.0).ceil() as usize).max(1);
        let step = sweep / segments as f32;

        let rx = rect.width() / 2.0;
        let ry = rect.height() / 2.0;
        let center = Point::new(rect.x() + rx, rect.y() + ry);

        for i in 0..segments {
            let from = start_angle + step * i as f32;
            let to = from + step;
            let (start, control1, control2, end) = arc_segment(center, rx, ry, from, to);
            if i == 0 {
                self.commands.push(if connect {
                    PathCommand::LineTo(start)
                } else {
                    PathCommand::MoveTo(start)
                });
            }
            self.commands.push(PathCommand::CubicTo {
                control1,
                control2,
                end,
            });
        }
    }
}

fn command_points(cmd: &PathCommand) -> SmallVec<[Point; 3]> {
    match *cmd {
        PathCommand::MoveTo(p) | PathCommand::LineTo(p) => smallvec::smallvec![p],
        PathCommand::QuadTo { control, end } => smallvec::smallvec![control, end],
        PathCommand::CubicTo {
            control1,
            control2,
            end,
        } => smallvec::smallvec![control1, control2, end],
        PathCommand::Close => SmallVec::new(),
    }
}

/// Cardinal spline tangents scaled by `tension / 3`
fn curve_tangents(points: &[Point], tension: f32, closed: bool) -> SmallVec<[Point; 16]> {
    let count = points.len();
    let coefficient = tension / 3.0;
    (0..count)
        .map(|i| {
            let (next, prev) = if closed {
                ((i + 1) % count, (i + count - 1) % count)
            } else {
                ((i + 1).min(count - 1), i.saturating_sub(1))
            };
            Point::new(
                coefficient * (points[next].x - points[prev].x),
                coefficient * (points[next].y - points[prev].y),
            )
        })
        .collect()
}

/// One Bézier arc segment between two angles given in degrees. The angles
/// are projected onto the ellipse so that non-circular arcs start and stop
/// where the bounding-box angle points.
fn arc_segment(center: Point, rx: f32, ry: f32, from: f32, to: f32) -> (Point, Point, Point, Point) {
    let project = |degrees: f32| {
        let radians = degrees.to_radians();
        (rx * radians.sin()).atan2(ry * radians.cos())
    };
    let mut alpha = project(from);
    let mut beta = project(to);
    if (beta - alpha).abs() > PI {
        if beta > alpha {
            beta -= 2.0 * PI;
        } else {
            alpha -= 2.0 * PI;
        }
    }

    let half = (beta - alpha) / 2.0;
    let bcp = if half.abs() < f32::EPSILON {
        0.0
    } else {
        4.0 / 3.0 * (1.0 - half.cos()) / half.sin()
    };

    let (sin_a, cos_a) = alpha.sin_cos();
    let (sin_b, cos_b) = beta.sin_cos();
    let at = |x: f32, y: f32| Point::new(center.x + rx * x, center.y + ry * y);

    (
        at(cos_a, sin_a),
        at(cos_a - bcp * sin_a, sin_a + bcp * cos_a),
        at(cos_b + bcp * sin_b, sin_b - bcp * cos_b),
        at(cos_b, sin_b),
    )
}
