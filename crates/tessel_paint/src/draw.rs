//! Drawing operations
//!
//! Each operation validates its arguments, checks the context is not busy,
//! drops defined degenerate cases as successful no-ops, and hands a
//! [`DrawCommand`] to the backend.

use smallvec::{smallvec, SmallVec};
use tessel_core::{
    Brush, Color, FillMode, GraphicsError, Path, Pen, Point, Rect, Region, Result, DEFAULT_TENSION,
};

use crate::command::{DrawCommand, Shape};
use crate::context::GraphicsContext;

// ─────────────────────────────────────────────────────────────────────────────
// Outlines
// ─────────────────────────────────────────────────────────────────────────────

impl GraphicsContext {
    /// Elliptical arc; angles in degrees, clockwise from the x axis
    pub fn draw_arc(&mut self, pen: &Pen, rect: Rect, start_angle: f32, sweep_angle: f32) -> Result<()> {
        self.stroke(
            pen,
            Shape::Arc {
                rect,
                start_angle,
                sweep_angle,
            },
        )
    }

    pub fn draw_bezier(&mut self, pen: &Pen, p1: Point, p2: Point, p3: Point, p4: Point) -> Result<()> {
        self.stroke(pen, Shape::Beziers(vec![p1, p2, p3, p4]))
    }

    /// Connected Béziers: a start point followed by groups of three. An
    /// empty list draws nothing.
    pub fn draw_beziers(&mut self, pen: &Pen, points: &[Point]) -> Result<()> {
        if !points.is_empty() && (points.len() < 4 || (points.len() - 1) % 3 != 0) {
            return Err(GraphicsError::InvalidParameter("bezier chain needs 1 + 3n points"));
        }
        self.ensure_valid()?;
        if points.is_empty() {
            return Ok(());
        }
        self.stroke(pen, Shape::Beziers(points.to_vec()))
    }

    pub fn draw_ellipse(&mut self, pen: &Pen, rect: Rect) -> Result<()> {
        self.stroke(pen, Shape::Ellipse(rect))
    }

    pub fn draw_line(&mut self, pen: &Pen, from: Point, to: Point) -> Result<()> {
        self.stroke(pen, Shape::Lines(vec![from, to]))
    }

    pub fn draw_lines(&mut self, pen: &Pen, points: &[Point]) -> Result<()> {
        if points.len() < 2 {
            return Err(GraphicsError::InvalidParameter("lines need at least two points"));
        }
        self.stroke(pen, Shape::Lines(points.to_vec()))
    }

    pub fn draw_path(&mut self, pen: &Pen, path: &Path) -> Result<()> {
        self.stroke(pen, Shape::Path(path.clone()))
    }

    /// Pie outline; a zero sweep draws nothing
    pub fn draw_pie(&mut self, pen: &Pen, rect: Rect, start_angle: f32, sweep_angle: f32) -> Result<()> {
        self.ensure_valid()?;
        if sweep_angle == 0.0 {
            return Ok(());
        }
        self.stroke(
            pen,
            Shape::Pie {
                rect,
                start_angle,
                sweep_angle,
            },
        )
    }

    pub fn draw_polygon(&mut self, pen: &Pen, points: &[Point]) -> Result<()> {
        if points.len() < 2 {
            return Err(GraphicsError::InvalidParameter("polygon needs at least two points"));
        }
        self.stroke(
            pen,
            Shape::Polygon {
                points: points.to_vec(),
                fill_mode: FillMode::Alternate,
            },
        )
    }

    /// Rectangle outline; negative extents draw nothing
    pub fn draw_rectangle(&mut self, pen: &Pen, rect: Rect) -> Result<()> {
        self.ensure_valid()?;
        if rect.width() < 0.0 || rect.height() < 0.0 {
            return Ok(());
        }
        self.stroke(pen, Shape::Rectangles(smallvec![rect]))
    }

    pub fn draw_rectangles(&mut self, pen: &Pen, rects: &[Rect]) -> Result<()> {
        if rects.is_empty() {
            return Err(GraphicsError::InvalidParameter("no rectangles"));
        }
        self.stroke(pen, Shape::Rectangles(SmallVec::from_slice(rects)))
    }

    /// Open cardinal spline with the default tension
    pub fn draw_curve(&mut self, pen: &Pen, points: &[Point]) -> Result<()> {
        self.draw_curve2(pen, points, DEFAULT_TENSION)
    }

    /// Open cardinal spline through every point. Two points draw a line;
    /// three points draw a single segment.
    pub fn draw_curve2(&mut self, pen: &Pen, points: &[Point], tension: f32) -> Result<()> {
        if points.len() == 2 {
            return self.draw_lines(pen, points);
        }
        let segments = if points.len() > 3 {
            points.len() - 1
        } else {
            points.len().saturating_sub(2)
        };
        self.draw_curve3(pen, points, 0, segments, tension)
    }

    /// Open cardinal spline over `segments` segments starting at `offset`.
    /// A zero tension draws straight lines through all points.
    pub fn draw_curve3(
        &mut self,
        pen: &Pen,
        points: &[Point],
        offset: usize,
        segments: usize,
        tension: f32,
    ) -> Result<()> {
        if tension == 0.0 {
            return self.draw_lines(pen, points);
        }
        if segments < 1 {
            return Err(GraphicsError::InvalidParameter("curve needs at least one segment"));
        }
        if offset == 0 && segments == 1 && points.len() < 3 {
            return Err(GraphicsError::InvalidParameter("curve needs at least three points"));
        }
        if segments >= points.len().saturating_sub(offset) {
            return Err(GraphicsError::InvalidParameter("curve segments exceed points"));
        }
        self.stroke(
            pen,
            Shape::Curve {
                points: points.to_vec(),
                offset,
                segments,
                tension,
            },
        )
    }

    pub fn draw_closed_curve(&mut self, pen: &Pen, points: &[Point]) -> Result<()> {
        self.draw_closed_curve2(pen, points, DEFAULT_TENSION)
    }

    /// Closed cardinal spline. A zero tension draws a polygon.
    pub fn draw_closed_curve2(&mut self, pen: &Pen, points: &[Point], tension: f32) -> Result<()> {
        if tension == 0.0 {
            return self.draw_polygon(pen, points);
        }
        if points.len() <= 2 {
            return Err(GraphicsError::InvalidParameter("closed curve needs at least three points"));
        }
        self.stroke(
            pen,
            Shape::ClosedCurve {
                points: points.to_vec(),
                tension,
                fill_mode: FillMode::Alternate,
            },
        )
    }

    fn stroke(&mut self, pen: &Pen, shape: Shape) -> Result<()> {
        self.ensure_valid()?;
        self.backend.draw(DrawCommand::Stroke {
            pen: pen.clone(),
            shape,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fills
// ─────────────────────────────────────────────────────────────────────────────

impl GraphicsContext {
    pub fn fill_ellipse(&mut self, brush: &Brush, rect: Rect) -> Result<()> {
        self.fill(brush, Shape::Ellipse(rect))
    }

    /// Filled rectangle; negative extents draw nothing
    pub fn fill_rectangle(&mut self, brush: &Brush, rect: Rect) -> Result<()> {
        self.ensure_valid()?;
        if rect.width() < 0.0 || rect.height() < 0.0 {
            return Ok(());
        }
        self.fill(brush, Shape::Rectangles(smallvec![rect]))
    }

    pub fn fill_rectangles(&mut self, brush: &Brush, rects: &[Rect]) -> Result<()> {
        if rects.is_empty() {
            return Err(GraphicsError::InvalidParameter("no rectangles"));
        }
        self.fill(brush, Shape::Rectangles(SmallVec::from_slice(rects)))
    }

    /// Filled pie; a zero sweep draws nothing
    pub fn fill_pie(&mut self, brush: &Brush, rect: Rect, start_angle: f32, sweep_angle: f32) -> Result<()> {
        self.ensure_valid()?;
        if sweep_angle == 0.0 {
            return Ok(());
        }
        self.fill(
            brush,
            Shape::Pie {
                rect,
                start_angle,
                sweep_angle,
            },
        )
    }

    pub fn fill_polygon(&mut self, brush: &Brush, points: &[Point], fill_mode: FillMode) -> Result<()> {
        self.fill(
            brush,
            Shape::Polygon {
                points: points.to_vec(),
                fill_mode,
            },
        )
    }

    /// Polygon filled with the alternate rule
    pub fn fill_polygon2(&mut self, brush: &Brush, points: &[Point]) -> Result<()> {
        self.fill_polygon(brush, points, FillMode::Alternate)
    }

    pub fn fill_closed_curve(&mut self, brush: &Brush, points: &[Point]) -> Result<()> {
        self.fill_closed_curve2(brush, points, DEFAULT_TENSION, FillMode::Alternate)
    }

    /// Filled closed cardinal spline. A zero tension fills a polygon. Any
    /// non-empty point list is accepted.
    pub fn fill_closed_curve2(
        &mut self,
        brush: &Brush,
        points: &[Point],
        tension: f32,
        fill_mode: FillMode,
    ) -> Result<()> {
        if tension == 0.0 {
            return self.fill_polygon2(brush, points);
        }
        if points.is_empty() {
            return Err(GraphicsError::InvalidParameter("closed curve needs points"));
        }
        self.fill(
            brush,
            Shape::ClosedCurve {
                points: points.to_vec(),
                tension,
                fill_mode,
            },
        )
    }

    pub fn fill_path(&mut self, brush: &Brush, path: &Path) -> Result<()> {
        self.fill(brush, Shape::Path(path.clone()))
    }

    pub fn fill_region(&mut self, brush: &Brush, region: &Region) -> Result<()> {
        self.ensure_valid()?;
        self.backend.draw(DrawCommand::FillRegion {
            brush: brush.clone(),
            region: region.clone(),
        })
    }

    /// Fill the visible surface with `color`
    pub fn clear(&mut self, color: Color) -> Result<()> {
        self.ensure_valid()?;
        self.backend.draw(DrawCommand::Clear(color))
    }

    fn fill(&mut self, brush: &Brush, shape: Shape) -> Result<()> {
        self.ensure_valid()?;
        self.backend.draw(DrawCommand::Fill {
            brush: brush.clone(),
            shape,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemorySurface, Record, Recording, SurfaceCall, SurfaceLog};
    use crate::config::ContextConfig;
    use tessel_core::{Status, Unit};

    fn immediate() -> (GraphicsContext, SurfaceLog) {
        let surface = MemorySurface::new(100.0, 100.0);
        let log = surface.log();
        let ctx = GraphicsContext::from_surface(Box::new(surface), ContextConfig::default()).unwrap();
        (ctx, log)
    }

    fn recorded_shape(ctx: &GraphicsContext) -> Shape {
        match ctx.recording().unwrap().records().last() {
            Some(Record::Draw(DrawCommand::Stroke { shape, .. }))
            | Some(Record::Draw(DrawCommand::Fill { shape, .. })) => shape.clone(),
            other => panic!("expected a draw record, got {:?}", other),
        }
    }

    fn recorder() -> GraphicsContext {
        let recording = Recording::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        GraphicsContext::from_recording(recording, ContextConfig::default()).unwrap()
    }

    fn points(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f32 * 10.0, (i % 2) as f32 * 10.0)).collect()
    }

    #[test]
    fn test_degenerate_draws_are_no_ops() {
        let (mut ctx, log) = immediate();
        let pen = Pen::default();
        let brush = Brush::Solid(Color::BLACK);

        ctx.draw_rectangle(&pen, Rect::new(0.0, 0.0, -5.0, 5.0)).unwrap();
        ctx.fill_rectangle(&brush, Rect::new(0.0, 0.0, 5.0, -5.0)).unwrap();
        ctx.draw_pie(&pen, Rect::new(0.0, 0.0, 5.0, 5.0), 30.0, 0.0).unwrap();
        ctx.fill_pie(&brush, Rect::new(0.0, 0.0, 5.0, 5.0), 30.0, 0.0).unwrap();
        ctx.draw_beziers(&pen, &[]).unwrap();
        assert_eq!(log.draw_count(), 0);

        ctx.draw_rectangle(&pen, Rect::new(0.0, 0.0, 5.0, 5.0)).unwrap();
        ctx.fill_pie(&brush, Rect::new(0.0, 0.0, 5.0, 5.0), 30.0, 90.0).unwrap();
        assert_eq!(log.draw_count(), 2);
    }

    #[test]
    fn test_point_count_validation() {
        let (mut ctx, log) = immediate();
        let pen = Pen::default();

        for result in [
            ctx.draw_lines(&pen, &points(1)),
            ctx.draw_polygon(&pen, &points(1)),
            ctx.draw_rectangles(&pen, &[]),
            ctx.fill_rectangles(&Brush::default(), &[]),
            ctx.draw_beziers(&pen, &points(5)),
            ctx.draw_beziers(&pen, &points(3)),
            ctx.draw_closed_curve(&pen, &points(2)),
            ctx.fill_closed_curve(&Brush::default(), &[]),
        ] {
            assert_eq!(Status::of(&result), Status::InvalidParameter);
        }
        assert_eq!(log.draw_count(), 0);

        ctx.draw_beziers(&pen, &points(7)).unwrap();
        assert_eq!(log.draw_count(), 1);
    }

    #[test]
    fn test_curve_validation() {
        let (mut ctx, _) = immediate();
        let pen = Pen::default();
        let pts = points(4);

        let err = ctx.draw_curve3(&pen, &pts, 0, 0, 0.5).unwrap_err();
        assert_eq!(err.status(), Status::InvalidParameter);
        let err = ctx.draw_curve3(&pen, &pts[..2], 0, 1, 0.5).unwrap_err();
        assert_eq!(err.status(), Status::InvalidParameter);
        let err = ctx.draw_curve3(&pen, &pts, 1, 3, 0.5).unwrap_err();
        assert_eq!(err.status(), Status::InvalidParameter);

        ctx.draw_curve3(&pen, &pts, 1, 2, 0.5).unwrap();
        ctx.draw_curve(&pen, &pts).unwrap();
    }

    #[test]
    fn test_curve_fallbacks() {
        let mut ctx = recorder();
        let pen = Pen::default();
        let pts = points(4);

        ctx.draw_curve(&pen, &pts[..2]).unwrap();
        assert_eq!(recorded_shape(&ctx), Shape::Lines(pts[..2].to_vec()));

        ctx.draw_curve3(&pen, &pts, 0, 3, 0.0).unwrap();
        assert_eq!(recorded_shape(&ctx), Shape::Lines(pts.clone()));

        ctx.draw_closed_curve2(&pen, &pts, 0.0).unwrap();
        assert_eq!(
            recorded_shape(&ctx),
            Shape::Polygon {
                points: pts.clone(),
                fill_mode: FillMode::Alternate,
            }
        );

        ctx.draw_curve(&pen, &pts).unwrap();
        assert_eq!(
            recorded_shape(&ctx),
            Shape::Curve {
                points: pts.clone(),
                offset: 0,
                segments: 3,
                tension: DEFAULT_TENSION,
            }
        );

        ctx.fill_closed_curve2(&Brush::default(), &pts, 0.0, FillMode::Winding)
            .unwrap();
        assert_eq!(
            recorded_shape(&ctx),
            Shape::Polygon {
                points: pts,
                fill_mode: FillMode::Alternate,
            }
        );
    }

    #[test]
    fn test_curve_segment_count() {
        let mut ctx = recorder();
        let pen = Pen::default();

        ctx.draw_curve(&pen, &points(3)).unwrap();
        assert_eq!(
            recorded_shape(&ctx),
            Shape::Curve {
                points: points(3),
                offset: 0,
                segments: 1,
                tension: DEFAULT_TENSION,
            }
        );

        ctx.draw_curve2(&pen, &points(5), 1.0).unwrap();
        assert!(matches!(recorded_shape(&ctx), Shape::Curve { segments: 4, .. }));

        let err = ctx.draw_curve(&pen, &points(1)).unwrap_err();
        assert_eq!(err.status(), Status::InvalidParameter);
    }

    #[test]
    fn test_fill_closed_curve_accepts_short_lists() {
        let mut ctx = recorder();
        let brush = Brush::default();

        ctx.fill_closed_curve(&brush, &points(2)).unwrap();
        assert!(matches!(recorded_shape(&ctx), Shape::ClosedCurve { .. }));
        ctx.fill_closed_curve(&brush, &points(1)).unwrap();

        let err = ctx.draw_closed_curve(&Pen::default(), &points(2)).unwrap_err();
        assert_eq!(err.status(), Status::InvalidParameter);
    }

    #[test]
    fn test_fill_polygon_modes() {
        let mut ctx = recorder();
        let pts = points(3);
        ctx.fill_polygon(&Brush::default(), &pts, FillMode::Winding).unwrap();
        assert!(matches!(
            recorded_shape(&ctx),
            Shape::Polygon {
                fill_mode: FillMode::Winding,
                ..
            }
        ));
        ctx.fill_polygon2(&Brush::default(), &pts).unwrap();
        assert!(matches!(
            recorded_shape(&ctx),
            Shape::Polygon {
                fill_mode: FillMode::Alternate,
                ..
            }
        ));
    }

    #[test]
    fn test_immediate_draws_paths() {
        let (mut ctx, log) = immediate();
        let pen = Pen::default();
        ctx.draw_line(&pen, Point::new(0.0, 0.0), Point::new(10.0, 10.0)).unwrap();
        match log.last() {
            Some(SurfaceCall::StrokePath { path, .. }) => {
                assert_eq!(path.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
            }
            other => panic!("unexpected call {:?}", other),
        }

        ctx.fill_region(&Brush::default(), &Region::from_rect(Rect::new(0.0, 0.0, 4.0, 4.0)))
            .unwrap();
        assert!(matches!(log.last(), Some(SurfaceCall::FillRegion { .. })));

        ctx.clear(Color::WHITE).unwrap();
        assert_eq!(log.last(), Some(SurfaceCall::Clear(Color::WHITE)));
    }

    #[test]
    fn test_busy_context_refuses_draws() {
        let (mut ctx, log) = immediate();
        let handle = ctx.acquire_handle().unwrap();
        let pen = Pen::default();

        assert_eq!(
            ctx.draw_ellipse(&pen, Rect::new(0.0, 0.0, 5.0, 5.0)).unwrap_err(),
            GraphicsError::ObjectBusy
        );
        // degenerate input still reports busy
        assert_eq!(
            ctx.fill_rectangle(&Brush::default(), Rect::new(0.0, 0.0, -1.0, 1.0))
                .unwrap_err(),
            GraphicsError::ObjectBusy
        );
        // argument errors come first
        assert_eq!(
            Status::of(&ctx.draw_lines(&pen, &[])),
            Status::InvalidParameter
        );

        ctx.release_handle(handle).unwrap();
        ctx.draw_ellipse(&pen, Rect::new(0.0, 0.0, 5.0, 5.0)).unwrap();
        assert_eq!(log.draw_count(), 1);
    }

    #[test]
    fn test_arc_recorded_in_world_units() {
        let mut ctx = recorder();
        ctx.set_page_unit(Unit::Millimeter).unwrap();
        ctx.draw_arc(&Pen::default(), Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, 90.0)
            .unwrap();
        assert_eq!(
            recorded_shape(&ctx),
            Shape::Arc {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                start_angle: 0.0,
                sweep_angle: 90.0,
            }
        );
    }
}
