//! Tessel Core Types
//!
//! Value types shared by the Tessel graphics context:
//!
//! - **Geometry**: points, rectangles and 2×3 affine matrices with
//!   prepend/append composition
//! - **Paths**: lines, Béziers, arcs, pies and cardinal splines
//! - **Regions**: rectangles and paths combined with set operations
//! - **Units**: page unit conversion through inches
//! - **Hints**: smoothing, interpolation, compositing and text settings
//! - **Paint**: colors, brushes and pens
//!
//! # Example
//!
//! ```rust
//! use tessel_core::{Affine2D, CombineMode, MatrixOrder, Point, Rect, Region};
//!
//! let world = Affine2D::IDENTITY
//!     .translate(10.0, 0.0, MatrixOrder::Prepend)
//!     .scale(2.0, 2.0, MatrixOrder::Prepend);
//! assert_eq!(world.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
//!
//! let mut clip = Region::infinite();
//! clip.combine_rect(Rect::new(0.0, 0.0, 100.0, 100.0), CombineMode::Intersect);
//! assert_eq!(clip.bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
//! ```

pub mod error;
pub mod geometry;
pub mod hints;
pub mod paint;
pub mod path;
pub mod region;
pub mod units;

pub use error::{GraphicsError, Result, Status};
pub use geometry::{Affine2D, MatrixOrder, Point, Rect, Size};
pub use hints::{
    CompositingMode, CompositingQuality, InterpolationMode, PixelOffsetMode, RenderingHints,
    SmoothingMode, TextRenderingHint, MAX_PAGE_SCALE, MAX_TEXT_CONTRAST,
};
pub use paint::{Brush, Color, GradientStop, LineCap, LineJoin, Pen};
pub use path::{FillMode, Path, PathCommand, Polyline, DEFAULT_TENSION};
pub use region::{CombineMode, Region, INFINITE_BOUNDS};
pub use units::{convert, convert_raw, DeviceClass, Unit};
