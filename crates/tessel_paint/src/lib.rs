//! Tessel Graphics Context
//!
//! A drawing-state engine in the style of a GDI+ `Graphics` object. A
//! [`GraphicsContext`] owns a world transform, a clip region, rendering
//! hints and a save stack, and forwards validated work to one of two
//! targets:
//!
//! - an immediate [`Surface`] that draws as calls arrive
//! - a deferred [`Recording`] that stores structured records
//!
//! # Features
//!
//! - World transforms with prepend/append composition
//! - Clips that stay put when the world transform changes afterwards
//! - Save/restore through a bounded snapshot arena
//! - Containers that hide the enclosing transform from introspection
//! - An exclusive drawing handle that locks the context while held
//!
//! # Example
//!
//! ```rust
//! use tessel_paint::{
//!     CombineMode, ContextConfig, GraphicsContext, MatrixOrder, MemorySurface, Rect,
//! };
//!
//! let surface = MemorySurface::new(800.0, 600.0);
//! let mut ctx = GraphicsContext::from_surface(Box::new(surface), ContextConfig::default())?;
//!
//! ctx.set_clip_rect(Rect::new(0.0, 0.0, 100.0, 100.0), CombineMode::Replace)?;
//! let token = ctx.save()?;
//! ctx.translate_world_transform(10.0, 10.0, MatrixOrder::Prepend)?;
//! assert_eq!(ctx.clip_bounds()?, Rect::new(-10.0, -10.0, 100.0, 100.0));
//!
//! ctx.restore(token)?;
//! assert_eq!(ctx.clip_bounds()?, Rect::new(0.0, 0.0, 100.0, 100.0));
//! # Ok::<(), tessel_paint::GraphicsError>(())
//! ```

pub mod backend;
pub mod clip;
pub mod command;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod draw;
pub mod state;
pub mod transform;

pub use backend::{
    BackendKind, ClipChange, FlushIntention, HintChange, MemorySurface, RecordedClip, Record,
    Recording, Surface, SurfaceCall, SurfaceLog, TransformChange,
};
pub use clip::{ClipEngine, ClipShape};
pub use command::{DrawCommand, Shape};
pub use config::ContextConfig;
pub use context::{
    ContextId, CoordinateSpace, DrawingHandle, GraphicsContext, NativeTarget, Validity,
};
pub use diagnostics::Diagnostics;
pub use state::{StateSnapshot, StateStack, StateToken, MAX_SAVED_STATES};
pub use transform::TransformPair;

// ─────────────────────────────────────────────────────────────────────────────
// Core type re-exports from tessel_core
// ─────────────────────────────────────────────────────────────────────────────

pub use tessel_core::{
    convert, convert_raw, Affine2D, Brush, Color, CombineMode, CompositingMode,
    CompositingQuality, DeviceClass, FillMode, GraphicsError, InterpolationMode, LineCap,
    LineJoin, MatrixOrder, Path, PathCommand, Pen, PixelOffsetMode, Point, Rect, Region,
    RenderingHints, Result, Size, SmoothingMode, Status, TextRenderingHint, Unit,
};
