//! Graphics context
//!
//! [`GraphicsContext`] ties the transform pair, the clip, the rendering
//! hints and the save stack to one backend target. Every operation checks
//! its arguments first, then that the context is not held through its
//! drawing handle, and only then changes state and notifies the backend.

use std::sync::atomic::{AtomicU64, Ordering};

use tessel_core::{
    convert, Affine2D, Color, CombineMode, CompositingMode, CompositingQuality, DeviceClass,
    GraphicsError, InterpolationMode, MatrixOrder, Path, PixelOffsetMode, Point, Rect, Region,
    RenderingHints, Result, SmoothingMode, TextRenderingHint, Unit, MAX_PAGE_SCALE,
    MAX_TEXT_CONTRAST,
};

use crate::backend::{
    Backend, BackendKind, ClipChange, FlushIntention, HintChange, Recording,
    Surface, SurfaceState, TransformChange,
};
use crate::clip::{ClipEngine, ClipShape};
use crate::config::ContextConfig;
use crate::diagnostics::Diagnostics;
use crate::state::{StateSnapshot, StateStack, StateToken, MAX_SAVED_STATES};
use crate::transform::TransformPair;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a graphics context
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Proof of exclusive access, handed out by [`GraphicsContext::acquire_handle`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DrawingHandle(u64);

impl DrawingHandle {
    /// Handle from its raw value, as received across an FFI boundary
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Whether a context accepts operations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Validity {
    #[default]
    Valid,
    /// The drawing handle is out; everything but its release is refused
    Busy,
}

/// Platform drawing target
pub enum NativeTarget {
    /// A drawable of known geometry, rendered through `surface`
    Drawable {
        surface: Box<dyn Surface>,
        geometry: Rect,
    },
    /// A raw window handle
    Window(u64),
}

/// Coordinate spaces for [`GraphicsContext::transform_points`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CoordinateSpace {
    /// Before the world transform
    #[default]
    World = 0,
    /// After the world transform, in page units
    Page = 1,
    /// Device pixels
    Device = 2,
}

impl TryFrom<i32> for CoordinateSpace {
    type Error = GraphicsError;

    fn try_from(raw: i32) -> Result<Self> {
        match raw {
            0 => Ok(CoordinateSpace::World),
            1 => Ok(CoordinateSpace::Page),
            2 => Ok(CoordinateSpace::Device),
            _ => Err(GraphicsError::InvalidParameter("unknown coordinate space")),
        }
    }
}

/// Drawing state bound to one surface or recording.
///
/// Field order is drop order: snapshots, then the live clip, then the
/// backend.
#[derive(Debug)]
pub struct GraphicsContext {
    saved: StateStack,
    clip: ClipEngine,
    pub(crate) backend: Backend,
    id: ContextId,
    transforms: TransformPair,
    hints: RenderingHints,
    bounds: Rect,
    dpi_x: f32,
    dpi_y: f32,
    device_class: DeviceClass,
    validity: Validity,
    pub(crate) diagnostics: Diagnostics,
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle
// ─────────────────────────────────────────────────────────────────────────────

impl GraphicsContext {
    /// Context drawing immediately to `surface`. Bounds default to the
    /// surface size.
    pub fn from_surface(surface: Box<dyn Surface>, config: ContextConfig) -> Result<Self> {
        validate_config(&config)?;
        let bounds = config
            .bounds
            .unwrap_or_else(|| surface.size().to_rect());
        Ok(Self::with_backend(Backend::Immediate(surface), bounds, &config))
    }

    /// Context appending to `recording`. The recording is started if it is
    /// not already. Bounds default to the recording frame.
    pub fn from_recording(mut recording: Recording, config: ContextConfig) -> Result<Self> {
        validate_config(&config)?;
        let bounds = config.bounds.unwrap_or(recording.frame());
        if !recording.is_recording() {
            recording.start();
        }
        Ok(Self::with_backend(Backend::Deferred(recording), bounds, &config))
    }

    /// Context for a platform target
    pub fn from_native(target: NativeTarget, config: ContextConfig) -> Result<Self> {
        match target {
            NativeTarget::Drawable { surface, geometry } => {
                Self::from_surface(surface, config.with_bounds(geometry))
            }
            NativeTarget::Window(_) => Err(GraphicsError::NotImplemented("window targets")),
        }
    }

    fn with_backend(backend: Backend, bounds: Rect, config: &ContextConfig) -> Self {
        let context = Self {
            saved: StateStack::new(),
            clip: ClipEngine::new(),
            backend,
            id: ContextId::next(),
            transforms: TransformPair::new(),
            hints: RenderingHints::default(),
            bounds,
            dpi_x: config.dpi_x,
            dpi_y: config.dpi_y,
            device_class: config.device_class,
            validity: Validity::Valid,
            diagnostics: Diagnostics::new(config.warn_unsupported),
        };
        tracing::debug!(
            id = context.id.raw(),
            kind = ?context.backend.kind(),
            ?bounds,
            "graphics context created"
        );
        context
    }

    /// Destroy the context. Snapshots are released first, then the clip,
    /// then the backend; a recording is stopped and returned.
    ///
    /// A busy context is handed back unchanged.
    #[allow(clippy::result_large_err)]
    pub fn delete(self) -> std::result::Result<Option<Recording>, (Self, GraphicsError)> {
        if self.validity == Validity::Busy {
            return Err((self, GraphicsError::ObjectBusy));
        }

        let GraphicsContext {
            mut saved,
            clip,
            backend,
            id,
            ..
        } = self;
        saved.clear();
        drop(clip);
        let recording = backend.finish();
        tracing::debug!(id = id.raw(), "graphics context deleted");
        Ok(recording)
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    /// The recording a recorder context appends to
    pub fn recording(&self) -> Option<&Recording> {
        self.backend.recording()
    }

    /// Number of live save/container snapshots
    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }

    pub(crate) fn ensure_valid(&self) -> Result<()> {
        match self.validity {
            Validity::Valid => Ok(()),
            Validity::Busy => Err(GraphicsError::ObjectBusy),
        }
    }
}

fn validate_config(config: &ContextConfig) -> Result<()> {
    if !(config.dpi_x > 0.0 && config.dpi_y > 0.0) {
        return Err(GraphicsError::InvalidParameter("resolution must be positive"));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Exclusive Handle
// ─────────────────────────────────────────────────────────────────────────────

impl GraphicsContext {
    /// Take exclusive access. Until the handle is released every other
    /// operation fails with [`GraphicsError::ObjectBusy`].
    pub fn acquire_handle(&mut self) -> Result<DrawingHandle> {
        self.ensure_valid()?;
        self.validity = Validity::Busy;
        tracing::trace!(id = self.id.raw(), "drawing handle acquired");
        Ok(DrawingHandle(self.id.raw()))
    }

    pub fn release_handle(&mut self, handle: DrawingHandle) -> Result<()> {
        if self.validity != Validity::Busy || handle.raw() != self.id.raw() {
            return Err(GraphicsError::InvalidParameter("handle does not match this context"));
        }
        self.validity = Validity::Valid;
        tracing::trace!(id = self.id.raw(), "drawing handle released");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// World Transform
// ─────────────────────────────────────────────────────────────────────────────

impl GraphicsContext {
    /// World transform relative to the innermost container
    pub fn world_transform(&self) -> Result<Affine2D> {
        self.ensure_valid()?;
        Ok(self.transforms.world())
    }

    pub fn set_world_transform(&mut self, matrix: &Affine2D) -> Result<()> {
        if !matrix.is_invertible() || !matrix.elements.iter().all(|e| e.is_finite()) {
            return Err(GraphicsError::InvalidParameter("world transform is not invertible"));
        }
        self.ensure_valid()?;

        self.transforms.set(matrix, &mut self.bounds)?;
        let change = if matrix.is_identity() {
            TransformChange::Reset
        } else {
            TransformChange::Set(*matrix)
        };
        self.backend.transform(change, self.transforms.effective())
    }

    pub fn reset_world_transform(&mut self) -> Result<()> {
        self.ensure_valid()?;
        self.transforms.reset(&mut self.bounds);
        self.backend
            .transform(TransformChange::Reset, self.transforms.effective())
    }

    pub fn multiply_world_transform(&mut self, matrix: &Affine2D, order: MatrixOrder) -> Result<()> {
        if !matrix.is_invertible() || !matrix.elements.iter().all(|e| e.is_finite()) {
            return Err(GraphicsError::InvalidParameter("matrix is not invertible"));
        }
        self.ensure_valid()?;

        self.transforms.multiply(matrix, order, &mut self.bounds)?;
        self.backend.transform(
            TransformChange::Multiply {
                matrix: *matrix,
                order,
            },
            self.transforms.effective(),
        )
    }

    /// Rotate the world by `angle` degrees
    pub fn rotate_world_transform(&mut self, angle: f32, order: MatrixOrder) -> Result<()> {
        if !angle.is_finite() {
            return Err(GraphicsError::InvalidParameter("rotation angle is not finite"));
        }
        self.ensure_valid()?;
        self.transforms.rotate(angle, order, &mut self.bounds)?;
        self.backend.transform(
            TransformChange::Rotate { angle, order },
            self.transforms.effective(),
        )
    }

    pub fn scale_world_transform(&mut self, sx: f32, sy: f32, order: MatrixOrder) -> Result<()> {
        if sx == 0.0 || sy == 0.0 || !sx.is_finite() || !sy.is_finite() {
            return Err(GraphicsError::InvalidParameter("scale factors must be finite and non-zero"));
        }
        self.ensure_valid()?;

        self.transforms.scale(sx, sy, order, &mut self.bounds)?;
        self.backend.transform(
            TransformChange::Scale { sx, sy, order },
            self.transforms.effective(),
        )
    }

    pub fn translate_world_transform(&mut self, dx: f32, dy: f32, order: MatrixOrder) -> Result<()> {
        if !dx.is_finite() || !dy.is_finite() {
            return Err(GraphicsError::InvalidParameter("translation is not finite"));
        }
        self.ensure_valid()?;
        self.transforms.translate(dx, dy, order, &mut self.bounds)?;
        self.backend.transform(
            TransformChange::Translate { dx, dy, order },
            self.transforms.effective(),
        )
    }

    /// Map points between coordinate spaces. World maps to page through
    /// the world transform; page maps to device through the page unit and
    /// scale.
    pub fn transform_points(
        &self,
        dest: CoordinateSpace,
        src: CoordinateSpace,
        points: &mut [Point],
    ) -> Result<()> {
        self.ensure_valid()?;
        if dest == src {
            return Ok(());
        }

        let device_from_src = self.device_from(src);
        let src_to_dest = self
            .device_from(dest)
            .invert()
            .ok_or(GraphicsError::Generic)?
            .then(&device_from_src);
        for point in points.iter_mut() {
            *point = src_to_dest.transform_point(*point);
        }
        Ok(())
    }

    fn device_from(&self, space: CoordinateSpace) -> Affine2D {
        let page = self.page_to_device();
        match space {
            CoordinateSpace::Device => Affine2D::IDENTITY,
            CoordinateSpace::Page => page,
            CoordinateSpace::World => page.then(self.transforms.effective()),
        }
    }

    fn page_to_device(&self) -> Affine2D {
        let unit = self.hints.page_unit;
        let scale = self.hints.page_scale;
        let sx = scale * convert(unit, Unit::Pixel, self.dpi_x, self.device_class, 1.0);
        let sy = scale * convert(unit, Unit::Pixel, self.dpi_y, self.device_class, 1.0);
        Affine2D::scaling(sx, sy)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Page Transform and Rendering Hints
// ─────────────────────────────────────────────────────────────────────────────

impl GraphicsContext {
    pub fn page_unit(&self) -> Result<Unit> {
        self.ensure_valid()?;
        Ok(self.hints.page_unit)
    }

    pub fn set_page_unit(&mut self, unit: Unit) -> Result<()> {
        if unit == Unit::World {
            return Err(GraphicsError::InvalidParameter("page unit cannot be world"));
        }
        self.ensure_valid()?;
        self.hints.page_unit = unit;
        self.push_hint(HintChange::PageTransform {
            unit,
            scale: self.hints.page_scale,
        })
    }

    pub fn page_scale(&self) -> Result<f32> {
        self.ensure_valid()?;
        Ok(self.hints.page_scale)
    }

    pub fn set_page_scale(&mut self, scale: f32) -> Result<()> {
        if !(scale > 0.0 && scale <= MAX_PAGE_SCALE) {
            return Err(GraphicsError::InvalidParameter("page scale out of range"));
        }
        self.ensure_valid()?;
        self.hints.page_scale = scale;
        self.push_hint(HintChange::PageTransform {
            unit: self.hints.page_unit,
            scale,
        })
    }

    pub fn smoothing_mode(&self) -> Result<SmoothingMode> {
        self.ensure_valid()?;
        Ok(self.hints.smoothing)
    }

    /// Default and HighSpeed store None; HighQuality stores AntiAlias
    pub fn set_smoothing_mode(&mut self, mode: SmoothingMode) -> Result<()> {
        self.ensure_valid()?;
        self.hints.smoothing = mode.resolved();
        self.push_hint(HintChange::Smoothing(mode))
    }

    pub fn interpolation_mode(&self) -> Result<InterpolationMode> {
        self.ensure_valid()?;
        Ok(self.hints.interpolation)
    }

    /// Default and LowQuality store Bilinear; HighQuality stores
    /// HighQualityBicubic
    pub fn set_interpolation_mode(&mut self, mode: InterpolationMode) -> Result<()> {
        self.ensure_valid()?;
        self.hints.interpolation = mode.resolved();
        self.push_hint(HintChange::Interpolation(mode))
    }

    pub fn compositing_mode(&self) -> Result<CompositingMode> {
        self.ensure_valid()?;
        Ok(self.hints.compositing_mode)
    }

    pub fn set_compositing_mode(&mut self, mode: CompositingMode) -> Result<()> {
        self.ensure_valid()?;
        self.hints.compositing_mode = mode;
        self.push_hint(HintChange::CompositingMode(mode))
    }

    pub fn compositing_quality(&self) -> Result<CompositingQuality> {
        self.ensure_valid()?;
        Ok(self.hints.compositing_quality)
    }

    pub fn set_compositing_quality(&mut self, quality: CompositingQuality) -> Result<()> {
        self.ensure_valid()?;
        self.hints.compositing_quality = quality;
        self.push_hint(HintChange::CompositingQuality(quality))
    }

    pub fn text_rendering_hint(&self) -> Result<TextRenderingHint> {
        self.ensure_valid()?;
        Ok(self.hints.text_rendering)
    }

    pub fn set_text_rendering_hint(&mut self, hint: TextRenderingHint) -> Result<()> {
        self.ensure_valid()?;
        self.hints.text_rendering = hint;
        self.push_hint(HintChange::TextRendering(hint))
    }

    pub fn pixel_offset_mode(&self) -> Result<PixelOffsetMode> {
        self.ensure_valid()?;
        Ok(self.hints.pixel_offset)
    }

    pub fn set_pixel_offset_mode(&mut self, mode: PixelOffsetMode) -> Result<()> {
        self.ensure_valid()?;
        self.hints.pixel_offset = mode;
        self.push_hint(HintChange::PixelOffset(mode))
    }

    pub fn text_contrast(&self) -> Result<u32> {
        self.ensure_valid()?;
        Ok(self.hints.text_contrast)
    }

    pub fn set_text_contrast(&mut self, contrast: u32) -> Result<()> {
        if contrast > MAX_TEXT_CONTRAST {
            return Err(GraphicsError::InvalidParameter("text contrast above 12"));
        }
        self.ensure_valid()?;
        self.hints.text_contrast = contrast;
        self.push_hint(HintChange::TextContrast(contrast))
    }

    pub fn rendering_origin(&self) -> Result<(i32, i32)> {
        self.ensure_valid()?;
        Ok(self.hints.rendering_origin)
    }

    pub fn set_rendering_origin(&mut self, x: i32, y: i32) -> Result<()> {
        self.ensure_valid()?;
        self.hints.rendering_origin = (x, y);
        self.push_hint(HintChange::RenderingOrigin { x, y })
    }

    pub fn dpi_x(&self) -> Result<f32> {
        self.ensure_valid()?;
        Ok(self.dpi_x)
    }

    pub fn dpi_y(&self) -> Result<f32> {
        self.ensure_valid()?;
        Ok(self.dpi_y)
    }

    /// Closest color the target can show. Targets here are true color.
    pub fn nearest_color(&self, color: Color) -> Result<Color> {
        self.ensure_valid()?;
        Ok(color)
    }

    pub fn flush(&mut self, intention: FlushIntention) -> Result<()> {
        self.ensure_valid()?;
        self.backend.flush(intention)
    }

    fn push_hint(&mut self, change: HintChange) -> Result<()> {
        self.backend.hint(change, &mut self.diagnostics)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Save, Restore and Containers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Boundary {
    State,
    Container,
}

impl GraphicsContext {
    /// Checkpoint the transform, clip and hints
    pub fn save(&mut self) -> Result<StateToken> {
        self.ensure_valid()?;
        let token = self.saved.save(self.snapshot())?;
        tracing::trace!(token = token.raw(), "state saved");
        self.backend.save(token)?;
        Ok(token)
    }

    /// Return to the state saved under `token`, dropping later snapshots
    pub fn restore(&mut self, token: StateToken) -> Result<()> {
        self.restore_to(token, Boundary::State)
    }

    /// Save, then start from default clip and hints with the current
    /// transform as the new baseline
    pub fn begin_container(&mut self) -> Result<StateToken> {
        self.ensure_valid()?;
        let token = self.saved.save(self.snapshot())?;

        self.clip.reset(&mut self.transforms);
        self.hints.reset();
        self.transforms.enter_container();
        tracing::debug!(token = token.raw(), "container entered");

        self.with_surface_state(|backend, state| backend.begin_container(token, state))?;
        Ok(token)
    }

    /// Container mapping `src` in `unit` onto `dst`. The rectangles are
    /// validated but not applied.
    pub fn begin_container_mapped(&mut self, dst: Rect, src: Rect, unit: Unit) -> Result<StateToken> {
        if !matches!(
            unit,
            Unit::Pixel | Unit::Point | Unit::Inch | Unit::Document | Unit::Millimeter
        ) {
            return Err(GraphicsError::InvalidParameter("container unit out of range"));
        }
        self.ensure_valid()?;
        self.diagnostics.unsupported("container rectangle mapping");
        tracing::trace!(?dst, ?src, ?unit, "container mapping ignored");
        self.begin_container()
    }

    pub fn end_container(&mut self, token: StateToken) -> Result<()> {
        self.restore_to(token, Boundary::Container)
    }

    fn restore_to(&mut self, token: StateToken, boundary: Boundary) -> Result<()> {
        if token.raw() as usize >= MAX_SAVED_STATES {
            return Err(GraphicsError::InvalidParameter("unknown state token"));
        }
        self.ensure_valid()?;

        let snapshot = self.saved.restore(token)?;
        self.transforms = snapshot.transforms;
        self.clip.install(snapshot.clip.clone());
        self.hints = snapshot.hints;

        match boundary {
            Boundary::State => {
                tracing::trace!(token = token.raw(), "state restored");
                self.with_surface_state(|backend, state| backend.restore(token, state))
            }
            Boundary::Container => {
                tracing::debug!(token = token.raw(), "container left");
                self.with_surface_state(|backend, state| backend.end_container(token, state))
            }
        }
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            transforms: self.transforms,
            clip: self.clip.region().clone(),
            hints: self.hints,
        }
    }

    fn with_surface_state<F>(&mut self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Backend, &SurfaceState<'_>) -> Result<()>,
    {
        let device_clip = self.clip.device_region(&self.transforms);
        let state = SurfaceState {
            transform: self.transforms.effective(),
            clip: device_clip.as_ref(),
            hints: &self.hints,
        };
        apply(&mut self.backend, &state)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clipping
// ─────────────────────────────────────────────────────────────────────────────

impl GraphicsContext {
    pub fn set_clip_rect(&mut self, rect: Rect, mode: CombineMode) -> Result<()> {
        self.combine_clip(ClipShape::Rect(rect), mode)
    }

    pub fn set_clip_path(&mut self, path: &Path, mode: CombineMode) -> Result<()> {
        self.combine_clip(ClipShape::Path(path), mode)
    }

    pub fn set_clip_region(&mut self, region: &Region, mode: CombineMode) -> Result<()> {
        self.combine_clip(ClipShape::Region(region), mode)
    }

    /// Combine another context's stored clip into this one, as if it had
    /// been passed to [`set_clip_region`](Self::set_clip_region)
    pub fn set_clip_from(&mut self, source: &GraphicsContext, mode: CombineMode) -> Result<()> {
        source.ensure_valid()?;
        self.combine_clip(ClipShape::Region(source.clip.region()), mode)
    }

    pub fn reset_clip(&mut self) -> Result<()> {
        self.ensure_valid()?;
        self.clip.reset(&mut self.transforms);
        self.push_clip(ClipChange::Reset)
    }

    pub fn translate_clip(&mut self, dx: f32, dy: f32) -> Result<()> {
        self.ensure_valid()?;
        self.clip.translate(dx, dy);
        self.push_clip(ClipChange::Translate { dx, dy })
    }

    /// The clip in world coordinates
    pub fn clip(&self) -> Result<Region> {
        self.ensure_valid()?;
        Ok(self.clip.clip(self.transforms.clip_space()))
    }

    pub fn clip_bounds(&self) -> Result<Rect> {
        self.ensure_valid()?;
        Ok(self.clip.bounds(self.transforms.clip_space()))
    }

    pub fn is_clip_empty(&self) -> Result<bool> {
        self.ensure_valid()?;
        Ok(self.clip.is_empty())
    }

    /// Clip bounds limited to the device bounds
    pub fn visible_clip_bounds(&self) -> Result<Rect> {
        self.ensure_valid()?;
        Ok(self
            .clip
            .visible_bounds(self.transforms.clip_space(), &self.bounds))
    }

    pub fn is_visible_clip_empty(&self) -> Result<bool> {
        let visible = self.visible_clip_bounds()?;
        Ok(visible.width() == 0.0 || visible.height() == 0.0)
    }

    /// Inclusive test against the device bounds
    pub fn is_visible_point(&self, point: Point) -> Result<bool> {
        self.ensure_valid()?;
        Ok(self.bounds.contains(point))
    }

    /// Inclusive overlap test against the device bounds. Rects without
    /// area are never visible.
    pub fn is_visible_rect(&self, rect: Rect) -> Result<bool> {
        self.ensure_valid()?;
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return Ok(false);
        }
        let bounds = &self.bounds;
        Ok(bounds.x() <= rect.right()
            && rect.x() <= bounds.right()
            && bounds.y() <= rect.bottom()
            && rect.y() <= bounds.bottom())
    }

    /// Device bounds re-projected through the clip space
    pub fn device_bounds(&self) -> Rect {
        self.bounds
    }

    fn combine_clip(&mut self, shape: ClipShape<'_>, mode: CombineMode) -> Result<()> {
        self.ensure_valid()?;
        self.clip.combine(shape, mode, self.transforms.clip_space())?;
        self.push_clip(ClipChange::Combine {
            shape: shape.into(),
            mode,
        })
    }

    fn push_clip(&mut self, change: ClipChange) -> Result<()> {
        let device_clip = self.clip.device_region(&self.transforms);
        self.backend.clip(change, device_clip.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemorySurface, Record, RecordedClip, SurfaceCall, SurfaceLog};
    use tessel_core::{Status, INFINITE_BOUNDS};

    fn immediate() -> (GraphicsContext, SurfaceLog) {
        let surface = MemorySurface::new(200.0, 100.0);
        let log = surface.log();
        let ctx = GraphicsContext::from_surface(Box::new(surface), ContextConfig::default()).unwrap();
        (ctx, log)
    }

    fn recorder() -> GraphicsContext {
        let recording = Recording::new(Rect::new(0.0, 0.0, 200.0, 100.0));
        GraphicsContext::from_recording(recording, ContextConfig::default()).unwrap()
    }

    fn records(ctx: &GraphicsContext) -> Vec<Record> {
        ctx.recording().unwrap().records().to_vec()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_defaults() {
        let (ctx, log) = immediate();
        assert_eq!(ctx.backend_kind(), BackendKind::ImmediateSurface);
        assert_eq!(ctx.smoothing_mode().unwrap(), SmoothingMode::None);
        assert_eq!(ctx.interpolation_mode().unwrap(), InterpolationMode::Bilinear);
        assert_eq!(ctx.compositing_mode().unwrap(), CompositingMode::SourceOver);
        assert_eq!(ctx.text_contrast().unwrap(), 4);
        assert_eq!(ctx.page_unit().unwrap(), Unit::Display);
        assert_eq!(ctx.page_scale().unwrap(), 1.0);
        assert!(ctx.world_transform().unwrap().is_identity());
        assert_eq!(ctx.clip_bounds().unwrap(), INFINITE_BOUNDS);
        assert_eq!(ctx.device_bounds(), Rect::new(0.0, 0.0, 200.0, 100.0));
        assert!(log.is_empty());
    }

    #[test]
    fn test_context_ids_are_unique() {
        let (a, _) = immediate();
        let (b, _) = immediate();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_invalid_resolution() {
        let surface = MemorySurface::new(10.0, 10.0);
        let config = ContextConfig::default().with_dpi(0.0, 96.0);
        let err = GraphicsContext::from_surface(Box::new(surface), config).unwrap_err();
        assert_eq!(err.status(), Status::InvalidParameter);
    }

    #[test]
    fn test_native_targets() {
        let err = GraphicsContext::from_native(NativeTarget::Window(7), ContextConfig::default())
            .unwrap_err();
        assert_eq!(err.status(), Status::NotImplemented);

        let target = NativeTarget::Drawable {
            surface: Box::new(MemorySurface::new(640.0, 480.0)),
            geometry: Rect::new(0.0, 0.0, 320.0, 240.0),
        };
        let ctx = GraphicsContext::from_native(target, ContextConfig::default()).unwrap();
        assert_eq!(ctx.device_bounds(), Rect::new(0.0, 0.0, 320.0, 240.0));
    }

    #[test]
    fn test_immediate_transform_receives_effective() {
        let (mut ctx, log) = immediate();
        ctx.translate_world_transform(10.0, 0.0, MatrixOrder::Prepend).unwrap();
        ctx.scale_world_transform(2.0, 2.0, MatrixOrder::Prepend).unwrap();

        let expected = Affine2D::translation(10.0, 0.0).then(&Affine2D::scaling(2.0, 2.0));
        assert_eq!(log.last(), Some(SurfaceCall::SetTransform(expected)));
    }

    #[test]
    fn test_recorder_receives_operation() {
        let mut ctx = recorder();
        ctx.translate_world_transform(10.0, 5.0, MatrixOrder::Append).unwrap();
        ctx.set_world_transform(&Affine2D::IDENTITY).unwrap();
        ctx.rotate_world_transform(90.0, MatrixOrder::Prepend).unwrap();

        assert_eq!(
            records(&ctx),
            vec![
                Record::Transform(TransformChange::Translate {
                    dx: 10.0,
                    dy: 5.0,
                    order: MatrixOrder::Append,
                }),
                Record::Transform(TransformChange::Reset),
                Record::Transform(TransformChange::Rotate {
                    angle: 90.0,
                    order: MatrixOrder::Prepend,
                }),
            ]
        );
    }

    #[test]
    fn test_non_invertible_world_transform() {
        let (mut ctx, log) = immediate();
        let singular = Affine2D::new(0.0, 0.0, 0.0, 0.0, 1.0, 1.0);
        let err = ctx.set_world_transform(&singular).unwrap_err();
        assert_eq!(err.status(), Status::InvalidParameter);
        let err = ctx.scale_world_transform(1.0, 0.0, MatrixOrder::Prepend).unwrap_err();
        assert_eq!(err.status(), Status::InvalidParameter);
        assert!(log.is_empty());
    }

    #[test]
    fn test_handle_lifecycle() {
        let (mut ctx, _) = immediate();
        assert!(ctx.release_handle(DrawingHandle::from_raw(ctx.id().raw())).is_err());

        let handle = ctx.acquire_handle().unwrap();
        assert_eq!(handle.raw(), ctx.id().raw());
        assert_eq!(ctx.validity(), Validity::Busy);
        assert_eq!(ctx.acquire_handle().unwrap_err(), GraphicsError::ObjectBusy);

        let wrong = DrawingHandle::from_raw(handle.raw() + 1000);
        assert_eq!(ctx.release_handle(wrong).unwrap_err().status(), Status::InvalidParameter);
        assert_eq!(ctx.validity(), Validity::Busy);

        ctx.release_handle(handle).unwrap();
        assert_eq!(ctx.validity(), Validity::Valid);
    }

    #[test]
    fn test_busy_blocks_queries() {
        let (mut ctx, _) = immediate();
        let handle = ctx.acquire_handle().unwrap();
        assert_eq!(ctx.clip_bounds().unwrap_err(), GraphicsError::ObjectBusy);
        assert_eq!(ctx.dpi_x().unwrap_err(), GraphicsError::ObjectBusy);
        assert_eq!(ctx.is_visible_point(Point::ZERO).unwrap_err(), GraphicsError::ObjectBusy);
        assert_eq!(ctx.flush(FlushIntention::Flush).unwrap_err(), GraphicsError::ObjectBusy);
        ctx.release_handle(handle).unwrap();
        assert_eq!(ctx.dpi_x().unwrap(), 96.0);
    }

    #[test]
    fn test_delete_busy_hands_back() {
        let (mut ctx, _) = immediate();
        let handle = ctx.acquire_handle().unwrap();
        let (mut ctx, err) = ctx.delete().unwrap_err();
        assert_eq!(err, GraphicsError::ObjectBusy);

        ctx.release_handle(handle).unwrap();
        assert!(ctx.delete().unwrap().is_none());
    }

    #[test]
    fn test_delete_stops_recording() {
        let mut ctx = recorder();
        ctx.save().unwrap();
        assert!(ctx.recording().unwrap().is_recording());

        let recording = ctx.delete().unwrap().unwrap();
        assert!(!recording.is_recording());
        assert_eq!(recording.records().len(), 1);
    }

    #[test]
    fn test_hint_normalization() {
        let (mut ctx, log) = immediate();
        ctx.set_smoothing_mode(SmoothingMode::HighQuality).unwrap();
        assert_eq!(ctx.smoothing_mode().unwrap(), SmoothingMode::AntiAlias);
        assert_eq!(log.last(), Some(SurfaceCall::SetAntialias(true)));

        ctx.set_smoothing_mode(SmoothingMode::HighSpeed).unwrap();
        assert_eq!(ctx.smoothing_mode().unwrap(), SmoothingMode::None);

        ctx.set_interpolation_mode(InterpolationMode::HighQuality).unwrap();
        assert_eq!(
            ctx.interpolation_mode().unwrap(),
            InterpolationMode::HighQualityBicubic
        );
        ctx.set_interpolation_mode(InterpolationMode::LowQuality).unwrap();
        assert_eq!(ctx.interpolation_mode().unwrap(), InterpolationMode::Bilinear);
    }

    #[test]
    fn test_hint_ranges() {
        let (mut ctx, _) = immediate();
        assert_eq!(ctx.set_text_contrast(13).unwrap_err().status(), Status::InvalidParameter);
        ctx.set_text_contrast(12).unwrap();
        assert_eq!(ctx.text_contrast().unwrap(), 12);

        assert!(ctx.set_page_unit(Unit::World).is_err());
        ctx.set_page_unit(Unit::Millimeter).unwrap();
        assert_eq!(ctx.page_unit().unwrap(), Unit::Millimeter);

        for bad in [0.0, -1.0, f32::NAN, 1e10] {
            assert!(ctx.set_page_scale(bad).is_err(), "{} accepted", bad);
        }
        ctx.set_page_scale(1000.0).unwrap();
        assert_eq!(ctx.page_scale().unwrap(), 1000.0);
    }

    #[test]
    fn test_immediate_no_op_hints_warn_once() {
        let (mut ctx, log) = immediate();
        ctx.set_text_contrast(8).unwrap();
        ctx.set_pixel_offset_mode(PixelOffsetMode::Half).unwrap();
        ctx.set_compositing_quality(CompositingQuality::HighQuality).unwrap();
        ctx.set_text_rendering_hint(TextRenderingHint::AntiAlias).unwrap();
        assert!(log.is_empty());
        assert!(ctx.diagnostics.has_warned("text contrast"));
        assert!(ctx.diagnostics.has_warned("pixel offset mode"));
        assert_eq!(ctx.pixel_offset_mode().unwrap(), PixelOffsetMode::Half);
    }

    #[test]
    fn test_recorder_records_hints() {
        let mut ctx = recorder();
        ctx.set_rendering_origin(3, 4).unwrap();
        ctx.set_page_unit(Unit::Inch).unwrap();
        assert_eq!(
            records(&ctx),
            vec![
                Record::Hint(HintChange::RenderingOrigin { x: 3, y: 4 }),
                Record::Hint(HintChange::PageTransform {
                    unit: Unit::Inch,
                    scale: 1.0,
                }),
            ]
        );
    }

    #[test]
    fn test_restore_reapplies_surface_state() {
        let (mut ctx, log) = immediate();
        ctx.set_smoothing_mode(SmoothingMode::AntiAlias).unwrap();
        let token = ctx.save().unwrap();
        ctx.set_smoothing_mode(SmoothingMode::None).unwrap();
        ctx.translate_world_transform(5.0, 5.0, MatrixOrder::Prepend).unwrap();
        log.clear();

        ctx.restore(token).unwrap();
        assert_eq!(
            log.calls(),
            vec![
                SurfaceCall::SetTransform(Affine2D::IDENTITY),
                SurfaceCall::SetClip(None),
                SurfaceCall::SetAntialias(true),
                SurfaceCall::SetCompositingMode(CompositingMode::SourceOver),
            ]
        );
        assert_eq!(ctx.saved_count(), 0);
    }

    #[test]
    fn test_restore_token_validation() {
        let (mut ctx, _) = immediate();
        let err = ctx.restore(StateToken::from_raw(512)).unwrap_err();
        assert_eq!(err.status(), Status::InvalidParameter);
        let err = ctx.restore(StateToken::from_raw(3)).unwrap_err();
        assert_eq!(err.status(), Status::InvalidParameter);
    }

    #[test]
    fn test_container_resets_state_but_keeps_origin() {
        let (mut ctx, _) = immediate();
        ctx.set_rendering_origin(7, 8).unwrap();
        ctx.set_text_contrast(10).unwrap();
        ctx.set_page_scale(3.0).unwrap();
        ctx.set_clip_rect(Rect::new(0.0, 0.0, 10.0, 10.0), CombineMode::Replace)
            .unwrap();

        let token = ctx.begin_container().unwrap();
        assert_eq!(ctx.text_contrast().unwrap(), 4);
        assert_eq!(ctx.page_scale().unwrap(), 1.0);
        assert_eq!(ctx.rendering_origin().unwrap(), (7, 8));
        assert_eq!(ctx.clip_bounds().unwrap(), INFINITE_BOUNDS);

        ctx.end_container(token).unwrap();
        assert_eq!(ctx.text_contrast().unwrap(), 10);
        assert_eq!(ctx.clip_bounds().unwrap(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_container_mapped() {
        let (mut ctx, _) = immediate();
        let dst = Rect::new(0.0, 0.0, 10.0, 10.0);
        for unit in [Unit::World, Unit::Display] {
            let err = ctx.begin_container_mapped(dst, dst, unit).unwrap_err();
            assert_eq!(err.status(), Status::InvalidParameter);
        }
        let token = ctx.begin_container_mapped(dst, dst, Unit::Pixel).unwrap();
        assert!(ctx.diagnostics.has_warned("container rectangle mapping"));
        ctx.end_container(token).unwrap();
    }

    #[test]
    fn test_recorder_container_records() {
        let mut ctx = recorder();
        let token = ctx.begin_container().unwrap();
        ctx.end_container(token).unwrap();
        assert_eq!(
            records(&ctx),
            vec![Record::BeginContainer(token), Record::EndContainer(token)]
        );
    }

    #[test]
    fn test_clip_records_caller_geometry() {
        let mut ctx = recorder();
        ctx.translate_world_transform(10.0, 10.0, MatrixOrder::Prepend).unwrap();
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        ctx.set_clip_rect(rect, CombineMode::Intersect).unwrap();
        ctx.translate_clip(1.0, 1.0).unwrap();
        ctx.reset_clip().unwrap();

        let recorded = records(&ctx);
        assert_eq!(
            recorded[1],
            Record::Clip(ClipChange::Combine {
                shape: RecordedClip::Rect(rect),
                mode: CombineMode::Intersect,
            })
        );
        assert_eq!(recorded[2], Record::Clip(ClipChange::Translate { dx: 1.0, dy: 1.0 }));
        assert_eq!(recorded[3], Record::Clip(ClipChange::Reset));
    }

    #[test]
    fn test_immediate_clip_is_device_space() {
        let (mut ctx, log) = immediate();
        ctx.translate_world_transform(10.0, 10.0, MatrixOrder::Prepend).unwrap();
        ctx.set_clip_rect(Rect::new(0.0, 0.0, 5.0, 5.0), CombineMode::Replace)
            .unwrap();
        match log.last() {
            Some(SurfaceCall::SetClip(Some(region))) => {
                assert_eq!(region.bounds(), Rect::new(10.0, 10.0, 5.0, 5.0));
            }
            other => panic!("unexpected call {:?}", other),
        }

        ctx.reset_clip().unwrap();
        assert_eq!(log.last(), Some(SurfaceCall::SetClip(None)));
    }

    #[test]
    fn test_clip_queries() {
        let (mut ctx, _) = immediate();
        assert!(!ctx.is_clip_empty().unwrap());
        assert_eq!(ctx.visible_clip_bounds().unwrap(), Rect::new(0.0, 0.0, 200.0, 100.0));

        ctx.set_clip_rect(Rect::new(150.0, 50.0, 100.0, 100.0), CombineMode::Replace)
            .unwrap();
        assert_eq!(ctx.visible_clip_bounds().unwrap(), Rect::new(150.0, 50.0, 50.0, 50.0));
        assert!(!ctx.is_visible_clip_empty().unwrap());

        ctx.set_clip_rect(Rect::new(500.0, 500.0, 10.0, 10.0), CombineMode::Intersect)
            .unwrap();
        assert!(ctx.is_clip_empty().unwrap());
        assert!(ctx.is_visible_clip_empty().unwrap());
        assert!(ctx.clip().unwrap().is_empty());
    }

    #[test]
    fn test_set_clip_from_other_context() {
        let (mut source, _) = immediate();
        source
            .set_clip_rect(Rect::new(5.0, 5.0, 20.0, 20.0), CombineMode::Replace)
            .unwrap();
        let (mut target, _) = immediate();
        target.set_clip_from(&source, CombineMode::Replace).unwrap();
        assert_eq!(target.clip_bounds().unwrap(), Rect::new(5.0, 5.0, 20.0, 20.0));

        let handle = source.acquire_handle().unwrap();
        assert_eq!(
            target.set_clip_from(&source, CombineMode::Union).unwrap_err(),
            GraphicsError::ObjectBusy
        );
        source.release_handle(handle).unwrap();
    }

    #[test]
    fn test_set_clip_from_maps_into_transformed_target() {
        let (mut source, _) = immediate();
        source
            .set_clip_rect(Rect::new(5.0, 5.0, 20.0, 20.0), CombineMode::Replace)
            .unwrap();

        let (mut target, log) = immediate();
        target.translate_world_transform(10.0, 10.0, MatrixOrder::Prepend).unwrap();
        target.set_clip_from(&source, CombineMode::Replace).unwrap();

        let (mut direct, _) = immediate();
        direct.translate_world_transform(10.0, 10.0, MatrixOrder::Prepend).unwrap();
        direct
            .set_clip_rect(Rect::new(5.0, 5.0, 20.0, 20.0), CombineMode::Replace)
            .unwrap();

        assert_eq!(target.clip_bounds().unwrap(), Rect::new(5.0, 5.0, 20.0, 20.0));
        assert_eq!(target.clip_bounds().unwrap(), direct.clip_bounds().unwrap());
        match log.last() {
            Some(SurfaceCall::SetClip(Some(region))) => {
                assert_eq!(region.bounds(), Rect::new(15.0, 15.0, 20.0, 20.0));
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_set_clip_from_records_combined_region() {
        let (mut source, _) = immediate();
        source
            .set_clip_rect(Rect::new(5.0, 5.0, 20.0, 20.0), CombineMode::Replace)
            .unwrap();

        let mut target = recorder();
        target.scale_world_transform(2.0, 2.0, MatrixOrder::Prepend).unwrap();
        target.set_clip_from(&source, CombineMode::Intersect).unwrap();

        assert_eq!(
            records(&target)[1],
            Record::Clip(ClipChange::Combine {
                shape: RecordedClip::Region(Region::from_rect(Rect::new(5.0, 5.0, 20.0, 20.0))),
                mode: CombineMode::Intersect,
            })
        );
        assert_eq!(target.clip_bounds().unwrap(), Rect::new(5.0, 5.0, 20.0, 20.0));
    }

    #[test]
    fn test_non_finite_transform_arguments() {
        let (mut ctx, log) = immediate();
        ctx.translate_world_transform(4.0, 2.0, MatrixOrder::Prepend).unwrap();
        let world = ctx.world_transform().unwrap();
        let bounds = ctx.device_bounds();
        let calls = log.len();

        let results = [
            ctx.rotate_world_transform(f32::NAN, MatrixOrder::Prepend),
            ctx.rotate_world_transform(f32::INFINITY, MatrixOrder::Append),
            ctx.translate_world_transform(f32::NAN, 0.0, MatrixOrder::Prepend),
            ctx.translate_world_transform(0.0, f32::INFINITY, MatrixOrder::Append),
            ctx.scale_world_transform(f32::INFINITY, 1.0, MatrixOrder::Prepend),
            ctx.scale_world_transform(1.0, f32::NAN, MatrixOrder::Append),
            ctx.set_world_transform(&Affine2D::new(1.0, 0.0, 0.0, 1.0, f32::INFINITY, 0.0)),
            ctx.multiply_world_transform(
                &Affine2D::new(1.0, 0.0, 0.0, 1.0, 0.0, f32::NAN),
                MatrixOrder::Prepend,
            ),
        ];
        for result in results {
            assert_eq!(Status::of(&result), Status::InvalidParameter);
        }

        assert_eq!(ctx.world_transform().unwrap(), world);
        assert_eq!(ctx.device_bounds(), bounds);
        assert_eq!(log.len(), calls);
        ctx.set_clip_rect(Rect::new(0.0, 0.0, 10.0, 10.0), CombineMode::Replace)
            .unwrap();
        assert_eq!(ctx.clip_bounds().unwrap(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_recorder_keeps_requested_hint_modes() {
        let mut ctx = recorder();
        ctx.set_smoothing_mode(SmoothingMode::HighQuality).unwrap();
        ctx.set_interpolation_mode(InterpolationMode::Default).unwrap();

        assert_eq!(ctx.smoothing_mode().unwrap(), SmoothingMode::AntiAlias);
        assert_eq!(ctx.interpolation_mode().unwrap(), InterpolationMode::Bilinear);
        assert_eq!(
            records(&ctx),
            vec![
                Record::Hint(HintChange::Smoothing(SmoothingMode::HighQuality)),
                Record::Hint(HintChange::Interpolation(InterpolationMode::Default)),
            ]
        );
    }

    #[test]
    fn test_visibility_against_device_bounds() {
        let (ctx, _) = immediate();
        assert!(ctx.is_visible_point(Point::new(200.0, 100.0)).unwrap());
        assert!(!ctx.is_visible_point(Point::new(200.5, 10.0)).unwrap());

        assert!(ctx.is_visible_rect(Rect::new(-10.0, -10.0, 10.0, 10.0)).unwrap());
        assert!(!ctx.is_visible_rect(Rect::new(-10.0, -10.0, 5.0, 5.0)).unwrap());
        assert!(!ctx.is_visible_rect(Rect::new(10.0, 10.0, 0.0, 5.0)).unwrap());
        assert!(!ctx.is_visible_rect(Rect::new(10.0, 10.0, 5.0, 0.0)).unwrap());
        // negative extents cover no area
        assert!(!ctx.is_visible_rect(Rect::new(50.0, 50.0, -5.0, 5.0)).unwrap());
        assert!(!ctx.is_visible_rect(Rect::new(50.0, 50.0, 5.0, -5.0)).unwrap());
    }

    #[test]
    fn test_transform_points() {
        let (mut ctx, _) = immediate();
        ctx.set_page_unit(Unit::Inch).unwrap();
        ctx.translate_world_transform(1.0, 0.0, MatrixOrder::Prepend).unwrap();

        let mut points = [Point::new(1.0, 1.0)];
        ctx.transform_points(CoordinateSpace::Device, CoordinateSpace::World, &mut points)
            .unwrap();
        assert!(approx(points[0].x, 192.0));
        assert!(approx(points[0].y, 96.0));

        ctx.transform_points(CoordinateSpace::World, CoordinateSpace::Device, &mut points)
            .unwrap();
        assert!(approx(points[0].x, 1.0));
        assert!(approx(points[0].y, 1.0));

        ctx.transform_points(CoordinateSpace::Page, CoordinateSpace::World, &mut points)
            .unwrap();
        assert!(approx(points[0].x, 2.0));
    }

    #[test]
    fn test_nearest_color_is_identity() {
        let (ctx, _) = immediate();
        let color = Color::rgba(0.2, 0.4, 0.6, 0.8);
        assert_eq!(ctx.nearest_color(color).unwrap(), color);
    }

    #[test]
    fn test_flush_reaches_surface() {
        let (mut ctx, log) = immediate();
        ctx.flush(FlushIntention::Sync).unwrap();
        assert_eq!(log.last(), Some(SurfaceCall::Flush));

        let mut rec = recorder();
        rec.flush(FlushIntention::Flush).unwrap();
        assert!(records(&rec).is_empty());
    }
}
