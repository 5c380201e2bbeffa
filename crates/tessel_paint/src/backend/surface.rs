//! Immediate-mode drawing surfaces

use std::cell::RefCell;
use std::rc::Rc;

use tessel_core::{Affine2D, Brush, Color, CompositingMode, Path, Pen, Region, Size};

/// A rasterizer that draws as soon as it is asked to.
///
/// Transforms and clips are device-space state set by the context before
/// drawing; paths arrive in world coordinates.
pub trait Surface {
    /// Size of the drawable area in device pixels
    fn size(&self) -> Size;

    fn set_transform(&mut self, transform: &Affine2D);

    /// Device-space clip, `None` for unclipped
    fn set_clip(&mut self, clip: Option<&Region>);

    fn set_antialias(&mut self, enabled: bool);

    fn set_compositing_mode(&mut self, mode: CompositingMode);

    fn fill_path(&mut self, path: &Path, brush: &Brush);

    fn stroke_path(&mut self, path: &Path, pen: &Pen);

    fn fill_region(&mut self, region: &Region, brush: &Brush);

    fn clear(&mut self, color: Color);

    /// Push pending output to the device
    fn flush(&mut self) {}
}

/// A call received by a [`MemorySurface`]
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceCall {
    SetTransform(Affine2D),
    SetClip(Option<Region>),
    SetAntialias(bool),
    SetCompositingMode(CompositingMode),
    FillPath { path: Path, brush: Brush },
    StrokePath { path: Path, pen: Pen },
    FillRegion { region: Region, brush: Brush },
    Clear(Color),
    Flush,
}

/// Shared view of a [`MemorySurface`]'s call log
#[derive(Clone, Debug, Default)]
pub struct SurfaceLog(Rc<RefCell<Vec<SurfaceCall>>>);

impl SurfaceLog {
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Number of fill, stroke and clear calls
    pub fn draw_count(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    SurfaceCall::FillPath { .. }
                        | SurfaceCall::StrokePath { .. }
                        | SurfaceCall::FillRegion { .. }
                        | SurfaceCall::Clear(_)
                )
            })
            .count()
    }

    pub fn last(&self) -> Option<SurfaceCall> {
        self.0.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, call: SurfaceCall) {
        self.0.borrow_mut().push(call);
    }
}

/// Headless surface that logs every call it receives
#[derive(Debug)]
pub struct MemorySurface {
    size: Size,
    log: SurfaceLog,
}

impl MemorySurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size::new(width, height),
            log: SurfaceLog::default(),
        }
    }

    /// Handle to the call log that stays valid after the surface is moved
    /// into a context
    pub fn log(&self) -> SurfaceLog {
        self.log.clone()
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> Size {
        self.size
    }

    fn set_transform(&mut self, transform: &Affine2D) {
        self.log.push(SurfaceCall::SetTransform(*transform));
    }

    fn set_clip(&mut self, clip: Option<&Region>) {
        self.log.push(SurfaceCall::SetClip(clip.cloned()));
    }

    fn set_antialias(&mut self, enabled: bool) {
        self.log.push(SurfaceCall::SetAntialias(enabled));
    }

    fn set_compositing_mode(&mut self, mode: CompositingMode) {
        self.log.push(SurfaceCall::SetCompositingMode(mode));
    }

    fn fill_path(&mut self, path: &Path, brush: &Brush) {
        self.log.push(SurfaceCall::FillPath {
            path: path.clone(),
            brush: brush.clone(),
        });
    }

    fn stroke_path(&mut self, path: &Path, pen: &Pen) {
        self.log.push(SurfaceCall::StrokePath {
            path: path.clone(),
            pen: pen.clone(),
        });
    }

    fn fill_region(&mut self, region: &Region, brush: &Brush) {
        self.log.push(SurfaceCall::FillRegion {
            region: region.clone(),
            brush: brush.clone(),
        });
    }

    fn clear(&mut self, color: Color) {
        self.log.push(SurfaceCall::Clear(color));
    }

    fn flush(&mut self) {
        self.log.push(SurfaceCall::Flush);
    }
}
