//! Backend dispatch
//!
//! A context draws either to an immediate [`Surface`] or into a deferred
//! [`Recording`]. The choice is made at construction and every
//! backend-visible operation goes through [`Backend`], which applies it to
//! the surface or appends a record.

mod recording;
mod surface;

pub use recording::{ClipChange, RecordedClip, Record, Recording, TransformChange};
pub use surface::{MemorySurface, Surface, SurfaceCall, SurfaceLog};

use tessel_core::{
    Affine2D, CompositingMode, CompositingQuality, InterpolationMode, PixelOffsetMode, Region,
    RenderingHints, Result, SmoothingMode, TextRenderingHint, Unit,
};

use crate::command::DrawCommand;
use crate::diagnostics::Diagnostics;
use crate::state::StateToken;

/// Which kind of target a context was created on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    ImmediateSurface,
    DeferredRecorder,
}

/// Change to a scalar rendering setting
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HintChange {
    Smoothing(SmoothingMode),
    Interpolation(InterpolationMode),
    CompositingMode(CompositingMode),
    CompositingQuality(CompositingQuality),
    TextRendering(TextRenderingHint),
    PixelOffset(PixelOffsetMode),
    TextContrast(u32),
    RenderingOrigin { x: i32, y: i32 },
    PageTransform { unit: Unit, scale: f32 },
}

/// Flush behaviour requested by the caller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlushIntention {
    /// Return once pending output is queued
    #[default]
    Flush,
    /// Return once pending output is complete
    Sync,
}

/// Live state an immediate surface needs after a restore or container
/// boundary
pub(crate) struct SurfaceState<'a> {
    pub transform: &'a Affine2D,
    pub clip: Option<&'a Region>,
    pub hints: &'a RenderingHints,
}

pub(crate) enum Backend {
    Immediate(Box<dyn Surface>),
    Deferred(Recording),
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Immediate(surface) => f
                .debug_tuple("Immediate")
                .field(&surface.size())
                .finish(),
            Backend::Deferred(recording) => f.debug_tuple("Deferred").field(recording).finish(),
        }
    }
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Immediate(_) => BackendKind::ImmediateSurface,
            Backend::Deferred(_) => BackendKind::DeferredRecorder,
        }
    }

    pub fn recording(&self) -> Option<&Recording> {
        match self {
            Backend::Deferred(recording) => Some(recording),
            Backend::Immediate(_) => None,
        }
    }

    /// The surface takes the full effective transform; the recording takes
    /// the change itself.
    pub fn transform(&mut self, change: TransformChange, effective: &Affine2D) -> Result<()> {
        match self {
            Backend::Immediate(surface) => {
                surface.set_transform(effective);
                Ok(())
            }
            Backend::Deferred(recording) => recording.push(Record::Transform(change)),
        }
    }

    /// The surface takes the resulting device clip; the recording takes the
    /// caller's change.
    pub fn clip(&mut self, change: ClipChange, device_clip: Option<&Region>) -> Result<()> {
        match self {
            Backend::Immediate(surface) => {
                surface.set_clip(device_clip);
                Ok(())
            }
            Backend::Deferred(recording) => recording.push(Record::Clip(change)),
        }
    }

    pub fn hint(&mut self, change: HintChange, diagnostics: &mut Diagnostics) -> Result<()> {
        match self {
            Backend::Immediate(surface) => {
                match change {
                    HintChange::Smoothing(mode) => surface.set_antialias(mode.is_antialiased()),
                    HintChange::CompositingMode(mode) => surface.set_compositing_mode(mode),
                    HintChange::CompositingQuality(_) => {
                        diagnostics.unsupported("compositing quality");
                    }
                    HintChange::PixelOffset(_) => {
                        diagnostics.unsupported("pixel offset mode");
                    }
                    HintChange::TextContrast(_) => {
                        diagnostics.unsupported("text contrast");
                    }
                    // no effect on path rendering
                    HintChange::Interpolation(_)
                    | HintChange::TextRendering(_)
                    | HintChange::RenderingOrigin { .. }
                    | HintChange::PageTransform { .. } => {}
                }
                Ok(())
            }
            Backend::Deferred(recording) => recording.push(Record::Hint(change)),
        }
    }

    pub fn save(&mut self, token: StateToken) -> Result<()> {
        match self {
            Backend::Immediate(_) => Ok(()),
            Backend::Deferred(recording) => recording.push(Record::Save(token)),
        }
    }

    pub fn restore(&mut self, token: StateToken, state: &SurfaceState<'_>) -> Result<()> {
        match self {
            Backend::Immediate(surface) => {
                apply_state(surface.as_mut(), state);
                Ok(())
            }
            Backend::Deferred(recording) => recording.push(Record::Restore(token)),
        }
    }

    pub fn begin_container(&mut self, token: StateToken, state: &SurfaceState<'_>) -> Result<()> {
        match self {
            Backend::Immediate(surface) => {
                apply_state(surface.as_mut(), state);
                Ok(())
            }
            Backend::Deferred(recording) => recording.push(Record::BeginContainer(token)),
        }
    }

    pub fn end_container(&mut self, token: StateToken, state: &SurfaceState<'_>) -> Result<()> {
        match self {
            Backend::Immediate(surface) => {
                apply_state(surface.as_mut(), state);
                Ok(())
            }
            Backend::Deferred(recording) => recording.push(Record::EndContainer(token)),
        }
    }

    pub fn draw(&mut self, command: DrawCommand) -> Result<()> {
        match self {
            Backend::Immediate(surface) => {
                match &command {
                    DrawCommand::Stroke { pen, shape } => surface.stroke_path(&shape.to_path(), pen),
                    DrawCommand::Fill { brush, shape } => surface.fill_path(&shape.to_path(), brush),
                    DrawCommand::FillRegion { brush, region } => surface.fill_region(region, brush),
                    DrawCommand::Clear(color) => surface.clear(*color),
                }
                Ok(())
            }
            Backend::Deferred(recording) => recording.push(Record::Draw(command)),
        }
    }

    pub fn flush(&mut self, intention: FlushIntention) -> Result<()> {
        match self {
            Backend::Immediate(surface) => {
                tracing::trace!(?intention, "flush");
                surface.flush();
                Ok(())
            }
            Backend::Deferred(_) => Ok(()),
        }
    }

    /// Tear down the target. A recording is stopped and handed back.
    pub fn finish(self) -> Option<Recording> {
        match self {
            Backend::Immediate(mut surface) => {
                surface.flush();
                None
            }
            Backend::Deferred(mut recording) => {
                if recording.is_recording() {
                    recording.stop();
                }
                Some(recording)
            }
        }
    }
}

fn apply_state(surface: &mut dyn Surface, state: &SurfaceState<'_>) {
    surface.set_transform(state.transform);
    surface.set_clip(state.clip);
    surface.set_antialias(state.hints.smoothing.is_antialiased());
    surface.set_compositing_mode(state.hints.compositing_mode);
}
