//! Clip region storage and combination
//!
//! The clip is stored in clip space (see [`TransformPair`]). Shapes given by
//! callers are mapped into that space before they are combined, and mapped
//! back out when the clip is queried.

use tessel_core::{Affine2D, CombineMode, GraphicsError, Path, Rect, Region, Result};

use crate::backend::RecordedClip;
use crate::transform::TransformPair;

/// Shape used for clipping
#[derive(Clone, Copy, Debug)]
pub enum ClipShape<'a> {
    Rect(Rect),
    Path(&'a Path),
    Region(&'a Region),
}

impl ClipShape<'_> {
    fn to_region(self) -> Region {
        match self {
            ClipShape::Rect(rect) => Region::from_rect(rect),
            ClipShape::Path(path) => Region::from_path(path.clone()),
            ClipShape::Region(region) => region.clone(),
        }
    }
}

impl From<ClipShape<'_>> for RecordedClip {
    fn from(shape: ClipShape<'_>) -> Self {
        match shape {
            ClipShape::Rect(rect) => RecordedClip::Rect(rect),
            ClipShape::Path(path) => RecordedClip::Path(path.clone()),
            ClipShape::Region(region) => RecordedClip::Region(region.clone()),
        }
    }
}

/// Owns a context's clip region
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClipEngine {
    region: Region,
}

impl ClipEngine {
    /// Infinite clip
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored region, in clip space
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Replace the stored region wholesale
    pub(crate) fn install(&mut self, region: Region) {
        self.region = region;
    }

    /// Clip to everything; the clip-space matrix goes back to identity
    pub fn reset(&mut self, transforms: &mut TransformPair) {
        self.region.set_infinite();
        transforms.reset_clip_space();
    }

    /// Combine a caller-space shape into the clip
    pub fn combine(&mut self, shape: ClipShape<'_>, mode: CombineMode, clip_space: &Affine2D) -> Result<()> {
        let mut operand = shape.to_region();
        if !clip_space.is_identity() {
            let to_storage = clip_space.invert().ok_or(GraphicsError::Generic)?;
            operand.transform(&to_storage);
        }
        self.region.combine(&operand, mode);
        tracing::trace!(?mode, bounds = ?self.region.bounds(), "clip combined");
        Ok(())
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.region.translate(dx, dy);
    }

    /// The clip in caller space
    pub fn clip(&self, clip_space: &Affine2D) -> Region {
        self.region.transformed(clip_space)
    }

    /// Bounds of the clip in caller space
    pub fn bounds(&self, clip_space: &Affine2D) -> Rect {
        if clip_space.is_identity() {
            return self.region.bounds();
        }
        self.clip(clip_space).bounds()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    pub fn is_infinite(&self) -> bool {
        self.region.is_infinite()
    }

    /// Clip bounds limited to the device bounds; never negative in extent
    pub fn visible_bounds(&self, clip_space: &Affine2D, device_bounds: &Rect) -> Rect {
        if self.region.is_infinite() {
            return *device_bounds;
        }
        self.bounds(clip_space).intersect(device_bounds)
    }

    /// The clip in device space for an immediate surface, `None` when
    /// unclipped
    pub fn device_region(&self, transforms: &TransformPair) -> Option<Region> {
        if self.region.is_infinite() {
            return None;
        }
        let to_device = transforms.effective().then(transforms.clip_space());
        Some(self.region.transformed(&to_device))
    }
}
