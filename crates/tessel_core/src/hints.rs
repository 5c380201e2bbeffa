//! Rendering hints
//!
//! Every hint enum carries its raw integer code and converts from one with
//! `TryFrom<i32>`, rejecting unknown codes.

use crate::error::{GraphicsError, Result};
use crate::units::Unit;

macro_rules! raw_code {
    ($name:ident, $what:literal, [$($variant:ident),+ $(,)?]) => {
        impl TryFrom<i32> for $name {
            type Error = GraphicsError;

            fn try_from(raw: i32) -> Result<Self> {
                $(
                    if raw == $name::$variant as i32 {
                        return Ok($name::$variant);
                    }
                )+
                Err(GraphicsError::InvalidParameter(concat!("unknown ", $what)))
            }
        }
    };
}

/// Antialiasing of lines, curves and filled edges
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SmoothingMode {
    Default = 0,
    HighSpeed = 1,
    HighQuality = 2,
    #[default]
    None = 3,
    AntiAlias = 4,
}

impl SmoothingMode {
    /// The mode a context stores when asked for this one
    pub fn resolved(self) -> Self {
        match self {
            SmoothingMode::Default | SmoothingMode::HighSpeed => SmoothingMode::None,
            SmoothingMode::HighQuality => SmoothingMode::AntiAlias,
            other => other,
        }
    }

    pub fn is_antialiased(self) -> bool {
        self.resolved() == SmoothingMode::AntiAlias
    }
}

raw_code!(SmoothingMode, "smoothing mode", [Default, HighSpeed, HighQuality, None, AntiAlias]);

/// Image resampling filter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum InterpolationMode {
    Default = 0,
    LowQuality = 1,
    HighQuality = 2,
    #[default]
    Bilinear = 3,
    Bicubic = 4,
    NearestNeighbor = 5,
    HighQualityBilinear = 6,
    HighQualityBicubic = 7,
}

impl InterpolationMode {
    /// The mode a context stores when asked for this one
    pub fn resolved(self) -> Self {
        match self {
            InterpolationMode::Default | InterpolationMode::LowQuality => {
                InterpolationMode::Bilinear
            }
            InterpolationMode::HighQuality => InterpolationMode::HighQualityBicubic,
            other => other,
        }
    }
}

raw_code!(
    InterpolationMode,
    "interpolation mode",
    [
        Default,
        LowQuality,
        HighQuality,
        Bilinear,
        Bicubic,
        NearestNeighbor,
        HighQualityBilinear,
        HighQualityBicubic,
    ]
);

/// How source pixels combine with the destination
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CompositingMode {
    /// Blend over existing content
    #[default]
    SourceOver = 0,
    /// Overwrite existing content
    SourceCopy = 1,
}

raw_code!(CompositingMode, "compositing mode", [SourceOver, SourceCopy]);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CompositingQuality {
    #[default]
    Default = 0,
    HighSpeed = 1,
    HighQuality = 2,
    GammaCorrected = 3,
    AssumeLinear = 4,
}

raw_code!(
    CompositingQuality,
    "compositing quality",
    [Default, HighSpeed, HighQuality, GammaCorrected, AssumeLinear]
);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TextRenderingHint {
    #[default]
    SystemDefault = 0,
    SingleBitPerPixelGridFit = 1,
    SingleBitPerPixel = 2,
    AntiAliasGridFit = 3,
    AntiAlias = 4,
    ClearTypeGridFit = 5,
}

raw_code!(
    TextRenderingHint,
    "text rendering hint",
    [
        SystemDefault,
        SingleBitPerPixelGridFit,
        SingleBitPerPixel,
        AntiAliasGridFit,
        AntiAlias,
        ClearTypeGridFit,
    ]
);

/// Whether pixel centers sit on integer or half-integer coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PixelOffsetMode {
    #[default]
    Default = 0,
    HighSpeed = 1,
    HighQuality = 2,
    None = 3,
    Half = 4,
}

raw_code!(PixelOffsetMode, "pixel offset mode", [Default, HighSpeed, HighQuality, None, Half]);

/// Largest accepted text gamma contrast
pub const MAX_TEXT_CONTRAST: u32 = 12;

/// Largest accepted page scale
pub const MAX_PAGE_SCALE: f32 = 1_000_000_032.0;

/// Every scalar rendering setting of a context
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderingHints {
    pub smoothing: SmoothingMode,
    pub interpolation: InterpolationMode,
    pub compositing_mode: CompositingMode,
    pub compositing_quality: CompositingQuality,
    pub text_rendering: TextRenderingHint,
    pub pixel_offset: PixelOffsetMode,
    /// Text gamma contrast, 0..=12
    pub text_contrast: u32,
    /// Dither and hatch origin in device pixels
    pub rendering_origin: (i32, i32),
    pub page_unit: Unit,
    pub page_scale: f32,
}

impl Default for RenderingHints {
    fn default() -> Self {
        Self {
            smoothing: SmoothingMode::None,
            interpolation: InterpolationMode::Bilinear,
            compositing_mode: CompositingMode::SourceOver,
            compositing_quality: CompositingQuality::Default,
            text_rendering: TextRenderingHint::SystemDefault,
            pixel_offset: PixelOffsetMode::Default,
            text_contrast: 4,
            rendering_origin: (0, 0),
            page_unit: Unit::Display,
            page_scale: 1.0,
        }
    }
}

impl RenderingHints {
    /// Restore defaults for everything but the rendering origin
    pub fn reset(&mut self) {
        *self = RenderingHints {
            rendering_origin: self.rendering_origin,
            ..RenderingHints::default()
        };
    }
}
