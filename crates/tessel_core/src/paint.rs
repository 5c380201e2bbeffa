//! Colors, brushes and pens

use crate::geometry::Point;

/// RGBA color
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// From a packed `0xAARRGGBB` value
    pub fn from_argb(argb: u32) -> Self {
        let channel = |shift: u32| ((argb >> shift) & 0xFF) as f32 / 255.0;
        Self::rgba(channel(16), channel(8), channel(0), channel(24))
    }

    /// Packed `0xAARRGGBB` value
    pub fn to_argb(&self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.a) << 24) | (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Gradient stop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient (0.0 to 1.0)
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// Fill source for shapes and regions
#[derive(Clone, Debug, PartialEq)]
pub enum Brush {
    Solid(Color),
    /// Linear gradient between two points in world coordinates
    Linear {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
}

impl Brush {
    /// Two-color linear gradient
    pub fn linear(start: Point, end: Point, from: Color, to: Color) -> Self {
        Brush::Linear {
            start,
            end,
            stops: vec![GradientStop::new(0.0, from), GradientStop::new(1.0, to)],
        }
    }
}

impl Default for Brush {
    fn default() -> Self {
        Brush::Solid(Color::BLACK)
    }
}

impl From<Color> for Brush {
    fn from(color: Color) -> Self {
        Brush::Solid(color)
    }
}

/// Line cap style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Flat,
    Square,
    Round,
    Triangle,
}

/// Line join style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineJoin {
    #[default]
    Miter,
    Bevel,
    Round,
}

/// Stroke configuration for outlines
#[derive(Clone, Debug, PartialEq)]
pub struct Pen {
    pub brush: Brush,
    /// Line width in world units
    pub width: f32,
    pub start_cap: LineCap,
    pub end_cap: LineCap,
    pub join: LineJoin,
    /// Miter limit (for Miter joins)
    pub miter_limit: f32,
    /// Dash pattern in multiples of the width (empty for solid line)
    pub dash: Vec<f32>,
    pub dash_offset: f32,
}

impl Pen {
    pub fn new(brush: impl Into<Brush>, width: f32) -> Self {
        Self {
            brush: brush.into(),
            width,
            start_cap: LineCap::Flat,
            end_cap: LineCap::Flat,
            join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: Vec::new(),
            dash_offset: 0.0,
        }
    }

    /// Set both line caps
    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.start_cap = cap;
        self.end_cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    pub fn with_dash(mut self, pattern: Vec<f32>, offset: f32) -> Self {
        self.dash = pattern;
        self.dash_offset = offset;
        self
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self::new(Color::BLACK, 1.0)
    }
}
