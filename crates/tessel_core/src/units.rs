//! Measurement units
//!
//! Conversion goes through inches: the source value is converted to inches,
//! then to the target unit. Display units depend on the output device: on a
//! printer a display unit is 1/100 inch, elsewhere it is one device pixel.

use crate::error::{GraphicsError, Result};

/// Unit of measure for page coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Unit {
    /// World coordinates (device pixels for conversion purposes)
    World = 0,
    /// Device-dependent display unit
    #[default]
    Display = 1,
    Pixel = 2,
    /// 1/72 inch
    Point = 3,
    Inch = 4,
    /// 1/300 inch
    Document = 5,
    Millimeter = 6,
}

impl TryFrom<i32> for Unit {
    type Error = GraphicsError;

    fn try_from(raw: i32) -> Result<Self> {
        Ok(match raw {
            0 => Unit::World,
            1 => Unit::Display,
            2 => Unit::Pixel,
            3 => Unit::Point,
            4 => Unit::Inch,
            5 => Unit::Document,
            6 => Unit::Millimeter,
            _ => return Err(GraphicsError::InvalidParameter("unknown unit")),
        })
    }
}

/// Kind of output device a context draws to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// On-screen drawable
    #[default]
    Screen,
    /// In-memory bitmap
    Bitmap,
    /// Printer or print stream
    Printer,
}

impl Unit {
    /// Inches per unit at `dpi` on `device`
    fn inches_per_unit(self, dpi: f32, device: DeviceClass) -> f32 {
        match self {
            Unit::Document => 1.0 / 300.0,
            Unit::Inch => 1.0,
            Unit::Millimeter => 1.0 / 25.4,
            Unit::Point => 1.0 / 72.0,
            Unit::Display if device == DeviceClass::Printer => 1.0 / 100.0,
            Unit::Display | Unit::Pixel | Unit::World => 1.0 / dpi,
        }
    }
}

/// Convert `value` from one unit to another
pub fn convert(from: Unit, to: Unit, dpi: f32, device: DeviceClass, value: f32) -> f32 {
    if from == to {
        return value;
    }
    let inches = value * from.inches_per_unit(dpi, device);
    inches / to.inches_per_unit(dpi, device)
}

/// Convert between raw unit codes. An unknown code on either side leaves the
/// value unchanged.
pub fn convert_raw(from: i32, to: i32, dpi: f32, device: DeviceClass, value: f32) -> f32 {
    match (Unit::try_from(from), Unit::try_from(to)) {
        (Ok(from), Ok(to)) => convert(from, to, dpi, device, value),
        _ => value,
    }
}
