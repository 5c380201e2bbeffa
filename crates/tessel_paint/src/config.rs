//! Context configuration

use tessel_core::{DeviceClass, Rect};

/// Settings fixed when a graphics context is created
#[derive(Clone, Debug)]
pub struct ContextConfig {
    /// Horizontal resolution in dots per inch
    pub dpi_x: f32,
    /// Vertical resolution in dots per inch
    pub dpi_y: f32,
    /// Output device class, which decides the size of a display unit
    pub device_class: DeviceClass,
    /// Device bounds; defaults to the surface size or the recording frame
    pub bounds: Option<Rect>,
    /// Log a warning the first time an unsupported feature is used
    pub warn_unsupported: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            dpi_x: 96.0,
            dpi_y: 96.0,
            device_class: DeviceClass::Screen,
            bounds: None,
            warn_unsupported: true,
        }
    }
}

impl ContextConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dpi(mut self, dpi_x: f32, dpi_y: f32) -> Self {
        self.dpi_x = dpi_x;
        self.dpi_y = dpi_y;
        self
    }

    pub fn with_device_class(mut self, device_class: DeviceClass) -> Self {
        self.device_class = device_class;
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_warn_unsupported(mut self, enabled: bool) -> Self {
        self.warn_unsupported = enabled;
        self
    }
}
