//! Device-independent unit conversion.

/// Converts device-independent units into pixels
pub trait DensityConverter {
    /// Density-independent pixels to pixels
    fn to_px(&self, dp: f32) -> i32;

    /// Scale-independent pixels (font sizes) to pixels
    fn sp_to_px(&self, sp: f32) -> i32 {
        self.to_px(sp)
    }
}

/// Display metrics of a target screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayDensity {
    /// Pixels per dp (1.0 at 160 dpi)
    pub density: f32,
    /// Pixels per sp, includes the user's font scale
    pub scaled_density: f32,
}

impl DisplayDensity {
    pub fn new(density: f32) -> Self {
        Self {
            density,
            scaled_density: density,
        }
    }

    /// Derive the density from a screen's dots per inch
    pub fn from_dpi(dpi: f32) -> Self {
        Self::new(dpi / 160.0)
    }

    /// Density with the user's font scale applied to sp conversions
    pub fn with_font_scale(density: f32, font_scale: f32) -> Self {
        Self {
            density,
            scaled_density: density * font_scale,
        }
    }
}

impl Default for DisplayDensity {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl DensityConverter for DisplayDensity {
    // Truncates toward zero like the platform's dimension conversion
    fn to_px(&self, dp: f32) -> i32 {
        (dp * self.density) as i32
    }

    fn sp_to_px(&self, sp: f32) -> i32 {
        (sp * self.scaled_density) as i32
    }
}
