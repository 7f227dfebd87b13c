//=========================================================================
// Device Metrics
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::geometry::{Position, Size};
use crate::core::platform_bridge::SizeEvent;

//=== DeviceMetrics =======================================================

/// Surface geometry in logical pixels, derived from the last size event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceMetrics {
    /// Physical pixels per logical pixel.
    pub scale: f32,

    /// Full surface size.
    pub size: Size,

    /// Top-left corner of the area not covered by system UI.
    pub safe_origin: Position,

    /// Size of the area not covered by system UI.
    pub safe_size: Size,
}

impl DeviceMetrics {
    /// Derives metrics from a size event. A non-positive scale counts as 1.
    pub fn from_size_event(event: &SizeEvent) -> Self {
        let scale = if event.pixels_per_pt > 0.0 {
            event.pixels_per_pt
        } else {
            1.0
        };
        let logical = |px: u32| px as f32 / scale;

        let insets = &event.insets;
        let safe_width = event.width_px.saturating_sub(insets.left + insets.right);
        let safe_height = event.height_px.saturating_sub(insets.top + insets.bottom);

        Self {
            scale,
            size: Size::new(logical(event.width_px), logical(event.height_px)),
            safe_origin: Position::new(logical(insets.left), logical(insets.top)),
            safe_size: Size::new(logical(safe_width), logical(safe_height)),
        }
    }

    /// Converts a physical-pixel position to logical pixels.
    pub fn unscale(&self, physical: Position) -> Position {
        Position::new(physical.x / self.scale, physical.y / self.scale)
    }
}

impl Default for DeviceMetrics {
    fn default() -> Self {
        Self {
            scale: 1.0,
            size: Size::default(),
            safe_origin: Position::ZERO,
            safe_size: Size::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform_bridge::Insets;

    #[test]
    fn metrics_respect_scale_and_insets() {
        let event = SizeEvent {
            width_px: 800,
            height_px: 1200,
            pixels_per_pt: 2.0,
            insets: Insets {
                top: 40,
                bottom: 20,
                left: 0,
                right: 0,
            },
            dark_mode: false,
        };

        let metrics = DeviceMetrics::from_size_event(&event);

        assert_eq!(metrics.size, Size::new(400.0, 600.0));
        assert_eq!(metrics.safe_origin, Position::new(0.0, 20.0));
        assert_eq!(metrics.safe_size, Size::new(400.0, 570.0));
        assert_eq!(metrics.unscale(Position::new(100.0, 50.0)), Position::new(50.0, 25.0));
    }

    #[test]
    fn zero_scale_falls_back_to_one() {
        let event = SizeEvent {
            width_px: 10,
            height_px: 10,
            pixels_per_pt: 0.0,
            insets: Insets::default(),
            dark_mode: false,
        };

        assert_eq!(DeviceMetrics::from_size_event(&event).scale, 1.0);
    }
}
