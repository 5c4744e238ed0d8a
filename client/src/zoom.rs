use costmap_shared::Granularity;
use serde::{Deserialize, Serialize};

use crate::config::{CROSSFADE_HALF_WIDTH, DEFAULT_ZOOM_THRESHOLD};

/// Picks the interactive granularity for a zoom level. Stateless: the answer
/// depends on the current zoom only, so there is no hysteresis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomSwitch {
    threshold: f64,
}

impl Default for ZoomSwitch {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_THRESHOLD)
    }
}

/// Opacities a renderer should paint a granularity's layers with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerPaint {
    pub fill_opacity: f64,
    pub outline_opacity: f64,
    pub label_opacity: f64,
}

impl ZoomSwitch {
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn active_granularity(&self, zoom: f64) -> Granularity {
        if zoom >= self.threshold {
            Granularity::District
        } else {
            Granularity::Province
        }
    }

    pub fn is_active(&self, granularity: Granularity, zoom: f64) -> bool {
        self.active_granularity(zoom) == granularity
    }

    /// District visibility ramp: 0 below the crossfade band, 1 above it,
    /// linear in between.
    fn district_ramp(&self, zoom: f64) -> f64 {
        let start = self.threshold - CROSSFADE_HALF_WIDTH;
        let end = self.threshold + CROSSFADE_HALF_WIDTH;
        ((zoom - start) / (end - start)).clamp(0.0, 1.0)
    }

    /// Province borders: fully drawn up to the threshold, gone one zoom
    /// level past it.
    fn province_outline(&self, zoom: f64) -> f64 {
        (1.0 - (zoom - self.threshold)).clamp(0.0, 1.0)
    }

    pub fn layer_paint(&self, granularity: Granularity, zoom: f64) -> LayerPaint {
        let district = self.district_ramp(zoom);
        match granularity {
            Granularity::District => LayerPaint {
                fill_opacity: district,
                outline_opacity: district,
                label_opacity: district,
            },
            Granularity::Province => LayerPaint {
                fill_opacity: 1.0 - district,
                outline_opacity: self.province_outline(zoom),
                // Labels step off at the far edge instead of fading.
                label_opacity: if zoom < self.threshold + CROSSFADE_HALF_WIDTH {
                    1.0
                } else {
                    0.0
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use costmap_shared::Granularity;

    use super::{LayerPaint, ZoomSwitch};

    #[test]
    fn district_active_at_and_above_threshold() {
        let switch = ZoomSwitch::default();
        for zoom in [7.5, 7.500_001, 8.0, 9.0] {
            assert_eq!(switch.active_granularity(zoom), Granularity::District, "zoom {zoom}");
        }
        for zoom in [5.0, 7.0, 7.499_999] {
            assert_eq!(switch.active_granularity(zoom), Granularity::Province, "zoom {zoom}");
        }
    }

    #[test]
    fn threshold_is_configurable() {
        let switch = ZoomSwitch::new(6.0);
        assert_eq!(switch.active_granularity(6.0), Granularity::District);
        assert_eq!(switch.active_granularity(5.9), Granularity::Province);
        assert!(switch.is_active(Granularity::Province, 5.0));
        assert!(!switch.is_active(Granularity::District, 5.0));
    }

    #[test]
    fn province_outline_lingers_past_the_fill() {
        let switch = ZoomSwitch::default();

        let below = switch.layer_paint(Granularity::Province, 7.4);
        assert_eq!(below.outline_opacity, 1.0);
        assert!(below.fill_opacity < 1.0);

        let mid = switch.layer_paint(Granularity::Province, 8.0);
        assert_eq!(mid.outline_opacity, 0.5);
        assert_eq!(mid.fill_opacity, 0.0);

        assert_eq!(switch.layer_paint(Granularity::Province, 8.5).outline_opacity, 0.0);
        assert_eq!(switch.layer_paint(Granularity::Province, 7.5).outline_opacity, 1.0);
    }

    #[test]
    fn paint_is_fully_visible_on_the_active_side() {
        let switch = ZoomSwitch::default();

        assert_eq!(
            switch.layer_paint(Granularity::Province, 5.0),
            LayerPaint {
                fill_opacity: 1.0,
                outline_opacity: 1.0,
                label_opacity: 1.0,
            }
        );
        assert_eq!(
            switch.layer_paint(Granularity::District, 5.0),
            LayerPaint {
                fill_opacity: 0.0,
                outline_opacity: 0.0,
                label_opacity: 0.0,
            }
        );
        assert_eq!(
            switch.layer_paint(Granularity::District, 8.5),
            LayerPaint {
                fill_opacity: 1.0,
                outline_opacity: 1.0,
                label_opacity: 1.0,
            }
        );
        assert_eq!(
            switch.layer_paint(Granularity::Province, 8.5),
            LayerPaint {
                fill_opacity: 0.0,
                outline_opacity: 0.0,
                label_opacity: 0.0,
            }
        );
    }

    #[test]
    fn crossfade_band_straddles_threshold() {
        let switch = ZoomSwitch::default();

        let at_threshold = switch.layer_paint(Granularity::District, 7.5);
        assert_eq!(at_threshold.fill_opacity, 0.5);

        let province = switch.layer_paint(Granularity::Province, 7.25);
        assert_eq!(province.fill_opacity, 0.75);
        assert_eq!(province.label_opacity, 1.0);

        assert_eq!(switch.layer_paint(Granularity::Province, 8.0).label_opacity, 0.0);
        assert_eq!(switch.layer_paint(Granularity::District, 7.0).fill_opacity, 0.0);
        assert_eq!(switch.layer_paint(Granularity::District, 8.0).fill_opacity, 1.0);
    }
}
