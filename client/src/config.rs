use std::time::Duration;

use costmap_shared::LngLat;

/// Zoom at which districts take over from provinces.
pub const DEFAULT_ZOOM_THRESHOLD: f64 = 7.5;
/// Half-width of the opacity crossfade around the threshold.
pub const CROSSFADE_HALF_WIDTH: f64 = 0.5;

pub const DEFAULT_API_BASE: &str = "https://opendata.id";
pub const DEFAULT_COST_YEAR: u16 = 2025;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 3;

// Camera
pub const DEFAULT_CENTER: LngLat = LngLat::new(118.0, -2.0);
pub const DEFAULT_ZOOM: f64 = 5.0;
pub const MIN_ZOOM: f64 = 5.0;
pub const MAX_ZOOM: f64 = 9.0;
pub const MIN_PITCH: f64 = 0.0;
pub const MAX_PITCH: f64 = 60.0;
pub const PITCH_STEP: f64 = 15.0;
pub const ZOOM_STEP: f64 = 1.0;
pub const CAMERA_STEP_DURATION_MS: u32 = 200;
pub const RESET_VIEW_DURATION_MS: u32 = 500;

/// Runtime configuration for one map session.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub zoom_threshold: f64,
    pub api_base: String,
    pub cost_year: u16,
    pub http_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom_threshold: DEFAULT_ZOOM_THRESHOLD,
            api_base: DEFAULT_API_BASE.to_string(),
            cost_year: DEFAULT_COST_YEAR,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl MapConfig {
    pub fn from_env() -> Self {
        Self {
            zoom_threshold: zoom_threshold(),
            api_base: api_base(),
            cost_year: cost_year(),
            http_timeout: http_timeout(),
            connect_timeout: connect_timeout(),
        }
    }
}

pub fn zoom_threshold() -> f64 {
    std::env::var("COSTMAP_ZOOM_THRESHOLD")
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && (MIN_ZOOM..=MAX_ZOOM).contains(value))
        .unwrap_or(DEFAULT_ZOOM_THRESHOLD)
}

pub fn api_base() -> String {
    std::env::var("COSTMAP_API_BASE")
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| value.starts_with("http://") || value.starts_with("https://"))
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

pub fn cost_year() -> u16 {
    std::env::var("COSTMAP_COST_YEAR")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| *value >= 2000)
        .unwrap_or(DEFAULT_COST_YEAR)
}

pub fn http_timeout() -> Duration {
    std::env::var("COSTMAP_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
}

pub fn connect_timeout() -> Duration {
    std::env::var("COSTMAP_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
}
