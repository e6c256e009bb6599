//! Default values and constants for all configuration settings.

use super::file::config_directory;
use super::settings::*;
use crate::grid::{GridOrigin, DEFAULT_COORD_SCALE, DEFAULT_TILE_WIDTH};
use crate::raster::http::DEFAULT_TIMEOUT_SECS;
use crate::raster::{DEFAULT_IMAGE_FORMAT, DEFAULT_WMS_URL};

/// Default buffer margin, in ground units.
pub const DEFAULT_BUFFER_DISTANCE: f64 = 100.0;

/// Default ground size of an orthoimage pixel.
pub const DEFAULT_COLOR_RESOLUTION: f64 = 0.2;

/// Default maximum side of a WMS request, in pixels.
pub const DEFAULT_MAX_BLOCK_SIZE: u32 = 5000;

/// Default number of concurrent WMS requests.
pub const DEFAULT_WMS_CONCURRENCY: usize = 4;

/// Upper bound of WMS concurrency; the public service throttles beyond it.
pub const MAX_WMS_CONCURRENCY: usize = 16;

/// Default orthophoto layer.
pub const DEFAULT_RGB_LAYER: &str = "ORTHOIMAGERY.ORTHOPHOTOS";

/// Default infrared orthophoto layer.
pub const DEFAULT_IRC_LAYER: &str = "ORTHOIMAGERY.ORTHOPHOTOS.IRC";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "lastile.log";

/// Clamps WMS concurrency to `1..=MAX_WMS_CONCURRENCY`, warning when clamped.
pub(super) fn clamp_wms_concurrency(value: usize) -> usize {
    let clamped = value.clamp(1, MAX_WMS_CONCURRENCY);
    if clamped != value {
        tracing::warn!(
            requested = value,
            max = MAX_WMS_CONCURRENCY,
            "concurrency out of range, clamping to {}",
            clamped
        );
    }
    clamped
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            tile_width: DEFAULT_TILE_WIDTH,
            coord_scale: DEFAULT_COORD_SCALE,
            origin: GridOrigin::UpperLeft,
        }
    }
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            distance: DEFAULT_BUFFER_DISTANCE,
        }
    }
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_COLOR_RESOLUTION,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            timeout: DEFAULT_TIMEOUT_SECS,
            concurrency: DEFAULT_WMS_CONCURRENCY,
            wms_url: DEFAULT_WMS_URL.to_string(),
            rgb_layer: DEFAULT_RGB_LAYER.to_string(),
            irc_layer: DEFAULT_IRC_LAYER.to_string(),
            image_format: DEFAULT_IMAGE_FORMAT.to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: config_directory().join(DEFAULT_LOG_FILE),
        }
    }
}
