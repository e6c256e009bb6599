//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let srs = config.output.srs.as_deref().unwrap_or("");

    format!(
        r#"[grid]
; Tile width in ground units (default: 1000)
tile_width = {}
; Ground units per file name coordinate unit (default: 1000, coordinates in km)
coord_scale = {}
; Corner designated by the file name coordinates:
;   upper-left - x is the west edge, y the north edge
;   lower-left - x is the west edge, y the south edge
origin = {}

[buffer]
; Width of the margin borrowed from neighbor tiles, in ground units (default: 100)
distance = {}

[color]
; Ground size of an orthoimage pixel (default: 0.2)
resolution = {}
; Maximum width and height of a single WMS request, in pixels (default: 5000)
max_block_size = {}
; HTTP timeout in seconds (default: 300)
timeout = {}
; Concurrent WMS requests per image (default: 4, max: 16)
concurrency = {}
; WMS endpoint
wms_url = {}
; Layer providing Red, Green and Blue
rgb_layer = {}
; Layer providing Infrared
irc_layer = {}
; Image format requested from the WMS
image_format = {}

[output]
; Spatial reference of the tiles, e.g. EPSG:2154
; If empty, read from the GeoKey or WKT records of each file
srs = {}

[logging]
; Log file path
file = {}
"#,
        config.grid.tile_width,
        config.grid.coord_scale,
        config.grid.origin,
        config.buffer.distance,
        config.color.resolution,
        config.color.max_block_size,
        config.color.timeout,
        config.color.concurrency,
        config.color.wms_url,
        config.color.rgb_layer,
        config.color.irc_layer,
        config.color.image_format,
        srs,
        path_to_string(&config.logging.file),
    )
}

/// Render a path with the home directory shortened to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridOrigin;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.grid.origin = GridOrigin::LowerLeft;
        config.buffer.distance = 25.5;
        config.color.concurrency = 8;
        config.output.srs = Some("EPSG:2154".to_string());
        config.logging.file = temp_dir.path().join("run.log");

        config.save_to(&path).unwrap();
        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_defaults_are_commented() {
        let content = to_config_string(&ConfigFile::default());
        assert!(content.contains("[color]"));
        assert!(content.contains("origin = upper-left"));
        assert!(content.contains("srs = \n"));
    }
}
