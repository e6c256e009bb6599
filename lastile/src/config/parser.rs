//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::clamp_wms_concurrency;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::grid::GridOrigin;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [grid] section
    if let Some(section) = ini.section(Some("grid")) {
        if let Some(v) = section.get("tile_width") {
            config.grid.tile_width = parse_positive("grid", "tile_width", v)?;
        }
        if let Some(v) = section.get("coord_scale") {
            config.grid.coord_scale = parse_positive("grid", "coord_scale", v)?;
        }
        if let Some(v) = section.get("origin") {
            config.grid.origin =
                GridOrigin::from_str(v).map_err(|_| ConfigFileError::InvalidValue {
                    section: "grid".to_string(),
                    key: "origin".to_string(),
                    value: v.to_string(),
                    reason: "must be 'upper-left' or 'lower-left'".to_string(),
                })?;
        }
    }

    // [buffer] section
    if let Some(section) = ini.section(Some("buffer")) {
        if let Some(v) = section.get("distance") {
            let distance: f64 = parse_value("buffer", "distance", v, "must be a number")?;
            if !distance.is_finite() || distance < 0.0 {
                return Err(invalid(
                    "buffer",
                    "distance",
                    v,
                    "must be a non-negative number",
                ));
            }
            config.buffer.distance = distance;
        }
    }

    // [color] section
    if let Some(section) = ini.section(Some("color")) {
        if let Some(v) = section.get("resolution") {
            config.color.resolution = parse_positive("color", "resolution", v)?;
        }
        if let Some(v) = section.get("max_block_size") {
            let size: u32 = parse_value(
                "color",
                "max_block_size",
                v,
                "must be a positive integer (pixels)",
            )?;
            if size == 0 {
                return Err(invalid("color", "max_block_size", v, "must be at least 1"));
            }
            config.color.max_block_size = size;
        }
        if let Some(v) = section.get("timeout") {
            config.color.timeout = parse_value(
                "color",
                "timeout",
                v,
                "must be a positive integer (seconds)",
            )?;
        }
        if let Some(v) = section.get("concurrency") {
            let concurrency: usize =
                parse_value("color", "concurrency", v, "must be a positive integer")?;
            config.color.concurrency = clamp_wms_concurrency(concurrency);
        }
        if let Some(v) = non_empty(section.get("wms_url")) {
            if !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(invalid("color", "wms_url", v, "must be an http(s) URL"));
            }
            config.color.wms_url = v.to_string();
        }
        if let Some(v) = non_empty(section.get("rgb_layer")) {
            config.color.rgb_layer = v.to_string();
        }
        if let Some(v) = non_empty(section.get("irc_layer")) {
            config.color.irc_layer = v.to_string();
        }
        if let Some(v) = non_empty(section.get("image_format")) {
            config.color.image_format = v.to_string();
        }
    }

    // [output] section
    if let Some(section) = ini.section(Some("output")) {
        if let Some(v) = non_empty(section.get("srs")) {
            config.output.srs = Some(v.to_string());
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section.get("file")) {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_positive(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    let parsed: f64 = parse_value(section, key, value, "must be a positive number")?;
    if parsed.is_finite() && parsed > 0.0 {
        Ok(parsed)
    } else {
        Err(invalid(section, key, value, "must be a positive number"))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
