//! File-level colorization workflow.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{colorize, BandMapping, ColorError, ColorReport};
use crate::cloud::Dimension;
use crate::codec::{srs, PointCloudCodec, WriteOptions};
use crate::config::{DEFAULT_IRC_LAYER, DEFAULT_RGB_LAYER};
use crate::error::TileError;
use crate::extent::ExtentResolver;
use crate::raster::{ImageMosaicBuilder, MosaicConfig, MosaicError, RasterSource};

/// Kind of imagery layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageryKind {
    /// Natural color, feeding Red, Green and Blue
    Rgb,
    /// False color infrared, feeding Infrared
    Irc,
}

impl ImageryKind {
    pub fn mapping(self) -> BandMapping {
        match self {
            ImageryKind::Rgb => BandMapping::rgb(),
            ImageryKind::Irc => BandMapping::infrared(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            ImageryKind::Rgb => "rgb",
            ImageryKind::Irc => "irc",
        }
    }
}

impl fmt::Display for ImageryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Colorization settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorizeConfig {
    mosaic: MosaicConfig,
    rgb_layer: Option<String>,
    irc_layer: Option<String>,
    check_images: bool,
    crs: Option<String>,
    image_dir: Option<PathBuf>,
}

impl ColorizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mosaic(mut self, mosaic: MosaicConfig) -> Self {
        self.mosaic = mosaic;
        self
    }

    /// Sets the RGB layer, `None` to skip natural colors.
    pub fn with_rgb_layer(mut self, layer: Option<String>) -> Self {
        self.rgb_layer = layer;
        self
    }

    /// Sets the IRC layer, `None` to skip infrared.
    pub fn with_irc_layer(mut self, layer: Option<String>) -> Self {
        self.irc_layer = layer;
        self
    }

    /// Makes blank imagery an error instead of a warning.
    pub fn with_check_images(mut self, check: bool) -> Self {
        self.check_images = check;
        self
    }

    /// Forces the reference system of the inputs (`2154` or `EPSG:2154`).
    pub fn with_crs(mut self, crs: Option<String>) -> Self {
        self.crs = crs;
        self
    }

    /// Keeps the fetched mosaics as PNG files in `dir`.
    pub fn with_image_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.image_dir = dir;
        self
    }

    pub fn mosaic(&self) -> &MosaicConfig {
        &self.mosaic
    }

    /// Requested layers, RGB first.
    pub fn layers(&self) -> Vec<(ImageryKind, &str)> {
        let mut layers = Vec::with_capacity(2);
        if let Some(layer) = &self.rgb_layer {
            layers.push((ImageryKind::Rgb, layer.as_str()));
        }
        if let Some(layer) = &self.irc_layer {
            layers.push((ImageryKind::Irc, layer.as_str()));
        }
        layers
    }

    pub fn check_images(&self) -> bool {
        self.check_images
    }
}

impl Default for ColorizeConfig {
    fn default() -> Self {
        Self {
            mosaic: MosaicConfig::default(),
            rgb_layer: Some(DEFAULT_RGB_LAYER.to_string()),
            irc_layer: Some(DEFAULT_IRC_LAYER.to_string()),
            check_images: false,
            crs: None,
            image_dir: None,
        }
    }
}

/// Outcome of one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerReport {
    pub kind: ImageryKind,
    pub layer: String,
    /// `None` when the layer had no imagery and was skipped
    pub report: Option<ColorReport>,
}

/// Outcome of [`Colorizer::colorize_file`].
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSummary {
    pub points: usize,
    pub crs: String,
    pub layers: Vec<LayerReport>,
}

/// Colorizes files from a raster source.
pub struct Colorizer<S> {
    source: Arc<S>,
    config: ColorizeConfig,
}

impl<S: RasterSource + 'static> Colorizer<S> {
    pub fn new(source: Arc<S>, config: ColorizeConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ColorizeConfig {
        &self.config
    }

    /// Colorizes `input` into `output`.
    ///
    /// The mosaic of each layer covers the snapped extent of the points.
    /// The color dimensions of every requested layer are written even when
    /// the layer has no imagery over the tile, in which case they stay at
    /// zero and a warning is logged, unless images are checked.
    #[instrument(level = "debug", skip_all, fields(input = %input.display()))]
    pub async fn colorize_file<C: PointCloudCodec + ?Sized>(
        &self,
        input: &Path,
        output: &Path,
        codec: &C,
        options: &WriteOptions,
    ) -> Result<ColorSummary, TileError> {
        let layers = self.config.layers();
        if layers.is_empty() {
            return Err(ColorError::NoLayer.into());
        }

        let mut cloud = codec.read(input)?;
        let crs = self.resolve_crs(input, &cloud.header().crs)?;
        let extent = ExtentResolver::new(self.config.mosaic.resolution()).resolve(&cloud);
        let builder = ImageMosaicBuilder::new(
            Arc::clone(&self.source),
            self.config.mosaic.clone().with_crs(crs.clone()),
        );

        let mut reports = Vec::with_capacity(layers.len());
        for (kind, layer) in layers {
            let mapping = kind.mapping();
            let mosaic = match builder.build(&extent, layer).await {
                Ok(mosaic) => mosaic,
                Err(MosaicError::NoData { .. }) => {
                    if self.config.check_images {
                        return Err(self.blank(layer, input));
                    }
                    warn!(
                        input = %input.display(),
                        layer = %layer,
                        "No imagery over the tile, {} dimensions left empty",
                        kind
                    );
                    for (dimension, _) in mapping.bands() {
                        cloud.ensure_dimension(dimension.clone());
                    }
                    reports.push(LayerReport {
                        kind,
                        layer: layer.to_string(),
                        report: None,
                    });
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if let Some(dir) = &self.config.image_dir {
                mosaic.save(&image_path(dir, input, kind))?;
            }

            let (colored, report) = colorize(cloud, &mosaic, &mapping);
            if report.is_suspicious() && self.config.check_images {
                return Err(self.blank(layer, input));
            }
            cloud = colored;
            reports.push(LayerReport {
                kind,
                layer: layer.to_string(),
                report: Some(report),
            });
        }

        codec.write(&cloud, output, options)?;

        info!(
            input = %input.display(),
            output = %output.display(),
            points = cloud.len(),
            crs = %crs,
            infrared = cloud.schema().contains(&Dimension::Infrared),
            "Colorized"
        );
        Ok(ColorSummary {
            points: cloud.len(),
            crs,
            layers: reports,
        })
    }

    fn resolve_crs(
        &self,
        input: &Path,
        records: &[crate::cloud::CrsRecord],
    ) -> Result<String, ColorError> {
        if let Some(crs) = &self.config.crs {
            return Ok(normalize_crs(crs));
        }
        srs::epsg_from_crs(records)
            .map(|code| format!("EPSG:{}", code))
            .ok_or_else(|| ColorError::UnknownCrs {
                path: input.to_path_buf(),
            })
    }

    fn blank(&self, layer: &str, input: &Path) -> TileError {
        ColorError::BlankImagery {
            layer: layer.to_string(),
            path: input.to_path_buf(),
        }
        .into()
    }
}

/// `2154` becomes `EPSG:2154`; other forms are kept.
fn normalize_crs(crs: &str) -> String {
    let crs = crs.trim();
    if !crs.is_empty() && crs.bytes().all(|b| b.is_ascii_digit()) {
        format!("EPSG:{}", crs)
    } else {
        crs.to_string()
    }
}

fn image_path(dir: &Path, input: &Path, kind: ImageryKind) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tile".to_string());
    dir.join(format!("{}_{}.png", stem, kind))
}
