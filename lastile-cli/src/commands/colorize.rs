//! Colorize command - color points from WMS orthoimagery.
//!
//! The RGB layer feeds Red, Green and Blue; the IRC layer feeds Infrared.
//! Command line flags override the `[color]` and `[output]` sections of the
//! configuration.

use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use lastile::color::{ColorizeConfig, Colorizer};
use lastile::config::ConfigFile;
use lastile::raster::{AsyncReqwestClient, WmsSource};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the colorize command.
#[derive(Debug, Args)]
pub struct ColorizeArgs {
    /// File to colorize
    pub input: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Ground size of an image pixel (default: from config)
    #[arg(short, long)]
    pub resolution: Option<f64>,

    /// Spatial reference of the file, e.g. 2154 or EPSG:2154
    /// (default: from config, then from the file)
    #[arg(long, value_name = "CRS")]
    pub epsg: Option<String>,

    /// WMS layer for Red, Green and Blue (default: from config)
    #[arg(long, value_name = "LAYER", conflicts_with = "no_rgb")]
    pub rgb_layer: Option<String>,

    /// WMS layer for Infrared (default: from config)
    #[arg(long, value_name = "LAYER", conflicts_with = "no_irc")]
    pub irc_layer: Option<String>,

    /// Do not fetch the RGB layer
    #[arg(long)]
    pub no_rgb: bool,

    /// Do not fetch the IRC layer
    #[arg(long)]
    pub no_irc: bool,

    /// Fail instead of warning when the imagery looks blank
    #[arg(long)]
    pub check_images: bool,

    /// Save the fetched mosaics as PNG in this directory
    #[arg(long, value_name = "DIR")]
    pub image_dir: Option<PathBuf>,

    /// WMS endpoint (default: from config)
    #[arg(long, value_name = "URL")]
    pub wms_url: Option<String>,
}

impl ColorizeArgs {
    /// Library settings from the configuration and the flags.
    fn colorize_config(&self, config: &ConfigFile) -> ColorizeConfig {
        let mut mosaic = config.mosaic_config();
        if let Some(resolution) = self.resolution {
            mosaic = mosaic.with_resolution(resolution);
        }

        let rgb_layer = (!self.no_rgb).then(|| {
            self.rgb_layer
                .clone()
                .unwrap_or_else(|| config.color.rgb_layer.clone())
        });
        let irc_layer = (!self.no_irc).then(|| {
            self.irc_layer
                .clone()
                .unwrap_or_else(|| config.color.irc_layer.clone())
        });

        ColorizeConfig::new()
            .with_mosaic(mosaic)
            .with_rgb_layer(rgb_layer)
            .with_irc_layer(irc_layer)
            .with_crs(self.epsg.clone().or_else(|| config.output.srs.clone()))
            .with_check_images(self.check_images)
            .with_image_dir(self.image_dir.clone())
    }
}

/// Run the colorize command.
pub fn run(args: ColorizeArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("colorize");
    let config = runner.config();

    if args.no_rgb && args.no_irc {
        return Err(CliError::Config(
            "--no-rgb and --no-irc leave no layer to fetch".to_string(),
        ));
    }
    if let Some(resolution) = args.resolution {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(CliError::Config(format!(
                "resolution must be positive, got {}",
                resolution
            )));
        }
    }

    let colorize_config = args.colorize_config(config);
    let wms_url = args.wms_url.as_deref().unwrap_or(&config.color.wms_url);

    let client =
        AsyncReqwestClient::with_timeout(config.color.timeout).map_err(CliError::HttpClient)?;
    let source = WmsSource::new(client)
        .with_base_url(wms_url)
        .with_format(config.color.image_format.as_str());
    let colorizer = Colorizer::new(Arc::new(source), colorize_config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    info!(wms_url = %wms_url, "Fetching orthoimagery");
    println!("Fetching orthoimagery from {}...", wms_url);
    let start = std::time::Instant::now();

    let summary = runtime.block_on(colorizer.colorize_file(
        &args.input,
        &args.output,
        runner.codec(),
        &runner.write_options(),
    ))?;

    println!(
        "Colorized {} points in {:.2}s ({})",
        summary.points,
        start.elapsed().as_secs_f64(),
        summary.crs
    );
    for layer in &summary.layers {
        match &layer.report {
            Some(report) => println!(
                "  {} {}: {:.1}% white, {} points without imagery",
                layer.kind,
                layer.layer,
                report.white_ratio() * 100.0,
                report.no_data_points
            ),
            None => println!("  {} {}: no imagery, left empty", layer.kind, layer.layer),
        }
    }
    println!("Written to {}", args.output.display());
    Ok(())
}
