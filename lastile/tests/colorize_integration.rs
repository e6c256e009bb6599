//! Colorization of a LAZ tile through the WMS source.
//!
//! The HTTP layer is replaced by a client rendering plain images of the
//! requested size, so the whole chain (extent snapping, block partition,
//! GetMap URLs, image decoding, sampling and LAZ output) runs offline.
//!
//! Run with: `cargo test --test colorize_integration`

mod common;

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};

use common::*;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lastile::cloud::{Dimension, Value};
use lastile::codec::{LasCodec, PointCloudCodec, WriteOptions};
use lastile::color::{ColorError, ColorizeConfig, Colorizer, ImageryKind};
use lastile::raster::{AsyncHttpClient, FetchError, MosaicConfig, WmsSource};
use lastile::TileError;

const TILE: &str = "Semis_2021_0770_6278_LA93_IGN69.laz";
const RGB_LAYER: &str = "ORTHOIMAGERY.ORTHOPHOTOS";
const IRC_LAYER: &str = "ORTHOIMAGERY.ORTHOPHOTOS.IRC";

// ============================================================================
// Mock Implementations
// ============================================================================

/// Serves a plain PNG per layer, sized after the WIDTH and HEIGHT of the
/// request.
#[derive(Clone, Default)]
struct PlainImageClient {
    colors: HashMap<String, Rgb<u8>>,
    urls: Arc<Mutex<Vec<String>>>,
}

impl PlainImageClient {
    fn with_layer(mut self, layer: &str, color: [u8; 3]) -> Self {
        self.colors.insert(layer.to_string(), Rgb(color));
        self
    }

    fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

fn query_value<'a>(url: &'a str, key: &str) -> Option<&'a str> {
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

impl AsyncHttpClient for PlainImageClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.urls.lock().unwrap().push(url.to_string());
        let width: u32 = query_value(url, "WIDTH").unwrap().parse().unwrap();
        let height: u32 = query_value(url, "HEIGHT").unwrap().parse().unwrap();
        let layer = query_value(url, "LAYERS").unwrap();
        let color = self
            .colors
            .get(layer)
            .copied()
            .unwrap_or(Rgb([255, 255, 255]));

        let image = RgbImage::from_pixel(width, height, color);
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        Ok(bytes)
    }
}

fn colorizer(client: PlainImageClient, check_images: bool) -> Colorizer<WmsSource<PlainImageClient>> {
    let source = WmsSource::new(client).with_format("image/png");
    let config = ColorizeConfig::new()
        .with_mosaic(
            MosaicConfig::new()
                .with_resolution(1.0)
                .with_max_block_size(400),
        )
        .with_rgb_layer(Some(RGB_LAYER.to_string()))
        .with_irc_layer(Some(IRC_LAYER.to_string()))
        .with_check_images(check_images);
    Colorizer::new(Arc::new(source), config)
}

fn write_input(dir: &Path) -> std::path::PathBuf {
    write_tile(
        dir,
        TILE,
        &tile_cloud(&[
            (770_000.5, 6_277_000.5, 10.0),
            (770_999.5, 6_277_999.5, 11.0),
            (770_500.0, 6_277_500.0, 12.0),
        ]),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_colorize_tile_with_both_layers() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = write_input(dir.path());
    let output = dir.path().join("colored.laz");
    let client = PlainImageClient::default()
        .with_layer(RGB_LAYER, [100, 150, 200])
        .with_layer(IRC_LAYER, [60, 70, 80]);

    let summary = colorizer(client.clone(), true)
        .colorize_file(&input, &output, &LasCodec::new(), &WriteOptions::new())
        .await
        .unwrap();

    assert_eq!(summary.points, 3);
    assert_eq!(summary.crs, "EPSG:2154");
    assert_eq!(summary.layers.len(), 2);
    assert_eq!(summary.layers[1].kind, ImageryKind::Irc);

    let urls = client.urls();
    // 1000 m at 1 m per pixel, snapped outward, in blocks of at most 400
    assert!(urls.len() >= 2 * 9, "{} requests", urls.len());
    assert!(urls.iter().all(|u| u.contains("CRS=EPSG:2154")));
    assert!(urls.iter().all(|u| query_value(u, "WIDTH").unwrap().parse::<u32>().unwrap() <= 400));

    let colored = LasCodec::new().read(&output).unwrap();
    for i in 0..colored.len() {
        assert_eq!(colored.value(i, &Dimension::Red), Some(Value::U16(100 * 256)));
        assert_eq!(colored.value(i, &Dimension::Green), Some(Value::U16(150 * 256)));
        assert_eq!(colored.value(i, &Dimension::Blue), Some(Value::U16(200 * 256)));
        assert_eq!(colored.value(i, &Dimension::Infrared), Some(Value::U16(60 * 256)));
    }
    assert_eq!(colored.value(2, &Dimension::Intensity), Some(Value::U16(2)));
}

#[tokio::test]
async fn test_missing_imagery_leaves_dimensions_empty() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = write_input(dir.path());
    let output = dir.path().join("colored.laz");
    let client = PlainImageClient::default().with_layer(RGB_LAYER, [100, 150, 200]);

    let summary = colorizer(client, false)
        .colorize_file(&input, &output, &LasCodec::new(), &WriteOptions::new())
        .await
        .unwrap();

    assert!(summary.layers[0].report.is_some());
    assert!(summary.layers[1].report.is_none());
    let colored = LasCodec::new().read(&output).unwrap();
    assert_eq!(colored.value(0, &Dimension::Infrared), Some(Value::U16(0)));
    assert_eq!(colored.value(0, &Dimension::Red), Some(Value::U16(100 * 256)));
}

#[tokio::test]
async fn test_checked_images_reject_missing_imagery() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = write_input(dir.path());
    let output = dir.path().join("colored.laz");
    let client = PlainImageClient::default().with_layer(RGB_LAYER, [100, 150, 200]);

    let err = colorizer(client, true)
        .colorize_file(&input, &output, &LasCodec::new(), &WriteOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TileError::Color(ColorError::BlankImagery { ref layer, .. }) if layer == IRC_LAYER
    ));
    assert!(!output.exists());
}
