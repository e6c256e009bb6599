//! Concurrent assembly of image mosaics from block fetches.

use image::{Rgb, RgbImage};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::source::{BlockRequest, FetchOutcome, RasterSource};
use super::window::PixelWindow;
use super::MosaicError;
use crate::config::{DEFAULT_COLOR_RESOLUTION, DEFAULT_MAX_BLOCK_SIZE, DEFAULT_WMS_CONCURRENCY};
use crate::extent::Extent;

/// Value of mosaic pixels with no imagery.
pub const NO_DATA_PIXEL: Rgb<u8> = Rgb([255, 255, 255]);

/// Mosaic settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MosaicConfig {
    resolution: f64,
    max_block_size: u32,
    concurrency: usize,
    crs: String,
}

impl MosaicConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ground size of a pixel.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets the largest block edge, in pixels, of a single request.
    pub fn with_max_block_size(mut self, max_block_size: u32) -> Self {
        self.max_block_size = max_block_size.max(1);
        self
    }

    /// Sets the number of blocks fetched at the same time.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sets the reference system requests are expressed in.
    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = crs.into();
        self
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn max_block_size(&self) -> u32 {
        self.max_block_size
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_COLOR_RESOLUTION,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            concurrency: DEFAULT_WMS_CONCURRENCY,
            crs: "EPSG:2154".to_string(),
        }
    }
}

/// An image covering a pixel window.
#[derive(Debug, Clone, PartialEq)]
pub struct Mosaic {
    window: PixelWindow,
    resolution: f64,
    image: RgbImage,
    /// Blocks the source had no imagery for
    blank_blocks: Vec<PixelWindow>,
    blocks: usize,
}

impl Mosaic {
    /// Wraps an image covering `window`.
    pub fn new(window: PixelWindow, resolution: f64, image: RgbImage) -> Result<Self, MosaicError> {
        if image.dimensions() != (window.width, window.height) {
            return Err(MosaicError::InvalidRequest(format!(
                "image is {}x{}, window is {}x{}",
                image.width(),
                image.height(),
                window.width,
                window.height
            )));
        }
        Ok(Self {
            window,
            resolution,
            image,
            blank_blocks: Vec::new(),
            blocks: 1,
        })
    }

    pub fn window(&self) -> &PixelWindow {
        &self.window
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn extent(&self) -> Extent {
        self.window.extent(self.resolution)
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn block_count(&self) -> usize {
        self.blocks
    }

    pub fn blank_block_count(&self) -> usize {
        self.blank_blocks.len()
    }

    /// Image coordinates of the pixel containing ground point `(x, y)`.
    ///
    /// Points outside the mosaic map to the nearest edge pixel.
    pub fn pixel_coords(&self, x: f64, y: f64) -> (u32, u32) {
        let extent = self.extent();
        let col = ((x - extent.xmin) / self.resolution).floor();
        let row = ((extent.ymax - y) / self.resolution).floor();
        (
            clamp_index(col, self.image.width()),
            clamp_index(row, self.image.height()),
        )
    }

    pub fn sample(&self, x: f64, y: f64) -> Rgb<u8> {
        let (col, row) = self.pixel_coords(x, y);
        *self.image.get_pixel(col, row)
    }

    /// Whether ground point `(x, y)` falls in a block without imagery.
    pub fn is_no_data(&self, x: f64, y: f64) -> bool {
        let (col, row) = self.pixel_coords(x, y);
        self.blank_blocks.iter().any(|block| {
            let (x0, y0) = self.window.offset_of(block);
            col >= x0 && col < x0 + block.width && row >= y0 && row < y0 + block.height
        })
    }

    /// Writes the image; the format follows the file extension.
    pub fn save(&self, path: &Path) -> Result<(), MosaicError> {
        self.image.save(path).map_err(|e| MosaicError::Save {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

fn clamp_index(index: f64, len: u32) -> u32 {
    if index.is_nan() || index < 0.0 {
        0
    } else {
        (index as u64).min(len.saturating_sub(1) as u64) as u32
    }
}

/// Builds mosaics by fetching blocks concurrently from a source.
pub struct ImageMosaicBuilder<S> {
    source: Arc<S>,
    config: MosaicConfig,
}

impl<S: RasterSource + 'static> ImageMosaicBuilder<S> {
    pub fn new(source: Arc<S>, config: MosaicConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    /// Fetches the imagery of `layer` over `extent`.
    ///
    /// The pixel window covering the extent is split in blocks of at most
    /// `max_block_size` pixels per axis, fetched with at most `concurrency`
    /// requests in flight. Failed fetches are not retried: the first one
    /// aborts the build. Blocks without imagery are left white; when no
    /// block has imagery the build fails with [`MosaicError::NoData`].
    #[instrument(level = "debug", skip_all, fields(layer = %layer))]
    pub async fn build(&self, extent: &Extent, layer: &str) -> Result<Mosaic, MosaicError> {
        let resolution = self.config.resolution;
        let window = PixelWindow::covering(extent, resolution)?;
        let blocks = window.partition(self.config.max_block_size);
        let total = blocks.len();

        debug!(
            width = window.width,
            height = window.height,
            blocks = total,
            "Fetching mosaic blocks"
        );

        let limiter = Arc::new(Semaphore::new(self.config.concurrency));
        let mut fetches = JoinSet::new();
        for block in blocks {
            let request = BlockRequest {
                layer: layer.to_string(),
                crs: self.config.crs.clone(),
                extent: block.extent(resolution),
                width: block.width,
                height: block.height,
            };
            let source = Arc::clone(&self.source);
            let limiter = Arc::clone(&limiter);
            fetches.spawn(async move {
                let _permit = limiter
                    .acquire_owned()
                    .await
                    .map_err(|e| MosaicError::Task(e.to_string()))?;
                let outcome = source.fetch(&request).await?;
                Ok::<_, MosaicError>((block, outcome))
            });
        }

        let mut canvas = RgbImage::from_pixel(window.width, window.height, NO_DATA_PIXEL);
        let mut blank_blocks = Vec::new();

        // Returning early drops the set, which aborts the remaining fetches
        while let Some(result) = fetches.join_next().await {
            match result {
                Ok(Ok((block, FetchOutcome::Image(image)))) => {
                    let (x, y) = window.offset_of(&block);
                    place_block(&mut canvas, &image, x, y);
                }
                Ok(Ok((block, FetchOutcome::NoData))) => {
                    debug!(col = block.col, top = block.top, "Block without imagery");
                    blank_blocks.push(block);
                }
                Ok(Err(e)) => {
                    warn!(layer = %layer, error = %e, "Block fetch failed");
                    return Err(e);
                }
                Err(join_err) => {
                    warn!(error = %join_err, "Fetch task panicked");
                    return Err(MosaicError::Task(join_err.to_string()));
                }
            }
        }

        if total > 0 && blank_blocks.len() == total {
            return Err(MosaicError::NoData {
                layer: layer.to_string(),
            });
        }

        info!(
            layer = %layer,
            width = window.width,
            height = window.height,
            blocks = total,
            blank = blank_blocks.len(),
            "Built mosaic"
        );

        Ok(Mosaic {
            window,
            resolution,
            image: canvas,
            blank_blocks,
            blocks: total,
        })
    }
}

/// Copies a block into the canvas at the given offset.
fn place_block(canvas: &mut RgbImage, block: &RgbImage, x_offset: u32, y_offset: u32) {
    let width = block.width().min(canvas.width().saturating_sub(x_offset));
    let height = block.height().min(canvas.height().saturating_sub(y_offset));

    for y in 0..height {
        for x in 0..width {
            canvas.put_pixel(x_offset + x, y_offset + y, *block.get_pixel(x, y));
        }
    }
}
