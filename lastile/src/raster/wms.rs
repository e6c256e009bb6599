//! WMS GetMap imagery source.

use std::fmt::Write as _;
use tracing::{debug, warn};

use super::http::AsyncHttpClient;
use super::source::{is_blank, BlockRequest, FetchError, FetchOutcome, RasterSource};

/// Géoplateforme raster WMS endpoint.
pub const DEFAULT_WMS_URL: &str = "https://data.geopf.fr/wms-r/wms";

/// Requested image format. GeoTIFF keeps the full radiometry of the layers.
pub const DEFAULT_IMAGE_FORMAT: &str = "image/geotiff";

/// Longest service exception message kept in errors.
const MAX_EXCEPTION_LEN: usize = 300;

/// Imagery source backed by a WMS 1.3.0 server.
pub struct WmsSource<C: AsyncHttpClient> {
    client: C,
    base_url: String,
    format: String,
}

impl<C: AsyncHttpClient> WmsSource<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            base_url: DEFAULT_WMS_URL.to_string(),
            format: DEFAULT_IMAGE_FORMAT.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// GetMap URL of a block.
    pub fn request_url(&self, request: &BlockRequest) -> String {
        let e = &request.extent;
        let mut url = String::with_capacity(self.base_url.len() + 256);
        url.push_str(&self.base_url);
        url.push(if self.base_url.contains('?') { '&' } else { '?' });
        // Writing to a String cannot fail
        let _ = write!(
            url,
            "LAYERS={}&EXCEPTIONS=text/xml&FORMAT={}&SERVICE=WMS&VERSION=1.3.0&REQUEST=GetMap\
             &STYLES=&CRS={}&BBOX={},{},{},{}&WIDTH={}&HEIGHT={}",
            request.layer,
            self.format,
            request.crs,
            e.xmin,
            e.ymin,
            e.xmax,
            e.ymax,
            request.width,
            request.height
        );
        url
    }
}

impl<C: AsyncHttpClient> RasterSource for WmsSource<C> {
    async fn fetch(&self, request: &BlockRequest) -> Result<FetchOutcome, FetchError> {
        let url = self.request_url(request);
        debug!(layer = %request.layer, width = request.width, height = request.height, "GetMap");
        let body = self.client.get(&url).await?;
        decode_block(&url, &body, request)
    }
}

/// Decodes a GetMap response.
///
/// XML bodies are service exceptions. An entirely white image means the
/// layer has no data over the block.
pub fn decode_block(
    url: &str,
    body: &[u8],
    request: &BlockRequest,
) -> Result<FetchOutcome, FetchError> {
    if body.trim_ascii_start().starts_with(b"<") {
        let message: String = String::from_utf8_lossy(body)
            .chars()
            .take(MAX_EXCEPTION_LEN)
            .collect();
        warn!(url = url, "WMS service exception");
        return Err(FetchError::ServiceException {
            url: url.to_string(),
            message: message.trim().to_string(),
        });
    }

    let image = image::load_from_memory(body)
        .map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?
        .to_rgb8();

    if image.width() != request.width || image.height() != request.height {
        return Err(FetchError::SizeMismatch {
            url: url.to_string(),
            width: request.width,
            height: request.height,
            actual_width: image.width(),
            actual_height: image.height(),
        });
    }

    if is_blank(&image) {
        debug!(url = url, "Blank block");
        return Ok(FetchOutcome::NoData);
    }
    Ok(FetchOutcome::Image(image))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::extent::Extent;
    use crate::raster::http::tests::MockAsyncHttpClient;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn request(width: u32, height: u32) -> BlockRequest {
        BlockRequest {
            layer: "ORTHOIMAGERY.ORTHOPHOTOS".to_string(),
            crs: "EPSG:2154".to_string(),
            extent: Extent::new(770_000.0, 6_277_000.0, 771_000.0, 6_278_000.0),
            width,
            height,
        }
    }

    #[test]
    fn test_request_url() {
        let source = WmsSource::new(MockAsyncHttpClient::new(Ok(Vec::new())));
        assert_eq!(
            source.request_url(&request(5000, 5000)),
            "https://data.geopf.fr/wms-r/wms?LAYERS=ORTHOIMAGERY.ORTHOPHOTOS\
             &EXCEPTIONS=text/xml&FORMAT=image/geotiff&SERVICE=WMS&VERSION=1.3.0\
             &REQUEST=GetMap&STYLES=&CRS=EPSG:2154\
             &BBOX=770000,6277000,771000,6278000&WIDTH=5000&HEIGHT=5000"
        );
    }

    #[test]
    fn test_request_url_with_query() {
        let source = WmsSource::new(MockAsyncHttpClient::new(Ok(Vec::new())))
            .with_base_url("http://localhost/wms?map=ortho")
            .with_format("image/png");
        let url = source.request_url(&request(2, 2));
        assert!(url.starts_with("http://localhost/wms?map=ortho&LAYERS="));
        assert!(url.contains("FORMAT=image/png"));
    }

    #[tokio::test]
    async fn test_fetch_image() {
        let image = RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]));
        let client = MockAsyncHttpClient::new(Ok(png_bytes(&image)));
        let source = WmsSource::new(client.clone());

        let outcome = source.fetch(&request(4, 2)).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Image(image));
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_white_image_is_no_data() {
        let image = RgbImage::from_pixel(4, 2, Rgb([255, 255, 255]));
        let source = WmsSource::new(MockAsyncHttpClient::new(Ok(png_bytes(&image))));
        assert_eq!(
            source.fetch(&request(4, 2)).await.unwrap(),
            FetchOutcome::NoData
        );
    }

    #[tokio::test]
    async fn test_service_exception() {
        let body = b"<?xml version=\"1.0\"?><ServiceExceptionReport>LayerNotDefined</ServiceExceptionReport>";
        let source = WmsSource::new(MockAsyncHttpClient::new(Ok(body.to_vec())));
        let err = source.fetch(&request(4, 2)).await.unwrap_err();
        assert!(matches!(err, FetchError::ServiceException { ref message, .. } if message.contains("LayerNotDefined")));
    }

    #[test]
    fn test_size_mismatch() {
        let image = RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]));
        let err = decode_block("u", &png_bytes(&image), &request(4, 2)).unwrap_err();
        assert!(matches!(err, FetchError::SizeMismatch { actual_width: 3, .. }));
    }

    #[test]
    fn test_garbage_body() {
        let err = decode_block("u", b"not an image", &request(4, 2)).unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }
}
