// Image conversion service - Decode any readable raster image and re-encode it
use crate::domain::image_format::OutputFormat;
use bytes::Bytes;
use image::{DynamicImage, ImageError};
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("{0}")]
    Image(#[from] ImageError),
}

#[derive(Debug, Clone)]
pub struct ConvertedImage {
    pub format: OutputFormat,
    pub bytes: Bytes,
}

impl ConvertedImage {
    pub fn mime_type(&self) -> String {
        self.format.mime_type()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageConversionService;

impl ImageConversionService {
    pub fn new() -> Self {
        Self
    }

    /// Decode `input` and re-encode it as `format`.
    ///
    /// CPU bound; call from a blocking context.
    pub fn convert(&self, input: &[u8], format: OutputFormat) -> Result<ConvertedImage, ConversionError> {
        let decoded = image::load_from_memory(input)?;
        tracing::debug!(
            "Decoded {}x{} image ({:?}), encoding as {}",
            decoded.width(),
            decoded.height(),
            decoded.color(),
            format
        );

        let prepared = prepare_for(decoded, format);
        let mut output = Cursor::new(Vec::new());
        prepared.write_to(&mut output, format.image_format())?;

        Ok(ConvertedImage {
            format,
            bytes: Bytes::from(output.into_inner()),
        })
    }
}

/// Narrow the pixel layout to one the target encoder can store
fn prepare_for(image: DynamicImage, format: OutputFormat) -> DynamicImage {
    let has_alpha = image.color().has_alpha();
    match format {
        OutputFormat::Jpeg => match image {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
            DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLumaA16(_) => {
                DynamicImage::ImageLuma8(image.to_luma8())
            }
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        },
        OutputFormat::Gif => match image {
            DynamicImage::ImageRgba8(_) => image,
            other => DynamicImage::ImageRgba8(other.to_rgba8()),
        },
        OutputFormat::Bmp => match image {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
            other if has_alpha => DynamicImage::ImageRgba8(other.to_rgba8()),
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        },
        OutputFormat::Png => match image {
            DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb16(image.to_rgb16()),
            DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba16(image.to_rgba16()),
            other => other,
        },
    }
}
