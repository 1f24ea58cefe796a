//! Image handling for PDF generation.
//!
//! Images are embedded as Image XObjects (PDF spec Section 8.9). Decoding is
//! delegated to an [`ImageDecoder`]; this module turns the decoded samples
//! into stream payloads and dictionaries.
//!
//! # Supported Formats
//!
//! - **JPEG**: Pass-through embedding using DCTDecode filter
//! - **PNG, PPM/PGM/PBM, BMP**: decoded to 8-bit samples, FlateDecode
//! - **Raw RGB / grayscale buffers**: FlateDecode
//!
//! An alpha channel becomes a separate DeviceGray soft mask.

use std::io::Write;
use std::path::Path;

use crate::error::Error;
use crate::object::{Dict, Object, ObjectRef};

/// How the image payload is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image (DCTDecode filter)
    Jpeg,
    /// Zlib-compressed samples (FlateDecode filter)
    Flate,
}

/// Color space for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Grayscale (1 component per pixel)
    DeviceGray,
    /// RGB color (3 components per pixel)
    DeviceRGB,
}

impl ColorSpace {
    /// Get the number of color components.
    pub fn components(&self) -> u8 {
        match self {
            ColorSpace::DeviceGray => 1,
            ColorSpace::DeviceRGB => 3,
        }
    }

    /// Get the PDF name for this color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
        }
    }
}

/// Image embedding error.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Unsupported image format
    #[error("Unsupported image format")]
    UnsupportedFormat,

    /// Failed to decode image
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    /// Failed to compress image data
    #[error("Compression error: {0}")]
    CompressionError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),
}

impl From<ImageError> for Error {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Io(e) => Error::Io(e),
            other => Error::Decode(other.to_string()),
        }
    }
}

/// Image samples ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Bits per component (usually 8)
    pub bits_per_component: u8,
    /// Color space
    pub color_space: ColorSpace,
    /// Payload encoding
    pub format: ImageFormat,
    /// Encoded image data
    pub data: Vec<u8>,
    /// Optional soft mask (alpha channel), Flate-compressed
    pub soft_mask: Option<Vec<u8>>,
}

impl ImageData {
    /// Compress 8-bit samples for embedding after checking their length.
    pub fn from_samples(
        width: u32,
        height: u32,
        color_space: ColorSpace,
        samples: &[u8],
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidData(format!(
                "empty image ({}x{})",
                width, height
            )));
        }
        let expected = width as usize * height as usize * color_space.components() as usize;
        if samples.len() != expected {
            return Err(ImageError::InvalidData(format!(
                "expected {} bytes of {} samples for {}x{}, got {}",
                expected,
                color_space.pdf_name(),
                width,
                height,
                samples.len()
            )));
        }

        Ok(Self {
            width,
            height,
            bits_per_component: 8,
            color_space,
            format: ImageFormat::Flate,
            data: compress_image_data(samples)?,
            soft_mask: None,
        })
    }

    /// Embed packed 8-bit RGB pixels.
    pub fn from_rgb24(width: u32, height: u32, pixels: &[u8]) -> Result<Self, ImageError> {
        Self::from_samples(width, height, ColorSpace::DeviceRGB, pixels)
    }

    /// Embed 8-bit grayscale pixels.
    pub fn from_grayscale8(width: u32, height: u32, pixels: &[u8]) -> Result<Self, ImageError> {
        Self::from_samples(width, height, ColorSpace::DeviceGray, pixels)
    }

    /// Load a JPEG image from raw JPEG data.
    ///
    /// JPEG images can be embedded directly without transcoding.
    pub fn from_jpeg(data: Vec<u8>) -> Result<Self, ImageError> {
        let (width, height, color_space) = parse_jpeg_header(&data)?;

        Ok(Self {
            width,
            height,
            bits_per_component: 8,
            color_space,
            format: ImageFormat::Jpeg,
            data,
            soft_mask: None,
        })
    }

    /// Decode PNG, PNM or BMP data with the `image` crate.
    fn from_decoded(data: &[u8], format: image::ImageFormat) -> Result<Self, ImageError> {
        use image::GenericImageView;

        let img = image::load_from_memory_with_format(data, format)
            .map_err(|e| ImageError::DecodeError(e.to_string()))?;

        let (width, height) = img.dimensions();

        let (color_space, pixels, alpha) = match img.color() {
            image::ColorType::L8 | image::ColorType::L16 => {
                (ColorSpace::DeviceGray, img.to_luma8().into_raw(), None)
            },
            image::ColorType::La8 | image::ColorType::La16 => {
                let la = img.to_luma_alpha8();
                let mut gray = Vec::with_capacity((width * height) as usize);
                let mut alpha_channel = Vec::with_capacity((width * height) as usize);
                for pixel in la.pixels() {
                    gray.push(pixel.0[0]);
                    alpha_channel.push(pixel.0[1]);
                }
                (ColorSpace::DeviceGray, gray, Some(alpha_channel))
            },
            image::ColorType::Rgba8 | image::ColorType::Rgba16 | image::ColorType::Rgba32F => {
                let rgba = img.to_rgba8();
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                let mut alpha_channel = Vec::with_capacity((width * height) as usize);
                for pixel in rgba.pixels() {
                    rgb.extend_from_slice(&pixel.0[..3]);
                    alpha_channel.push(pixel.0[3]);
                }
                (ColorSpace::DeviceRGB, rgb, Some(alpha_channel))
            },
            _ => (ColorSpace::DeviceRGB, img.to_rgb8().into_raw(), None),
        };

        let mut image = Self::from_samples(width, height, color_space, &pixels)?;
        // A fully opaque alpha channel adds nothing.
        if let Some(alpha) = alpha.filter(|a| a.iter().any(|&v| v != 0xFF)) {
            image.soft_mask = Some(compress_image_data(&alpha)?);
        }
        Ok(image)
    }

    /// Get the aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    /// Resolve a requested display size.
    ///
    /// A negative dimension is derived from the other one using the pixel
    /// aspect ratio; if both are negative the pixel size is used. Zero is
    /// kept as is.
    pub fn display_size(&self, width: f32, height: f32) -> (f32, f32) {
        let aspect = self.aspect_ratio();
        match (width < 0.0, height < 0.0) {
            (true, true) => (self.width as f32, self.height as f32),
            (true, false) => (height * aspect, height),
            (false, true) => (width, width / aspect),
            (false, false) => (width, height),
        }
    }

    /// Build the PDF Image XObject dictionary.
    pub fn build_xobject_dict(&self, smask: Option<ObjectRef>) -> Dict {
        let mut dict = Dict::new();

        dict.insert("Type".to_string(), Object::Name("XObject".to_string()));
        dict.insert("Subtype".to_string(), Object::Name("Image".to_string()));
        dict.insert("Width".to_string(), Object::Integer(self.width as i64));
        dict.insert("Height".to_string(), Object::Integer(self.height as i64));
        dict.insert(
            "ColorSpace".to_string(),
            Object::Name(self.color_space.pdf_name().to_string()),
        );
        dict.insert(
            "BitsPerComponent".to_string(),
            Object::Integer(self.bits_per_component as i64),
        );

        match self.format {
            ImageFormat::Jpeg => {
                dict.insert("Filter".to_string(), Object::Name("DCTDecode".to_string()));
            },
            ImageFormat::Flate => {
                dict.insert("Filter".to_string(), Object::Name("FlateDecode".to_string()));
            },
        }

        if let Some(smask) = smask {
            dict.insert("SMask".to_string(), Object::Reference(smask));
        }

        dict
    }

    /// Split the soft mask off as a DeviceGray image of the same size.
    pub fn take_soft_mask(&mut self) -> Option<ImageData> {
        self.soft_mask.take().map(|mask| ImageData {
            width: self.width,
            height: self.height,
            bits_per_component: 8,
            color_space: ColorSpace::DeviceGray,
            format: ImageFormat::Flate,
            data: mask,
            soft_mask: None,
        })
    }
}

/// Turns encoded image files into [`ImageData`].
pub trait ImageDecoder {
    /// Decode an in-memory image file.
    fn decode(&self, data: &[u8]) -> Result<ImageData, ImageError>;

    /// Decode the image file at `path`.
    fn decode_file(&self, path: &Path) -> Result<ImageData, ImageError> {
        let data = std::fs::read(path)?;
        self.decode(&data)
    }
}

/// Default decoder: JPEG pass-through plus PNG, PNM and BMP via `image`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardImageDecoder;

impl ImageDecoder for StandardImageDecoder {
    fn decode(&self, data: &[u8]) -> Result<ImageData, ImageError> {
        match sniff_format(data) {
            Some(image::ImageFormat::Jpeg) => ImageData::from_jpeg(data.to_vec()),
            Some(format) => ImageData::from_decoded(data, format),
            None => Err(ImageError::UnsupportedFormat),
        }
    }

    fn decode_file(&self, path: &Path) -> Result<ImageData, ImageError> {
        let data = std::fs::read(path)?;
        if sniff_format(&data).is_some() {
            return self.decode(&data);
        }
        match image::ImageFormat::from_path(path) {
            Ok(image::ImageFormat::Jpeg) => ImageData::from_jpeg(data),
            Ok(
                format @ (image::ImageFormat::Png
                | image::ImageFormat::Bmp
                | image::ImageFormat::Pnm),
            ) => ImageData::from_decoded(&data, format),
            _ => Err(ImageError::UnsupportedFormat),
        }
    }
}

/// Identify an image file by its magic bytes.
fn sniff_format(data: &[u8]) -> Option<image::ImageFormat> {
    match data {
        [0xFF, 0xD8, 0xFF, ..] => Some(image::ImageFormat::Jpeg),
        [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n', ..] => Some(image::ImageFormat::Png),
        [b'B', b'M', ..] => Some(image::ImageFormat::Bmp),
        [b'P', b'1'..=b'6', ..] => Some(image::ImageFormat::Pnm),
        _ => None,
    }
}

/// Parse JPEG header to extract dimensions and color space.
fn parse_jpeg_header(data: &[u8]) -> Result<(u32, u32, ColorSpace), ImageError> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(ImageError::InvalidData("Not a valid JPEG".to_string()));
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }

        let marker = data[pos + 1];
        pos += 2;

        // Fill bytes and stuffed zeros
        if marker == 0xFF || marker == 0x00 {
            continue;
        }

        // SOF markers (Start of Frame)
        if matches!(
            marker,
            0xC0 | 0xC1
                | 0xC2
                | 0xC3
                | 0xC5
                | 0xC6
                | 0xC7
                | 0xC9
                | 0xCA
                | 0xCB
                | 0xCD
                | 0xCE
                | 0xCF
        ) {
            if pos + 7 >= data.len() {
                return Err(ImageError::InvalidData("Truncated JPEG header".to_string()));
            }

            let height = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as u32;
            let width = u16::from_be_bytes([data[pos + 5], data[pos + 6]]) as u32;
            let color_space = match data[pos + 7] {
                1 => ColorSpace::DeviceGray,
                3 => ColorSpace::DeviceRGB,
                n => {
                    return Err(ImageError::InvalidData(format!(
                        "JPEG with {} components is not supported",
                        n
                    )))
                },
            };
            if width == 0 || height == 0 {
                return Err(ImageError::InvalidData("JPEG has no dimensions".to_string()));
            }

            return Ok((width, height, color_space));
        }

        // Skip other segments
        if pos + 2 > data.len() {
            break;
        }
        let length = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        pos += length;
    }

    Err(ImageError::InvalidData("Could not find JPEG dimensions".to_string()))
}

/// Compress samples with zlib for FlateDecode.
fn compress_image_data(data: &[u8]) -> Result<Vec<u8>, ImageError> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ImageError::CompressionError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| ImageError::CompressionError(e.to_string()))
}
