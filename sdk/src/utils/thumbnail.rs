// Copyright 2022 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use std::io::Cursor;

use image::{
    codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, ImageDecoder, ImageFormat,
    ImageReader,
};
use log::error;

use crate::{settings::ThumbnailSettings, Error, Result};

/// Produces the JPEG bytes stored in the thumbnail assertion.
pub trait ThumbnailGenerator: Send + Sync {
    fn generate(&self, image: &[u8], settings: &ThumbnailSettings) -> Result<Vec<u8>>;
}

/// Default generator backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageThumbnailer;

impl ThumbnailGenerator for ImageThumbnailer {
    fn generate(&self, image: &[u8], settings: &ThumbnailSettings) -> Result<Vec<u8>> {
        make_thumbnail(image, settings)
    }
}

fn thumbnail_err(err: image::ImageError) -> Error {
    error!("thumbnail generation failed: {err}");
    Error::ThumbnailError(err.to_string())
}

// Output size for a `width` x `height` source.
fn target_size(width: u32, height: u32, settings: &ThumbnailSettings) -> (u32, u32) {
    let (max_w, max_h) = (settings.max_width, settings.max_height);

    if !settings.preserve_aspect_ratio {
        return if settings.without_enlargement {
            (max_w.min(width), max_h.min(height))
        } else {
            (max_w, max_h)
        };
    }

    let fits = width <= max_w && height <= max_h;
    if fits && settings.without_enlargement {
        return (width, height);
    }

    // scale so the larger relative edge touches the box
    let scale = f64::min(
        f64::from(max_w) / f64::from(width),
        f64::from(max_h) / f64::from(height),
    );
    let w = (f64::from(width) * scale).round().max(1.0) as u32;
    let h = (f64::from(height) * scale).round().max(1.0) as u32;
    (w.min(max_w), h.min(max_h))
}

/// Decode a JPEG, apply its EXIF orientation, scale it per `settings` and
/// re-encode it as JPEG.
pub fn make_thumbnail(image: &[u8], settings: &ThumbnailSettings) -> Result<Vec<u8>> {
    // Take the orientation from the EXIF data and manipulate the pixels to match
    let mut decoder = ImageReader::with_format(Cursor::new(image), ImageFormat::Jpeg)
        .into_decoder()
        .map_err(thumbnail_err)?;
    let orientation = decoder.orientation().map_err(thumbnail_err)?;
    let mut img = DynamicImage::from_decoder(decoder).map_err(thumbnail_err)?;
    img.apply_orientation(orientation);

    let (width, height) = target_size(img.width(), img.height(), settings);
    if (width, height) != (img.width(), img.height()) {
        img = if width <= img.width() && height <= img.height() {
            img.thumbnail_exact(width, height)
        } else {
            img.resize_exact(width, height, FilterType::Triangle)
        };
    }

    // the JPEG encoder has no alpha support
    let img = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut cursor = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, settings.quality);
    encoder.encode_image(&img).map_err(thumbnail_err)?;

    Ok(cursor.into_inner())
}

#[cfg(test)]
pub(crate) mod tests {
    #![allow(clippy::unwrap_used)]

    use image::{GenericImageView, ImageBuffer, Rgb, RgbImage};

    use super::*;

    /// A `width` x `height` JPEG, red on the left half and blue on the right.
    pub(crate) fn two_tone_jpeg(width: u32, height: u32) -> Vec<u8> {
        let mut img: RgbImage = ImageBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let pixel = if x < width / 2 {
                    Rgb([255, 0, 0])
                } else {
                    Rgb([0, 0, 255])
                };
                img.put_pixel(x, y, pixel);
            }
        }

        let mut jpeg_data = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg_data, 90)
            .encode_image(&img)
            .unwrap();
        jpeg_data
    }

    fn with_orientation(mut jpeg_data: Vec<u8>, orientation: u16) -> Vec<u8> {
        #[rustfmt::skip]
        let exif_data = vec![
            0xff, 0xe1, // APP1
            0x00, 0x22, // length
            0x45, 0x78, 0x69, 0x66, 0x00, 0x00, // "Exif\0\0"
            0x49, 0x49, 0x2a, 0x00, // little endian TIFF
            0x08, 0x00, 0x00, 0x00, // offset to IFD
            0x01, 0x00, // one entry
            0x12, 0x01, // orientation
            0x03, 0x00, // SHORT
            0x01, 0x00, 0x00, 0x00, // count
            orientation as u8, (orientation >> 8) as u8, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, // next IFD
        ];
        jpeg_data.splice(2..2, exif_data);
        jpeg_data
    }

    fn decode(bytes: &[u8]) -> DynamicImage {
        image::load_from_memory(bytes).unwrap()
    }

    #[test]
    fn test_fits_inside_box() {
        let settings = ThumbnailSettings {
            max_width: 50,
            max_height: 50,
            ..Default::default()
        };
        let thumb = decode(&make_thumbnail(&two_tone_jpeg(200, 100), &settings).unwrap());
        assert_eq!(thumb.dimensions(), (50, 25));
    }

    #[test]
    fn test_small_image_is_not_enlarged() {
        let thumb = decode(
            &make_thumbnail(&two_tone_jpeg(200, 100), &ThumbnailSettings::default()).unwrap(),
        );
        assert_eq!(thumb.dimensions(), (200, 100));
    }

    #[test]
    fn test_enlargement_allowed() {
        let settings = ThumbnailSettings {
            max_width: 400,
            max_height: 400,
            without_enlargement: false,
            ..Default::default()
        };
        let thumb = decode(&make_thumbnail(&two_tone_jpeg(200, 100), &settings).unwrap());
        assert_eq!(thumb.dimensions(), (400, 200));
    }

    #[test]
    fn test_exact_resize() {
        let settings = ThumbnailSettings {
            max_width: 60,
            max_height: 60,
            preserve_aspect_ratio: false,
            ..Default::default()
        };
        let thumb = decode(&make_thumbnail(&two_tone_jpeg(200, 100), &settings).unwrap());
        assert_eq!(thumb.dimensions(), (60, 60));

        // clamped to the source when enlargement is off
        let settings = ThumbnailSettings {
            max_width: 300,
            max_height: 50,
            preserve_aspect_ratio: false,
            ..Default::default()
        };
        let thumb = decode(&make_thumbnail(&two_tone_jpeg(200, 100), &settings).unwrap());
        assert_eq!(thumb.dimensions(), (200, 50));
    }

    #[test]
    fn test_target_size() {
        let settings = ThumbnailSettings::default();
        assert_eq!(target_size(4000, 3000, &settings), (1024, 768));
        assert_eq!(target_size(3000, 4000, &settings), (576, 768));
        assert_eq!(target_size(1, 10000, &settings), (1, 768));
    }

    #[test]
    fn test_exif_orientation() {
        for orientation in 1..=8 {
            let jpeg_data = with_orientation(two_tone_jpeg(200, 100), orientation);
            let thumb = decode(
                &ImageThumbnailer
                    .generate(&jpeg_data, &ThumbnailSettings::default())
                    .unwrap(),
            );

            let top_left_pixel = thumb.get_pixel(0, 0);
            let bottom_right_pixel = thumb.get_pixel(thumb.width() - 1, thumb.height() - 1);

            match orientation {
                1 | 4 | 5 | 6 => {
                    assert!(top_left_pixel.0[0] >= 250, "orientation {orientation}");
                    assert!(bottom_right_pixel.0[2] >= 250, "orientation {orientation}");
                }
                _ => {
                    assert!(top_left_pixel.0[2] >= 250, "orientation {orientation}");
                    assert!(bottom_right_pixel.0[0] >= 250, "orientation {orientation}");
                }
            }

            if orientation >= 5 {
                assert_eq!(thumb.dimensions(), (100, 200));
            } else {
                assert_eq!(thumb.dimensions(), (200, 100));
            }
        }
    }

    #[test]
    fn test_not_a_jpeg() {
        assert!(matches!(
            make_thumbnail(b"definitely not an image", &ThumbnailSettings::default()),
            Err(Error::ThumbnailError(_))
        ));
    }
}
