// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: load, crop, grayscale, save. Operates on in-memory images
// using the `image` crate.

use image::DynamicImage;
use scanwerk_core::error::ScannerError;
use scanwerk_core::types::{ImageSize, Rect};
use tracing::{debug, info, instrument};

/// Image pipeline operating on a single in-memory page.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`,
/// enabling method chaining.
///
/// ```ignore
/// let page = ImageProcessor::open("scan.png")?
///     .crop(Rect::new(10, 10, 210, 150))
///     .grayscale()
///     .into_dynamic();
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, ScannerError> {
        let img = image::open(path.as_ref()).map_err(|err| {
            ScannerError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.image.width(), self.image.height())
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Crop to `rect`, clamped to the image bounds.
    #[instrument(skip(self), fields(x = rect.x, y = rect.y, width = rect.width, height = rect.height))]
    pub fn crop(self, rect: Rect) -> Self {
        Self {
            image: crop_region(&self.image, rect),
        }
    }

    /// Convert the image to grayscale (luma). Recognition engines tend to do
    /// better on scans without colour noise.
    #[instrument(skip(self))]
    pub fn grayscale(self) -> Self {
        info!("Converting to grayscale");
        Self {
            image: self.image.grayscale(),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), ScannerError> {
        self.image.save(path.as_ref()).map_err(|err| {
            ScannerError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

/// Copy the part of `image` covered by `rect`.
///
/// The rectangle is clamped to the image: negative origins are pulled in to
/// zero and the extent is cut at the right and bottom edges. A rectangle lying
/// entirely outside the image yields an empty (0x0) image.
pub fn crop_region(image: &DynamicImage, rect: Rect) -> DynamicImage {
    let img_w = i64::from(image.width());
    let img_h = i64::from(image.height());

    let left = i64::from(rect.x).clamp(0, img_w);
    let top = i64::from(rect.y).clamp(0, img_h);
    let right = (i64::from(rect.x) + i64::from(rect.width)).clamp(left, img_w);
    let bottom = (i64::from(rect.y) + i64::from(rect.height)).clamp(top, img_h);

    let (x, y) = (left as u32, top as u32);
    let (w, h) = ((right - left) as u32, (bottom - top) as u32);
    debug!(x, y, w, h, "Cropping image");
    image.crop_imm(x, y, w, h)
}
