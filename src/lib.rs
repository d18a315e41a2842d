// Copyright 2022 Spanfile
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A library to detect the dominant color of an image and check it against a fixed color palette.
//!
//! Every pixel of an image is converted to HSV and classified into one of a small set of semantic color buckets
//! ([`ColorCategory`]) by an ordered list of rules (see [`Rule`]). The counts are aggregated into a
//! [`ColorRatioReport`], whose dominant category can then be checked against the [`PaletteEntry`] a user picked with
//! [`validate`].
//!
//! ```
//! use dominance::{image::{Rgb, RgbImage}, ColorAnalyzer, ColorCategory, PaletteEntry};
//!
//! let image = RgbImage::from_pixel(32, 32, Rgb([255, 75, 92]));
//! let report = ColorAnalyzer::from_image(image).analyze().unwrap();
//! assert_eq!(report.dominant_category(), Some(ColorCategory::Red));
//!
//! let blue = PaletteEntry::by_key("blue").unwrap();
//! let verdict = dominance::validate(blue, &report);
//! assert!(!verdict.accepted);
//! assert_eq!(verdict.suggestion.map(|entry| entry.key()), Some("red"));
//! ```

mod analyzer;
mod catalog;
mod categorizer;
mod category;
mod error;
mod filter;
mod hsv;
mod report;
mod session;
mod thresholds;
mod validator;

pub use crate::{
    analyzer::{analyze_pixels, PixelLayout},
    catalog::PaletteEntry,
    categorizer::{categorize, Categorizer, Rule},
    category::ColorCategory,
    error::{AnalysisError, Result},
    filter::{Filter, IgnoreColor},
    hsv::{rgb_to_hsv, Hsv, PixelSample},
    report::{ColorRatioReport, Dominant},
    session::{AnalysisHandle, AnalysisOutcome, AnalysisSession, Ticket},
    thresholds::{HueArcs, Thresholds},
    validator::{validate, ValidationResult},
};
pub use image;
pub use palette;

use analyzer::Scan;
use image::{math::Rect, GenericImageView, ImageBuffer};
use tokio_util::sync::CancellationToken;

/// Configures and runs the analysis of a single image.
pub struct ColorAnalyzer<P>
where
    P: image::Pixel<Subpixel = u8> + 'static,
{
    image: ImageBuffer<P, Vec<<P as image::Pixel>::Subpixel>>,
    thresholds: Thresholds,
    resize_area: u32,
    region: Option<Rect>,
    filters: Vec<Box<dyn Filter>>,
    parallel: bool,
}

impl<P> ColorAnalyzer<P>
where
    P: image::Pixel<Subpixel = u8> + 'static,
{
    pub fn from_image(image: ImageBuffer<P, Vec<<P as image::Pixel>::Subpixel>>) -> Self {
        Self {
            image,
            thresholds: Thresholds::default(),
            resize_area: 0,
            region: None,
            filters: Vec::new(),
            parallel: true,
        }
    }

    /// Wrap a flat buffer of pixels in `P`'s layout. The buffer has to hold exactly `width * height` pixels.
    pub fn from_raw(width: u32, height: u32, buffer: Vec<u8>) -> Result<Self> {
        let channels = <P as image::Pixel>::CHANNEL_COUNT as u64;
        let expected = width as u64 * height as u64 * channels;

        if buffer.is_empty() || buffer.len() as u64 != expected {
            return Err(AnalysisError::invalid_input(format!(
                "{width}x{height} image needs {expected} bytes, buffer holds {}",
                buffer.len()
            )));
        }

        ImageBuffer::from_raw(width, height, buffer)
            .map(Self::from_image)
            .ok_or_else(|| AnalysisError::invalid_input("buffer doesn't fit the image dimensions"))
    }

    pub fn thresholds(self, thresholds: Thresholds) -> Self {
        Self { thresholds, ..self }
    }

    /// Scale the image down to roughly this many pixels before the scan. Zero, the default, scans every pixel.
    pub fn resize_image_area(self, resize_area: u32) -> Self {
        Self { resize_area, ..self }
    }

    pub fn region(self, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            region: Some(Rect { x, y, width, height }),
            ..self
        }
    }

    /// Leave pixels within `tolerance` of `rgb` on every channel out of the analysis, such as a plain backdrop.
    pub fn ignore_color(self, rgb: PixelSample, tolerance: u8) -> Self {
        self.add_filter(IgnoreColor::new(rgb, tolerance))
    }

    pub fn add_filter<F>(mut self, filter: F) -> Self
    where
        F: Filter + 'static,
    {
        self.filters.push(Box::new(filter));
        self
    }

    /// Classify the image in parallel chunks. Enabled by default; the result is the same either way.
    pub fn parallel(self, parallel: bool) -> Self {
        Self { parallel, ..self }
    }

    pub fn clear_region(self) -> Self {
        Self { region: None, ..self }
    }

    pub fn clear_filters(self) -> Self {
        Self {
            filters: Vec::new(),
            ..self
        }
    }

    pub fn analyze(self) -> Result<ColorRatioReport> {
        self.run(None)
    }

    /// Like [`ColorAnalyzer::analyze`], but gives up with [`AnalysisError::Cancelled`] once the token is cancelled.
    pub fn analyze_cancellable(self, token: &CancellationToken) -> Result<ColorRatioReport> {
        self.run(Some(token))
    }

    fn run(mut self, cancel: Option<&CancellationToken>) -> Result<ColorRatioReport> {
        self.thresholds.validate()?;

        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 {
            return Err(AnalysisError::invalid_input(format!("{width}x{height} image has no pixels")));
        }

        if let Some(region) = self.region {
            if region.width == 0
                || region.height == 0
                || region.x as u64 + region.width as u64 > width as u64
                || region.y as u64 + region.height as u64 > height as u64
            {
                return Err(AnalysisError::invalid_input(format!(
                    "region {}x{} at ({}, {}) doesn't fit in the {width}x{height} image",
                    region.width, region.height, region.x, region.y
                )));
            }
        }

        if let Some(scale) = self.scale_image_down() {
            if let Some(mut region) = self.region {
                // scale down the region to match the new scaled image
                let (scaled_width, scaled_height) = self.image.dimensions();

                region.x = ((region.x as f32 * scale).floor() as u32).min(scaled_width - 1);
                region.y = ((region.y as f32 * scale).floor() as u32).min(scaled_height - 1);
                region.width = ((region.width as f32 * scale).ceil() as u32).clamp(1, scaled_width - region.x);
                region.height = ((region.height as f32 * scale).ceil() as u32).clamp(1, scaled_height - region.y);

                self.region = Some(region);
            }
        }

        let categorizer = Categorizer::new(self.thresholds);
        let scan = Scan {
            categorizer: &categorizer,
            filters: &self.filters,
            parallel: self.parallel,
            cancel,
        };

        let (tally, pixel_count) = match self.region {
            Some(region) => {
                let pixels: Vec<PixelSample> = self
                    .image
                    .view(region.x, region.y, region.width, region.height)
                    .pixels()
                    .map(|(_, _, p)| {
                        let rgb = p.to_rgb();
                        (rgb.0[0], rgb.0[1], rgb.0[2])
                    })
                    .collect();

                (scan.samples(&pixels), pixels.len())
            }
            None => {
                // the whole image is scanned straight out of its buffer
                let (width, height) = self.image.dimensions();
                let pixel_count = width as usize * height as usize;
                let subpixels = self
                    .image
                    .as_raw()
                    .get(..pixel_count * <P as image::Pixel>::CHANNEL_COUNT as usize)
                    .ok_or_else(|| AnalysisError::invalid_input("image buffer is shorter than its dimensions"))?;

                (scan.pixels::<P>(subpixels), pixel_count)
            }
        };

        match tally {
            Some(tally) => Ok(analyzer::finish(tally, &categorizer)),
            None => {
                log::debug!("analysis of {pixel_count} pixels cancelled");
                Err(AnalysisError::Cancelled)
            }
        }
    }

    /// Downscale the image if it's larger than the resize area, returning the scale factor used.
    fn scale_image_down(&mut self) -> Option<f32> {
        let (width, height) = self.image.dimensions();
        let area = width as u64 * height as u64;

        if self.resize_area == 0 || area <= self.resize_area as u64 {
            return None;
        }

        let scale_ratio = (self.resize_area as f64 / area as f64).sqrt() as f32;
        let scaled_width = ((width as f32 * scale_ratio).ceil() as u32).max(1);
        let scaled_height = ((height as f32 * scale_ratio).ceil() as u32).max(1);

        log::debug!("scaling {width}x{height} image down to {scaled_width}x{scaled_height}");

        self.image = image::imageops::resize(
            &self.image,
            scaled_width,
            scaled_height,
            image::imageops::FilterType::Nearest,
        );

        Some(scaled_width as f32 / width as f32)
    }
}
