use crate::{
    category::ColorCategory,
    categorizer::Categorizer,
    error::{AnalysisError, Result},
    filter::{Filter, IgnoreColor},
    hsv::{Hsv, PixelSample},
    report::{ColorRatioReport, Tally},
};
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

/// How many pixels a single unit of work in the scan covers. Cancellation is checked between units.
const SCAN_CHUNK_PIXELS: usize = 16 * 1024;

/// The byte layout of a flat pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb,
    /// The alpha channel is ignored.
    Rgba,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba => 4,
        }
    }
}

/// Analyse a flat buffer of `width * height` pixels with the default thresholds, optionally leaving out pixels close
/// to a background color.
pub fn analyze_pixels(
    buffer: &[u8],
    width: u32,
    height: u32,
    layout: PixelLayout,
    ignored_color: Option<IgnoreColor>,
) -> Result<ColorRatioReport> {
    let categorizer = Categorizer::default();
    let filters: Vec<Box<dyn Filter>> = ignored_color
        .into_iter()
        .map(|filter| Box::new(filter) as Box<dyn Filter>)
        .collect();

    let scan = Scan {
        categorizer: &categorizer,
        filters: &filters,
        parallel: true,
        cancel: None,
    };

    let tally = scan.bytes(buffer, width, height, layout)?.unwrap_or_default();
    Ok(finish(tally, &categorizer))
}

/// A single pass over an image's pixels.
pub(crate) struct Scan<'a> {
    pub(crate) categorizer: &'a Categorizer,
    pub(crate) filters: &'a [Box<dyn Filter>],
    pub(crate) parallel: bool,
    pub(crate) cancel: Option<&'a CancellationToken>,
}

impl Scan<'_> {
    /// Tally a flat byte buffer. Returns `None` if the scan was cancelled.
    pub(crate) fn bytes(&self, buffer: &[u8], width: u32, height: u32, layout: PixelLayout) -> Result<Option<Tally>> {
        let channels = layout.channels();

        if buffer.is_empty() {
            return Err(AnalysisError::invalid_input("pixel buffer is empty"));
        }

        if buffer.len() % channels != 0 {
            return Err(AnalysisError::invalid_input(format!(
                "buffer length {} is not a multiple of {channels} channels",
                buffer.len()
            )));
        }

        let samples = buffer.len() / channels;
        let expected = (width as u64) * (height as u64);

        if expected != samples as u64 {
            return Err(AnalysisError::invalid_input(format!(
                "{width}x{height} image needs {expected} pixels, buffer holds {samples}"
            )));
        }

        Ok(self.run(buffer, channels, |pixel| (pixel[0], pixel[1], pixel[2])))
    }

    /// Tally already decoded samples. Returns `None` if the scan was cancelled.
    pub(crate) fn samples(&self, samples: &[PixelSample]) -> Option<Tally> {
        self.run(samples, 1, |sample| sample[0])
    }

    /// Tally the raw subpixels of an image buffer of `P` pixels. Returns `None` if the scan was cancelled.
    pub(crate) fn pixels<P>(&self, subpixels: &[u8]) -> Option<Tally>
    where
        P: image::Pixel<Subpixel = u8>,
    {
        self.run(subpixels, P::CHANNEL_COUNT as usize, |pixel| {
            let rgb = P::from_slice(pixel).to_rgb();
            (rgb.0[0], rgb.0[1], rgb.0[2])
        })
    }

    fn run<T, F>(&self, data: &[T], stride: usize, sample: F) -> Option<Tally>
    where
        T: Sync,
        F: Fn(&[T]) -> PixelSample + Sync,
    {
        let chunk_len = stride * SCAN_CHUNK_PIXELS;
        let tally_chunk = |chunk: &[T]| {
            if self.is_cancelled() {
                return None;
            }

            Some(self.tally(chunk.chunks_exact(stride).map(&sample)))
        };

        if self.parallel {
            data.par_chunks(chunk_len)
                .map(tally_chunk)
                .try_reduce(Tally::default, |left, right| Some(left.merge(right)))
        } else {
            data.chunks(chunk_len)
                .try_fold(Tally::default(), |total, chunk| Some(total.merge(tally_chunk(chunk)?)))
        }
    }

    fn tally(&self, pixels: impl Iterator<Item = PixelSample>) -> Tally {
        let mut tally = Tally::default();

        for rgb in pixels {
            let hsv = Hsv::from_rgb(rgb);

            if self.filters.iter().all(|filter| filter.is_allowed(rgb, hsv)) {
                tally.count(self.categorizer.categorize(hsv), rgb);
            } else {
                tally.exclude();
            }
        }

        tally
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.map_or(false, CancellationToken::is_cancelled)
    }
}

pub(crate) fn finish(tally: Tally, categorizer: &Categorizer) -> ColorRatioReport {
    let report = tally.into_report(categorizer);

    log::debug!(
        "counted {} pixels, excluded {}, dominant {:?} at {:.2}%",
        report.counted(),
        report.excluded(),
        report.dominant(),
        report.dominant_ratio()
    );

    let other = report.count(ColorCategory::Other);
    if other > 0 {
        log::warn!("{other} pixels fell through every hue arc; the thresholds leave a gap in the hue circle");
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Dominant;

    fn solid(rgb: PixelSample, pixels: usize, layout: PixelLayout) -> Vec<u8> {
        let (r, g, b) = rgb;

        (0..pixels)
            .flat_map(|_| match layout {
                PixelLayout::Rgb => vec![r, g, b],
                PixelLayout::Rgba => vec![r, g, b, 0],
            })
            .collect()
    }

    #[test]
    fn solid_red_is_all_red() {
        let buffer = solid((255, 75, 92), 100, PixelLayout::Rgb);
        let report = analyze_pixels(&buffer, 10, 10, PixelLayout::Rgb, None).unwrap();

        assert_eq!(report.dominant(), Dominant::Color(ColorCategory::Red));
        assert!((report.ratio(ColorCategory::Red) - 100.0).abs() < 1e-9);
        assert_eq!(report.counted(), 100);
    }

    #[test]
    fn alpha_is_ignored() {
        let buffer = solid((0, 0, 255), 6, PixelLayout::Rgba);
        let report = analyze_pixels(&buffer, 3, 2, PixelLayout::Rgba, None).unwrap();

        assert_eq!(report.dominant_category(), Some(ColorCategory::Blue));
    }

    #[test]
    fn malformed_buffers_are_rejected() {
        let invalid = |result: Result<ColorRatioReport>| matches!(result, Err(AnalysisError::InvalidInput { .. }));

        assert!(invalid(analyze_pixels(&[], 0, 0, PixelLayout::Rgb, None)));
        assert!(invalid(analyze_pixels(&[1, 2, 3, 4], 1, 1, PixelLayout::Rgb, None)));
        assert!(invalid(analyze_pixels(&solid((1, 2, 3), 4, PixelLayout::Rgb), 3, 1, PixelLayout::Rgb, None)));
        assert!(invalid(analyze_pixels(
            &solid((1, 2, 3), 4, PixelLayout::Rgb),
            u32::MAX,
            u32::MAX,
            PixelLayout::Rgb,
            None
        )));
    }

    #[test]
    fn ignored_background_is_left_out() {
        let mut buffer = solid((255, 255, 255), 90, PixelLayout::Rgb);
        buffer.extend(solid((0, 200, 0), 10, PixelLayout::Rgb));

        let plain = analyze_pixels(&buffer, 10, 10, PixelLayout::Rgb, None).unwrap();
        assert_eq!(plain.dominant_category(), Some(ColorCategory::White));

        let ignored = analyze_pixels(
            &buffer,
            10,
            10,
            PixelLayout::Rgb,
            Some(IgnoreColor::new((250, 250, 250), 5)),
        )
        .unwrap();

        assert_eq!(ignored.dominant_category(), Some(ColorCategory::Green));
        assert_eq!(ignored.counted(), 10);
        assert_eq!(ignored.excluded(), 90);
        assert!((ignored.ratio(ColorCategory::Green) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn everything_ignored_is_no_data() {
        let buffer = solid((255, 255, 255), 4, PixelLayout::Rgb);
        let report = analyze_pixels(&buffer, 2, 2, PixelLayout::Rgb, Some(IgnoreColor::exact((255, 255, 255)))).unwrap();

        assert_eq!(report.dominant(), Dominant::NoData);
        assert_eq!(report.counted(), 0);
        assert_eq!(report.excluded(), 4);
    }

    #[test]
    fn parallel_and_sequential_scans_agree() {
        let samples: Vec<PixelSample> = (0..100_000u32)
            .map(|i| ((i % 256) as u8, (i / 7 % 256) as u8, (i / 13 % 256) as u8))
            .collect();

        let categorizer = Categorizer::default();
        let scan = |parallel| {
            Scan {
                categorizer: &categorizer,
                filters: &[],
                parallel,
                cancel: None,
            }
            .samples(&samples)
            .unwrap()
        };

        assert_eq!(scan(true), scan(false));
    }

    #[test]
    fn cancelled_scan_yields_nothing() {
        let token = CancellationToken::new();
        token.cancel();

        let categorizer = Categorizer::default();
        let scan = Scan {
            categorizer: &categorizer,
            filters: &[],
            parallel: false,
            cancel: Some(&token),
        };

        assert_eq!(scan.samples(&[(1, 2, 3)]), None);
    }
}
