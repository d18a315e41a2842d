use dominance::{
    analyze_pixels, categorize,
    image::{Rgb, RgbImage},
    rgb_to_hsv, validate, AnalysisSession, ColorAnalyzer, ColorCategory, Dominant, Hsv, PaletteEntry, PixelLayout,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_buffer(rng: &mut StdRng, pixels: usize, layout: PixelLayout) -> Vec<u8> {
    (0..pixels * layout.channels()).map(|_| rng.gen()).collect()
}

// a handful of palette colors, repeated, so that images have an actual dominant color
fn blotchy_buffer(rng: &mut StdRng, pixels: usize) -> Vec<u8> {
    let colors: Vec<(u8, u8, u8)> = PaletteEntry::all().iter().map(|entry| entry.rgb().unwrap()).collect();

    (0..pixels)
        .flat_map(|_| {
            let (r, g, b) = colors[rng.gen_range(0..colors.len())];
            [r, g, b]
        })
        .collect()
}

#[test]
fn random_samples_classify_in_domain() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..50_000 {
        let hsv = Hsv {
            h: rng.gen_range(0.0..360.0),
            s: rng.gen_range(0.0..=1.0),
            v: rng.gen_range(0.0..=1.0),
        };

        assert_ne!(categorize(hsv), ColorCategory::Other, "{hsv:?}");
    }

    for _ in 0..50_000 {
        let hsv = rgb_to_hsv(rng.gen(), rng.gen(), rng.gen());

        assert!((0.0..360.0).contains(&hsv.h));
        assert!((0.0..=1.0).contains(&hsv.s));
        assert!((0.0..=1.0).contains(&hsv.v));
        assert_ne!(categorize(hsv), ColorCategory::Other, "{hsv:?}");
    }
}

#[test]
fn ratios_sum_to_one_hundred() {
    let mut rng = StdRng::seed_from_u64(7);

    for (width, height) in [(1, 1), (3, 5), (64, 48), (300, 200)] {
        let pixels = (width * height) as usize;

        for layout in [PixelLayout::Rgb, PixelLayout::Rgba] {
            let buffer = random_buffer(&mut rng, pixels, layout);
            let report = analyze_pixels(&buffer, width, height, layout, None).unwrap();

            let sum: f64 = report.ratios().map(|(_, ratio)| ratio).sum();
            assert!(
                (sum - 100.0).abs() <= 1e-6 * pixels as f64,
                "{width}x{height}: ratios sum to {sum}"
            );
            assert_eq!(report.counted(), pixels as u64);
        }
    }
}

#[test]
fn nothing_beats_the_dominant_category() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..20 {
        let buffer = blotchy_buffer(&mut rng, 40 * 40);
        let report = analyze_pixels(&buffer, 40, 40, PixelLayout::Rgb, None).unwrap();

        let dominant = report.dominant_category().unwrap();
        for (category, ratio) in report.ratios() {
            assert!(report.ratio(dominant) >= ratio, "{category} beats {dominant}");

            // ties go to the category declared first
            if ratio == report.ratio(dominant) {
                assert!(dominant <= category);
            }
        }
    }
}

#[test]
fn validation_follows_the_dominant_category() {
    let mut rng = StdRng::seed_from_u64(1234);

    for _ in 0..20 {
        let buffer = blotchy_buffer(&mut rng, 30 * 30);
        let report = analyze_pixels(&buffer, 30, 30, PixelLayout::Rgb, None).unwrap();
        let mapped_key = report.dominant_category().and_then(ColorCategory::palette_key);

        for &selected in PaletteEntry::all() {
            let result = validate(selected, &report);

            if mapped_key == Some(selected.key()) {
                assert!(result.accepted);
                assert_eq!(result.suggestion, None);
            } else {
                assert!(!result.accepted);
                assert_eq!(result.suggestion.map(|entry| entry.key()), mapped_key);
            }
        }
    }
}

#[test]
fn red_photo_scenario() {
    let buffer: Vec<u8> = std::iter::repeat([255, 75, 92]).take(120 * 80).flatten().collect();
    let report = analyze_pixels(&buffer, 120, 80, PixelLayout::Rgb, None).unwrap();

    assert_eq!(report.dominant(), Dominant::Color(ColorCategory::Red));
    assert!((report.ratio(ColorCategory::Red) - 100.0).abs() < 1e-9);

    let red = validate(PaletteEntry::by_key("red").unwrap(), &report);
    assert!(red.accepted);

    let blue = validate(PaletteEntry::by_key("blue").unwrap(), &report);
    assert!(!blue.accepted);
    assert_eq!(blue.suggestion.unwrap().key(), "red");
}

#[test]
fn builder_and_flat_buffer_agree() {
    let mut rng = StdRng::seed_from_u64(99);
    let buffer = random_buffer(&mut rng, 50 * 20, PixelLayout::Rgb);

    let flat = analyze_pixels(&buffer, 50, 20, PixelLayout::Rgb, None).unwrap();

    let image = RgbImage::from_raw(50, 20, buffer).unwrap();
    let built = ColorAnalyzer::from_image(image).parallel(false).analyze().unwrap();

    assert_eq!(flat, built);
}

#[tokio::test]
async fn session_reports_only_the_latest_upload() {
    let mut rng = StdRng::seed_from_u64(5);
    let session = AnalysisSession::new();

    let stale_buffer = blotchy_buffer(&mut rng, 64 * 64);
    let stale = session.submit(ColorAnalyzer::<Rgb<u8>>::from_raw(64, 64, stale_buffer).unwrap());

    let latest_buffer: Vec<u8> = std::iter::repeat([0x4C, 0xAF, 0x50]).take(64 * 64).flatten().collect();
    let latest = session.submit(ColorAnalyzer::<Rgb<u8>>::from_raw(64, 64, latest_buffer).unwrap());

    assert!(stale.outcome().await.unwrap().report().is_none());

    let report = latest.outcome().await.unwrap().report().unwrap();
    let verdict = validate(PaletteEntry::by_id(4).unwrap(), &report);
    assert!(verdict.accepted);
}
