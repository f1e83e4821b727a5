use super::*;
use image::{DynamicImage, Rgb};

fn apply(name: &str, params: ConcreteParams, img: &RgbImage, seed: u64) -> RgbImage {
    OperatorRegistry::builtin()
        .apply(name, &params, DynamicImage::ImageRgb8(img.clone()), seed)
        .unwrap()
        .into_rgb8()
}

#[test]
fn frequency_noise_spans_the_full_range() {
    let noise = frequency_noise(8, -2.0, &mut OpContext::new(4));
    assert_eq!(noise.dimensions(), (8, 8));
    let lo = noise.pixels().map(|p| p[0]).min().unwrap();
    let hi = noise.pixels().map(|p| p[0]).max().unwrap();
    assert_eq!((lo, hi), (0, 255));
    assert_eq!(noise, frequency_noise(8, -2.0, &mut OpContext::new(4)));
}

#[test]
fn steeper_spectrum_is_smoother() {
    // mean absolute difference between horizontal neighbors
    let roughness = |exponent: f64| {
        let n = frequency_noise(16, exponent, &mut OpContext::new(1));
        let mut total = 0u32;
        for y in 0..16 {
            for x in 0..15 {
                total += u32::from(n.get_pixel(x, y)[0].abs_diff(n.get_pixel(x + 1, y)[0]));
            }
        }
        total
    };
    assert!(roughness(-4.0) < roughness(4.0));
}

#[test]
fn noise_alpha_modulates_brightness_per_seed() {
    let img = RgbImage::from_pixel(24, 20, Rgb([100, 100, 100]));
    for (name, params) in [
        (
            "FrequencyNoiseAlpha",
            ConcreteParams::new().with("exponent", -2.0).with("size_px_max", 8.0),
        ),
        ("SimplexNoiseAlpha", ConcreteParams::new().with("size_px_max", 6.0)),
    ] {
        let a = apply(name, params.clone(), &img, 7);
        assert_eq!(a.dimensions(), (24, 20), "{name}");
        assert_eq!(a, apply(name, params.clone(), &img, 7), "{name}");
        assert_ne!(a, apply(name, params, &img, 8), "{name}");
        assert!(a.pixels().all(|p| (50..=150).contains(&p[0])), "{name}");
        assert!(a.pixels().any(|p| p[0] != 100), "{name}");
    }
}

#[test]
fn noise_size_is_bounded() {
    let img = RgbImage::new(4, 4);
    let err = OperatorRegistry::builtin()
        .apply(
            "SimplexNoiseAlpha",
            &ConcreteParams::new().with("size_px_max", 1.0),
            DynamicImage::ImageRgb8(img),
            0,
        )
        .unwrap_err();
    assert_eq!(err.kind(), crate::foundation::error::ErrorKind::Operator);
}
