use super::*;
use image::{DynamicImage, Rgb};

fn apply(name: &str, params: ConcreteParams, img: &RgbImage, seed: u64) -> RgbImage {
    OperatorRegistry::builtin()
        .apply(name, &params, DynamicImage::ImageRgb8(img.clone()), seed)
        .unwrap()
        .into_rgb8()
}

fn checker(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| {
        if (x / 2 + y / 2) % 2 == 0 {
            Rgb([230, 230, 230])
        } else {
            Rgb([20, 20, 20])
        }
    })
}

#[test]
fn zero_strength_blur_and_noise_are_identity() {
    let img = checker(16, 16);
    for (name, param) in [
        ("GaussianBlur", "sigma"),
        ("AdditiveGaussianNoise", "scale"),
        ("AdditivePoissonNoise", "lam"),
        ("SaltAndPepper", "p"),
    ] {
        let out = apply(name, ConcreteParams::new().with(param, 0.0), &img, 3);
        assert_eq!(out, img, "{name}");
    }
}

#[test]
fn blurs_reduce_contrast() {
    let img = checker(16, 16);
    let spread = |im: &RgbImage| {
        let (lo, hi) = im
            .pixels()
            .fold((255u8, 0u8), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
        hi - lo
    };
    for (name, params) in [
        ("GaussianBlur", ConcreteParams::new().with("sigma", 1.0)),
        ("AverageBlur", ConcreteParams::new().with("k", 5.0)),
        (
            "MotionBlur",
            ConcreteParams::new().with("k", 5.0).with("angle", 0.0),
        ),
    ] {
        let out = apply(name, params, &img, 0);
        assert_eq!(out.dimensions(), img.dimensions());
        assert!(spread(&out) < spread(&img), "{name}");
    }
}

#[test]
fn median_removes_isolated_speck() {
    let mut img = RgbImage::from_pixel(9, 9, Rgb([50, 50, 50]));
    img.put_pixel(4, 4, Rgb([255, 255, 255]));
    let out = apply("MedianBlur", ConcreteParams::new().with("k", 3.0), &img, 0);
    assert_eq!(out.get_pixel(4, 4), &Rgb([50, 50, 50]));
}

#[test]
fn noise_is_reproducible_per_seed() {
    let img = RgbImage::from_pixel(12, 12, Rgb([128, 128, 128]));
    let p = ConcreteParams::new().with("loc", 0.0).with("scale", 10.0);
    let a = apply("AdditiveGaussianNoise", p.clone(), &img, 11);
    let b = apply("AdditiveGaussianNoise", p.clone(), &img, 11);
    let c = apply("AdditiveGaussianNoise", p, &img, 12);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, img);
}

#[test]
fn motion_kernel_is_normalized_horizontal_line() {
    let k = motion_kernel(5, 0.0);
    assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    for (i, w) in k.iter().enumerate() {
        let row = i / 5;
        assert_eq!(*w > 0.0, row == 2, "tap {i}");
    }
}

#[test]
fn jpeg_and_mosaic_keep_dimensions() {
    let img = checker(20, 14);
    let j = apply("JpegCompression", ConcreteParams::new().with("quality", 10.0), &img, 0);
    assert_eq!(j.dimensions(), (20, 14));
    let m = apply("Mosaic", ConcreteParams::new().with("size", 4.0), &img, 0);
    assert_eq!(m.dimensions(), (20, 14));
    assert_eq!(m.get_pixel(0, 0), m.get_pixel(3, 3));
}

#[test]
fn out_of_range_kernel_is_an_operator_error() {
    let err = OperatorRegistry::builtin()
        .apply(
            "AverageBlur",
            &ConcreteParams::new().with("k", 0.0),
            DynamicImage::ImageRgb8(checker(4, 4)),
            0,
        )
        .unwrap_err();
    assert!(matches!(err, AugsweepError::Operator(_)));
}

#[test]
fn poisson_noise_is_centered_and_seeded() {
    let img = RgbImage::from_pixel(32, 32, Rgb([128, 128, 128]));
    let p = ConcreteParams::new().with("lam", 8.0);
    let a = apply("AdditivePoissonNoise", p.clone(), &img, 5);
    assert_eq!(a, apply("AdditivePoissonNoise", p.clone(), &img, 5));
    assert_ne!(a, apply("AdditivePoissonNoise", p, &img, 6));

    let mean = a.pixels().map(|px| f64::from(px[0])).sum::<f64>() / 1024.0;
    assert!((mean - 128.0).abs() < 1.5, "mean {mean}");
    assert!(a.pixels().all(|px| px[0] == px[1] && px[1] == px[2]));
    assert!(
        OperatorRegistry::builtin()
            .apply(
                "AdditivePoissonNoise",
                &ConcreteParams::new().with("lam", -1.0),
                DynamicImage::ImageRgb8(img),
                0
            )
            .is_err()
    );
}
