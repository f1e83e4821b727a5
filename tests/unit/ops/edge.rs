use super::*;
use image::DynamicImage;

fn apply(name: &str, params: ConcreteParams, img: &RgbImage, seed: u64) -> RgbImage {
    OperatorRegistry::builtin()
        .apply(name, &params, DynamicImage::ImageRgb8(img.clone()), seed)
        .unwrap()
        .into_rgb8()
}

fn half_split(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, _| {
        if x < w / 2 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

#[test]
fn grid_draws_lines_at_spacing() {
    let img = RgbImage::from_pixel(40, 40, Rgb([0, 0, 0]));
    let out = apply("Grid", ConcreteParams::new().with("spacing", 18.0), &img, 0);
    assert_eq!(out.get_pixel(0, 5), &GRID_GRAY);
    assert_eq!(out.get_pixel(18, 5), &GRID_GRAY);
    assert_eq!(out.get_pixel(5, 36), &GRID_GRAY);
    assert_eq!(out.get_pixel(5, 5), &Rgb([0, 0, 0]));
}

#[test]
fn interference_lines_are_seeded() {
    let img = RgbImage::from_pixel(50, 50, Rgb([0, 0, 0]));
    let p = ConcreteParams::new().with("lines", 15.0);
    let a = apply("InterferenceLines", p.clone(), &img, 4);
    let b = apply("InterferenceLines", p.clone(), &img, 4);
    let c = apply("InterferenceLines", p, &img, 5);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn canny_marks_a_step_edge() {
    let img = half_split(20, 20);
    let out = apply("Canny", ConcreteParams::new().with("alpha", 1.0), &img, 0);
    let lit_columns: Vec<u32> = (0..20).filter(|&x| out.get_pixel(x, 10)[0] == 255).collect();
    assert!(!lit_columns.is_empty());
    assert!(lit_columns.iter().all(|&x| (8..=12).contains(&x)));
}

#[test]
fn directed_kernel_sums_to_zero_and_prefers_direction() {
    let k = directed_kernel(0.0);
    assert!(k.iter().sum::<f32>().abs() < 1e-5);
    // direction 0 points at +x: the right-middle neighbor weighs most
    assert!(k[5] > k[3]);
    assert_eq!(k[3], 0.0);
}

#[test]
fn directed_edges_respond_only_at_the_edge() {
    let img = half_split(12, 6);
    let p = ConcreteParams::new().with("alpha", 1.0).with("direction", 0.0);
    let out = apply("DirectedEdgeDetect", p, &img, 0);
    assert_eq!(out.get_pixel(1, 3)[0], 0);
    assert!(out.get_pixel(5, 3)[0] > 0);
}
