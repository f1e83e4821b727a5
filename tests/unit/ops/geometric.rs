use super::*;

fn gradient(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| Rgb([(x * 10) as u8, (y * 10) as u8, 128]))
}

fn ctx() -> OpContext {
    OpContext::new(9)
}

#[test]
fn rotate_zero_is_identity_and_keeps_size() {
    let img = gradient(20, 10);
    let p = ConcreteParams::new().with("rotate", 0.0);
    let out = rotate(&p, img.clone(), &mut ctx()).unwrap();
    assert_eq!(out.get_pixel(7, 4), img.get_pixel(7, 4));
    let turned = rotate(&ConcreteParams::new().with("rotate", 30.0), img, &mut ctx()).unwrap();
    assert_eq!(turned.dimensions(), (20, 10));
}

#[test]
fn identity_affine_is_identity() {
    let img = gradient(16, 12);
    let p = ConcreteParams::new()
        .with("scale", 1.0)
        .with("rotate", 0.0)
        .with("translate_percent", 0.0);
    let out = affine(&p, img.clone(), &mut ctx()).unwrap();
    assert_eq!(out.dimensions(), img.dimensions());
    assert_eq!(out.get_pixel(6, 5), img.get_pixel(6, 5));
}

#[test]
fn affine_translation_moves_content() {
    let mut img = RgbImage::new(20, 20);
    img.put_pixel(5, 5, Rgb([255, 255, 255]));
    let p = ConcreteParams::new()
        .with("scale", 1.0)
        .with("rotate", 0.0)
        .with("translate_percent", 0.1);
    let out = affine(&p, img, &mut ctx()).unwrap();
    let (mut sx, mut sy, mut total) = (0.0, 0.0, 0.0);
    for (x, y, px) in out.enumerate_pixels() {
        let v = f64::from(px[0]);
        sx += v * f64::from(x);
        sy += v * f64::from(y);
        total += v;
    }
    assert!(total > 0.0);
    let (cx, cy) = (sx / total, sy / total);
    assert!((cx - 7.0).abs() < 1.0, "centroid x {cx}");
    assert!((cy - 7.0).abs() < 1.0, "centroid y {cy}");
}

#[test]
fn resize_and_crop_dimensions() {
    let img = gradient(100, 50);
    let half = resize(&ConcreteParams::new().with("size", 0.5), img.clone(), &mut ctx()).unwrap();
    assert_eq!(half.dimensions(), (50, 25));
    assert!(resize(&ConcreteParams::new().with("size", 0.0), img.clone(), &mut ctx()).is_err());

    let c = crop(&ConcreteParams::new().with("border_ratio", 0.1), img.clone(), &mut ctx()).unwrap();
    assert_eq!(c.dimensions(), (80, 40));
    assert_eq!(c.get_pixel(0, 0), img.get_pixel(10, 5));
    assert!(crop(&ConcreteParams::new().with("border_ratio", 0.5), img, &mut ctx()).is_err());
}

#[test]
fn perspective_is_seeded() {
    let img = gradient(24, 24);
    let p = ConcreteParams::new().with("scale", 0.1);
    let a = perspective(&p, img.clone(), &mut OpContext::new(1)).unwrap();
    let b = perspective(&p, img.clone(), &mut OpContext::new(1)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.dimensions(), (24, 24));
}

#[test]
fn flips_are_registered() {
    let reg = OperatorRegistry::builtin();
    let img = image::DynamicImage::ImageRgb8(gradient(3, 2));
    let out = reg
        .apply("FlipLeftRight", &ConcreteParams::new(), img, 0)
        .unwrap()
        .into_rgb8();
    assert_eq!(out.get_pixel(0, 0), &Rgb([20, 0, 128]));
}

#[test]
fn scale_keeps_canvas_and_zooms_about_center() {
    let img = gradient(20, 20);
    let same = scale(&ConcreteParams::new().with("scale", 1.0), img.clone(), &mut ctx()).unwrap();
    assert_eq!(same.get_pixel(7, 3), img.get_pixel(7, 3));

    let mut dot = RgbImage::new(21, 21);
    dot.put_pixel(15, 10, Rgb([255, 255, 255]));
    let zoomed = scale(&ConcreteParams::new().with("scale", 0.5), dot, &mut ctx()).unwrap();
    assert_eq!(zoomed.dimensions(), (21, 21));
    let (x, _) = brightest(&zoomed);
    assert!((12..=13).contains(&x), "dot landed at {x}");
    assert!(scale(&ConcreteParams::new().with("scale", 0.0), img, &mut ctx()).is_err());
}

fn brightest(img: &RgbImage) -> (u32, u32) {
    let (x, y, _) = img
        .enumerate_pixels()
        .max_by_key(|(_, _, p)| p[0])
        .unwrap();
    (x, y)
}

#[test]
fn translate_moves_both_axes() {
    let mut img = RgbImage::new(20, 10);
    img.put_pixel(4, 2, Rgb([255, 255, 255]));
    let out = translate(
        &ConcreteParams::new().with("translate_percent", 0.2),
        img,
        &mut ctx(),
    )
    .unwrap();
    assert_eq!(brightest(&out), (8, 4));
}

#[test]
fn shear_offsets_rows_by_distance_from_center() {
    let mut img = RgbImage::new(20, 20);
    for y in 0..20 {
        img.put_pixel(10, y, Rgb([255, 255, 255]));
    }
    let out = shear(&ConcreteParams::new().with("shear", 45.0), img.clone(), &mut ctx()).unwrap();
    let lit_x = |row: u32| {
        (0..20)
            .max_by_key(|&x| out.get_pixel(x, row)[0])
            .unwrap()
    };
    assert_eq!(lit_x(10), 10);
    assert_eq!(lit_x(5), 5);
    assert_eq!(lit_x(15), 15);
    assert!(shear(&ConcreteParams::new().with("shear", 90.0), img, &mut ctx()).is_err());
}

#[test]
fn elastic_is_seeded_and_zero_alpha_is_identity() {
    let img = gradient(24, 24);
    let p = ConcreteParams::new().with("alpha", 30.0).with("sigma", 4.0);
    let a = elastic(&p, img.clone(), &mut OpContext::new(3)).unwrap();
    let b = elastic(&p, img.clone(), &mut OpContext::new(3)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.dimensions(), (24, 24));
    assert_ne!(a, img);

    let still = ConcreteParams::new().with("alpha", 0.0).with("sigma", 4.0);
    assert_eq!(elastic(&still, img.clone(), &mut ctx()).unwrap(), img);
    let bad = ConcreteParams::new().with("alpha", 5.0).with("sigma", 0.0);
    assert!(elastic(&bad, img, &mut ctx()).is_err());
}
