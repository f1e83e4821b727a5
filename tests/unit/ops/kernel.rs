use super::*;

#[test]
fn box_kernel_sums_to_one() {
    for len in [1, 2, 3, 7] {
        let k = box_kernel_q16(len).unwrap();
        assert_eq!(k.iter().sum::<u32>(), 65536);
    }
    assert!(box_kernel_q16(0).is_err());
}

#[test]
fn constant_image_survives_blur() {
    let src = RgbImage::from_pixel(6, 5, Rgb([10, 20, 30]));
    let out = separable_q16(&src, &box_kernel_q16(3).unwrap());
    assert_eq!(out, src);
}

#[test]
fn blur_spreads_a_single_bright_pixel() {
    let mut src = RgbImage::new(5, 5);
    src.put_pixel(2, 2, Rgb([255, 255, 255]));
    let out = separable_q16(&src, &box_kernel_q16(3).unwrap());
    let lit = out.pixels().filter(|p| p[0] > 0).count();
    assert_eq!(lit, 9);
}

#[test]
fn identity_convolution_is_identity() {
    let mut src = RgbImage::new(4, 4);
    src.put_pixel(1, 2, Rgb([9, 99, 199]));
    let k = [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
    assert_eq!(convolve(&src, &k, 3).unwrap(), src);
    assert!(convolve(&src, &k, 2).is_err());
}

#[test]
fn blend_endpoints() {
    let a = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
    let b = RgbImage::from_pixel(2, 2, Rgb([200, 100, 50]));
    assert_eq!(blend(&a, &b, 0.0).unwrap(), a);
    assert_eq!(blend(&a, &b, 1.0).unwrap(), b);
    assert_eq!(blend(&a, &b, 0.5).unwrap().get_pixel(0, 0), &Rgb([100, 50, 25]));
    assert!(blend(&a, &RgbImage::new(3, 3), 0.5).is_err());
}

#[test]
fn convolution_correlates_and_clamps_at_borders() {
    let src = RgbImage::from_fn(4, 3, |x, y| Rgb([(x * 10 + y) as u8, 0, 0]));
    // right neighbor tap
    let k = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
    let out = convolve(&src, &k, 3).unwrap();
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(out.get_pixel(x, y)[0], src.get_pixel((x + 1).min(3), y)[0]);
        }
    }
    assert!(convolve(&src, &[], 0).is_err());
}
