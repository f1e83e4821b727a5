use std::io::Cursor;

use image::{RgbImage, imageops::FilterType};
use imageproc::filter::{gaussian_blur_f32, median_filter};
use imageproc::noise::{gaussian_noise_mut, salt_and_pepper_noise_mut};
use rand::RngCore;
use rand_distr::{Distribution, Poisson};

use super::kernel::{box_kernel_q16, convolve, separable_q16, to_u8};
use super::{OpContext, OperatorRegistry};
use crate::foundation::error::{AugsweepError, AugsweepResult};
use crate::sampler::ConcreteParams;

pub(super) fn register(reg: &mut OperatorRegistry) {
    reg.register_rgb("GaussianBlur", &["sigma"], |p, img, _| {
        let sigma = p.require("sigma")? as f32;
        // imageproc rejects non-positive sigma
        if sigma < 0.01 {
            return Ok(img);
        }
        Ok(gaussian_blur_f32(&img, sigma))
    });
    reg.register_rgb("AverageBlur", &["k"], |p, img, _| {
        let k = kernel_size(p.require("k")?, 1)?;
        Ok(separable_q16(&img, &box_kernel_q16(k)?))
    });
    reg.register_rgb("MedianBlur", &["k"], |p, img, _| {
        let k = kernel_size(p.require("k")?, 1)?;
        let radius = k / 2;
        if radius == 0 {
            return Ok(img);
        }
        Ok(median_filter(&img, radius, radius))
    });
    reg.register_rgb("MotionBlur", &["k"], motion_blur);
    reg.register_rgb("AdditiveGaussianNoise", &["scale"], |p, mut img, ctx| {
        let scale = p.require("scale")?;
        if scale > 0.0 {
            let seed = ctx.rng().next_u64();
            gaussian_noise_mut(&mut img, p.get_or("loc", 0.0), scale, seed);
        }
        Ok(img)
    });
    reg.register_rgb("AdditivePoissonNoise", &["lam"], poisson_noise);
    reg.register_rgb("SaltAndPepper", &["p"], |p, mut img, ctx| {
        let rate = p.require("p")?.clamp(0.0, 1.0);
        if rate > 0.0 {
            let seed = ctx.rng().next_u64();
            salt_and_pepper_noise_mut(&mut img, rate, seed);
        }
        Ok(img)
    });
    reg.register_rgb("JpegCompression", &["quality"], jpeg_compression);
    reg.register_rgb("Mosaic", &["size"], mosaic);
}

fn kernel_size(v: f64, min: u32) -> AugsweepResult<u32> {
    let k = v.round();
    if !(f64::from(min)..=255.0).contains(&k) {
        return Err(AugsweepError::operator(format!(
            "kernel size {v} is outside {min}..=255"
        )));
    }
    Ok(k as u32)
}

/// Line kernel of `k` taps through the center at `angle` degrees.
fn motion_kernel(k: u32, angle: f64) -> Vec<f32> {
    let size = k as usize;
    let mut kernel = vec![0f32; size * size];
    let c = (size as f64 - 1.0) / 2.0;
    let (sin, cos) = angle.to_radians().sin_cos();
    let samples = size * 4;
    for i in 0..samples {
        let t = i as f64 / (samples - 1).max(1) as f64 * (size as f64 - 1.0) - c;
        let x = (c + t * cos).round().clamp(0.0, size as f64 - 1.0) as usize;
        let y = (c + t * sin).round().clamp(0.0, size as f64 - 1.0) as usize;
        kernel[y * size + x] = 1.0;
    }
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel
}

fn motion_blur(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let k = kernel_size(p.require("k")?, 1)?;
    if k == 1 {
        return Ok(img);
    }
    let kernel = motion_kernel(k, p.get_or("angle", 0.0));
    convolve(&img, &kernel, k as usize)
}

fn poisson_noise(p: &ConcreteParams, mut img: RgbImage, ctx: &mut OpContext) -> AugsweepResult<RgbImage> {
    let lam = p.require("lam")?;
    if lam < 0.0 {
        return Err(AugsweepError::operator(format!("poisson lambda {lam} must be >= 0")));
    }
    if lam == 0.0 {
        return Ok(img);
    }
    let dist = Poisson::new(lam)
        .map_err(|e| AugsweepError::operator(format!("poisson lambda {lam}: {e}")))?;
    let rng = ctx.rng();
    for px in img.pixels_mut() {
        // one sample per pixel keeps the noise achromatic
        let n = (dist.sample(&mut *rng) - lam) as f32;
        for c in 0..3 {
            px[c] = to_u8(f32::from(px[c]) + n);
        }
    }
    Ok(img)
}

fn jpeg_compression(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let q = p.require("quality")?.round().clamp(1.0, 100.0) as u8;
    let mut buf = Cursor::new(Vec::new());
    let enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, q);
    img.write_with_encoder(enc)
        .map_err(|e| AugsweepError::operator(format!("jpeg encode at q{q}: {e}")))?;
    let decoded = image::load_from_memory_with_format(buf.get_ref(), image::ImageFormat::Jpeg)
        .map_err(|e| AugsweepError::operator(format!("jpeg decode: {e}")))?;
    Ok(decoded.into_rgb8())
}

/// Downscale by `size` with nearest-neighbor, then scale back up the same way.
fn mosaic(p: &ConcreteParams, img: RgbImage, _: &mut OpContext) -> AugsweepResult<RgbImage> {
    let size = kernel_size(p.require("size")?, 1)?;
    if size == 1 {
        return Ok(img);
    }
    let (w, h) = img.dimensions();
    let sw = (w / size).max(1);
    let sh = (h / size).max(1);
    let small = image::imageops::resize(&img, sw, sh, FilterType::Nearest);
    Ok(image::imageops::resize(&small, w, h, FilterType::Nearest))
}

#[cfg(test)]
#[path = "../../tests/unit/ops/blur_noise.rs"]
mod tests;
