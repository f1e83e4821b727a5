use super::{Category, LabelStyle, OperatorDescriptor, ParamDef, SweepLaw};

use Category::*;
use LabelStyle::{Decimal, Percent, Prefix, Suffix};

pub(super) fn descriptors() -> Vec<OperatorDescriptor> {
    vec![
        // geometric
        OperatorDescriptor::new("Affine", "affine", Geometric, "scale, rotate and translate")
            .param(ParamDef::range("scale", 0.8, 1.2))
            .param(ParamDef::range("rotate", -15.0, 15.0).label(Suffix("deg")))
            .param(ParamDef::range("translate_percent", -0.1, 0.1))
            .recommended(),
        OperatorDescriptor::new("Rotate", "rotate", Geometric, "rotate about the center")
            .param(ParamDef::range("rotate", -30.0, 30.0).label(Suffix("deg")))
            .recommended(),
        OperatorDescriptor::new("Scale", "scale", Geometric, "zoom about the center, same canvas")
            .param(
                ParamDef::range("scale", 0.7, 1.3)
                    .law(SweepLaw::ScaleFromArea)
                    .label(Percent),
            ),
        OperatorDescriptor::new(
            "Translate",
            "translate",
            Geometric,
            "shift by a fraction of width and height",
        )
        .param(ParamDef::range("translate_percent", -0.2, 0.2).label(Percent)),
        OperatorDescriptor::new("Shear", "shear", Geometric, "horizontal shear about the center")
            .param(ParamDef::range("shear", -15.0, 15.0).label(Suffix("deg"))),
        OperatorDescriptor::new("Resize", "resize", Geometric, "rescale both sides")
            .param(
                ParamDef::range("size", 0.7, 1.3)
                    .law(SweepLaw::ScaleFromArea)
                    .label(Percent),
            )
            .recommended(),
        OperatorDescriptor::new(
            "PerspectiveTransform",
            "perspective",
            Geometric,
            "random four-point perspective warp",
        )
        .param(ParamDef::range("scale", 0.01, 0.1).label(Decimal(3)))
        .recommended(),
        OperatorDescriptor::new(
            "ElasticTransformation",
            "elastic",
            Geometric,
            "smoothed random displacement field",
        )
        .param(ParamDef::range("alpha", 0.0, 50.0).label(Prefix("a")))
        .param(ParamDef::range("sigma", 4.0, 8.0)),
        OperatorDescriptor::new("Crop", "crop", Geometric, "remove a border on every side")
            .param(
                ParamDef::range("border_ratio", 0.02, 0.34)
                    .law(SweepLaw::BorderFromArea)
                    .label(LabelStyle::AreaFromBorder),
            ),
        OperatorDescriptor::new(
            "FlipLeftRight",
            "flip_left_right",
            Geometric,
            "mirror horizontally",
        ),
        OperatorDescriptor::new("FlipUpDown", "flip_up_down", Geometric, "mirror vertically"),
        // color
        OperatorDescriptor::new(
            "AddToBrightness",
            "brightness_add",
            Color,
            "add a constant to every channel",
        )
        .param(ParamDef::range("add", -30.0, 30.0).label(Decimal(0)))
        .recommended(),
        OperatorDescriptor::new(
            "MultiplyBrightness",
            "brightness_mul",
            Color,
            "scale every channel",
        )
        .param(ParamDef::range("mul", 0.7, 1.3))
        .recommended(),
        OperatorDescriptor::new("AddToHue", "hue", Color, "shift hue in degrees")
            .param(ParamDef::range("value", -20.0, 20.0).label(Decimal(0)))
            .recommended(),
        OperatorDescriptor::new(
            "AddToSaturation",
            "saturation",
            Color,
            "shift HSV saturation (0-255 scale)",
        )
        .param(ParamDef::range("value", -30.0, 30.0).label(Decimal(0)))
        .recommended(),
        OperatorDescriptor::new("Grayscale", "grayscale", Color, "blend toward luminance")
            .param(ParamDef::range("alpha", 0.5, 1.0))
            .recommended(),
        OperatorDescriptor::new(
            "ChangeColorTemperature",
            "temperature",
            Color,
            "tint toward a black-body color",
        )
        .param(ParamDef::range("kelvin", 1000.0, 11000.0).label(Suffix("K"))),
        OperatorDescriptor::new("Posterize", "posterize", Color, "keep the top bits per channel")
            .param(ParamDef::range("nb_bits", 3.0, 7.0).label(Suffix("bits"))),
        // blur and noise
        OperatorDescriptor::new("GaussianBlur", "gaussian_blur", BlurNoise, "gaussian blur")
            .param(ParamDef::range("sigma", 0.0, 1.0))
            .recommended(),
        OperatorDescriptor::new("AverageBlur", "average_blur", BlurNoise, "box blur")
            .param(ParamDef::range("k", 2.0, 7.0).label(Prefix("k")))
            .recommended(),
        OperatorDescriptor::new("MedianBlur", "median_blur", BlurNoise, "median filter")
            .param(ParamDef::range("k", 3.0, 7.0).label(Prefix("k"))),
        OperatorDescriptor::new("MotionBlur", "motion_blur", BlurNoise, "directional line blur")
            .param(ParamDef::range("k", 3.0, 7.0).label(Prefix("k")))
            .param(ParamDef::range("angle", -45.0, 45.0).label(Suffix("deg"))),
        OperatorDescriptor::new(
            "AdditiveGaussianNoise",
            "gaussian_noise",
            BlurNoise,
            "per-pixel gaussian noise",
        )
        .param(ParamDef::fixed("loc", 0.0))
        .param(ParamDef::range("scale", 0.0, 12.75))
        .recommended(),
        OperatorDescriptor::new(
            "AdditivePoissonNoise",
            "poisson_noise",
            BlurNoise,
            "per-pixel poisson noise",
        )
        .param(ParamDef::range("lam", 0.0, 10.0)),
        OperatorDescriptor::new(
            "SaltAndPepper",
            "salt_pepper",
            BlurNoise,
            "replace pixels with black or white",
        )
        .param(ParamDef::range("p", 0.0, 0.05).label(Decimal(3)))
        .recommended(),
        OperatorDescriptor::new(
            "JpegCompression",
            "compress",
            BlurNoise,
            "re-encode through lossy jpeg",
        )
        .param(ParamDef::range("quality", 10.0, 90.0).label(Prefix("q"))),
        OperatorDescriptor::new("Mosaic", "mosaic", BlurNoise, "pixelate with square cells")
            .param(ParamDef::range("size", 2.0, 18.0).label(Prefix("size"))),
        // contrast and sharpen
        OperatorDescriptor::new(
            "ContrastNormalization",
            "contrast",
            ContrastSharpen,
            "scale distance from mid-gray",
        )
        .param(ParamDef::range("alpha", 0.5, 1.5))
        .recommended(),
        OperatorDescriptor::new(
            "HistogramEqualization",
            "histogram_eq",
            ContrastSharpen,
            "equalize the luminance histogram",
        ),
        OperatorDescriptor::new(
            "CLAHE",
            "clahe",
            ContrastSharpen,
            "tile-wise clipped histogram equalization of luminance",
        )
        .param(ParamDef::range("clip_limit", 1.0, 4.0).label(Decimal(1)))
        .param(ParamDef::range("tile_grid_size", 3.0, 7.0))
        .recommended(),
        OperatorDescriptor::new("Sharpen", "sharpen", ContrastSharpen, "unsharp kernel")
            .param(ParamDef::range("alpha", 0.0, 1.0))
            .param(ParamDef::range("lightness", 0.75, 1.25))
            .recommended(),
        OperatorDescriptor::new("Emboss", "emboss", ContrastSharpen, "relief kernel")
            .param(ParamDef::range("alpha", 0.0, 1.0))
            .param(ParamDef::range("strength", 0.5, 1.5))
            .recommended(),
        // weather
        OperatorDescriptor::new("Clouds", "clouds", Weather, "soft bright cloud layer")
            .param(ParamDef::range("density", 0.0, 0.3))
            .recommended(),
        OperatorDescriptor::new("Rain", "rain", Weather, "slanted rain streaks")
            .param(ParamDef::range("drop_length", 0.1, 0.3))
            .param(ParamDef::range("drop_width", 0.1, 0.3))
            .recommended(),
        OperatorDescriptor::new("Snowflakes", "snowflakes", Weather, "scattered snow flakes")
            .param(ParamDef::range("flake_density", 0.1, 0.3))
            .param(ParamDef::range("flake_size", 0.1, 0.3))
            .recommended(),
        OperatorDescriptor::new("Fog", "fog", Weather, "uniform haze toward white")
            .param(ParamDef::range("density", 0.0, 0.3)),
        // edge and texture
        OperatorDescriptor::new("Canny", "canny", EdgeTexture, "blend in canny edges")
            .param(ParamDef::range("alpha", 0.0, 1.0))
            .recommended(),
        OperatorDescriptor::new(
            "DirectedEdgeDetect",
            "directed_edge",
            EdgeTexture,
            "blend in edges along one direction",
        )
        .param(ParamDef::range("alpha", 0.0, 1.0))
        .param(ParamDef::range("direction", 0.0, 1.0))
        .recommended(),
        OperatorDescriptor::new(
            "InterferenceLines",
            "interference_lines",
            EdgeTexture,
            "random colored line segments",
        )
        .param(ParamDef::range("lines", 5.0, 45.0).label(Suffix("lines"))),
        OperatorDescriptor::new(
            "FrequencyNoiseAlpha",
            "frequency_noise",
            EdgeTexture,
            "modulate brightness with power-law frequency noise",
        )
        .param(ParamDef::range("exponent", -4.0, 4.0).label(Decimal(1)))
        .param(ParamDef::range("size_px_max", 4.0, 16.0)),
        OperatorDescriptor::new(
            "SimplexNoiseAlpha",
            "simplex_noise",
            EdgeTexture,
            "modulate brightness with smooth lattice noise",
        )
        .param(ParamDef::range("size_px_max", 4.0, 16.0).label(Prefix("size"))),
        OperatorDescriptor::new("Grid", "grid", EdgeTexture, "gray grid overlay")
            .param(ParamDef::range("spacing", 18.0, 92.0).label(Prefix("spacing"))),
    ]
}
