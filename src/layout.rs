//! Output Layout Manager: destination paths and image writing.
//!
//! Layout on disk is `root/{item}/{n}_{item}_{family}_{label}.{ext}`, where `n` comes from the
//! job-wide [`SequenceCounter`] and is never reused within a job.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use image::DynamicImage;

use crate::foundation::error::{AugsweepError, AugsweepResult};
use crate::foundation::repro::SequenceCounter;
use crate::input::sanitize_id;
use crate::job::OutputFormat;

/// Family slug and label used for saved originals.
pub const ORIGINAL_FAMILY: &str = "original";
pub const ORIGINAL_LABEL: &str = "src";

#[derive(Clone, Debug)]
pub struct OutputLayout {
    root: PathBuf,
    format: OutputFormat,
    jpeg_quality: u8,
    counter: SequenceCounter,
}

impl OutputLayout {
    pub fn new(
        root: impl Into<PathBuf>,
        format: OutputFormat,
        jpeg_quality: u8,
        counter: SequenceCounter,
    ) -> Self {
        Self {
            root: root.into(),
            format,
            jpeg_quality,
            counter,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Create the output root. Failure here leaves the job with nowhere to write.
    pub fn prepare_root(&self) -> AugsweepResult<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("create output root '{}'", self.root.display()))
            .map_err(|e| AugsweepError::from(e).into_io())
    }

    /// Next destination for `item_id`. Consumes one sequence number.
    pub fn destination_for(&self, item_id: &str, family: &str, label: &str) -> PathBuf {
        let n = self.counter.next();
        let item = sanitize_id(item_id);
        let name = format!(
            "{n}_{item}_{}_{}.{}",
            sanitize_id(family),
            sanitize_id(label),
            self.format.extension()
        );
        self.root.join(&item).join(name)
    }

    /// Destination for an untransformed copy of `item_id`.
    pub fn original_destination(&self, item_id: &str) -> PathBuf {
        self.destination_for(item_id, ORIGINAL_FAMILY, ORIGINAL_LABEL)
    }

    /// Encode `img` at `path` in the job format, creating the item folder as needed.
    pub fn save(&self, img: &DynamicImage, path: &Path) -> AugsweepResult<()> {
        save_image(img, path, self.format, self.jpeg_quality)
    }
}

/// Encode `img` to `path`. JPEG output drops alpha and honors `jpeg_quality`.
pub fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    jpeg_quality: u8,
) -> AugsweepResult<()> {
    write_image(img, path, format, jpeg_quality).map_err(|e| AugsweepError::from(e).into_io())
}

fn write_image(
    img: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    jpeg_quality: u8,
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    match format {
        OutputFormat::Jpeg => {
            let f = File::create(path)
                .with_context(|| format!("create output file '{}'", path.display()))?;
            let mut w = BufWriter::new(f);
            let enc =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut w, jpeg_quality.clamp(1, 100));
            img.to_rgb8()
                .write_with_encoder(enc)
                .with_context(|| format!("encode jpeg '{}'", path.display()))?;
        }
        OutputFormat::Bmp => {
            img.to_rgb8()
                .save_with_format(path, format.image_format())
                .with_context(|| format!("write '{}'", path.display()))?;
        }
        OutputFormat::Png | OutputFormat::Tiff => {
            img.save_with_format(path, format.image_format())
                .with_context(|| format!("write '{}'", path.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/layout.rs"]
mod tests;
