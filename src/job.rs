//! Job configuration: what to read, what to run, and where to write it.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::catalog::Catalog;
use crate::compose::{Composer, SelectionSet};
use crate::foundation::error::{AugsweepError, AugsweepResult};

pub const DEFAULT_INVOCATIONS: u32 = 5;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_STEPS: u32 = 9;
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

fn default_invocations() -> u32 {
    DEFAULT_INVOCATIONS
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_steps() -> u32 {
    DEFAULT_STEPS
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

/// Exactly one of the two composition policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineMode {
    /// `invocations_per_item` random-order pipelines of all selected operators per item.
    RandomSample {
        #[serde(default = "default_invocations")]
        invocations_per_item: u32,
        #[serde(default = "default_seed")]
        seed: u64,
    },
    /// Each selected family swept on its own across `steps_per_family` steps.
    DeterministicSweep {
        #[serde(default = "default_steps")]
        steps_per_family: u32,
        /// Seeds operator-internal randomness (noise, line placement) only.
        #[serde(default = "default_seed")]
        seed: u64,
    },
}

impl Default for PipelineMode {
    fn default() -> Self {
        Self::random(DEFAULT_INVOCATIONS, DEFAULT_SEED)
    }
}

impl PipelineMode {
    pub fn random(invocations_per_item: u32, seed: u64) -> Self {
        Self::RandomSample {
            invocations_per_item,
            seed,
        }
    }

    pub fn sweep(steps_per_family: u32) -> Self {
        Self::DeterministicSweep {
            steps_per_family,
            seed: DEFAULT_SEED,
        }
    }

    pub fn seed(&self) -> u64 {
        match *self {
            Self::RandomSample { seed, .. } | Self::DeterministicSweep { seed, .. } => seed,
        }
    }

    pub fn is_sweep(&self) -> bool {
        matches!(self, Self::DeterministicSweep { .. })
    }
}

/// Where input items come from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputSource {
    /// Every supported image at the top level of a directory.
    Directory { path: PathBuf },
    /// One image file.
    File { path: PathBuf },
    /// Images fetched over HTTP(S), one item per URL.
    Remote { urls: Vec<String> },
}

impl InputSource {
    /// Directory when `path` is a directory, otherwise a single file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            Self::Directory { path }
        } else {
            Self::File { path }
        }
    }

    /// Existence checks only; directory contents are enumerated at start.
    pub fn validate(&self) -> AugsweepResult<()> {
        match self {
            Self::Directory { path } if !path.is_dir() => Err(AugsweepError::no_items(format!(
                "input directory '{}' does not exist",
                path.display()
            ))),
            Self::File { path } if !path.is_file() => Err(AugsweepError::no_items(format!(
                "input file '{}' does not exist",
                path.display()
            ))),
            Self::Remote { urls } if urls.is_empty() => {
                Err(AugsweepError::no_items("remote source lists no urls"))
            }
            Self::Remote { urls } => {
                for u in urls {
                    crate::input::parse_remote_url(u)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Output encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Bmp,
    #[serde(alias = "tif")]
    Tiff,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Tiff => image::ImageFormat::Tiff,
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            "tif" | "tiff" => Ok(Self::Tiff),
            other => Err(format!("unsupported output format '{other}'")),
        }
    }
}

/// One batch run. Immutable once started.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Job {
    pub input: InputSource,
    pub output_root: PathBuf,
    pub selection: SelectionSet,
    #[serde(default)]
    pub mode: PipelineMode,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Resize random-mode variants back to the source dimensions.
    #[serde(default)]
    pub keep_size: bool,
    /// Also write each loaded item once, untransformed.
    #[serde(default)]
    pub save_original: bool,
}

impl Job {
    pub fn new(
        input: InputSource,
        output_root: impl Into<PathBuf>,
        selection: SelectionSet,
        mode: PipelineMode,
    ) -> Self {
        Self {
            input,
            output_root: output_root.into(),
            selection,
            mode,
            output_format: OutputFormat::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            keep_size: false,
            save_original: false,
        }
    }

    /// Read a JSON job file.
    pub fn from_path(path: &Path) -> AugsweepResult<Self> {
        let f = File::open(path).with_context(|| format!("open job file '{}'", path.display()))?;
        let r = BufReader::new(f);
        serde_json::from_reader(r).map_err(|e| {
            AugsweepError::serde(format!("parse job file '{}': {e}", path.display()))
        })
    }

    pub fn from_json_str(s: &str) -> AugsweepResult<Self> {
        serde_json::from_str(s).map_err(|e| AugsweepError::serde(format!("parse job: {e}")))
    }

    pub fn to_json_pretty(&self) -> AugsweepResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AugsweepError::serde(format!("serialize job: {e}")))
    }

    /// Pre-flight checks. Touches the filesystem only to test that inputs exist.
    pub fn validate(&self, catalog: &Catalog) -> AugsweepResult<()> {
        Composer::new(catalog, &self.selection)?;
        match self.mode {
            PipelineMode::RandomSample {
                invocations_per_item: 0,
                ..
            } => {
                return Err(AugsweepError::validation(
                    "invocations_per_item must be >= 1",
                ));
            }
            PipelineMode::DeterministicSweep {
                steps_per_family: 0,
                ..
            } => {
                return Err(AugsweepError::validation("steps_per_family must be >= 1"));
            }
            _ => {}
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(AugsweepError::validation(format!(
                "jpeg_quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.output_root.as_os_str().is_empty() {
            return Err(AugsweepError::validation("output_root must be non-empty"));
        }
        self.input.validate()
    }
}

#[cfg(test)]
#[path = "../tests/unit/job.rs"]
mod tests;
