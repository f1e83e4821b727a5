//! Input items: enumeration from a directory, a single file, or remote URLs, plus loading.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::DynamicImage;
use url::Url;

use crate::foundation::error::{AugsweepError, AugsweepResult};
use crate::job::InputSource;

/// File extensions picked up from an input directory (ASCII case-insensitive).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

#[derive(Clone, Debug, PartialEq, Eq)]
enum Locator {
    Path(PathBuf),
    Url(String),
}

/// One source image, identified by a file-name-safe identity string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputItem {
    id: String,
    locator: Locator,
}

impl InputItem {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            id: sanitize_id(&stem),
            locator: Locator::Path(path),
        }
    }

    /// Identity is the URL path's file stem, or `remote_{index}` when the path has none.
    pub fn from_url(url: impl Into<String>, index: usize) -> Self {
        let url = url.into();
        let id = Url::parse(&url)
            .ok()
            .and_then(|u| url_stem(&u))
            .map(|s| sanitize_id(&s))
            .unwrap_or_else(|| format!("remote_{index}"));
        Self {
            id,
            locator: Locator::Url(url),
        }
    }

    /// Identity used for the output subfolder and file names.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path or URL, for messages.
    pub fn describe(&self) -> String {
        match &self.locator {
            Locator::Path(p) => p.display().to_string(),
            Locator::Url(u) => u.clone(),
        }
    }

    /// Decode the item. Failures are reported as [`AugsweepError::Io`].
    pub fn load(&self) -> AugsweepResult<DynamicImage> {
        match &self.locator {
            Locator::Path(p) => load_path(p),
            Locator::Url(u) => fetch_url(u),
        }
        .map_err(AugsweepError::into_io)
    }
}

fn load_path(path: &Path) -> AugsweepResult<DynamicImage> {
    let img = image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(img)
}

#[cfg(feature = "remote")]
fn fetch_url(url: &str) -> AugsweepResult<DynamicImage> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .context("build http client")?;
    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .with_context(|| format!("fetch '{url}'"))?;
    let img = image::load_from_memory(&bytes).with_context(|| format!("decode image from '{url}'"))?;
    Ok(img)
}

#[cfg(not(feature = "remote"))]
fn fetch_url(url: &str) -> AugsweepResult<DynamicImage> {
    Err(AugsweepError::io(format!(
        "cannot fetch '{url}': built without the `remote` feature"
    )))
}

/// Items of `source` in processing order.
///
/// Directory items are sorted by file name so runs are reproducible; file and remote sources
/// keep their given order. An empty result is [`AugsweepError::NoInputItemsFound`].
pub fn enumerate(source: &InputSource) -> AugsweepResult<Vec<InputItem>> {
    source.validate()?;
    let items = match source {
        InputSource::File { path } => vec![InputItem::from_path(path.clone())],
        InputSource::Remote { urls } => urls
            .iter()
            .enumerate()
            .map(|(i, u)| InputItem::from_url(u.clone(), i))
            .collect(),
        InputSource::Directory { path } => {
            let mut paths = Vec::new();
            let rd = std::fs::read_dir(path)
                .with_context(|| format!("list input directory '{}'", path.display()))?;
            for entry in rd {
                let entry = entry
                    .with_context(|| format!("list input directory '{}'", path.display()))?;
                let p = entry.path();
                if p.is_file() && has_image_extension(&p) {
                    paths.push(p);
                }
            }
            paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            paths.into_iter().map(InputItem::from_path).collect()
        }
    };
    if items.is_empty() {
        return Err(AugsweepError::no_items(match source {
            InputSource::Directory { path } => {
                format!("no supported images in '{}'", path.display())
            }
            _ => "input source is empty".to_string(),
        }));
    }
    Ok(items)
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Replace anything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_id(raw: &str) -> String {
    let s: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let s = s.trim_start_matches('.').to_string();
    if s.is_empty() { "item".to_string() } else { s }
}

/// Parse `raw` as an absolute http or https URL.
pub fn parse_remote_url(raw: &str) -> AugsweepResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AugsweepError::validation(format!("remote input '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AugsweepError::validation(format!(
            "remote input '{raw}' has unsupported scheme '{other}'"
        ))),
    }
}

fn url_stem(url: &Url) -> Option<String> {
    let last = url.path_segments().and_then(|mut s| s.next_back())?;
    let stem = Path::new(last).file_stem()?.to_string_lossy().into_owned();
    if stem.is_empty() { None } else { Some(stem) }
}

#[cfg(test)]
#[path = "../tests/unit/input.rs"]
mod tests;
