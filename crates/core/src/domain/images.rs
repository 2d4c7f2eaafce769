//! Image variant descriptors.
//!
//! Variants are resolved against the image CDN by URL transformation; the
//! server never touches pixels. A variant fits the original inside its
//! bounding box, keeping the aspect ratio and never enlarging.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::DomainError;

/// Named size presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageVariant {
    Thumbnail,
    Medium,
    Large,
}

impl ImageVariant {
    pub const ALL: [ImageVariant; 3] = [
        ImageVariant::Thumbnail,
        ImageVariant::Medium,
        ImageVariant::Large,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageVariant::Thumbnail => "thumbnail",
            ImageVariant::Medium => "medium",
            ImageVariant::Large => "large",
        }
    }

    /// Bounding box `(width, height)` of the preset.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ImageVariant::Thumbnail => (200, 200),
            ImageVariant::Medium => (800, 800),
            ImageVariant::Large => (1600, 1600),
        }
    }

    /// Scales `(width, height)` to fit inside the preset box.
    ///
    /// Images already inside the box are returned unchanged. Degenerate
    /// input (a zero side) yields the box itself.
    pub fn fit_inside(&self, width: u32, height: u32) -> (u32, u32) {
        let (max_w, max_h) = self.dimensions();
        if width == 0 || height == 0 {
            return (max_w, max_h);
        }
        if width <= max_w && height <= max_h {
            return (width, height);
        }

        let scale = f64::min(
            f64::from(max_w) / f64::from(width),
            f64::from(max_h) / f64::from(height),
        );
        let w = (f64::from(width) * scale).round().max(1.0) as u32;
        let h = (f64::from(height) * scale).round().max(1.0) as u32;
        (w.min(max_w), h.min(max_h))
    }
}

impl fmt::Display for ImageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageVariant {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "thumbnail" => Ok(ImageVariant::Thumbnail),
            "medium" => Ok(ImageVariant::Medium),
            "large" => Ok(ImageVariant::Large),
            _ => Err(DomainError::validation(format!(
                "Unknown image variant: {s}"
            ))),
        }
    }
}

/// Resolved variant of a stored image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageVariantInfo {
    pub file_id: String,
    pub variant: ImageVariant,
    pub width: u32,
    pub height: u32,
    pub url: String,
}

impl ImageVariantInfo {
    /// Builds the descriptor for `variant` of the image at `media`.
    ///
    /// `source` is the original `(width, height)` when known.
    pub fn resolve(
        file_id: impl Into<String>,
        media: &str,
        variant: ImageVariant,
        source: Option<(u32, u32)>,
    ) -> Result<Self, DomainError> {
        let (width, height) = match source {
            Some((w, h)) => variant.fit_inside(w, h),
            None => variant.dimensions(),
        };
        let url = transform_url(media, width, height)?;
        Ok(Self {
            file_id: file_id.into(),
            variant,
            width,
            height,
            url,
        })
    }

    /// Descriptors for every preset, in `ImageVariant::ALL` order.
    pub fn resolve_all(
        file_id: &str,
        media: &str,
        source: Option<(u32, u32)>,
    ) -> Result<Vec<Self>, DomainError> {
        ImageVariant::ALL
            .iter()
            .map(|variant| Self::resolve(file_id, media, *variant, source))
            .collect()
    }
}

/// Appends the `tr=w-<W>,h-<H>` transformation to the image URL.
fn transform_url(media: &str, width: u32, height: u32) -> Result<String, DomainError> {
    let mut url =
        Url::parse(media).map_err(|_| DomainError::validation("Invalid image URL"))?;
    url.query_pairs_mut()
        .append_pair("tr", &format!("w-{width},h-{height}"));
    Ok(url.to_string())
}

/// Derives a stable file identifier from an image URL: its last path segment.
pub fn file_id_from_media(media: &str) -> Option<String> {
    let url = Url::parse(media).ok()?;
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}
