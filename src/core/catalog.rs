//! Variant filtering and ranking

use crate::core::media_info::VariantDescriptor;
use crate::engine::RawFormat;
use crate::utils::format_size;
use std::cmp::Reverse;

/// Catalog of combined audio+video variants, best first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatCatalog {
    variants: Vec<VariantDescriptor>,
}

impl FormatCatalog {
    /// Build a catalog from the engine's format records.
    ///
    /// Audio-only and video-only streams are dropped; the rest is ordered by
    /// size descending with unsized variants last, discovery order kept
    /// among equals.
    pub fn from_raw(formats: &[RawFormat]) -> Self {
        let mut variants: Vec<VariantDescriptor> =
            formats.iter().filter_map(describe).collect();

        // Option orders None below Some, so Reverse puts unsized entries last
        variants.sort_by_key(|v| Reverse(v.size_bytes));

        Self { variants }
    }

    /// Variants, best first
    pub fn variants(&self) -> &[VariantDescriptor] {
        &self.variants
    }

    /// Take the ordered variants
    pub fn into_variants(self) -> Vec<VariantDescriptor> {
        self.variants
    }

    /// Number of variants
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Whether no variant survived filtering
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

fn has_track(codec: Option<&str>) -> Option<&str> {
    codec.filter(|c| !c.is_empty() && *c != "none")
}

fn describe(format: &RawFormat) -> Option<VariantDescriptor> {
    let video_codec = has_track(format.vcodec.as_deref())?;
    let audio_codec = has_track(format.acodec.as_deref())?;

    let container = format.ext.clone().unwrap_or_default();
    let resolution = format
        .resolution
        .clone()
        .unwrap_or_else(|| "unknown".to_string());

    let mut description = format!("{} ({})", resolution, container);
    if let Some(size) = format.filesize.filter(|s| *s > 0) {
        description.push_str(&format!(" - {}", format_size(size)));
    }

    Some(VariantDescriptor {
        id: format.format_id.clone().unwrap_or_default(),
        container,
        resolution,
        size_bytes: format.filesize,
        video_codec: video_codec.to_string(),
        audio_codec: audio_codec.to_string(),
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, vcodec: Option<&str>, acodec: Option<&str>, size: Option<u64>) -> RawFormat {
        RawFormat {
            format_id: Some(id.to_string()),
            ext: Some("mp4".to_string()),
            resolution: Some("1280x720".to_string()),
            filesize: size,
            vcodec: vcodec.map(str::to_string),
            acodec: acodec.map(str::to_string),
        }
    }

    fn ids(catalog: &FormatCatalog) -> Vec<&str> {
        catalog.variants().iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn test_excludes_single_track_variants() {
        let formats = vec![
            raw("audio", Some("none"), Some("opus"), Some(10)),
            raw("video", Some("vp9"), Some("none"), Some(20)),
            raw("no-acodec", Some("avc1"), None, Some(30)),
            raw("no-vcodec", None, Some("mp4a"), Some(40)),
            raw("muxed", Some("avc1"), Some("mp4a"), Some(5)),
        ];
        let catalog = FormatCatalog::from_raw(&formats);
        assert_eq!(ids(&catalog), vec!["muxed"]);
    }

    #[test]
    fn test_orders_by_size_with_unsized_last() {
        let formats = vec![
            raw("u1", Some("avc1"), Some("mp4a"), None),
            raw("small", Some("avc1"), Some("mp4a"), Some(100)),
            raw("u2", Some("avc1"), Some("mp4a"), None),
            raw("big", Some("avc1"), Some("mp4a"), Some(10_000)),
            raw("mid", Some("avc1"), Some("mp4a"), Some(5_000)),
            raw("mid2", Some("avc1"), Some("mp4a"), Some(5_000)),
        ];
        let catalog = FormatCatalog::from_raw(&formats);
        assert_eq!(ids(&catalog), vec!["big", "mid", "mid2", "small", "u1", "u2"]);
    }

    #[test]
    fn test_description() {
        let formats = vec![
            raw("sized", Some("avc1"), Some("mp4a"), Some(1536)),
            RawFormat {
                format_id: Some("bare".to_string()),
                ext: Some("webm".to_string()),
                vcodec: Some("vp9".to_string()),
                acodec: Some("opus".to_string()),
                ..Default::default()
            },
        ];
        let catalog = FormatCatalog::from_raw(&formats);
        assert_eq!(catalog.variants()[0].description, "1280x720 (mp4) - 1.5 KB");
        assert_eq!(catalog.variants()[1].description, "unknown (webm)");
        assert_eq!(catalog.variants()[1].resolution, "unknown");
    }

    #[test]
    fn test_empty() {
        let catalog = FormatCatalog::from_raw(&[]);
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
    }
}
