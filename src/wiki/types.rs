//! Data carried between the Wikimedia REST API and the crawl pipeline
//!
//! The `*Payload` types mirror the JSON the API returns and are private to the
//! client; [`RankedItem`] and [`ItemDetail`] are what the pipeline consumes.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One entry of a project's daily top list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RankedItem {
    /// Article identifier as it appears in URLs (underscores, not spaces)
    pub article: String,

    /// Views on the ranked day
    pub views: u64,

    /// 1-based position in the top list
    pub rank: u32,
}

/// One image attached to an article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub original_url: String,
    pub thumbnail_url: String,
}

/// Summary and media for one article
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDetail {
    /// Article identifier this detail was fetched for
    pub article: String,

    /// Normalized display title
    pub title: String,

    /// Plain-text summary; may be empty
    pub extract: String,

    /// Desktop URL of the article page
    pub page_url: String,

    /// Images in page order; may be empty
    pub media: Vec<MediaRef>,

    /// When the detail was fetched
    pub retrieved_at: DateTime<Utc>,
}

impl ItemDetail {
    /// Returns the first image, which is the one shown in the feed
    pub fn lead_image(&self) -> Option<&MediaRef> {
        self.media.first()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopPageviewsPayload {
    #[serde(default)]
    pub items: Vec<TopPageviews>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopPageviews {
    #[serde(default)]
    pub articles: Vec<RankedItem>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SummaryPayload {
    #[serde(default)]
    pub titles: TitlesPayload,
    #[serde(default)]
    pub extract: String,
    #[serde(default)]
    pub content_urls: ContentUrlsPayload,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TitlesPayload {
    #[serde(default)]
    pub normalized: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ContentUrlsPayload {
    #[serde(default)]
    pub desktop: PageUrlsPayload,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageUrlsPayload {
    #[serde(default)]
    pub page: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaPayload {
    #[serde(default)]
    pub items: Vec<MediaItemPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaItemPayload {
    pub original: Option<ImagePayload>,
    pub thumbnail: Option<ImagePayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImagePayload {
    #[serde(default)]
    pub source: String,
}

impl MediaPayload {
    /// Keeps the items that carry an original image
    ///
    /// A missing thumbnail falls back to the original.
    pub fn into_media_refs(self) -> Vec<MediaRef> {
        self.items
            .into_iter()
            .filter_map(|item| {
                let original = item.original.map(|o| o.source).unwrap_or_default();
                if original.is_empty() {
                    return None;
                }
                let thumbnail = item
                    .thumbnail
                    .map(|t| t.source)
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| original.clone());
                Some(MediaRef {
                    original_url: original,
                    thumbnail_url: thumbnail,
                })
            })
            .collect()
    }
}
