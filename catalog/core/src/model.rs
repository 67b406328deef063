//! Catalog Data Model
//!
//! Domain types handed to the rest of the crate, plus the wire shapes the
//! catalog API returns. Wire types are private to this module; they are
//! converted into domain types as soon as a response is decoded so nothing
//! downstream depends on the JSON layout.
//!
//! # Wire format
//!
//! ```text
//! list:   { pagination: { current_page, has_next_page, last_visible_page,
//!                         items: { count, total, per_page } },
//!           data: [Anime] }
//! detail: { data: Anime }
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Domain Types
// ============================================================================

/// Trailer reference for a catalog item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trailer {
    /// YouTube video id
    pub youtube_id: Option<String>,
    /// Watch URL
    pub url: Option<String>,
    /// Embeddable player URL
    pub embed_url: Option<String>,
}

impl Trailer {
    /// Best link to open for this trailer
    #[must_use]
    pub fn watch_url(&self) -> Option<String> {
        self.url.clone().or_else(|| {
            self.youtube_id
                .as_ref()
                .map(|id| format!("https://www.youtube.com/watch?v={id}"))
        })
    }
}

/// A single catalog entry
///
/// Built once from a response and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique identifier (`mal_id` on the wire)
    pub id: u32,
    /// Display title
    pub title: String,
    /// Number of episodes, if known
    pub episodes: Option<u32>,
    /// Content rating, e.g. "PG-13 - Teens 13 or older"
    pub rating: Option<String>,
    /// Plot synopsis
    pub synopsis: Option<String>,
    /// Genre names
    pub genres: Vec<String>,
    /// Producer names
    pub producers: Vec<String>,
    /// Trailer reference
    pub trailer: Option<Trailer>,
    /// Cover image (JPEG)
    pub image_url: Option<String>,
}

impl CatalogItem {
    /// Create an item with only the required fields set
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            episodes: None,
            rating: None,
            synopsis: None,
            genres: Vec::new(),
            producers: Vec::new(),
            trailer: None,
            image_url: None,
        }
    }
}

/// Pagination metadata returned alongside a page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-based number of the page this response holds
    pub current_page: u32,
    /// Whether another page follows
    pub has_next_page: bool,
    /// Last page number the API will serve
    pub last_visible_page: u32,
    /// Items on this page
    pub item_count: u32,
    /// Items across all pages
    pub total: u32,
    /// Page size
    pub per_page: u32,
}

/// One batch of catalog items plus continuation metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Items in response order
    pub items: Vec<CatalogItem>,
    /// Cursor/continuation metadata
    pub info: PageInfo,
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    pagination: WirePagination,
    #[serde(default)]
    data: Vec<WireAnime>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailResponse {
    data: WireAnime,
}

#[derive(Debug, Deserialize)]
struct WirePagination {
    current_page: u32,
    has_next_page: bool,
    #[serde(default)]
    last_visible_page: u32,
    #[serde(default)]
    items: WireItemCounts,
}

#[derive(Debug, Default, Deserialize)]
struct WireItemCounts {
    #[serde(default)]
    count: u32,
    #[serde(default)]
    total: u32,
    #[serde(default)]
    per_page: u32,
}

#[derive(Debug, Deserialize)]
struct WireAnime {
    mal_id: u32,
    title: String,
    episodes: Option<u32>,
    rating: Option<String>,
    synopsis: Option<String>,
    #[serde(default)]
    genres: Vec<WireNamed>,
    #[serde(default)]
    producers: Vec<WireNamed>,
    trailer: Option<WireTrailer>,
    images: Option<WireImages>,
}

#[derive(Debug, Deserialize)]
struct WireNamed {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireTrailer {
    youtube_id: Option<String>,
    url: Option<String>,
    embed_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireImages {
    jpg: Option<WireImageSet>,
}

#[derive(Debug, Deserialize)]
struct WireImageSet {
    image_url: Option<String>,
}

impl From<WireAnime> for CatalogItem {
    fn from(wire: WireAnime) -> Self {
        // The API sends an all-null trailer object rather than omitting it
        let trailer = wire.trailer.and_then(|t| {
            if t.youtube_id.is_none() && t.url.is_none() && t.embed_url.is_none() {
                None
            } else {
                Some(Trailer {
                    youtube_id: t.youtube_id,
                    url: t.url,
                    embed_url: t.embed_url,
                })
            }
        });

        Self {
            id: wire.mal_id,
            title: wire.title,
            episodes: wire.episodes,
            rating: wire.rating,
            synopsis: wire.synopsis,
            genres: wire.genres.into_iter().map(|g| g.name).collect(),
            producers: wire.producers.into_iter().map(|p| p.name).collect(),
            trailer,
            image_url: wire.images.and_then(|i| i.jpg).and_then(|j| j.image_url),
        }
    }
}

impl From<ListResponse> for Page {
    fn from(wire: ListResponse) -> Self {
        let p = wire.pagination;
        Self {
            items: wire.data.into_iter().map(CatalogItem::from).collect(),
            info: PageInfo {
                current_page: p.current_page,
                has_next_page: p.has_next_page,
                last_visible_page: p.last_visible_page,
                item_count: p.items.count,
                total: p.items.total,
                per_page: p.items.per_page,
            },
        }
    }
}

impl From<DetailResponse> for CatalogItem {
    fn from(wire: DetailResponse) -> Self {
        wire.data.into()
    }
}

/// Decode a list-page body
pub(crate) fn decode_page(body: &str) -> Result<Page, serde_json::Error> {
    serde_json::from_str::<ListResponse>(body).map(Page::from)
}

/// Decode a single-item body
pub(crate) fn decode_item(body: &str) -> Result<CatalogItem, serde_json::Error> {
    serde_json::from_str::<DetailResponse>(body).map(CatalogItem::from)
}
