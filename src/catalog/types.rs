use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque identifier of a catalog item.
///
/// The admin API sends numeric ids, but nothing here relies on that; string
/// ids are accepted and carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self::from(n)),
            Raw::Text(s) if !s.trim().is_empty() => Ok(Self(s)),
            Raw::Text(_) => Err(serde::de::Error::custom("item id must not be empty")),
        }
    }
}

/// A catalog item as listed by the remote API.
///
/// Missing fields are defaulted at the client boundary: no tags becomes an
/// empty list, no title an empty string. An unknown creation time stays
/// `None` and never satisfies an age requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    /// Parsed tags: trimmed, non-empty, first occurrence kept.
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

/// One page of a listing.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<CatalogItem>,
    /// Cursor for the following page, `None` on the last page.
    pub next_cursor: Option<String>,
}

/// The fields of a matched item needed for deletion and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub id: ItemId,
    pub title: String,
    pub tags: Vec<String>,
}

impl From<&CatalogItem> for Candidate {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            tags: item.tags.clone(),
        }
    }
}

/// Split a comma-separated tag string into its tags.
///
/// Whitespace around each tag is trimmed, empty entries are dropped and
/// duplicates collapse onto their first occurrence. Case is preserved.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `GET /products.json`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProductListResponse {
    #[serde(default)]
    pub products: Vec<RawProduct>,
}

/// A product exactly as the admin API returns it.
#[derive(Debug, Deserialize)]
pub(crate) struct RawProduct {
    pub id: ItemId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Option<RawTags>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// REST returns tags as one comma-separated string; other API surfaces use
/// a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTags {
    Text(String),
    List(Vec<String>),
}

impl RawTags {
    fn parse(&self) -> Vec<String> {
        match self {
            RawTags::Text(raw) => parse_tags(raw),
            RawTags::List(list) => parse_tags(&list.join(",")),
        }
    }
}

impl From<RawProduct> for CatalogItem {
    fn from(raw: RawProduct) -> Self {
        let created_at = raw
            .created_at
            .as_deref()
            .and_then(|s| match DateTime::parse_from_rfc3339(s.trim()) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(e) => {
                    tracing::debug!(item_id = %raw.id, created_at = s, error = %e, "Unparseable created_at");
                    None
                }
            });

        Self {
            tags: raw.tags.as_ref().map(RawTags::parse).unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            created_at,
            status: raw.status,
            id: raw.id,
        }
    }
}
