use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

// ============================================================================
// Strategy
// ============================================================================

/// Server-side ranking used by the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    #[default]
    Relevant,
    Recent,
}

impl Strategy {
    /// Value of the `strategy` query parameter.
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Relevant => "relevant",
            Self::Recent => "new",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Relevant => "Relevant",
            Self::Recent => "Recent",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query())
    }
}

// ============================================================================
// Domain Types
// ============================================================================

/// One row of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub owner_username: String,
    pub tabcoins: i64,
    pub published_at: Option<DateTime<Utc>>,
    /// Number of comments below this content, at any depth.
    pub children_deep_count: u32,
}

/// Full content for one item, as shown in the reader pane.
///
/// This is also the record format of the on-disk snapshot, so field names
/// follow the API's snake_case spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub owner_username: String,
    pub tabcoins: i64,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_url: Option<String>,
}

// ============================================================================
// Wire Records
// ============================================================================
//
// These mirror the remote content object field for field. `deny_unknown_fields`
// makes an upstream schema change surface as a decode error instead of being
// silently dropped. Fields the browser never shows are decoded as `IgnoredAny`
// so only their names are enforced.

/// A content object as returned by `GET /contents`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ContentRecord {
    id: String,
    slug: String,
    #[serde(default)]
    title: Option<String>,
    owner_username: String,
    #[serde(default)]
    tabcoins: i64,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    children_deep_count: u32,
    #[serde(default, rename = "owner_id")]
    _owner_id: IgnoredAny,
    #[serde(default, rename = "parent_id")]
    _parent_id: IgnoredAny,
    #[serde(default, rename = "status")]
    _status: IgnoredAny,
    #[serde(default, rename = "source_url")]
    _source_url: IgnoredAny,
    #[serde(default, rename = "created_at")]
    _created_at: IgnoredAny,
    #[serde(default, rename = "updated_at")]
    _updated_at: IgnoredAny,
    #[serde(default, rename = "deleted_at")]
    _deleted_at: IgnoredAny,
}

impl From<ContentRecord> for ContentSummary {
    fn from(record: ContentRecord) -> Self {
        Self {
            id: record.id,
            slug: record.slug,
            title: record.title.unwrap_or_default(),
            owner_username: record.owner_username,
            tabcoins: record.tabcoins,
            published_at: record.published_at,
            children_deep_count: record.children_deep_count,
        }
    }
}

/// A content object as returned by `GET /contents/{owner}/{slug}`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ArticleRecord {
    id: String,
    slug: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    owner_username: String,
    #[serde(default)]
    tabcoins: i64,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    source_url: Option<String>,
    #[serde(default, rename = "children_deep_count")]
    _children_deep_count: IgnoredAny,
    #[serde(default, rename = "owner_id")]
    _owner_id: IgnoredAny,
    #[serde(default, rename = "parent_id")]
    _parent_id: IgnoredAny,
    #[serde(default, rename = "status")]
    _status: IgnoredAny,
    #[serde(default, rename = "created_at")]
    _created_at: IgnoredAny,
    #[serde(default, rename = "updated_at")]
    _updated_at: IgnoredAny,
    #[serde(default, rename = "deleted_at")]
    _deleted_at: IgnoredAny,
}

impl From<ArticleRecord> for Article {
    fn from(record: ArticleRecord) -> Self {
        Self {
            id: record.id,
            slug: record.slug,
            title: record.title.unwrap_or_default(),
            body: record.body.unwrap_or_default(),
            owner_username: record.owner_username,
            tabcoins: record.tabcoins,
            published_at: record.published_at,
            source_url: record.source_url,
        }
    }
}
