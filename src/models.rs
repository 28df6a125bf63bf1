//! JSON shapes for the docs index artifact.
//!
//! The index is one pretty-printed JSON document. Operators hand-edit
//! entries (tags, meta, status, ...) between rebuilds, so both [`DocEntry`]
//! and [`DocsIndex`] carry a flattened catch-all map: fields this crate does
//! not know about round-trip untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fixed base fields advertised in the index schema descriptor. The
/// descriptor is advisory documentation for consumers, not enforced.
pub const BASE_FIELDS: [&str; 13] = [
    "id",
    "title",
    "summary",
    "tags",
    "source_path",
    "source_repo",
    "type",
    "created_at",
    "updated_at",
    "status",
    "visibility",
    "owner",
    "meta",
];

/// Recognized keys inside an entry's open `meta` mapping.
pub const META_FIELDS: [&str; 3] = ["doc_kind", "audience", "section"];

/// One indexed documentation file.
///
/// `id` is the slug of `source_path`, so re-scans are idempotent. String
/// fields default to empty on deserialization so that partially
/// hand-edited entries still load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source_path: String,
    #[serde(default)]
    pub source_repo: String,
    /// `report` for run artifacts, `doc` otherwise.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub owner: String,
    /// Open string-keyed mapping for caller-defined fields.
    #[serde(default)]
    pub meta: Map<String, Value>,
    /// Unknown curated fields, preserved across rebuilds.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSchema {
    pub base_fields: Vec<String>,
    pub meta_fields: Vec<String>,
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self {
            base_fields: BASE_FIELDS.iter().map(|f| f.to_string()).collect(),
            meta_fields: META_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// The persisted index document. [`DocsIndex::default`] is the shape used
/// when the file on disk is missing or corrupt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsIndex {
    #[serde(default = "default_page")]
    pub page: String,
    #[serde(default = "default_version")]
    pub version: i64,
    #[serde(default)]
    pub generated_at: String,
    #[serde(default)]
    pub items: Vec<DocEntry>,
    #[serde(default)]
    pub schema: IndexSchema,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for DocsIndex {
    fn default() -> Self {
        Self {
            page: default_page(),
            version: default_version(),
            generated_at: String::new(),
            items: Vec::new(),
            schema: IndexSchema::default(),
            extra: Map::new(),
        }
    }
}

fn default_page() -> String {
    "docs".to_string()
}
fn default_version() -> i64 {
    1
}
