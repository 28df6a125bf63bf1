//! Docs index builder.
//!
//! Crawls the fixed documentation directories under the gulfchain root,
//! extracts a title and summary from each file, and maintains the
//! `docs_index.json` artifact described in [`crate::models`].
//!
//! One bad file must never abort the whole scan: unreadable files fall
//! back to the filename stem and an empty summary, a missing source
//! directory yields zero files, and a missing or corrupt existing index
//! falls back to the empty default shape. Only the final write can fail
//! the run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::models::{DocEntry, DocsIndex};

/// Recognized documentation file extensions (lowercased).
const DOC_EXTENSIONS: [&str; 2] = ["md", "txt"];

/// Directories scanned for documentation, relative to the gulfchain root.
const SOURCE_DIRS: [&str; 3] = [
    "docs",
    "multigate-backtest/docs",
    "multigate-backtest/runs/artifacts/reports",
];

const SUMMARY_MAX_CHARS: usize = 200;

/// Recursively lists documentation files under `base`, sorted by path.
///
/// A missing base directory yields an empty list, and unreadable entries
/// are skipped rather than reported.
pub fn discover_files(base: &Path) -> Vec<PathBuf> {
    if !base.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(base)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| DOC_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();

    // Sort for deterministic ordering
    files.sort();
    files
}

/// Heuristic title/summary extraction.
///
/// Title is the first `#` heading stripped of marker characters, else the
/// filename stem. Summary is the first non-empty, non-heading line,
/// truncated to 200 characters. An unreadable file degrades to
/// `(stem, "")` instead of failing.
pub fn extract_title_summary(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return (stem, String::new()),
    };

    let mut title = stem;
    for line in text.lines().map(str::trim) {
        if line.starts_with('#') {
            let heading = line.trim_start_matches('#').trim();
            if !heading.is_empty() {
                title = heading.to_string();
            }
            break;
        }
    }

    let summary = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.chars().take(SUMMARY_MAX_CHARS).collect())
        .unwrap_or_default();

    (title, summary)
}

/// Lowercases, keeps alphanumerics, maps `/ _ - space` to hyphen,
/// collapses runs, and strips edge hyphens. Idempotent:
/// `slugify(slugify(x)) == slugify(x)`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for ch in value.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            slug.push(ch);
        } else if matches!(ch, '/' | '_' | '-' | ' ') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Path-prefix classifier for the owning repository. First match wins.
pub fn infer_repo(rel_path: &str) -> &'static str {
    if rel_path.starts_with("multigate-backtest/") {
        "multigate-backtest"
    } else if rel_path.starts_with("gulf-sync/") {
        "gulf-sync"
    } else {
        "gulfchain"
    }
}

/// Path classifier for the entry type: run artifacts are reports,
/// everything else is a doc.
pub fn infer_kind(rel_path: &str) -> &'static str {
    if rel_path.contains("runs/artifacts/reports") {
        "report"
    } else {
        "doc"
    }
}

/// Builds the docs index for `root` and persists it to `index_path`
/// (unless `dry_run`). Returns the in-memory document either way.
///
/// Freshly computed fields override any prior entry with the same
/// `source_path`; curated fields (tags, meta, status, visibility, owner,
/// created_at, and unknown extras) survive the merge. `updated_at` always
/// takes the freshly observed modification time.
pub fn build_docs_index(root: &Path, index_path: &Path, dry_run: bool) -> Result<DocsIndex> {
    let mut index = load_existing(index_path);
    let existing: HashMap<String, DocEntry> = index
        .items
        .drain(..)
        .filter(|entry| !entry.source_path.is_empty())
        .map(|entry| (entry.source_path.clone(), entry))
        .collect();

    let mut items = Vec::new();
    for source in SOURCE_DIRS {
        for path in discover_files(&root.join(source)) {
            let rel_path = normalize_rel(&path, root);
            let fresh = fresh_entry(&path, &rel_path);
            let entry = match existing.get(&rel_path) {
                Some(prior) => merge_entry(fresh, prior.clone()),
                None => fresh,
            };
            items.push(entry);
        }
    }
    items.sort_by(|a, b| a.source_path.cmp(&b.source_path));

    index.page = "docs".to_string();
    index.generated_at = Utc::now().to_rfc3339();
    index.items = items;

    if !dry_run {
        if let Some(parent) = index_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create index directory: {}", parent.display())
            })?;
        }
        let body = serde_json::to_string_pretty(&index)? + "\n";
        std::fs::write(index_path, body)
            .with_context(|| format!("Failed to write index: {}", index_path.display()))?;
    }

    Ok(index)
}

fn load_existing(index_path: &Path) -> DocsIndex {
    match std::fs::read_to_string(index_path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => DocsIndex::default(),
    }
}

/// Root-relative path with forward slashes.
fn normalize_rel(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn fresh_entry(path: &Path, rel_path: &str) -> DocEntry {
    let (title, summary) = extract_title_summary(path);
    let (created_at, updated_at) = file_times(path);

    DocEntry {
        id: slugify(rel_path),
        title,
        summary,
        tags: Vec::new(),
        source_path: rel_path.to_string(),
        source_repo: infer_repo(rel_path).to_string(),
        kind: infer_kind(rel_path).to_string(),
        created_at,
        updated_at,
        status: "active".to_string(),
        visibility: "internal".to_string(),
        owner: "cole".to_string(),
        meta: serde_json::Map::new(),
        extra: serde_json::Map::new(),
    }
}

/// RFC 3339 creation and modification timestamps for a file. Platforms
/// without a birth time fall back to the modification time.
fn file_times(path: &Path) -> (String, String) {
    let metadata = std::fs::metadata(path).ok();
    let modified = metadata
        .as_ref()
        .and_then(|m| m.modified().ok())
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let created = metadata
        .as_ref()
        .and_then(|m| m.created().or_else(|_| m.modified()).ok())
        .unwrap_or(SystemTime::UNIX_EPOCH);
    (
        DateTime::<Utc>::from(created).to_rfc3339(),
        DateTime::<Utc>::from(modified).to_rfc3339(),
    )
}

/// Overlays freshly computed fields onto a prior entry. The prior entry's
/// curated fields win; empty curated strings fall back to the fresh
/// defaults so partially hand-edited entries stay well-formed.
fn merge_entry(fresh: DocEntry, prior: DocEntry) -> DocEntry {
    DocEntry {
        id: fresh.id,
        title: fresh.title,
        summary: fresh.summary,
        tags: prior.tags,
        source_path: fresh.source_path,
        source_repo: fresh.source_repo,
        kind: fresh.kind,
        created_at: prefer(prior.created_at, fresh.created_at),
        updated_at: fresh.updated_at,
        status: prefer(prior.status, fresh.status),
        visibility: prefer(prior.visibility, fresh.visibility),
        owner: prefer(prior.owner, fresh.owner),
        meta: prior.meta,
        extra: prior.extra,
    }
}

fn prefer(prior: String, fresh: String) -> String {
    if prior.is_empty() {
        fresh
    } else {
        prior
    }
}
