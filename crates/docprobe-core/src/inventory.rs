//! Page inventory: discovers the documentation pages to verify from the
//! markdown source tree.
//!
//! Source files are mapped to [`PageId`]s by stripping the file extension,
//! locale suffix, variant-tab suffix and `index` segment, so that
//! `components/button/index-cn.md`, `components/button.md` and
//! `components/button_api.md` all collapse to `components/button`.

use std::collections::BTreeSet;
use std::path::Path;

use walkdir::WalkDir;

use crate::models::PageId;

/// Rules for discovering and normalizing source files.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Directory under the docs root holding one entry per component.
    pub components_dir: String,
    /// Subdirectory of `components_dir` that is verified by a fixed scenario instead.
    pub overview_dir: String,
    /// Any path containing this segment is internal and skipped.
    pub internal_marker: String,
    /// Source file extensions, without the dot.
    pub extensions: Vec<String>,
    /// Locale suffixes appended to file stems (`button-cn.md`).
    pub locale_suffixes: Vec<String>,
    /// Variant-tab suffixes appended to file stems (`button_api.md`).
    pub tab_suffixes: Vec<String>,
    /// File stem used for directory index pages.
    pub index_name: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            components_dir: "components".into(),
            overview_dir: "overview".into(),
            internal_marker: "_common".into(),
            extensions: vec!["md".into()],
            locale_suffixes: vec!["-cn".into(), "-en".into()],
            tab_suffixes: vec!["_api".into(), "_design".into(), "_demo".into()],
            index_name: "index".into(),
        }
    }
}

/// Normalize a source path (relative to the docs root) into a [`PageId`].
///
/// Suffixes are stripped repeatedly until nothing changes, which makes the
/// function idempotent.
pub fn normalize(path: &str, config: &InventoryConfig) -> PageId {
    let mut id = path.replace('\\', "/").trim_matches('/').to_string();
    let index_segment = format!("/{}", config.index_name);
    // `components/index` is a page; stripping it would leave the directory itself.
    let root_index = format!("{}{index_segment}", config.components_dir);

    loop {
        let before = id.len();

        for ext in &config.extensions {
            strip_suffix_in_place(&mut id, &format!(".{ext}"));
        }
        for suffix in &config.locale_suffixes {
            strip_suffix_ignore_case(&mut id, suffix);
        }
        for suffix in &config.tab_suffixes {
            strip_suffix_in_place(&mut id, suffix);
        }
        if id != root_index {
            strip_suffix_in_place(&mut id, &index_segment);
        }

        if id.len() == before {
            break;
        }
    }

    PageId::new(id)
}

fn strip_suffix_in_place(id: &mut String, suffix: &str) {
    if suffix.is_empty() || id.len() <= suffix.len() {
        return;
    }
    if id.ends_with(suffix) {
        id.truncate(id.len() - suffix.len());
    }
}

/// Locale markers show up as `-cn` and `-CN` alike.
fn strip_suffix_ignore_case(id: &mut String, suffix: &str) {
    if suffix.is_empty() || id.len() <= suffix.len() {
        return;
    }
    let start = id.len() - suffix.len();
    if id.get(start..).is_some_and(|tail| tail.eq_ignore_ascii_case(suffix)) {
        id.truncate(start);
    }
}

/// Enumerate the component pages under `docs_root`.
///
/// The result is deduplicated and sorted. A missing or empty components
/// directory yields an empty inventory.
pub fn build_inventory(docs_root: &Path, config: &InventoryConfig) -> Vec<PageId> {
    let components_root = docs_root.join(&config.components_dir);
    if !components_root.is_dir() {
        tracing::warn!(
            "No components directory at {}, inventory is empty",
            components_root.display()
        );
        return Vec::new();
    }

    let overview_prefix = format!("{}/{}", config.components_dir, config.overview_dir);
    let mut ids = BTreeSet::new();

    for entry in WalkDir::new(&components_root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable docs entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_source_extension(entry.path(), config) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(docs_root) else {
            continue;
        };
        let Some(segments) = relative
            .iter()
            .map(|s| s.to_str())
            .collect::<Option<Vec<_>>>()
        else {
            tracing::warn!("Skipping non UTF-8 path {}", relative.display());
            continue;
        };

        if segments.iter().any(|s| *s == config.internal_marker) {
            continue;
        }

        let id = normalize(&segments.join("/"), config);
        if is_under(id.as_str(), &overview_prefix) {
            continue;
        }
        ids.insert(id);
    }

    tracing::debug!(pages = ids.len(), "Built page inventory");
    ids.into_iter().collect()
}

/// Keep only top-level pages: those with fewer than `max_depth` separators.
pub fn top_level(ids: &[PageId], max_depth: usize) -> Vec<PageId> {
    ids.iter().filter(|id| id.depth() < max_depth).cloned().collect()
}

fn has_source_extension(path: &Path, config: &InventoryConfig) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| config.extensions.iter().any(|allowed| allowed == ext))
}

fn is_under(id: &str, prefix: &str) -> bool {
    id == prefix || id.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}
