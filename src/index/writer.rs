use crate::error::{IndexError, Result};
use crate::index::codec;
use crate::index::types::*;
use crate::source::SourcePage;
use crate::utils::{is_indexable, stem};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// What the writer keeps of a page besides its words
#[derive(Debug, Clone)]
struct PageEntry {
    filename: String,
    title: String,
    sections: Vec<(String, Option<String>)>,
}

/// Accumulates parsed pages and freezes them into a [`SearchIndex`]
pub struct IndexWriter {
    envversion: EnvVersion,
    pages: BTreeMap<String, PageEntry>,
    /// Body key -> docnames
    mapping: FxHashMap<String, FxHashSet<String>>,
    /// Title key -> docnames
    title_mapping: FxHashMap<String, FxHashSet<String>>,
}

impl IndexWriter {
    pub fn new(envversion: EnvVersion) -> Self {
        Self {
            envversion,
            pages: BTreeMap::new(),
            mapping: FxHashMap::default(),
            title_mapping: FxHashMap::default(),
        }
    }

    /// Add a page, replacing any earlier page with the same docname.
    ///
    /// Returns `true` if a page was replaced.
    pub fn feed(&mut self, page: &SourcePage) -> bool {
        let replaced = self.remove_page(&page.docname);
        let docname = &page.docname;

        for word in &page.title_words {
            let stemmed = stem(word);
            if is_indexable(&stemmed) {
                insert(&mut self.title_mapping, stemmed, docname);
            } else {
                let lower = word.to_lowercase();
                if is_indexable(&lower) {
                    insert(&mut self.title_mapping, lower, docname);
                }
            }
        }

        for word in &page.words {
            let mut key = stem(word);
            if !is_indexable(&key) {
                let lower = word.to_lowercase();
                if !is_indexable(&lower) {
                    continue;
                }
                key = lower;
            }

            let in_title = self
                .title_mapping
                .get(&key)
                .is_some_and(|docs| docs.contains(docname));
            if !in_title {
                insert(&mut self.mapping, key, docname);
            }
        }

        self.pages.insert(
            docname.clone(),
            PageEntry {
                filename: page.filename.clone(),
                title: page.title.clone(),
                sections: page
                    .sections
                    .iter()
                    .map(|s| (s.title.clone(), s.anchor.clone()))
                    .collect(),
            },
        );

        if replaced {
            tracing::debug!("replaced page {}", docname);
        }
        replaced
    }

    /// Drop a page and all its postings. Returns `true` if it was present.
    pub fn remove_page(&mut self, docname: &str) -> bool {
        if self.pages.remove(docname).is_none() {
            return false;
        }
        for mapping in [&mut self.mapping, &mut self.title_mapping] {
            mapping.retain(|_, docs| {
                docs.remove(docname);
                !docs.is_empty()
            });
        }
        true
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn contains(&self, docname: &str) -> bool {
        self.pages.contains_key(docname)
    }

    /// Produce the index: documents in docname order, postings sorted
    pub fn freeze(&self) -> SearchIndex {
        let positions: FxHashMap<&str, DocIndex> = self
            .pages
            .keys()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i as DocIndex))
            .collect();

        let mut alltitles: BTreeMap<String, Vec<TitleRef>> = BTreeMap::new();
        for (i, entry) in self.pages.values().enumerate() {
            for (title, anchor) in &entry.sections {
                alltitles
                    .entry(title.clone())
                    .or_default()
                    .push((i as DocIndex, anchor.clone()));
            }
        }

        SearchIndex {
            alltitles,
            docnames: self.pages.keys().cloned().collect(),
            envversion: self.envversion.clone(),
            filenames: self.pages.values().map(|e| e.filename.clone()).collect(),
            terms: freeze_mapping(&self.mapping, &positions),
            titles: self.pages.values().map(|e| e.title.clone()).collect(),
            titleterms: freeze_mapping(&self.title_mapping, &positions),
            ..SearchIndex::default()
        }
    }
}

fn insert(mapping: &mut FxHashMap<String, FxHashSet<String>>, key: String, docname: &str) {
    mapping.entry(key).or_default().insert(docname.to_string());
}

fn freeze_mapping(
    mapping: &FxHashMap<String, FxHashSet<String>>,
    positions: &FxHashMap<&str, DocIndex>,
) -> BTreeMap<String, DocRefs> {
    mapping
        .iter()
        .filter_map(|(key, docs)| {
            let mut indices: Vec<DocIndex> = docs
                .iter()
                .filter_map(|name| positions.get(name.as_str()).copied())
                .collect();
            if indices.is_empty() {
                return None;
            }
            indices.sort_unstable();
            indices.dedup();
            Some((key.clone(), DocRefs::from_sorted(indices)))
        })
        .collect()
}

/// Write an index file, replacing any existing one atomically.
///
/// The payload goes to a sibling temporary file that is then renamed over
/// `path`, so readers never observe a partially written index.
pub fn write_index(index: &SearchIndex, path: &Path) -> Result<()> {
    let bytes = codec::encode(index)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IndexError::io(parent, e))?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(format!(".tmp{}", std::process::id()));
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, &bytes).map_err(|e| IndexError::io(&tmp_path, e))?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(IndexError::io(path, e));
    }

    tracing::info!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
