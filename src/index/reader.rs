use crate::error::{IndexError, Result};
use crate::index::codec;
use crate::index::types::*;
use crate::index::validate::{validate, ValidationReport};
use roaring::RoaringBitmap;
use std::fs;
use std::path::{Path, PathBuf};

/// One entry of `docnames` with its parallel fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document<'a> {
    pub index: DocIndex,
    pub docname: &'a str,
    pub filename: &'a str,
    pub title: &'a str,
}

/// Read-only view over a loaded `searchindex.js`
pub struct IndexReader {
    path: Option<PathBuf>,
    index: SearchIndex,
}

impl IndexReader {
    /// Load and decode an index file
    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| IndexError::io(path, e))?;
        let index = codec::decode(&text)?;

        tracing::debug!(
            "loaded {}: {} documents, {} terms, {} title terms",
            path.display(),
            index.doc_count(),
            index.terms.len(),
            index.titleterms.len()
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            index,
        })
    }

    /// Load an index and fail with [`IndexError::Corrupt`] if any invariant is broken
    pub fn open_validated(path: &Path) -> Result<Self> {
        let reader = Self::open(path)?;
        reader.validate().into_result()?;
        Ok(reader)
    }

    /// Wrap an index already in memory
    pub fn from_index(index: SearchIndex) -> Self {
        Self { path: None, index }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    pub fn into_index(self) -> SearchIndex {
        self.index
    }

    pub fn doc_count(&self) -> usize {
        self.index.doc_count()
    }

    /// Get a document by position, `None` when out of range
    pub fn document(&self, index: DocIndex) -> Option<Document<'_>> {
        let i = index as usize;
        Some(Document {
            index,
            docname: self.index.docnames.get(i).map(String::as_str)?,
            filename: self.index.filenames.get(i).map_or("", String::as_str),
            title: self.index.titles.get(i).map_or(NO_TITLE, String::as_str),
        })
    }

    pub fn documents(&self) -> impl Iterator<Item = Document<'_>> {
        (0..self.doc_count() as DocIndex).filter_map(|i| self.document(i))
    }

    /// Position of a docname
    pub fn doc_index(&self, docname: &str) -> Option<DocIndex> {
        self.index
            .docnames
            .iter()
            .position(|d| d == docname)
            .map(|i| i as DocIndex)
    }

    /// Bitmap of every document
    pub fn all_docs(&self) -> RoaringBitmap {
        let mut docs = RoaringBitmap::new();
        docs.insert_range(0..self.doc_count() as u32);
        docs
    }

    /// Documents whose body contains `key`
    pub fn term_docs(&self, key: &str) -> RoaringBitmap {
        bitmap(self.index.terms.get(key))
    }

    /// Documents whose titles contain `key`
    pub fn title_term_docs(&self, key: &str) -> RoaringBitmap {
        bitmap(self.index.titleterms.get(key))
    }

    /// Body keys containing `fragment`, excluding `fragment` itself
    pub fn terms_containing<'a>(
        &'a self,
        fragment: &'a str,
    ) -> impl Iterator<Item = (&'a str, RoaringBitmap)> + 'a {
        containing(&self.index.terms, fragment)
    }

    /// Title keys containing `fragment`, excluding `fragment` itself
    pub fn title_terms_containing<'a>(
        &'a self,
        fragment: &'a str,
    ) -> impl Iterator<Item = (&'a str, RoaringBitmap)> + 'a {
        containing(&self.index.titleterms, fragment)
    }

    /// Every section title with its occurrences
    pub fn titles(&self) -> impl Iterator<Item = (&str, &[TitleRef])> {
        self.index
            .alltitles
            .iter()
            .map(|(title, refs)| (title.as_str(), refs.as_slice()))
    }

    /// Compare the recorded generator versions against `expected`
    pub fn freshness(&self, expected: &EnvVersion) -> Freshness {
        Freshness::compare(&self.index.envversion, expected)
    }

    pub fn validate(&self) -> ValidationReport {
        validate(&self.index)
    }
}

fn bitmap(refs: Option<&DocRefs>) -> RoaringBitmap {
    refs.map(|r| r.as_slice().iter().copied().collect())
        .unwrap_or_default()
}

fn containing<'a>(
    map: &'a std::collections::BTreeMap<String, DocRefs>,
    fragment: &'a str,
) -> impl Iterator<Item = (&'a str, RoaringBitmap)> + 'a {
    map.iter()
        .filter(move |(key, _)| key.as_str() != fragment && key.contains(fragment))
        .map(|(key, refs)| (key.as_str(), bitmap(Some(refs))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::writer::write_index;
    use tempfile::TempDir;

    fn sample() -> SearchIndex {
        let mut index = SearchIndex {
            docnames: vec!["confinement".into(), "distances".into()],
            filenames: vec!["confinement.md".into(), "distances.md".into()],
            titles: vec!["Vertex confinement".into(), "HPGe detector distance to surface".into()],
            ..SearchIndex::default()
        };
        index.terms.insert("surfac".into(), DocRefs::Many(vec![0, 1]));
        index.terms.insert("sampl".into(), DocRefs::One(0));
        index.titleterms.insert("surfac".into(), DocRefs::One(1));
        index.titleterms.insert("surface2".into(), DocRefs::One(0));
        index
    }

    #[test]
    fn test_documents() {
        let reader = IndexReader::from_index(sample());
        let doc = reader.document(1).unwrap();
        assert_eq!(doc.docname, "distances");
        assert_eq!(doc.filename, "distances.md");
        assert!(reader.document(2).is_none());
        assert_eq!(reader.documents().count(), 2);
        assert_eq!(reader.doc_index("confinement"), Some(0));
        assert_eq!(reader.all_docs().len(), 2);
    }

    #[test]
    fn test_term_lookups() {
        let reader = IndexReader::from_index(sample());
        assert_eq!(reader.term_docs("surfac").len(), 2);
        assert!(reader.term_docs("missing").is_empty());
        assert!(reader.title_term_docs("surfac").contains(1));

        let partial: Vec<_> = reader.title_terms_containing("surfac").map(|(k, _)| k).collect();
        assert_eq!(partial, vec!["surface2"]);
    }

    #[test]
    fn test_open_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("searchindex.js");
        write_index(&sample(), &path).unwrap();

        let reader = IndexReader::open_validated(&path).unwrap();
        assert_eq!(reader.path(), Some(path.as_path()));
        assert_eq!(reader.index(), &sample());
    }

    #[test]
    fn test_open_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("searchindex.js");
        let mut index = sample();
        index.terms.insert("ghost".into(), DocRefs::One(9));
        write_index(&index, &path).unwrap();

        assert!(IndexReader::open(&path).is_ok());
        let err = IndexReader::open_validated(&path).err().unwrap();
        assert!(err.requires_rebuild());
    }

    #[test]
    fn test_open_missing_file() {
        let err = IndexReader::open(Path::new("/nonexistent/searchindex.js")).err().unwrap();
        assert!(matches!(err, IndexError::Io { .. }));
    }
}
