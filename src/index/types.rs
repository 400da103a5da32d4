use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Position of a document in `docnames`
pub type DocIndex = u32;

/// Generator/extension name -> schema version
pub type EnvVersion = BTreeMap<String, u32>;

/// A section title occurrence: document index and anchor (`None` for the page title)
pub type TitleRef = (DocIndex, Option<String>);

/// Title used for pages without any heading
pub const NO_TITLE: &str = "<no title>";

/// Documents containing a term.
///
/// The generator writes a bare integer when exactly one document matches and a
/// sorted list otherwise; both shapes must round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocRefs {
    One(DocIndex),
    Many(Vec<DocIndex>),
}

impl DocRefs {
    /// Build from a sorted, deduplicated list of documents
    pub fn from_sorted(mut docs: Vec<DocIndex>) -> Self {
        if docs.len() == 1 {
            DocRefs::One(docs.pop().unwrap_or_default())
        } else {
            DocRefs::Many(docs)
        }
    }

    pub fn as_slice(&self) -> &[DocIndex] {
        match self {
            DocRefs::One(doc) => std::slice::from_ref(doc),
            DocRefs::Many(docs) => docs,
        }
    }

    pub fn contains(&self, doc: DocIndex) -> bool {
        self.as_slice().contains(&doc)
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// The complete contents of a `searchindex.js` file.
///
/// Fields are declared in lexicographic order so serialization matches the
/// generator's sorted-key output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchIndex {
    pub alltitles: BTreeMap<String, Vec<TitleRef>>,
    pub docnames: Vec<String>,
    pub envversion: EnvVersion,
    pub filenames: Vec<String>,
    pub indexentries: BTreeMap<String, Value>,
    pub objects: BTreeMap<String, Value>,
    pub objnames: BTreeMap<String, Value>,
    pub objtypes: BTreeMap<String, Value>,
    pub terms: BTreeMap<String, DocRefs>,
    pub titles: Vec<String>,
    pub titleterms: BTreeMap<String, DocRefs>,
}

impl SearchIndex {
    pub fn doc_count(&self) -> usize {
        self.docnames.len()
    }

    /// Whether the cross-reference tables are all empty
    pub fn has_objects(&self) -> bool {
        !(self.indexentries.is_empty()
            && self.objects.is_empty()
            && self.objnames.is_empty()
            && self.objtypes.is_empty())
    }
}

/// One difference between the recorded and the expected `envversion`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvChange {
    /// Expected entry absent from the index
    Missing { name: String, expected: u32 },
    /// Index entry no longer expected
    Unexpected { name: String, found: u32 },
    /// Version differs
    Changed { name: String, found: u32, expected: u32 },
}

impl fmt::Display for EnvChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvChange::Missing { name, expected } => {
                write!(f, "{} missing (expected {})", name, expected)
            }
            EnvChange::Unexpected { name, found } => {
                write!(f, "{} not expected (found {})", name, found)
            }
            EnvChange::Changed {
                name,
                found,
                expected,
            } => write!(f, "{} is {} (expected {})", name, found, expected),
        }
    }
}

/// Outcome of comparing an index against the expected generator versions.
///
/// A mismatch is never a data error: it only means the index must be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    Current,
    RebuildRequired(Vec<EnvChange>),
}

impl Freshness {
    pub fn compare(found: &EnvVersion, expected: &EnvVersion) -> Self {
        let mut changes = Vec::new();

        for (name, &want) in expected {
            match found.get(name) {
                None => changes.push(EnvChange::Missing {
                    name: name.clone(),
                    expected: want,
                }),
                Some(&have) if have != want => changes.push(EnvChange::Changed {
                    name: name.clone(),
                    found: have,
                    expected: want,
                }),
                Some(_) => {}
            }
        }

        for (name, &have) in found {
            if !expected.contains_key(name) {
                changes.push(EnvChange::Unexpected {
                    name: name.clone(),
                    found: have,
                });
            }
        }

        if changes.is_empty() {
            Freshness::Current
        } else {
            Freshness::RebuildRequired(changes)
        }
    }

    pub fn is_current(&self) -> bool {
        matches!(self, Freshness::Current)
    }
}
