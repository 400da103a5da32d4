//! Structural checks on a loaded index.
//!
//! Errors mean the index cannot be trusted and must be regenerated. Warnings
//! flag data a conforming generator would not emit but that readers still
//! handle. Info notes are purely descriptive.

use crate::error::{IndexError, Result};
use crate::index::types::{DocRefs, SearchIndex};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    fn push(&mut self, severity: Severity, message: String) {
        self.issues.push(Issue { severity, message });
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.count(Severity::Info)
    }

    /// Whether any structural invariant is broken
    pub fn is_corrupt(&self) -> bool {
        self.error_count() > 0
    }

    /// `Err(IndexError::Corrupt)` when any error-level issue exists
    pub fn into_result(self) -> Result<()> {
        let errors: Vec<&Issue> = self
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .collect();

        match errors.first() {
            None => Ok(()),
            Some(first) => Err(IndexError::Corrupt {
                issues: errors.len(),
                first: first.message.clone(),
            }),
        }
    }
}

/// Run every check against `index`
pub fn validate(index: &SearchIndex) -> ValidationReport {
    let mut report = ValidationReport::default();
    let doc_count = index.docnames.len();

    check_documents(index, &mut report);
    check_postings("terms", &index.terms, doc_count, &mut report);
    check_postings("titleterms", &index.titleterms, doc_count, &mut report);

    for (title, refs) in &index.alltitles {
        for (doc, _) in refs {
            if *doc as usize >= doc_count {
                report.push(
                    Severity::Error,
                    format!("alltitles[{:?}] references document {} of {}", title, doc, doc_count),
                );
            }
        }
    }

    let tables = [
        ("indexentries", index.indexentries.len()),
        ("objects", index.objects.len()),
        ("objnames", index.objnames.len()),
        ("objtypes", index.objtypes.len()),
    ];
    for (name, len) in tables {
        if len > 0 {
            report.push(Severity::Info, format!("{} has {} entries", name, len));
        }
    }

    report
}

fn check_documents(index: &SearchIndex, report: &mut ValidationReport) {
    let docs = index.docnames.len();
    if index.filenames.len() != docs {
        report.push(
            Severity::Error,
            format!("{} docnames but {} filenames", docs, index.filenames.len()),
        );
    }
    if index.titles.len() != docs {
        report.push(
            Severity::Error,
            format!("{} docnames but {} titles", docs, index.titles.len()),
        );
    }

    let mut seen = FxHashSet::default();
    for name in &index.docnames {
        if !seen.insert(name.as_str()) {
            report.push(Severity::Error, format!("duplicate docname {:?}", name));
        }
    }

    if index.docnames.windows(2).any(|w| w[0] > w[1]) {
        report.push(Severity::Warning, "docnames are not sorted".to_string());
    }

    for (docname, filename) in index.docnames.iter().zip(&index.filenames) {
        if !is_source_of(docname, filename) {
            report.push(
                Severity::Error,
                format!("filename {:?} does not match docname {:?}", filename, docname),
            );
        }
    }
}

/// `filename` is `docname` plus a suffix such as `.md`
fn is_source_of(docname: &str, filename: &str) -> bool {
    filename
        .strip_prefix(docname)
        .and_then(|suffix| suffix.strip_prefix('.'))
        .is_some_and(|ext| !ext.is_empty() && !ext.contains('/'))
}

fn check_postings(
    field: &str,
    postings: &BTreeMap<String, DocRefs>,
    doc_count: usize,
    report: &mut ValidationReport,
) {
    for (key, refs) in postings {
        if key.is_empty() {
            report.push(Severity::Warning, format!("{} has an empty key", field));
        } else if *key != key.to_lowercase() {
            report.push(Severity::Warning, format!("{} key {:?} is not lowercase", field, key));
        }

        let docs = refs.as_slice();
        if docs.is_empty() {
            report.push(Severity::Warning, format!("{}[{:?}] has no documents", field, key));
        }
        if docs.windows(2).any(|w| w[0] >= w[1]) {
            report.push(Severity::Warning, format!("{}[{:?}] is not strictly sorted", field, key));
        }
        if let Some(&bad) = docs.iter().find(|&&d| d as usize >= doc_count) {
            report.push(
                Severity::Error,
                format!("{}[{:?}] references document {} of {}", field, key, bad, doc_count),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SearchIndex {
        let mut index = SearchIndex {
            docnames: vec!["confinement".into(), "index".into()],
            filenames: vec!["confinement.md".into(), "index.md".into()],
            titles: vec!["Vertex confinement".into(), "Overview".into()],
            ..SearchIndex::default()
        };
        index.terms.insert("vertex".into(), DocRefs::Many(vec![0, 1]));
        index.titleterms.insert("confin".into(), DocRefs::One(0));
        index.alltitles.insert("Overview".into(), vec![(1, None)]);
        index
    }

    #[test]
    fn test_valid_index() {
        let report = validate(&sample());
        assert!(report.issues.is_empty());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_out_of_range_document() {
        let mut index = sample();
        index.terms.insert("ghost".into(), DocRefs::One(7));
        index.alltitles.insert("Ghost".into(), vec![(2, Some("ghost".into()))]);

        let report = validate(&index);
        assert_eq!(report.error_count(), 2);
        assert!(report.is_corrupt());
        let err = report.into_result().unwrap_err();
        assert!(matches!(err, IndexError::Corrupt { issues: 2, .. }));
    }

    #[test]
    fn test_length_mismatch() {
        let mut index = sample();
        index.filenames.pop();
        index.titles.push("Extra".into());

        let report = validate(&index);
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn test_filename_mismatch() {
        let mut index = sample();
        index.filenames[1] = "other.md".into();
        assert_eq!(validate(&index).error_count(), 1);

        assert!(is_source_of("manual/install", "manual/install.rst"));
        assert!(!is_source_of("index", "index"));
        assert!(!is_source_of("index", "index./x"));
    }

    #[test]
    fn test_key_warnings() {
        let mut index = sample();
        index.terms.insert("These".into(), DocRefs::One(0));
        index.titleterms.insert("".into(), DocRefs::One(1));
        index.terms.insert("unsorted".into(), DocRefs::Many(vec![1, 0]));

        let report = validate(&index);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 3);
    }

    #[test]
    fn test_object_tables_are_info() {
        let mut index = sample();
        index.objnames.insert("0".into(), serde_json::json!(["py", "function", "Python function"]));

        let report = validate(&index);
        assert_eq!(report.info_count(), 1);
        assert!(!report.is_corrupt());
    }

    #[test]
    fn test_duplicate_docnames() {
        let mut index = sample();
        index.docnames[1] = "confinement".into();
        index.filenames[1] = "confinement.rst".into();

        let report = validate(&index);
        assert_eq!(report.error_count(), 1);
    }
}
