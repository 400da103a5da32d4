use crate::index::reader::IndexReader;
use crate::index::types::DocRefs;
use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// Summary numbers for an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub documents: usize,
    pub terms: usize,
    pub title_terms: usize,
    pub section_titles: usize,
    pub postings: usize,
    pub untitled_documents: usize,
    /// Most widespread body terms, `(key, document count)`, largest first
    pub top_terms: Vec<(String, usize)>,
}

impl IndexStats {
    pub fn compute(reader: &IndexReader, top: usize) -> Self {
        let index = reader.index();

        let mut top_terms: Vec<(String, usize)> = index
            .terms
            .iter()
            .map(|(key, refs)| (key.clone(), refs.len()))
            .collect();
        top_terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_terms.truncate(top);

        Self {
            documents: index.doc_count(),
            terms: index.terms.len(),
            title_terms: index.titleterms.len(),
            section_titles: index.alltitles.values().map(Vec::len).sum(),
            postings: count_postings(&index.terms) + count_postings(&index.titleterms),
            untitled_documents: reader
                .documents()
                .filter(|d| d.title == crate::index::types::NO_TITLE)
                .count(),
            top_terms,
        }
    }
}

fn count_postings(map: &BTreeMap<String, DocRefs>) -> usize {
    map.values().map(DocRefs::len).sum()
}

/// Display index statistics
pub fn show_stats(reader: &IndexReader) -> Result<()> {
    let stats = IndexStats::compute(reader, 10);

    println!("Index Statistics");
    println!("================");
    println!();
    if let Some(path) = reader.path() {
        println!("Index location:   {}", path.display());
        let meta = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        println!("Index size:       {}", format_size(meta.len()));
    }
    println!("Documents:        {}", stats.documents);
    println!("Terms:            {}", stats.terms);
    println!("Title terms:      {}", stats.title_terms);
    println!("Section titles:   {}", stats.section_titles);
    println!("Postings:         {}", stats.postings);
    if stats.untitled_documents > 0 {
        println!("Untitled pages:   {}", stats.untitled_documents);
    }

    println!();
    println!("Documents:");
    for doc in reader.documents() {
        println!("  {:3} {:20} {}", doc.index, doc.docname, doc.title);
    }

    if !stats.top_terms.is_empty() {
        println!();
        println!("Most widespread terms:");
        for (term, count) in &stats.top_terms {
            println!("  {:15} {}", term, count);
        }
    }

    println!();
    println!("Generator versions:");
    for (name, version) in &reader.index().envversion {
        println!("  {:28} {}", name, version);
    }

    Ok(())
}

/// Format byte size to human readable
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
