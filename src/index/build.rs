use crate::index::codec;
use crate::index::types::SearchIndex;
use crate::index::writer::{write_index, IndexWriter};
use crate::source::{parse_page, SourcePage};
use crate::utils::progress::{page_bar, spinner};
use crate::utils::{AppConfig, INDEX_FILE_NAME};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A discovered page: absolute path and path relative to the source root
pub type SourceFile = (PathBuf, PathBuf);

/// What a build produced
#[derive(Debug)]
pub struct BuildSummary {
    pub index: SearchIndex,
    pub pages: usize,
    /// Files that could not be read or parsed
    pub unreadable: usize,
    /// Files dropped because an earlier file had the same docname
    pub duplicates: usize,
}

/// Result of comparing a fresh build with the index on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    ByteIdentical,
    /// Same content, different bytes (e.g. whitespace or escaping)
    SemanticallyIdentical,
    Differs,
    Missing,
}

impl CheckOutcome {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, CheckOutcome::ByteIdentical | CheckOutcome::SemanticallyIdentical)
    }
}

/// Where the index goes when no output is given: `<root>/_build/html/searchindex.js`
pub fn default_output(root: &Path) -> PathBuf {
    root.join("_build").join("html").join(INDEX_FILE_NAME)
}

fn exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("Invalid exclude pattern {:?}", pattern))?;
        builder.add(glob);
    }
    builder.build().context("Failed to compile exclude patterns")
}

/// Find source pages under `root`, sorted by relative path
pub fn discover_sources(root: &Path, config: &AppConfig) -> Result<Vec<SourceFile>> {
    let excludes = exclude_set(&config.exclude_patterns)?;

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            // Skip build output and tooling directories
            !matches!(
                name.as_ref(),
                "_build" | ".git" | "node_modules" | "target" | "__pycache__" | ".venv"
            )
        })
        .build();

    let mut files: Vec<SourceFile> = walker
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let path = entry.path().to_path_buf();
            let rel_path = path.strip_prefix(root).ok()?.to_path_buf();
            Some((path, rel_path))
        })
        .filter(|(_, rel)| config.is_source_file(rel) && !excludes.is_match(rel))
        .collect();

    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// Build the index in memory from the pages under `root`
pub fn generate(root: &Path, config: &AppConfig, silent: bool) -> Result<BuildSummary> {
    let root = root.canonicalize().context("Invalid path")?;

    let discovering = spinner("Discovering pages...", silent);
    let files = discover_sources(&root, config)?;
    if let Some(spinner) = discovering {
        spinner.finish_with_message(format!("Found {} pages", files.len()));
    }
    tracing::info!("{} source pages under {}", files.len(), root.display());

    let unreadable = AtomicUsize::new(0);
    let bar = page_bar(files.len() as u64, silent);

    let parse_one = |(full_path, rel_path): &SourceFile| -> Option<SourcePage> {
        let parsed = fs::read_to_string(full_path)
            .map_err(anyhow::Error::from)
            .and_then(|text| Ok(parse_page(rel_path, &text)?));

        if let Some(bar) = &bar {
            bar.inc(1);
        }

        match parsed {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::warn!("skipping {}: {}", rel_path.display(), e);
                unreadable.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    };

    let pages: Vec<Option<SourcePage>> = if config.parallel {
        files.par_iter().map(parse_one).collect()
    } else {
        files.iter().map(parse_one).collect()
    };

    if let Some(bar) = bar {
        bar.finish_with_message(format!("Parsed {} pages", pages.len()));
    }

    let mut writer = IndexWriter::new(config.envversion.clone());
    let mut seen = FxHashSet::default();
    let mut duplicates = 0;

    for (page, (_, rel_path)) in pages.iter().zip(&files) {
        let Some(page) = page else { continue };
        if !seen.insert(page.docname.clone()) {
            tracing::warn!(
                "{} has the same docname as an earlier page ({}), ignored",
                rel_path.display(),
                page.docname
            );
            duplicates += 1;
            continue;
        }
        writer.feed(page);
    }

    Ok(BuildSummary {
        index: writer.freeze(),
        pages: writer.page_count(),
        unreadable: unreadable.load(Ordering::Relaxed),
        duplicates,
    })
}

/// Build the index and write it to `output`
pub fn build_index(root: &Path, output: &Path, config: &AppConfig, silent: bool) -> Result<BuildSummary> {
    if !silent {
        println!("Indexing: {}", root.display());
    }

    let summary = generate(root, config, silent)?;
    write_index(&summary.index, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if !silent {
        println!("Index stored at: {}", output.display());
        if summary.unreadable > 0 {
            eprintln!("({} files could not be read)", summary.unreadable);
        }
        if summary.duplicates > 0 {
            eprintln!("({} files shadowed by a page with the same docname)", summary.duplicates);
        }
    }

    Ok(summary)
}

/// Rebuild in memory and compare with the index at `output`
pub fn check_index(root: &Path, output: &Path, config: &AppConfig, silent: bool) -> Result<CheckOutcome> {
    let summary = generate(root, config, silent)?;
    let fresh = codec::encode(&summary.index)?;

    let existing = match fs::read(output) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(CheckOutcome::Missing),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", output.display())),
    };

    if existing == fresh {
        return Ok(CheckOutcome::ByteIdentical);
    }

    let same = std::str::from_utf8(&existing)
        .ok()
        .and_then(|text| codec::decode(text).ok())
        .is_some_and(|decoded| decoded == summary.index);

    Ok(if same {
        CheckOutcome::SemanticallyIdentical
    } else {
        CheckOutcome::Differs
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn corpus() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.md", "# Overview\n\nValidation of the simulation.\n");
        write(dir.path(), "nist.md", "# Comparison with NIST\n\nElectron ranges.\n");
        write(dir.path(), "manual/install.rst", "Install\n=======\n\nBuild with cmake.\n");
        write(dir.path(), "_build/html/old.md", "# Stale\n");
        write(dir.path(), "conf.py", "project = 'demo'\n");
        dir
    }

    #[test]
    fn test_discover_sources() {
        let dir = corpus();
        let root = dir.path().canonicalize().unwrap();
        let files = discover_sources(&root, &AppConfig::default()).unwrap();
        let rels: Vec<_> = files.iter().map(|(_, r)| r.to_string_lossy().replace('\\', "/")).collect();
        assert_eq!(rels, vec!["index.md", "manual/install.rst", "nist.md"]);
    }

    #[test]
    fn test_exclude_patterns() {
        let dir = corpus();
        let root = dir.path().canonicalize().unwrap();
        let config = AppConfig {
            exclude_patterns: vec!["manual/**".to_string()],
            ..AppConfig::default()
        };
        let files = discover_sources(&root, &config).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_generate() {
        let dir = corpus();
        let summary = generate(dir.path(), &AppConfig::default(), true).unwrap();
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.index.docnames, vec!["index", "manual/install", "nist"]);
        assert_eq!(summary.index.filenames[1], "manual/install.rst");
        assert!(summary.index.terms.contains_key("cmake"));
    }

    #[test]
    fn test_duplicate_docnames_keep_first() {
        let dir = corpus();
        write(dir.path(), "nist.rst", "Other\n=====\n");
        let summary = generate(dir.path(), &AppConfig::default(), true).unwrap();
        assert_eq!(summary.duplicates, 1);
        let nist = summary.index.docnames.iter().position(|d| d == "nist").unwrap();
        assert_eq!(summary.index.filenames[nist], "nist.md");
    }

    #[test]
    fn test_build_then_check() {
        let dir = corpus();
        let output = default_output(dir.path());
        let config = AppConfig::default();

        assert_eq!(check_index(dir.path(), &output, &config, true).unwrap(), CheckOutcome::Missing);
        build_index(dir.path(), &output, &config, true).unwrap();
        assert_eq!(
            check_index(dir.path(), &output, &config, true).unwrap(),
            CheckOutcome::ByteIdentical
        );

        write(dir.path(), "nist.md", "# Comparison with NIST\n\nGamma ranges.\n");
        assert_eq!(check_index(dir.path(), &output, &config, true).unwrap(), CheckOutcome::Differs);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let dir = corpus();
        let parallel = generate(dir.path(), &AppConfig::default(), true).unwrap();
        let config = AppConfig {
            parallel: false,
            ..AppConfig::default()
        };
        let sequential = generate(dir.path(), &config, true).unwrap();
        assert_eq!(parallel.index, sequential.index);
    }
}
