//! Documentation page parsers.
//!
//! Both formats reduce a page to the same [`SourcePage`]: its sections with
//! their anchors, the words of its visible text, and the words of its titles.

pub mod markdown;
pub mod rst;

use crate::error::{IndexError, Result};
use crate::index::types::NO_TITLE;
use crate::utils::{split_words, AnchorAllocator};
use std::path::Path;

/// Directives whose body is configuration or a file reference, not prose
pub(crate) const SKIPPED_DIRECTIVES: &[&str] = &[
    "toctree",
    "raw",
    "include",
    "literalinclude",
    "image",
    "highlight",
    "meta",
    "contents",
];

/// Markup flavour of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Markdown,
    Rst,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str())? {
            "md" | "markdown" => Some(SourceFormat::Markdown),
            "rst" | "txt" => Some(SourceFormat::Rst),
            _ => None,
        }
    }
}

/// One titled section of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    /// `None` for the page title and for titles outside any section
    pub anchor: Option<String>,
}

/// A parsed documentation page, ready to feed to the index writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage {
    pub docname: String,
    pub filename: String,
    pub title: String,
    pub sections: Vec<Section>,
    pub words: Vec<String>,
    pub title_words: Vec<String>,
}

/// Docname for a root-relative source path: `/`-separated, suffix removed
pub fn docname_for(rel_path: &Path) -> String {
    let stemmed = rel_path.with_extension("");
    stemmed
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// `/`-separated form of a root-relative path
pub fn filename_for(rel_path: &Path) -> String {
    rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse page text according to the suffix of `rel_path`
pub fn parse_page(rel_path: &Path, text: &str) -> Result<SourcePage> {
    let format = SourceFormat::from_path(rel_path)
        .ok_or_else(|| IndexError::UnsupportedSource(rel_path.to_path_buf()))?;

    let mut page = PageBuilder::new();
    match format {
        SourceFormat::Markdown => markdown::parse(text, &mut page),
        SourceFormat::Rst => rst::parse(text, &mut page),
    }
    Ok(page.finish(docname_for(rel_path), filename_for(rel_path)))
}

/// Collects sections and words while a parser walks a page
#[derive(Debug, Default)]
pub(crate) struct PageBuilder {
    anchors: AnchorAllocator,
    title: Option<String>,
    sections: Vec<Section>,
    words: Vec<String>,
    title_words: Vec<String>,
}

impl PageBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a section heading; the first one becomes the page title
    pub(crate) fn heading(&mut self, title: &str, explicit_id: Option<&str>) {
        let title = title.trim();
        if title.is_empty() {
            return;
        }
        let id = self.anchors.allocate(title, explicit_id);
        let anchor = if self.title.is_none() {
            self.title = Some(title.to_string());
            None
        } else {
            Some(id)
        };
        self.push_title(title, anchor);
    }

    /// Record a title that belongs to no section, such as a toctree caption
    pub(crate) fn caption(&mut self, title: &str) {
        let title = title.trim();
        if !title.is_empty() {
            self.push_title(title, None);
        }
    }

    fn push_title(&mut self, title: &str, anchor: Option<String>) {
        for word in split_words(title) {
            self.title_words.push(word.to_string());
            self.words.push(word.to_string());
        }
        self.sections.push(Section {
            title: title.to_string(),
            anchor,
        });
    }

    /// Record visible body text
    pub(crate) fn text(&mut self, text: &str) {
        self.words.extend(split_words(text).map(str::to_string));
    }

    pub(crate) fn finish(self, docname: String, filename: String) -> SourcePage {
        SourcePage {
            docname,
            filename,
            title: self.title.unwrap_or_else(|| NO_TITLE.to_string()),
            sections: self.sections,
            words: self.words,
            title_words: self.title_words,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docname_for() {
        assert_eq!(docname_for(Path::new("confinement.md")), "confinement");
        assert_eq!(docname_for(Path::new("manual/install.rst")), "manual/install");
        assert_eq!(docname_for(Path::new("observables-ge.md")), "observables-ge");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SourceFormat::from_path(Path::new("a.md")), Some(SourceFormat::Markdown));
        assert_eq!(SourceFormat::from_path(Path::new("a.txt")), Some(SourceFormat::Rst));
        assert_eq!(SourceFormat::from_path(Path::new("conf.py")), None);
    }

    #[test]
    fn test_unsupported_source() {
        let err = parse_page(Path::new("conf.py"), "project = 'x'").unwrap_err();
        assert!(matches!(err, IndexError::UnsupportedSource(_)));
    }

    #[test]
    fn test_builder_titles() {
        let mut page = PageBuilder::new();
        page.heading("Vertex confinement", None);
        page.text("Some words here");
        page.heading("Bounding sphere", None);
        page.caption("Sections");
        let page = page.finish("confinement".into(), "confinement.md".into());

        assert_eq!(page.title, "Vertex confinement");
        assert_eq!(page.sections[0].anchor, None);
        assert_eq!(page.sections[1].anchor.as_deref(), Some("bounding-sphere"));
        assert_eq!(page.sections[2].anchor, None);
        assert_eq!(
            page.title_words,
            vec!["Vertex", "confinement", "Bounding", "sphere", "Sections"]
        );
        assert!(page.words.contains(&"words".to_string()));
        assert!(page.words.contains(&"sphere".to_string()));
    }

    #[test]
    fn test_untitled_page() {
        let page = PageBuilder::new().finish("blank".into(), "blank.md".into());
        assert_eq!(page.title, NO_TITLE);
        assert!(page.sections.is_empty());
    }

    #[test]
    fn test_caption_is_not_page_title() {
        let mut page = PageBuilder::new();
        page.caption("Sections");
        page.heading("Overview", None);
        let page = page.finish("index".into(), "index.md".into());

        assert_eq!(page.title, "Overview");
        assert_eq!(page.sections[1].anchor, None);
    }
}
